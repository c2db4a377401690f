//! Shared fixtures for the integration flows.

use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use spa_01_header_codec::{encode_frame, FrameAccumulator, ReplyBody};
use spa_02_socket_transport::FrameSender;
use spa_04_operator_lifecycle::{PasswordRequest, PasswordService, RetryPolicy};
use spa_types::{Endpoint, GatewayError, Header, TransportError};
use tokio::io::AsyncReadExt;
use tokio::net::TcpStream;

/// Header of a request sent by teller station 101/4, operator 5005.
pub fn operator_header() -> Header {
    Header {
        badge: 31337,
        origin: Endpoint {
            branch: 101,
            post: 4,
            operator_id: 5005,
            terminal_id: 12,
            ip: [10, 0, 0, 12],
            port: 5100,
        },
        destination: Endpoint {
            branch: 900,
            post: 1,
            ip: [10, 0, 0, 1],
            port: 7100,
            ..Endpoint::default()
        },
        account_product: 3,
        account_product_branch: 101,
        account_product_number: 778_899,
        ..Header::default()
    }
}

/// Same station, another account.
pub fn header_for_account(account_product_number: i64) -> Header {
    Header {
        account_product_number,
        ..operator_header()
    }
}

/// Wire bytes for one request: header, then code (i32 LE), then payload.
pub fn request_frame(header: &Header, code: i32, payload: &[u8]) -> Vec<u8> {
    let mut body = code.to_le_bytes().to_vec();
    body.extend_from_slice(payload);
    encode_frame(header, &body)
        .expect("request fits in one frame")
        .to_vec()
}

pub fn fast_retry() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 3,
        attempt_timeout: Duration::from_secs(2),
        backoff: Duration::from_millis(1),
    }
}

/// Password service that accepts every password.
#[derive(Default)]
pub struct MockPasswordService {
    pub output: Mutex<Option<String>>,
    pub rejections: Mutex<Vec<GatewayError>>,
    pub requests: Mutex<Vec<PasswordRequest>>,
}

impl MockPasswordService {
    pub fn with_output(output: &str) -> Self {
        Self {
            output: Mutex::new(Some(output.to_string())),
            ..Self::default()
        }
    }
}

#[async_trait]
impl PasswordService for MockPasswordService {
    async fn generate_output(&self, request: &PasswordRequest) -> Result<String, GatewayError> {
        self.requests.lock().push(request.clone());
        Ok(self
            .output
            .lock()
            .clone()
            .unwrap_or_else(|| "BA CE DI".to_string()))
    }

    async fn test_password(&self, request: &PasswordRequest) -> Result<(), GatewayError> {
        self.requests.lock().push(request.clone());
        match self.rejections.lock().pop() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

/// `FrameSender` that keeps every reply in memory.
#[derive(Default)]
pub struct RecordingSender {
    replies: Mutex<Vec<(Header, ReplyBody)>>,
}

impl RecordingSender {
    pub fn replies(&self) -> Vec<(Header, ReplyBody)> {
        self.replies.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.replies.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Polls until `count` replies arrived or the timeout elapsed.
    pub async fn wait_for(&self, count: usize, timeout: Duration) -> bool {
        tokio::time::timeout(timeout, async {
            while self.len() < count {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .is_ok()
    }
}

#[async_trait]
impl FrameSender for RecordingSender {
    async fn connect(&self) -> Result<(), TransportError> {
        Ok(())
    }

    fn is_connected(&self) -> bool {
        true
    }

    async fn send(
        &self,
        header: &Header,
        payload: &[u8],
        _timeout: Duration,
    ) -> Result<(), GatewayError> {
        let body = ReplyBody::decode(payload)?;
        self.replies.lock().push((*header, body));
        Ok(())
    }

    async fn disconnect(&self) {}
}

/// Reads reply frames from the router side of a real connection.
pub struct ReplyReader {
    stream: TcpStream,
    accumulator: FrameAccumulator,
}

impl ReplyReader {
    pub fn new(stream: TcpStream) -> Self {
        Self {
            stream,
            accumulator: FrameAccumulator::new(),
        }
    }

    /// Next reply, or `None` if nothing arrives within `timeout`.
    pub async fn next(&mut self, timeout: Duration) -> Option<(Header, ReplyBody)> {
        tokio::time::timeout(timeout, async {
            loop {
                if let Some(frame) = self.accumulator.next_frame() {
                    let frame = frame.expect("router received a malformed frame");
                    let body = ReplyBody::decode(&frame.payload).expect("reply body decodes");
                    return Some((frame.header, body));
                }
                let read = self
                    .stream
                    .read_buf(self.accumulator.buffer_mut())
                    .await
                    .ok()?;
                if read == 0 {
                    return None;
                }
            }
        })
        .await
        .ok()
        .flatten()
    }
}
