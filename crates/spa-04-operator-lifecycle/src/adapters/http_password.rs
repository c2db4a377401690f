//! `PasswordService` over HTTP/JSON.
//!
//! | Endpoint | Success | Rejection |
//! |----------|---------|-----------|
//! | `POST {base}/GerarSaidaSenha` | 2xx `{"saida": "..."}` | 4xx `{codigo, mensagem}` |
//! | `POST {base}/TestarSenha` | 2xx | 4xx `{codigo, mensagem}` |
//!
//! Any other status, an unreadable body, or a network failure is an
//! infrastructure error and goes through the retry boundary.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use spa_types::{BusinessError, GatewayError, InfrastructureError};
use tracing::{debug, warn};

use crate::ports::{PasswordRequest, PasswordService};

const GENERATE_OUTPUT: &str = "GerarSaidaSenha";
const TEST_PASSWORD: &str = "TestarSenha";

#[derive(Debug, Deserialize)]
struct GenerateOutputResponse {
    #[serde(alias = "output")]
    saida: String,
}

#[derive(Debug, Deserialize)]
struct ServiceRejection {
    codigo: i32,
    mensagem: String,
}

/// Password service client.
pub struct HttpPasswordService {
    client: Client,
    base_url: String,
}

impl HttpPasswordService {
    /// # Errors
    ///
    /// Infrastructure error if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .map_err(|e| InfrastructureError::unexpected(format!("HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post(
        &self,
        endpoint: &str,
        request: &PasswordRequest,
    ) -> Result<reqwest::Response, GatewayError> {
        let url = format!("{}/{endpoint}", self.base_url);
        debug!(url = %url, session = %request.session, "Password service call");

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| network_error(endpoint, &e))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(status_error(endpoint, status, &body))
    }
}

fn network_error(endpoint: &str, e: &reqwest::Error) -> GatewayError {
    let context = format!("{endpoint}: {e}");
    if e.is_timeout() {
        InfrastructureError::timeout(context).into()
    } else if e.is_connect() {
        InfrastructureError::unavailable(context).into()
    } else {
        InfrastructureError::unexpected(context).into()
    }
}

fn status_error(endpoint: &str, status: StatusCode, body: &str) -> GatewayError {
    if status.is_client_error() {
        if let Ok(rejection) = serde_json::from_str::<ServiceRejection>(body) {
            return BusinessError::new(rejection.codigo, rejection.mensagem).into();
        }
        warn!(endpoint, status = status.as_u16(), "Client error without rejection body");
    }
    InfrastructureError::unavailable(format!("{endpoint} returned HTTP {}", status.as_u16())).into()
}

#[async_trait]
impl PasswordService for HttpPasswordService {
    async fn generate_output(&self, request: &PasswordRequest) -> Result<String, GatewayError> {
        let response = self.post(GENERATE_OUTPUT, request).await?;
        let parsed: GenerateOutputResponse = response.json().await.map_err(|e| {
            InfrastructureError::unexpected(format!("{GENERATE_OUTPUT}: invalid body: {e}"))
        })?;
        Ok(parsed.saida)
    }

    async fn test_password(&self, request: &PasswordRequest) -> Result<(), GatewayError> {
        self.post(TEST_PASSWORD, request).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SessionKey;
    use spa_types::InfrastructureKind;
    use std::net::SocketAddr;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Answers a single HTTP request with `status` and `body`, returning the
    /// raw request text.
    async fn serve_once(status: u16, body: &'static str) -> (SocketAddr, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut chunk = [0u8; 1024];
            loop {
                let n = socket.read(&mut chunk).await.unwrap();
                request.extend_from_slice(&chunk[..n]);
                if n == 0 || request_complete(&request) {
                    break;
                }
            }

            let response = format!(
                "HTTP/1.1 {status} X\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            String::from_utf8_lossy(&request).into_owned()
        });

        (addr, handle)
    }

    fn request_complete(request: &[u8]) -> bool {
        let text = String::from_utf8_lossy(request);
        let Some(split) = text.find("\r\n\r\n") else {
            return false;
        };
        let content_length = text[..split]
            .lines()
            .find_map(|line| {
                let (name, value) = line.split_once(':')?;
                name.eq_ignore_ascii_case("content-length")
                    .then(|| value.trim().parse::<usize>().ok())
                    .flatten()
            })
            .unwrap_or(0);
        request.len() >= split + 4 + content_length
    }

    fn request() -> PasswordRequest {
        PasswordRequest {
            session: SessionKey {
                branch: 10,
                post: 2,
                operator_id: 77,
                account_product_number: 123456,
            },
            terminal_id: 5,
            data: "BA-CE".to_string(),
        }
    }

    fn service(addr: SocketAddr) -> HttpPasswordService {
        HttpPasswordService::new(format!("http://{addr}/"), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_generate_output_success() {
        let (addr, server) = serve_once(200, r#"{"saida":"BA CE DI | FO GU HA"}"#).await;

        let output = service(addr).generate_output(&request()).await.unwrap();
        assert_eq!(output, "BA CE DI | FO GU HA");

        let raw = server.await.unwrap();
        assert!(raw.starts_with("POST /GerarSaidaSenha "));
        assert!(raw.contains(r#""operatorId":77"#));
        assert!(raw.contains(r#""terminalId":5"#));
    }

    #[tokio::test]
    async fn test_rejection_is_business() {
        let (addr, _server) =
            serve_once(422, r#"{"codigo":51,"mensagem":"Senha incorreta"}"#).await;

        let err = service(addr).test_password(&request()).await.unwrap_err();
        assert_eq!(err, GatewayError::from(BusinessError::new(51, "Senha incorreta")));
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn test_server_error_is_infrastructure() {
        let (addr, _server) = serve_once(503, "").await;

        let err = service(addr).test_password(&request()).await.unwrap_err();
        match err {
            GatewayError::Infrastructure(e) => assert_eq!(e.kind, InfrastructureKind::Unavailable),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_client_error_without_body_is_infrastructure() {
        let (addr, _server) = serve_once(404, "not json").await;

        let err = service(addr).generate_output(&request()).await.unwrap_err();
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_connection_refused_is_unavailable() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = service(addr).test_password(&request()).await.unwrap_err();
        match err {
            GatewayError::Infrastructure(e) => assert_eq!(e.kind, InfrastructureKind::Unavailable),
            other => panic!("unexpected {other:?}"),
        }
    }
}
