//! # Loopback Flows
//!
//! The whole gateway on real sockets:
//!
//! ```text
//! test client ──TCP──→ Gateway (SpaServer → queue → lifecycle) ──TCP──→ test router
//! ```
//!
//! The test plays both the legacy caller and the router endpoint, and reads
//! replies off the router side.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use bytes::Bytes;
    use gateway_runtime::{Gateway, GatewayConfig};
    use spa_01_header_codec::{encode, ReplyStatus};
    use spa_04_operator_lifecycle::domain::{procedures, OUTPUT_COLUMN};
    use spa_04_operator_lifecycle::{
        InMemoryLegacyStore, OperatorLifecycle, SessionKey, Situation, SpxResult, SpxValue,
    };
    use spa_types::{codes, Header, HEADER_SIZE};
    use tokio::io::AsyncWriteExt;
    use tokio::net::{TcpListener, TcpStream};
    use tokio::task::JoinHandle;
    use tokio_util::sync::CancellationToken;

    use crate::support::{operator_header, request_frame, MockPasswordService, ReplyReader};

    const REPLY_TIMEOUT: Duration = Duration::from_secs(5);

    struct Harness {
        client: TcpStream,
        router: TcpListener,
        store: Arc<InMemoryLegacyStore>,
        shutdown: CancellationToken,
        running: JoinHandle<anyhow::Result<()>>,
    }

    impl Harness {
        async fn start() -> Self {
            let router = TcpListener::bind("127.0.0.1:0").await.unwrap();

            let mut config = GatewayConfig::default();
            config.server.host = "127.0.0.1".to_string();
            config.server.port = 0;
            config.router.port = router.local_addr().unwrap().port();
            config.legacy.attempt_timeout_ms = 2000;
            config.legacy.backoff_ms = 1;
            config.validate().unwrap();

            let store = Arc::new(InMemoryLegacyStore::new());
            let lifecycle = Arc::new(OperatorLifecycle::new(
                Arc::clone(&store),
                Arc::new(MockPasswordService::default()),
                config.retry_policy(),
            ));

            let shutdown = CancellationToken::new();
            let gateway = Gateway::bind(&config, lifecycle, shutdown.clone())
                .await
                .unwrap();
            let client = TcpStream::connect(gateway.local_addr().unwrap())
                .await
                .unwrap();
            let running = tokio::spawn(gateway.run());

            Self {
                client,
                router,
                store,
                shutdown,
                running,
            }
        }

        async fn send(&mut self, bytes: &[u8]) {
            self.client.write_all(bytes).await.unwrap();
        }

        /// The gateway connects to the router on its first reply.
        async fn router_connection(&self) -> ReplyReader {
            let (stream, _) = tokio::time::timeout(REPLY_TIMEOUT, self.router.accept())
                .await
                .expect("gateway never connected to the router")
                .unwrap();
            ReplyReader::new(stream)
        }

        async fn stop(self) {
            self.shutdown.cancel();
            tokio::time::timeout(REPLY_TIMEOUT, self.running)
                .await
                .expect("gateway did not stop")
                .unwrap()
                .unwrap();
        }
    }

    fn key() -> SessionKey {
        SessionKey::from_header(&operator_header()).unwrap()
    }

    #[tokio::test]
    async fn test_card_execute_round_trip() {
        let mut harness = Harness::start().await;
        harness.store.script(
            procedures::IDENTIFY_CARD,
            Ok(SpxResult::ok().with_row(vec![(
                OUTPUT_COLUMN.to_string(),
                SpxValue::Bytes(Bytes::from_static(b"CARD-OK")),
            )])),
        );

        let request = operator_header();
        harness.send(&request_frame(&request, 1001, b"4111")).await;

        let mut replies = harness.router_connection().await;
        let (header, body) = replies.next(REPLY_TIMEOUT).await.unwrap();

        // Addressed back to the caller.
        assert_eq!(header.destination, request.origin);
        assert_eq!(header.origin, request.destination);
        assert_eq!(header.badge, request.badge);
        assert_eq!(header.account_product_number, request.account_product_number);
        assert_eq!(header.header_size as usize, HEADER_SIZE);
        assert_eq!(header.compressed, 0);

        assert_eq!(body.status, ReplyStatus::Ok);
        assert_eq!(body.situation, Situation::Executed.code());
        assert_eq!(body.data.as_ref(), b"CARD-OK");

        let call = &harness.store.calls()[0];
        assert_eq!(call.procedure, procedures::IDENTIFY_CARD);
        assert_eq!(
            call.parameters.get(OUTPUT_COLUMN),
            Some(&SpxValue::Bytes(Bytes::from_static(b"4111")))
        );
        assert_eq!(harness.store.situation(&key()), Some(Situation::Executed));

        harness.stop().await;
    }

    #[tokio::test]
    async fn test_malformed_frame_does_not_poison_connection() {
        let mut harness = Harness::start().await;

        // Header announcing fewer bytes than itself, then a frame too short
        // to carry a transaction code, then a valid Validate request.
        let bad = Header {
            message_size: 1,
            ..Header::default()
        };
        let mut bytes = encode(&bad).to_vec();
        bytes.extend(spa_01_header_codec::encode_frame(&operator_header(), &[1, 2]).unwrap());
        bytes.extend(request_frame(&operator_header(), 1000, b""));
        harness.send(&bytes).await;

        let mut replies = harness.router_connection().await;
        let (_, body) = replies.next(REPLY_TIMEOUT).await.unwrap();
        assert_eq!(body.status, ReplyStatus::Ok);
        assert_eq!(body.situation, Situation::Started.code());

        // Nothing else is answered.
        assert!(replies.next(Duration::from_millis(200)).await.is_none());

        harness.stop().await;
    }

    #[tokio::test]
    async fn test_password_lifecycle_in_order() {
        let mut harness = Harness::start().await;

        let request = operator_header();
        let mut bytes = request_frame(&request, 2001, b"BA-CE-DI");
        bytes.extend(request_frame(&request, 2002, b""));
        bytes.extend(request_frame(&request, 2009, b""));
        harness.send(&bytes).await;

        let mut replies = harness.router_connection().await;

        let (_, executed) = replies.next(REPLY_TIMEOUT).await.unwrap();
        assert_eq!(executed.status, ReplyStatus::Ok);
        assert_eq!(executed.situation, Situation::Executed.code());

        let (_, confirmed) = replies.next(REPLY_TIMEOUT).await.unwrap();
        assert_eq!(confirmed.status, ReplyStatus::Ok);
        assert_eq!(confirmed.situation, Situation::Confirmed.code());

        // A confirmed session cannot be cancelled.
        let (_, cancelled) = replies.next(REPLY_TIMEOUT).await.unwrap();
        assert_eq!(cancelled.status, ReplyStatus::Business);
        assert_eq!(cancelled.code, codes::INVALID_TRANSITION);
        assert_eq!(cancelled.situation, Situation::Confirmed.code());

        assert_eq!(harness.store.call_count(procedures::EXECUTE_PASSWORD), 1);
        assert_eq!(harness.store.call_count(procedures::CONFIRM_PASSWORD), 1);
        assert_eq!(harness.store.call_count(procedures::CANCEL_PASSWORD), 0);

        harness.stop().await;
    }

    #[tokio::test]
    async fn test_unknown_code_gets_business_reply() {
        let mut harness = Harness::start().await;

        harness.send(&request_frame(&operator_header(), 3001, b"")).await;

        let mut replies = harness.router_connection().await;
        let (_, body) = replies.next(REPLY_TIMEOUT).await.unwrap();
        assert_eq!(body.status, ReplyStatus::Business);
        assert_eq!(body.code, codes::UNKNOWN_TRANSACTION_CODE);
        assert_eq!(body.situation, -1);
        assert!(harness.store.calls().is_empty());

        harness.stop().await;
    }

    #[tokio::test]
    async fn test_legacy_outage_reports_config_error() {
        let mut harness = Harness::start().await;
        for _ in 0..3 {
            harness.store.script(
                procedures::IDENTIFY_CARD,
                Err(spa_types::InfrastructureError::database("connection reset").into()),
            );
        }

        harness.send(&request_frame(&operator_header(), 1001, b"4111")).await;

        let mut replies = harness.router_connection().await;
        let (_, body) = replies.next(REPLY_TIMEOUT).await.unwrap();
        assert_eq!(body.status, ReplyStatus::Infrastructure);
        assert_eq!(body.situation, Situation::ConfigError.code());
        assert_eq!(harness.store.call_count(procedures::IDENTIFY_CARD), 3);
        assert_eq!(harness.store.situation(&key()), Some(Situation::ConfigError));

        harness.stop().await;
    }
}
