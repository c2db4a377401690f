//! # HTTP Mapping Flow
//!
//! JSON request body → `Transaction` → lifecycle → reply, the same way the
//! TCP path would process it.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use bytes::Bytes;
    use gateway_runtime::adapters::{decode_request, MappingError};
    use gateway_runtime::GatewayHandler;
    use serde_json::json;
    use spa_01_header_codec::ReplyStatus;
    use spa_03_work_queue::{WorkHandler, WorkItem};
    use spa_04_operator_lifecycle::domain::{procedures, OUTPUT_COLUMN};
    use spa_04_operator_lifecycle::{InMemoryLegacyStore, OperatorLifecycle, Situation, SpxValue};
    use spa_05_response_router::{ResponseRouter, RouterConfig};

    use crate::support::{fast_retry, operator_header, MockPasswordService, RecordingSender};

    fn request_body(code: i32, payload: &str) -> Vec<u8> {
        serde_json::to_vec(&json!({
            "code": code,
            "header": serde_json::to_string(&operator_header()).unwrap(),
            "payload": payload,
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_http_password_execute_reaches_legacy_store() {
        let store = Arc::new(InMemoryLegacyStore::new());
        let passwords = Arc::new(MockPasswordService::default());
        let sender = Arc::new(RecordingSender::default());
        let lifecycle = Arc::new(OperatorLifecycle::new(
            Arc::clone(&store),
            Arc::clone(&passwords),
            fast_retry(),
        ));
        let router = Arc::new(ResponseRouter::new(Arc::clone(&sender), RouterConfig::default()));
        let handler = GatewayHandler::new(lifecycle, router);

        let transaction = decode_request(&request_body(2001, "BA-ÇA")).unwrap();
        handler.handle(WorkItem::new(transaction)).await.unwrap();

        let replies = sender.replies();
        assert_eq!(replies.len(), 1);
        let (header, body) = &replies[0];
        assert_eq!(header.destination, operator_header().origin);
        assert_eq!(body.status, ReplyStatus::Ok);
        assert_eq!(body.situation, Situation::Executed.code());

        // The password service sees text, the legacy store sees bytes.
        let requests = passwords.requests.lock();
        assert_eq!(requests[0].data, "BA-ÇA");
        assert_eq!(requests[0].terminal_id, 12);

        let calls = store.calls();
        let execute = calls
            .iter()
            .find(|call| call.procedure == procedures::EXECUTE_PASSWORD)
            .unwrap();
        assert_eq!(
            execute.parameters.get(OUTPUT_COLUMN),
            Some(&SpxValue::Bytes(Bytes::from_static(&[
                b'B', b'A', b'-', 0xC7, b'A'
            ])))
        );
    }

    #[test]
    fn test_http_payload_outside_code_page_is_rejected() {
        let result = decode_request(&request_body(2001, "senha ✓"));
        assert_eq!(result, Err(MappingError::Unmappable { ch: '✓', index: 6 }));
    }
}
