//! # Queue Flows
//!
//! Work queue, worker pool, operator lifecycle and response router wired
//! together without sockets. Replies are captured by a recording sender.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use bytes::Bytes;
    use gateway_runtime::GatewayHandler;
    use spa_01_header_codec::ReplyStatus;
    use spa_03_work_queue::{
        Dispatcher, QueueConfig, QueueError, QueueMode, WorkHandler, WorkItem, WorkQueue,
        WorkerPool,
    };
    use spa_04_operator_lifecycle::domain::procedures;
    use spa_04_operator_lifecycle::{InMemoryLegacyStore, OperatorLifecycle, Situation};
    use spa_05_response_router::{ResponseRouter, RouterConfig};
    use spa_types::{Header, Transaction};
    use tokio_util::sync::CancellationToken;

    use crate::support::{
        fast_retry, header_for_account, operator_header, MockPasswordService, RecordingSender,
    };

    const WAIT: Duration = Duration::from_secs(5);

    struct Wiring {
        handler: Arc<dyn WorkHandler>,
        store: Arc<InMemoryLegacyStore>,
        sender: Arc<RecordingSender>,
    }

    fn wiring() -> Wiring {
        let store = Arc::new(InMemoryLegacyStore::new());
        let sender = Arc::new(RecordingSender::default());
        let lifecycle = Arc::new(OperatorLifecycle::new(
            Arc::clone(&store),
            Arc::new(MockPasswordService::default()),
            fast_retry(),
        ));
        let router = Arc::new(ResponseRouter::new(
            Arc::clone(&sender),
            RouterConfig::default(),
        ));
        Wiring {
            handler: Arc::new(GatewayHandler::new(lifecycle, router)),
            store,
            sender,
        }
    }

    fn item(header: Header, code: i32, payload: &'static [u8]) -> WorkItem {
        WorkItem::new(Transaction::new(code, header, Bytes::from_static(payload)))
    }

    fn config(workers: usize) -> QueueConfig {
        QueueConfig {
            workers,
            ..QueueConfig::default()
        }
    }

    #[tokio::test]
    async fn test_single_worker_replies_in_enqueue_order() {
        let wiring = wiring();
        let (queue, receiver) = WorkQueue::new(QueueMode::Unbounded);
        let shutdown = CancellationToken::new();
        let pool = WorkerPool::spawn(
            receiver,
            Arc::clone(&wiring.handler),
            &config(1),
            shutdown.clone(),
        );

        for account in 1..=20 {
            queue
                .enqueue(item(header_for_account(account), 1000, b""))
                .unwrap();
        }

        assert!(wiring.sender.wait_for(20, WAIT).await);
        let accounts: Vec<i64> = wiring
            .sender
            .replies()
            .iter()
            .map(|(header, _)| header.account_product_number)
            .collect();
        assert_eq!(accounts, (1..=20).collect::<Vec<_>>());

        shutdown.cancel();
        pool.join().await;
    }

    #[tokio::test]
    async fn test_worker_pool_processes_every_item_once() {
        let wiring = wiring();
        let (queue, receiver) = WorkQueue::new(QueueMode::Unbounded);
        let shutdown = CancellationToken::new();
        let pool = WorkerPool::spawn(
            receiver,
            Arc::clone(&wiring.handler),
            &config(4),
            shutdown.clone(),
        );

        for account in 1..=40 {
            queue
                .enqueue(item(header_for_account(account), 1001, b"4111"))
                .unwrap();
        }

        assert!(wiring.sender.wait_for(40, WAIT).await);
        let replies = wiring.sender.replies();
        assert_eq!(replies.len(), 40);
        assert!(replies
            .iter()
            .all(|(_, body)| body.status == ReplyStatus::Ok
                && body.situation == Situation::Executed.code()));
        assert_eq!(wiring.store.call_count(procedures::IDENTIFY_CARD), 40);

        let mut accounts: Vec<i64> = replies
            .iter()
            .map(|(header, _)| header.account_product_number)
            .collect();
        accounts.sort_unstable();
        assert_eq!(accounts, (1..=40).collect::<Vec<_>>());

        shutdown.cancel();
        pool.join().await;
    }

    #[tokio::test]
    async fn test_repeated_execute_is_idempotent_through_queue() {
        let wiring = wiring();
        let (queue, receiver) = WorkQueue::new(QueueMode::Unbounded);
        let shutdown = CancellationToken::new();
        let pool = WorkerPool::spawn(
            receiver,
            Arc::clone(&wiring.handler),
            &config(1),
            shutdown.clone(),
        );

        for _ in 0..3 {
            queue.enqueue(item(operator_header(), 2001, b"BA-CE")).unwrap();
        }

        assert!(wiring.sender.wait_for(3, WAIT).await);
        assert!(wiring
            .sender
            .replies()
            .iter()
            .all(|(_, body)| body.situation == Situation::Executed.code()));
        assert_eq!(wiring.store.call_count(procedures::EXECUTE_PASSWORD), 1);

        shutdown.cancel();
        pool.join().await;
    }

    #[tokio::test]
    async fn test_cancelled_items_are_not_processed() {
        let wiring = wiring();
        let (queue, receiver) = WorkQueue::new(QueueMode::Unbounded);
        let shutdown = CancellationToken::new();
        let pool = WorkerPool::spawn(
            receiver,
            Arc::clone(&wiring.handler),
            &config(1),
            shutdown.clone(),
        );

        let cancelled = CancellationToken::new();
        cancelled.cancel();
        for account in 1..=3 {
            let tx = Transaction::new(1001, header_for_account(account), Bytes::new());
            queue
                .enqueue(WorkItem::with_cancellation(tx, cancelled.child_token()))
                .unwrap();
        }
        queue.enqueue(item(operator_header(), 1000, b"")).unwrap();

        assert!(wiring.sender.wait_for(1, WAIT).await);
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(wiring.sender.len(), 1);
        assert!(wiring.store.calls().is_empty());

        shutdown.cancel();
        pool.join().await;
    }

    #[tokio::test]
    async fn test_bounded_queue_rejects_when_full() {
        let (queue, _receiver) = WorkQueue::new(QueueMode::Bounded { capacity: 2 });

        queue.enqueue(item(operator_header(), 1000, b"")).unwrap();
        queue.enqueue(item(operator_header(), 1000, b"")).unwrap();
        let rejected = queue.enqueue(item(operator_header(), 1000, b""));

        assert_eq!(rejected, Err(QueueError::Full { capacity: 2 }));
        assert_eq!(queue.depth(), 2);
        assert_eq!(queue.rejected_total(), 1);
    }

    #[tokio::test]
    async fn test_passthrough_dispatch_replies_inline() {
        let wiring = wiring();
        let dispatcher = Dispatcher::Passthrough(Arc::clone(&wiring.handler));

        dispatcher
            .dispatch(item(operator_header(), 1000, b""))
            .await
            .unwrap();

        // No queue: the reply exists as soon as dispatch returns.
        assert_eq!(wiring.sender.len(), 1);
        assert_eq!(dispatcher.depth(), 0);
    }
}
