//! Component wiring.
//!
//! ```text
//! SpaServer ──ReceivedFrame──→ ingest ──WorkItem──→ Dispatcher ──→ WorkerPool
//!                                                                      │
//!                                                   GatewayHandler ←───┘
//!                                          (OperatorLifecycle → ResponseRouter → SpaClient)
//! ```

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use spa_02_socket_transport::{ConnectionStats, ReceivedFrame, SpaClient, SpaServer};
use spa_03_work_queue::{Dispatcher, QueueError, WorkHandler, WorkItem, WorkQueue, WorkerPool};
use spa_04_operator_lifecycle::LifecycleApi;
use spa_05_response_router::ResponseRouter;
use spa_telemetry::{
    CONNECTIONS_ACTIVE, FRAMES_DROPPED, FRAMES_RECEIVED, QUEUE_DEPTH, QUEUE_REJECTED, UPTIME,
};
use spa_types::Transaction;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::GatewayConfig;
use crate::handler::GatewayHandler;

/// How often gauges are refreshed from component counters.
const METRICS_REFRESH_INTERVAL: Duration = Duration::from_secs(1);

/// A bound, not yet running gateway.
pub struct Gateway {
    server: SpaServer,
    dispatcher: Dispatcher,
    workers: Option<WorkerPool>,
    shutdown: CancellationToken,
}

impl Gateway {
    /// Binds the listener and starts the worker pool.
    ///
    /// The router connection is opened lazily by the first reply.
    pub async fn bind<A>(
        config: &GatewayConfig,
        lifecycle: Arc<A>,
        shutdown: CancellationToken,
    ) -> Result<Self>
    where
        A: LifecycleApi + 'static,
    {
        let server = SpaServer::bind(config.server_config()?)
            .await
            .context("Failed to bind SPA listener")?;

        let client = Arc::new(SpaClient::new(config.client_config()?));
        let router = Arc::new(ResponseRouter::new(client, config.router_config()));
        let handler: Arc<dyn WorkHandler> = Arc::new(GatewayHandler::new(lifecycle, router));

        let queue_config = config.queue_config();
        let (dispatcher, workers) = if queue_config.enabled {
            let (queue, receiver) = WorkQueue::new(queue_config.mode);
            let pool = WorkerPool::spawn(receiver, handler, &queue_config, shutdown.clone());
            (Dispatcher::Queued(queue), Some(pool))
        } else {
            info!("Work queue disabled, processing inline");
            (Dispatcher::Passthrough(handler), None)
        };

        Ok(Self {
            server,
            dispatcher,
            workers,
            shutdown,
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.server.local_addr()
    }

    pub fn connection_stats(&self) -> Arc<ConnectionStats> {
        self.server.stats()
    }

    /// Runs until the shutdown token is cancelled, then waits for the
    /// listener and workers to stop.
    pub async fn run(self) -> Result<()> {
        let Self {
            server,
            dispatcher,
            workers,
            shutdown,
        } = self;

        let stats = server.stats();
        let (events_tx, mut events_rx) = mpsc::unbounded_channel();
        let listener = tokio::spawn(server.run(events_tx, shutdown.clone()));
        let refresher = spawn_metrics_refresh(stats, dispatcher.clone(), shutdown.clone());

        info!("SPA gateway running");

        loop {
            let event = tokio::select! {
                _ = shutdown.cancelled() => break,
                event = events_rx.recv() => event,
            };
            match event {
                Some(event) => ingest(&dispatcher, event, &shutdown).await,
                None => break,
            }
        }

        info!("SPA gateway stopping");
        shutdown.cancel();
        if let Err(e) = listener.await {
            warn!(error = %e, "Listener task ended abnormally");
        }
        let _ = refresher.await;

        // Dropping the last queue handle closes the channel for the workers.
        drop(dispatcher);
        if let Some(workers) = workers {
            workers.join().await;
        }

        info!("SPA gateway stopped");
        Ok(())
    }
}

/// Turns one received frame into a work item and hands it off.
async fn ingest(dispatcher: &Dispatcher, event: ReceivedFrame, shutdown: &CancellationToken) {
    let ReceivedFrame {
        connection_id,
        peer,
        message,
    } = event;

    let transaction = match Transaction::from_framed(message) {
        Ok(transaction) => transaction,
        Err(e) => {
            FRAMES_DROPPED.inc();
            warn!(connection_id, peer = %peer, error = %e, "Frame without transaction dropped");
            return;
        }
    };
    FRAMES_RECEIVED.inc();

    let item = WorkItem::with_cancellation(transaction, shutdown.child_token());
    debug!(
        connection_id,
        trace_id = item.trace_id(),
        code = item.transaction().code(),
        "Transaction received"
    );

    match dispatcher.dispatch(item).await {
        Ok(()) => {}
        Err(QueueError::Full { capacity }) => {
            QUEUE_REJECTED.inc();
            warn!(connection_id, capacity, "Transaction rejected, queue full");
        }
        Err(QueueError::Closed) => {
            warn!(connection_id, "Transaction rejected, queue closed");
        }
    }
}

/// Keeps gauges in line with the transport and queue counters.
fn spawn_metrics_refresh(
    stats: Arc<ConnectionStats>,
    dispatcher: Dispatcher,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    let started = Instant::now();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(METRICS_REFRESH_INTERVAL);
        let mut dropped_seen = 0;
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = interval.tick() => {}
            }

            let snapshot = stats.snapshot();
            CONNECTIONS_ACTIVE.set(snapshot.active as i64);
            QUEUE_DEPTH.set(dispatcher.depth() as i64);
            UPTIME.set(started.elapsed().as_secs_f64());

            // Frames the receive loops could not parse never reach ingest.
            if snapshot.frames_dropped > dropped_seen {
                FRAMES_DROPPED.inc_by(snapshot.frames_dropped - dropped_seen);
                dropped_seen = snapshot.frames_dropped;
            }
        }
    })
}
