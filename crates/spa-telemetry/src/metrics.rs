//! Prometheus metrics for the gateway.
//!
//! All metrics follow the naming convention: `spa_<component>_<metric>_<unit>`
//!
//! ## Metric Types
//!
//! - **Counter**: frames, transactions and replies
//! - **Gauge**: connections and queue depth
//! - **Histogram**: transaction processing time

use lazy_static::lazy_static;
use prometheus::{
    exponential_buckets, Encoder, Gauge, Histogram, HistogramOpts, IntCounter, IntCounterVec,
    IntGauge, Opts, Registry, TextEncoder,
};

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // TRANSPORT METRICS (Component 2)
    // =========================================================================

    /// Complete frames handed to the consumer
    pub static ref FRAMES_RECEIVED: IntCounter = IntCounter::new(
        "spa_transport_frames_received_total",
        "Total number of well-formed frames received"
    ).expect("metric creation failed");

    /// Malformed frames discarded
    pub static ref FRAMES_DROPPED: IntCounter = IntCounter::new(
        "spa_transport_frames_dropped_total",
        "Total number of malformed frames dropped"
    ).expect("metric creation failed");

    /// Currently open inbound connections
    pub static ref CONNECTIONS_ACTIVE: IntGauge = IntGauge::new(
        "spa_transport_connections_active",
        "Number of currently open inbound connections"
    ).expect("metric creation failed");

    // =========================================================================
    // QUEUE METRICS (Component 3)
    // =========================================================================

    /// Items waiting for a worker
    pub static ref QUEUE_DEPTH: IntGauge = IntGauge::new(
        "spa_queue_depth",
        "Number of work items waiting for a worker"
    ).expect("metric creation failed");

    /// Items rejected by a bounded queue
    pub static ref QUEUE_REJECTED: IntCounter = IntCounter::new(
        "spa_queue_rejected_total",
        "Total number of work items rejected by a full queue"
    ).expect("metric creation failed");

    // =========================================================================
    // LIFECYCLE METRICS (Component 4)
    // =========================================================================

    /// Transactions by action and outcome
    pub static ref TRANSACTIONS_PROCESSED: IntCounterVec = IntCounterVec::new(
        Opts::new("spa_lifecycle_transactions_total", "Transactions processed"),
        &["action", "outcome"]  // outcome: applied/already_applied/validated/business/infrastructure/...
    ).expect("metric creation failed");

    /// Time from dequeue to reply
    pub static ref TRANSACTION_DURATION: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "spa_lifecycle_transaction_duration_seconds",
            "Time spent processing a transaction"
        ).buckets(exponential_buckets(0.001, 2.0, 15).expect("valid buckets"))
    ).expect("metric creation failed");

    // =========================================================================
    // ROUTER METRICS (Component 5)
    // =========================================================================

    /// Replies written to the router connection
    pub static ref REPLIES_SENT: IntCounter = IntCounter::new(
        "spa_router_replies_sent_total",
        "Total number of replies delivered"
    ).expect("metric creation failed");

    /// Replies that could not be delivered
    pub static ref REPLY_FAILURES: IntCounter = IntCounter::new(
        "spa_router_reply_failures_total",
        "Total number of replies that exhausted their send attempts"
    ).expect("metric creation failed");

    /// Seconds since the process started (set by the runtime)
    pub static ref UPTIME: Gauge = Gauge::new(
        "spa_uptime_seconds",
        "Seconds since the gateway started"
    ).expect("metric creation failed");
}

/// Register all metrics with the global registry.
///
/// Safe to call more than once; already registered metrics are skipped.
pub fn register_metrics() -> Result<(), TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        // Transport
        Box::new(FRAMES_RECEIVED.clone()),
        Box::new(FRAMES_DROPPED.clone()),
        Box::new(CONNECTIONS_ACTIVE.clone()),
        // Queue
        Box::new(QUEUE_DEPTH.clone()),
        Box::new(QUEUE_REJECTED.clone()),
        // Lifecycle
        Box::new(TRANSACTIONS_PROCESSED.clone()),
        Box::new(TRANSACTION_DURATION.clone()),
        // Router
        Box::new(REPLIES_SENT.clone()),
        Box::new(REPLY_FAILURES.clone()),
        Box::new(UPTIME.clone()),
    ];

    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }
    Ok(())
}

/// Encode all metrics as Prometheus text format.
pub fn render_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

/// Counts one processed transaction.
pub fn record_transaction(action: &str, outcome: &str, seconds: f64) {
    TRANSACTIONS_PROCESSED
        .with_label_values(&[action, outcome])
        .inc();
    TRANSACTION_DURATION.observe(seconds);
}

/// Counts one reply attempt.
pub fn record_reply(delivered: bool) {
    if delivered {
        REPLIES_SENT.inc();
    } else {
        REPLY_FAILURES.inc();
    }
}
