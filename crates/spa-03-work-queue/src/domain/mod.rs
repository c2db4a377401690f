//! Queue domain types.

pub mod config;
pub mod errors;
pub mod work_item;

pub use config::{QueueConfig, QueueMode};
pub use errors::QueueError;
pub use work_item::WorkItem;
