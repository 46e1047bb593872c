//! Log storage: the bounded record store, group level resolution, and
//! debounced snapshot persistence.

pub mod group;
pub mod log_store;
pub mod persist;

pub use log_store::{AppendOutcome, LogStore, DEFAULT_MAX_LOGS};
pub use persist::{SnapshotScheduler, DEFAULT_WRITE_WINDOW};
