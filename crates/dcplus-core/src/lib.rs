//! # dcplus-core - Core Domain Types
//!
//! Foundation crate for Debug Console Plus. Provides the log record model,
//! line classification, the filter predicate, retrieval queries, the
//! persisted snapshot format, error handling and logging setup.
//!
//! This crate has **zero internal dependencies**.
//!
//! ## Public API
//!
//! ### Domain Types (`types`)
//! - [`LogRecord`] - A classified output line
//! - [`LogLevel`] - Severity (Debug, Info, Warn, Error)
//! - [`GroupMarker`] - Adapter-supplied group boundary
//! - [`TimestampMode`] - How timestamps are displayed
//!
//! ### Classification (`classify`)
//! - [`classify()`] - Raw line + metadata into a [`LogRecord`]
//! - [`LEVEL_MATCHERS`] - Ordered level heuristics
//!
//! ### Filtering (`filter`, `query`)
//! - [`FilterState`] / [`Predicate`] - User filter and its compiled form
//! - [`run_query()`] - Retrieval query over a record slice
//!
//! ### Protocol (`events`)
//! - [`InboundEvent`] - Output and session lifecycle events
//! - [`parse_protocol_message()`] - JSON protocol message parsing
//!
//! ### Persistence (`snapshot`)
//! - [`write_snapshot()`] / [`read_snapshot()`] - Locked JSON snapshot IO
//! - [`validate_entries()`] - Bulk load validation
//!
//! ## Prelude
//!
//! ```rust
//! use dcplus_core::prelude::*;
//! ```

pub mod ansi;
pub mod classify;
pub mod display;
pub mod error;
pub mod events;
pub mod filter;
pub mod logging;
pub mod prelude;
pub mod query;
pub mod snapshot;
pub mod types;

// Re-export commonly used types at crate root for convenience
pub use ansi::{contains_ansi_codes, strip_ansi_codes};
pub use classify::{classify, clean_message, detect_level, LineSubject, LEVEL_MATCHERS};
pub use display::{compact_message, tag_ranges};
pub use error::{Error, Result, ResultExt};
pub use events::{parse_protocol_message, InboundEvent, OutputEvent};
pub use filter::{CombineMode, FilterState, Predicate, SearchMatcher};
pub use query::{run_query, QueryRequest, QueryResponse, DEFAULT_QUERY_LIMIT};
pub use snapshot::{
    parse_entries, read_snapshot, read_snapshot_text, snapshot_path,
    validate_entries, write_snapshot, LoadReport, SNAPSHOT_DIR, SNAPSHOT_FILE,
};
pub use types::{GroupMarker, LogLevel, LogRecord, TimestampMode};
