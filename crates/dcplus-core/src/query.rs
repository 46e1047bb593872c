//! Retrieval queries over a record snapshot
//!
//! Used by `dcplus query` to answer questions about the persisted log from
//! outside the interactive console. Matching goes through the same
//! [`Predicate`](crate::filter::Predicate) as the console's filter bar.

use serde::{Deserialize, Serialize};

use crate::filter::{CombineMode, FilterState};
use crate::types::{LogLevel, LogRecord};

/// Records returned when no limit is given
pub const DEFAULT_QUERY_LIMIT: usize = 100;

fn default_tail() -> bool {
    true
}

fn default_limit() -> usize {
    DEFAULT_QUERY_LIMIT
}

/// Query parameters. Every field is optional on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRequest {
    /// Levels to include; absent or empty means all levels
    #[serde(default)]
    pub levels: Option<Vec<LogLevel>>,

    #[serde(default)]
    pub search: Option<String>,

    /// Treat `search` as a case-insensitive regex
    #[serde(default)]
    pub regex: bool,

    #[serde(default)]
    pub logic: CombineMode,

    /// Newest first
    #[serde(default = "default_tail")]
    pub tail: bool,

    /// Maximum records returned; 0 means [`DEFAULT_QUERY_LIMIT`]
    #[serde(default = "default_limit")]
    pub limit: usize,
}

impl Default for QueryRequest {
    fn default() -> Self {
        Self {
            levels: None,
            search: None,
            regex: false,
            logic: CombineMode::And,
            tail: default_tail(),
            limit: default_limit(),
        }
    }
}

impl QueryRequest {
    /// Equivalent interactive filter state
    pub fn filter_state(&self) -> FilterState {
        let levels: Vec<LogLevel> = match &self.levels {
            Some(levels) if !levels.is_empty() => levels.clone(),
            _ => LogLevel::ALL.to_vec(),
        };
        let mut state = FilterState::with_levels(levels);
        state.search_query = self.search.clone().unwrap_or_default();
        state.use_regex = self.regex;
        state.combine_mode = self.logic;
        state
    }

    /// Limit actually applied
    pub fn effective_limit(&self) -> usize {
        match self.limit {
            0 => DEFAULT_QUERY_LIMIT,
            limit => limit,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryResponse {
    /// Records in the snapshot
    pub total: usize,
    /// Records matching the predicate, before the limit
    pub filtered: usize,
    /// Records in `logs`
    pub returned: usize,
    pub logs: Vec<LogRecord>,
}

/// Filter, order by timestamp, and truncate.
pub fn run_query(records: &[LogRecord], request: &QueryRequest) -> QueryResponse {
    let predicate = request.filter_state().compile();
    let mut matched: Vec<&LogRecord> = records.iter().filter(|r| predicate.matches(r)).collect();
    let filtered = matched.len();

    if request.tail {
        matched.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    } else {
        matched.sort_by_key(|r| r.timestamp);
    }
    matched.truncate(request.effective_limit());

    let logs: Vec<LogRecord> = matched.into_iter().cloned().collect();
    QueryResponse {
        total: records.len(),
        filtered,
        returned: logs.len(),
        logs,
    }
}
