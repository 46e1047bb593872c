//! Filter state and the record predicate it compiles to
//!
//! The same [`Predicate`] backs the interactive filter engine and the
//! retrieval query, so both always agree on what "matches" means.

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::types::{LogLevel, LogRecord};

/// How the level test and the search test combine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CombineMode {
    #[default]
    #[serde(alias = "AND")]
    And,
    #[serde(alias = "OR")]
    Or,
}

impl CombineMode {
    pub fn toggled(self) -> Self {
        match self {
            CombineMode::And => CombineMode::Or,
            CombineMode::Or => CombineMode::And,
        }
    }

    /// Operator shown in the filter bar
    pub fn symbol(&self) -> &'static str {
        match self {
            CombineMode::And => "&&",
            CombineMode::Or => "||",
        }
    }
}

/// User-controlled filter settings
///
/// Only changed by explicit user actions, never by the streaming path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState {
    pub active_levels: BTreeSet<LogLevel>,
    pub search_query: String,
    pub use_regex: bool,
    pub combine_mode: CombineMode,
}

impl Default for FilterState {
    fn default() -> Self {
        Self::with_levels([LogLevel::Info, LogLevel::Warn, LogLevel::Error])
    }
}

impl FilterState {
    pub fn with_levels(levels: impl IntoIterator<Item = LogLevel>) -> Self {
        Self {
            active_levels: levels.into_iter().collect(),
            search_query: String::new(),
            use_regex: false,
            combine_mode: CombineMode::And,
        }
    }

    /// A non-blank query activates the search half of the predicate
    pub fn has_search(&self) -> bool {
        !self.search_query.trim().is_empty()
    }

    pub fn toggle_level(&mut self, level: LogLevel) {
        if !self.active_levels.remove(&level) {
            self.active_levels.insert(level);
        }
    }

    pub fn is_level_active(&self, level: LogLevel) -> bool {
        self.active_levels.contains(&level)
    }

    /// Toggle AND/OR. Inert without a search query; returns whether it changed.
    pub fn toggle_combine_mode(&mut self) -> bool {
        if !self.has_search() {
            return false;
        }
        self.combine_mode = self.combine_mode.toggled();
        true
    }

    pub fn compile(&self) -> Predicate {
        Predicate {
            levels: self.active_levels.clone(),
            search: SearchMatcher::new(&self.search_query, self.use_regex),
            combine_mode: self.combine_mode,
        }
    }
}

/// Compiled search half of the predicate
#[derive(Debug, Clone)]
pub enum SearchMatcher {
    /// Blank query
    Inactive,
    /// Case-insensitive substring, stored lowercased
    Substring(String),
    /// Case-insensitive regex
    Pattern(Regex),
}

impl SearchMatcher {
    /// Compile a query. An invalid regex silently becomes a substring search.
    pub fn new(query: &str, use_regex: bool) -> Self {
        if query.trim().is_empty() {
            return SearchMatcher::Inactive;
        }
        if use_regex {
            match RegexBuilder::new(query).case_insensitive(true).build() {
                Ok(re) => return SearchMatcher::Pattern(re),
                Err(e) => {
                    tracing::debug!("search pattern {query:?} is not a valid regex: {e}");
                }
            }
        }
        SearchMatcher::Substring(query.to_lowercase())
    }

    pub fn is_active(&self) -> bool {
        !matches!(self, SearchMatcher::Inactive)
    }

    pub fn is_match(&self, text: &str) -> bool {
        match self {
            SearchMatcher::Inactive => true,
            SearchMatcher::Substring(needle) => text.to_lowercase().contains(needle.as_str()),
            SearchMatcher::Pattern(re) => re.is_match(text),
        }
    }

    /// Byte ranges of every match in `text`, for highlighting
    pub fn find_ranges(&self, text: &str) -> Vec<(usize, usize)> {
        match self {
            SearchMatcher::Inactive => Vec::new(),
            SearchMatcher::Pattern(re) => re
                .find_iter(text)
                .filter(|m| !m.is_empty())
                .map(|m| (m.start(), m.end()))
                .collect(),
            SearchMatcher::Substring(needle) => {
                // Lowercasing can change byte lengths; only highlight when it doesn't.
                let lower = text.to_lowercase();
                if lower.len() != text.len() {
                    return Vec::new();
                }
                lower
                    .match_indices(needle.as_str())
                    .map(|(start, m)| (start, start + m.len()))
                    .collect()
            }
        }
    }
}

/// A compiled [`FilterState`]
#[derive(Debug, Clone)]
pub struct Predicate {
    levels: BTreeSet<LogLevel>,
    search: SearchMatcher,
    combine_mode: CombineMode,
}

impl Predicate {
    pub fn matches(&self, record: &LogRecord) -> bool {
        let level_ok = self.levels.contains(&record.level);
        if !self.search.is_active() {
            return level_ok;
        }
        match self.combine_mode {
            CombineMode::And => level_ok && self.search.is_match(&record.message),
            CombineMode::Or => level_ok || self.search.is_match(&record.message),
        }
    }

    pub fn search(&self) -> &SearchMatcher {
        &self.search
    }
}
