//! Filtered view maintenance
//!
//! The engine holds the sequence numbers of matching records, in store
//! order. Filter changes and store resets rebuild it from scratch; at steady
//! state [`FilterEngine::sync`] only evaluates records appended since the
//! last sync and drops matches whose records were evicted. Group start lines
//! at the tail can still be back-patched after they were evaluated, so sync
//! also re-checks that run and retracts matches whose membership changed.
//! Either way the result equals a full recompute over the current store.

use std::collections::VecDeque;

use dcplus_core::{FilterState, LogRecord, Predicate};

use crate::store::LogStore;

/// How the filtered sequence changed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterChange {
    /// Rebuilt; indices from before are meaningless
    Reset,
    /// `evicted` entries left the front, `retracted` left the back, then
    /// `appended` joined the back
    Updated {
        evicted: usize,
        retracted: usize,
        appended: usize,
    },
}

impl FilterChange {
    pub fn is_noop(&self) -> bool {
        matches!(
            self,
            FilterChange::Updated {
                evicted: 0,
                retracted: 0,
                appended: 0
            }
        )
    }
}

#[derive(Debug)]
pub struct FilterEngine {
    state: FilterState,
    predicate: Predicate,
    matches: VecDeque<u64>,
    synced_generation: u64,
    /// Store records below this sequence number have been evaluated
    synced_seq: u64,
    /// Evaluated records from here on may have been re-leveled since
    unsettled_seq: u64,
}

impl FilterEngine {
    pub fn new(state: FilterState) -> Self {
        let predicate = state.compile();
        Self {
            state,
            predicate,
            matches: VecDeque::new(),
            synced_generation: 0,
            synced_seq: 0,
            unsettled_seq: 0,
        }
    }

    pub fn state(&self) -> &FilterState {
        &self.state
    }

    pub fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    /// Apply a user filter change and rebuild.
    ///
    /// Returns `None` when the edit left the state unchanged.
    pub fn update_state(
        &mut self,
        store: &LogStore,
        edit: impl FnOnce(&mut FilterState),
    ) -> Option<FilterChange> {
        let mut next = self.state.clone();
        edit(&mut next);
        if next == self.state {
            return None;
        }
        self.state = next;
        self.predicate = self.state.compile();
        Some(self.full_recompute(store))
    }

    /// Evaluate every stored record.
    pub fn full_recompute(&mut self, store: &LogStore) -> FilterChange {
        self.matches = store
            .iter_from_seq(store.first_seq())
            .filter(|(_, r)| self.predicate.matches(r))
            .map(|(seq, _)| seq)
            .collect();
        self.synced_generation = store.generation();
        self.synced_seq = store.next_seq();
        self.unsettled_seq = store.unsettled_seq();
        FilterChange::Reset
    }

    /// Catch up with the store.
    ///
    /// Falls back to a full recompute after a store reset.
    pub fn sync(&mut self, store: &LogStore) -> FilterChange {
        if store.generation() != self.synced_generation {
            return self.full_recompute(store);
        }

        let first_seq = store.first_seq();
        let mut evicted = 0;
        while self.matches.front().is_some_and(|&seq| seq < first_seq) {
            self.matches.pop_front();
            evicted += 1;
        }

        // Nothing new means nothing was patched either
        let resume = if store.next_seq() > self.synced_seq {
            self.unsettled_seq.max(first_seq)
        } else {
            self.synced_seq
        };

        let predicate = &self.predicate;
        let tail: Vec<u64> = store
            .iter_from_seq(resume)
            .filter(|(_, r)| predicate.matches(r))
            .map(|(seq, _)| seq)
            .collect();

        // Keep the re-checked prefix that still matches
        let kept_from = self.matches.partition_point(|&seq| seq < resume);
        let common = self
            .matches
            .range(kept_from..)
            .zip(&tail)
            .take_while(|(old, new)| old == new)
            .count();
        let retracted = self.matches.len() - kept_from - common;
        self.matches.truncate(kept_from + common);
        self.matches.extend(&tail[common..]);

        self.synced_seq = store.next_seq();
        self.unsettled_seq = store.unsettled_seq();

        FilterChange::Updated {
            evicted,
            retracted,
            appended: tail.len() - common,
        }
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn seq_at(&self, index: usize) -> Option<u64> {
        self.matches.get(index).copied()
    }

    /// Position of a store sequence number in the filtered sequence
    pub fn index_of_seq(&self, seq: u64) -> Option<usize> {
        self.matches.binary_search(&seq).ok()
    }

    pub fn seqs(&self) -> impl Iterator<Item = u64> + '_ {
        self.matches.iter().copied()
    }

    pub fn view<'a>(&'a self, store: &'a LogStore) -> FilteredView<'a> {
        FilteredView {
            engine: self,
            store,
        }
    }
}

/// Read access to the filtered records
#[derive(Clone, Copy)]
pub struct FilteredView<'a> {
    engine: &'a FilterEngine,
    store: &'a LogStore,
}

impl<'a> FilteredView<'a> {
    pub fn len(&self) -> usize {
        self.engine.len()
    }

    pub fn is_empty(&self) -> bool {
        self.engine.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&'a LogRecord> {
        let seq = self.engine.seq_at(index)?;
        self.store.get_by_seq(seq)
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a LogRecord> + 'a {
        let store = self.store;
        self.engine
            .matches
            .iter()
            .filter_map(move |&seq| store.get_by_seq(seq))
    }

    pub fn range(&self, start: usize, end: usize) -> impl Iterator<Item = &'a LogRecord> + 'a {
        let store = self.store;
        let end = end.min(self.engine.len());
        self.engine
            .matches
            .range(start.min(end)..end)
            .filter_map(move |&seq| store.get_by_seq(seq))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dcplus_core::{CombineMode, GroupMarker, LogLevel};
    use proptest::prelude::*;

    fn rec(n: u32, level: LogLevel, message: &str) -> LogRecord {
        grouped(n, level, message, None)
    }

    fn grouped(n: u32, level: LogLevel, message: &str, group: Option<GroupMarker>) -> LogRecord {
        LogRecord {
            id: format!("s-{n}"),
            timestamp: i64::from(n),
            level,
            message: message.into(),
            category: "stdout".into(),
            session_id: "s".into(),
            group,
        }
    }

    fn errors_only() -> FilterState {
        FilterState::with_levels([LogLevel::Error])
    }

    fn reference(store: &LogStore, state: &FilterState) -> Vec<u64> {
        let predicate = state.compile();
        store
            .iter_from_seq(0)
            .filter(|(_, r)| predicate.matches(r))
            .map(|(seq, _)| seq)
            .collect()
    }

    #[test]
    fn test_incremental_append() {
        let mut store = LogStore::in_memory(100);
        let mut engine = FilterEngine::new(FilterState::default());
        store.append(rec(0, LogLevel::Info, "a"));
        store.append(rec(1, LogLevel::Debug, "b"));
        assert_eq!(
            engine.sync(&store),
            FilterChange::Updated {
                evicted: 0,
                retracted: 0,
                appended: 1
            }
        );
        store.append(rec(2, LogLevel::Error, "c"));
        assert_eq!(
            engine.sync(&store),
            FilterChange::Updated {
                evicted: 0,
                retracted: 0,
                appended: 1
            }
        );
        let ids: Vec<_> = engine.view(&store).iter().map(|r| r.id.clone()).collect();
        assert_eq!(ids, ["s-0", "s-2"]);
    }

    #[test]
    fn test_back_patched_start_joins_filtered_view() {
        let mut store = LogStore::in_memory(10);
        let mut engine = FilterEngine::new(errors_only());

        store.append(grouped(0, LogLevel::Info, "┌────", Some(GroupMarker::Start)));
        engine.sync(&store);
        assert!(engine.is_empty());

        store.append(rec(1, LogLevel::Error, "error: boom"));
        assert_eq!(
            engine.sync(&store),
            FilterChange::Updated {
                evicted: 0,
                retracted: 0,
                appended: 2
            }
        );

        store.append(grouped(2, LogLevel::Info, "└────", Some(GroupMarker::End)));
        engine.sync(&store);
        assert_eq!(engine.seqs().collect::<Vec<_>>(), [0, 1, 2]);
        assert_eq!(engine.seqs().collect::<Vec<_>>(), reference(&store, &errors_only()));
    }

    #[test]
    fn test_back_patched_start_leaves_filtered_view() {
        let mut store = LogStore::in_memory(10);
        let mut engine = FilterEngine::new(errors_only());

        store.append(rec(0, LogLevel::Error, "error: first"));
        store.append(grouped(1, LogLevel::Error, "[error] group", Some(GroupMarker::Start)));
        engine.sync(&store);
        assert_eq!(engine.len(), 2);

        store.append(rec(2, LogLevel::Info, "calm"));
        assert_eq!(
            engine.sync(&store),
            FilterChange::Updated {
                evicted: 0,
                retracted: 1,
                appended: 0
            }
        );
        assert_eq!(engine.seqs().collect::<Vec<_>>(), [0]);
    }

    #[test]
    fn test_sync_without_changes_is_noop() {
        let store = LogStore::in_memory(10);
        let mut engine = FilterEngine::new(FilterState::default());
        assert!(engine.sync(&store).is_noop());
    }

    #[test]
    fn test_eviction_drops_front_matches() {
        let mut store = LogStore::in_memory(2);
        let mut engine = FilterEngine::new(FilterState::default());
        store.append(rec(0, LogLevel::Info, "a"));
        store.append(rec(1, LogLevel::Info, "b"));
        engine.sync(&store);
        store.append(rec(2, LogLevel::Info, "c"));
        assert_eq!(
            engine.sync(&store),
            FilterChange::Updated {
                evicted: 1,
                retracted: 0,
                appended: 1
            }
        );
        assert_eq!(engine.view(&store).get(0).unwrap().id, "s-1");
    }

    #[test]
    fn test_store_reset_forces_full_recompute() {
        let mut store = LogStore::in_memory(10);
        let mut engine = FilterEngine::new(FilterState::default());
        store.append(rec(0, LogLevel::Info, "a"));
        engine.sync(&store);
        store.reset();
        store.append(rec(1, LogLevel::Info, "b"));
        assert_eq!(engine.sync(&store), FilterChange::Reset);
        assert_eq!(engine.len(), 1);
    }

    #[test]
    fn test_update_state_rebuilds() {
        let mut store = LogStore::in_memory(10);
        let mut engine = FilterEngine::new(FilterState::default());
        store.append(rec(0, LogLevel::Debug, "a"));
        engine.sync(&store);
        assert!(engine.is_empty());

        let change = engine.update_state(&store, |s| s.toggle_level(LogLevel::Debug));
        assert_eq!(change, Some(FilterChange::Reset));
        assert_eq!(engine.len(), 1);
    }

    #[test]
    fn test_same_state_twice_is_idempotent() {
        let mut store = LogStore::in_memory(10);
        for n in 0..6 {
            store.append(rec(n, LogLevel::ALL[n as usize % 4], "x"));
        }
        let mut engine = FilterEngine::new(FilterState::default());
        engine.full_recompute(&store);
        let first: Vec<_> = engine.seqs().collect();

        assert_eq!(engine.update_state(&store, |_| {}), None);
        engine.full_recompute(&store);
        assert_eq!(engine.seqs().collect::<Vec<_>>(), first);
    }

    #[test]
    fn test_index_of_seq() {
        let mut store = LogStore::in_memory(10);
        let mut engine = FilterEngine::new(FilterState::default());
        store.append(rec(0, LogLevel::Info, "a"));
        store.append(rec(1, LogLevel::Debug, "b"));
        store.append(rec(2, LogLevel::Info, "c"));
        engine.sync(&store);
        assert_eq!(engine.index_of_seq(2), Some(1));
        assert_eq!(engine.index_of_seq(1), None);
    }

    #[test]
    fn test_view_range_clamps() {
        let mut store = LogStore::in_memory(10);
        let mut engine = FilterEngine::new(FilterState::default());
        for n in 0..3 {
            store.append(rec(n, LogLevel::Info, "a"));
        }
        engine.sync(&store);
        let view = engine.view(&store);
        assert_eq!(view.range(1, 10).count(), 2);
        assert_eq!(view.range(5, 2).count(), 0);
    }

    // ─────────────────────────────────────────────────────────
    // Property: incremental == full
    // ─────────────────────────────────────────────────────────

    fn arb_level() -> impl Strategy<Value = LogLevel> {
        prop::sample::select(LogLevel::ALL.to_vec())
    }

    fn arb_state() -> impl Strategy<Value = FilterState> {
        (
            prop::collection::btree_set(arb_level(), 0..=4),
            prop::sample::select(vec!["", "boom", "B", "o+m", "(", "  "]),
            any::<bool>(),
            prop::bool::ANY.prop_map(|or| if or { CombineMode::Or } else { CombineMode::And }),
        )
            .prop_map(|(levels, query, use_regex, combine_mode)| FilterState {
                active_levels: levels,
                search_query: query.to_string(),
                use_regex,
                combine_mode,
            })
    }

    fn arb_group() -> impl Strategy<Value = Option<GroupMarker>> {
        prop::sample::select(vec![
            None,
            None,
            Some(GroupMarker::Start),
            Some(GroupMarker::StartCollapsed),
            Some(GroupMarker::End),
        ])
    }

    type ArbRecord = (LogLevel, &'static str, Option<GroupMarker>);

    fn arb_records() -> impl Strategy<Value = Vec<ArbRecord>> {
        prop::collection::vec(
            (
                arb_level(),
                prop::sample::select(vec!["boom", "BOOM!", "quiet", "bo", "oom", "(x)"]),
                arb_group(),
            ),
            0..60,
        )
    }

    proptest! {
        #[test]
        fn prop_incremental_matches_full(
            state in arb_state(),
            records in arb_records(),
            sync_points in prop::collection::vec(any::<bool>(), 60),
            max_logs in 1usize..20,
        ) {
            let mut store = LogStore::in_memory(max_logs);
            let mut engine = FilterEngine::new(state.clone());

            for (n, (level, message, group)) in records.iter().enumerate() {
                store.append(grouped(n as u32, *level, message, *group));
                if sync_points[n] {
                    engine.sync(&store);
                    prop_assert_eq!(engine.seqs().collect::<Vec<_>>(), reference(&store, &state));
                }
            }
            engine.sync(&store);
            prop_assert_eq!(engine.seqs().collect::<Vec<_>>(), reference(&store, &state));
        }

        #[test]
        fn prop_state_change_then_stream_matches_full(
            first in arb_state(),
            second in arb_state(),
            records in arb_records(),
            split in 0usize..60,
        ) {
            let mut store = LogStore::in_memory(25);
            let mut engine = FilterEngine::new(first);

            for (n, (level, message, group)) in records.iter().enumerate() {
                if n == split {
                    let target = second.clone();
                    engine.update_state(&store, move |s| *s = target);
                }
                store.append(grouped(n as u32, *level, message, *group));
                engine.sync(&store);
            }
            let target = second.clone();
            engine.update_state(&store, move |s| *s = target);
            prop_assert_eq!(engine.seqs().collect::<Vec<_>>(), reference(&store, &second));
        }
    }
}
