//! Bounded, ordered record store
//!
//! Records are kept in arrival order and never re-sorted. Every record gets
//! a sequence number that keeps counting across evictions, so readers can
//! remember "how far they got" with a single `u64` even while the front of
//! the store is being dropped.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use dcplus_core::prelude::*;
use dcplus_core::LogRecord;

use super::group::resolve_last;
use super::persist::SnapshotScheduler;

/// Default maximum number of records
pub const DEFAULT_MAX_LOGS: usize = 10_000;

/// What an append changed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppendOutcome {
    /// Ids of records evicted from the front, oldest first
    pub evicted: Vec<String>,
}

#[derive(Debug)]
pub struct LogStore {
    records: VecDeque<LogRecord>,
    max_logs: usize,
    /// Sequence number of `records[0]`
    first_seq: u64,
    /// Bumped whenever the contents are replaced wholesale
    generation: u64,
    persist: SnapshotScheduler,
}

impl LogStore {
    pub fn new(max_logs: usize, persist: SnapshotScheduler) -> Self {
        Self {
            records: VecDeque::with_capacity(max_logs.min(1024)),
            max_logs: max_logs.max(1),
            first_seq: 0,
            generation: 0,
            persist,
        }
    }

    /// An unpersisted store, for tests and one-off pipelines
    pub fn in_memory(max_logs: usize) -> Self {
        Self::new(max_logs, SnapshotScheduler::disabled())
    }

    // ─────────────────────────────────────────────────────────
    // Mutation
    // ─────────────────────────────────────────────────────────

    /// Append a record, resolve group levels, then evict past the bound.
    pub fn append(&mut self, record: LogRecord) -> AppendOutcome {
        self.append_at(record, Instant::now())
    }

    pub fn append_at(&mut self, record: LogRecord, now: Instant) -> AppendOutcome {
        self.records.push_back(record);
        resolve_last(&mut self.records);

        let mut evicted = Vec::new();
        while self.records.len() > self.max_logs {
            if let Some(old) = self.records.pop_front() {
                self.first_seq += 1;
                evicted.push(old.id);
            }
        }

        self.persist.mark_dirty(now);
        AppendOutcome { evicted }
    }

    /// Drop everything for a new session. Persisted on the normal schedule.
    pub fn reset(&mut self) -> Vec<String> {
        let removed = self.take_all();
        self.persist.mark_dirty(Instant::now());
        removed
    }

    /// User-requested clear, persisted immediately.
    pub fn clear(&mut self) -> Vec<String> {
        let removed = self.take_all();
        let _ = self.persist.write_now(&self.records);
        removed
    }

    /// Replace the contents with already-classified records (bulk load).
    ///
    /// Records keep their stored levels; only the newest `max_logs` are kept.
    pub fn replace(&mut self, records: Vec<LogRecord>) -> Vec<String> {
        let removed = self.take_all();
        let skip = records.len().saturating_sub(self.max_logs);
        if skip > 0 {
            warn!("Loaded {} records, keeping the newest {}", records.len(), self.max_logs);
        }
        self.records.extend(records.into_iter().skip(skip));
        let _ = self.persist.write_now(&self.records);
        removed
    }

    fn take_all(&mut self) -> Vec<String> {
        self.first_seq += self.records.len() as u64;
        self.generation += 1;
        self.records.drain(..).map(|r| r.id).collect()
    }

    // ─────────────────────────────────────────────────────────
    // Persistence
    // ─────────────────────────────────────────────────────────

    /// Write the snapshot if the window elapsed. Returns whether it tried.
    pub fn poll_persist(&mut self, now: Instant) -> bool {
        self.persist.write_if_due(now, &self.records)
    }

    pub fn time_until_persist(&self, now: Instant) -> Option<Duration> {
        self.persist.time_until_write(now)
    }

    /// Synchronous final write on teardown
    pub fn flush(&mut self) -> Result<()> {
        if !self.persist.is_pending() {
            return Ok(());
        }
        self.persist.write_now(&self.records)
    }

    pub fn scheduler(&self) -> &SnapshotScheduler {
        &self.persist
    }

    // ─────────────────────────────────────────────────────────
    // Access
    // ─────────────────────────────────────────────────────────

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn max_logs(&self) -> usize {
        self.max_logs
    }

    pub fn get(&self, index: usize) -> Option<&LogRecord> {
        self.records.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &LogRecord> {
        self.records.iter()
    }

    pub fn first(&self) -> Option<&LogRecord> {
        self.records.front()
    }

    /// Sequence number of the oldest record still stored
    pub fn first_seq(&self) -> u64 {
        self.first_seq
    }

    /// Sequence number the next append will get
    pub fn next_seq(&self) -> u64 {
        self.first_seq + self.records.len() as u64
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// First sequence number whose level may still change.
    ///
    /// Only the trailing run of group `start` records can be back-patched;
    /// everything before it is final. Equals [`LogStore::next_seq`] when the
    /// newest record is not a start marker.
    pub fn unsettled_seq(&self) -> u64 {
        let run = self
            .records
            .iter()
            .rev()
            .take_while(|r| r.group.is_some_and(|g| g.is_start()))
            .count();
        self.next_seq() - run as u64
    }

    pub fn get_by_seq(&self, seq: u64) -> Option<&LogRecord> {
        let offset = seq.checked_sub(self.first_seq)?;
        self.records.get(usize::try_from(offset).ok()?)
    }

    /// Records from `seq` onward, clamped to what is still stored
    pub fn iter_from_seq(&self, seq: u64) -> impl Iterator<Item = (u64, &LogRecord)> {
        let start = seq.max(self.first_seq);
        let skip = (start - self.first_seq) as usize;
        self.records
            .iter()
            .skip(skip)
            .enumerate()
            .map(move |(i, r)| (start + i as u64, r))
    }
}
