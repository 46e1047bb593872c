//! Debounced snapshot persistence
//!
//! Appends only mark the snapshot dirty. The first append after a write arms
//! a deadline one window away; later appends inside that window ride along,
//! so a burst costs one write. The event loop polls [`SnapshotScheduler::is_due`]
//! and sleeps for [`SnapshotScheduler::time_until_write`] in between.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use dcplus_core::prelude::*;
use dcplus_core::{write_snapshot, LogRecord};

/// Default coalescing window
pub const DEFAULT_WRITE_WINDOW: Duration = Duration::from_millis(500);

#[derive(Debug)]
pub struct SnapshotScheduler {
    /// `None` disables persistence entirely
    path: Option<PathBuf>,
    window: Duration,
    deadline: Option<Instant>,
    writes: u64,
    failures: u64,
}

impl SnapshotScheduler {
    pub fn new(path: impl Into<PathBuf>, window: Duration) -> Self {
        Self {
            path: Some(path.into()),
            window,
            deadline: None,
            writes: 0,
            failures: 0,
        }
    }

    pub fn disabled() -> Self {
        Self {
            path: None,
            window: DEFAULT_WRITE_WINDOW,
            deadline: None,
            writes: 0,
            failures: 0,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Arm the deadline unless a write is already pending.
    pub fn mark_dirty(&mut self, now: Instant) {
        if self.path.is_some() && self.deadline.is_none() {
            self.deadline = Some(now + self.window);
        }
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn is_due(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|d| now >= d)
    }

    /// Time until the pending write (for event loop timing)
    pub fn time_until_write(&self, now: Instant) -> Option<Duration> {
        self.deadline.map(|d| d.saturating_duration_since(now))
    }

    /// Write if the window has elapsed. Returns whether a write was attempted.
    pub fn write_if_due<'a>(
        &mut self,
        now: Instant,
        records: impl IntoIterator<Item = &'a LogRecord>,
    ) -> bool {
        if !self.is_due(now) {
            return false;
        }
        // Failures are logged inside; the next append re-arms the window.
        let _ = self.write_now(records);
        true
    }

    /// Write immediately, bypassing the window.
    pub fn write_now<'a>(&mut self, records: impl IntoIterator<Item = &'a LogRecord>) -> Result<()> {
        self.deadline = None;
        let Some(path) = self.path.as_deref() else {
            return Ok(());
        };
        match write_snapshot(path, records) {
            Ok(()) => {
                self.writes += 1;
                Ok(())
            }
            Err(e) => {
                self.failures += 1;
                error!("Failed to persist log snapshot: {}", e);
                Err(e)
            }
        }
    }

    pub fn writes(&self) -> u64 {
        self.writes
    }

    pub fn failures(&self) -> u64 {
        self.failures
    }
}
