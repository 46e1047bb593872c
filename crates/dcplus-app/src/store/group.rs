//! Group level inheritance
//!
//! Adapter groups arrive as a `start` line, content lines, and an `end` line.
//! Boundary lines are usually decoration (`┌───`, `└───`) that classify as
//! info, so they take their level from the content they frame:
//!
//! - an unmarked line back-patches the run of `start` lines directly before it
//! - an `end` line copies the level of the nearest content line before it
//!
//! Both patches are local: they stop at the first record that breaks the run.
//! A record can therefore only change while it sits in the trailing run of
//! `start` lines; [`LogStore::unsettled_seq`](super::LogStore::unsettled_seq)
//! reports where that run begins so readers can re-check it.

use dcplus_core::LogRecord;
use std::collections::VecDeque;

/// Resolve levels around the most recently appended record.
///
/// Must run before the record becomes visible to filtering.
pub fn resolve_last(records: &mut VecDeque<LogRecord>) {
    let Some(last_idx) = records.len().checked_sub(1) else {
        return;
    };

    let marker = records[last_idx].group;
    match marker {
        Some(marker) if marker.is_start() => {}
        Some(_) => {
            // `end`: inherit from the nearest content line
            let inherited = records
                .iter()
                .rev()
                .skip(1)
                .find(|r| r.is_content())
                .map(|r| r.level);
            if let Some(level) = inherited {
                records[last_idx].level = level;
            }
        }
        None => {
            let level = records[last_idx].level;
            for record in records.iter_mut().rev().skip(1) {
                match record.group {
                    Some(marker) if marker.is_start() => record.level = level,
                    _ => break,
                }
            }
        }
    }
}
