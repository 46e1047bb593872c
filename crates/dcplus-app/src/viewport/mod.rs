//! Variable-height virtual scrolling over the filtered view
//!
//! Only records near the scroll offset are measured and materialized. Every
//! other record contributes a cached height (or the default) to a
//! cumulative position index, so the total extent and scroll offset stay
//! correct without touching the whole list.
//!
//! Frame flow:
//! 1. store/filter changes reach [`VirtualViewport::apply_change`], which
//!    keeps the position index in step and marks a render pending
//! 2. the runner calls [`VirtualViewport::frame`] once per frame; it measures
//!    newly visible records, keeps the reading position anchored, and
//!    returns the window to draw

mod positions;


pub use positions::HeightIndex;

use std::collections::HashMap;

use dcplus_core::LogRecord;

use crate::filter_engine::{FilterChange, FilteredView};

/// Rows assumed for a record that has never been measured
pub const DEFAULT_ROW_HEIGHT: u16 = 1;

/// Records materialized beyond each edge of the visible window
pub const DEFAULT_BUFFER: usize = 10;

/// Rows from the bottom that still count as "at the bottom"
pub const DEFAULT_FOLLOW_THRESHOLD: u64 = 2;

const MAX_MEASURE_PASSES: usize = 4;

/// Measures how many rows a record occupies at a given width
pub trait HeightMeasurer {
    fn measure(&self, record: &LogRecord, width: u16) -> u16;
}

impl<F> HeightMeasurer for F
where
    F: Fn(&LogRecord, u16) -> u16,
{
    fn measure(&self, record: &LogRecord, width: u16) -> u16 {
        self(record, width)
    }
}

/// One materialized record in a [`RenderWindow`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowRow {
    /// Index into the filtered view
    pub index: usize,
    /// Top row in list coordinates
    pub top: u64,
    pub height: u16,
}

/// What to draw this frame
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RenderWindow {
    pub start: usize,
    pub end: usize,
    pub scroll_top: u64,
    pub total_height: u64,
    pub rows: Vec<WindowRow>,
}

impl RenderWindow {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug, Clone, Copy)]
struct Anchor {
    index: usize,
    top: u64,
}

#[derive(Debug)]
pub struct VirtualViewport {
    /// Measured heights by record id, valid for `width`
    measured: HashMap<String, u16>,
    index: HeightIndex,
    width: u16,
    height: u16,
    scroll_top: u64,
    auto_follow: bool,
    buffer: usize,
    follow_threshold: u64,
    render_pending: bool,
    force_render: bool,
    last_range: Option<(usize, usize)>,
    frames_rendered: u64,
    frames_skipped: u64,
}

impl Default for VirtualViewport {
    fn default() -> Self {
        Self::new(DEFAULT_BUFFER, DEFAULT_FOLLOW_THRESHOLD)
    }
}

impl VirtualViewport {
    pub fn new(buffer: usize, follow_threshold: u64) -> Self {
        Self {
            measured: HashMap::new(),
            index: HeightIndex::new(),
            width: 0,
            height: 0,
            scroll_top: 0,
            auto_follow: true,
            buffer,
            follow_threshold,
            render_pending: true,
            force_render: true,
            last_range: None,
            frames_rendered: 0,
            frames_skipped: 0,
        }
    }

    // ─────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────

    pub fn scroll_top(&self) -> u64 {
        self.scroll_top
    }

    pub fn total_height(&self) -> u64 {
        self.index.total()
    }

    pub fn container_height(&self) -> u16 {
        self.height
    }

    pub fn container_width(&self) -> u16 {
        self.width
    }

    pub fn is_following(&self) -> bool {
        self.auto_follow
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn positions(&self) -> &HeightIndex {
        &self.index
    }

    pub fn cached_height(&self, id: &str) -> Option<u16> {
        self.measured.get(id).copied()
    }

    pub fn cache_len(&self) -> usize {
        self.measured.len()
    }

    pub fn needs_render(&self) -> bool {
        self.render_pending
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    pub fn frames_skipped(&self) -> u64 {
        self.frames_skipped
    }

    fn max_scroll(&self) -> u64 {
        self.index.total().saturating_sub(u64::from(self.height))
    }

    /// Within the follow threshold of the bottom
    pub fn is_near_bottom(&self) -> bool {
        let remaining = self.index.total().saturating_sub(self.scroll_top);
        remaining <= u64::from(self.height) + self.follow_threshold
    }

    /// `[start, end)` including the buffer, for the current offset
    pub fn visible_range(&self) -> (usize, usize) {
        self.index
            .visible_range(self.scroll_top, u64::from(self.height), self.buffer)
    }

    /// Index of the first record actually on screen
    pub fn first_visible(&self) -> Option<usize> {
        self.index.index_at(self.scroll_top)
    }

    // ─────────────────────────────────────────────────────────
    // Scheduling
    // ─────────────────────────────────────────────────────────

    /// Coalesce into the next frame. `force` bypasses the selection guard.
    pub fn request_render(&mut self, force: bool) {
        self.render_pending = true;
        self.force_render |= force;
    }

    // ─────────────────────────────────────────────────────────
    // Store / filter changes
    // ─────────────────────────────────────────────────────────

    /// Bring the position index in step with the filtered view.
    pub fn apply_change(&mut self, change: FilterChange, view: &FilteredView<'_>) {
        match change {
            FilterChange::Reset => {
                self.rebuild(view);
                self.settle_scroll();
                self.request_render(true);
            }
            FilterChange::Updated {
                evicted,
                retracted,
                appended,
            } => {
                if evicted == 0 && retracted == 0 && appended == 0 {
                    return;
                }
                if self.index.len().saturating_sub(evicted + retracted) + appended != view.len() {
                    tracing::debug!("viewport out of step with filtered view, rebuilding");
                    self.rebuild(view);
                    self.settle_scroll();
                    self.request_render(true);
                    return;
                }

                let anchor = self.capture_anchor();
                let removed_rows = self.index.pop_front(evicted);
                self.index.pop_back(retracted);
                let kept = self.index.len();
                for i in kept..view.len() {
                    let h = view.get(i).map_or(DEFAULT_ROW_HEIGHT, |r| self.height_for(r));
                    self.index.push_back(h);
                }

                if self.auto_follow {
                    self.scroll_top = self.max_scroll();
                } else if let Some(anchor) = anchor {
                    self.scroll_top = match anchor.index.checked_sub(evicted) {
                        Some(new_index) if new_index < kept => {
                            shift(self.scroll_top, anchor.top, self.index.top(new_index))
                        }
                        // The anchor itself was retracted
                        Some(_) => self.scroll_top,
                        None => self.scroll_top.saturating_sub(removed_rows),
                    };
                    self.scroll_top = self.scroll_top.min(self.max_scroll());
                }
                self.request_render(false);
            }
        }
    }

    /// Drop cached heights for records that left the store.
    pub fn forget<I, S>(&mut self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for id in ids {
            self.measured.remove(id.as_ref());
        }
    }

    /// Discard every measurement (width change, display mode change).
    pub fn invalidate_heights(&mut self, view: &FilteredView<'_>) {
        self.measured.clear();
        self.rebuild(view);
        self.settle_scroll();
        self.request_render(true);
    }

    /// New container size. A width change invalidates all heights.
    pub fn resize(&mut self, width: u16, height: u16, view: &FilteredView<'_>) {
        if width == self.width && height == self.height {
            return;
        }
        let width_changed = width != self.width;
        self.width = width;
        self.height = height;
        if width_changed {
            self.invalidate_heights(view);
        } else {
            self.settle_scroll();
            self.request_render(true);
        }
    }

    fn height_for(&self, record: &LogRecord) -> u16 {
        self.measured
            .get(&record.id)
            .copied()
            .unwrap_or(DEFAULT_ROW_HEIGHT)
    }

    fn rebuild(&mut self, view: &FilteredView<'_>) {
        self.index.clear();
        for record in view.iter() {
            let h = self.height_for(record);
            self.index.push_back(h);
        }
        self.last_range = None;
    }

    fn settle_scroll(&mut self) {
        if self.auto_follow {
            self.scroll_top = self.max_scroll();
        } else {
            self.scroll_top = self.scroll_top.min(self.max_scroll());
        }
    }

    fn capture_anchor(&self) -> Option<Anchor> {
        if self.auto_follow {
            return None;
        }
        let index = self.first_visible()?;
        Some(Anchor {
            index,
            top: self.index.top(index),
        })
    }

    // ─────────────────────────────────────────────────────────
    // Scrolling
    // ─────────────────────────────────────────────────────────

    /// Scroll to an absolute row offset (clamped).
    pub fn scroll_to(&mut self, offset: u64) {
        let offset = offset.min(self.max_scroll());
        if offset != self.scroll_top {
            self.scroll_top = offset;
            self.request_render(false);
        }
        self.auto_follow = self.is_near_bottom();
    }

    pub fn scroll_by(&mut self, delta: i64) {
        let target = if delta.is_negative() {
            self.scroll_top.saturating_sub(delta.unsigned_abs())
        } else {
            self.scroll_top.saturating_add(delta.unsigned_abs())
        };
        self.scroll_to(target);
    }

    pub fn page_up(&mut self) {
        self.scroll_by(-i64::from(self.height.saturating_sub(1).max(1)));
    }

    pub fn page_down(&mut self) {
        self.scroll_by(i64::from(self.height.saturating_sub(1).max(1)));
    }

    pub fn scroll_to_top(&mut self) {
        self.scroll_to(0);
    }

    /// Jump to the tail and resume following.
    pub fn scroll_to_bottom(&mut self) {
        self.scroll_top = self.max_scroll();
        self.auto_follow = true;
        self.request_render(false);
    }

    /// Scroll the minimum needed to bring a record fully on screen.
    pub fn reveal(&mut self, index: usize) {
        if index >= self.index.len() {
            return;
        }
        let top = self.index.top(index);
        let bottom = self.index.bottom(index);
        let view_bottom = self.scroll_top + u64::from(self.height);
        if top < self.scroll_top {
            self.scroll_to(top);
        } else if bottom > view_bottom {
            self.scroll_to(bottom.saturating_sub(u64::from(self.height)));
        }
    }

    // ─────────────────────────────────────────────────────────
    // Frame
    // ─────────────────────────────────────────────────────────

    /// Produce this frame's window, or `None` when nothing needs drawing.
    ///
    /// With an active selection, an unforced render whose range matches the
    /// last one is skipped so the selection isn't disturbed.
    pub fn frame(
        &mut self,
        view: &FilteredView<'_>,
        measurer: &dyn HeightMeasurer,
        has_selection: bool,
    ) -> Option<RenderWindow> {
        if !self.render_pending {
            return None;
        }
        let forced = self.force_render;
        self.render_pending = false;
        self.force_render = false;

        let range = self.visible_range();
        if !forced && has_selection && self.last_range == Some(range) {
            self.frames_skipped += 1;
            return None;
        }

        // Measuring can move the offset (anchor, follow), which can expose
        // more unmeasured records; settle within a few passes.
        let mut range = range;
        for _ in 0..MAX_MEASURE_PASSES {
            if !self.measure_range(range, view, measurer) {
                break;
            }
            let next = self.visible_range();
            if next == range {
                break;
            }
            range = next;
        }

        let (start, end) = range;
        self.last_range = Some((start, end));
        self.frames_rendered += 1;

        let rows = (start..end)
            .map(|i| WindowRow {
                index: i,
                top: self.index.top(i),
                height: self.index.height(i),
            })
            .collect();

        Some(RenderWindow {
            start,
            end,
            scroll_top: self.scroll_top,
            total_height: self.index.total(),
            rows,
        })
    }

    /// Measure unmeasured records in `range`, then re-anchor. Returns
    /// whether any position changed.
    fn measure_range(
        &mut self,
        (start, end): (usize, usize),
        view: &FilteredView<'_>,
        measurer: &dyn HeightMeasurer,
    ) -> bool {
        let anchor = self.capture_anchor();
        let mut first_changed = None;

        for i in start..end.min(self.index.len()) {
            let Some(record) = view.get(i) else { continue };
            let h = match self.measured.get(&record.id) {
                Some(&h) => h,
                None => {
                    let h = measurer.measure(record, self.width).max(1);
                    self.measured.insert(record.id.clone(), h);
                    h
                }
            };
            if self.index.set_height(i, h) && first_changed.is_none() {
                first_changed = Some(i);
            }
        }

        let Some(changed) = first_changed else {
            return false;
        };
        self.index.rebuild_from(changed);

        if self.auto_follow {
            self.scroll_top = self.max_scroll();
        } else if let Some(anchor) = anchor {
            let new_top = self.index.top(anchor.index);
            self.scroll_top = shift(self.scroll_top, anchor.top, new_top).min(self.max_scroll());
        }
        true
    }
}

/// Move `value` by `new - old`, saturating at zero
fn shift(value: u64, old: u64, new: u64) -> u64 {
    if new >= old {
        value.saturating_add(new - old)
    } else {
        value.saturating_sub(old - new)
    }
}
