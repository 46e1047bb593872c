//! Cumulative row positions for a variable-height list
//!
//! Tops are stored as absolute offsets so that dropping items from the front
//! is O(1): the logical top of item `i` is `tops[i] - origin`, and eviction
//! just moves `origin` forward.

use std::collections::VecDeque;

#[derive(Debug, Clone, Default)]
pub struct HeightIndex {
    tops: VecDeque<u64>,
    heights: VecDeque<u16>,
    origin: u64,
    end: u64,
}

impl HeightIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_heights(heights: impl IntoIterator<Item = u16>) -> Self {
        let mut index = Self::new();
        for h in heights {
            index.push_back(h);
        }
        index
    }

    pub fn len(&self) -> usize {
        self.heights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heights.is_empty()
    }

    pub fn clear(&mut self) {
        self.tops.clear();
        self.heights.clear();
        self.origin = 0;
        self.end = 0;
    }

    /// Total extent in rows
    pub fn total(&self) -> u64 {
        self.end - self.origin
    }

    pub fn top(&self, index: usize) -> u64 {
        self.tops[index] - self.origin
    }

    pub fn height(&self, index: usize) -> u16 {
        self.heights[index]
    }

    pub fn bottom(&self, index: usize) -> u64 {
        self.top(index) + u64::from(self.heights[index])
    }

    pub fn push_back(&mut self, height: u16) {
        let height = height.max(1);
        self.tops.push_back(self.end);
        self.heights.push_back(height);
        self.end += u64::from(height);
    }

    /// Drop `count` items from the front; returns the rows they covered.
    pub fn pop_front(&mut self, count: usize) -> u64 {
        let before = self.origin;
        for _ in 0..count.min(self.len()) {
            self.tops.pop_front();
            self.heights.pop_front();
        }
        self.origin = self.tops.front().copied().unwrap_or(self.end);
        self.origin - before
    }

    /// Drop `count` items from the back; returns the rows they covered.
    pub fn pop_back(&mut self, count: usize) -> u64 {
        let before = self.end;
        for _ in 0..count.min(self.len()) {
            self.tops.pop_back();
            self.heights.pop_back();
        }
        self.end = match (self.tops.back(), self.heights.back()) {
            (Some(&top), Some(&h)) => top + u64::from(h),
            _ => self.origin,
        };
        before - self.end
    }

    /// Record a new height without shifting later tops.
    ///
    /// Returns whether it changed; call [`HeightIndex::rebuild_from`] after a
    /// batch of changes.
    pub fn set_height(&mut self, index: usize, height: u16) -> bool {
        let height = height.max(1);
        if self.heights[index] == height {
            return false;
        }
        self.heights[index] = height;
        true
    }

    /// Recompute tops from `index` to the end.
    pub fn rebuild_from(&mut self, index: usize) {
        if index >= self.len() {
            if let (Some(&top), Some(&h)) = (self.tops.back(), self.heights.back()) {
                self.end = top + u64::from(h);
            }
            return;
        }
        let mut y = if index == 0 {
            self.origin
        } else {
            self.tops[index - 1] + u64::from(self.heights[index - 1])
        };
        for i in index..self.len() {
            self.tops[i] = y;
            y += u64::from(self.heights[i]);
        }
        self.end = y;
    }

    /// First item whose bottom reaches `offset`, minus `buffer`.
    pub fn find_start_index(&self, offset: u64, buffer: usize) -> usize {
        let (mut low, mut high) = (0, self.len());
        while low < high {
            let mid = (low + high) / 2;
            if self.bottom(mid) < offset {
                low = mid + 1;
            } else {
                high = mid;
            }
        }
        low.saturating_sub(buffer)
    }

    /// Scan forward from `start` past the last item whose top is within
    /// `bottom`, then add `buffer`.
    pub fn find_end_index(&self, start: usize, bottom: u64, buffer: usize) -> usize {
        let mut i = start;
        while i < self.len() && self.top(i) <= bottom {
            i += 1;
        }
        (i + buffer).min(self.len())
    }

    /// `[start, end)` to materialize for the window `[offset, offset + extent]`
    pub fn visible_range(&self, offset: u64, extent: u64, buffer: usize) -> (usize, usize) {
        if self.is_empty() {
            return (0, 0);
        }
        let start = self.find_start_index(offset, buffer);
        let end = self.find_end_index(start, offset + extent, buffer);
        (start, end)
    }

    /// Index of the item covering row `offset`
    pub fn index_at(&self, offset: u64) -> Option<usize> {
        if self.is_empty() || offset >= self.total() {
            return None;
        }
        let i = self.find_start_index(offset, 0);
        // An item ending exactly at `offset` belongs to the one after it
        if self.bottom(i) == offset {
            (i + 1 < self.len()).then_some(i + 1)
        } else {
            Some(i)
        }
    }
}
