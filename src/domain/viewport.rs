//! Virtualized list geometry.
//!
//! Only the rows inside the viewport (plus an overscan margin) are ever
//! constructed, while the scroll track is sized as if every row existed.
//!
//! ```text
//!   0 ┌──────────────┐
//!     │              │  not rendered
//!     ├──────────────┤  render_start  = first_visible - overscan
//!     │   overscan   │
//!     ├══════════════┤  first_visible = scroll_offset / row_height
//!     ║   viewport   ║
//!     ├══════════════┤  last_visible
//!     │   overscan   │
//!     ├──────────────┤  render_end    = last_visible + overscan
//!     │              │  not rendered
//!     └──────────────┘  total_height  = item_count * row_height
//! ```

use std::ops::Range;

/// Indices to paint for the current scroll position. All bounds inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibleRange {
    pub first_visible: usize,
    pub last_visible: usize,
    pub render_start: usize,
    pub render_end: usize,
}

impl VisibleRange {
    /// Half-open range of rows to construct.
    pub fn rows(&self) -> Range<usize> {
        self.render_start..self.render_end + 1
    }

    /// Number of rows to construct. Never zero.
    pub fn row_count(&self) -> usize {
        self.render_end + 1 - self.render_start
    }
}

/// Scroll state of one fixed-row-height list.
///
/// Sticks to the bottom while the user is there: growing the list keeps the
/// newest rows in view. Once the user scrolls up, growth only extends the
/// track and the offset stays put.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualList {
    row_height: u32,
    viewport_height: u32,
    overscan: usize,
    scroll_offset: u64,
    item_count: usize,
    follow: bool,
}

impl VirtualList {
    /// `row_height` is clamped to at least one pixel.
    pub fn new(row_height: u32, viewport_height: u32, overscan: usize) -> Self {
        Self {
            row_height: row_height.max(1),
            viewport_height,
            overscan,
            scroll_offset: 0,
            item_count: 0,
            follow: true,
        }
    }

    pub fn row_height(&self) -> u32 {
        self.row_height
    }

    pub fn viewport_height(&self) -> u32 {
        self.viewport_height
    }

    pub fn overscan(&self) -> usize {
        self.overscan
    }

    pub fn scroll_offset(&self) -> u64 {
        self.scroll_offset
    }

    pub fn item_count(&self) -> usize {
        self.item_count
    }

    /// Height of the full scroll track.
    pub fn total_height(&self) -> u64 {
        self.item_count as u64 * u64::from(self.row_height)
    }

    /// Top edge of a row within the track.
    pub fn row_offset(&self, index: usize) -> u64 {
        index as u64 * u64::from(self.row_height)
    }

    fn max_offset(&self) -> u64 {
        self.total_height()
            .saturating_sub(u64::from(self.viewport_height))
    }

    pub fn is_at_bottom(&self) -> bool {
        self.scroll_offset >= self.max_offset()
    }

    /// Whether growth will keep the newest rows in view.
    pub fn is_following(&self) -> bool {
        self.follow
    }

    /// User scroll. Clamped to the track; scrolling to the end re-enables
    /// follow mode.
    pub fn scroll_to(&mut self, offset: u64) {
        self.scroll_offset = offset.min(self.max_offset());
        self.follow = self.is_at_bottom();
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scroll_to(u64::MAX);
    }

    /// Container resize.
    pub fn resize(&mut self, viewport_height: u32) {
        self.viewport_height = viewport_height;
        self.reflow();
    }

    /// The underlying sequence grew (or was evicted from).
    pub fn set_item_count(&mut self, count: usize) {
        self.item_count = count;
        self.reflow();
    }

    fn reflow(&mut self) {
        if self.follow {
            self.scroll_offset = self.max_offset();
        } else {
            self.scroll_offset = self.scroll_offset.min(self.max_offset());
        }
    }

    /// Rows intersecting the viewport, widened by the overscan margin.
    /// `None` for an empty list.
    pub fn visible_range(&self) -> Option<VisibleRange> {
        if self.item_count == 0 {
            return None;
        }
        let last_index = self.item_count - 1;
        let row = u64::from(self.row_height);

        let first_visible = ((self.scroll_offset / row) as usize).min(last_index);
        let bottom_edge = self.scroll_offset + u64::from(self.viewport_height);
        let last_visible = (bottom_edge.saturating_sub(1) / row) as usize;
        let last_visible = last_visible.clamp(first_visible, last_index);

        Some(VisibleRange {
            first_visible,
            last_visible,
            render_start: first_visible.saturating_sub(self.overscan),
            render_end: last_visible.saturating_add(self.overscan).min(last_index),
        })
    }
}
