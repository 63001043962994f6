//! Virtualized log console.
//!
//! Builds rows only for the window [`VirtualList::visible_range`] reports,
//! however long the log stream grows.

use crate::domain::telemetry::{LogEntry, LogStreamBuffer, Severity};
use crate::domain::viewport::VirtualList;

/// One constructed console row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRow {
    pub index: usize,
    /// Top edge within the scroll track.
    pub offset: u64,
    pub severity: Severity,
    pub text: String,
}

/// `[HH:MM:SS] message`
pub fn format_log_line(entry: &LogEntry) -> String {
    format!("[{}] {}", entry.timestamp.clock_label(), entry.message)
}

#[derive(Debug, Clone)]
pub struct LogListRenderer {
    list: VirtualList,
    /// `LogStreamBuffer::evicted` as of the last `sync`.
    evicted_seen: u64,
}

impl LogListRenderer {
    pub fn new(list: VirtualList) -> Self {
        Self {
            list,
            evicted_seen: 0,
        }
    }

    pub fn list(&self) -> &VirtualList {
        &self.list
    }

    /// Scroll and resize go through here.
    pub fn list_mut(&mut self) -> &mut VirtualList {
        &mut self.list
    }

    /// Picks up growth (or eviction) of the buffer.
    ///
    /// While scrolled up, evicted rows are taken off the offset so the rows
    /// under the viewport stay put as the buffer drops its oldest entries.
    pub fn sync(&mut self, logs: &LogStreamBuffer) {
        let evicted = logs.evicted().saturating_sub(self.evicted_seen);
        self.evicted_seen = logs.evicted();

        if self.list.item_count() != logs.count() {
            self.list.set_item_count(logs.count());
        }
        if evicted > 0 && !self.list.is_following() {
            let shift = evicted.saturating_mul(u64::from(self.list.row_height()));
            let offset = self.list.scroll_offset().saturating_sub(shift);
            self.list.scroll_to(offset);
        }
    }

    /// Calls `build` once per row in the render window, in order.
    pub fn render_with<R>(
        &self,
        logs: &LogStreamBuffer,
        mut build: impl FnMut(usize, &LogEntry) -> R,
    ) -> Vec<R> {
        let Some(range) = self.list.visible_range() else {
            return Vec::new();
        };
        range
            .rows()
            .filter_map(|index| logs.at(index).map(|entry| build(index, entry)))
            .collect()
    }

    pub fn render(&self, logs: &LogStreamBuffer) -> Vec<LogRow> {
        self.render_with(logs, |index, entry| LogRow {
            index,
            offset: self.list.row_offset(index),
            severity: entry.severity,
            text: format_log_line(entry),
        })
    }
}
