//! The pagination widget's visible page window.

use std::ops::RangeInclusive;

/// How many pages either side of the current one are shown.
pub const SPAN: u32 = 2;

/// Which page buttons to show and whether prev/next are enabled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageWindow {
    pub current: u32,
    pub total: u32,
    pub pages: RangeInclusive<u32>,
    pub has_prev: bool,
    pub has_next: bool,
}

impl PageWindow {
    /// Compute the window `[max(1, current-2), min(total, current+2)]`.
    ///
    /// A total of zero is treated as one page, and `current` is clamped into
    /// `[1, total]`. The window shrinks at either end; it is never padded.
    #[must_use]
    pub fn new(current: u32, total: u32) -> Self {
        let total = total.max(1);
        let current = current.clamp(1, total);
        let start = current.saturating_sub(SPAN).max(1);
        let end = current.saturating_add(SPAN).min(total);
        Self {
            current,
            total,
            pages: start..=end,
            has_prev: current > 1,
            has_next: current < total,
        }
    }

    #[must_use]
    pub const fn prev(&self) -> Option<u32> {
        if self.has_prev { Some(self.current - 1) } else { None }
    }

    #[must_use]
    pub const fn next(&self) -> Option<u32> {
        if self.has_next { Some(self.current + 1) } else { None }
    }

    /// `Trang 3 / 10`
    #[must_use]
    pub fn label(&self) -> String {
        format!("Trang {} / {}", self.current, self.total)
    }
}
