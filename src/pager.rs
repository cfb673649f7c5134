//! Windowing over the accumulated book list.
//!
//! The pager is a plain value with a pure transition function; rendering
//! the visible slice is the caller's side effect. `Next` and `Prev` wrap
//! around, `Goto` clamps.

use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagerState {
    /// Current window, zero-based.
    pub index: usize,
    /// Items shown per window, never zero.
    pub per_view: usize,
    /// Total items available to window over.
    pub total: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PagerAction {
    Next,
    Prev,
    Goto(usize),
    /// Items-per-window changed (terminal resize); the index is clamped
    /// back into range.
    Resize(usize),
    /// The accumulated list grew or was replaced.
    SetTotal(usize),
    /// Back to the first window, keeping the viewport size.
    Reset,
}

impl PagerState {
    pub fn new(per_view: usize) -> PagerState {
        PagerState {
            index: 0,
            per_view: per_view.max(1),
            total: 0,
        }
    }

    /// Number of windows the current total splits into.
    pub fn windows(&self) -> usize {
        self.total.div_ceil(self.per_view)
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Standing on the last window; the caller treats this as the
    /// proximity trigger for fetching the next page.
    pub fn on_last_window(&self) -> bool {
        self.index >= self.windows().saturating_sub(1)
    }

    /// Item range of the current window.
    pub fn visible_range(&self) -> Range<usize> {
        let start = (self.index * self.per_view).min(self.total);
        let end = (start + self.per_view).min(self.total);
        start..end
    }

    fn last_index(&self) -> usize {
        self.windows().saturating_sub(1)
    }
}

pub fn step(state: PagerState, action: PagerAction) -> PagerState {
    let mut next = state;
    match action {
        PagerAction::Next => {
            if state.windows() > 0 {
                next.index = if state.index < state.last_index() {
                    state.index + 1
                } else {
                    0
                };
            }
        }
        PagerAction::Prev => {
            if state.windows() > 0 {
                next.index = if state.index > 0 {
                    state.index - 1
                } else {
                    state.last_index()
                };
            }
        }
        PagerAction::Goto(index) => {
            next.index = index.min(state.last_index());
        }
        PagerAction::Resize(per_view) => {
            next.per_view = per_view.max(1);
            next.index = next.index.min(next.last_index());
        }
        PagerAction::SetTotal(total) => {
            next.total = total;
            next.index = next.index.min(next.last_index());
        }
        PagerAction::Reset => {
            next.index = 0;
        }
    }
    next
}

/// Items per window for a given terminal height, mirroring the breakpoint
/// ladder the UI used for viewport widths.
pub fn per_view_for_rows(rows: u16) -> usize {
    match rows {
        0..=15 => 3,
        16..=30 => 5,
        31..=45 => 8,
        _ => 12,
    }
}
