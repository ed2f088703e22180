use chrono::{Datelike, NaiveDate};
use tracing::{debug, warn};

use crate::window::{VisibleWindow, WeekStart, shift_months, shift_years, window_fits};

/// Owns the anchor date and the window derived from it.
#[derive(Debug, Clone)]
pub struct Navigator {
    anchor: NaiveDate,
    week_start: WeekStart,
    window: VisibleWindow,
}

impl Navigator {
    pub fn new(anchor: NaiveDate, week_start: WeekStart) -> Self {
        let window = VisibleWindow::compute(anchor.year(), anchor.month(), week_start);
        Self {
            anchor,
            week_start,
            window,
        }
    }

    pub fn anchor(&self) -> NaiveDate {
        self.anchor
    }

    pub fn year(&self) -> i32 {
        self.anchor.year()
    }

    pub fn month(&self) -> u32 {
        self.anchor.month()
    }

    pub fn week_start(&self) -> WeekStart {
        self.week_start
    }

    pub fn window(&self) -> &VisibleWindow {
        &self.window
    }

    /// Returns whether the displayed month changed.
    pub fn advance_month(&mut self, delta: i32) -> bool {
        self.go_to(shift_months(self.anchor, delta))
    }

    pub fn advance_year(&mut self, delta: i32) -> bool {
        self.go_to(shift_years(self.anchor, delta))
    }

    /// Anchors whose month has no full window are refused.
    pub fn go_to(&mut self, anchor: NaiveDate) -> bool {
        if !window_fits(anchor) {
            warn!(anchor = %anchor, "month window leaves the date range; staying put");
            return false;
        }
        let month_changed =
            anchor.year() != self.anchor.year() || anchor.month() != self.anchor.month();
        self.anchor = anchor;
        self.window = VisibleWindow::compute(anchor.year(), anchor.month(), self.week_start);
        debug!(
            anchor = %anchor,
            year = anchor.year(),
            month = anchor.month(),
            month_changed,
            "recomputed visible window"
        );
        month_changed
    }

    pub fn set_week_start(&mut self, week_start: WeekStart) {
        self.week_start = week_start;
        self.go_to(self.anchor);
    }
}
