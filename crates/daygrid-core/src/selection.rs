use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// What happens when a spillover cell (outside the current month) is clicked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpilloverPolicy {
    #[default]
    Ignore,
    Navigate,
}

impl SpilloverPolicy {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "ignore" => Some(Self::Ignore),
            "navigate" => Some(Self::Navigate),
            _ => None,
        }
    }
}

/// Dates whose cells need repainting after a selection change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionChange {
    pub deselected: Option<NaiveDate>,
    pub selected: Option<NaiveDate>,
}

impl SelectionChange {
    pub fn is_empty(&self) -> bool {
        self.deselected.is_none() && self.selected.is_none()
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> {
        self.deselected.into_iter().chain(self.selected)
    }
}

/// At most one selected date.
#[derive(Debug, Clone, Default)]
pub struct SelectionTracker {
    selected: Option<NaiveDate>,
}

impl SelectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> Option<NaiveDate> {
        self.selected
    }

    pub fn is_selected(&self, date: NaiveDate) -> bool {
        self.selected == Some(date)
    }

    pub fn select(&mut self, date: NaiveDate) -> SelectionChange {
        if self.selected == Some(date) {
            return SelectionChange::default();
        }
        let deselected = self.selected.replace(date);
        debug!(date = %date, ?deselected, "selected day");
        SelectionChange {
            deselected,
            selected: Some(date),
        }
    }

    pub fn deselect(&mut self, date: NaiveDate) -> SelectionChange {
        if self.selected != Some(date) {
            return SelectionChange::default();
        }
        self.selected = None;
        debug!(date = %date, "deselected day");
        SelectionChange {
            deselected: Some(date),
            selected: None,
        }
    }

    pub fn toggle(&mut self, date: NaiveDate) -> SelectionChange {
        if self.is_selected(date) {
            self.deselect(date)
        } else {
            self.select(date)
        }
    }

    pub fn clear(&mut self) -> SelectionChange {
        SelectionChange {
            deselected: self.selected.take(),
            selected: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn selecting_another_day_replaces_the_first() {
        let mut tracker = SelectionTracker::new();
        let a = ymd(2025, 11, 3);
        let b = ymd(2025, 11, 4);

        tracker.select(a);
        let change = tracker.select(b);
        assert_eq!(change.deselected, Some(a));
        assert_eq!(change.selected, Some(b));
        assert_eq!(tracker.selected(), Some(b));
        assert!(!tracker.is_selected(a));
    }

    #[test]
    fn toggling_twice_clears() {
        let mut tracker = SelectionTracker::new();
        let b = ymd(2025, 11, 4);
        tracker.toggle(b);
        assert!(tracker.is_selected(b));
        tracker.toggle(b);
        assert_eq!(tracker.selected(), None);
    }

    #[test]
    fn deselecting_an_unselected_day_is_a_noop() {
        let mut tracker = SelectionTracker::new();
        let a = ymd(2025, 11, 3);
        tracker.select(a);
        assert!(tracker.deselect(ymd(2025, 11, 9)).is_empty());
        assert_eq!(tracker.selected(), Some(a));
        assert!(tracker.select(a).is_empty());
    }

    #[test]
    fn parses_policy_names() {
        assert_eq!(SpilloverPolicy::parse(" Navigate "), Some(SpilloverPolicy::Navigate));
        assert_eq!(SpilloverPolicy::parse("jump"), None);
    }
}
