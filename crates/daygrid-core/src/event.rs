use std::collections::BTreeMap;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::{CalendarError, Result};

/// An annotation attached to a single date. Identity is the (date, name)
/// pair; there is no global event id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Event {
    pub name: String,
    #[serde(default)]
    pub desc: String,
    pub tag: String,
}

impl Event {
    pub fn new(name: impl Into<String>, desc: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            desc: desc.into(),
            tag: tag.into(),
        }
    }
}

/// Date-keyed event lists. A date key exists only while it holds at least
/// one event; insertion order is kept within a date.
#[derive(Debug, Clone, Default)]
pub struct EventStore {
    days: BTreeMap<NaiveDate, Vec<Event>>,
}

impl EventStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[tracing::instrument(skip(self, event), fields(name = %event.name, tag = %event.tag))]
    pub fn insert(&mut self, date: NaiveDate, event: Event) -> Result<()> {
        if event.name.is_empty() {
            return Err(CalendarError::InvalidName);
        }
        let list = self.days.entry(date).or_default();
        list.push(event);
        trace!(count = list.len(), "appended event");
        Ok(())
    }

    /// Removes every event named `name` on `date` and returns how many went.
    #[tracing::instrument(skip(self))]
    pub fn remove_named(&mut self, date: NaiveDate, name: &str) -> usize {
        let Some(list) = self.days.get_mut(&date) else {
            return 0;
        };

        let before = list.len();
        list.retain(|event| event.name != name);
        let removed = before - list.len();
        if list.is_empty() {
            self.days.remove(&date);
        }

        debug!(removed, "removed named events");
        removed
    }

    pub fn clear_day(&mut self, date: NaiveDate) -> Option<Vec<Event>> {
        self.days.remove(&date)
    }

    /// Removes all events carrying `tag`, returning the dates that changed.
    #[tracing::instrument(skip(self))]
    pub fn remove_by_tag(&mut self, tag: &str) -> Vec<NaiveDate> {
        let mut affected = Vec::new();
        self.days.retain(|date, list| {
            let before = list.len();
            list.retain(|event| event.tag != tag);
            if list.len() != before {
                affected.push(*date);
            }
            !list.is_empty()
        });
        debug!(dates = affected.len(), "removed events by tag");
        affected
    }

    pub fn on(&self, date: NaiveDate) -> &[Event] {
        self.days.get(&date).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn by_tag(&self, tag: &str) -> BTreeMap<NaiveDate, Vec<Event>> {
        self.days
            .iter()
            .filter_map(|(date, list)| {
                let matching: Vec<Event> = list
                    .iter()
                    .filter(|event| event.tag == tag)
                    .cloned()
                    .collect();
                (!matching.is_empty()).then_some((*date, matching))
            })
            .collect()
    }

    pub fn dates_with_tag(&self, tag: &str) -> Vec<NaiveDate> {
        self.days
            .iter()
            .filter(|(_, list)| list.iter().any(|event| event.tag == tag))
            .map(|(date, _)| *date)
            .collect()
    }

    /// Events in `[from, from + days_ahead]`, chronological, keeping only those
    /// for which `visible(tag)` holds.
    pub fn upcoming<F>(
        &self,
        from: NaiveDate,
        days_ahead: i64,
        visible: F,
    ) -> Result<Vec<(NaiveDate, Event)>>
    where
        F: Fn(&str) -> bool,
    {
        if days_ahead < 1 {
            return Err(CalendarError::InvalidWindow(days_ahead));
        }
        // Windows reaching past the calendar's range stop at its last date.
        let until = u64::try_from(days_ahead)
            .ok()
            .and_then(|days| from.checked_add_days(Days::new(days)))
            .unwrap_or(NaiveDate::MAX);

        Ok(self
            .days
            .range(from..=until)
            .flat_map(|(date, list)| list.iter().map(move |event| (*date, event)))
            .filter(|(_, event)| visible(&event.tag))
            .map(|(date, event)| (date, event.clone()))
            .collect())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NaiveDate, &Vec<Event>)> {
        self.days.iter()
    }

    pub fn contains_date(&self, date: NaiveDate) -> bool {
        self.days.contains_key(&date)
    }

    pub fn day_count(&self) -> usize {
        self.days.len()
    }

    pub fn event_count(&self) -> usize {
        self.days.values().map(Vec::len).sum()
    }
}

/// Every calendar day in `[start, end]`.
pub fn days_inclusive(start: NaiveDate, end: NaiveDate) -> Result<Vec<NaiveDate>> {
    if end < start {
        return Err(CalendarError::InvalidRange { start, end });
    }
    Ok(start.iter_days().take_while(|day| *day <= end).collect())
}

/// `start, start + interval, ...` while not past `end`. The last date need
/// not land on `end`.
pub fn recurring_days(start: NaiveDate, end: NaiveDate, interval_days: i64) -> Result<Vec<NaiveDate>> {
    if end < start {
        return Err(CalendarError::InvalidRange { start, end });
    }
    let step = usize::try_from(interval_days)
        .ok()
        .filter(|step| *step >= 1)
        .ok_or(CalendarError::InvalidInterval(interval_days))?;

    Ok(start
        .iter_days()
        .take_while(|day| *day <= end)
        .step_by(step)
        .collect())
}
