//! Derives what each visible cell shows. Nothing here is stored: every
//! value is recomputed from the event store, the tag registry and the
//! visible window, so a cell can always be rebuilt on demand.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::event::{Event, EventStore};
use crate::tag::TagRegistry;
use crate::window::VisibleWindow;

/// Pixel height of one event row in a day cell.
pub const EVENT_ROW_HEIGHT: u32 = 22;
/// Extra room below the last fully visible row.
pub const EVENT_LIST_PADDING: u32 = 8;
pub const DEFAULT_MAX_VISIBLE_ROWS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoundEvent {
    pub name: String,
    pub desc: String,
    pub tag: String,
    pub color: String,
    pub text_color: &'static str,
    pub tooltip: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CellRender {
    pub date: NaiveDate,
    pub day: u32,
    pub in_month: bool,
    pub is_today: bool,
    pub selected: bool,
    /// Visible events; always empty for spillover cells.
    pub events: Vec<BoundEvent>,
    /// More events than rows: the list scrolls instead of truncating.
    pub scrollable: bool,
}

impl CellRender {
    pub fn interactive(&self) -> bool {
        self.in_month
    }

    pub fn has_event_list(&self) -> bool {
        !self.events.is_empty()
    }

    pub fn list_height(&self, max_rows: usize) -> u32 {
        list_height(self.events.len(), max_rows)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WindowSnapshot {
    pub year: i32,
    pub month: u32,
    pub cells: Vec<CellRender>,
}

impl WindowSnapshot {
    pub fn cell(&self, date: NaiveDate) -> Option<&CellRender> {
        self.cells.iter().find(|cell| cell.date == date)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderDirective {
    Full(WindowSnapshot),
    Cell(CellRender),
}

/// Everything a cell is derived from.
#[derive(Debug, Clone, Copy)]
pub struct BindContext<'a> {
    pub window: &'a VisibleWindow,
    pub events: &'a EventStore,
    pub tags: &'a TagRegistry,
    pub today: NaiveDate,
    pub selected: Option<NaiveDate>,
    pub max_rows: usize,
    pub fallback_color: &'a str,
}

impl BindContext<'_> {
    pub fn bind_cell(&self, date: NaiveDate) -> CellRender {
        let in_month = self.window.in_month(date);
        let events: Vec<BoundEvent> = if in_month {
            self.events
                .on(date)
                .iter()
                .filter(|event| self.tags.is_visible(&event.tag))
                .map(|event| self.bind_event(event))
                .collect()
        } else {
            Vec::new()
        };
        let scrollable = events.len() > self.max_rows;

        CellRender {
            date,
            day: date.day(),
            in_month,
            is_today: date == self.today,
            selected: in_month && self.selected == Some(date),
            events,
            scrollable,
        }
    }

    pub fn bind_window(&self) -> WindowSnapshot {
        WindowSnapshot {
            year: self.window.year(),
            month: self.window.month(),
            cells: self
                .window
                .dates()
                .iter()
                .map(|date| self.bind_cell(*date))
                .collect(),
        }
    }

    fn bind_event(&self, event: &Event) -> BoundEvent {
        let color = self.tags.color_or(&event.tag, self.fallback_color).to_string();
        BoundEvent {
            name: event.name.clone(),
            desc: event.desc.clone(),
            tag: event.tag.clone(),
            text_color: text_color_for(&color),
            tooltip: format!("{}\n{}", event.name, event.desc),
            color,
        }
    }
}

pub fn text_color_for(background: &str) -> &'static str {
    if background.trim().eq_ignore_ascii_case("white") {
        "black"
    } else {
        "white"
    }
}

pub fn list_height(event_count: usize, max_rows: usize) -> u32 {
    if event_count == 0 {
        return 0;
    }
    let rows = u32::try_from(event_count).unwrap_or(u32::MAX);
    let cap = u32::try_from(max_rows).unwrap_or(u32::MAX);
    rows.saturating_mul(EVENT_ROW_HEIGHT).min(
        cap.saturating_mul(EVENT_ROW_HEIGHT)
            .saturating_add(EVENT_LIST_PADDING),
    )
}
