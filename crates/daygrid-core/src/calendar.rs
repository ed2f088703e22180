use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::time::Instant;

use chrono::{Local, NaiveDate};
use tracing::{debug, info};

use crate::binder::{BindContext, CellRender, RenderDirective, WindowSnapshot};
use crate::config::CalendarConfig;
use crate::error::{CalendarError, Result};
use crate::event::{Event, EventStore, days_inclusive, recurring_days};
use crate::export::ExportDump;
use crate::logging;
use crate::navigation::Navigator;
use crate::scheduler::RedrawScheduler;
use crate::selection::{SelectionTracker, SpilloverPolicy};
use crate::tag::{Tag, TagPatch, TagRegistry};
use crate::window::VisibleWindow;

/// Widget state for one month-grid calendar. Mutations record which visible
/// cells went stale; the host drains them with [`Calendar::take_directives`].
#[derive(Debug, Clone)]
pub struct Calendar {
    config: CalendarConfig,
    tags: TagRegistry,
    events: EventStore,
    nav: Navigator,
    selection: SelectionTracker,
    scheduler: RedrawScheduler,
    spillover: SpilloverPolicy,
    pinned_today: Option<NaiveDate>,
    stale: BTreeSet<NaiveDate>,
}

impl Calendar {
    pub fn new(config: CalendarConfig) -> Self {
        Self::build(config, None)
    }

    /// Same as [`Calendar::new`] but with a fixed notion of "today".
    pub fn with_today(config: CalendarConfig, today: NaiveDate) -> Self {
        Self::build(config, Some(today))
    }

    /// Loads the config (see [`CalendarConfig::load`]), installs the
    /// `[logging]` subscriber and builds the calendar.
    pub fn open(config_path: Option<&Path>) -> anyhow::Result<Self> {
        let config = CalendarConfig::load(config_path)?;
        logging::init_tracing(&config.logging)?;
        Ok(Self::new(config))
    }

    fn build(config: CalendarConfig, pinned_today: Option<NaiveDate>) -> Self {
        let today = pinned_today.unwrap_or_else(|| Local::now().date_naive());
        let anchor = config.initial_date.unwrap_or(today);
        let nav = Navigator::new(anchor, config.week_start());
        let mut scheduler = RedrawScheduler::new(config.redraw_delay());
        scheduler.schedule(Instant::now());

        info!(
            anchor = %anchor,
            week_start = ?nav.week_start(),
            locale = %config.locale,
            "created calendar"
        );

        Self {
            spillover: config.spillover_policy(),
            config,
            tags: TagRegistry::new(),
            events: EventStore::new(),
            nav,
            selection: SelectionTracker::new(),
            scheduler,
            pinned_today,
            stale: BTreeSet::new(),
        }
    }

    pub fn config(&self) -> &CalendarConfig {
        &self.config
    }

    pub fn tags(&self) -> &TagRegistry {
        &self.tags
    }

    pub fn events(&self) -> &EventStore {
        &self.events
    }

    pub fn today(&self) -> NaiveDate {
        self.pinned_today
            .unwrap_or_else(|| Local::now().date_naive())
    }

    pub fn set_today(&mut self, today: NaiveDate) {
        for date in [self.today(), today] {
            self.mark_stale(date);
        }
        self.pinned_today = Some(today);
    }

    pub fn spillover_policy(&self) -> SpilloverPolicy {
        self.spillover
    }

    pub fn set_spillover_policy(&mut self, policy: SpilloverPolicy) {
        self.spillover = policy;
    }

    // Tags

    #[tracing::instrument(skip(self, tag), fields(tag = %tag.id))]
    pub fn add_tag(&mut self, tag: Tag) -> Result<()> {
        let id = tag.id.clone();
        self.tags.add(tag)?;
        self.mark_tag_stale(&id);
        Ok(())
    }

    #[tracing::instrument(skip(self, tag), fields(tag = %tag.id))]
    pub fn upsert_tag(&mut self, tag: Tag) -> Result<Option<Tag>> {
        let id = tag.id.clone();
        let previous = self.tags.upsert(tag)?;
        self.mark_tag_stale(&id);
        Ok(previous)
    }

    #[tracing::instrument(skip(self, patch))]
    pub fn update_tag(&mut self, id: &str, patch: TagPatch) -> Result<()> {
        self.tags.update(id, patch)?;
        self.mark_tag_stale(id);
        Ok(())
    }

    /// Removes a tag. With `remove_events` every event carrying it goes too;
    /// otherwise those events stay and paint in the fallback color.
    #[tracing::instrument(skip(self))]
    pub fn remove_tag(&mut self, id: &str, remove_events: bool) -> Result<Tag> {
        let tag = self.tags.remove(id)?;
        let affected = if remove_events {
            self.events.remove_by_tag(id)
        } else {
            self.events.dates_with_tag(id)
        };
        info!(dates = affected.len(), remove_events, "removed tag");
        for date in affected {
            self.mark_stale(date);
        }
        Ok(tag)
    }

    pub fn hide_tag(&mut self, id: &str) -> Result<()> {
        self.tags.set_visible(id, false)?;
        self.mark_tag_stale(id);
        Ok(())
    }

    pub fn show_tag(&mut self, id: &str) -> Result<()> {
        self.tags.set_visible(id, true)?;
        self.mark_tag_stale(id);
        Ok(())
    }

    pub fn toggle_tag(&mut self, id: &str) -> Result<bool> {
        let visible = self.tags.toggle(id)?;
        self.mark_tag_stale(id);
        Ok(visible)
    }

    // Events

    #[tracing::instrument(skip(self, desc))]
    pub fn add_event(&mut self, date: NaiveDate, name: &str, desc: &str, tag: &str) -> Result<()> {
        self.validate_event(name, tag)?;
        self.events.insert(date, Event::new(name, desc, tag))?;
        self.mark_stale(date);
        Ok(())
    }

    /// One independent event per day in `[start, end]`. Returns the number
    /// of events added.
    #[tracing::instrument(skip(self, desc))]
    pub fn add_event_range(
        &mut self,
        start: NaiveDate,
        end: NaiveDate,
        name: &str,
        desc: &str,
        tag: &str,
    ) -> Result<usize> {
        let days = days_inclusive(start, end)?;
        self.add_on_days(&days, name, desc, tag)
    }

    #[tracing::instrument(skip(self, desc))]
    pub fn add_recurring_event(
        &mut self,
        start: NaiveDate,
        end: NaiveDate,
        interval_days: i64,
        name: &str,
        desc: &str,
        tag: &str,
    ) -> Result<usize> {
        let days = recurring_days(start, end, interval_days)?;
        self.add_on_days(&days, name, desc, tag)
    }

    fn add_on_days(&mut self, days: &[NaiveDate], name: &str, desc: &str, tag: &str) -> Result<usize> {
        self.validate_event(name, tag)?;
        for day in days {
            self.events.insert(*day, Event::new(name, desc, tag))?;
            self.mark_stale(*day);
        }
        debug!(count = days.len(), "added events on days");
        Ok(days.len())
    }

    fn validate_event(&self, name: &str, tag: &str) -> Result<()> {
        if name.is_empty() {
            return Err(CalendarError::InvalidName);
        }
        if !self.tags.contains(tag) {
            return Err(CalendarError::UnknownTag(tag.to_string()));
        }
        Ok(())
    }

    /// Removes every event named `name` on `date`.
    #[tracing::instrument(skip(self))]
    pub fn remove_event(&mut self, date: NaiveDate, name: &str) -> bool {
        let removed = self.events.remove_named(date, name) > 0;
        if removed {
            self.mark_stale(date);
        }
        removed
    }

    #[tracing::instrument(skip(self))]
    pub fn clear_day(&mut self, date: NaiveDate) -> bool {
        let cleared = self.events.clear_day(date).is_some();
        if cleared {
            self.mark_stale(date);
        }
        cleared
    }

    pub fn get_events(&self, date: NaiveDate) -> Vec<Event> {
        self.events.on(date).to_vec()
    }

    pub fn get_events_by_tag(&self, tag: &str) -> BTreeMap<NaiveDate, Vec<Event>> {
        self.events.by_tag(tag)
    }

    /// Visible events from `from` (today when `None`) through
    /// `from + days_ahead`, oldest first.
    pub fn get_upcoming_events(
        &self,
        days_ahead: i64,
        from: Option<NaiveDate>,
    ) -> Result<Vec<(NaiveDate, Event)>> {
        let from = from.unwrap_or_else(|| self.today());
        self.events
            .upcoming(from, days_ahead, |tag| self.tags.is_visible(tag))
    }

    #[tracing::instrument(skip(self, path), fields(path = %path.display()))]
    pub fn export(&self, path: &Path) -> anyhow::Result<()> {
        ExportDump::capture(&self.tags, &self.events).write(path)
    }

    // Navigation

    pub fn current_year(&self) -> i32 {
        self.nav.year()
    }

    pub fn current_month(&self) -> u32 {
        self.nav.month()
    }

    pub fn current_date(&self) -> NaiveDate {
        self.nav.anchor()
    }

    pub fn visible_window(&self) -> &VisibleWindow {
        self.nav.window()
    }

    #[tracing::instrument(skip(self))]
    pub fn advance_month(&mut self, delta: i32) {
        let changed = self.nav.advance_month(delta);
        self.after_navigation(changed);
    }

    #[tracing::instrument(skip(self))]
    pub fn advance_year(&mut self, delta: i32) {
        let changed = self.nav.advance_year(delta);
        self.after_navigation(changed);
    }

    #[tracing::instrument(skip(self))]
    pub fn go_to(&mut self, date: NaiveDate) {
        let changed = self.nav.go_to(date);
        self.after_navigation(changed);
    }

    fn after_navigation(&mut self, month_changed: bool) {
        if month_changed && self.selection.selected().is_some() {
            let cleared = self.selection.clear();
            debug!(deselected = ?cleared.deselected, "cleared selection after leaving month");
        }
        self.stale.clear();
        self.scheduler.schedule(Instant::now());
    }

    // Selection

    pub fn selected(&self) -> Option<NaiveDate> {
        self.selection.selected()
    }

    /// Returns whether `date` ended up selected.
    #[tracing::instrument(skip(self))]
    pub fn select(&mut self, date: NaiveDate) -> bool {
        if !self.accept_selection_target(date) {
            return false;
        }
        let change = self.selection.select(date);
        self.mark_all_stale(change.dates());
        true
    }

    /// No-op unless `date` is the selected day.
    #[tracing::instrument(skip(self))]
    pub fn deselect(&mut self, date: NaiveDate) -> bool {
        let change = self.selection.deselect(date);
        let changed = !change.is_empty();
        self.mark_all_stale(change.dates());
        changed
    }

    /// Click handling: deselects a selected day, selects any other day.
    /// Returns whether `date` is selected afterwards.
    #[tracing::instrument(skip(self))]
    pub fn toggle(&mut self, date: NaiveDate) -> bool {
        if self.selection.is_selected(date) {
            self.deselect(date);
            return false;
        }
        self.select(date)
    }

    fn accept_selection_target(&mut self, date: NaiveDate) -> bool {
        if self.nav.window().in_month(date) {
            return true;
        }
        match self.spillover {
            SpilloverPolicy::Ignore => {
                debug!(date = %date, "ignored selection outside current month");
                false
            }
            SpilloverPolicy::Navigate => {
                self.go_to(date);
                true
            }
        }
    }

    // Rendering

    fn bind_context(&self) -> BindContext<'_> {
        BindContext {
            window: self.nav.window(),
            events: &self.events,
            tags: &self.tags,
            today: self.today(),
            selected: self.selection.selected(),
            max_rows: self.config.policies.max_visible_rows,
            fallback_color: &self.config.style.fallback_tag_color,
        }
    }

    /// The 42 visible dates with their render metadata.
    pub fn current_window(&self) -> WindowSnapshot {
        self.bind_context().bind_window()
    }

    pub fn cell(&self, date: NaiveDate) -> Option<CellRender> {
        self.nav
            .window()
            .contains(date)
            .then(|| self.bind_context().bind_cell(date))
    }

    pub fn redraw_pending(&self) -> bool {
        self.scheduler.is_pending()
    }

    /// Directives due at `now`. A pending full redraw holds back per-cell
    /// refreshes until it fires, since it repaints every cell anyway.
    pub fn take_directives(&mut self, now: Instant) -> Vec<RenderDirective> {
        if self.scheduler.poll(now).is_some() {
            return vec![self.full_redraw()];
        }
        if self.scheduler.is_pending() {
            return Vec::new();
        }
        self.drain_stale_cells()
    }

    /// Like [`Calendar::take_directives`] without waiting for the debounce.
    pub fn flush_directives(&mut self) -> Vec<RenderDirective> {
        if self.scheduler.flush().is_some() {
            return vec![self.full_redraw()];
        }
        self.drain_stale_cells()
    }

    fn full_redraw(&mut self) -> RenderDirective {
        self.stale.clear();
        let snapshot = self.current_window();
        debug!(
            year = snapshot.year,
            month = snapshot.month,
            "full redraw"
        );
        RenderDirective::Full(snapshot)
    }

    fn drain_stale_cells(&mut self) -> Vec<RenderDirective> {
        let stale = std::mem::take(&mut self.stale);
        let ctx = self.bind_context();
        stale
            .into_iter()
            .filter(|date| ctx.window.contains(*date))
            .map(|date| RenderDirective::Cell(ctx.bind_cell(date)))
            .collect()
    }

    fn mark_stale(&mut self, date: NaiveDate) {
        if self.nav.window().contains(date) {
            self.stale.insert(date);
        }
    }

    fn mark_all_stale(&mut self, dates: impl IntoIterator<Item = NaiveDate>) {
        for date in dates {
            self.mark_stale(date);
        }
    }

    fn mark_tag_stale(&mut self, tag: &str) {
        let dates = self.events.dates_with_tag(tag);
        self.mark_all_stale(dates);
    }
}
