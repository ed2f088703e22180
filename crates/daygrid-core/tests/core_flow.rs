use chrono::{Datelike, NaiveDate};
use daygrid_core::window::{VisibleWindow, WeekStart, first_day_of_month, last_day_of_month};
use daygrid_core::{Calendar, CalendarConfig, CalendarError, ExportDump, RenderDirective, Tag, TagPatch};
use tempfile::tempdir;

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

fn november_calendar() -> Calendar {
    let config = CalendarConfig {
        initial_date: Some(ymd(2025, 11, 1)),
        ..CalendarConfig::default()
    };
    let mut cal = Calendar::with_today(config, ymd(2025, 11, 5));
    cal.add_tag(Tag::new("stay", "red2").with_desc("apartment booked"))
        .expect("add stay tag");
    cal.add_tag(Tag::new("gym", "green3")).expect("add gym tag");
    cal.flush_directives();
    cal
}

#[test]
fn window_always_holds_six_weeks_around_the_month() {
    for year in 2020..=2030 {
        for month in 1..=12 {
            let window = VisibleWindow::compute(year, month, WeekStart::Sunday);
            let dates = window.dates();
            assert_eq!(dates.len(), 42);

            let first = first_day_of_month(year, month);
            let lead = (first.weekday().num_days_from_monday() as i64 + 1) % 7;
            assert_eq!((first - dates[0]).num_days(), lead);
            assert!(dates[0] <= first);
            assert!(dates[41] >= last_day_of_month(year, month));
            for pair in dates.windows(2) {
                assert_eq!(pair[1], pair[0].succ_opt().expect("next day"));
            }
        }
    }
}

#[test]
fn range_insertion_creates_one_event_per_day() {
    let mut cal = november_calendar();
    let added = cal
        .add_event_range(ymd(2025, 11, 1), ymd(2025, 11, 7), "X", "", "stay")
        .expect("range");
    assert_eq!(added, 7);

    let by_tag = cal.get_events_by_tag("stay");
    assert_eq!(by_tag.len(), 7);
    for (date, events) in &by_tag {
        assert!(*date >= ymd(2025, 11, 1) && *date <= ymd(2025, 11, 7));
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].name, "X");
    }

    assert!(matches!(
        cal.add_event_range(ymd(2025, 11, 7), ymd(2025, 11, 1), "X", "", "stay"),
        Err(CalendarError::InvalidRange { .. })
    ));
}

#[test]
fn recurring_insertion_steps_by_interval() {
    let mut cal = november_calendar();
    cal.add_recurring_event(ymd(2025, 11, 1), ymd(2025, 11, 15), 3, "Gym", "", "gym")
        .expect("recurring");

    let days: Vec<u32> = cal.get_events_by_tag("gym").keys().map(|d| d.day()).collect();
    assert_eq!(days, [1, 4, 7, 10, 13]);
    assert!(cal.get_events(ymd(2025, 11, 15)).is_empty());

    assert_eq!(
        cal.add_recurring_event(ymd(2025, 11, 1), ymd(2025, 11, 15), 0, "Gym", "", "gym"),
        Err(CalendarError::InvalidInterval(0))
    );
}

#[test]
fn removals_never_leave_empty_days() {
    let mut cal = november_calendar();
    let day = ymd(2025, 10, 28);
    cal.add_event(day, "Coco - Gustavo", "occupied", "stay").expect("add");
    cal.add_event(day, "Pepe - Andrea", "occupied", "stay").expect("add");
    cal.add_event(ymd(2025, 11, 2), "Leg day", "", "gym").expect("add");

    assert!(cal.remove_event(day, "Coco - Gustavo"));
    assert!(cal.events().contains_date(day));
    assert!(cal.remove_event(day, "Pepe - Andrea"));
    assert!(!cal.events().contains_date(day));
    assert!(!cal.remove_event(day, "Pepe - Andrea"));

    assert!(cal.clear_day(ymd(2025, 11, 2)));
    assert!(!cal.clear_day(ymd(2025, 11, 2)));
    assert_eq!(cal.events().day_count(), 0);
}

#[test]
fn get_events_returns_a_copy() {
    let mut cal = november_calendar();
    let day = ymd(2025, 11, 9);
    cal.add_event(day, "Swim", "", "gym").expect("add");

    let mut copy = cal.get_events(day);
    copy.clear();
    assert_eq!(cal.get_events(day).len(), 1);
    assert!(cal.get_events(ymd(2025, 11, 10)).is_empty());
}

#[test]
fn removing_a_tag_optionally_cascades() {
    let mut cal = november_calendar();
    cal.add_event(ymd(2025, 11, 3), "Run", "", "gym").expect("add");
    cal.add_event(ymd(2025, 11, 4), "Guest", "", "stay").expect("add");
    cal.flush_directives();

    cal.remove_tag("gym", false).expect("remove gym");
    let cell = cal.cell(ymd(2025, 11, 3)).expect("visible");
    assert_eq!(cell.events.len(), 1);
    assert_eq!(cell.events[0].color, "gray");
    assert_eq!(cal.get_events(ymd(2025, 11, 3)).len(), 1);

    cal.remove_tag("stay", true).expect("remove stay");
    assert!(cal.get_events(ymd(2025, 11, 4)).is_empty());
    assert!(!cal.events().contains_date(ymd(2025, 11, 4)));

    let refreshed: Vec<NaiveDate> = cal
        .flush_directives()
        .into_iter()
        .filter_map(|directive| match directive {
            RenderDirective::Cell(cell) => Some(cell.date),
            RenderDirective::Full(_) => None,
        })
        .collect();
    assert_eq!(refreshed, vec![ymd(2025, 11, 3), ymd(2025, 11, 4)]);

    assert_eq!(
        cal.remove_tag("stay", true),
        Err(CalendarError::TagNotFound("stay".to_string()))
    );
}

#[test]
fn hide_then_show_restores_visible_events() {
    let mut cal = november_calendar();
    cal.add_event_range(ymd(2025, 11, 1), ymd(2025, 11, 3), "Guest", "", "stay")
        .expect("range");
    cal.add_event(ymd(2025, 11, 2), "Lift", "", "gym").expect("add");
    let before = cal.current_window();

    cal.hide_tag("stay").expect("hide");
    let hidden = cal.current_window();
    let cell = hidden.cell(ymd(2025, 11, 2)).expect("cell");
    assert_eq!(cell.events.len(), 1);
    assert_eq!(cell.events[0].name, "Lift");

    cal.show_tag("stay").expect("show");
    assert_eq!(cal.current_window(), before);

    assert!(!cal.toggle_tag("gym").expect("toggle"));
    assert!(cal.toggle_tag("gym").expect("toggle"));
    assert_eq!(cal.current_window(), before);
}

#[test]
fn upcoming_window_is_inclusive_and_skips_hidden_tags() {
    let mut cal = november_calendar();
    cal.add_event(ymd(2025, 11, 8), "Boundary", "", "stay").expect("add");
    cal.add_event(ymd(2025, 11, 9), "Too late", "", "stay").expect("add");
    cal.add_event(ymd(2025, 11, 2), "Hidden", "", "gym").expect("add");
    cal.hide_tag("gym").expect("hide");

    let upcoming = cal
        .get_upcoming_events(7, Some(ymd(2025, 11, 1)))
        .expect("upcoming");
    assert_eq!(upcoming.len(), 1);
    assert_eq!(upcoming[0].0, ymd(2025, 11, 8));
    assert_eq!(upcoming[0].1.name, "Boundary");

    let from_today = cal.get_upcoming_events(2, None).expect("upcoming");
    assert!(from_today.is_empty());

    assert_eq!(
        cal.get_upcoming_events(0, None),
        Err(CalendarError::InvalidWindow(0))
    );
}

#[test]
fn selection_is_exclusive() {
    let mut cal = november_calendar();
    let a = ymd(2025, 11, 10);
    let b = ymd(2025, 11, 11);

    assert!(cal.select(a));
    assert!(cal.select(b));
    assert_eq!(cal.selected(), Some(b));

    let window = cal.current_window();
    assert_eq!(window.cells.iter().filter(|cell| cell.selected).count(), 1);

    assert!(!cal.toggle(b));
    assert!(cal.toggle(b));
    assert!(!cal.toggle(b));
    assert_eq!(cal.selected(), None);

    assert!(!cal.deselect(a));
}

#[test]
fn window_metadata_marks_today_and_spillover() {
    let cal = november_calendar();
    let window = cal.current_window();
    assert_eq!((window.year, window.month), (2025, 11));
    assert_eq!(window.cells.len(), 42);

    let today = window.cell(ymd(2025, 11, 5)).expect("today");
    assert!(today.is_today && today.in_month);

    let spill = window.cell(ymd(2025, 10, 31)).expect("spillover");
    assert!(!spill.in_month);
    assert!(!spill.is_today);
}

#[test]
fn navigation_rolls_over_and_recomputes() {
    let config = CalendarConfig {
        initial_date: Some(ymd(2025, 1, 31)),
        ..CalendarConfig::default()
    };
    let mut cal = Calendar::with_today(config, ymd(2025, 1, 31));
    cal.advance_month(1);
    assert_eq!(cal.current_date(), ymd(2025, 2, 28));
    cal.advance_month(11);
    assert_eq!((cal.current_year(), cal.current_month()), (2026, 1));
    cal.advance_year(-1);
    assert_eq!((cal.current_year(), cal.current_month()), (2025, 1));

    let first = cal.current_window();
    cal.go_to(ymd(2025, 1, 2));
    assert_eq!(cal.current_window(), first);
}

#[test]
fn export_dump_is_readable_as_written() {
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("calendar.json");

    let mut cal = november_calendar();
    cal.add_event_range(ymd(2025, 11, 1), ymd(2025, 11, 7), "Eco - Pepito", "", "stay")
        .expect("range");
    cal.hide_tag("gym").expect("hide");
    cal.export(&path).expect("export");

    let dump = ExportDump::read(&path).expect("read export");
    assert_eq!(dump.tags.len(), 2);
    assert!(!dump.tags["gym"].visible);
    assert_eq!(dump.tags["stay"].desc, "apartment booked");
    assert_eq!(dump.events.len(), 7);
    assert_eq!(dump.event_count(), 7);
    assert_eq!(dump.events["2025-11-07"][0].name, "Eco - Pepito");
}

#[test]
fn config_file_drives_construction() {
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("calendar.toml");
    std::fs::write(
        &path,
        "week_start = \"monday\"\ninitial_date = \"2026-02-14\"\n\n[policies]\nspillover_selection = \"navigate\"\n",
    )
    .expect("write config");

    let cfg = CalendarConfig::load(Some(&path)).expect("load config");
    let mut cal = Calendar::with_today(cfg, ymd(2026, 2, 14));
    assert_eq!(cal.visible_window().first(), ymd(2026, 1, 26));

    assert!(cal.select(ymd(2026, 1, 30)));
    assert_eq!(cal.current_month(), 1);

    let missing = temp.path().join("missing.toml");
    assert!(CalendarConfig::load(Some(&missing)).is_err());
}

#[test]
fn open_reads_config_and_logging_section() {
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("calendar.toml");
    std::fs::write(
        &path,
        "initial_date = \"2025-11-01\"\n\n[logging]\nfilter = \"daygrid_core=debug\"\nansi = false\n",
    )
    .expect("write config");

    let cal = Calendar::open(Some(&path)).expect("open calendar");
    assert_eq!(cal.config().logging.filter, "daygrid_core=debug");
    assert_eq!((cal.current_year(), cal.current_month()), (2025, 11));

    let broken = temp.path().join("broken.toml");
    std::fs::write(&broken, "[logging\n").expect("write config");
    assert!(Calendar::open(Some(&broken)).is_err());
}

#[test]
fn huge_upcoming_window_reaches_the_end_of_time() {
    let mut cal = november_calendar();
    cal.add_event(ymd(2025, 11, 2), "Soon", "", "stay").expect("add");
    cal.add_event(ymd(9999, 12, 31), "Far", "", "gym").expect("add");

    let upcoming = cal
        .get_upcoming_events(i64::MAX, Some(ymd(2025, 11, 1)))
        .expect("upcoming");
    let names: Vec<&str> = upcoming.iter().map(|(_, event)| event.name.as_str()).collect();
    assert_eq!(names, ["Soon", "Far"]);
}

fn refreshed_cells(cal: &mut Calendar) -> Vec<(NaiveDate, Vec<String>)> {
    cal.flush_directives()
        .into_iter()
        .filter_map(|directive| match directive {
            RenderDirective::Cell(cell) => Some((
                cell.date,
                cell.events.iter().map(|event| event.color.clone()).collect(),
            )),
            RenderDirective::Full(_) => None,
        })
        .collect()
}

#[test]
fn recoloring_a_tag_refreshes_its_visible_dates() {
    let mut cal = november_calendar();
    cal.add_event(ymd(2025, 11, 3), "Run", "", "gym").expect("add");
    cal.add_event(ymd(2025, 11, 20), "Lift", "", "gym").expect("add");
    cal.add_event(ymd(2026, 2, 1), "Outside", "", "gym").expect("add");
    cal.add_event(ymd(2025, 11, 4), "Guest", "", "stay").expect("add");
    cal.flush_directives();

    cal.update_tag(
        "gym",
        TagPatch {
            color: Some("blue".to_string()),
            desc: None,
        },
    )
    .expect("update gym");
    assert_eq!(
        refreshed_cells(&mut cal),
        vec![
            (ymd(2025, 11, 3), vec!["blue".to_string()]),
            (ymd(2025, 11, 20), vec!["blue".to_string()]),
        ]
    );

    cal.upsert_tag(Tag::new("stay", "violet")).expect("upsert stay");
    assert_eq!(
        refreshed_cells(&mut cal),
        vec![(ymd(2025, 11, 4), vec!["violet".to_string()])]
    );
}

#[test]
fn re_registering_a_dangling_tag_drops_the_fallback_color() {
    let mut cal = november_calendar();
    cal.add_event(ymd(2025, 11, 12), "Swim", "", "gym").expect("add");
    cal.remove_tag("gym", false).expect("remove gym");
    assert_eq!(
        refreshed_cells(&mut cal),
        vec![(ymd(2025, 11, 12), vec!["gray".to_string()])]
    );

    cal.add_tag(Tag::new("gym", "orange")).expect("re-add gym");
    assert_eq!(
        refreshed_cells(&mut cal),
        vec![(ymd(2025, 11, 12), vec!["orange".to_string()])]
    );
}
