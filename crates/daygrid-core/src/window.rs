use chrono::{Datelike, Days, Months, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

pub const WINDOW_DAYS: usize = 42;
pub const WEEK_DAYS: usize = 7;

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekStart {
    #[default]
    Sunday,
    Monday,
}

impl WeekStart {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "sunday" | "sun" => Some(Self::Sunday),
            "monday" | "mon" => Some(Self::Monday),
            _ => None,
        }
    }

    pub fn weekday(self) -> Weekday {
        match self {
            Self::Sunday => Weekday::Sun,
            Self::Monday => Weekday::Mon,
        }
    }

    /// Days between the first grid column and `day`.
    pub fn offset(self, day: NaiveDate) -> i64 {
        let monday_based = i64::from(day.weekday().num_days_from_monday());
        match self {
            Self::Sunday => (monday_based + 1) % 7,
            Self::Monday => monday_based,
        }
    }

    /// English day abbreviations in grid column order.
    pub fn day_labels(self) -> [&'static str; WEEK_DAYS] {
        let mut day = self.weekday();
        let mut labels = [""; WEEK_DAYS];
        for label in &mut labels {
            *label = match day {
                Weekday::Mon => "Mon",
                Weekday::Tue => "Tue",
                Weekday::Wed => "Wed",
                Weekday::Thu => "Thu",
                Weekday::Fri => "Fri",
                Weekday::Sat => "Sat",
                Weekday::Sun => "Sun",
            };
            day = day.succ();
        }
        labels
    }
}

pub fn month_name(month: u32) -> &'static str {
    month
        .checked_sub(1)
        .and_then(|idx| MONTH_NAMES.get(idx as usize))
        .copied()
        .unwrap_or("")
}

pub fn first_day_of_month(year: i32, month: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(NaiveDate::MIN)
}

pub fn last_day_of_month(year: i32, month: u32) -> NaiveDate {
    let first = first_day_of_month(year, month);
    first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(NaiveDate::MAX)
}

/// Shifts by whole months, clamping the day to the target month's length
/// (Jan 31 + 1 month is Feb 28/29). Targets whose window would run off the
/// calendar's range leave `date` as is.
pub fn shift_months(date: NaiveDate, months: i32) -> NaiveDate {
    let magnitude = Months::new(months.unsigned_abs());
    let shifted = if months >= 0 {
        date.checked_add_months(magnitude)
    } else {
        date.checked_sub_months(magnitude)
    };
    shifted.filter(|target| window_fits(*target)).unwrap_or(date)
}

pub fn shift_years(date: NaiveDate, years: i32) -> NaiveDate {
    match years.checked_mul(12) {
        Some(months) => shift_months(date, months),
        None => date,
    }
}

/// Whether the month holding `date` has a full window under either week start.
pub fn window_fits(date: NaiveDate) -> bool {
    let first = first_day_of_month(date.year(), date.month());
    first.checked_sub_days(Days::new(WEEK_DAYS as u64 - 1)).is_some()
        && first.checked_add_days(Days::new(WINDOW_DAYS as u64 - 1)).is_some()
}

fn latest_window_start() -> NaiveDate {
    NaiveDate::MAX
        .checked_sub_days(Days::new(WINDOW_DAYS as u64 - 1))
        .unwrap_or(NaiveDate::MAX)
}

/// The six full weeks shown for one month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibleWindow {
    year: i32,
    month: u32,
    dates: [NaiveDate; WINDOW_DAYS],
}

impl VisibleWindow {
    pub fn compute(year: i32, month: u32, week_start: WeekStart) -> Self {
        let first = first_day_of_month(year, month);
        // Months at the edges of the date range slide the grid inward.
        let start = first
            .checked_sub_days(Days::new(week_start.offset(first).unsigned_abs()))
            .unwrap_or(NaiveDate::MIN)
            .min(latest_window_start());

        let dates = std::array::from_fn(|idx| {
            start
                .checked_add_days(Days::new(idx as u64))
                .unwrap_or(NaiveDate::MAX)
        });

        Self { year, month, dates }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn dates(&self) -> &[NaiveDate; WINDOW_DAYS] {
        &self.dates
    }

    pub fn first(&self) -> NaiveDate {
        self.dates[0]
    }

    pub fn last(&self) -> NaiveDate {
        self.dates[WINDOW_DAYS - 1]
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.first() <= date && date <= self.last()
    }

    pub fn in_month(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    /// Grid position (row, column) of a visible date.
    pub fn position(&self, date: NaiveDate) -> Option<(usize, usize)> {
        if !self.contains(date) {
            return None;
        }
        let idx = (date - self.first()).num_days() as usize;
        Some((idx / WEEK_DAYS, idx % WEEK_DAYS))
    }

    pub fn weeks(&self) -> impl Iterator<Item = &[NaiveDate]> {
        self.dates.chunks(WEEK_DAYS)
    }
}
