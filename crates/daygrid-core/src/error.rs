use chrono::NaiveDate;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CalendarError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CalendarError {
    #[error("event name must not be empty")]
    InvalidName,

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("unknown tag: {0}")]
    UnknownTag(String),

    #[error("tag not found: {0}")]
    TagNotFound(String),

    #[error("tag already exists: {0}")]
    DuplicateTag(String),

    #[error("end date {end} is before start date {start}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("recurrence interval must be at least one day, got {0}")]
    InvalidInterval(i64),

    #[error("look-ahead window must be at least one day, got {0}")]
    InvalidWindow(i64),
}
