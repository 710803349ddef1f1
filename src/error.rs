//! Error types for the schedule engine.

use chrono::NaiveDate;
use thiserror::Error;

/// Errors that can occur in schedule operations.
#[derive(Error, Debug)]
pub enum ScheduleError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid time '{0}': expected HH:mm")]
    InvalidTime(String),

    #[error("Invalid day-of-week {0}: expected 2 (Monday) through 8 (Sunday)")]
    InvalidDayOfWeek(u8),

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Time range is empty or reversed: {start}-{end}")]
    EmptyTimeRange { start: String, end: String },

    #[error("Date {date} is before the owner's effective period starting {effective_from}")]
    BeforeEffectivePeriod {
        date: NaiveDate,
        effective_from: NaiveDate,
    },

    #[error("Slot not found: {0}")]
    SlotNotFound(String),

    #[error("Override not found: {0}")]
    OverrideNotFound(String),

    #[error("Occurrence has no recurring series: {0}")]
    NoSeries(String),

    #[error(
        "Dangling suppression: override {override_id} replaces {date} but the owner has no slot on that weekday"
    )]
    DanglingSuppression {
        override_id: String,
        date: NaiveDate,
    },

    #[error("Store error: {0}")]
    Store(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for schedule operations.
pub type ScheduleResult<T> = Result<T, ScheduleError>;
