//! Persisted schedule records.
//!
//! One generic recurring-slot + override mechanism covers both class
//! schedules and the staff-duty roster; entity-specific fields the engine
//! does not interpret ride in an opaque JSON payload.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::time::{ClockTime, DayOfWeek};

/// What kind of entity owns a recurring slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Class,
    StaffDuty,
}

/// Owner of a recurring slot: a class or a staff-duty roster entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OwnerId {
    pub kind: EntityKind,
    pub id: String,
}

impl OwnerId {
    pub fn class(id: &str) -> Self {
        OwnerId {
            kind: EntityKind::Class,
            id: id.to_string(),
        }
    }

    pub fn staff_duty(id: &str) -> Self {
        OwnerId {
            kind: EntityKind::StaffDuty,
            id: id.to_string(),
        }
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let kind = match self.kind {
            EntityKind::Class => "class",
            EntityKind::StaffDuty => "duty",
        };
        write!(f, "{}:{}", kind, self.id)
    }
}

/// A base weekly recurring schedule slot.
///
/// Mutated only by a series move or a series-wide edit; a single-occurrence
/// move never touches it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklySlot {
    pub id: String,
    pub owner: OwnerId,
    pub day: DayOfWeek,
    pub start: ClockTime,
    pub end: ClockTime,
    pub location: Option<String>,
    /// First date the owning class meets; move targets before it are rejected.
    pub effective_from: Option<NaiveDate>,
    pub effective_until: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub payload: Value,
}

impl WeeklySlot {
    pub fn new(owner: OwnerId, day: DayOfWeek, start: ClockTime, end: ClockTime) -> Self {
        WeeklySlot {
            id: Uuid::new_v4().to_string(),
            owner,
            day,
            start,
            end,
            location: None,
            effective_from: None,
            effective_until: None,
            payload: Value::Null,
        }
    }

    /// Whether `date` falls inside the slot's effective period.
    pub fn in_effect_on(&self, date: NaiveDate) -> bool {
        if let Some(from) = self.effective_from
            && date < from
        {
            return false;
        }
        if let Some(until) = self.effective_until
            && date > until
        {
            return false;
        }
        true
    }
}

/// The original base occurrence a date-specific override stands in for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplacedOccurrence {
    pub date: NaiveDate,
    pub day: DayOfWeek,
}

/// A date-specific schedule exception.
///
/// Either replaces a suppressed base occurrence (`replaces` set) or adds an
/// ad hoc one (`replaces` empty).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleOverride {
    pub id: String,
    pub owner: OwnerId,
    pub date: NaiveDate,
    /// Derived from `date`; validated against it at the store boundary.
    pub day: DayOfWeek,
    pub start: ClockTime,
    pub end: ClockTime,
    pub location: Option<String>,
    pub note: Option<String>,
    pub replaces: Option<ReplacedOccurrence>,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub payload: Value,
}

impl ScheduleOverride {
    pub fn new(owner: OwnerId, date: NaiveDate, start: ClockTime, end: ClockTime) -> Self {
        ScheduleOverride {
            id: Uuid::new_v4().to_string(),
            owner,
            date,
            day: DayOfWeek::from_date(date),
            start,
            end,
            location: None,
            note: None,
            replaces: None,
            payload: Value::Null,
        }
    }
}

/// An attendance session record, owned by the session store.
///
/// Times are copies taken when the session was created; the synchronizer
/// keeps them in step with the resolved occurrence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub class_id: String,
    pub date: NaiveDate,
    pub start: ClockTime,
    pub end: ClockTime,
}
