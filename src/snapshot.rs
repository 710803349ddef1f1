//! Immutable snapshot of the schedule store.
//!
//! Resolution and layout are pure functions over a snapshot; the engine
//! rebuilds it whenever the store pushes a change notification. Parsing is
//! per-record: a malformed slot or override is dropped with a finding
//! instead of poisoning the whole snapshot.

use tracing::warn;

use crate::error::ScheduleError;
use crate::ledger::ExceptionLedger;
use crate::record::{
    EntityKind, OwnerId, ReplacedOccurrence, ScheduleOverride, WeeklySlot,
};
use crate::store::{RawOverride, RawScheduleRecords, RawSlot};
use crate::time::{ClockTime, DayOfWeek};

/// A record the snapshot had to drop or flag, and why.
#[derive(Debug)]
pub struct SnapshotFinding {
    pub record_id: String,
    pub error: ScheduleError,
}

#[derive(Debug, Clone, Default)]
pub struct ScheduleSnapshot {
    slots: Vec<WeeklySlot>,
    ledger: ExceptionLedger,
}

impl ScheduleSnapshot {
    pub fn new(slots: Vec<WeeklySlot>, overrides: Vec<ScheduleOverride>) -> Self {
        ScheduleSnapshot {
            slots,
            ledger: ExceptionLedger::new(overrides),
        }
    }

    /// Parse-and-validate raw store records. Bad records are skipped and
    /// reported; the remainder forms the snapshot.
    pub fn from_raw(raw: RawScheduleRecords) -> (Self, Vec<SnapshotFinding>) {
        let mut findings = Vec::new();
        let mut slots = Vec::new();
        let mut overrides = Vec::new();

        for record in raw.slots {
            let id = record.id.clone();
            match parse_slot(record) {
                Ok(slot) => slots.push(slot),
                Err(error) => {
                    warn!(record_id = %id, %error, "dropping malformed slot record");
                    findings.push(SnapshotFinding {
                        record_id: id,
                        error,
                    });
                }
            }
        }
        for record in raw.overrides {
            let id = record.id.clone();
            match parse_override(record) {
                Ok(ov) => overrides.push(ov),
                Err(error) => {
                    warn!(record_id = %id, %error, "dropping malformed override record");
                    findings.push(SnapshotFinding {
                        record_id: id,
                        error,
                    });
                }
            }
        }

        (ScheduleSnapshot::new(slots, overrides), findings)
    }

    pub fn slots(&self) -> &[WeeklySlot] {
        &self.slots
    }

    pub fn slot(&self, id: &str) -> Option<&WeeklySlot> {
        self.slots.iter().find(|s| s.id == id)
    }

    pub fn slots_for<'a>(&'a self, owner: &'a OwnerId) -> impl Iterator<Item = &'a WeeklySlot> {
        self.slots.iter().filter(move |s| s.owner == *owner)
    }

    pub fn ledger(&self) -> &ExceptionLedger {
        &self.ledger
    }

    /// Consistency findings for the current snapshot (dangling suppressions).
    pub fn check(&self) -> Vec<ScheduleError> {
        self.ledger.check(&self.slots)
    }
}

fn parse_owner(kind: &str, id: String) -> Result<OwnerId, ScheduleError> {
    let kind = match kind {
        "class" => EntityKind::Class,
        "staff_duty" => EntityKind::StaffDuty,
        _ => return Err(ScheduleError::MissingField("owner_kind")),
    };
    Ok(OwnerId { kind, id })
}

fn parse_time_pair(start: &str, end: &str) -> Result<(ClockTime, ClockTime), ScheduleError> {
    let start = ClockTime::parse(start)?;
    let end = ClockTime::parse(end)?;
    if start >= end {
        return Err(ScheduleError::EmptyTimeRange {
            start: start.to_string(),
            end: end.to_string(),
        });
    }
    Ok((start, end))
}

fn parse_slot(raw: RawSlot) -> Result<WeeklySlot, ScheduleError> {
    let owner = parse_owner(&raw.owner_kind, raw.owner_id)?;
    let day = DayOfWeek::new(raw.day_of_week)?;
    let (start, end) = parse_time_pair(&raw.start_time, &raw.end_time)?;
    Ok(WeeklySlot {
        id: raw.id,
        owner,
        day,
        start,
        end,
        location: raw.location,
        effective_from: raw.effective_from,
        effective_until: raw.effective_until,
        payload: raw.payload,
    })
}

fn parse_override(raw: RawOverride) -> Result<ScheduleOverride, ScheduleError> {
    let owner = parse_owner(&raw.owner_kind, raw.owner_id)?;
    let day = DayOfWeek::new(raw.day_of_week)?;
    if day != DayOfWeek::from_date(raw.date) {
        // stored weekday must agree with the date it was derived from
        return Err(ScheduleError::InvalidDayOfWeek(raw.day_of_week));
    }
    let (start, end) = parse_time_pair(&raw.start_time, &raw.end_time)?;
    let replaces = match (raw.replaces_date, raw.replaces_day_of_week) {
        (Some(date), Some(day)) => {
            let day = DayOfWeek::new(day)?;
            if day != DayOfWeek::from_date(date) {
                return Err(ScheduleError::InvalidDayOfWeek(day.number()));
            }
            Some(ReplacedOccurrence { date, day })
        }
        (None, None) => None,
        (Some(_), None) => return Err(ScheduleError::MissingField("replaces_day_of_week")),
        (None, Some(_)) => return Err(ScheduleError::MissingField("replaces_date")),
    };
    Ok(ScheduleOverride {
        id: raw.id,
        owner,
        date: raw.date,
        day,
        start,
        end,
        location: raw.location,
        note: raw.note,
        replaces,
        payload: raw.payload,
    })
}
