//! Resolved occurrences.
//!
//! An `Occurrence` is computed, never persisted: the single authoritative
//! meeting of an owner on a specific date, derived either from a base weekly
//! slot or from an override.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::record::{OwnerId, ScheduleOverride, WeeklySlot};
use crate::time::{ClockTime, DayOfWeek};

/// Where a resolved occurrence came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum OccurrenceSource {
    Base { slot_id: String },
    Override { override_id: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Occurrence {
    pub owner: OwnerId,
    pub date: NaiveDate,
    pub day: DayOfWeek,
    pub start: ClockTime,
    pub end: ClockTime,
    pub location: Option<String>,
    pub source: OccurrenceSource,
}

impl Occurrence {
    pub fn from_slot(slot: &WeeklySlot, date: NaiveDate) -> Self {
        Occurrence {
            owner: slot.owner.clone(),
            date,
            day: slot.day,
            start: slot.start.clone(),
            end: slot.end.clone(),
            location: slot.location.clone(),
            source: OccurrenceSource::Base {
                slot_id: slot.id.clone(),
            },
        }
    }

    pub fn from_override(ov: &ScheduleOverride) -> Self {
        Occurrence {
            owner: ov.owner.clone(),
            date: ov.date,
            day: ov.day,
            start: ov.start.clone(),
            end: ov.end.clone(),
            location: ov.location.clone(),
            source: OccurrenceSource::Override {
                override_id: ov.id.clone(),
            },
        }
    }

    pub fn is_override(&self) -> bool {
        matches!(self.source, OccurrenceSource::Override { .. })
    }

    /// Id of the backing record (slot or override).
    pub fn source_id(&self) -> &str {
        match &self.source {
            OccurrenceSource::Base { slot_id } => slot_id,
            OccurrenceSource::Override { override_id } => override_id,
        }
    }

    /// Stable key for layout maps and UI reconciliation.
    pub fn key(&self) -> String {
        format!("{}@{}/{}", self.owner, self.date, self.source_id())
    }

    /// Strict interval overlap: touching endpoints do not overlap.
    pub fn overlaps(&self, other: &Occurrence) -> bool {
        self.start < other.end && other.start < self.end
    }
}
