//! Store collaborator boundaries.
//!
//! The engine never persists anything itself. Two external stores are the
//! only collaborators: the schedule store (weekly slots + overrides) and the
//! session store (attendance records). Reads return the full collection as
//! raw, not-yet-validated records; `ScheduleSnapshot::from_raw` turns them
//! into typed values. Writes are fire-and-acknowledge: the store is
//! last-write-wins and pushes a change notification afterwards, which is
//! what refreshes the engine's snapshot.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ScheduleResult;
use crate::range::DateRange;
use crate::record::{EntityKind, OwnerId, ScheduleOverride, Session, WeeklySlot};

/// Raw weekly-slot record as the schedule store returns it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawSlot {
    pub id: String,
    pub owner_kind: String,
    pub owner_id: String,
    pub day_of_week: u8,
    pub start_time: String,
    pub end_time: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub effective_from: Option<NaiveDate>,
    #[serde(default)]
    pub effective_until: Option<NaiveDate>,
    #[serde(default)]
    pub payload: Value,
}

/// Raw override record as the schedule store returns it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawOverride {
    pub id: String,
    pub owner_kind: String,
    pub owner_id: String,
    pub date: NaiveDate,
    pub day_of_week: u8,
    pub start_time: String,
    pub end_time: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub replaces_date: Option<NaiveDate>,
    #[serde(default)]
    pub replaces_day_of_week: Option<u8>,
    #[serde(default)]
    pub payload: Value,
}

/// Everything the schedule store holds, in one read.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawScheduleRecords {
    pub slots: Vec<RawSlot>,
    pub overrides: Vec<RawOverride>,
}

fn owner_kind_str(owner: &OwnerId) -> String {
    match owner.kind {
        EntityKind::Class => "class".to_string(),
        EntityKind::StaffDuty => "staff_duty".to_string(),
    }
}

impl From<&WeeklySlot> for RawSlot {
    fn from(slot: &WeeklySlot) -> RawSlot {
        RawSlot {
            id: slot.id.clone(),
            owner_kind: owner_kind_str(&slot.owner),
            owner_id: slot.owner.id.clone(),
            day_of_week: slot.day.number(),
            start_time: slot.start.to_string(),
            end_time: slot.end.to_string(),
            location: slot.location.clone(),
            effective_from: slot.effective_from,
            effective_until: slot.effective_until,
            payload: slot.payload.clone(),
        }
    }
}

impl From<&ScheduleOverride> for RawOverride {
    fn from(ov: &ScheduleOverride) -> RawOverride {
        RawOverride {
            id: ov.id.clone(),
            owner_kind: owner_kind_str(&ov.owner),
            owner_id: ov.owner.id.clone(),
            date: ov.date,
            day_of_week: ov.day.number(),
            start_time: ov.start.to_string(),
            end_time: ov.end.to_string(),
            location: ov.location.clone(),
            note: ov.note.clone(),
            replaces_date: ov.replaces.map(|r| r.date),
            replaces_day_of_week: ov.replaces.map(|r| r.day.number()),
            payload: ov.payload.clone(),
        }
    }
}

/// The schedule store collaborator (slots + overrides).
///
/// A failed write means the operation was not applied; callers surface the
/// error and wait for the next change notification rather than merging
/// optimistically.
#[allow(async_fn_in_trait)]
pub trait ScheduleStore {
    async fn load(&self) -> ScheduleResult<RawScheduleRecords>;
    async fn upsert_slot(&self, slot: &WeeklySlot) -> ScheduleResult<()>;
    async fn delete_slot(&self, slot_id: &str) -> ScheduleResult<()>;
    async fn upsert_override(&self, ov: &ScheduleOverride) -> ScheduleResult<()>;
    async fn delete_override(&self, override_id: &str) -> ScheduleResult<()>;
}

/// The attendance-session store collaborator.
///
/// Only date and time fields are ever written from here.
#[allow(async_fn_in_trait)]
pub trait SessionStore {
    async fn sessions_in_range(
        &self,
        class_id: &str,
        range: DateRange,
    ) -> ScheduleResult<Vec<Session>>;
    async fn upsert(&self, session: &Session) -> ScheduleResult<()>;
}
