//! Move and edit operations for occurrences.
//!
//! Two tiers everywhere: a single-date change goes through the override
//! ledger and never touches the weekly slot; a series-wide change rewrites
//! the slot and purges the exceptions it obsoletes. Writes are ordered so
//! the slot/override upsert lands before any dependent deletion, and
//! session synchronization runs last. A session write that fails after an
//! acknowledged ledger write is logged and left to the reconciliation pass.

use chrono::NaiveDate;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{ScheduleError, ScheduleResult};
use crate::occurrence::{Occurrence, OccurrenceSource};
use crate::range::DateRange;
use crate::record::{EntityKind, OwnerId, ReplacedOccurrence, ScheduleOverride, WeeklySlot};
use crate::snapshot::ScheduleSnapshot;
use crate::store::{ScheduleStore, SessionStore};
use crate::sync::SessionSynchronizer;
use crate::time::{ClockTime, DayOfWeek};

/// A time/room change applied to one occurrence or to the whole series.
#[derive(Debug, Clone)]
pub struct OccurrenceEdit {
    pub start: ClockTime,
    pub end: ClockTime,
    pub location: Option<String>,
}

pub struct OccurrenceMover<'a, S: ScheduleStore, T: SessionStore> {
    schedule: &'a S,
    sessions: SessionSynchronizer<'a, T>,
    horizon_days: u64,
}

impl<'a, S: ScheduleStore, T: SessionStore> OccurrenceMover<'a, S, T> {
    pub fn new(schedule: &'a S, sessions: &'a T, horizon_days: u64) -> Self {
        OccurrenceMover {
            schedule,
            sessions: SessionSynchronizer::new(sessions),
            horizon_days,
        }
    }

    /// Relocate exactly one date's occurrence, leaving the series untouched.
    ///
    /// A base occurrence gains an override that back-references the replaced
    /// date; a moved override is re-created at the target with its original
    /// root `replaces` intact, so a chain of re-moves keeps suppressing the
    /// true base date. Re-applying the same intent is idempotent.
    pub async fn move_single(
        &self,
        snapshot: &ScheduleSnapshot,
        occurrence: &Occurrence,
        target_date: NaiveDate,
        today: NaiveDate,
    ) -> ScheduleResult<ScheduleOverride> {
        self.validate_move_target(snapshot, &occurrence.owner, target_date)?;

        let (replaces, displaced_id, note, payload) = match &occurrence.source {
            OccurrenceSource::Base { slot_id } => {
                let slot = snapshot
                    .slot(slot_id)
                    .ok_or_else(|| ScheduleError::SlotNotFound(slot_id.clone()))?;
                let replaces = Some(ReplacedOccurrence {
                    date: occurrence.date,
                    day: occurrence.day,
                });
                (replaces, None, None, slot.payload.clone())
            }
            OccurrenceSource::Override { override_id } => {
                let old = snapshot
                    .ledger()
                    .get(override_id)
                    .ok_or_else(|| ScheduleError::OverrideNotFound(override_id.clone()))?;
                // keep the chain pointing at the true original base occurrence
                (old.replaces, Some(old.id.clone()), old.note.clone(), old.payload.clone())
            }
        };

        // adopt the id of any override already standing on the target date,
        // so the write is an upsert by own key rather than a duplicate
        let id = snapshot
            .ledger()
            .direct(&occurrence.owner, target_date)
            .map(|existing| existing.id.clone())
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        let ov = ScheduleOverride {
            id,
            owner: occurrence.owner.clone(),
            date: target_date,
            day: DayOfWeek::from_date(target_date),
            start: occurrence.start.clone(),
            end: occurrence.end.clone(),
            location: occurrence.location.clone(),
            note,
            replaces,
            payload,
        };

        self.schedule.upsert_override(&ov).await?;
        if let Some(old_id) = displaced_id
            && old_id != ov.id
        {
            self.schedule.delete_override(&old_id).await?;
        }
        debug!(owner = %occurrence.owner, from = %occurrence.date, to = %target_date, "moved occurrence");

        if occurrence.owner.kind == EntityKind::Class && occurrence.date >= today {
            let relocated = self
                .sessions
                .relocate(
                    &occurrence.owner.id,
                    occurrence.date,
                    target_date,
                    &ov.start,
                    &ov.end,
                )
                .await;
            if let Err(error) = relocated {
                // the ledger write already landed; reconciliation catches the
                // session up later
                warn!(%error, owner = %occurrence.owner, "session relocation failed");
            }
        }

        Ok(ov)
    }

    /// Change the recurring day-of-week for the whole series.
    ///
    /// Never creates an override; deletes every exception tied to the old
    /// weekday (directly or through `replaces`) once the slot write is
    /// acknowledged, then shifts matching future sessions by the weekday
    /// delta, week offsets preserved.
    pub async fn move_series(
        &self,
        snapshot: &ScheduleSnapshot,
        occurrence: &Occurrence,
        target_day: DayOfWeek,
        today: NaiveDate,
    ) -> ScheduleResult<WeeklySlot> {
        let slot = self.series_slot(snapshot, occurrence)?;
        let old_day = slot.day;
        if old_day == target_day {
            return Ok(slot.clone());
        }

        let mut updated = slot.clone();
        updated.day = target_day;
        self.schedule.upsert_slot(&updated).await?;
        debug!(owner = %occurrence.owner, %old_day, new_day = %target_day, "moved series");

        for ov in snapshot.ledger().for_owner(&occurrence.owner) {
            let tied_to_old_day =
                ov.day == old_day || ov.replaces.is_some_and(|r| r.day == old_day);
            if tied_to_old_day {
                self.schedule.delete_override(&ov.id).await?;
            }
        }

        if occurrence.owner.kind == EntityKind::Class {
            let delta = old_day.days_until(target_day);
            let range = DateRange::horizon(today, self.horizon_days);
            let shifted = self
                .sessions
                .shift_series(&occurrence.owner.id, range, &slot.start, &slot.end, delta)
                .await;
            if let Err(error) = shifted {
                warn!(%error, owner = %occurrence.owner, "session shift failed");
            }
        }

        Ok(updated)
    }

    /// Change time/room for one date only, via an override upsert.
    pub async fn edit_single(
        &self,
        snapshot: &ScheduleSnapshot,
        occurrence: &Occurrence,
        edit: &OccurrenceEdit,
        today: NaiveDate,
    ) -> ScheduleResult<ScheduleOverride> {
        validate_times(&edit.start, &edit.end)?;

        let ov = match &occurrence.source {
            OccurrenceSource::Base { slot_id } => {
                let slot = snapshot
                    .slot(slot_id)
                    .ok_or_else(|| ScheduleError::SlotNotFound(slot_id.clone()))?;
                ScheduleOverride {
                    id: Uuid::new_v4().to_string(),
                    owner: occurrence.owner.clone(),
                    date: occurrence.date,
                    day: occurrence.day,
                    start: edit.start.clone(),
                    end: edit.end.clone(),
                    location: edit.location.clone(),
                    note: None,
                    replaces: Some(ReplacedOccurrence {
                        date: occurrence.date,
                        day: occurrence.day,
                    }),
                    payload: slot.payload.clone(),
                }
            }
            OccurrenceSource::Override { override_id } => {
                let old = snapshot
                    .ledger()
                    .get(override_id)
                    .ok_or_else(|| ScheduleError::OverrideNotFound(override_id.clone()))?;
                ScheduleOverride {
                    start: edit.start.clone(),
                    end: edit.end.clone(),
                    location: edit.location.clone(),
                    ..old.clone()
                }
            }
        };

        self.schedule.upsert_override(&ov).await?;
        debug!(owner = %occurrence.owner, date = %occurrence.date, "edited occurrence");

        if occurrence.owner.kind == EntityKind::Class && occurrence.date >= today {
            let retimed = self
                .sessions
                .retime_single(&occurrence.owner.id, occurrence.date, &ov.start, &ov.end)
                .await;
            if let Err(error) = retimed {
                warn!(%error, owner = %occurrence.owner, "session retime failed");
            }
        }

        Ok(ov)
    }

    /// Change time/room for the whole series, in place on the slot.
    pub async fn edit_series(
        &self,
        snapshot: &ScheduleSnapshot,
        occurrence: &Occurrence,
        edit: &OccurrenceEdit,
        today: NaiveDate,
    ) -> ScheduleResult<WeeklySlot> {
        validate_times(&edit.start, &edit.end)?;

        let slot = self.series_slot(snapshot, occurrence)?;
        let mut updated = slot.clone();
        updated.start = edit.start.clone();
        updated.end = edit.end.clone();
        updated.location = edit.location.clone();
        self.schedule.upsert_slot(&updated).await?;
        debug!(owner = %occurrence.owner, slot_id = %slot.id, "edited series");

        // overrides that merely duplicated the old slot signature carry no
        // information once the slot itself changed
        for ov in snapshot.ledger().for_owner(&occurrence.owner) {
            let duplicated_old_slot = ov.day == slot.day
                && ov.start == slot.start
                && ov.end == slot.end
                && ov.location == slot.location;
            if duplicated_old_slot {
                self.schedule.delete_override(&ov.id).await?;
            }
        }

        if occurrence.owner.kind == EntityKind::Class {
            let range = DateRange::horizon(today, self.horizon_days);
            let retimed = self
                .sessions
                .retime_series(
                    &occurrence.owner.id,
                    range,
                    &slot.start,
                    &slot.end,
                    &updated.start,
                    &updated.end,
                )
                .await;
            if let Err(error) = retimed {
                warn!(%error, owner = %occurrence.owner, "session retime failed");
            }
        }

        Ok(updated)
    }

    /// Delete a slot and cascade the exceptions tied to its weekday.
    pub async fn remove_slot(
        &self,
        snapshot: &ScheduleSnapshot,
        slot_id: &str,
    ) -> ScheduleResult<()> {
        let slot = snapshot
            .slot(slot_id)
            .ok_or_else(|| ScheduleError::SlotNotFound(slot_id.to_string()))?;
        self.schedule.delete_slot(slot_id).await?;
        for ov in snapshot.ledger().for_owner(&slot.owner) {
            let tied = ov.day == slot.day || ov.replaces.is_some_and(|r| r.day == slot.day);
            if tied {
                self.schedule.delete_override(&ov.id).await?;
            }
        }
        Ok(())
    }

    /// The weekly slot an occurrence's series lives on. For an override this
    /// follows the `replaces` back-reference; an ad hoc override has no
    /// series to speak of.
    fn series_slot<'s>(
        &self,
        snapshot: &'s ScheduleSnapshot,
        occurrence: &'s Occurrence,
    ) -> ScheduleResult<&'s WeeklySlot> {
        match &occurrence.source {
            OccurrenceSource::Base { slot_id } => snapshot
                .slot(slot_id)
                .ok_or_else(|| ScheduleError::SlotNotFound(slot_id.clone())),
            OccurrenceSource::Override { override_id } => {
                let ov = snapshot
                    .ledger()
                    .get(override_id)
                    .ok_or_else(|| ScheduleError::OverrideNotFound(override_id.clone()))?;
                let root_day = ov
                    .replaces
                    .map(|r| r.day)
                    .ok_or_else(|| ScheduleError::NoSeries(override_id.clone()))?;
                snapshot
                    .slots_for(&occurrence.owner)
                    .find(|s| s.day == root_day)
                    .ok_or_else(|| ScheduleError::NoSeries(override_id.clone()))
            }
        }
    }

    fn validate_move_target(
        &self,
        snapshot: &ScheduleSnapshot,
        owner: &OwnerId,
        target: NaiveDate,
    ) -> ScheduleResult<()> {
        let earliest = snapshot
            .slots_for(owner)
            .filter_map(|s| s.effective_from)
            .min();
        if let Some(effective_from) = earliest
            && target < effective_from
        {
            return Err(ScheduleError::BeforeEffectivePeriod {
                date: target,
                effective_from,
            });
        }
        Ok(())
    }
}

fn validate_times(start: &ClockTime, end: &ClockTime) -> ScheduleResult<()> {
    if start >= end {
        return Err(ScheduleError::EmptyTimeRange {
            start: start.to_string(),
            end: end.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Session;
    use crate::resolve::resolve_day;
    use crate::testing::{MemoryScheduleStore, MemorySessionStore, snapshot_of};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn t(s: &str) -> ClockTime {
        ClockTime::parse(s).unwrap()
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn wednesday_class(store: &MemoryScheduleStore) -> (OwnerId, WeeklySlot) {
        let owner = OwnerId::class("c1");
        let slot = WeeklySlot::new(
            owner.clone(),
            DayOfWeek::new(4).unwrap(),
            t("14:00"),
            t("15:30"),
        );
        store.seed_slot(slot.clone());
        (owner, slot)
    }

    #[tokio::test]
    async fn test_move_single_base_creates_back_referencing_override() {
        let schedule = MemoryScheduleStore::default();
        let sessions = MemorySessionStore::default();
        let (owner, _) = wednesday_class(&schedule);
        sessions.seed(Session {
            id: "s1".to_string(),
            class_id: "c1".to_string(),
            date: date(2024, 6, 5),
            start: t("14:00"),
            end: t("15:30"),
        });

        let snapshot = snapshot_of(&schedule).await;
        let occ = resolve_day(&snapshot, std::slice::from_ref(&owner), date(2024, 6, 5))
            .pop()
            .unwrap();

        let mover = OccurrenceMover::new(&schedule, &sessions, 120);
        let ov = mover
            .move_single(&snapshot, &occ, date(2024, 6, 7), today())
            .await
            .unwrap();

        assert_eq!(ov.date, date(2024, 6, 7));
        assert_eq!(ov.day.number(), 6);
        let replaced = ov.replaces.unwrap();
        assert_eq!(replaced.date, date(2024, 6, 5));
        assert_eq!(replaced.day.number(), 4);

        // the slot itself is untouched
        let after = snapshot_of(&schedule).await;
        assert_eq!(after.slots()[0].day.number(), 4);

        // old date resolves empty, target date resolves to the override
        assert!(resolve_day(&after, std::slice::from_ref(&owner), date(2024, 6, 5)).is_empty());
        let moved = resolve_day(&after, std::slice::from_ref(&owner), date(2024, 6, 7));
        assert_eq!(moved.len(), 1);
        assert!(moved[0].is_override());
        assert_eq!(moved[0].start, t("14:00"));

        // the attendance session followed
        assert_eq!(sessions.get("s1").unwrap().date, date(2024, 6, 7));
    }

    #[tokio::test]
    async fn test_remove_preserves_original_root() {
        let schedule = MemoryScheduleStore::default();
        let sessions = MemorySessionStore::default();
        let (owner, _) = wednesday_class(&schedule);

        let mover = OccurrenceMover::new(&schedule, &sessions, 120);

        let snapshot = snapshot_of(&schedule).await;
        let occ = resolve_day(&snapshot, std::slice::from_ref(&owner), date(2024, 6, 5))
            .pop()
            .unwrap();
        mover
            .move_single(&snapshot, &occ, date(2024, 6, 7), today())
            .await
            .unwrap();

        // move the already-moved occurrence again
        let snapshot = snapshot_of(&schedule).await;
        let occ = resolve_day(&snapshot, std::slice::from_ref(&owner), date(2024, 6, 7))
            .pop()
            .unwrap();
        let ov = mover
            .move_single(&snapshot, &occ, date(2024, 6, 10), today())
            .await
            .unwrap();

        // still points at the true original base date, not at 6/7
        assert_eq!(ov.replaces.unwrap().date, date(2024, 6, 5));

        let after = snapshot_of(&schedule).await;
        assert_eq!(after.ledger().len(), 1);
        for stale in [date(2024, 6, 5), date(2024, 6, 7)] {
            assert!(resolve_day(&after, std::slice::from_ref(&owner), stale).is_empty());
        }
        assert_eq!(
            resolve_day(&after, std::slice::from_ref(&owner), date(2024, 6, 10)).len(),
            1
        );
    }

    #[tokio::test]
    async fn test_move_single_is_idempotent() {
        let schedule = MemoryScheduleStore::default();
        let sessions = MemorySessionStore::default();
        let (owner, _) = wednesday_class(&schedule);

        let mover = OccurrenceMover::new(&schedule, &sessions, 120);
        let snapshot = snapshot_of(&schedule).await;
        let occ = resolve_day(&snapshot, std::slice::from_ref(&owner), date(2024, 6, 5))
            .pop()
            .unwrap();

        mover
            .move_single(&snapshot, &occ, date(2024, 6, 7), today())
            .await
            .unwrap();
        // same intent again, against the refreshed snapshot
        let snapshot = snapshot_of(&schedule).await;
        mover
            .move_single(&snapshot, &occ, date(2024, 6, 7), today())
            .await
            .unwrap();

        let after = snapshot_of(&schedule).await;
        assert_eq!(after.ledger().len(), 1);
        let ov = after.ledger().direct(&owner, date(2024, 6, 7)).unwrap();
        assert_eq!(ov.replaces.unwrap().date, date(2024, 6, 5));
    }

    #[tokio::test]
    async fn test_move_series_rewrites_slot_and_purges_stale_overrides() {
        let schedule = MemoryScheduleStore::default();
        let sessions = MemorySessionStore::default();
        let (owner, slot) = wednesday_class(&schedule);
        sessions.seed(Session {
            id: "s1".to_string(),
            class_id: "c1".to_string(),
            date: date(2024, 6, 5),
            start: t("14:00"),
            end: t("15:30"),
        });
        sessions.seed(Session {
            id: "s2".to_string(),
            class_id: "c1".to_string(),
            date: date(2024, 6, 12),
            start: t("14:00"),
            end: t("15:30"),
        });

        let mover = OccurrenceMover::new(&schedule, &sessions, 120);

        // one occurrence already moved off the Wednesday series
        let snapshot = snapshot_of(&schedule).await;
        let occ = resolve_day(&snapshot, std::slice::from_ref(&owner), date(2024, 6, 5))
            .pop()
            .unwrap();
        mover
            .move_single(&snapshot, &occ, date(2024, 6, 6), today())
            .await
            .unwrap();

        // now move the whole series Wednesday -> Friday
        let snapshot = snapshot_of(&schedule).await;
        let occ = resolve_day(&snapshot, std::slice::from_ref(&owner), date(2024, 6, 12))
            .pop()
            .unwrap();
        let updated = mover
            .move_series(&snapshot, &occ, DayOfWeek::new(6).unwrap(), today())
            .await
            .unwrap();

        assert_eq!(updated.id, slot.id);
        assert_eq!(updated.day.number(), 6);

        let after = snapshot_of(&schedule).await;
        // the Wednesday-tied exception is gone with the series
        assert!(after.ledger().is_empty());
        assert!(resolve_day(&after, std::slice::from_ref(&owner), date(2024, 6, 12)).is_empty());
        let friday = resolve_day(&after, std::slice::from_ref(&owner), date(2024, 6, 14));
        assert_eq!(friday.len(), 1);
        assert!(!friday[0].is_override());

        // sessions shifted by the weekday delta, week offsets preserved
        assert_eq!(sessions.get("s2").unwrap().date, date(2024, 6, 14));
    }

    #[tokio::test]
    async fn test_move_series_failure_leaves_overrides_alone() {
        let schedule = MemoryScheduleStore::default();
        let sessions = MemorySessionStore::default();
        let (owner, _) = wednesday_class(&schedule);

        let mover = OccurrenceMover::new(&schedule, &sessions, 120);
        let snapshot = snapshot_of(&schedule).await;
        let occ = resolve_day(&snapshot, std::slice::from_ref(&owner), date(2024, 6, 5))
            .pop()
            .unwrap();
        mover
            .move_single(&snapshot, &occ, date(2024, 6, 6), today())
            .await
            .unwrap();

        let snapshot = snapshot_of(&schedule).await;
        let occ = resolve_day(&snapshot, std::slice::from_ref(&owner), date(2024, 6, 12))
            .pop()
            .unwrap();
        schedule.fail_next_write();
        let result = mover
            .move_series(&snapshot, &occ, DayOfWeek::new(6).unwrap(), today())
            .await;
        assert!(matches!(result, Err(ScheduleError::Store(_))));

        // slot write failed, so no dependent deletion ran
        let after = snapshot_of(&schedule).await;
        assert_eq!(after.ledger().len(), 1);
        assert_eq!(after.slots()[0].day.number(), 4);
    }

    #[tokio::test]
    async fn test_session_failure_does_not_fail_the_move() {
        let schedule = MemoryScheduleStore::default();
        let sessions = MemorySessionStore::default();
        let (owner, _) = wednesday_class(&schedule);
        sessions.seed(Session {
            id: "s1".to_string(),
            class_id: "c1".to_string(),
            date: date(2024, 6, 5),
            start: t("14:00"),
            end: t("15:30"),
        });
        sessions.fail_next_upsert();

        let mover = OccurrenceMover::new(&schedule, &sessions, 120);
        let snapshot = snapshot_of(&schedule).await;
        let occ = resolve_day(&snapshot, std::slice::from_ref(&owner), date(2024, 6, 5))
            .pop()
            .unwrap();
        mover
            .move_single(&snapshot, &occ, date(2024, 6, 7), today())
            .await
            .unwrap();

        // ledger landed; the stale session is reconciliation's problem
        let after = snapshot_of(&schedule).await;
        assert_eq!(after.ledger().len(), 1);
        assert_eq!(sessions.get("s1").unwrap().date, date(2024, 6, 5));
    }

    #[tokio::test]
    async fn test_edit_single_upserts_override_in_place() {
        let schedule = MemoryScheduleStore::default();
        let sessions = MemorySessionStore::default();
        let (owner, _) = wednesday_class(&schedule);

        let mover = OccurrenceMover::new(&schedule, &sessions, 120);
        let snapshot = snapshot_of(&schedule).await;
        let occ = resolve_day(&snapshot, std::slice::from_ref(&owner), date(2024, 6, 5))
            .pop()
            .unwrap();
        let edit = OccurrenceEdit {
            start: t("15:00"),
            end: t("16:30"),
            location: Some("Room B".to_string()),
        };
        let ov = mover
            .edit_single(&snapshot, &occ, &edit, today())
            .await
            .unwrap();

        // same date, back-reference to itself, new times
        assert_eq!(ov.date, date(2024, 6, 5));
        assert_eq!(ov.replaces.unwrap().date, date(2024, 6, 5));

        let after = snapshot_of(&schedule).await;
        let resolved = resolve_day(&after, std::slice::from_ref(&owner), date(2024, 6, 5));
        assert_eq!(resolved.len(), 1);
        assert!(resolved[0].is_override());
        assert_eq!(resolved[0].start, t("15:00"));
        assert_eq!(resolved[0].location.as_deref(), Some("Room B"));
    }

    #[tokio::test]
    async fn test_edit_series_deletes_redundant_overrides() {
        let schedule = MemoryScheduleStore::default();
        let sessions = MemorySessionStore::default();
        let (owner, slot) = wednesday_class(&schedule);

        // an override that duplicated the slot's signature exactly
        let mut dup = ScheduleOverride::new(owner.clone(), date(2024, 6, 5), t("14:00"), t("15:30"));
        dup.replaces = Some(ReplacedOccurrence {
            date: date(2024, 6, 5),
            day: DayOfWeek::new(4).unwrap(),
        });
        schedule.seed_override(dup);

        sessions.seed(Session {
            id: "s1".to_string(),
            class_id: "c1".to_string(),
            date: date(2024, 6, 12),
            start: t("14:00"),
            end: t("15:30"),
        });

        let mover = OccurrenceMover::new(&schedule, &sessions, 120);
        let snapshot = snapshot_of(&schedule).await;
        let occ = Occurrence::from_slot(&slot, date(2024, 6, 12));
        let edit = OccurrenceEdit {
            start: t("15:00"),
            end: t("16:30"),
            location: None,
        };
        let updated = mover
            .edit_series(&snapshot, &occ, &edit, today())
            .await
            .unwrap();
        assert_eq!(updated.start, t("15:00"));

        let after = snapshot_of(&schedule).await;
        assert!(after.ledger().is_empty());
        // future session follows the series times
        assert_eq!(sessions.get("s1").unwrap().start, t("15:00"));
    }

    #[tokio::test]
    async fn test_remove_slot_cascades_weekday_overrides() {
        let schedule = MemoryScheduleStore::default();
        let sessions = MemorySessionStore::default();
        let (owner, slot) = wednesday_class(&schedule);

        let mover = OccurrenceMover::new(&schedule, &sessions, 120);
        let snapshot = snapshot_of(&schedule).await;
        let occ = resolve_day(&snapshot, std::slice::from_ref(&owner), date(2024, 6, 5))
            .pop()
            .unwrap();
        mover
            .move_single(&snapshot, &occ, date(2024, 6, 7), today())
            .await
            .unwrap();

        let snapshot = snapshot_of(&schedule).await;
        mover.remove_slot(&snapshot, &slot.id).await.unwrap();

        let after = snapshot_of(&schedule).await;
        assert!(after.slots().is_empty());
        assert!(after.ledger().is_empty());
    }

    #[tokio::test]
    async fn test_move_target_before_effective_period_is_rejected() {
        let schedule = MemoryScheduleStore::default();
        let sessions = MemorySessionStore::default();
        let owner = OwnerId::class("c1");
        let mut slot = WeeklySlot::new(
            owner.clone(),
            DayOfWeek::new(4).unwrap(),
            t("14:00"),
            t("15:30"),
        );
        slot.effective_from = Some(date(2024, 6, 1));
        schedule.seed_slot(slot);

        let mover = OccurrenceMover::new(&schedule, &sessions, 120);
        let snapshot = snapshot_of(&schedule).await;
        let occ = resolve_day(&snapshot, std::slice::from_ref(&owner), date(2024, 6, 5))
            .pop()
            .unwrap();
        let result = mover
            .move_single(&snapshot, &occ, date(2024, 5, 20), today())
            .await;
        assert!(matches!(
            result,
            Err(ScheduleError::BeforeEffectivePeriod { .. })
        ));
        // rejected before any write
        let after = snapshot_of(&schedule).await;
        assert!(after.ledger().is_empty());
    }

    #[tokio::test]
    async fn test_move_series_on_ad_hoc_override_has_no_series() {
        let schedule = MemoryScheduleStore::default();
        let sessions = MemorySessionStore::default();
        let owner = OwnerId::class("c1");
        let ov = ScheduleOverride::new(owner.clone(), date(2024, 6, 8), t("10:00"), t("11:00"));
        schedule.seed_override(ov);

        let mover = OccurrenceMover::new(&schedule, &sessions, 120);
        let snapshot = snapshot_of(&schedule).await;
        let occ = resolve_day(&snapshot, std::slice::from_ref(&owner), date(2024, 6, 8))
            .pop()
            .unwrap();
        let result = mover
            .move_series(&snapshot, &occ, DayOfWeek::new(2).unwrap(), today())
            .await;
        assert!(matches!(result, Err(ScheduleError::NoSeries(_))));
    }
}
