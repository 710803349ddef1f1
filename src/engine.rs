//! Engine facade.
//!
//! Owns the store handles, the engine config, and the current snapshot.
//! Reads (`week_view`, `resolve_range`) are pure over the snapshot.
//! Mutations write through to the stores and leave the snapshot untouched;
//! the host forwards the store's change notification to `handle_change`,
//! which is what refreshes it. There is no optimistic local merge.

use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use tracing::debug;

use crate::config::EngineConfig;
use crate::error::{ScheduleError, ScheduleResult};
use crate::layout::{Placement, layout};
use crate::mover::{OccurrenceEdit, OccurrenceMover};
use crate::notify::StoreChange;
use crate::occurrence::Occurrence;
use crate::range::DateRange;
use crate::record::{OwnerId, ScheduleOverride, WeeklySlot};
use crate::resolve::{resolve, resolve_day};
use crate::snapshot::{ScheduleSnapshot, SnapshotFinding};
use crate::store::{ScheduleStore, SessionStore};
use crate::sync::{ReconcileReport, reconcile_sessions};
use crate::time::DayOfWeek;

/// One day of the weekly grid: resolved occurrences plus their column
/// placements, keyed by `Occurrence::key`.
#[derive(Debug)]
pub struct DayView {
    pub date: NaiveDate,
    pub occurrences: Vec<Occurrence>,
    pub placements: HashMap<String, Placement>,
}

/// Everything the UI needs to render one visible week.
#[derive(Debug)]
pub struct WeekView {
    pub monday: NaiveDate,
    pub grid_start_hour: u8,
    pub grid_end_hour: u8,
    pub days: Vec<DayView>,
}

pub struct ScheduleEngine<S: ScheduleStore, T: SessionStore> {
    config: EngineConfig,
    schedule: S,
    sessions: T,
    snapshot: ScheduleSnapshot,
    findings: Vec<SnapshotFinding>,
}

impl<S: ScheduleStore, T: SessionStore> ScheduleEngine<S, T> {
    /// Load the initial snapshot and wrap the collaborators.
    pub async fn connect(config: EngineConfig, schedule: S, sessions: T) -> ScheduleResult<Self> {
        let mut engine = ScheduleEngine {
            config,
            schedule,
            sessions,
            snapshot: ScheduleSnapshot::default(),
            findings: Vec::new(),
        };
        engine.refresh().await?;
        Ok(engine)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn snapshot(&self) -> &ScheduleSnapshot {
        &self.snapshot
    }

    /// Records the last refresh had to drop or flag.
    pub fn findings(&self) -> &[SnapshotFinding] {
        &self.findings
    }

    /// Reload the snapshot from the schedule store.
    pub async fn refresh(&mut self) -> ScheduleResult<()> {
        let raw = self.schedule.load().await?;
        let (snapshot, findings) = ScheduleSnapshot::from_raw(raw);
        debug!(
            slots = snapshot.slots().len(),
            overrides = snapshot.ledger().len(),
            dropped = findings.len(),
            "refreshed snapshot"
        );
        self.snapshot = snapshot;
        self.findings = findings;
        Ok(())
    }

    /// React to a store change notification.
    pub async fn handle_change(&mut self, change: StoreChange) -> ScheduleResult<()> {
        match change {
            StoreChange::Schedule => self.refresh().await,
            // sessions do not feed resolution; nothing to recompute
            StoreChange::Sessions => Ok(()),
        }
    }

    /// Every owner with a slot or an override in the current snapshot.
    pub fn owners(&self) -> Vec<OwnerId> {
        let mut owners: Vec<OwnerId> = self
            .snapshot
            .slots()
            .iter()
            .map(|s| s.owner.clone())
            .chain(self.snapshot.ledger().iter().map(|ov| ov.owner.clone()))
            .collect();
        owners.sort_by(|a, b| a.id.cmp(&b.id));
        owners.dedup();
        owners
    }

    pub fn resolve_range(&self, owners: &[OwnerId], range: DateRange) -> Vec<Occurrence> {
        resolve(&self.snapshot, owners, range)
    }

    /// Resolve and lay out the week starting at `monday`.
    pub fn week_view(&self, owners: &[OwnerId], monday: NaiveDate) -> WeekView {
        let days = DateRange::week_of(monday)
            .days()
            .map(|date| {
                let occurrences = resolve_day(&self.snapshot, owners, date);
                let placements = layout(&occurrences);
                DayView {
                    date,
                    occurrences,
                    placements,
                }
            })
            .collect();
        WeekView {
            monday,
            grid_start_hour: self.config.grid_start_hour,
            grid_end_hour: self.config.grid_end_hour,
            days,
        }
    }

    /// Consistency findings for the current snapshot (dangling suppressions).
    pub fn check(&self) -> Vec<ScheduleError> {
        self.snapshot.check()
    }

    pub async fn move_single(
        &self,
        occurrence: &Occurrence,
        target_date: NaiveDate,
    ) -> ScheduleResult<ScheduleOverride> {
        self.mover()
            .move_single(&self.snapshot, occurrence, target_date, today())
            .await
    }

    pub async fn move_series(
        &self,
        occurrence: &Occurrence,
        target_day: DayOfWeek,
    ) -> ScheduleResult<WeeklySlot> {
        self.mover()
            .move_series(&self.snapshot, occurrence, target_day, today())
            .await
    }

    pub async fn edit_single(
        &self,
        occurrence: &Occurrence,
        edit: &OccurrenceEdit,
    ) -> ScheduleResult<ScheduleOverride> {
        self.mover()
            .edit_single(&self.snapshot, occurrence, edit, today())
            .await
    }

    pub async fn edit_series(
        &self,
        occurrence: &Occurrence,
        edit: &OccurrenceEdit,
    ) -> ScheduleResult<WeeklySlot> {
        self.mover()
            .edit_series(&self.snapshot, occurrence, edit, today())
            .await
    }

    pub async fn remove_slot(&self, slot_id: &str) -> ScheduleResult<()> {
        self.mover().remove_slot(&self.snapshot, slot_id).await
    }

    /// Revert a single-date exception; the original date resurfaces on the
    /// next resolve.
    pub async fn revert_override(&self, override_id: &str) -> ScheduleResult<()> {
        if self.snapshot.ledger().get(override_id).is_none() {
            return Err(ScheduleError::OverrideNotFound(override_id.to_string()));
        }
        self.schedule.delete_override(override_id).await
    }

    /// Run the idempotent session reconciliation pass over the sync horizon.
    pub async fn reconcile(&self) -> ScheduleResult<ReconcileReport> {
        let range = DateRange::horizon(today(), self.config.session_horizon_days);
        let owners = self.owners();
        reconcile_sessions(&self.snapshot, &self.sessions, &owners, range).await
    }

    fn mover(&self) -> OccurrenceMover<'_, S, T> {
        OccurrenceMover::new(
            &self.schedule,
            &self.sessions,
            self.config.session_horizon_days,
        )
    }
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}
