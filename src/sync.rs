//! Attendance-session synchronization.
//!
//! Sessions copy their start/end times from the occurrence that created
//! them, so every move or edit has to relocate or retime the copies.
//! Writes here land on a different store than the ledger writes and are not
//! transactional with them; the reconciliation pass below can re-derive the
//! correct date and times for any session a failed write left behind.

use std::collections::HashMap;

use chrono::{Days, NaiveDate};
use tracing::{debug, info, warn};

use crate::error::ScheduleResult;
use crate::occurrence::Occurrence;
use crate::range::DateRange;
use crate::record::{EntityKind, OwnerId, Session};
use crate::resolve::resolve;
use crate::snapshot::ScheduleSnapshot;
use crate::store::SessionStore;
use crate::time::ClockTime;

pub struct SessionSynchronizer<'a, T: SessionStore> {
    store: &'a T,
}

impl<'a, T: SessionStore> SessionSynchronizer<'a, T> {
    pub fn new(store: &'a T) -> Self {
        SessionSynchronizer { store }
    }

    /// Relocate the session for one moved occurrence. Returns whether a
    /// session existed at the old date.
    pub async fn relocate(
        &self,
        class_id: &str,
        from: NaiveDate,
        to: NaiveDate,
        start: &ClockTime,
        end: &ClockTime,
    ) -> ScheduleResult<bool> {
        let found = self
            .store
            .sessions_in_range(class_id, DateRange::single(from))
            .await?;
        let Some(session) = found.into_iter().next() else {
            return Ok(false);
        };
        let moved = Session {
            date: to,
            start: start.clone(),
            end: end.clone(),
            ..session
        };
        self.store.upsert(&moved).await?;
        debug!(class_id, %from, %to, "relocated session");
        Ok(true)
    }

    /// Shift every session in `range` that carries the series' old times by
    /// a whole number of days (series move). Returns how many moved.
    pub async fn shift_series(
        &self,
        class_id: &str,
        range: DateRange,
        old_start: &ClockTime,
        old_end: &ClockTime,
        delta_days: i64,
    ) -> ScheduleResult<usize> {
        let mut moved = 0;
        for session in self.store.sessions_in_range(class_id, range).await? {
            if session.start != *old_start || session.end != *old_end {
                continue;
            }
            let date = shift_date(session.date, delta_days);
            self.store.upsert(&Session { date, ..session }).await?;
            moved += 1;
        }
        debug!(class_id, delta_days, moved, "shifted series sessions");
        Ok(moved)
    }

    /// Rewrite the times of every session in `range` that carries the
    /// series' old times (series-wide edit). Returns how many changed.
    pub async fn retime_series(
        &self,
        class_id: &str,
        range: DateRange,
        old_start: &ClockTime,
        old_end: &ClockTime,
        new_start: &ClockTime,
        new_end: &ClockTime,
    ) -> ScheduleResult<usize> {
        let mut changed = 0;
        for session in self.store.sessions_in_range(class_id, range).await? {
            if session.start != *old_start || session.end != *old_end {
                continue;
            }
            let retimed = Session {
                start: new_start.clone(),
                end: new_end.clone(),
                ..session
            };
            self.store.upsert(&retimed).await?;
            changed += 1;
        }
        Ok(changed)
    }

    /// Rewrite the times of the session on a single date, if one exists.
    pub async fn retime_single(
        &self,
        class_id: &str,
        date: NaiveDate,
        start: &ClockTime,
        end: &ClockTime,
    ) -> ScheduleResult<bool> {
        let found = self
            .store
            .sessions_in_range(class_id, DateRange::single(date))
            .await?;
        let Some(session) = found.into_iter().next() else {
            return Ok(false);
        };
        if session.start == *start && session.end == *end {
            return Ok(true);
        }
        let retimed = Session {
            start: start.clone(),
            end: end.clone(),
            ..session
        };
        self.store.upsert(&retimed).await?;
        Ok(true)
    }
}

fn shift_date(date: NaiveDate, delta_days: i64) -> NaiveDate {
    if delta_days >= 0 {
        date + Days::new(delta_days as u64)
    } else {
        date - Days::new(delta_days.unsigned_abs())
    }
}

/// Outcome of one reconciliation pass.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub relocated: usize,
    pub retimed: usize,
    /// Session ids with no resolvable occurrence; reported, never deleted.
    pub orphaned: Vec<String>,
}

impl ReconcileReport {
    pub fn is_clean(&self) -> bool {
        self.relocated == 0 && self.retimed == 0 && self.orphaned.is_empty()
    }
}

/// Idempotent pass that re-syncs sessions with resolved occurrences.
///
/// A session whose date matches no occurrence follows the ledger's
/// suppression link to wherever its occurrence moved; a session whose date
/// matches but whose times drifted is retimed in place. Running the pass
/// again right away is a no-op.
pub async fn reconcile_sessions<T: SessionStore>(
    snapshot: &ScheduleSnapshot,
    store: &T,
    owners: &[OwnerId],
    range: DateRange,
) -> ScheduleResult<ReconcileReport> {
    let mut report = ReconcileReport::default();
    let sync = SessionSynchronizer::new(store);

    for owner in owners {
        if owner.kind != EntityKind::Class {
            continue;
        }
        let resolved = resolve(snapshot, std::slice::from_ref(owner), range);
        let mut by_date: HashMap<NaiveDate, Vec<&Occurrence>> = HashMap::new();
        for occ in &resolved {
            by_date.entry(occ.date).or_default().push(occ);
        }

        let sessions = store.sessions_in_range(&owner.id, range).await?;
        let session_dates: Vec<NaiveDate> = sessions.iter().map(|s| s.date).collect();

        for session in &sessions {
            match by_date.get(&session.date) {
                Some(occs) => {
                    if occs
                        .iter()
                        .any(|o| o.start == session.start && o.end == session.end)
                    {
                        continue; // in sync
                    }
                    if let [only] = occs.as_slice() {
                        sync.retime_single(&owner.id, session.date, &only.start, &only.end)
                            .await?;
                        report.retimed += 1;
                        info!(session_id = %session.id, date = %session.date, "retimed drifted session");
                    } else {
                        // several blocks that day and none matches: ambiguous
                        warn!(session_id = %session.id, "session matches no time block");
                        report.orphaned.push(session.id.clone());
                    }
                }
                None => {
                    // follow the suppression link to where the occurrence went
                    let target = snapshot
                        .ledger()
                        .suppressor(owner, session.date)
                        .filter(|ov| !session_dates.contains(&ov.date));
                    match target {
                        Some(ov) => {
                            sync.relocate(&owner.id, session.date, ov.date, &ov.start, &ov.end)
                                .await?;
                            report.relocated += 1;
                            info!(
                                session_id = %session.id,
                                from = %session.date,
                                to = %ov.date,
                                "relocated stranded session"
                            );
                        }
                        None => {
                            warn!(session_id = %session.id, date = %session.date, "orphaned session");
                            report.orphaned.push(session.id.clone());
                        }
                    }
                }
            }
        }
    }

    Ok(report)
}
