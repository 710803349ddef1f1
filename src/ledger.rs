//! Override ledger with derived lookup indices.
//!
//! Owns the `ScheduleOverride` collection plus two indices: by the
//! override's own date and by the date it suppresses. The day-of-week key
//! components the store carries are derived from the dates, so the indices
//! key on `(owner, date)`; day consistency is enforced at the store boundary.
//! Indices are rebuilt on change, which is fine at the record counts a
//! center's calendar sees.

use std::collections::HashMap;

use chrono::NaiveDate;
use tracing::warn;

use crate::error::{ScheduleError, ScheduleResult};
use crate::record::{OwnerId, ScheduleOverride, WeeklySlot};

type DateKey = (OwnerId, NaiveDate);

#[derive(Debug, Clone, Default)]
pub struct ExceptionLedger {
    overrides: HashMap<String, ScheduleOverride>,
    by_own_key: HashMap<DateKey, String>,
    by_suppressed_key: HashMap<DateKey, String>,
}

impl ExceptionLedger {
    pub fn new(overrides: Vec<ScheduleOverride>) -> Self {
        let mut ledger = ExceptionLedger::default();
        for ov in overrides {
            // Last write wins on own-key collisions, matching the store
            ledger.overrides.insert(ov.id.clone(), ov);
        }
        ledger.rebuild();
        ledger
    }

    fn rebuild(&mut self) {
        self.by_own_key.clear();
        self.by_suppressed_key.clear();
        for (id, ov) in &self.overrides {
            self.by_own_key
                .insert((ov.owner.clone(), ov.date), id.clone());
            if let Some(replaced) = &ov.replaces {
                self.by_suppressed_key
                    .insert((ov.owner.clone(), replaced.date), id.clone());
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&ScheduleOverride> {
        self.overrides.get(id)
    }

    /// The override standing directly on `(owner, date)`, if any.
    pub fn direct(&self, owner: &OwnerId, date: NaiveDate) -> Option<&ScheduleOverride> {
        self.by_own_key
            .get(&(owner.clone(), date))
            .and_then(|id| self.overrides.get(id))
    }

    /// The override that suppresses the base occurrence on `(owner, date)`.
    pub fn suppressor(&self, owner: &OwnerId, date: NaiveDate) -> Option<&ScheduleOverride> {
        self.by_suppressed_key
            .get(&(owner.clone(), date))
            .and_then(|id| self.overrides.get(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScheduleOverride> {
        self.overrides.values()
    }

    pub fn for_owner<'a>(
        &'a self,
        owner: &'a OwnerId,
    ) -> impl Iterator<Item = &'a ScheduleOverride> {
        self.overrides.values().filter(move |ov| ov.owner == *owner)
    }

    pub fn len(&self) -> usize {
        self.overrides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.overrides.is_empty()
    }

    /// Insert or replace. Any existing override with the same own key
    /// (same owner and date) is displaced, so there is at most one
    /// override per owner per date and re-applying a move is idempotent.
    pub fn upsert(&mut self, ov: ScheduleOverride) {
        if let Some(existing) = self.by_own_key.get(&(ov.owner.clone(), ov.date))
            && *existing != ov.id
        {
            let displaced = existing.clone();
            self.overrides.remove(&displaced);
        }
        self.overrides.insert(ov.id.clone(), ov);
        self.rebuild();
    }

    pub fn delete(&mut self, id: &str) -> ScheduleResult<ScheduleOverride> {
        let removed = self
            .overrides
            .remove(id)
            .ok_or_else(|| ScheduleError::OverrideNotFound(id.to_string()))?;
        self.rebuild();
        Ok(removed)
    }

    /// Report dangling suppressions: overrides whose `replaces` names a
    /// weekday the owner has no slot on. Surfaced, never auto-healed.
    pub fn check(&self, slots: &[WeeklySlot]) -> Vec<ScheduleError> {
        let mut findings = Vec::new();
        for ov in self.overrides.values() {
            let Some(replaced) = &ov.replaces else {
                continue;
            };
            let has_base = slots
                .iter()
                .any(|s| s.owner == ov.owner && s.day == replaced.day);
            if !has_base {
                warn!(
                    override_id = %ov.id,
                    owner = %ov.owner,
                    replaced_date = %replaced.date,
                    "override suppresses a date with no base occurrence"
                );
                findings.push(ScheduleError::DanglingSuppression {
                    override_id: ov.id.clone(),
                    date: replaced.date,
                });
            }
        }
        findings
    }
}
