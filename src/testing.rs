//! In-memory store fakes shared by the unit tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{ScheduleError, ScheduleResult};
use crate::range::DateRange;
use crate::record::{ScheduleOverride, Session, WeeklySlot};
use crate::snapshot::ScheduleSnapshot;
use crate::store::{RawScheduleRecords, ScheduleStore, SessionStore};

#[derive(Default)]
pub(crate) struct MemoryScheduleStore {
    slots: Mutex<HashMap<String, WeeklySlot>>,
    overrides: Mutex<HashMap<String, ScheduleOverride>>,
    fail_next_write: AtomicBool,
}

impl MemoryScheduleStore {
    pub fn seed_slot(&self, slot: WeeklySlot) {
        self.slots.lock().unwrap().insert(slot.id.clone(), slot);
    }

    pub fn seed_override(&self, ov: ScheduleOverride) {
        self.overrides.lock().unwrap().insert(ov.id.clone(), ov);
    }

    /// Make the next write fail once with a store error.
    pub fn fail_next_write(&self) {
        self.fail_next_write.store(true, Ordering::SeqCst);
    }

    fn check_failure(&self) -> ScheduleResult<()> {
        if self.fail_next_write.swap(false, Ordering::SeqCst) {
            Err(ScheduleError::Store("injected write failure".to_string()))
        } else {
            Ok(())
        }
    }
}

impl ScheduleStore for MemoryScheduleStore {
    async fn load(&self) -> ScheduleResult<RawScheduleRecords> {
        let slots = self.slots.lock().unwrap();
        let overrides = self.overrides.lock().unwrap();
        Ok(RawScheduleRecords {
            slots: slots.values().map(Into::into).collect(),
            overrides: overrides.values().map(Into::into).collect(),
        })
    }

    async fn upsert_slot(&self, slot: &WeeklySlot) -> ScheduleResult<()> {
        self.check_failure()?;
        self.seed_slot(slot.clone());
        Ok(())
    }

    async fn delete_slot(&self, slot_id: &str) -> ScheduleResult<()> {
        self.check_failure()?;
        self.slots.lock().unwrap().remove(slot_id);
        Ok(())
    }

    async fn upsert_override(&self, ov: &ScheduleOverride) -> ScheduleResult<()> {
        self.check_failure()?;
        self.seed_override(ov.clone());
        Ok(())
    }

    async fn delete_override(&self, override_id: &str) -> ScheduleResult<()> {
        self.check_failure()?;
        self.overrides.lock().unwrap().remove(override_id);
        Ok(())
    }
}

/// Parse the store's current contents into a snapshot, as the engine does
/// after a change notification.
pub(crate) async fn snapshot_of(store: &MemoryScheduleStore) -> ScheduleSnapshot {
    ScheduleSnapshot::from_raw(store.load().await.unwrap()).0
}

#[derive(Default)]
pub(crate) struct MemorySessionStore {
    sessions: Mutex<HashMap<String, Session>>,
    fail_next_upsert: AtomicBool,
}

impl MemorySessionStore {
    pub fn seed(&self, session: Session) {
        self.sessions
            .lock()
            .unwrap()
            .insert(session.id.clone(), session);
    }

    pub fn get(&self, id: &str) -> Option<Session> {
        self.sessions.lock().unwrap().get(id).cloned()
    }

    /// Make the next upsert fail once with a store error.
    pub fn fail_next_upsert(&self) {
        self.fail_next_upsert.store(true, Ordering::SeqCst);
    }
}

impl SessionStore for MemorySessionStore {
    async fn sessions_in_range(
        &self,
        class_id: &str,
        range: DateRange,
    ) -> ScheduleResult<Vec<Session>> {
        let sessions = self.sessions.lock().unwrap();
        let mut found: Vec<Session> = sessions
            .values()
            .filter(|s| s.class_id == class_id && range.contains(s.date))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)));
        Ok(found)
    }

    async fn upsert(&self, session: &Session) -> ScheduleResult<()> {
        if self.fail_next_upsert.swap(false, Ordering::SeqCst) {
            return Err(ScheduleError::Store("injected upsert failure".to_string()));
        }
        self.seed(session.clone());
        Ok(())
    }
}
