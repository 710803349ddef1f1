//! Recurring schedule resolution and exception engine for the Studyhall
//! tutoring dashboard.
//!
//! This crate backs the weekly calendar view: it reconciles base weekly
//! recurring slots with date-specific overrides, resolves the single
//! authoritative occurrence for any class or staff duty on any date, moves
//! one occurrence or a whole series, keeps attendance sessions in step with
//! moved occurrences, and packs same-day overlaps into display columns.
//!
//! It is an in-process library: persistence lives behind the two store
//! collaborator traits in `store`, and the host app forwards store change
//! notifications to the engine instead of having it poll.

pub mod config;
pub mod engine;
pub mod error;
pub mod layout;
pub mod ledger;
pub mod mover;
pub mod notify;
pub mod occurrence;
pub mod palette;
pub mod range;
pub mod record;
pub mod resolve;
pub mod snapshot;
pub mod store;
pub mod sync;
pub mod time;

#[cfg(test)]
pub(crate) mod testing;

pub use config::EngineConfig;
pub use engine::{DayView, ScheduleEngine, WeekView};
pub use error::{ScheduleError, ScheduleResult};
pub use layout::{Placement, layout};
pub use ledger::ExceptionLedger;
pub use mover::{OccurrenceEdit, OccurrenceMover};
pub use notify::{ChangeFeed, StoreChange};
pub use occurrence::{Occurrence, OccurrenceSource};
pub use range::DateRange;
pub use record::{
    EntityKind, OwnerId, ReplacedOccurrence, ScheduleOverride, Session, WeeklySlot,
};
pub use resolve::{resolve, resolve_day};
pub use snapshot::{ScheduleSnapshot, SnapshotFinding};
pub use store::{RawOverride, RawScheduleRecords, RawSlot, ScheduleStore, SessionStore};
pub use sync::{ReconcileReport, SessionSynchronizer, reconcile_sessions};
pub use time::{ClockTime, DayOfWeek};
