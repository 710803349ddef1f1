//! Occurrence resolution over a schedule snapshot.
//!
//! Combines base weekly slots with the override ledger to produce the
//! effective occurrences for a date range. Per owner and date: a direct
//! override wins outright, a suppressed date emits nothing, otherwise every
//! base slot matching the weekday emits its own occurrence.

use chrono::NaiveDate;

use crate::occurrence::Occurrence;
use crate::range::DateRange;
use crate::record::OwnerId;
use crate::snapshot::ScheduleSnapshot;
use crate::time::DayOfWeek;

/// Resolve the effective occurrences for `owners` across `range`,
/// ordered by date, then start time, then owner.
pub fn resolve(
    snapshot: &ScheduleSnapshot,
    owners: &[OwnerId],
    range: DateRange,
) -> Vec<Occurrence> {
    let mut out = Vec::new();
    for date in range.days() {
        let day_start = out.len();
        for owner in owners {
            resolve_owner_date(snapshot, owner, date, &mut out);
        }
        sort_day(&mut out[day_start..]);
    }
    out
}

/// Resolve one date, sorted by start time then owner.
pub fn resolve_day(
    snapshot: &ScheduleSnapshot,
    owners: &[OwnerId],
    date: NaiveDate,
) -> Vec<Occurrence> {
    let mut out = Vec::new();
    for owner in owners {
        resolve_owner_date(snapshot, owner, date, &mut out);
    }
    sort_day(&mut out);
    out
}

fn resolve_owner_date(
    snapshot: &ScheduleSnapshot,
    owner: &OwnerId,
    date: NaiveDate,
    out: &mut Vec<Occurrence>,
) {
    let ledger = snapshot.ledger();

    // 1. A direct override wins, including ad hoc ones with no base slot.
    if let Some(ov) = ledger.direct(owner, date) {
        out.push(Occurrence::from_override(ov));
        return;
    }

    // 2. A replaced date yields nothing for this owner.
    if ledger.suppressor(owner, date).is_some() {
        return;
    }

    // 3. Every matching base time block emits independently.
    let day = DayOfWeek::from_date(date);
    for slot in snapshot.slots_for(owner) {
        if slot.day == day && slot.in_effect_on(date) {
            out.push(Occurrence::from_slot(slot, date));
        }
    }
}

fn sort_day(day: &mut [Occurrence]) {
    day.sort_by(|a, b| {
        a.start
            .cmp(&b.start)
            .then_with(|| a.owner.id.cmp(&b.owner.id))
            .then_with(|| a.source_id().cmp(b.source_id()))
    });
}
