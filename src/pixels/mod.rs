//! The pixel recalculation engine.
//!
//! A member's total is a pure function of stored state: their manual
//! delta, their attendance at the active semester's events (adjusted for
//! approved excused absences), and their multipliers on the active
//! semester's activities. [`aggregate_member`] re-derives the whole total
//! from scratch and writes it back to the member's cached field; the
//! [`triggers`] router re-runs it for every member a write may have
//! affected, which keeps the caches eventually consistent without any
//! global lock.

use crate::error::{HubError, HubResult};
use crate::models::event::Event;
use crate::models::member::Member;
use crate::models::settings::Settings;
use crate::pixels::attendance::EventAttendance;
use crate::store::Store;

pub mod activity;
pub mod attendance;
pub mod excused;
pub mod triggers;

/// What one aggregation pass did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateOutcome {
    /// The member's cache was rewritten with this total.
    Updated(i64),
    /// The member no longer exists; writes can carry stale references, so
    /// this is a quiet no-op rather than an error.
    SkippedNoMember,
    /// No active semester is configured. The total is undefined, not
    /// zero, so the cache is left untouched.
    SkippedNoSemester,
}

/// Recomputes one member's total and persists it. Reruns with unchanged
/// inputs produce the same total and the same single cache write.
pub async fn aggregate_member(store: &dyn Store, member_id: &str) -> HubResult<AggregateOutcome> {
    let member = match Member::with_id_opt(member_id, store).await? {
        Some(member) => member,
        None => return Ok(AggregateOutcome::SkippedNoMember),
    };

    let settings = Settings::get(store).await?;
    let semester_id = match settings.active_semester() {
        Some(semester_id) => semester_id.to_owned(),
        None => return Ok(AggregateOutcome::SkippedNoSemester),
    };

    let mut total = member.pixel_delta;

    let excused = excused::approved_event_ids(store, member_id).await?;
    let events = Event::for_semester(&semester_id, store).await?;
    total += attendance::resolve(member_id, &excused, &events)
        .iter()
        .map(|entry| entry.pixels_earned)
        .sum::<i64>();

    let activities = crate::models::activity::Activity::for_semester(&semester_id, store).await?;
    total += activity::accumulate(member_id, &activities);

    Member::write_cached_total(member_id, total, store).await?;

    Ok(AggregateOutcome::Updated(total))
}

/// The member's per-event attendance log for the active semester, for the
/// dashboard's history view.
pub async fn attendance_log(
    store: &dyn Store,
    member_id: &str,
) -> HubResult<Vec<EventAttendance>> {
    let settings = Settings::get(store).await?;
    let semester_id = settings
        .active_semester()
        .ok_or(HubError::ConfigMissing("current semester"))?
        .to_owned();

    let excused = excused::approved_event_ids(store, member_id).await?;
    let events = Event::for_semester(&semester_id, store).await?;

    Ok(attendance::resolve(member_id, &excused, &events))
}
