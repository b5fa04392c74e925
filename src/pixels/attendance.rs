use std::collections::HashSet;

use async_graphql::{Enum, SimpleObject};

use crate::models::event::Event;

/// How a member relates to one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Enum)]
pub enum AttendanceStatus {
    /// The member was there and earns the event's pixels.
    Attended,
    /// The member was absent with an approved excuse.
    Excused,
    /// The member skipped a mandatory event without an approved excuse.
    Unexcused,
    /// The member missed an optional event; carries no penalty beyond
    /// the label.
    NoShow,
}

/// One row of a member's attendance log.
#[derive(SimpleObject, Clone)]
pub struct EventAttendance {
    /// The event the member is classified against
    pub event: Event,
    /// How the member relates to the event
    pub status: AttendanceStatus,
    /// What the event contributed to the member's total
    pub pixels_earned: i64,
}

/// Classifies the member against one event. The checks run in privilege
/// order: a present member never needs an excuse, an excuse only matters
/// when absent, and only mandatory events penalize a bare absence.
pub fn classify(
    member_id: &str,
    excused_event_ids: &HashSet<String>,
    event: &Event,
) -> AttendanceStatus {
    if event.attendees.iter().any(|attendee| attendee == member_id) {
        AttendanceStatus::Attended
    } else if excused_event_ids.contains(&event.id) {
        AttendanceStatus::Excused
    } else if event.r#type.is_mandatory() {
        AttendanceStatus::Unexcused
    } else {
        AttendanceStatus::NoShow
    }
}

/// The pixels one event contributes under the given classification.
pub fn pixels_earned(status: AttendanceStatus, event: &Event) -> i64 {
    if status == AttendanceStatus::Attended && event.pixels > 0 {
        event.pixels
    } else {
        0
    }
}

/// The member's classification and earnings for each given event.
pub fn resolve(
    member_id: &str,
    excused_event_ids: &HashSet<String>,
    events: &[Event],
) -> Vec<EventAttendance> {
    events
        .iter()
        .map(|event| {
            let status = classify(member_id, excused_event_ids, event);
            EventAttendance {
                event: event.clone(),
                status,
                pixels_earned: pixels_earned(status, event),
            }
        })
        .collect()
}
