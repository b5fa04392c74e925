use std::collections::BTreeMap;

use time::macros::date;

use crate::models::activity::{Activity, ActivityType};
use crate::models::event::{Event, EventType};
use crate::models::DateScalar;

pub const MOCK_SEMESTER: &str = "fall-2025";

pub fn mock_event(id: &str, r#type: EventType, pixels: i64, attendees: &[&str]) -> Event {
    Event {
        id: id.to_owned(),
        name: format!("Event {}", id),
        date: DateScalar(date!(2025 - 09 - 03)),
        r#type,
        pixels,
        attendees: attendees.iter().map(|member| member.to_string()).collect(),
        semester_id: MOCK_SEMESTER.to_owned(),
    }
}

pub fn mock_activity(
    id: &str,
    r#type: ActivityType,
    pixels: i64,
    multipliers: &[(&str, i64)],
) -> Activity {
    Activity {
        id: id.to_owned(),
        name: format!("Activity {}", id),
        r#type,
        pixels,
        semester_id: MOCK_SEMESTER.to_owned(),
        multipliers: multipliers
            .iter()
            .map(|(member, multiplier)| (member.to_string(), *multiplier))
            .collect::<BTreeMap<_, _>>(),
    }
}
