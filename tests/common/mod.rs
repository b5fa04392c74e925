//! Seeding helpers for engine tests against the in-memory store.

#![allow(dead_code)]

use serde_json::json;

use pixelhub::models::member::Member;
use pixelhub::store::{
    CollectionRef, Store, ACTIVITIES, EVENTS, MEMBERS, SETTINGS,
};

pub const SEMESTER: &str = "fall-2025";

pub async fn seed_member(store: &dyn Store, id: &str, pixel_delta: i64) {
    seed_member_with_cache(store, id, pixel_delta, 0).await;
}

pub async fn seed_member_with_cache(
    store: &dyn Store,
    id: &str,
    pixel_delta: i64,
    pixel_cached: i64,
) {
    store
        .set(
            &CollectionRef::top_level(MEMBERS),
            id,
            json!({
                "email": format!("{}@example.edu", id),
                "first_name": id,
                "last_name": "Tester",
                "is_admin": false,
                "pixel_delta": pixel_delta,
                "pixel_cached": pixel_cached,
                "pixels": pixel_cached,
            }),
        )
        .await
        .unwrap();
}

pub async fn seed_event(
    store: &dyn Store,
    id: &str,
    event_type: &str,
    pixels: i64,
    attendees: &[&str],
) {
    store
        .set(
            &CollectionRef::top_level(EVENTS),
            id,
            json!({
                "name": format!("Event {}", id),
                "date": "2025-09-03",
                "type": event_type,
                "pixels": pixels,
                "attendees": attendees,
                "semester_id": SEMESTER,
            }),
        )
        .await
        .unwrap();
}

pub async fn seed_activity(
    store: &dyn Store,
    id: &str,
    pixels: i64,
    multipliers: &[(&str, i64)],
) {
    let multipliers: serde_json::Map<String, serde_json::Value> = multipliers
        .iter()
        .map(|(member, multiplier)| (member.to_string(), json!(multiplier)))
        .collect();

    store
        .set(
            &CollectionRef::top_level(ACTIVITIES),
            id,
            json!({
                "name": format!("Activity {}", id),
                "type": "coffee_chat",
                "pixels": pixels,
                "semester_id": SEMESTER,
                "multipliers": multipliers,
            }),
        )
        .await
        .unwrap();
}

pub async fn seed_absence(
    store: &dyn Store,
    event_id: &str,
    id: &str,
    user_id: &str,
    status: &str,
) {
    store
        .set(
            &CollectionRef::excused_absences(event_id),
            id,
            json!({
                "user_id": user_id,
                "reason": "something came up",
                "status": status,
                "created_at": "2025-09-01T12:00:00Z",
            }),
        )
        .await
        .unwrap();
}

pub async fn seed_settings(store: &dyn Store, current_semester: Option<&str>) {
    store
        .set(
            &CollectionRef::top_level(SETTINGS),
            pixelhub::store::GLOBAL_SETTINGS,
            json!({
                "current_semester_id": current_semester,
                "is_leadership_on": false,
            }),
        )
        .await
        .unwrap();
}

pub async fn cached_total(store: &dyn Store, id: &str) -> i64 {
    Member::with_id(id, store).await.unwrap().pixel_cached
}
