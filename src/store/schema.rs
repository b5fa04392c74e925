//! Canonicalization of raw stored documents.
//!
//! Documents written by older builds of the tracker use different field
//! names (`pixeldelta` for `pixel_delta`, `pixels` for `pixel_cached`,
//! absence status `rejected` for `denied`) and occasionally hold malformed
//! values. Everything that interprets a document goes through this module
//! first, so the rest of the crate only ever sees canonical records.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{HubError, HubResult};
use crate::models::activity::Activity;
use crate::models::event::absence::ExcusedAbsence;
use crate::models::event::Event;
use crate::models::member::session::Session;
use crate::models::member::Member;
use crate::models::semester::Semester;
use crate::models::settings::Settings;
use crate::store::Document;

/// Serializes a record for storage. The document ID lives in the path,
/// never in the document itself.
pub fn to_doc<T: Serialize>(record: &T) -> HubResult<Value> {
    let mut doc = serde_json::to_value(record).map_err(|err| HubError::Store(err.to_string()))?;
    if let Some(fields) = doc.as_object_mut() {
        fields.remove("id");
    }

    Ok(doc)
}

pub fn member_from_doc(doc: &Document) -> HubResult<Member> {
    let mut data = fields_of(doc)?;
    data.insert("id".to_owned(), Value::String(doc.id.clone()));

    let delta = int_field(&data, "pixel_delta")
        .or_else(|| int_field(&data, "pixeldelta"))
        .unwrap_or(0);
    data.insert("pixel_delta".to_owned(), delta.into());

    let cached = int_field(&data, "pixel_cached")
        .or_else(|| int_field(&data, "pixels"))
        .unwrap_or(0);
    data.insert("pixel_cached".to_owned(), cached.into());
    data.remove("pixels");
    data.remove("pixeldelta");

    decode(doc, data)
}

pub fn event_from_doc(doc: &Document) -> HubResult<Event> {
    let mut data = fields_of(doc)?;
    data.insert("id".to_owned(), Value::String(doc.id.clone()));
    data.insert(
        "pixels".to_owned(),
        int_field(&data, "pixels").unwrap_or(0).max(0).into(),
    );
    data.insert(
        "attendees".to_owned(),
        string_set(data.get("attendees")).into(),
    );

    decode(doc, data)
}

pub fn absence_from_doc(doc: &Document) -> HubResult<ExcusedAbsence> {
    let mut data = fields_of(doc)?;
    data.insert("id".to_owned(), Value::String(doc.id.clone()));

    let mut absence: ExcusedAbsence = decode(doc, data)?;
    if let Some((_collection, event_id)) = doc.collection.parent_document() {
        absence.event_id = event_id.to_owned();
    }

    Ok(absence)
}

pub fn activity_from_doc(doc: &Document) -> HubResult<Activity> {
    let mut data = fields_of(doc)?;
    data.insert("id".to_owned(), Value::String(doc.id.clone()));
    data.insert(
        "pixels".to_owned(),
        int_field(&data, "pixels").unwrap_or(0).max(0).into(),
    );

    let multipliers: Map<String, Value> = data
        .get("multipliers")
        .and_then(Value::as_object)
        .map(|entries| {
            entries
                .iter()
                .filter_map(|(member, multiplier)| {
                    let multiplier = multiplier.as_i64().filter(|m| *m > 0)?;
                    Some((member.clone(), multiplier.into()))
                })
                .collect()
        })
        .unwrap_or_default();
    data.insert("multipliers".to_owned(), Value::Object(multipliers));

    decode(doc, data)
}

pub fn semester_from_doc(doc: &Document) -> HubResult<Semester> {
    let mut data = fields_of(doc)?;
    data.insert("id".to_owned(), Value::String(doc.id.clone()));

    decode(doc, data)
}

pub fn settings_from_doc(doc: &Document) -> HubResult<Settings> {
    decode(doc, fields_of(doc)?)
}

pub fn session_from_doc(doc: &Document) -> HubResult<Session> {
    decode(doc, fields_of(doc)?)
}

/// The deduplicated attendee IDs of a raw event snapshot.
pub fn attendee_ids(data: &Value) -> Vec<String> {
    string_set(data.get("attendees"))
}

/// The member IDs holding a multiplier entry in a raw activity snapshot.
pub fn multiplier_member_ids(data: &Value) -> Vec<String> {
    data.get("multipliers")
        .and_then(Value::as_object)
        .map(|entries| entries.keys().cloned().collect())
        .unwrap_or_default()
}

/// The requesting member of a raw excused-absence snapshot.
pub fn absence_user_id(data: &Value) -> Option<String> {
    data.get("user_id")
        .and_then(Value::as_str)
        .map(str::to_owned)
}

fn fields_of(doc: &Document) -> HubResult<Map<String, Value>> {
    doc.data
        .as_object()
        .cloned()
        .ok_or_else(|| HubError::InvalidDocument {
            path: doc.path(),
            reason: "not a JSON object".to_owned(),
        })
}

fn decode<T: DeserializeOwned>(doc: &Document, data: Map<String, Value>) -> HubResult<T> {
    serde_json::from_value(Value::Object(data)).map_err(|err| HubError::InvalidDocument {
        path: doc.path(),
        reason: err.to_string(),
    })
}

fn int_field(data: &Map<String, Value>, name: &str) -> Option<i64> {
    data.get(name).and_then(Value::as_i64)
}

fn string_set(value: Option<&Value>) -> Vec<String> {
    let entries = match value.and_then(Value::as_array) {
        Some(entries) => entries,
        None => return vec![],
    };

    let mut seen = std::collections::HashSet::new();
    let mut ids = vec![];
    for entry in entries.iter().filter_map(Value::as_str) {
        if seen.insert(entry.to_owned()) {
            ids.push(entry.to_owned());
        }
    }

    ids
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::models::event::absence::AbsenceStatus;
    use crate::store::CollectionRef;

    fn doc(collection: CollectionRef, id: &str, data: Value) -> Document {
        Document {
            collection,
            id: id.to_owned(),
            data,
        }
    }

    #[test]
    fn member_reads_legacy_field_names() {
        let legacy = doc(
            CollectionRef::top_level(crate::store::MEMBERS),
            "alice",
            json!({ "email": "alice@example.edu", "pixeldelta": -5, "pixels": 40 }),
        );

        let member = member_from_doc(&legacy).unwrap();
        assert_eq!(member.pixel_delta, -5);
        assert_eq!(member.pixel_cached, 40);
    }

    #[test]
    fn member_prefers_canonical_field_names() {
        let migrated = doc(
            CollectionRef::top_level(crate::store::MEMBERS),
            "alice",
            json!({ "pixel_delta": 3, "pixeldelta": -5, "pixel_cached": 12, "pixels": 40 }),
        );

        let member = member_from_doc(&migrated).unwrap();
        assert_eq!(member.pixel_delta, 3);
        assert_eq!(member.pixel_cached, 12);
    }

    #[test]
    fn event_scrubs_malformed_pixels_and_duplicate_attendees() {
        let event = event_from_doc(&doc(
            CollectionRef::top_level(crate::store::EVENTS),
            "e1",
            json!({
                "name": "GBM 1",
                "date": "2025-09-03",
                "type": "GBM",
                "pixels": "lots",
                "attendees": ["alice", "bob", "alice"],
                "semester_id": "fall-2025",
            }),
        ))
        .unwrap();

        assert_eq!(event.pixels, 0);
        assert_eq!(event.attendees, vec!["alice", "bob"]);
    }

    #[test]
    fn absence_reads_legacy_rejected_status_and_parent_event() {
        let absence = absence_from_doc(&doc(
            CollectionRef::excused_absences("e1"),
            "a1",
            json!({
                "user_id": "bob",
                "reason": "sick",
                "status": "rejected",
                "created_at": "2025-09-01T12:00:00Z",
            }),
        ))
        .unwrap();

        assert_eq!(absence.status, AbsenceStatus::Denied);
        assert_eq!(absence.event_id, "e1");
    }

    #[test]
    fn activity_drops_non_positive_multipliers() {
        let activity = activity_from_doc(&doc(
            CollectionRef::top_level(crate::store::ACTIVITIES),
            "coffee",
            json!({
                "name": "Coffee chats",
                "type": "coffee_chat",
                "pixels": 5,
                "semester_id": "fall-2025",
                "multipliers": { "alice": 3, "bob": 0, "carol": -2, "dave": "many" },
            }),
        ))
        .unwrap();

        assert_eq!(activity.multiplier_for("alice"), 3);
        assert_eq!(activity.multiplier_for("bob"), 0);
        assert_eq!(activity.multiplier_for("carol"), 0);
        assert_eq!(activity.multiplier_for("dave"), 0);
    }
}
