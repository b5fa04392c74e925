//! Routes document writes to the members they affect.
//!
//! Every write to a watched collection arrives as a [`WriteEvent`] with
//! before/after snapshots; the router derives the affected member set
//! from the snapshots and re-aggregates each member concurrently. One
//! member's failure never blocks the others and is not retried: the next
//! write touching any input collection re-fires recomputation, so totals
//! converge even when an individual pass errors transiently.

use std::collections::BTreeSet;

use futures::future::join_all;
use tokio::sync::mpsc;

use crate::pixels::{aggregate_member, AggregateOutcome};
use crate::store::{schema, SharedStore, WriteEvent, ACTIVITIES, EVENTS, EXCUSED_ABSENCES};

pub struct TriggerRouter {
    store: SharedStore,
}

impl TriggerRouter {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Consumes write notifications until the store side closes.
    pub async fn listen(self, mut writes: mpsc::UnboundedReceiver<WriteEvent>) {
        while let Some(write) = writes.recv().await {
            self.handle(&write).await;
        }
    }

    /// Recomputes every member the write may have affected, and resolves
    /// only once all of them finish or fail.
    pub async fn handle(&self, write: &WriteEvent) {
        let affected = affected_members(write);
        if affected.is_empty() {
            return;
        }

        let recomputations = affected
            .iter()
            .map(|member_id| aggregate_member(self.store.as_ref(), member_id));

        for (member_id, outcome) in affected.iter().zip(join_all(recomputations).await) {
            match outcome {
                Ok(AggregateOutcome::Updated(total)) => {
                    tracing::debug!(member = %member_id, total, "recomputed pixel total");
                }
                Ok(outcome) => {
                    tracing::debug!(member = %member_id, ?outcome, "skipped recomputation");
                }
                Err(err) => {
                    tracing::error!(member = %member_id, error = %err, "recomputation failed");
                }
            }
        }
    }
}

/// The member IDs whose totals the write may have changed.
///
/// - event writes affect everyone on either side's attendee list, so
///   removed members lose points and added members gain them;
/// - excused-absence writes affect the requesting member on either side,
///   covering the edge case of a reassigned request;
/// - activity writes affect everyone holding a multiplier on either side.
pub fn affected_members(write: &WriteEvent) -> BTreeSet<String> {
    let snapshots = || write.before.iter().chain(write.after.iter());

    match write.collection.name() {
        EVENTS if write.collection.is_top_level() => {
            snapshots().flat_map(|snapshot| schema::attendee_ids(snapshot)).collect()
        }
        EXCUSED_ABSENCES if !write.collection.is_top_level() => {
            snapshots().filter_map(|snapshot| schema::absence_user_id(snapshot)).collect()
        }
        ACTIVITIES if write.collection.is_top_level() => snapshots()
            .flat_map(|snapshot| schema::multiplier_member_ids(snapshot))
            .collect(),
        _ => BTreeSet::new(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::store::CollectionRef;

    fn ids(affected: &BTreeSet<String>) -> Vec<&str> {
        affected.iter().map(String::as_str).collect()
    }

    #[test]
    fn event_writes_affect_attendees_on_both_sides() {
        let write = WriteEvent {
            collection: CollectionRef::top_level(EVENTS),
            id: "e1".to_owned(),
            before: Some(json!({ "attendees": ["alice", "bob"] })),
            after: Some(json!({ "attendees": ["bob", "carol"] })),
        };

        assert_eq!(ids(&affected_members(&write)), vec!["alice", "bob", "carol"]);
    }

    #[test]
    fn event_deletion_affects_its_prior_attendees() {
        let write = WriteEvent {
            collection: CollectionRef::top_level(EVENTS),
            id: "e1".to_owned(),
            before: Some(json!({ "attendees": ["alice"] })),
            after: None,
        };

        assert_eq!(ids(&affected_members(&write)), vec!["alice"]);
    }

    #[test]
    fn absence_writes_affect_the_requester_on_both_sides() {
        let write = WriteEvent {
            collection: CollectionRef::excused_absences("e1"),
            id: "a1".to_owned(),
            before: Some(json!({ "user_id": "alice" })),
            after: Some(json!({ "user_id": "bob" })),
        };

        assert_eq!(ids(&affected_members(&write)), vec!["alice", "bob"]);
    }

    #[test]
    fn activity_writes_affect_multiplier_holders_on_both_sides() {
        let write = WriteEvent {
            collection: CollectionRef::top_level(ACTIVITIES),
            id: "coffee".to_owned(),
            before: Some(json!({ "multipliers": { "alice": 2 } })),
            after: Some(json!({ "multipliers": { "bob": 1 } })),
        };

        assert_eq!(ids(&affected_members(&write)), vec!["alice", "bob"]);
    }

    #[test]
    fn unwatched_collections_affect_nobody() {
        let write = WriteEvent {
            collection: CollectionRef::top_level(crate::store::MEMBERS),
            id: "alice".to_owned(),
            before: None,
            after: Some(json!({ "pixel_cached": 10 })),
        };

        assert!(affected_members(&write).is_empty());
    }
}
