use std::collections::HashSet;

use serde_json::json;

use crate::error::HubResult;
use crate::store::{FieldFilter, Store, EXCUSED_ABSENCES};

/// The IDs of every event the member's absence has been approved for,
/// gathered with a collection-group query across all events.
///
/// Rebuilt fresh on every aggregation: approvals change independently of
/// the event writes that fire recomputation, so caching this set would
/// let a stale approval linger in the total.
pub async fn approved_event_ids(
    store: &dyn Store,
    member_id: &str,
) -> HubResult<HashSet<String>> {
    let approvals = store
        .collection_group(
            EXCUSED_ABSENCES,
            &[
                FieldFilter::new("user_id", member_id),
                FieldFilter::new("status", json!("approved")),
            ],
        )
        .await?;

    Ok(approvals
        .iter()
        .filter_map(|doc| doc.collection.parent_document())
        .map(|(_collection, event_id)| event_id.to_owned())
        .collect())
}
