//! The document store the tracker runs against.
//!
//! The hosting deployment owns durable persistence; this module only pins
//! down the contract the rest of the API relies on: named collections of
//! JSON documents with equality filtering, collection-group queries over
//! subcollections, and fire-and-forget write notifications carrying
//! before/after snapshots. [`memory::MemoryStore`] is the bundled
//! implementation used for development and tests.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::mpsc;

use crate::error::HubResult;

pub mod memory;
pub mod schema;

pub const MEMBERS: &str = "members";
pub const EVENTS: &str = "events";
pub const EXCUSED_ABSENCES: &str = "excused_absences";
pub const ACTIVITIES: &str = "activities";
pub const SEMESTERS: &str = "semesters";
pub const SESSIONS: &str = "sessions";
pub const SETTINGS: &str = "settings";

/// The document ID of the settings singleton.
pub const GLOBAL_SETTINGS: &str = "global";

pub type SharedStore = Arc<dyn Store>;

/// A slash-separated path to a collection, either top-level (`events`) or
/// nested under a parent document (`events/{id}/excused_absences`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CollectionRef(String);

impl CollectionRef {
    pub fn top_level(name: &str) -> Self {
        Self(name.to_owned())
    }

    pub(crate) fn from_path(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// The excused-absence subcollection of the given event.
    pub fn excused_absences(event_id: &str) -> Self {
        Self(format!("{}/{}/{}", EVENTS, event_id, EXCUSED_ABSENCES))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The collection's own name, without any parent path.
    pub fn name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    pub fn is_top_level(&self) -> bool {
        !self.0.contains('/')
    }

    /// The `(collection, document id)` pair this collection is nested
    /// under, if it is a subcollection.
    pub fn parent_document(&self) -> Option<(&str, &str)> {
        let mut segments = self.0.split('/');
        match (segments.next(), segments.next(), segments.next()) {
            (Some(collection), Some(id), Some(_name)) => Some((collection, id)),
            _ => None,
        }
    }
}

/// A raw stored document: where it lives, its ID, and its fields as stored.
/// Reads go through [`schema`] before anything interprets the fields.
#[derive(Debug, Clone)]
pub struct Document {
    pub collection: CollectionRef,
    pub id: String,
    pub data: Value,
}

impl Document {
    pub fn path(&self) -> String {
        format!("{}/{}", self.collection.as_str(), self.id)
    }
}

/// An equality filter on a single top-level document field.
#[derive(Debug, Clone)]
pub struct FieldFilter {
    pub field: &'static str,
    pub equals: Value,
}

impl FieldFilter {
    pub fn new(field: &'static str, equals: impl Into<Value>) -> Self {
        Self {
            field,
            equals: equals.into(),
        }
    }

    pub fn matches(&self, data: &Value) -> bool {
        data.get(self.field) == Some(&self.equals)
    }
}

/// The snapshot pair published on every document write. `before` is absent
/// on create, `after` is absent on delete.
#[derive(Debug, Clone)]
pub struct WriteEvent {
    pub collection: CollectionRef,
    pub id: String,
    pub before: Option<Value>,
    pub after: Option<Value>,
}

#[async_trait]
pub trait Store: Send + Sync + 'static {
    async fn get(&self, collection: &CollectionRef, id: &str) -> HubResult<Option<Document>>;

    async fn list(&self, collection: &CollectionRef) -> HubResult<Vec<Document>>;

    /// The documents in the collection matching every filter.
    async fn find(
        &self,
        collection: &CollectionRef,
        filters: &[FieldFilter],
    ) -> HubResult<Vec<Document>>;

    /// The matching documents of every subcollection with the given name,
    /// across all parent documents.
    async fn collection_group(
        &self,
        name: &str,
        filters: &[FieldFilter],
    ) -> HubResult<Vec<Document>>;

    /// Creates or fully replaces a document.
    async fn set(&self, collection: &CollectionRef, id: &str, data: Value) -> HubResult<()>;

    /// Shallow-merges the given fields into an existing document.
    async fn update(
        &self,
        collection: &CollectionRef,
        id: &str,
        fields: Map<String, Value>,
    ) -> HubResult<()>;

    /// Deletes a document. Deleting a missing document is a no-op.
    async fn delete(&self, collection: &CollectionRef, id: &str) -> HubResult<()>;

    /// Registers a watcher that receives a [`WriteEvent`] for every write,
    /// fire-and-forget from the store's perspective.
    fn watch(&self) -> mpsc::UnboundedReceiver<WriteEvent>;
}
