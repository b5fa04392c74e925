//! In-memory [`Store`] implementation backing development and tests.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::{mpsc, RwLock};

use crate::error::{HubError, HubResult};
use crate::store::{CollectionRef, Document, FieldFilter, Store, WriteEvent};

#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<BTreeMap<String, BTreeMap<String, Value>>>,
    watchers: Mutex<Vec<mpsc::UnboundedSender<WriteEvent>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn notify(&self, event: WriteEvent) {
        let mut watchers = self.watchers.lock().unwrap_or_else(|err| err.into_inner());
        watchers.retain(|watcher| watcher.send(event.clone()).is_ok());
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn get(&self, collection: &CollectionRef, id: &str) -> HubResult<Option<Document>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection.as_str())
            .and_then(|documents| documents.get(id))
            .map(|data| Document {
                collection: collection.clone(),
                id: id.to_owned(),
                data: data.clone(),
            }))
    }

    async fn list(&self, collection: &CollectionRef) -> HubResult<Vec<Document>> {
        self.find(collection, &[]).await
    }

    async fn find(
        &self,
        collection: &CollectionRef,
        filters: &[FieldFilter],
    ) -> HubResult<Vec<Document>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection.as_str())
            .map(|documents| {
                documents
                    .iter()
                    .filter(|(_id, data)| filters.iter().all(|filter| filter.matches(data)))
                    .map(|(id, data)| Document {
                        collection: collection.clone(),
                        id: id.clone(),
                        data: data.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn collection_group(
        &self,
        name: &str,
        filters: &[FieldFilter],
    ) -> HubResult<Vec<Document>> {
        let collections = self.collections.read().await;
        let mut matches = vec![];
        for (path, documents) in collections.iter() {
            let collection = CollectionRef::from_path(path.clone());
            if collection.name() != name {
                continue;
            }

            for (id, data) in documents {
                if filters.iter().all(|filter| filter.matches(data)) {
                    matches.push(Document {
                        collection: collection.clone(),
                        id: id.clone(),
                        data: data.clone(),
                    });
                }
            }
        }

        Ok(matches)
    }

    async fn set(&self, collection: &CollectionRef, id: &str, data: Value) -> HubResult<()> {
        let before = {
            let mut collections = self.collections.write().await;
            collections
                .entry(collection.as_str().to_owned())
                .or_default()
                .insert(id.to_owned(), data.clone())
        };

        self.notify(WriteEvent {
            collection: collection.clone(),
            id: id.to_owned(),
            before,
            after: Some(data),
        });

        Ok(())
    }

    async fn update(
        &self,
        collection: &CollectionRef,
        id: &str,
        fields: Map<String, Value>,
    ) -> HubResult<()> {
        let (before, after) = {
            let mut collections = self.collections.write().await;
            let document = collections
                .get_mut(collection.as_str())
                .and_then(|documents| documents.get_mut(id))
                .ok_or_else(|| {
                    HubError::Store(format!(
                        "no document {}/{} to update",
                        collection.as_str(),
                        id
                    ))
                })?;

            let before = document.clone();
            match document.as_object_mut() {
                Some(existing) => existing.extend(fields),
                None => *document = Value::Object(fields),
            }

            (before, document.clone())
        };

        self.notify(WriteEvent {
            collection: collection.clone(),
            id: id.to_owned(),
            before: Some(before),
            after: Some(after),
        });

        Ok(())
    }

    async fn delete(&self, collection: &CollectionRef, id: &str) -> HubResult<()> {
        let before = {
            let mut collections = self.collections.write().await;
            collections
                .get_mut(collection.as_str())
                .and_then(|documents| documents.remove(id))
        };

        if let Some(before) = before {
            self.notify(WriteEvent {
                collection: collection.clone(),
                id: id.to_owned(),
                before: Some(before),
                after: None,
            });
        }

        Ok(())
    }

    fn watch(&self) -> mpsc::UnboundedReceiver<WriteEvent> {
        let (sender, receiver) = mpsc::unbounded_channel();
        self.watchers
            .lock()
            .unwrap_or_else(|err| err.into_inner())
            .push(sender);
        receiver
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn set_and_update_publish_snapshots() {
        let store = MemoryStore::new();
        let mut writes = store.watch();
        let events = CollectionRef::top_level(crate::store::EVENTS);

        store
            .set(&events, "e1", json!({ "name": "GBM 1" }))
            .await
            .unwrap();
        let created = writes.recv().await.unwrap();
        assert!(created.before.is_none());
        assert_eq!(created.after.unwrap()["name"], "GBM 1");

        let mut fields = Map::new();
        fields.insert("name".to_owned(), json!("GBM 1 (moved)"));
        store.update(&events, "e1", fields).await.unwrap();
        let updated = writes.recv().await.unwrap();
        assert_eq!(updated.before.unwrap()["name"], "GBM 1");
        assert_eq!(updated.after.unwrap()["name"], "GBM 1 (moved)");
    }

    #[tokio::test]
    async fn deleting_a_missing_document_is_silent() {
        let store = MemoryStore::new();
        let mut writes = store.watch();
        let events = CollectionRef::top_level(crate::store::EVENTS);

        store.delete(&events, "nope").await.unwrap();
        assert!(writes.try_recv().is_err());
    }

    #[tokio::test]
    async fn collection_group_spans_parents() {
        let store = MemoryStore::new();
        for (event, absence, user) in [("e1", "a1", "alice"), ("e2", "a2", "bob")] {
            store
                .set(
                    &CollectionRef::excused_absences(event),
                    absence,
                    json!({ "user_id": user, "status": "approved" }),
                )
                .await
                .unwrap();
        }

        let all = store
            .collection_group(crate::store::EXCUSED_ABSENCES, &[])
            .await
            .unwrap();
        assert_eq!(all.len(), 2);

        let alices = store
            .collection_group(
                crate::store::EXCUSED_ABSENCES,
                &[FieldFilter::new("user_id", "alice")],
            )
            .await
            .unwrap();
        assert_eq!(alices.len(), 1);
        assert_eq!(alices[0].collection.parent_document(), Some(("events", "e1")));
    }
}
