use async_graphql::SimpleObject;
use serde::{Deserialize, Serialize};

use crate::error::{HubError, HubResult};
use crate::models::DateTimeScalar;
use crate::store::{schema, CollectionRef, Store, SEMESTERS};
use crate::util::{current_time, new_id};

/// A scoping window; only events and activities tagged with the active
/// semester count toward current totals.
#[derive(SimpleObject, Clone, Debug, Serialize, Deserialize)]
pub struct Semester {
    /// The ID of the semester
    pub id: String,
    /// The name of the semester
    #[serde(default)]
    pub name: String,
    /// When the semester was created
    pub created_at: DateTimeScalar,
}

impl Semester {
    fn collection() -> CollectionRef {
        CollectionRef::top_level(SEMESTERS)
    }

    pub async fn with_id(id: &str, store: &dyn Store) -> HubResult<Self> {
        store
            .get(&Self::collection(), id)
            .await?
            .map(|doc| schema::semester_from_doc(&doc))
            .transpose()?
            .ok_or_else(|| HubError::NotFound(format!("semester {}", id)))
    }

    pub async fn all(store: &dyn Store) -> HubResult<Vec<Self>> {
        let mut semesters = store
            .list(&Self::collection())
            .await?
            .iter()
            .map(schema::semester_from_doc)
            .collect::<HubResult<Vec<_>>>()?;
        semesters.sort_by(|a, b| a.created_at.cmp(&b.created_at));

        Ok(semesters)
    }

    pub async fn create(name: &str, store: &dyn Store) -> HubResult<Self> {
        let semester = Self {
            id: new_id(),
            name: name.to_owned(),
            created_at: current_time().into(),
        };
        store
            .set(&Self::collection(), &semester.id, schema::to_doc(&semester)?)
            .await?;

        Ok(semester)
    }
}
