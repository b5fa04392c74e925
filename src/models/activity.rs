use std::collections::BTreeMap;

use async_graphql::{ComplexObject, Enum, InputObject, SimpleObject};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::{HubError, HubResult};
use crate::store::{schema, CollectionRef, FieldFilter, Store, ACTIVITIES};
use crate::util::new_id;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Enum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
    CoffeeChat,
    Bonding,
    Other,
}

/// A weighted activity: each participating member earns the base pixel
/// value times their personal multiplier.
#[derive(SimpleObject, Clone, Debug, Serialize, Deserialize)]
#[graphql(complex)]
pub struct Activity {
    /// The ID of the activity
    pub id: String,
    /// The name of the activity
    #[serde(default)]
    pub name: String,
    /// The type of the activity
    pub r#type: ActivityType,
    /// The base pixel value per multiplier unit
    #[serde(default)]
    pub pixels: i64,
    /// The semester this activity belongs to
    #[serde(default)]
    pub semester_id: String,

    /// Member ID to positive multiplier; members without an entry don't
    /// participate.
    #[graphql(skip)]
    #[serde(default)]
    pub multipliers: BTreeMap<String, i64>,
}

#[derive(SimpleObject)]
pub struct MultiplierEntry {
    /// The ID of the participating member
    pub member_id: String,
    /// The member's multiplier for this activity
    pub multiplier: i64,
}

#[ComplexObject]
impl Activity {
    /// The participating members and their multipliers
    pub async fn multipliers(&self) -> Vec<MultiplierEntry> {
        self.multipliers
            .iter()
            .map(|(member_id, multiplier)| MultiplierEntry {
                member_id: member_id.clone(),
                multiplier: *multiplier,
            })
            .collect()
    }
}

impl Activity {
    fn collection() -> CollectionRef {
        CollectionRef::top_level(ACTIVITIES)
    }

    /// The member's multiplier, or 0 when they don't participate.
    pub fn multiplier_for(&self, member_id: &str) -> i64 {
        self.multipliers.get(member_id).copied().unwrap_or(0)
    }

    pub async fn with_id(id: &str, store: &dyn Store) -> HubResult<Self> {
        Self::with_id_opt(id, store)
            .await?
            .ok_or_else(|| HubError::NotFound(format!("activity {}", id)))
    }

    pub async fn with_id_opt(id: &str, store: &dyn Store) -> HubResult<Option<Self>> {
        store
            .get(&Self::collection(), id)
            .await?
            .map(|doc| schema::activity_from_doc(&doc))
            .transpose()
    }

    pub async fn all(store: &dyn Store) -> HubResult<Vec<Self>> {
        let mut activities = store
            .list(&Self::collection())
            .await?
            .iter()
            .map(schema::activity_from_doc)
            .collect::<HubResult<Vec<_>>>()?;
        activities.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(activities)
    }

    pub async fn for_semester(semester_id: &str, store: &dyn Store) -> HubResult<Vec<Self>> {
        let mut activities = store
            .find(
                &Self::collection(),
                &[FieldFilter::new("semester_id", semester_id)],
            )
            .await?
            .iter()
            .map(schema::activity_from_doc)
            .collect::<HubResult<Vec<_>>>()?;
        activities.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(activities)
    }

    pub async fn create(new_activity: NewActivity, store: &dyn Store) -> HubResult<String> {
        let activity = new_activity.into_activity(new_id(), BTreeMap::new());
        store
            .set(&Self::collection(), &activity.id, schema::to_doc(&activity)?)
            .await?;

        Ok(activity.id)
    }

    /// Rewrites the activity's own fields; multiplier entries are managed
    /// individually through [`Activity::set_multiplier`].
    pub async fn update(id: &str, update: NewActivity, store: &dyn Store) -> HubResult<()> {
        let existing = Self::with_id(id, store).await?;

        let activity = update.into_activity(id.to_owned(), existing.multipliers);
        store
            .set(&Self::collection(), id, schema::to_doc(&activity)?)
            .await
    }

    /// Sets one member's multiplier; anything below 1 removes the entry.
    pub async fn set_multiplier(
        id: &str,
        member_id: &str,
        multiplier: i64,
        store: &dyn Store,
    ) -> HubResult<()> {
        let mut activity = Self::with_id(id, store).await?;

        if multiplier > 0 {
            activity.multipliers.insert(member_id.to_owned(), multiplier);
        } else {
            activity.multipliers.remove(member_id);
        }

        let mut fields = serde_json::Map::new();
        fields.insert("multipliers".to_owned(), json!(activity.multipliers));
        store.update(&Self::collection(), id, fields).await
    }

    pub async fn delete(id: &str, store: &dyn Store) -> HubResult<()> {
        Self::with_id(id, store).await?;

        store.delete(&Self::collection(), id).await
    }
}

#[derive(InputObject)]
pub struct NewActivity {
    pub name: String,
    pub r#type: ActivityType,
    pub pixels: i64,
    pub semester_id: String,
}

impl NewActivity {
    fn into_activity(self, id: String, multipliers: BTreeMap<String, i64>) -> Activity {
        Activity {
            id,
            name: self.name,
            r#type: self.r#type,
            pixels: self.pixels.max(0),
            semester_id: self.semester_id,
            multipliers,
        }
    }
}
