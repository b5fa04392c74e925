use async_graphql::{ComplexObject, SimpleObject};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map};

use crate::auth::Profile;
use crate::error::{HubError, HubResult};
use crate::models::activity::Activity;
use crate::models::event::Event;
use crate::models::member::session::Session;
use crate::store::{schema, CollectionRef, FieldFilter, Store, EXCUSED_ABSENCES, MEMBERS};

pub mod session;

#[derive(SimpleObject, Clone, Debug, Serialize, Deserialize)]
#[graphql(complex)]
pub struct Member {
    /// The member's ID, assigned by the identity provider
    pub id: String,
    /// The member's email
    #[serde(default)]
    pub email: String,
    /// The member's first name
    #[serde(default)]
    pub first_name: String,
    /// The member's last name
    #[serde(default)]
    pub last_name: String,
    /// Whether the member can use the admin tools
    #[serde(default)]
    pub is_admin: bool,
    /// The manual adjustment an admin applied to the member's total
    #[serde(default)]
    pub pixel_delta: i64,
    /// The member's total pixels as of the last recomputation
    #[serde(default)]
    pub pixel_cached: i64,
}

#[ComplexObject]
impl Member {
    /// The member's full name
    pub async fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

impl Member {
    fn collection() -> CollectionRef {
        CollectionRef::top_level(MEMBERS)
    }

    pub async fn with_id(id: &str, store: &dyn Store) -> HubResult<Self> {
        Self::with_id_opt(id, store)
            .await?
            .ok_or_else(|| HubError::NotFound(format!("member {}", id)))
    }

    pub async fn with_id_opt(id: &str, store: &dyn Store) -> HubResult<Option<Self>> {
        store
            .get(&Self::collection(), id)
            .await?
            .map(|doc| schema::member_from_doc(&doc))
            .transpose()
    }

    pub async fn with_token(token: &str, store: &dyn Store) -> HubResult<Self> {
        let session = Session::with_token_opt(token, store)
            .await?
            .ok_or(HubError::Unauthorized)?;
        Self::with_id(&session.member, store).await
    }

    pub async fn all(store: &dyn Store) -> HubResult<Vec<Self>> {
        let mut members = store
            .list(&Self::collection())
            .await?
            .iter()
            .map(schema::member_from_doc)
            .collect::<HubResult<Vec<_>>>()?;
        members.sort_by(|a, b| {
            (&a.last_name, &a.first_name).cmp(&(&b.last_name, &b.first_name))
        });

        Ok(members)
    }

    /// All members ordered by their cached totals, highest first.
    pub async fn leaderboard(store: &dyn Store) -> HubResult<Vec<Self>> {
        let mut members = Self::all(store).await?;
        members.sort_by(|a, b| b.pixel_cached.cmp(&a.pixel_cached));

        Ok(members)
    }

    /// Creates the member on their first login, or refreshes the profile
    /// fields on later ones. Admin flag, delta, and cache are untouched.
    pub async fn upsert_from_profile(profile: &Profile, store: &dyn Store) -> HubResult<Self> {
        let member = match Self::with_id_opt(&profile.external_id, store).await? {
            Some(existing) => Self {
                email: profile.email.clone(),
                first_name: profile.first_name.clone(),
                last_name: profile.last_name.clone(),
                ..existing
            },
            None => Self {
                id: profile.external_id.clone(),
                email: profile.email.clone(),
                first_name: profile.first_name.clone(),
                last_name: profile.last_name.clone(),
                is_admin: false,
                pixel_delta: 0,
                pixel_cached: 0,
            },
        };

        store
            .set(&Self::collection(), &member.id, member.to_doc()?)
            .await?;

        Ok(member)
    }

    pub async fn set_admin(id: &str, is_admin: bool, store: &dyn Store) -> HubResult<()> {
        Self::with_id(id, store).await?;

        let mut fields = Map::new();
        fields.insert("is_admin".to_owned(), json!(is_admin));
        store.update(&Self::collection(), id, fields).await
    }

    pub async fn set_pixel_delta(id: &str, delta: i64, store: &dyn Store) -> HubResult<()> {
        Self::with_id(id, store).await?;

        let mut fields = Map::new();
        fields.insert("pixel_delta".to_owned(), json!(delta));
        store.update(&Self::collection(), id, fields).await
    }

    /// Persists a recomputed total, mirroring it into the legacy `pixels`
    /// field older dashboard builds still read.
    pub async fn write_cached_total(id: &str, total: i64, store: &dyn Store) -> HubResult<()> {
        let mut fields = Map::new();
        fields.insert("pixel_cached".to_owned(), json!(total));
        fields.insert("pixels".to_owned(), json!(total));
        store.update(&Self::collection(), id, fields).await
    }

    /// Folds the source member's contributions into the destination and
    /// deletes the source. The destination's own records always win over
    /// the source's; the caller must re-aggregate the destination after.
    pub async fn merge(source_id: &str, destination_id: &str, store: &dyn Store) -> HubResult<()> {
        let source = Self::with_id(source_id, store).await?;
        let destination = Self::with_id(destination_id, store).await?;

        for mut event in Event::all(store).await? {
            if !event.attendees.iter().any(|id| id == source_id) {
                continue;
            }

            event.attendees.retain(|id| id != source_id);
            if !event.attendees.iter().any(|id| id == destination_id) {
                event.attendees.push(destination_id.to_owned());
            }

            let mut fields = Map::new();
            fields.insert("attendees".to_owned(), json!(event.attendees));
            store
                .update(&CollectionRef::top_level(crate::store::EVENTS), &event.id, fields)
                .await?;
        }

        let absences = store
            .collection_group(EXCUSED_ABSENCES, &[FieldFilter::new("user_id", source_id)])
            .await?;
        for absence in absences {
            let already_covered = !store
                .find(
                    &absence.collection,
                    &[FieldFilter::new("user_id", destination_id)],
                )
                .await?
                .is_empty();

            if already_covered {
                store.delete(&absence.collection, &absence.id).await?;
            } else {
                let mut fields = Map::new();
                fields.insert("user_id".to_owned(), json!(destination_id));
                store.update(&absence.collection, &absence.id, fields).await?;
            }
        }

        for mut activity in Activity::all(store).await? {
            let moved = match activity.multipliers.remove(source_id) {
                Some(multiplier) => multiplier,
                None => continue,
            };
            activity
                .multipliers
                .entry(destination_id.to_owned())
                .or_insert(moved);

            let mut fields = Map::new();
            fields.insert("multipliers".to_owned(), json!(activity.multipliers));
            store
                .update(
                    &CollectionRef::top_level(crate::store::ACTIVITIES),
                    &activity.id,
                    fields,
                )
                .await?;
        }

        let mut fields = Map::new();
        fields.insert(
            "pixel_delta".to_owned(),
            json!(destination.pixel_delta + source.pixel_delta),
        );
        store
            .update(&Self::collection(), destination_id, fields)
            .await?;

        store.delete(&Self::collection(), source_id).await
    }

    pub fn to_doc(&self) -> HubResult<serde_json::Value> {
        let mut doc = schema::to_doc(self)?;
        if let Some(fields) = doc.as_object_mut() {
            fields.insert("pixels".to_owned(), json!(self.pixel_cached));
        }

        Ok(doc)
    }
}
