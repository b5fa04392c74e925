use async_graphql::SimpleObject;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::HubResult;
use crate::models::semester::Semester;
use crate::store::{schema, CollectionRef, Store, GLOBAL_SETTINGS, SETTINGS};

/// The global settings singleton. Components read it through the narrow
/// accessors below instead of reaching into the document directly.
#[derive(SimpleObject, Clone, Debug, Default, Serialize, Deserialize)]
pub struct Settings {
    /// The semester totals are currently scoped to, if one is active
    #[serde(default)]
    pub current_semester_id: Option<String>,
    /// Whether the leaderboard is visible to members
    #[serde(default)]
    pub is_leadership_on: bool,
}

impl Settings {
    fn collection() -> CollectionRef {
        CollectionRef::top_level(SETTINGS)
    }

    /// Loads the singleton; a missing document reads as everything unset.
    pub async fn get(store: &dyn Store) -> HubResult<Self> {
        store
            .get(&Self::collection(), GLOBAL_SETTINGS)
            .await?
            .map(|doc| schema::settings_from_doc(&doc))
            .transpose()
            .map(Option::unwrap_or_default)
    }

    /// The active semester ID. Documents written by older admin builds
    /// store an empty string for "unset"; both read as no active semester.
    pub fn active_semester(&self) -> Option<&str> {
        self.current_semester_id
            .as_deref()
            .filter(|id| !id.is_empty())
    }

    pub fn leaderboard_enabled(&self) -> bool {
        self.is_leadership_on
    }

    /// Points the active-semester filter at the given semester, or clears
    /// it entirely.
    pub async fn set_current_semester(
        semester_id: Option<String>,
        store: &dyn Store,
    ) -> HubResult<()> {
        if let Some(id) = semester_id.as_deref() {
            Semester::with_id(id, store).await?;
        }

        let mut settings = Self::get(store).await?;
        settings.current_semester_id = semester_id;
        store
            .set(
                &Self::collection(),
                GLOBAL_SETTINGS,
                schema::to_doc(&settings)?,
            )
            .await
    }

    pub async fn set_leadership(enabled: bool, store: &dyn Store) -> HubResult<()> {
        let settings = Self::get(store).await?;
        let mut doc = schema::to_doc(&settings)?;
        if let Some(fields) = doc.as_object_mut() {
            fields.insert("is_leadership_on".to_owned(), json!(enabled));
        }
        store.set(&Self::collection(), GLOBAL_SETTINGS, doc).await
    }
}
