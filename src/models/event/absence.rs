use async_graphql::{ComplexObject, Context, Enum, Result, SimpleObject};
use serde::{Deserialize, Serialize};

use crate::error::{HubError, HubResult};
use crate::models::event::Event;
use crate::models::member::Member;
use crate::models::DateTimeScalar;
use crate::store::{schema, CollectionRef, Store, SharedStore};
use crate::util::{current_time, new_id};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Enum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbsenceStatus {
    Pending,
    Approved,
    /// Older documents spell this `rejected`.
    #[serde(alias = "rejected")]
    Denied,
}

/// A request to have an absence from an event excused. Lives in a
/// subcollection of its event; only an approved request affects points.
#[derive(SimpleObject, Clone, Debug, Serialize, Deserialize)]
#[graphql(complex)]
pub struct ExcusedAbsence {
    /// The ID of the request
    pub id: String,
    /// The ID of the member requesting the absence
    pub user_id: String,
    /// The reason the member gave
    #[serde(default)]
    pub reason: String,
    /// Where the request stands
    pub status: AbsenceStatus,
    /// When the request was filed
    pub created_at: DateTimeScalar,

    #[graphql(skip)]
    #[serde(skip)]
    pub event_id: String,
}

#[ComplexObject]
impl ExcusedAbsence {
    /// The event the absence was requested from
    pub async fn event(&self, ctx: &Context<'_>) -> Result<Event> {
        let store: &SharedStore = ctx.data_unchecked();
        Ok(Event::with_id(&self.event_id, store.as_ref()).await?)
    }

    /// The member who requested the absence
    pub async fn member(&self, ctx: &Context<'_>) -> Result<Member> {
        let store: &SharedStore = ctx.data_unchecked();
        Ok(Member::with_id(&self.user_id, store.as_ref()).await?)
    }
}

impl ExcusedAbsence {
    pub async fn with_id(event_id: &str, id: &str, store: &dyn Store) -> HubResult<Self> {
        store
            .get(&CollectionRef::excused_absences(event_id), id)
            .await?
            .map(|doc| schema::absence_from_doc(&doc))
            .transpose()?
            .ok_or_else(|| HubError::NotFound(format!("absence request {}", id)))
    }

    pub async fn for_event(event_id: &str, store: &dyn Store) -> HubResult<Vec<Self>> {
        let mut absences = store
            .list(&CollectionRef::excused_absences(event_id))
            .await?
            .iter()
            .map(schema::absence_from_doc)
            .collect::<HubResult<Vec<_>>>()?;
        absences.sort_by(|a, b| a.created_at.cmp(&b.created_at));

        Ok(absences)
    }

    /// Files a new pending request for the member at the event.
    pub async fn submit(
        event_id: &str,
        user_id: &str,
        reason: &str,
        store: &dyn Store,
    ) -> HubResult<Self> {
        Event::with_id(event_id, store).await?;

        let absence = Self {
            id: new_id(),
            user_id: user_id.to_owned(),
            reason: reason.to_owned(),
            status: AbsenceStatus::Pending,
            created_at: current_time().into(),
            event_id: event_id.to_owned(),
        };
        store
            .set(
                &CollectionRef::excused_absences(event_id),
                &absence.id,
                schema::to_doc(&absence)?,
            )
            .await?;

        Ok(absence)
    }

    pub async fn set_status(
        event_id: &str,
        id: &str,
        status: AbsenceStatus,
        store: &dyn Store,
    ) -> HubResult<()> {
        Self::with_id(event_id, id, store).await?;

        let status =
            serde_json::to_value(status).map_err(|err| HubError::Store(err.to_string()))?;
        let mut fields = serde_json::Map::new();
        fields.insert("status".to_owned(), status);
        store
            .update(&CollectionRef::excused_absences(event_id), id, fields)
            .await
    }
}
