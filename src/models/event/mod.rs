use async_graphql::{ComplexObject, Context, Enum, InputObject, Result, SimpleObject};
use serde::{Deserialize, Serialize};

use crate::error::{HubError, HubResult};
use crate::models::event::absence::ExcusedAbsence;
use crate::models::DateScalar;
use crate::store::{schema, CollectionRef, FieldFilter, SharedStore, Store, EVENTS};
use crate::util::new_id;

pub mod absence;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Enum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    #[serde(rename = "GBM")]
    Gbm,
    OtherMandatory,
    SponsorEvent,
    OtherProfDev,
    Social,
    OtherOptional,
    PixelActivity,
    Special,
}

impl EventType {
    /// Missing one of these without an approved excuse is penalized with
    /// an "Unexcused" classification.
    pub fn is_mandatory(self) -> bool {
        matches!(self, EventType::Gbm | EventType::OtherMandatory)
    }
}

#[derive(SimpleObject, Clone, Debug, Serialize, Deserialize)]
#[graphql(complex)]
pub struct Event {
    /// The ID of the event
    pub id: String,
    /// The name of the event
    #[serde(default)]
    pub name: String,
    /// The day the event takes place
    pub date: DateScalar,
    /// The type of the event
    pub r#type: EventType,
    /// How many pixels attending this event is worth
    #[serde(default)]
    pub pixels: i64,
    /// The IDs of the members who attended
    #[serde(default)]
    pub attendees: Vec<String>,
    /// The semester this event belongs to
    #[serde(default)]
    pub semester_id: String,
}

#[ComplexObject]
impl Event {
    /// The excused-absence requests filed against this event
    pub async fn absence_requests(&self, ctx: &Context<'_>) -> Result<Vec<ExcusedAbsence>> {
        let store: &SharedStore = ctx.data_unchecked();
        Ok(ExcusedAbsence::for_event(&self.id, store.as_ref()).await?)
    }
}

impl Event {
    fn collection() -> CollectionRef {
        CollectionRef::top_level(EVENTS)
    }

    pub async fn with_id(id: &str, store: &dyn Store) -> HubResult<Self> {
        Self::with_id_opt(id, store)
            .await?
            .ok_or_else(|| HubError::NotFound(format!("event {}", id)))
    }

    pub async fn with_id_opt(id: &str, store: &dyn Store) -> HubResult<Option<Self>> {
        store
            .get(&Self::collection(), id)
            .await?
            .map(|doc| schema::event_from_doc(&doc))
            .transpose()
    }

    pub async fn all(store: &dyn Store) -> HubResult<Vec<Self>> {
        let mut events = store
            .list(&Self::collection())
            .await?
            .iter()
            .map(schema::event_from_doc)
            .collect::<HubResult<Vec<_>>>()?;
        events.sort_by(|a, b| (a.date, &a.name).cmp(&(b.date, &b.name)));

        Ok(events)
    }

    pub async fn for_semester(semester_id: &str, store: &dyn Store) -> HubResult<Vec<Self>> {
        let mut events = store
            .find(
                &Self::collection(),
                &[FieldFilter::new("semester_id", semester_id)],
            )
            .await?
            .iter()
            .map(schema::event_from_doc)
            .collect::<HubResult<Vec<_>>>()?;
        events.sort_by(|a, b| (a.date, &a.name).cmp(&(b.date, &b.name)));

        Ok(events)
    }

    pub async fn create(new_event: NewEvent, store: &dyn Store) -> HubResult<String> {
        let event = new_event.into_event(new_id());
        store
            .set(&Self::collection(), &event.id, schema::to_doc(&event)?)
            .await?;

        Ok(event.id)
    }

    pub async fn update(id: &str, update: NewEvent, store: &dyn Store) -> HubResult<()> {
        Self::with_id(id, store).await?;

        let event = update.into_event(id.to_owned());
        store
            .set(&Self::collection(), id, schema::to_doc(&event)?)
            .await
    }

    pub async fn delete(id: &str, store: &dyn Store) -> HubResult<()> {
        Self::with_id(id, store).await?;

        store.delete(&Self::collection(), id).await
    }
}

#[derive(InputObject)]
pub struct NewEvent {
    pub name: String,
    pub date: DateScalar,
    pub r#type: EventType,
    pub pixels: i64,
    pub attendees: Option<Vec<String>>,
    pub semester_id: String,
}

impl NewEvent {
    fn into_event(self, id: String) -> Event {
        let mut attendees = self.attendees.unwrap_or_default();
        let mut seen = std::collections::HashSet::new();
        attendees.retain(|member| seen.insert(member.clone()));

        Event {
            id,
            name: self.name,
            date: self.date,
            r#type: self.r#type,
            pixels: self.pixels.max(0),
            attendees,
            semester_id: self.semester_id,
        }
    }
}
