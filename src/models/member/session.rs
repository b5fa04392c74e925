use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::error::HubResult;
use crate::store::{schema, CollectionRef, Store, SESSIONS};
use crate::util::{current_time, new_id};

/// A login session, keyed in the store by its token.
#[derive(Clone, Serialize, Deserialize)]
pub struct Session {
    pub member: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Session {
    fn collection() -> CollectionRef {
        CollectionRef::top_level(SESSIONS)
    }

    pub async fn with_token_opt(token: &str, store: &dyn Store) -> HubResult<Option<Self>> {
        store
            .get(&Self::collection(), token)
            .await?
            .map(|doc| schema::session_from_doc(&doc))
            .transpose()
    }

    /// Issues a fresh token for the member.
    pub async fn create(member_id: &str, store: &dyn Store) -> HubResult<String> {
        let token = new_id();
        let session = Self {
            member: member_id.to_owned(),
            created_at: current_time(),
        };
        store
            .set(&Self::collection(), &token, schema::to_doc(&session)?)
            .await?;

        Ok(token)
    }

    pub async fn remove(token: &str, store: &dyn Store) -> HubResult<()> {
        store.delete(&Self::collection(), token).await
    }
}
