//! Login flow and GraphQL guard tests.

use std::sync::Arc;

use async_graphql::Request;
use serde_json::json;

use pixelhub::auth::{self, IdentityProvider, Profile};
use pixelhub::error::{HubError, HubResult};
use pixelhub::graphql::build_schema;
use pixelhub::models::member::Member;
use pixelhub::store::memory::MemoryStore;
use pixelhub::store::SharedStore;

mod common;
use common::*;

struct StubProvider {
    profile: Profile,
}

#[async_trait::async_trait]
impl IdentityProvider for StubProvider {
    async fn exchange_code(&self, code: &str) -> HubResult<Profile> {
        if code == "good-code" {
            Ok(self.profile.clone())
        } else {
            Err(HubError::UpstreamAuthFailure("unknown code".to_owned()))
        }
    }
}

fn profile(email: &str, first_name: &str) -> Profile {
    Profile {
        external_id: "u1".to_owned(),
        email: email.to_owned(),
        first_name: first_name.to_owned(),
        last_name: "Tester".to_owned(),
    }
}

#[tokio::test]
async fn login_upserts_the_member_and_keeps_their_adjustments() {
    let store = MemoryStore::new();

    let provider = StubProvider {
        profile: profile("alice@example.edu", "Alice"),
    };
    let token = auth::login(&provider, &store, Some("example.edu"), "good-code")
        .await
        .unwrap();

    let member = Member::with_token(&token, &store).await.unwrap();
    assert_eq!(member.id, "u1");
    assert_eq!(member.first_name, "Alice");

    Member::set_pixel_delta("u1", 7, &store).await.unwrap();

    // A later login refreshes the profile without touching the delta.
    let provider = StubProvider {
        profile: profile("alice@example.edu", "Alicia"),
    };
    let token = auth::login(&provider, &store, Some("example.edu"), "good-code")
        .await
        .unwrap();
    let member = Member::with_token(&token, &store).await.unwrap();
    assert_eq!(member.first_name, "Alicia");
    assert_eq!(member.pixel_delta, 7);
}

#[tokio::test]
async fn logins_outside_the_workspace_are_rejected_without_side_effects() {
    let store = MemoryStore::new();
    let provider = StubProvider {
        profile: profile("eve@elsewhere.org", "Eve"),
    };

    let result = auth::login(&provider, &store, Some("example.edu"), "good-code").await;
    assert!(matches!(result, Err(HubError::UpstreamAuthFailure(_))));
    assert!(Member::all(&store).await.unwrap().is_empty());
}

#[tokio::test]
async fn rejected_codes_surface_as_auth_failures() {
    let store = MemoryStore::new();
    let provider = StubProvider {
        profile: profile("alice@example.edu", "Alice"),
    };

    let result = auth::login(&provider, &store, None, "bad-code").await;
    assert!(matches!(result, Err(HubError::UpstreamAuthFailure(_))));
}

#[tokio::test]
async fn queries_require_a_login() {
    let store: SharedStore = Arc::new(MemoryStore::new());
    let response = build_schema()
        .execute(Request::new("{ members { id } }").data(store))
        .await;

    assert_eq!(response.errors.len(), 1);
    assert_eq!(response.errors[0].message, "User must be logged in");
}

#[tokio::test]
async fn admin_mutations_reject_plain_members() {
    let store: SharedStore = Arc::new(MemoryStore::new());
    seed_member(store.as_ref(), "alice", 0).await;
    let user = Member::with_id("alice", store.as_ref()).await.unwrap();

    let response = build_schema()
        .execute(
            Request::new(r#"mutation { setPixelDelta(memberId: "alice", delta: 5) { id } }"#)
                .data(store)
                .data(user),
        )
        .await;

    assert_eq!(response.errors.len(), 1);
    assert_eq!(response.errors[0].message, "Admin access required");
}

#[tokio::test]
async fn leaderboard_stays_hidden_until_switched_on() {
    let store: SharedStore = Arc::new(MemoryStore::new());
    seed_settings(store.as_ref(), Some(SEMESTER)).await;
    seed_member_with_cache(store.as_ref(), "alice", 0, 30).await;
    seed_member_with_cache(store.as_ref(), "bob", 0, 45).await;
    let user = Member::with_id("alice", store.as_ref()).await.unwrap();

    let query = "{ leaderboard { id pixelCached } }";
    let response = build_schema()
        .execute(Request::new(query).data(store.clone()).data(user.clone()))
        .await;
    assert!(response.errors.is_empty());
    assert_eq!(
        serde_json::to_value(response.data).unwrap(),
        json!({ "leaderboard": [] })
    );

    pixelhub::models::settings::Settings::set_leadership(true, store.as_ref())
        .await
        .unwrap();

    let response = build_schema()
        .execute(Request::new(query).data(store.clone()).data(user))
        .await;
    assert!(response.errors.is_empty());
    assert_eq!(
        serde_json::to_value(response.data).unwrap(),
        json!({ "leaderboard": [
            { "id": "bob", "pixelCached": 45 },
            { "id": "alice", "pixelCached": 30 },
        ] })
    );
}
