//! Login handling.
//!
//! Identity lives with an external OAuth provider: the frontend sends us
//! an authorization code, we exchange it for the user's profile, and the
//! member record is upserted from that profile. The only credential this
//! API issues is its own session token.

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::HubConfig;
use crate::error::{HubError, HubResult};
use crate::models::member::session::Session;
use crate::models::member::Member;
use crate::store::Store;

/// What the identity provider knows about a logged-in user.
#[derive(Debug, Clone)]
pub struct Profile {
    pub external_id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

#[async_trait]
pub trait IdentityProvider: Send + Sync + 'static {
    /// Exchanges an authorization code for the user's profile.
    async fn exchange_code(&self, code: &str) -> HubResult<Profile>;
}

/// The production [`IdentityProvider`]: a plain OAuth authorization-code
/// exchange against the configured token and userinfo endpoints.
pub struct OAuthClient {
    http: reqwest::Client,
    token_url: String,
    userinfo_url: String,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
}

impl OAuthClient {
    pub fn from_config(config: &HubConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            token_url: config.oauth_token_url.clone(),
            userinfo_url: config.oauth_userinfo_url.clone(),
            client_id: config.oauth_client_id.clone(),
            client_secret: config.oauth_client_secret.clone(),
            redirect_uri: config.oauth_redirect_uri.clone(),
        }
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Deserialize)]
struct UserInfo {
    sub: String,
    email: String,
    #[serde(default)]
    given_name: String,
    #[serde(default)]
    family_name: String,
}

#[async_trait]
impl IdentityProvider for OAuthClient {
    async fn exchange_code(&self, code: &str) -> HubResult<Profile> {
        let token: TokenResponse = self
            .http
            .post(&self.token_url)
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
            ])
            .send()
            .await
            .map_err(upstream)?
            .error_for_status()
            .map_err(upstream)?
            .json()
            .await
            .map_err(upstream)?;

        let info: UserInfo = self
            .http
            .get(&self.userinfo_url)
            .bearer_auth(&token.access_token)
            .send()
            .await
            .map_err(upstream)?
            .error_for_status()
            .map_err(upstream)?
            .json()
            .await
            .map_err(upstream)?;

        Ok(Profile {
            external_id: info.sub,
            email: info.email,
            first_name: info.given_name,
            last_name: info.family_name,
        })
    }
}

fn upstream(err: reqwest::Error) -> HubError {
    HubError::UpstreamAuthFailure(err.to_string())
}

/// Logs a user in: exchanges the code, enforces the workspace email
/// restriction, upserts the member, and issues a session token. A
/// rejected login mutates nothing.
pub async fn login(
    provider: &dyn IdentityProvider,
    store: &dyn Store,
    allowed_email_domain: Option<&str>,
    code: &str,
) -> HubResult<String> {
    let profile = provider.exchange_code(code).await?;

    if let Some(domain) = allowed_email_domain {
        let suffix = format!("@{}", domain);
        if !profile.email.ends_with(&suffix) {
            return Err(HubError::UpstreamAuthFailure(format!(
                "{} is outside the {} workspace",
                profile.email, domain
            )));
        }
    }

    let member = Member::upsert_from_profile(&profile, store).await?;
    Session::create(&member.id, store).await
}
