use anyhow::{Context as _, Result};

/// Process-wide configuration, read once from the environment at startup.
#[derive(Debug, Clone)]
pub struct HubConfig {
    /// The port the API listens on.
    pub port: u16,
    /// The identity provider's token endpoint.
    pub oauth_token_url: String,
    /// The identity provider's userinfo endpoint.
    pub oauth_userinfo_url: String,
    pub oauth_client_id: String,
    pub oauth_client_secret: String,
    pub oauth_redirect_uri: String,
    /// When set, logins from any other email domain are rejected.
    pub allowed_email_domain: Option<String>,
}

impl HubConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            port: std::env::var("PIXELHUB_PORT")
                .ok()
                .map(|port| port.parse())
                .transpose()
                .context("`PIXELHUB_PORT` is not a valid port number")?
                .unwrap_or(3000),
            oauth_token_url: required("PIXELHUB_OAUTH_TOKEN_URL")?,
            oauth_userinfo_url: required("PIXELHUB_OAUTH_USERINFO_URL")?,
            oauth_client_id: required("PIXELHUB_OAUTH_CLIENT_ID")?,
            oauth_client_secret: required("PIXELHUB_OAUTH_CLIENT_SECRET")?,
            oauth_redirect_uri: required("PIXELHUB_OAUTH_REDIRECT_URI")?,
            allowed_email_domain: std::env::var("PIXELHUB_ALLOWED_EMAIL_DOMAIN").ok(),
        })
    }
}

fn required(name: &'static str) -> Result<String> {
    std::env::var(name).with_context(|| format!("`{}` not set", name))
}
