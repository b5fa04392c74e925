use thiserror::Error;

/// Every failure the API can surface, grouped the way callers need to
/// react to them rather than by where they originate.
#[derive(Debug, Error)]
pub enum HubError {
    /// A referenced member, event, activity, or semester doesn't exist.
    #[error("{0} not found")]
    NotFound(String),

    /// A required piece of global configuration is unset.
    #[error("missing configuration: {0}")]
    ConfigMissing(&'static str),

    /// The identity provider rejected the login, or the account is outside
    /// the allowed workspace. Nothing is mutated when this is returned.
    #[error("login failed: {0}")]
    UpstreamAuthFailure(String),

    #[error("login required")]
    Unauthorized,

    #[error("admin access required")]
    Forbidden,

    /// A low-level read or write against the document store failed.
    #[error("store error: {0}")]
    Store(String),

    /// A stored document couldn't be decoded even after canonicalization.
    #[error("invalid document {path}: {reason}")]
    InvalidDocument { path: String, reason: String },
}

pub type HubResult<T> = Result<T, HubError>;
