use time::OffsetDateTime;
use uuid::Uuid;

pub fn current_time() -> OffsetDateTime {
    OffsetDateTime::now_utc()
}

/// Generates the random ID used for new documents and session tokens.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}
