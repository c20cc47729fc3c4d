use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Rusqlite error: {0}")]
    Rusqlite(#[from] rusqlite::Error),
    #[error("Item not found in database: {0}")]
    NotFound(String),
}

/// Timestamps are stored as RFC 3339 TEXT columns. Rows written by older
/// tooling may carry values that no longer parse; those fall back to the
/// epoch minimum so a single bad row cannot poison a listing.
pub(crate) fn ts_from_sql(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

pub(crate) fn opt_ts_from_sql(raw: Option<String>) -> Option<DateTime<Utc>> {
    raw.and_then(|s| {
        DateTime::parse_from_rfc3339(&s)
            .map(|t| t.with_timezone(&Utc))
            .ok()
    })
}

pub mod audit_db_operations;
pub mod carousel_db_operations;
pub mod content_db_operations;
pub mod posts_db_operations;
pub mod settings_db_operations;
pub mod users_db_operations;
