//! SQLSTATE classification for PostgreSQL errors

use menu_core::DomainError;
use tracing::error;

pub const SLUG_CONSTRAINT: &str = "menus_slug_key";
pub const SIBLING_ORDER_CONSTRAINT: &str = "menu_items_sibling_order_key";

const SERIALIZATION_FAILURE: &str = "40001";
const DEADLOCK_DETECTED: &str = "40P01";
const UNIQUE_VIOLATION: &str = "23505";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbFailure {
    /// Concurrent writer conflict; the whole unit of work may be replayed.
    Aborted,
    DuplicateSlug,
    Other,
}

pub fn classify(code: Option<&str>, constraint: Option<&str>) -> DbFailure {
    match (code, constraint) {
        (Some(SERIALIZATION_FAILURE | DEADLOCK_DETECTED), _) => DbFailure::Aborted,
        (Some(UNIQUE_VIOLATION), Some(SLUG_CONSTRAINT)) => DbFailure::DuplicateSlug,
        (Some(UNIQUE_VIOLATION), Some(SIBLING_ORDER_CONSTRAINT)) => DbFailure::Aborted,
        _ => DbFailure::Other,
    }
}

/// Maps a sqlx error raised while `context` to a domain error.
pub fn map_db_error<'a>(
    context: &'static str,
    slug: Option<&'a str>,
) -> impl FnOnce(sqlx::Error) -> DomainError + 'a {
    move |e| {
        let failure = match &e {
            sqlx::Error::Database(db) => classify(db.code().as_deref(), db.constraint()),
            _ => DbFailure::Other,
        };

        match failure {
            DbFailure::Aborted => DomainError::TransactionAborted(format!("{}: {}", context, e)),
            DbFailure::DuplicateSlug => {
                DomainError::SlugAlreadyExists(slug.unwrap_or_default().to_string())
            }
            DbFailure::Other => {
                error!("Database error {}: {}", context, e);
                DomainError::DatabaseError(e.to_string())
            }
        }
    }
}
