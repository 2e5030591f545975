//! # Menu Infrastructure
//!
//! Storage adapters implementing the menu repository ports.

pub mod database;
pub mod memory;

use std::sync::Arc;

use menu_core::repositories::MenuRepository;
use menu_core::DomainError;
use menu_shared::config::{DatabaseBackend, DatabaseSettings};
use tracing::info;

pub use database::{create_pool, run_migrations, PgMenuRepository};
pub use memory::MemoryMenuRepository;

/// Builds the repository selected by configuration.
pub async fn connect_repository(
    settings: &DatabaseSettings,
) -> Result<Arc<dyn MenuRepository>, DomainError> {
    match settings.backend {
        DatabaseBackend::Postgres => {
            let pool = create_pool(settings)
                .await
                .map_err(|e| DomainError::DatabaseError(e.to_string()))?;
            if settings.run_migrations {
                run_migrations(&pool).await?;
            }
            info!("Using PostgreSQL menu store");
            Ok(Arc::new(PgMenuRepository::new(pool)))
        }
        DatabaseBackend::Memory => {
            info!("Using in-memory menu store");
            Ok(Arc::new(MemoryMenuRepository::new()))
        }
    }
}
