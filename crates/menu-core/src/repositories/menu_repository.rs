//! Menu repository traits (ports)

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Menu, MenuItem, MenuStatus};
use crate::error::DomainError;
use crate::ordering::OrderUpdate;

/// Isolation requested for a unit of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxMode {
    /// Consistent snapshot, no writes (repeatable read or better).
    ReadOnly,
    /// Serializable; conflicting writers abort with `TransactionAborted`.
    ReadWrite,
}

/// Filter for menu listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MenuFilter {
    pub status: Option<MenuStatus>,
    pub query: Option<String>,
}

impl MenuFilter {
    /// Trimmed search text; blank queries match everything.
    pub fn normalized_query(&self) -> Option<&str> {
        self.query.as_deref().map(str::trim).filter(|q| !q.is_empty())
    }

    /// Exact status, then case-insensitive name substring or slug substring.
    pub fn matches(&self, menu: &Menu) -> bool {
        if self.status.is_some_and(|status| status != menu.status) {
            return false;
        }
        match self.normalized_query() {
            Some(q) => {
                menu.name.to_lowercase().contains(&q.to_lowercase()) || menu.slug.contains(q)
            }
            None => true,
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MenuRepository: Send + Sync {
    /// Opens a unit of work. Dropping it without `commit` rolls back.
    async fn begin(&self, mode: TxMode) -> Result<Box<dyn MenuUnitOfWork>, DomainError>;

    /// Storage liveness check used by the readiness probe.
    async fn ping(&self) -> Result<(), DomainError>;
}

/// Reads and writes executed inside one transaction.
#[async_trait]
pub trait MenuUnitOfWork: Send {
    async fn find_menu_by_slug(&mut self, slug: &str) -> Result<Option<Menu>, DomainError>;
    async fn list_menus(&mut self, filter: &MenuFilter) -> Result<Vec<Menu>, DomainError>;
    async fn insert_menu(&mut self, menu: &Menu) -> Result<Menu, DomainError>;
    async fn update_menu(&mut self, menu: &Menu) -> Result<Menu, DomainError>;
    /// Deletes the menu and every item it owns.
    async fn delete_menu(&mut self, menu_id: &Uuid) -> Result<(), DomainError>;

    async fn find_item(&mut self, menu_id: &Uuid, item_id: &Uuid) -> Result<Option<MenuItem>, DomainError>;
    async fn list_items(&mut self, menu_id: &Uuid) -> Result<Vec<MenuItem>, DomainError>;
    /// Children of `parent_id` (the root when `None`), ascending by order.
    async fn list_siblings(&mut self, menu_id: &Uuid, parent_id: Option<Uuid>) -> Result<Vec<MenuItem>, DomainError>;
    async fn max_sibling_order(&mut self, menu_id: &Uuid, parent_id: &Uuid) -> Result<Option<i32>, DomainError>;
    async fn insert_item(&mut self, item: &MenuItem) -> Result<MenuItem, DomainError>;
    async fn update_item(&mut self, item: &MenuItem) -> Result<MenuItem, DomainError>;
    async fn apply_orders(&mut self, menu_id: &Uuid, updates: &[OrderUpdate]) -> Result<(), DomainError>;
    /// Deletes the item and its whole subtree.
    async fn delete_item(&mut self, menu_id: &Uuid, item_id: &Uuid) -> Result<(), DomainError>;

    async fn commit(&mut self) -> Result<(), DomainError>;
}
