// ============================================================================
// Menu Core - Menu Service
// File: crates/menu-core/src/services/menu_service.rs
// ============================================================================
//! Menu and item orchestration on top of the repository unit of work.
//!
//! Every operation runs inside exactly one unit of work. Writes are replayed
//! from scratch when the store aborts the transaction on a serialization
//! conflict, up to the configured retry budget.

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use menu_shared::config::ServiceSettings;

use crate::domain::{ItemType, Menu, MenuItem, MenuNode, MenuStatus, SaveAction};
use crate::error::DomainError;
use crate::ordering::{compact, next_append_order, plan_reorder};
use crate::repositories::{MenuFilter, MenuRepository, MenuUnitOfWork, TxMode};
use crate::tree::build_tree;

/// Replay policy for aborted transactions.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    /// Exponential backoff: base, 2x base, 4x base, ...
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(1u32 << attempt.min(16))
    }
}

impl From<&ServiceSettings> for RetryPolicy {
    fn from(settings: &ServiceSettings) -> Self {
        Self {
            max_retries: settings.max_retries,
            base_delay: Duration::from_millis(settings.retry_base_delay_ms),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&ServiceSettings::default())
    }
}

/// Fields for a new item.
#[derive(Debug, Clone, Default)]
pub struct NewItem {
    /// Parent item; the menu root when `None`.
    pub parent_id: Option<Uuid>,
    pub title: String,
    pub url: Option<String>,
    pub item_type: Option<ItemType>,
}

/// Partial item update. `parent_id` moves, `order` repositions.
#[derive(Debug, Clone, Default)]
pub struct ItemChanges {
    pub title: Option<String>,
    pub url: Option<String>,
    pub item_type: Option<ItemType>,
    pub parent_id: Option<Uuid>,
    pub order: Option<i32>,
}

/// Partial menu update.
#[derive(Debug, Clone, Default)]
pub struct MenuChanges {
    pub name: Option<String>,
    pub status: Option<MenuStatus>,
}

/// A freshly created menu and its root item.
#[derive(Debug, Clone, Serialize)]
pub struct MenuWithRoot {
    pub menu: Menu,
    pub root: MenuItem,
}

/// A menu and its materialized tree.
#[derive(Debug, Clone, Serialize)]
pub struct MenuTree {
    pub menu: Menu,
    pub root: MenuNode,
}

/// Menu orchestration service
pub struct MenuService<R: MenuRepository + ?Sized = dyn MenuRepository> {
    repo: Arc<R>,
    retry: RetryPolicy,
}

impl<R: MenuRepository + ?Sized> MenuService<R> {
    pub fn new(repo: Arc<R>, retry: RetryPolicy) -> Self {
        Self { repo, retry }
    }

    /// Storage liveness, for readiness probes.
    pub async fn ping(&self) -> Result<(), DomainError> {
        self.repo.ping().await
    }

    // ------------------------------------------------------------------
    // Menus
    // ------------------------------------------------------------------

    /// Creates a menu together with its root item.
    pub async fn create_menu(&self, name: &str, slug: &str) -> Result<MenuWithRoot, DomainError> {
        let menu = Menu::new(name.to_string(), slug.to_string())?;
        let created = self
            .retrying("create_menu", || self.try_create_menu(&menu))
            .await?;

        info!(menu_id = %created.menu.id, slug = %created.menu.slug, "Menu created");
        Ok(created)
    }

    async fn try_create_menu(&self, menu: &Menu) -> Result<MenuWithRoot, DomainError> {
        let mut uow = self.repo.begin(TxMode::ReadWrite).await?;

        if uow.find_menu_by_slug(&menu.slug).await?.is_some() {
            warn!("Menu creation failed: slug already exists: {}", menu.slug);
            return Err(DomainError::SlugAlreadyExists(menu.slug.clone()));
        }

        let menu = uow.insert_menu(menu).await?;
        let root = uow.insert_item(&MenuItem::root(menu.id, menu.root_title())).await?;
        uow.commit().await?;

        Ok(MenuWithRoot { menu, root })
    }

    /// Lists menus, most recently updated first.
    pub async fn list_menus(&self, filter: &MenuFilter) -> Result<Vec<Menu>, DomainError> {
        self.retrying("list_menus", || async move {
            let mut uow = self.repo.begin(TxMode::ReadOnly).await?;
            let menus = uow.list_menus(filter).await?;
            uow.commit().await?;
            Ok::<_, DomainError>(menus)
        })
        .await
    }

    pub async fn get_menu(&self, slug: &str) -> Result<Menu, DomainError> {
        self.retrying("get_menu", || async move {
            let mut uow = self.repo.begin(TxMode::ReadOnly).await?;
            let menu = load_menu(uow.as_mut(), slug).await?;
            uow.commit().await?;
            Ok::<_, DomainError>(menu)
        })
        .await
    }

    /// Loads every item of the menu from one snapshot and builds the tree.
    pub async fn get_menu_tree(&self, slug: &str) -> Result<MenuTree, DomainError> {
        self.retrying("get_menu_tree", || async move {
            let mut uow = self.repo.begin(TxMode::ReadOnly).await?;
            let menu = load_menu(uow.as_mut(), slug).await?;
            let items = uow.list_items(&menu.id).await?;
            uow.commit().await?;

            let root = build_tree(&items)?;
            Ok::<_, DomainError>(MenuTree { menu, root })
        })
        .await
    }

    pub async fn update_menu(&self, slug: &str, changes: &MenuChanges) -> Result<Menu, DomainError> {
        self.retrying("update_menu", || async move {
            let mut uow = self.repo.begin(TxMode::ReadWrite).await?;
            let mut menu = load_menu(uow.as_mut(), slug).await?;

            if let Some(name) = &changes.name {
                menu.rename(name)?;
            }
            if let Some(status) = changes.status {
                menu.set_status(status);
            }
            menu.touch();

            let menu = uow.update_menu(&menu).await?;
            uow.commit().await?;
            Ok::<_, DomainError>(menu)
        })
        .await
    }

    /// `Publish` flips the status; `Save` only refreshes `updated_at`.
    pub async fn save_menu(&self, slug: &str, action: SaveAction) -> Result<Menu, DomainError> {
        let menu = self
            .retrying("save_menu", || async move {
                let mut uow = self.repo.begin(TxMode::ReadWrite).await?;
                let mut menu = load_menu(uow.as_mut(), slug).await?;

                match action {
                    SaveAction::Publish => menu.publish(),
                    SaveAction::Save => menu.touch(),
                }

                let menu = uow.update_menu(&menu).await?;
                uow.commit().await?;
                Ok::<_, DomainError>(menu)
            })
            .await?;

        info!(slug = %slug, action = ?action, status = %menu.status.as_str(), "Menu saved");
        Ok(menu)
    }

    /// Deletes the menu and all of its items.
    pub async fn delete_menu(&self, slug: &str) -> Result<(), DomainError> {
        self.retrying("delete_menu", || async move {
            let mut uow = self.repo.begin(TxMode::ReadWrite).await?;
            let menu = load_menu(uow.as_mut(), slug).await?;
            uow.delete_menu(&menu.id).await?;
            uow.commit().await
        })
        .await?;

        info!(slug = %slug, "Menu deleted");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Items
    // ------------------------------------------------------------------

    /// Appends a new item as the last child of its parent.
    pub async fn add_item(&self, slug: &str, new_item: &NewItem) -> Result<MenuItem, DomainError> {
        let item = self
            .retrying("add_item", || self.try_add_item(slug, new_item))
            .await?;

        debug!(item_id = %item.id, order = item.order, "Item appended");
        Ok(item)
    }

    async fn try_add_item(&self, slug: &str, new_item: &NewItem) -> Result<MenuItem, DomainError> {
        let mut uow = self.repo.begin(TxMode::ReadWrite).await?;
        let menu = load_menu(uow.as_mut(), slug).await?;

        let parent = match new_item.parent_id {
            Some(parent_id) => uow
                .find_item(&menu.id, &parent_id)
                .await?
                .ok_or(DomainError::ParentNotFound(parent_id))?,
            None => load_root(uow.as_mut(), &menu).await?,
        };

        let max = uow.max_sibling_order(&menu.id, &parent.id).await?;
        let item = MenuItem::new(
            menu.id,
            parent.id,
            new_item.title.clone(),
            new_item.url.clone(),
            new_item.item_type.unwrap_or_default(),
            next_append_order(max),
        )?;

        let item = uow.insert_item(&item).await?;
        uow.commit().await?;
        Ok(item)
    }

    /// Edits fields, moves to a new parent and/or repositions among siblings,
    /// all in one transaction.
    pub async fn update_item(
        &self,
        slug: &str,
        item_id: Uuid,
        changes: &ItemChanges,
    ) -> Result<MenuItem, DomainError> {
        self.retrying("update_item", || self.try_update_item(slug, item_id, changes))
            .await
    }

    async fn try_update_item(
        &self,
        slug: &str,
        item_id: Uuid,
        changes: &ItemChanges,
    ) -> Result<MenuItem, DomainError> {
        let mut uow = self.repo.begin(TxMode::ReadWrite).await?;
        let menu = load_menu(uow.as_mut(), slug).await?;
        let existing = uow
            .find_item(&menu.id, &item_id)
            .await?
            .ok_or(DomainError::ItemNotFound(item_id))?;

        let mut item = existing.clone();
        item.apply_edit(
            changes.title.as_deref(),
            changes.url.as_deref(),
            changes.item_type,
        )?;

        // Reparent: append under the new parent
        let mut moved = false;
        if let Some(new_parent_id) = changes.parent_id.filter(|p| existing.parent_id != Some(*p)) {
            if existing.is_root() {
                return Err(DomainError::InvalidOperation(
                    "Root item cannot be moved".to_string(),
                ));
            }
            uow.find_item(&menu.id, &new_parent_id)
                .await?
                .ok_or(DomainError::ParentNotFound(new_parent_id))?;

            let items = uow.list_items(&menu.id).await?;
            if is_within_subtree(&items, new_parent_id, item.id) {
                return Err(DomainError::InvalidOperation(
                    "Item cannot be moved under itself or its descendants".to_string(),
                ));
            }

            let max = uow.max_sibling_order(&menu.id, &new_parent_id).await?;
            item.parent_id = Some(new_parent_id);
            item.order = next_append_order(max);
            moved = true;
        }

        // Explicit position among the (possibly new) siblings
        if let Some(target) = changes.order {
            let parent_id = item.parent_id.ok_or_else(|| {
                DomainError::InvalidOperation("Root order cannot be changed".to_string())
            })?;

            let siblings: Vec<(Uuid, i32)> = uow
                .list_siblings(&menu.id, Some(parent_id))
                .await?
                .iter()
                .map(|s| (s.id, s.order))
                .collect();
            let plan = plan_reorder(&siblings, item.id, target);
            uow.apply_orders(&menu.id, &plan.updates).await?;
            item.order = plan.order;

            debug!(
                item_id = %item.id,
                requested = target,
                order = plan.order,
                shifted = plan.updates.len(),
                "Item repositioned"
            );
        }

        let item = uow.update_item(&item).await?;

        // Close the gap left in the source group
        if moved {
            let remaining: Vec<(Uuid, i32)> = uow
                .list_siblings(&menu.id, existing.parent_id)
                .await?
                .iter()
                .map(|s| (s.id, s.order))
                .collect();
            uow.apply_orders(&menu.id, &compact(&remaining)).await?;

            info!(
                item_id = %item.id,
                from = ?existing.parent_id,
                to = ?item.parent_id,
                order = item.order,
                "Item moved"
            );
        }

        uow.commit().await?;
        Ok(item)
    }

    /// Deletes a non-root item together with its subtree and re-sequences the
    /// remaining siblings.
    pub async fn delete_item(&self, slug: &str, item_id: Uuid) -> Result<(), DomainError> {
        self.retrying("delete_item", || async move {
            let mut uow = self.repo.begin(TxMode::ReadWrite).await?;
            let menu = load_menu(uow.as_mut(), slug).await?;
            let item = uow
                .find_item(&menu.id, &item_id)
                .await?
                .ok_or(DomainError::ItemNotFound(item_id))?;

            if item.is_root() {
                return Err(DomainError::InvalidOperation(
                    "Cannot delete root item".to_string(),
                ));
            }

            uow.delete_item(&menu.id, &item.id).await?;

            let remaining: Vec<(Uuid, i32)> = uow
                .list_siblings(&menu.id, item.parent_id)
                .await?
                .iter()
                .map(|s| (s.id, s.order))
                .collect();
            uow.apply_orders(&menu.id, &compact(&remaining)).await?;

            uow.commit().await
        })
        .await?;

        info!(slug = %slug, item_id = %item_id, "Item deleted");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Retry
    // ------------------------------------------------------------------

    async fn retrying<T, F, Fut>(&self, op: &'static str, mut run: F) -> Result<T, DomainError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, DomainError>>,
    {
        let mut attempt = 0;

        loop {
            match run().await {
                Ok(value) => {
                    if attempt > 0 {
                        debug!("{} succeeded after {} retry(ies)", op, attempt);
                    }
                    return Ok(value);
                }
                Err(e) if e.is_retryable() && attempt < self.retry.max_retries => {
                    let backoff = self.retry.backoff(attempt);
                    debug!(
                        "{} aborted on attempt {}/{}: {}. Retrying in {:?}",
                        op,
                        attempt + 1,
                        self.retry.max_retries + 1,
                        e,
                        backoff
                    );
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                }
                Err(e) => {
                    if e.is_retryable() {
                        warn!("Max retries ({}) exceeded for {}", self.retry.max_retries, op);
                    }
                    return Err(e);
                }
            }
        }
    }
}

async fn load_menu(uow: &mut dyn MenuUnitOfWork, slug: &str) -> Result<Menu, DomainError> {
    uow.find_menu_by_slug(slug)
        .await?
        .ok_or_else(|| DomainError::MenuNotFound(slug.to_string()))
}

async fn load_root(uow: &mut dyn MenuUnitOfWork, menu: &Menu) -> Result<MenuItem, DomainError> {
    let mut roots = uow.list_siblings(&menu.id, None).await?;
    match roots.len() {
        1 => Ok(roots.remove(0)),
        0 => Err(crate::error::TreeError::MissingRoot.into()),
        n => Err(crate::error::TreeError::MultipleRoots(n).into()),
    }
}

/// Whether `candidate` is `ancestor` or lies somewhere below it.
fn is_within_subtree(items: &[MenuItem], candidate: Uuid, ancestor: Uuid) -> bool {
    let parents: HashMap<Uuid, Option<Uuid>> =
        items.iter().map(|i| (i.id, i.parent_id)).collect();
    let mut seen = HashSet::new();
    let mut current = Some(candidate);

    while let Some(id) = current {
        if id == ancestor {
            return true;
        }
        if !seen.insert(id) {
            return false;
        }
        current = parents.get(&id).copied().flatten();
    }
    false
}
