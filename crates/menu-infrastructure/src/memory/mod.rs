// ============================================================================
// Menu Infrastructure - In-Memory Menu Repository
// File: crates/menu-infrastructure/src/memory/mod.rs
// Description: Process-local store for development and tests
// ============================================================================
//! Units of work are serialized behind one async mutex. Each works on a copy
//! of the state and writes it back on commit, so an uncommitted unit leaves
//! nothing behind.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, error};
use uuid::Uuid;

use menu_core::domain::{Menu, MenuItem};
use menu_core::error::DomainError;
use menu_core::ordering::OrderUpdate;
use menu_core::repositories::{MenuFilter, MenuRepository, MenuUnitOfWork, TxMode};

#[derive(Debug, Clone, Default)]
struct MemoryState {
    menus: HashMap<Uuid, Menu>,
    items: HashMap<Uuid, MenuItem>,
}

impl MemoryState {
    fn children_of(&self, menu_id: Uuid, parent_id: Option<Uuid>) -> Vec<&MenuItem> {
        let mut children: Vec<&MenuItem> = self
            .items
            .values()
            .filter(|i| i.menu_id == menu_id && i.parent_id == parent_id)
            .collect();
        children.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.id.cmp(&b.id)));
        children
    }

    /// Ids of `item_id` and everything below it.
    fn subtree_ids(&self, item_id: Uuid) -> HashSet<Uuid> {
        let mut found = HashSet::from([item_id]);
        let mut frontier = vec![item_id];
        while let Some(parent) = frontier.pop() {
            for item in self.items.values() {
                if item.parent_id == Some(parent) && found.insert(item.id) {
                    frontier.push(item.id);
                }
            }
        }
        found
    }

    /// Constraints a relational store checks at commit.
    fn check_constraints(&self) -> Result<(), DomainError> {
        let mut positions = HashSet::new();
        let mut roots = HashSet::new();

        for item in self.items.values() {
            match item.parent_id {
                None => {
                    if !roots.insert(item.menu_id) {
                        return Err(DomainError::DatabaseError(format!(
                            "menu {} has more than one root",
                            item.menu_id
                        )));
                    }
                }
                Some(parent_id) => {
                    if !positions.insert((item.menu_id, parent_id, item.order)) {
                        return Err(DomainError::DatabaseError(format!(
                            "duplicate sibling order {} under {}",
                            item.order, parent_id
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}

/// In-memory menu store.
#[derive(Clone, Default)]
pub struct MemoryMenuRepository {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryMenuRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MenuRepository for MemoryMenuRepository {
    async fn begin(&self, mode: TxMode) -> Result<Box<dyn MenuUnitOfWork>, DomainError> {
        let guard = self.state.clone().lock_owned().await;
        let working = (*guard).clone();
        Ok(Box::new(MemoryUnitOfWork {
            mode,
            guard: Some(guard),
            working,
        }))
    }

    async fn ping(&self) -> Result<(), DomainError> {
        Ok(())
    }
}

struct MemoryUnitOfWork {
    mode: TxMode,
    guard: Option<OwnedMutexGuard<MemoryState>>,
    working: MemoryState,
}

impl MemoryUnitOfWork {
    fn writable(&mut self) -> Result<&mut MemoryState, DomainError> {
        match (self.mode, self.guard.is_some()) {
            (_, false) => Err(DomainError::InternalError(
                "unit of work already committed".to_string(),
            )),
            (TxMode::ReadOnly, _) => Err(DomainError::InternalError(
                "write attempted in a read-only unit of work".to_string(),
            )),
            (TxMode::ReadWrite, true) => Ok(&mut self.working),
        }
    }
}

#[async_trait]
impl MenuUnitOfWork for MemoryUnitOfWork {
    async fn find_menu_by_slug(&mut self, slug: &str) -> Result<Option<Menu>, DomainError> {
        Ok(self.working.menus.values().find(|m| m.slug == slug).cloned())
    }

    async fn list_menus(&mut self, filter: &MenuFilter) -> Result<Vec<Menu>, DomainError> {
        let mut menus: Vec<Menu> = self
            .working
            .menus
            .values()
            .filter(|m| filter.matches(m))
            .cloned()
            .collect();
        menus.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then_with(|| a.id.cmp(&b.id)));
        Ok(menus)
    }

    async fn insert_menu(&mut self, menu: &Menu) -> Result<Menu, DomainError> {
        let state = self.writable()?;
        if state.menus.values().any(|m| m.slug == menu.slug) {
            return Err(DomainError::SlugAlreadyExists(menu.slug.clone()));
        }
        state.menus.insert(menu.id, menu.clone());
        Ok(menu.clone())
    }

    async fn update_menu(&mut self, menu: &Menu) -> Result<Menu, DomainError> {
        let state = self.writable()?;
        let stored = state
            .menus
            .get_mut(&menu.id)
            .ok_or_else(|| DomainError::MenuNotFound(menu.slug.clone()))?;

        stored.name = menu.name.clone();
        stored.status = menu.status;
        stored.updated_at = menu.updated_at;
        Ok(stored.clone())
    }

    async fn delete_menu(&mut self, menu_id: &Uuid) -> Result<(), DomainError> {
        let state = self.writable()?;
        state.menus.remove(menu_id);
        state.items.retain(|_, item| item.menu_id != *menu_id);
        Ok(())
    }

    async fn find_item(&mut self, menu_id: &Uuid, item_id: &Uuid) -> Result<Option<MenuItem>, DomainError> {
        Ok(self
            .working
            .items
            .get(item_id)
            .filter(|i| i.menu_id == *menu_id)
            .cloned())
    }

    async fn list_items(&mut self, menu_id: &Uuid) -> Result<Vec<MenuItem>, DomainError> {
        Ok(self
            .working
            .items
            .values()
            .filter(|i| i.menu_id == *menu_id)
            .cloned()
            .collect())
    }

    async fn list_siblings(&mut self, menu_id: &Uuid, parent_id: Option<Uuid>) -> Result<Vec<MenuItem>, DomainError> {
        Ok(self
            .working
            .children_of(*menu_id, parent_id)
            .into_iter()
            .cloned()
            .collect())
    }

    async fn max_sibling_order(&mut self, menu_id: &Uuid, parent_id: &Uuid) -> Result<Option<i32>, DomainError> {
        Ok(self
            .working
            .children_of(*menu_id, Some(*parent_id))
            .iter()
            .map(|i| i.order)
            .max())
    }

    async fn insert_item(&mut self, item: &MenuItem) -> Result<MenuItem, DomainError> {
        let state = self.writable()?;
        if !state.menus.contains_key(&item.menu_id) {
            return Err(DomainError::MenuNotFound(item.menu_id.to_string()));
        }
        if let Some(parent_id) = item.parent_id {
            let same_menu = state
                .items
                .get(&parent_id)
                .is_some_and(|p| p.menu_id == item.menu_id);
            if !same_menu {
                return Err(DomainError::ParentNotFound(parent_id));
            }
        }
        state.items.insert(item.id, item.clone());
        Ok(item.clone())
    }

    async fn update_item(&mut self, item: &MenuItem) -> Result<MenuItem, DomainError> {
        let state = self.writable()?;
        if let Some(parent_id) = item.parent_id {
            let same_menu = state
                .items
                .get(&parent_id)
                .is_some_and(|p| p.menu_id == item.menu_id);
            if !same_menu {
                return Err(DomainError::ParentNotFound(parent_id));
            }
        }
        let stored = state
            .items
            .get_mut(&item.id)
            .filter(|i| i.menu_id == item.menu_id)
            .ok_or(DomainError::ItemNotFound(item.id))?;

        *stored = MenuItem {
            created_at: stored.created_at,
            ..item.clone()
        };
        Ok(stored.clone())
    }

    async fn apply_orders(&mut self, menu_id: &Uuid, updates: &[OrderUpdate]) -> Result<(), DomainError> {
        let state = self.writable()?;
        let now = Utc::now();
        for update in updates {
            if let Some(item) = state
                .items
                .get_mut(&update.id)
                .filter(|i| i.menu_id == *menu_id)
            {
                item.order = update.order;
                item.updated_at = now;
            }
        }
        debug!("Renumbered {} sibling(s)", updates.len());
        Ok(())
    }

    async fn delete_item(&mut self, menu_id: &Uuid, item_id: &Uuid) -> Result<(), DomainError> {
        let state = self.writable()?;
        if !state.items.get(item_id).is_some_and(|i| i.menu_id == *menu_id) {
            return Ok(());
        }
        let doomed = state.subtree_ids(*item_id);
        state.items.retain(|id, _| !doomed.contains(id));
        Ok(())
    }

    async fn commit(&mut self) -> Result<(), DomainError> {
        let mut guard = self.guard.take().ok_or_else(|| {
            DomainError::InternalError("unit of work already committed".to_string())
        })?;

        if self.mode == TxMode::ReadWrite {
            if let Err(e) = self.working.check_constraints() {
                error!("Commit rejected: {}", e);
                return Err(e);
            }
            *guard = std::mem::take(&mut self.working);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use menu_core::domain::ItemType;

    async fn seeded(repo: &MemoryMenuRepository) -> (Menu, MenuItem) {
        let menu = Menu::new("Main".to_string(), "main".to_string()).unwrap();
        let root = MenuItem::root(menu.id, menu.root_title());
        let mut uow = repo.begin(TxMode::ReadWrite).await.unwrap();
        uow.insert_menu(&menu).await.unwrap();
        uow.insert_item(&root).await.unwrap();
        uow.commit().await.unwrap();
        (menu, root)
    }

    fn child(root: &MenuItem, title: &str, order: i32) -> MenuItem {
        MenuItem::new(root.menu_id, root.id, title.to_string(), None, ItemType::Link, order).unwrap()
    }

    #[tokio::test]
    async fn test_dropped_unit_rolls_back() {
        let repo = MemoryMenuRepository::new();
        let (menu, root) = seeded(&repo).await;

        {
            let mut uow = repo.begin(TxMode::ReadWrite).await.unwrap();
            uow.insert_item(&child(&root, "A", 1)).await.unwrap();
        }

        let mut uow = repo.begin(TxMode::ReadOnly).await.unwrap();
        assert_eq!(uow.list_items(&menu.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_read_only_unit_rejects_writes() {
        let repo = MemoryMenuRepository::new();
        let (_, root) = seeded(&repo).await;

        let mut uow = repo.begin(TxMode::ReadOnly).await.unwrap();
        let result = uow.insert_item(&child(&root, "A", 1)).await;
        assert!(matches!(result, Err(DomainError::InternalError(_))));
    }

    #[tokio::test]
    async fn test_duplicate_slug_rejected() {
        let repo = MemoryMenuRepository::new();
        seeded(&repo).await;

        let twin = Menu::new("Other".to_string(), "main".to_string()).unwrap();
        let mut uow = repo.begin(TxMode::ReadWrite).await.unwrap();
        assert_eq!(
            uow.insert_menu(&twin).await,
            Err(DomainError::SlugAlreadyExists("main".to_string()))
        );
    }

    #[tokio::test]
    async fn test_duplicate_sibling_order_fails_commit() {
        let repo = MemoryMenuRepository::new();
        let (menu, root) = seeded(&repo).await;

        let mut uow = repo.begin(TxMode::ReadWrite).await.unwrap();
        uow.insert_item(&child(&root, "A", 1)).await.unwrap();
        uow.insert_item(&child(&root, "B", 1)).await.unwrap();
        assert!(matches!(uow.commit().await, Err(DomainError::DatabaseError(_))));
        drop(uow);

        let mut uow = repo.begin(TxMode::ReadOnly).await.unwrap();
        assert_eq!(uow.list_items(&menu.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_order_allowed_until_commit() {
        let repo = MemoryMenuRepository::new();
        let (menu, root) = seeded(&repo).await;
        let a = child(&root, "A", 1);
        let b = child(&root, "B", 2);

        let mut uow = repo.begin(TxMode::ReadWrite).await.unwrap();
        uow.insert_item(&a).await.unwrap();
        uow.insert_item(&b).await.unwrap();
        uow.apply_orders(&menu.id, &[OrderUpdate { id: a.id, order: 2 }]).await.unwrap();
        uow.apply_orders(&menu.id, &[OrderUpdate { id: b.id, order: 1 }]).await.unwrap();
        uow.commit().await.unwrap();

        let mut uow = repo.begin(TxMode::ReadOnly).await.unwrap();
        let titles: Vec<String> = uow
            .list_siblings(&menu.id, Some(root.id))
            .await
            .unwrap()
            .into_iter()
            .map(|i| i.title)
            .collect();
        assert_eq!(titles, vec!["B", "A"]);
    }

    #[tokio::test]
    async fn test_delete_item_removes_subtree() {
        let repo = MemoryMenuRepository::new();
        let (menu, root) = seeded(&repo).await;
        let a = child(&root, "A", 1);
        let a1 = MenuItem::new(menu.id, a.id, "A1".to_string(), None, ItemType::Link, 1).unwrap();
        let b = child(&root, "B", 2);

        let mut uow = repo.begin(TxMode::ReadWrite).await.unwrap();
        for item in [&a, &a1, &b] {
            uow.insert_item(item).await.unwrap();
        }
        uow.delete_item(&menu.id, &a.id).await.unwrap();
        uow.commit().await.unwrap();

        let mut uow = repo.begin(TxMode::ReadOnly).await.unwrap();
        let left: HashSet<Uuid> = uow.list_items(&menu.id).await.unwrap().iter().map(|i| i.id).collect();
        assert_eq!(left, HashSet::from([root.id, b.id]));
    }

    #[tokio::test]
    async fn test_parent_must_belong_to_same_menu() {
        let repo = MemoryMenuRepository::new();
        let (_, root) = seeded(&repo).await;

        let other = Menu::new("Footer".to_string(), "footer".to_string()).unwrap();
        let mut uow = repo.begin(TxMode::ReadWrite).await.unwrap();
        uow.insert_menu(&other).await.unwrap();
        let stray = MenuItem::new(other.id, root.id, "X".to_string(), None, ItemType::Link, 1).unwrap();

        assert_eq!(
            uow.insert_item(&stray).await,
            Err(DomainError::ParentNotFound(root.id))
        );
    }
}
