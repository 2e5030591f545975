// ============================================================================
// Menu Infrastructure - PostgreSQL Menu Repository
// File: crates/menu-infrastructure/src/database/postgres/menu_repo_impl.rs
// ============================================================================

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection, PgPool, Postgres, Transaction};
use tracing::{debug, info};
use uuid::Uuid;

use menu_core::domain::{ItemType, Menu, MenuItem, MenuStatus};
use menu_core::error::DomainError;
use menu_core::ordering::OrderUpdate;
use menu_core::repositories::{MenuFilter, MenuRepository, MenuUnitOfWork, TxMode};

use super::errors::map_db_error;

const MENU_COLUMNS: &str = "id, name, slug, status, created_at, updated_at";
const ITEM_COLUMNS: &str =
    "id, menu_id, parent_id, title, url, item_type, sort_order, created_at, updated_at";

pub struct PgMenuRepository {
    pool: PgPool,
}

impl PgMenuRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal row types for SQLx mapping
#[derive(Debug, FromRow)]
struct MenuRow {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<MenuRow> for Menu {
    fn from(row: MenuRow) -> Self {
        Menu {
            id: row.id,
            name: row.name,
            slug: row.slug,
            status: MenuStatus::from_str(&row.status).unwrap_or_default(),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct MenuItemRow {
    pub id: Uuid,
    pub menu_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub title: String,
    pub url: Option<String>,
    pub item_type: String,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<MenuItemRow> for MenuItem {
    fn from(row: MenuItemRow) -> Self {
        MenuItem {
            id: row.id,
            menu_id: row.menu_id,
            parent_id: row.parent_id,
            title: row.title,
            url: row.url,
            item_type: ItemType::from_str(&row.item_type).unwrap_or_default(),
            order: row.sort_order,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl MenuRepository for PgMenuRepository {
    async fn begin(&self, mode: TxMode) -> Result<Box<dyn MenuUnitOfWork>, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(map_db_error("beginning transaction", None))?;

        let isolation = match mode {
            TxMode::ReadOnly => "SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY",
            TxMode::ReadWrite => "SET TRANSACTION ISOLATION LEVEL SERIALIZABLE",
        };
        sqlx::query(isolation)
            .execute(&mut *tx)
            .await
            .map_err(map_db_error("setting isolation level", None))?;

        Ok(Box::new(PgMenuUnitOfWork { tx: Some(tx) }))
    }

    async fn ping(&self) -> Result<(), DomainError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(map_db_error("pinging database", None))?;
        Ok(())
    }
}

/// One PostgreSQL transaction. Dropped uncommitted, sqlx rolls it back.
pub struct PgMenuUnitOfWork {
    tx: Option<Transaction<'static, Postgres>>,
}

impl PgMenuUnitOfWork {
    fn conn(&mut self) -> Result<&mut PgConnection, DomainError> {
        self.tx
            .as_deref_mut()
            .ok_or_else(|| DomainError::InternalError("unit of work already committed".to_string()))
    }
}

#[async_trait]
impl MenuUnitOfWork for PgMenuUnitOfWork {
    async fn find_menu_by_slug(&mut self, slug: &str) -> Result<Option<Menu>, DomainError> {
        let row: Option<MenuRow> = sqlx::query_as(&format!(
            "SELECT {MENU_COLUMNS} FROM menus WHERE slug = $1"
        ))
        .bind(slug)
        .fetch_optional(self.conn()?)
        .await
        .map_err(map_db_error("finding menu by slug", None))?;

        Ok(row.map(|r| r.into()))
    }

    async fn list_menus(&mut self, filter: &MenuFilter) -> Result<Vec<Menu>, DomainError> {
        let rows: Vec<MenuRow> = sqlx::query_as(&format!(
            r#"
            SELECT {MENU_COLUMNS}
            FROM menus
            WHERE ($1::text IS NULL OR status = $1)
              AND ($2::text IS NULL
                   OR strpos(lower(name), lower($2)) > 0
                   OR strpos(slug, $2) > 0)
            ORDER BY updated_at DESC, id
            "#
        ))
        .bind(filter.status.map(|s| s.as_str()))
        .bind(filter.normalized_query())
        .fetch_all(self.conn()?)
        .await
        .map_err(map_db_error("listing menus", None))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn insert_menu(&mut self, menu: &Menu) -> Result<Menu, DomainError> {
        let row: MenuRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO menus ({MENU_COLUMNS})
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {MENU_COLUMNS}
            "#
        ))
        .bind(menu.id)
        .bind(&menu.name)
        .bind(&menu.slug)
        .bind(menu.status.as_str())
        .bind(menu.created_at)
        .bind(menu.updated_at)
        .fetch_one(self.conn()?)
        .await
        .map_err(map_db_error("creating menu", Some(&menu.slug)))?;

        info!("Menu row inserted: {}", row.id);
        Ok(row.into())
    }

    async fn update_menu(&mut self, menu: &Menu) -> Result<Menu, DomainError> {
        let row: Option<MenuRow> = sqlx::query_as(&format!(
            r#"
            UPDATE menus
            SET name = $2, status = $3, updated_at = $4
            WHERE id = $1
            RETURNING {MENU_COLUMNS}
            "#
        ))
        .bind(menu.id)
        .bind(&menu.name)
        .bind(menu.status.as_str())
        .bind(menu.updated_at)
        .fetch_optional(self.conn()?)
        .await
        .map_err(map_db_error("updating menu", None))?;

        row.map(Into::into)
            .ok_or_else(|| DomainError::MenuNotFound(menu.slug.clone()))
    }

    async fn delete_menu(&mut self, menu_id: &Uuid) -> Result<(), DomainError> {
        sqlx::query("DELETE FROM menus WHERE id = $1")
            .bind(menu_id)
            .execute(self.conn()?)
            .await
            .map_err(map_db_error("deleting menu", None))?;
        Ok(())
    }

    async fn find_item(&mut self, menu_id: &Uuid, item_id: &Uuid) -> Result<Option<MenuItem>, DomainError> {
        let row: Option<MenuItemRow> = sqlx::query_as(&format!(
            "SELECT {ITEM_COLUMNS} FROM menu_items WHERE menu_id = $1 AND id = $2"
        ))
        .bind(menu_id)
        .bind(item_id)
        .fetch_optional(self.conn()?)
        .await
        .map_err(map_db_error("finding item", None))?;

        Ok(row.map(|r| r.into()))
    }

    async fn list_items(&mut self, menu_id: &Uuid) -> Result<Vec<MenuItem>, DomainError> {
        let rows: Vec<MenuItemRow> = sqlx::query_as(&format!(
            r#"
            SELECT {ITEM_COLUMNS}
            FROM menu_items
            WHERE menu_id = $1
            ORDER BY parent_id NULLS FIRST, sort_order
            "#
        ))
        .bind(menu_id)
        .fetch_all(self.conn()?)
        .await
        .map_err(map_db_error("listing items", None))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_siblings(&mut self, menu_id: &Uuid, parent_id: Option<Uuid>) -> Result<Vec<MenuItem>, DomainError> {
        let rows: Vec<MenuItemRow> = sqlx::query_as(&format!(
            r#"
            SELECT {ITEM_COLUMNS}
            FROM menu_items
            WHERE menu_id = $1 AND parent_id IS NOT DISTINCT FROM $2
            ORDER BY sort_order, id
            "#
        ))
        .bind(menu_id)
        .bind(parent_id)
        .fetch_all(self.conn()?)
        .await
        .map_err(map_db_error("listing siblings", None))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn max_sibling_order(&mut self, menu_id: &Uuid, parent_id: &Uuid) -> Result<Option<i32>, DomainError> {
        sqlx::query_scalar::<_, Option<i32>>(
            "SELECT MAX(sort_order) FROM menu_items WHERE menu_id = $1 AND parent_id = $2",
        )
        .bind(menu_id)
        .bind(parent_id)
        .fetch_one(self.conn()?)
        .await
        .map_err(map_db_error("reading max sibling order", None))
    }

    async fn insert_item(&mut self, item: &MenuItem) -> Result<MenuItem, DomainError> {
        let row: MenuItemRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO menu_items ({ITEM_COLUMNS})
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {ITEM_COLUMNS}
            "#
        ))
        .bind(item.id)
        .bind(item.menu_id)
        .bind(item.parent_id)
        .bind(&item.title)
        .bind(&item.url)
        .bind(item.item_type.as_str())
        .bind(item.order)
        .bind(item.created_at)
        .bind(item.updated_at)
        .fetch_one(self.conn()?)
        .await
        .map_err(map_db_error("creating item", None))?;

        Ok(row.into())
    }

    async fn update_item(&mut self, item: &MenuItem) -> Result<MenuItem, DomainError> {
        let row: Option<MenuItemRow> = sqlx::query_as(&format!(
            r#"
            UPDATE menu_items
            SET parent_id = $3, title = $4, url = $5, item_type = $6,
                sort_order = $7, updated_at = $8
            WHERE menu_id = $1 AND id = $2
            RETURNING {ITEM_COLUMNS}
            "#
        ))
        .bind(item.menu_id)
        .bind(item.id)
        .bind(item.parent_id)
        .bind(&item.title)
        .bind(&item.url)
        .bind(item.item_type.as_str())
        .bind(item.order)
        .bind(item.updated_at)
        .fetch_optional(self.conn()?)
        .await
        .map_err(map_db_error("updating item", None))?;

        row.map(Into::into)
            .ok_or(DomainError::ItemNotFound(item.id))
    }

    async fn apply_orders(&mut self, menu_id: &Uuid, updates: &[OrderUpdate]) -> Result<(), DomainError> {
        if updates.is_empty() {
            return Ok(());
        }

        let ids: Vec<Uuid> = updates.iter().map(|u| u.id).collect();
        let orders: Vec<i32> = updates.iter().map(|u| u.order).collect();

        let result = sqlx::query(
            r#"
            UPDATE menu_items AS m
            SET sort_order = u.sort_order, updated_at = NOW()
            FROM UNNEST($2::uuid[], $3::int4[]) AS u(id, sort_order)
            WHERE m.menu_id = $1 AND m.id = u.id
            "#,
        )
        .bind(menu_id)
        .bind(&ids)
        .bind(&orders)
        .execute(self.conn()?)
        .await
        .map_err(map_db_error("renumbering siblings", None))?;

        debug!("Renumbered {} sibling(s)", result.rows_affected());
        Ok(())
    }

    async fn delete_item(&mut self, menu_id: &Uuid, item_id: &Uuid) -> Result<(), DomainError> {
        // Descendants go with it through menu_items_parent_fkey
        sqlx::query("DELETE FROM menu_items WHERE menu_id = $1 AND id = $2")
            .bind(menu_id)
            .bind(item_id)
            .execute(self.conn()?)
            .await
            .map_err(map_db_error("deleting item", None))?;
        Ok(())
    }

    async fn commit(&mut self) -> Result<(), DomainError> {
        let tx = self
            .tx
            .take()
            .ok_or_else(|| DomainError::InternalError("unit of work already committed".to_string()))?;

        // Deferred constraints are checked here
        tx.commit()
            .await
            .map_err(map_db_error("committing transaction", None))
    }
}
