// ============================================================================
// Menu Core - Menu Item Entity
// File: crates/menu-core/src/domain/menu_item.rs
// Description: Node of a menu tree stored as a parent-referencing row
// ============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use menu_shared::constants::ROOT_ORDER;

/// Item type enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum ItemType {
    #[default]
    Link,
    Group,
    Separator,
}

impl ItemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemType::Link => "LINK",
            ItemType::Group => "GROUP",
            ItemType::Separator => "SEPARATOR",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "LINK" => Some(ItemType::Link),
            "GROUP" => Some(ItemType::Group),
            "SEPARATOR" => Some(ItemType::Separator),
            _ => None,
        }
    }
}

/// Menu Item entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub id: Uuid,
    pub menu_id: Uuid,

    /// `None` only for the menu's root item.
    pub parent_id: Option<Uuid>,

    #[validate(length(min = 1, max = 200, message = "Item title must be between 1 and 200 characters"))]
    pub title: String,

    #[validate(length(max = 2048, message = "Item URL too long"))]
    pub url: Option<String>,

    #[serde(rename = "type")]
    pub item_type: ItemType,

    /// 1-based position among siblings.
    pub order: i32,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MenuItem {
    pub fn new(
        menu_id: Uuid,
        parent_id: Uuid,
        title: String,
        url: Option<String>,
        item_type: ItemType,
        order: i32,
    ) -> Result<Self, validator::ValidationErrors> {
        let now = Utc::now();
        let item = Self {
            id: Uuid::new_v4(),
            menu_id,
            parent_id: Some(parent_id),
            title: title.trim().to_string(),
            url: normalize_url(url),
            item_type,
            order,
            created_at: now,
            updated_at: now,
        };

        item.validate()?;
        Ok(item)
    }

    /// Root item created atomically with its menu.
    pub fn root(menu_id: Uuid, title: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            menu_id,
            parent_id: None,
            title,
            url: None,
            item_type: ItemType::Group,
            order: ROOT_ORDER,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Applies in-place field edits; position is handled by the order manager.
    pub fn apply_edit(
        &mut self,
        title: Option<&str>,
        url: Option<&str>,
        item_type: Option<ItemType>,
    ) -> Result<(), validator::ValidationErrors> {
        if let Some(title) = title {
            self.title = title.trim().to_string();
        }
        if let Some(url) = url {
            self.url = normalize_url(Some(url.to_string()));
        }
        if let Some(item_type) = item_type {
            self.item_type = item_type;
        }
        self.validate()?;
        self.updated_at = Utc::now();
        Ok(())
    }
}

fn normalize_url(url: Option<String>) -> Option<String> {
    url.map(|u| u.trim().to_string()).filter(|u| !u.is_empty())
}
