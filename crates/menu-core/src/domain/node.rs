//! Materialized tree node returned by the tree endpoint.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ItemType, MenuItem};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuNode {
    pub id: Uuid,
    pub parent_id: Option<Uuid>,
    pub title: String,
    pub url: Option<String>,
    #[serde(rename = "type")]
    pub item_type: ItemType,
    pub order: i32,
    pub children: Vec<MenuNode>,
}

impl MenuNode {
    /// Number of nodes in this subtree, including `self`.
    pub fn len(&self) -> usize {
        1 + self.children.iter().map(MenuNode::len).sum::<usize>()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

impl From<&MenuItem> for MenuNode {
    fn from(item: &MenuItem) -> Self {
        Self {
            id: item.id,
            parent_id: item.parent_id,
            title: item.title.clone(),
            url: item.url.clone(),
            item_type: item.item_type,
            order: item.order,
            children: Vec::new(),
        }
    }
}
