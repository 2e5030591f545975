// ============================================================================
// Menu Core - Tree Builder
// File: crates/menu-core/src/tree.rs
// Description: Rebuilds a rooted tree from flat parent-referencing rows
// ============================================================================
//! Tree reconstruction.
//!
//! Rows whose parent is missing or unreachable from the root are left out of
//! the result. They stay in storage until re-parented or deleted.

use std::collections::HashMap;

use uuid::Uuid;

use crate::domain::{MenuItem, MenuNode};
use crate::error::TreeError;

/// Builds the single rooted tree for one menu.
///
/// Siblings are ordered by `order` (then by id, so corrupted duplicate orders
/// still produce a stable result). The input slice is never modified and its
/// sequence has no effect on the output.
pub fn build_tree(items: &[MenuItem]) -> Result<MenuNode, TreeError> {
    let mut roots = items.iter().filter(|i| i.parent_id.is_none());
    let root = match (roots.next(), roots.count()) {
        (None, _) => return Err(TreeError::MissingRoot),
        (Some(root), 0) => root,
        (Some(_), extra) => return Err(TreeError::MultipleRoots(extra + 1)),
    };

    let mut by_parent: HashMap<Uuid, Vec<&MenuItem>> = HashMap::new();
    for item in items {
        if let Some(parent_id) = item.parent_id {
            by_parent.entry(parent_id).or_default().push(item);
        }
    }
    for bucket in by_parent.values_mut() {
        bucket.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.id.cmp(&b.id)));
    }

    Ok(attach(root, &by_parent))
}

fn attach(item: &MenuItem, by_parent: &HashMap<Uuid, Vec<&MenuItem>>) -> MenuNode {
    let mut node = MenuNode::from(item);
    if let Some(kids) = by_parent.get(&item.id) {
        node.children = kids.iter().map(|kid| attach(kid, by_parent)).collect();
    }
    node
}
