//! Immutable tree patches and explicit view state for tree consumers.
//!
//! Every function takes the tree by reference and returns a new one; the input
//! is never mutated.

use std::collections::HashSet;

use uuid::Uuid;

use crate::domain::{MenuItem, MenuNode};

/// Depth-first lookup by id.
pub fn find_node(tree: &MenuNode, id: Uuid) -> Option<&MenuNode> {
    if tree.id == id {
        return Some(tree);
    }
    tree.children.iter().find_map(|child| find_node(child, id))
}

/// Replaces the fields of the node matching `item.id`, keeping its children.
pub fn update_node(tree: &MenuNode, item: &MenuItem) -> MenuNode {
    map_node(tree, item.id, &|node| MenuNode {
        children: node.children.clone(),
        ..MenuNode::from(item)
    })
}

/// Appends `item` as the last child of `parent_id`.
pub fn append_child(tree: &MenuNode, parent_id: Uuid, item: &MenuItem) -> MenuNode {
    map_node(tree, parent_id, &|node| {
        let mut patched = node.clone();
        patched.children.push(MenuNode::from(item));
        patched
    })
}

/// Drops the subtree rooted at `id`. Removing the root itself is a no-op.
pub fn remove_node(tree: &MenuNode, id: Uuid) -> MenuNode {
    MenuNode {
        children: tree
            .children
            .iter()
            .filter(|child| child.id != id)
            .map(|child| remove_node(child, id))
            .collect(),
        ..shallow(tree)
    }
}

fn map_node(tree: &MenuNode, id: Uuid, f: &dyn Fn(&MenuNode) -> MenuNode) -> MenuNode {
    if tree.id == id {
        return f(tree);
    }
    MenuNode {
        children: tree.children.iter().map(|child| map_node(child, id, f)).collect(),
        ..shallow(tree)
    }
}

fn shallow(node: &MenuNode) -> MenuNode {
    MenuNode {
        id: node.id,
        parent_id: node.parent_id,
        title: node.title.clone(),
        url: node.url.clone(),
        item_type: node.item_type,
        order: node.order,
        children: Vec::new(),
    }
}

/// Expansion and selection state of a rendered tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeViewState {
    pub expanded: HashSet<Uuid>,
    pub selected: Option<Uuid>,
}

impl TreeViewState {
    pub fn is_expanded(&self, id: Uuid) -> bool {
        self.expanded.contains(&id)
    }

    pub fn toggle(&self, id: Uuid) -> Self {
        let mut next = self.clone();
        if !next.expanded.remove(&id) {
            next.expanded.insert(id);
        }
        next
    }

    pub fn expand_all(&self, tree: &MenuNode) -> Self {
        let mut expanded = HashSet::new();
        collect_ids(tree, &mut expanded);
        Self {
            expanded,
            selected: self.selected,
        }
    }

    pub fn collapse_all(&self) -> Self {
        Self {
            expanded: HashSet::new(),
            selected: self.selected,
        }
    }

    /// Selects `id` if it exists in `tree`, clears the selection otherwise.
    pub fn select(&self, tree: &MenuNode, id: Option<Uuid>) -> Self {
        Self {
            expanded: self.expanded.clone(),
            selected: id.filter(|id| find_node(tree, *id).is_some()),
        }
    }
}

fn collect_ids(node: &MenuNode, out: &mut HashSet<Uuid>) {
    out.insert(node.id);
    for child in &node.children {
        collect_ids(child, out);
    }
}
