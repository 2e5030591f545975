// ============================================================================
// Menu Core - Sibling Order Manager
// File: crates/menu-core/src/ordering.rs
// Description: Dense 1..N sibling ordering under append, move and delete
// ============================================================================
//! Order planning.
//!
//! Functions here only compute positions. The orchestrator reads siblings and
//! applies the returned writes inside one unit of work, so a plan is either
//! committed entirely or not at all.

use uuid::Uuid;

/// A single `order` write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderUpdate {
    pub id: Uuid,
    pub order: i32,
}

/// Outcome of an explicit move to a position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReorderPlan {
    /// Final position of the moving item.
    pub order: i32,
    /// Sibling writes, limited to rows whose order actually changes.
    pub updates: Vec<OrderUpdate>,
}

/// Position for an item appended as the last sibling.
pub fn next_append_order(current_max: Option<i32>) -> i32 {
    current_max.unwrap_or(0) + 1
}

/// Clamps a requested position into `[1, group_size]`.
pub fn clamp_position(requested: i32, group_size: usize) -> i32 {
    let upper = i32::try_from(group_size.max(1)).unwrap_or(i32::MAX);
    requested.clamp(1, upper)
}

/// Plans moving `moving_id` to position `target` of a sibling group.
///
/// `siblings` are `(id, order)` pairs of the destination group as currently
/// stored. The moving item may or may not be among them: it is when the move
/// stays under the same parent, it is not when the item arrives from another
/// parent. Remaining siblings are renumbered densely in their existing
/// relative order, leaving a hole at the clamped target.
pub fn plan_reorder(siblings: &[(Uuid, i32)], moving_id: Uuid, target: i32) -> ReorderPlan {
    let mut others: Vec<(Uuid, i32)> = siblings
        .iter()
        .copied()
        .filter(|(id, _)| *id != moving_id)
        .collect();
    others.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));

    let order = clamp_position(target, others.len() + 1);

    let updates = others
        .iter()
        .enumerate()
        .filter_map(|(idx, (id, current))| {
            let dense = idx as i32 + 1;
            let new_order = if dense >= order { dense + 1 } else { dense };
            (new_order != *current).then_some(OrderUpdate {
                id: *id,
                order: new_order,
            })
        })
        .collect();

    ReorderPlan { order, updates }
}

/// Renumbers a sibling group to `1..N`, keeping relative order.
///
/// Used on the group an item left (reparent or delete). Only rows whose order
/// changes are returned.
pub fn compact(siblings: &[(Uuid, i32)]) -> Vec<OrderUpdate> {
    let mut sorted = siblings.to_vec();
    sorted.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));

    sorted
        .into_iter()
        .enumerate()
        .filter_map(|(idx, (id, current))| {
            let dense = idx as i32 + 1;
            (dense != current).then_some(OrderUpdate { id, order: dense })
        })
        .collect()
}

/// Whether `orders` is exactly `{1, ..., N}`.
pub fn is_dense(orders: &[i32]) -> bool {
    let mut sorted = orders.to_vec();
    sorted.sort_unstable();
    sorted.iter().enumerate().all(|(idx, order)| *order == idx as i32 + 1)
}
