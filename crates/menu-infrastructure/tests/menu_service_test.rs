//! End-to-end service behaviour over the in-memory store.

use std::sync::Arc;
use std::time::Duration;

use menu_core::domain::{ItemType, MenuItem, MenuNode, MenuStatus, SaveAction};
use menu_core::ordering::is_dense;
use menu_core::repositories::MenuFilter;
use menu_core::services::{ItemChanges, MenuChanges, NewItem, RetryPolicy};
use menu_core::{DomainError, MenuService};
use menu_infrastructure::MemoryMenuRepository;
use proptest::prelude::*;
use uuid::Uuid;

fn service() -> MenuService<MemoryMenuRepository> {
    let repo = Arc::new(MemoryMenuRepository::new());
    MenuService::new(
        repo,
        RetryPolicy {
            max_retries: 3,
            base_delay: Duration::from_millis(1),
        },
    )
}

fn link(title: &str) -> NewItem {
    NewItem {
        title: title.to_string(),
        ..NewItem::default()
    }
}

fn under(parent: &MenuItem, title: &str) -> NewItem {
    NewItem {
        parent_id: Some(parent.id),
        ..link(title)
    }
}

fn titles(node: &MenuNode) -> Vec<&str> {
    node.children.iter().map(|c| c.title.as_str()).collect()
}

fn orders(node: &MenuNode) -> Vec<i32> {
    node.children.iter().map(|c| c.order).collect()
}

fn assert_dense_everywhere(node: &MenuNode) {
    assert!(is_dense(&orders(node)), "children of {} not dense: {:?}", node.title, orders(node));
    for child in &node.children {
        assert_dense_everywhere(child);
    }
}

#[tokio::test]
async fn test_reorder_then_delete_walkthrough() {
    let service = service();
    let created = service.create_menu("Main", "main").await.unwrap();
    assert_eq!(created.root.title, "Main Root");
    assert_eq!(created.root.order, 1);
    assert_eq!(created.menu.status, MenuStatus::Draft);

    let a = service.add_item("main", &link("A")).await.unwrap();
    let b = service.add_item("main", &link("B")).await.unwrap();
    assert_eq!((a.order, b.order), (1, 2));
    assert_eq!(a.parent_id, Some(created.root.id));

    let moved = service
        .update_item("main", b.id, &ItemChanges { order: Some(1), ..ItemChanges::default() })
        .await
        .unwrap();
    assert_eq!(moved.order, 1);

    let tree = service.get_menu_tree("main").await.unwrap();
    assert_eq!(titles(&tree.root), vec!["B", "A"]);
    assert_eq!(orders(&tree.root), vec![1, 2]);

    service.delete_item("main", a.id).await.unwrap();

    let tree = service.get_menu_tree("main").await.unwrap();
    assert_eq!(tree.root.id, created.root.id);
    assert_eq!(titles(&tree.root), vec!["B"]);
    assert_eq!(orders(&tree.root), vec![1]);
}

#[tokio::test]
async fn test_append_goes_last_under_explicit_parent() {
    let service = service();
    service.create_menu("Main", "main").await.unwrap();
    let group = service
        .add_item("main", &NewItem { item_type: Some(ItemType::Group), ..link("Group") })
        .await
        .unwrap();

    for title in ["one", "two", "three"] {
        service.add_item("main", &under(&group, title)).await.unwrap();
    }

    let tree = service.get_menu_tree("main").await.unwrap();
    let group_node = &tree.root.children[0];
    assert_eq!(group_node.item_type, ItemType::Group);
    assert_eq!(titles(group_node), vec!["one", "two", "three"]);
    assert_eq!(orders(group_node), vec![1, 2, 3]);
}

#[tokio::test]
async fn test_unknown_parent_and_menu() {
    let service = service();
    service.create_menu("Main", "main").await.unwrap();
    let ghost = Uuid::new_v4();

    let result = service
        .add_item("main", &NewItem { parent_id: Some(ghost), ..link("X") })
        .await;
    assert_eq!(result, Err(DomainError::ParentNotFound(ghost)));

    let result = service.add_item("nope", &link("X")).await;
    assert_eq!(result, Err(DomainError::MenuNotFound("nope".to_string())));

    let result = service.delete_item("main", ghost).await;
    assert_eq!(result, Err(DomainError::ItemNotFound(ghost)));
}

#[tokio::test]
async fn test_parent_from_another_menu_is_not_found() {
    let service = service();
    service.create_menu("Main", "main").await.unwrap();
    let footer = service.create_menu("Footer", "footer").await.unwrap();

    let result = service
        .add_item("main", &NewItem { parent_id: Some(footer.root.id), ..link("X") })
        .await;
    assert_eq!(result, Err(DomainError::ParentNotFound(footer.root.id)));
}

#[tokio::test]
async fn test_root_is_protected() {
    let service = service();
    let created = service.create_menu("Main", "main").await.unwrap();
    let a = service.add_item("main", &link("A")).await.unwrap();
    let root_id = created.root.id;

    assert!(matches!(
        service.delete_item("main", root_id).await,
        Err(DomainError::InvalidOperation(_))
    ));
    assert!(matches!(
        service
            .update_item("main", root_id, &ItemChanges { parent_id: Some(a.id), ..ItemChanges::default() })
            .await,
        Err(DomainError::InvalidOperation(_))
    ));
    assert!(matches!(
        service
            .update_item("main", root_id, &ItemChanges { order: Some(2), ..ItemChanges::default() })
            .await,
        Err(DomainError::InvalidOperation(_))
    ));

    // Plain edits on the root are allowed
    let renamed = service
        .update_item("main", root_id, &ItemChanges { title: Some("Top".to_string()), ..ItemChanges::default() })
        .await
        .unwrap();
    assert_eq!(renamed.title, "Top");
    assert_eq!(renamed.parent_id, None);
}

#[tokio::test]
async fn test_reparent_appends_and_compacts_source() {
    let service = service();
    service.create_menu("Main", "main").await.unwrap();
    let a = service.add_item("main", &link("A")).await.unwrap();
    service.add_item("main", &link("B")).await.unwrap();
    let c = service.add_item("main", &link("C")).await.unwrap();
    service.add_item("main", &under(&c, "C1")).await.unwrap();

    let moved = service
        .update_item("main", a.id, &ItemChanges { parent_id: Some(c.id), ..ItemChanges::default() })
        .await
        .unwrap();
    assert_eq!(moved.parent_id, Some(c.id));
    assert_eq!(moved.order, 2);

    let tree = service.get_menu_tree("main").await.unwrap();
    assert_eq!(titles(&tree.root), vec!["B", "C"]);
    assert_eq!(orders(&tree.root), vec![1, 2]);
    assert_eq!(titles(&tree.root.children[1]), vec!["C1", "A"]);
    assert_dense_everywhere(&tree.root);
}

#[tokio::test]
async fn test_reparent_with_explicit_position() {
    let service = service();
    service.create_menu("Main", "main").await.unwrap();
    let a = service.add_item("main", &link("A")).await.unwrap();
    let b = service.add_item("main", &link("B")).await.unwrap();
    service.add_item("main", &under(&b, "B1")).await.unwrap();
    service.add_item("main", &under(&b, "B2")).await.unwrap();

    let moved = service
        .update_item(
            "main",
            a.id,
            &ItemChanges { parent_id: Some(b.id), order: Some(1), ..ItemChanges::default() },
        )
        .await
        .unwrap();
    assert_eq!(moved.order, 1);

    let tree = service.get_menu_tree("main").await.unwrap();
    assert_eq!(titles(&tree.root), vec!["B"]);
    assert_eq!(titles(&tree.root.children[0]), vec!["A", "B1", "B2"]);
    assert_dense_everywhere(&tree.root);
}

#[tokio::test]
async fn test_reorder_clamps_out_of_range_targets() {
    let service = service();
    service.create_menu("Main", "main").await.unwrap();
    let a = service.add_item("main", &link("A")).await.unwrap();
    service.add_item("main", &link("B")).await.unwrap();
    let c = service.add_item("main", &link("C")).await.unwrap();

    let last = service
        .update_item("main", a.id, &ItemChanges { order: Some(42), ..ItemChanges::default() })
        .await
        .unwrap();
    assert_eq!(last.order, 3);

    let first = service
        .update_item("main", c.id, &ItemChanges { order: Some(0), ..ItemChanges::default() })
        .await
        .unwrap();
    assert_eq!(first.order, 1);

    let tree = service.get_menu_tree("main").await.unwrap();
    assert_eq!(titles(&tree.root), vec!["C", "B", "A"]);
    assert_eq!(orders(&tree.root), vec![1, 2, 3]);
}

#[tokio::test]
async fn test_move_under_own_descendant_is_rejected() {
    let service = service();
    service.create_menu("Main", "main").await.unwrap();
    let a = service.add_item("main", &link("A")).await.unwrap();
    let a1 = service.add_item("main", &under(&a, "A1")).await.unwrap();

    for target in [a.id, a1.id] {
        let result = service
            .update_item("main", a.id, &ItemChanges { parent_id: Some(target), ..ItemChanges::default() })
            .await;
        assert!(matches!(result, Err(DomainError::InvalidOperation(_))), "{result:?}");
    }

    let tree = service.get_menu_tree("main").await.unwrap();
    assert_eq!(tree.root.len(), 3);
}

#[tokio::test]
async fn test_failed_update_leaves_no_partial_writes() {
    let service = service();
    service.create_menu("Main", "main").await.unwrap();
    service.add_item("main", &link("A")).await.unwrap();
    let b = service.add_item("main", &link("B")).await.unwrap();

    let result = service
        .update_item(
            "main",
            b.id,
            &ItemChanges {
                order: Some(1),
                title: Some(String::new()),
                ..ItemChanges::default()
            },
        )
        .await;
    assert!(matches!(result, Err(DomainError::ValidationError(_))));

    let tree = service.get_menu_tree("main").await.unwrap();
    assert_eq!(titles(&tree.root), vec!["A", "B"]);
}

#[tokio::test]
async fn test_delete_cascades_and_compacts() {
    let service = service();
    service.create_menu("Main", "main").await.unwrap();
    let a = service.add_item("main", &link("A")).await.unwrap();
    service.add_item("main", &under(&a, "A1")).await.unwrap();
    service.add_item("main", &link("B")).await.unwrap();
    service.add_item("main", &link("C")).await.unwrap();

    service.delete_item("main", a.id).await.unwrap();

    let tree = service.get_menu_tree("main").await.unwrap();
    assert_eq!(titles(&tree.root), vec!["B", "C"]);
    assert_eq!(orders(&tree.root), vec![1, 2]);
    assert_eq!(tree.root.len(), 3);
}

#[tokio::test]
async fn test_slug_conflict() {
    let service = service();
    service.create_menu("Main", "main").await.unwrap();

    let result = service.create_menu("Another", "main").await;
    assert_eq!(result.map(|_| ()), Err(DomainError::SlugAlreadyExists("main".to_string())));
}

#[tokio::test]
async fn test_list_filters_and_orders_by_recency() {
    let service = service();
    service.create_menu("Main Navigation", "main").await.unwrap();
    service.create_menu("Footer", "footer").await.unwrap();
    service.create_menu("Sidebar", "side").await.unwrap();

    // Touching pushes a menu to the front
    service.save_menu("main", SaveAction::Publish).await.unwrap();

    let all = service.list_menus(&MenuFilter::default()).await.unwrap();
    let slugs: Vec<&str> = all.iter().map(|m| m.slug.as_str()).collect();
    assert_eq!(slugs, vec!["main", "side", "footer"]);

    let published = service
        .list_menus(&MenuFilter { status: Some(MenuStatus::Published), query: None })
        .await
        .unwrap();
    assert_eq!(published.len(), 1);

    let by_name = service
        .list_menus(&MenuFilter { status: None, query: Some("NAVIGATION".to_string()) })
        .await
        .unwrap();
    assert_eq!(by_name.len(), 1);

    let by_slug = service
        .list_menus(&MenuFilter { status: Some(MenuStatus::Draft), query: Some("foot".to_string()) })
        .await
        .unwrap();
    assert_eq!(by_slug[0].slug, "footer");
}

#[tokio::test]
async fn test_save_and_update_menu() {
    let service = service();
    let created = service.create_menu("Main", "main").await.unwrap();

    let saved = service.save_menu("main", SaveAction::Save).await.unwrap();
    assert_eq!(saved.status, MenuStatus::Draft);
    assert!(saved.updated_at > created.menu.updated_at);

    let published = service.save_menu("main", SaveAction::Publish).await.unwrap();
    assert_eq!(published.status, MenuStatus::Published);

    let updated = service
        .update_menu(
            "main",
            &MenuChanges { name: Some("Primary".to_string()), status: Some(MenuStatus::Draft) },
        )
        .await
        .unwrap();
    assert_eq!(updated.name, "Primary");
    assert_eq!(updated.slug, "main");
    assert_eq!(updated.status, MenuStatus::Draft);
    assert_eq!(service.get_menu("main").await.unwrap(), updated);
}

#[tokio::test]
async fn test_delete_menu_removes_everything() {
    let service = service();
    service.create_menu("Main", "main").await.unwrap();
    service.add_item("main", &link("A")).await.unwrap();

    service.delete_menu("main").await.unwrap();

    assert_eq!(
        service.get_menu_tree("main").await.map(|_| ()),
        Err(DomainError::MenuNotFound("main".to_string()))
    );
    // Slug is free again
    service.create_menu("Main", "main").await.unwrap();
    let tree = service.get_menu_tree("main").await.unwrap();
    assert!(tree.root.is_leaf());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_appends_get_distinct_orders() {
    let service = Arc::new(service());
    service.create_menu("Main", "main").await.unwrap();

    let handles: Vec<_> = (0..32)
        .map(|i| {
            let service = Arc::clone(&service);
            tokio::spawn(async move { service.add_item("main", &link(&format!("N{i}"))).await })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let tree = service.get_menu_tree("main").await.unwrap();
    assert_eq!(orders(&tree.root), (1..=32).collect::<Vec<i32>>());
}

#[derive(Debug, Clone)]
enum Op {
    Add { parent: usize },
    Move { item: usize, parent: usize },
    Reorder { item: usize, target: i32 },
    Delete { item: usize },
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => any::<usize>().prop_map(|parent| Op::Add { parent }),
        2 => (any::<usize>(), any::<usize>()).prop_map(|(item, parent)| Op::Move { item, parent }),
        2 => (any::<usize>(), -2i32..10).prop_map(|(item, target)| Op::Reorder { item, target }),
        1 => any::<usize>().prop_map(|item| Op::Delete { item }),
    ]
}

fn collect_ids(node: &MenuNode, out: &mut Vec<Uuid>) {
    out.push(node.id);
    for child in &node.children {
        collect_ids(child, out);
    }
}

async fn run_ops(ops: Vec<Op>) -> MenuNode {
    let service = service();
    service.create_menu("Main", "main").await.unwrap();

    for (step, op) in ops.into_iter().enumerate() {
        let tree = service.get_menu_tree("main").await.unwrap().root;
        let mut ids = Vec::new();
        collect_ids(&tree, &mut ids);
        let pick = |n: usize| ids[n % ids.len()];

        // Rejections (root protection, cycles) are fine; storage errors are not
        let result = match op {
            Op::Add { parent } => service
                .add_item("main", &NewItem { parent_id: Some(pick(parent)), ..link(&format!("n{step}")) })
                .await
                .map(|_| ()),
            Op::Move { item, parent } => service
                .update_item("main", pick(item), &ItemChanges { parent_id: Some(pick(parent)), ..ItemChanges::default() })
                .await
                .map(|_| ()),
            Op::Reorder { item, target } => service
                .update_item("main", pick(item), &ItemChanges { order: Some(target), ..ItemChanges::default() })
                .await
                .map(|_| ()),
            Op::Delete { item } => service.delete_item("main", pick(item)).await,
        };
        if let Err(e) = result {
            assert!(matches!(e, DomainError::InvalidOperation(_)), "unexpected error: {e}");
        }
    }

    service.get_menu_tree("main").await.unwrap().root
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 48,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: sibling orders stay dense 1..N after any sequence of edits.
    #[test]
    fn property_orders_stay_dense(ops in prop::collection::vec(op(), 1..25)) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let root = runtime.block_on(run_ops(ops));

        assert_dense_everywhere(&root);
        prop_assert_eq!(root.order, 1);
        prop_assert_eq!(root.parent_id, None);
    }
}
