//! Domain services (business logic)

pub mod menu_service;

pub use menu_service::{
    ItemChanges, MenuChanges, MenuService, MenuTree, MenuWithRoot, NewItem, RetryPolicy,
};
