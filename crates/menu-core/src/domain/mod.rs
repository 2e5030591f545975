//! # Menu Core - Domain Module
//!
//! Domain entities for the menu service.

pub mod menu;
pub mod menu_item;
pub mod node;

// Re-export all entities and enums
pub use menu::{validate_slug, Menu, MenuStatus, SaveAction};
pub use menu_item::{ItemType, MenuItem};
pub use node::MenuNode;
