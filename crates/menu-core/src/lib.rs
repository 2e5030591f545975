//! # Menu Core
//!
//! Domain entities, tree maintenance, repository traits, and the menu
//! orchestration service.

pub mod domain;
pub mod tree;
pub mod ordering;
pub mod tree_patch;
pub mod services;
pub mod repositories;
pub mod error;

// Re-export domain entities
pub use domain::*;
pub use error::{DomainError, TreeError};
pub use services::MenuService;
