//! Domain errors

use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Menu not found: {0}")]
    MenuNotFound(String),

    #[error("Item not found: {0}")]
    ItemNotFound(Uuid),

    #[error("Parent item not found: {0}")]
    ParentNotFound(Uuid),

    #[error("Menu slug already exists: {0}")]
    SlugAlreadyExists(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid tree: {0}")]
    InvalidTree(#[from] TreeError),

    #[error("Transaction aborted: {0}")]
    TransactionAborted(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    /// Whether replaying the whole unit of work may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, DomainError::TransactionAborted(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            DomainError::MenuNotFound(_) | DomainError::ItemNotFound(_) | DomainError::ParentNotFound(_)
        )
    }
}

impl From<validator::ValidationErrors> for DomainError {
    fn from(errors: validator::ValidationErrors) -> Self {
        DomainError::ValidationError(errors.to_string())
    }
}

/// Failures reconstructing a tree from stored rows.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("menu has no root item")]
    MissingRoot,

    #[error("menu has {0} root items")]
    MultipleRoots(usize),
}
