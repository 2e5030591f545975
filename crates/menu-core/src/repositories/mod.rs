//! Repository traits (ports)

pub mod menu_repository;

pub use menu_repository::{MenuFilter, MenuRepository, MenuUnitOfWork, TxMode};

#[cfg(test)]
pub use menu_repository::MockMenuRepository;
