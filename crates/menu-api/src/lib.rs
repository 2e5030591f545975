//! # Menu API
//!
//! HTTP handlers, DTOs, error mapping, and the router.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod response;
pub mod state;

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::handlers::{health, items, menus};
use crate::state::AppState;

/// Builds the full application router.
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/menus", post(menus::create_menu).get(menus::list_menus))
        .route(
            "/menus/{slug}",
            get(menus::get_menu)
                .patch(menus::update_menu)
                .delete(menus::delete_menu),
        )
        .route("/menus/{slug}/tree", get(menus::get_menu_tree))
        .route("/menus/{slug}/save", post(menus::save_menu))
        .route("/menus/{slug}/items", post(items::add_item))
        .route(
            "/menus/{slug}/items/{item_id}",
            patch(items::update_item).delete(items::delete_item),
        );

    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness))
        .nest("/api/v1", api)
        .with_state(state)
}
