// ============================================================================
// Menu API - Menu Handlers
// File: crates/menu-api/src/handlers/menus.rs
// ============================================================================
//! Menu lifecycle HTTP handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use menu_core::domain::Menu;
use menu_core::repositories::MenuFilter;
use menu_core::services::{MenuTree, MenuWithRoot};

use crate::dto::{CreateMenuRequest, ListMenusQuery, SaveMenuRequest, UpdateMenuRequest};
use crate::error::HttpError;
use crate::state::AppState;

/// POST /api/v1/menus
pub async fn create_menu(
    State(state): State<AppState>,
    Json(payload): Json<CreateMenuRequest>,
) -> Result<(StatusCode, Json<MenuWithRoot>), HttpError> {
    payload.validate()?;

    let created = state.service.create_menu(&payload.name, &payload.slug).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/v1/menus?status=&q=
pub async fn list_menus(
    State(state): State<AppState>,
    Query(query): Query<ListMenusQuery>,
) -> Result<Json<Vec<Menu>>, HttpError> {
    let filter = MenuFilter::try_from(query)?;
    Ok(Json(state.service.list_menus(&filter).await?))
}

/// GET /api/v1/menus/{slug}
pub async fn get_menu(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Menu>, HttpError> {
    Ok(Json(state.service.get_menu(&slug).await?))
}

/// GET /api/v1/menus/{slug}/tree
pub async fn get_menu_tree(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<MenuTree>, HttpError> {
    Ok(Json(state.service.get_menu_tree(&slug).await?))
}

/// PATCH /api/v1/menus/{slug}
pub async fn update_menu(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(payload): Json<UpdateMenuRequest>,
) -> Result<Json<Menu>, HttpError> {
    payload.validate()?;

    let menu = state.service.update_menu(&slug, &payload.into()).await?;
    Ok(Json(menu))
}

/// DELETE /api/v1/menus/{slug}
pub async fn delete_menu(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<StatusCode, HttpError> {
    state.service.delete_menu(&slug).await?;
    Ok(StatusCode::OK)
}

/// POST /api/v1/menus/{slug}/save
pub async fn save_menu(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(payload): Json<SaveMenuRequest>,
) -> Result<Json<Menu>, HttpError> {
    Ok(Json(state.service.save_menu(&slug, payload.action).await?))
}
