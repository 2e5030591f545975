//! Menu item HTTP handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use menu_core::domain::MenuItem;

use crate::dto::{CreateItemRequest, UpdateItemRequest};
use crate::error::HttpError;
use crate::state::AppState;

/// POST /api/v1/menus/{slug}/items - appends as the last child
pub async fn add_item(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(payload): Json<CreateItemRequest>,
) -> Result<(StatusCode, Json<MenuItem>), HttpError> {
    payload.validate()?;

    let item = state.service.add_item(&slug, &payload.into()).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// PATCH /api/v1/menus/{slug}/items/{item_id}
pub async fn update_item(
    State(state): State<AppState>,
    Path((slug, item_id)): Path<(String, Uuid)>,
    Json(payload): Json<UpdateItemRequest>,
) -> Result<Json<MenuItem>, HttpError> {
    payload.validate()?;

    let item = state
        .service
        .update_item(&slug, item_id, &payload.into())
        .await?;
    Ok(Json(item))
}

/// DELETE /api/v1/menus/{slug}/items/{item_id}
pub async fn delete_item(
    State(state): State<AppState>,
    Path((slug, item_id)): Path<(String, Uuid)>,
) -> Result<StatusCode, HttpError> {
    state.service.delete_item(&slug, item_id).await?;
    Ok(StatusCode::OK)
}
