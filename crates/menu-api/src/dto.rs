//! Request DTOs

use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use menu_core::domain::{validate_slug, ItemType, MenuStatus, SaveAction};
use menu_core::repositories::MenuFilter;
use menu_core::services::{ItemChanges, MenuChanges, NewItem};

use crate::error::HttpError;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateMenuRequest {
    #[validate(length(min = 1, max = 100, message = "Menu name must be between 1 and 100 characters"))]
    pub name: String,

    #[validate(
        length(min = 1, max = 100, message = "Slug must be between 1 and 100 characters"),
        custom(function = "validate_slug")
    )]
    pub slug: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListMenusQuery {
    pub status: Option<String>,
    pub q: Option<String>,
}

impl TryFrom<ListMenusQuery> for MenuFilter {
    type Error = HttpError;

    fn try_from(query: ListMenusQuery) -> Result<Self, Self::Error> {
        let status = match query.status.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(
                MenuStatus::from_str(&raw.to_uppercase())
                    .ok_or_else(|| HttpError::bad_request(format!("Unknown status: {raw}")))?,
            ),
        };
        Ok(MenuFilter {
            status,
            query: query.q,
        })
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMenuRequest {
    #[validate(length(min = 1, max = 100, message = "Menu name must be between 1 and 100 characters"))]
    pub name: Option<String>,
    pub status: Option<MenuStatus>,
}

impl From<UpdateMenuRequest> for MenuChanges {
    fn from(req: UpdateMenuRequest) -> Self {
        MenuChanges {
            name: req.name,
            status: req.status,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SaveMenuRequest {
    pub action: SaveAction,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateItemRequest {
    pub parent_id: Option<Uuid>,

    #[validate(length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"))]
    pub title: String,

    #[validate(length(max = 2048))]
    pub url: Option<String>,

    #[serde(rename = "type")]
    pub item_type: Option<ItemType>,
}

impl From<CreateItemRequest> for NewItem {
    fn from(req: CreateItemRequest) -> Self {
        NewItem {
            parent_id: req.parent_id,
            title: req.title,
            url: req.url,
            item_type: req.item_type,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItemRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"))]
    pub title: Option<String>,

    #[validate(length(max = 2048))]
    pub url: Option<String>,

    #[serde(rename = "type")]
    pub item_type: Option<ItemType>,

    pub parent_id: Option<Uuid>,

    pub order: Option<i32>,
}

impl From<UpdateItemRequest> for ItemChanges {
    fn from(req: UpdateItemRequest) -> Self {
        ItemChanges {
            title: req.title,
            url: req.url,
            item_type: req.item_type,
            parent_id: req.parent_id,
            order: req.order,
        }
    }
}
