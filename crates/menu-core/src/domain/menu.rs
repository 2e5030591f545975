// ============================================================================
// Menu Core - Menu Entity
// File: crates/menu-core/src/domain/menu.rs
// Description: Named, sluggable container for one navigation tree
// ============================================================================

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

static SLUG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9-]+$").expect("slug pattern is a valid regex"));

/// Menu status enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum MenuStatus {
    #[default]
    Draft,
    Published,
}

impl MenuStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MenuStatus::Draft => "DRAFT",
            MenuStatus::Published => "PUBLISHED",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "DRAFT" => Some(MenuStatus::Draft),
            "PUBLISHED" => Some(MenuStatus::Published),
            _ => None,
        }
    }
}

/// Lifecycle action accepted by the save endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SaveAction {
    Publish,
    Save,
}

/// Checks a slug against `[a-z0-9-]+`.
pub fn validate_slug(slug: &str) -> Result<(), ValidationError> {
    if SLUG_PATTERN.is_match(slug) {
        Ok(())
    } else {
        Err(ValidationError::new("slug_pattern")
            .with_message("Slug may only contain lowercase letters, digits and '-'".into()))
    }
}

/// Menu entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Menu {
    pub id: Uuid,

    #[validate(length(min = 1, max = 100, message = "Menu name must be between 1 and 100 characters"))]
    pub name: String,

    #[validate(
        length(min = 1, max = 100, message = "Slug must be between 1 and 100 characters"),
        custom(function = "validate_slug")
    )]
    pub slug: String,

    pub status: MenuStatus,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Menu {
    pub fn new(name: String, slug: String) -> Result<Self, validator::ValidationErrors> {
        let now = Utc::now();
        let menu = Self {
            id: Uuid::new_v4(),
            name: name.trim().to_string(),
            slug: slug.trim().to_string(),
            status: MenuStatus::Draft,
            created_at: now,
            updated_at: now,
        };

        menu.validate()?;
        Ok(menu)
    }

    /// Title given to the root item created alongside the menu.
    pub fn root_title(&self) -> String {
        format!("{} {}", self.name, menu_shared::constants::ROOT_TITLE_SUFFIX)
    }

    pub fn rename(&mut self, name: &str) -> Result<(), validator::ValidationErrors> {
        self.name = name.trim().to_string();
        self.validate()?;
        self.touch();
        Ok(())
    }

    pub fn set_status(&mut self, status: MenuStatus) {
        self.status = status;
        self.touch();
    }

    pub fn publish(&mut self) {
        self.set_status(MenuStatus::Published);
    }

    /// Refreshes `updated_at` without changing content.
    pub fn touch(&mut self) {
        let now = Utc::now();
        // Keep updated_at monotonic even on coarse clocks
        self.updated_at = if now > self.updated_at {
            now
        } else {
            self.updated_at + chrono::Duration::microseconds(1)
        };
    }

    pub fn is_published(&self) -> bool {
        self.status == MenuStatus::Published
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_menu() {
        let menu = Menu::new("  Main ".to_string(), "main".to_string()).unwrap();
        assert_eq!(menu.name, "Main");
        assert_eq!(menu.status, MenuStatus::Draft);
        assert_eq!(menu.root_title(), "Main Root");
        assert_eq!(menu.created_at, menu.updated_at);
    }

    #[test]
    fn test_invalid_slug_rejected() {
        assert!(Menu::new("Main".to_string(), "Main Menu".to_string()).is_err());
        assert!(Menu::new("Main".to_string(), "main_menu".to_string()).is_err());
        assert!(Menu::new("Main".to_string(), "".to_string()).is_err());
        assert!(Menu::new("Main".to_string(), "main-menu-2".to_string()).is_ok());
    }

    #[test]
    fn test_empty_name_rejected() {
        assert!(Menu::new("   ".to_string(), "main".to_string()).is_err());
    }

    #[test]
    fn test_publish_and_touch() {
        let mut menu = Menu::new("Main".to_string(), "main".to_string()).unwrap();
        let before = menu.updated_at;
        menu.touch();
        assert!(menu.updated_at > before);
        assert!(!menu.is_published());

        menu.publish();
        assert!(menu.is_published());
    }

    #[test]
    fn test_status_round_trip_strings() {
        assert_eq!(MenuStatus::from_str("PUBLISHED"), Some(MenuStatus::Published));
        assert_eq!(MenuStatus::from_str("draft"), None);
        assert_eq!(MenuStatus::Draft.as_str(), "DRAFT");
    }
}
