//! Item model and request payloads.
//!
//! [`Item`] is the only persisted record. Writes go through [`ItemInput`],
//! which must be validated into a [`NewItem`] before any store sees it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ItemError, ItemResult};

/// Maximum title length in characters, matching the `VARCHAR(255)` column.
pub const MAX_TITLE_CHARS: usize = 255;

/// A stored item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of a create or update request.
///
/// Both fields are optional on the wire. A missing field is treated as an
/// empty string, so an update without `description` clears it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ItemInput {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl ItemInput {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            description: Some(description.into()),
        }
    }

    /// Checks the payload and produces the values a store will write.
    ///
    /// Fails with [`ItemError::InvalidInput`] when the title is missing,
    /// blank, or longer than [`MAX_TITLE_CHARS`].
    pub fn validate(self) -> ItemResult<NewItem> {
        let title = self.title.unwrap_or_default();
        if title.trim().is_empty() {
            return Err(ItemError::invalid("Title is required"));
        }
        if title.chars().count() > MAX_TITLE_CHARS {
            return Err(ItemError::invalid(format!(
                "Title must be at most {} characters",
                MAX_TITLE_CHARS
            )));
        }

        Ok(NewItem {
            title,
            description: self.description.unwrap_or_default(),
        })
    }
}

/// Validated title and description, ready to be inserted or written over an
/// existing item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewItem {
    pub title: String,
    pub description: String,
}

/// Confirmation returned by a successful delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteConfirmation {
    pub message: String,
}

impl DeleteConfirmation {
    pub fn deleted() -> Self {
        Self {
            message: "Item deleted successfully".to_string(),
        }
    }
}
