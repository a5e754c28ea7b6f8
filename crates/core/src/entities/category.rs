//! Product categories.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::manage::{Editable, Record, StatusFlag};
use crate::types::CategoryId;

/// A category as returned by `/category`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(default, deserialize_with = "super::null_as_empty")]
    pub description: String,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub is_sales: bool,
    #[serde(default, deserialize_with = "super::timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "super::timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Body of `POST /category/create`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateCategory {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Partial body of `PUT /category/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateCategory {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Inline-edit draft for a category row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryDraft {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl From<&CategoryDraft> for UpdateCategory {
    fn from(draft: &CategoryDraft) -> Self {
        Self {
            name: Some(draft.name.clone()),
            description: Some(draft.description.clone()),
        }
    }
}

impl Record for Category {
    type Id = CategoryId;

    fn id(&self) -> CategoryId {
        self.id
    }
}

impl StatusFlag for Category {
    fn flag(&self) -> bool {
        self.is_sales
    }

    fn set_flag(&mut self, value: bool) {
        self.is_sales = value;
    }
}

impl Editable for Category {
    type Draft = CategoryDraft;

    fn draft(&self) -> CategoryDraft {
        CategoryDraft {
            name: self.name.clone(),
            description: self.description.clone(),
        }
    }

    fn apply(&mut self, draft: &CategoryDraft) {
        self.name.clone_from(&draft.name);
        self.description.clone_from(&draft.description);
    }
}
