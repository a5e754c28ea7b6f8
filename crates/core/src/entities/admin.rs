//! Dashboard administrator accounts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::manage::{Editable, Record, StatusFlag};
use crate::types::AdminId;

/// An administrator account as returned by `/admin`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Admin {
    pub id: AdminId,
    pub username: String,
    #[serde(default, deserialize_with = "super::null_as_empty")]
    pub fullname: String,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub is_active: bool,
    #[serde(default, deserialize_with = "super::timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "super::timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Body of `POST /admin/create`.
///
/// The password is optional; the backend assigns a default when it is absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateAdmin {
    pub username: String,
    pub fullname: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl CreateAdmin {
    /// Username and full name are both required.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.username.trim().is_empty() && !self.fullname.trim().is_empty()
    }
}

/// Partial body of `PUT /admin/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateAdmin {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fullname: Option<String>,
}

/// Inline-edit draft for an admin row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminDraft {
    pub username: String,
    pub fullname: String,
}

impl From<&AdminDraft> for UpdateAdmin {
    fn from(draft: &AdminDraft) -> Self {
        Self {
            username: Some(draft.username.clone()),
            fullname: Some(draft.fullname.clone()),
        }
    }
}

impl Record for Admin {
    type Id = AdminId;

    fn id(&self) -> AdminId {
        self.id
    }
}

impl StatusFlag for Admin {
    fn flag(&self) -> bool {
        self.is_active
    }

    fn set_flag(&mut self, value: bool) {
        self.is_active = value;
    }
}

impl Editable for Admin {
    type Draft = AdminDraft;

    fn draft(&self) -> AdminDraft {
        AdminDraft {
            username: self.username.clone(),
            fullname: self.fullname.clone(),
        }
    }

    fn apply(&mut self, draft: &AdminDraft) {
        self.username.clone_from(&draft.username);
        self.fullname.clone_from(&draft.fullname);
    }
}
