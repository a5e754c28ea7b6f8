//! Physical pharmacy stores.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::manage::{Record, StatusFlag};
use crate::types::StoreId;

/// A store as returned by `/store`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Store {
    pub id: StoreId,
    #[serde(default, deserialize_with = "super::null_as_empty")]
    pub username: String,
    pub name: String,
    #[serde(default, deserialize_with = "super::null_as_empty")]
    pub phonenumber: String,
    #[serde(default, deserialize_with = "super::null_as_empty")]
    pub address: String,
    #[serde(default, deserialize_with = "super::null_as_empty")]
    pub ward: String,
    #[serde(default, deserialize_with = "super::null_as_empty")]
    pub district: String,
    #[serde(default, deserialize_with = "super::null_as_empty")]
    pub city: String,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub is_active: bool,
    #[serde(default, deserialize_with = "super::timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "super::timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Body of `POST /store/create`. The password is write-only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateStore {
    pub username: String,
    pub password: String,
    pub name: String,
    #[serde(default)]
    pub phonenumber: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub ward: String,
    #[serde(default)]
    pub district: String,
    #[serde(default)]
    pub city: String,
}

impl CreateStore {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        [&self.username, &self.password, &self.name]
            .iter()
            .all(|field| !field.trim().is_empty())
    }
}

/// Body of `PUT /store/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateStore {
    pub name: String,
    #[serde(default)]
    pub phonenumber: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub ward: String,
    #[serde(default)]
    pub district: String,
    #[serde(default)]
    pub city: String,
}

impl From<&Store> for UpdateStore {
    fn from(store: &Store) -> Self {
        Self {
            name: store.name.clone(),
            phonenumber: store.phonenumber.clone(),
            address: store.address.clone(),
            ward: store.ward.clone(),
            district: store.district.clone(),
            city: store.city.clone(),
        }
    }
}

impl Record for Store {
    type Id = StoreId;

    fn id(&self) -> StoreId {
        self.id
    }
}

impl StatusFlag for Store {
    fn flag(&self) -> bool {
        self.is_active
    }

    fn set_flag(&mut self, value: bool) {
        self.is_active = value;
    }
}
