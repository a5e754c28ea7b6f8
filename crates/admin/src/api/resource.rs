//! Generic CRUD service shared by every resource.

use std::fmt::Display;
use std::marker::PhantomData;

use pharmacy_admin_core::entities::{
    Admin, Category, CreateAdmin, CreateCategory, CreateCustomer, CreateStore, Customer, Product,
    ProductInput, Store, UpdateAdmin, UpdateCategory, UpdateCustomer, UpdateStore,
};
use pharmacy_admin_core::filters::{CategoryFilters, ListFilters, NoFilters, ProductFilters};
use pharmacy_admin_core::list::{ListQuery, Page};
use pharmacy_admin_core::manage::Record;
use pharmacy_admin_core::{AdminId, CategoryId, CustomerId, ProductId, StoreId};
use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::instrument;

use super::{ApiClient, ApiError, ApiToken, unwrap_data};

/// A backend resource: its path and the types that flow through it.
pub trait Resource: Send + Sync + 'static {
    /// Path segment under the API root, e.g. `product`.
    const PATH: &'static str;

    type Id: Copy + Display + Send + Sync;
    type Record: Record<Id = Self::Id> + DeserializeOwned + Send;
    type Create: Serialize + Sync;
    type Update: Serialize + Sync;
    type Filters: ListFilters + Sync;
}

/// Where a resource puts the id in its reset-password endpoint.
///
/// The backend is not uniform here, so each resource declares its shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetPasswordPath {
    /// `PATCH /reset-password/{id}`
    IdLast,
    /// `PATCH /{id}/reset-password`
    IdFirst,
}

impl ResetPasswordPath {
    #[must_use]
    pub fn segments(self, id: &str) -> [&str; 2] {
        match self {
            Self::IdLast => ["reset-password", id],
            Self::IdFirst => [id, "reset-password"],
        }
    }
}

/// Resources whose accounts can have their password reset.
pub trait PasswordReset: Resource {
    const RESET_PASSWORD: ResetPasswordPath;
}

#[derive(Debug, Clone, Copy)]
pub struct Admins;

#[derive(Debug, Clone, Copy)]
pub struct Categories;

#[derive(Debug, Clone, Copy)]
pub struct Customers;

#[derive(Debug, Clone, Copy)]
pub struct Products;

#[derive(Debug, Clone, Copy)]
pub struct Stores;

impl Resource for Admins {
    const PATH: &'static str = "admin";
    type Id = AdminId;
    type Record = Admin;
    type Create = CreateAdmin;
    type Update = UpdateAdmin;
    type Filters = NoFilters;
}

impl PasswordReset for Admins {
    const RESET_PASSWORD: ResetPasswordPath = ResetPasswordPath::IdLast;
}

impl Resource for Categories {
    const PATH: &'static str = "category";
    type Id = CategoryId;
    type Record = Category;
    type Create = CreateCategory;
    type Update = UpdateCategory;
    type Filters = CategoryFilters;
}

impl Resource for Customers {
    const PATH: &'static str = "customer";
    type Id = CustomerId;
    type Record = Customer;
    type Create = CreateCustomer;
    type Update = UpdateCustomer;
    type Filters = NoFilters;
}

impl PasswordReset for Customers {
    const RESET_PASSWORD: ResetPasswordPath = ResetPasswordPath::IdFirst;
}

impl Resource for Products {
    const PATH: &'static str = "product";
    type Id = ProductId;
    type Record = Product;
    type Create = ProductInput;
    type Update = ProductInput;
    type Filters = ProductFilters;
}

impl Resource for Stores {
    const PATH: &'static str = "store";
    type Id = StoreId;
    type Record = Store;
    type Create = CreateStore;
    type Update = UpdateStore;
    type Filters = NoFilters;
}

impl PasswordReset for Stores {
    const RESET_PASSWORD: ResetPasswordPath = ResetPasswordPath::IdFirst;
}

/// Calls for one resource, made on behalf of one session.
#[derive(Debug)]
pub struct ResourceService<'a, R> {
    client: &'a ApiClient,
    token: Option<&'a ApiToken>,
    _resource: PhantomData<R>,
}

impl<'a, R: Resource> ResourceService<'a, R> {
    pub(crate) const fn new(client: &'a ApiClient, token: Option<&'a ApiToken>) -> Self {
        Self {
            client,
            token,
            _resource: PhantomData,
        }
    }

    fn url(&self, tail: &[&str]) -> Result<url::Url, ApiError> {
        let mut segments = Vec::with_capacity(tail.len() + 1);
        segments.push(R::PATH);
        segments.extend_from_slice(tail);
        self.client.endpoint(&segments)
    }

    fn builder(&self, method: Method, tail: &[&str]) -> Result<reqwest::RequestBuilder, ApiError> {
        Ok(self.client.request(method, self.url(tail)?, self.token))
    }

    /// `GET /` with `page`, `limit`, `search` and the resource's filters.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failure, non-2xx status, or a body that
    /// is not a page of records.
    #[instrument(skip(self, query), fields(resource = R::PATH, page = query.page, search = %query.search))]
    pub async fn list(&self, query: &ListQuery<R::Filters>) -> Result<Page<R::Record>, ApiError> {
        let mut url = self.url(&[""])?;
        url.query_pairs_mut().extend_pairs(query.api_pairs());
        let builder = self.client.request(Method::GET, url, self.token);
        let body: serde_json::Value = self.client.send_json(builder).await?;
        serde_json::from_value(unwrap_data(body)?)
            .map_err(|e| ApiError::Parse(format!("Failed to parse {} page: {e}", R::PATH)))
    }

    /// `GET /{id}`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` for an unknown id, or any transport/parse
    /// failure.
    #[instrument(skip(self), fields(resource = R::PATH, id = %id))]
    pub async fn get(&self, id: R::Id) -> Result<R::Record, ApiError> {
        let id = id.to_string();
        let builder = self.builder(Method::GET, &[&id])?;
        let body: serde_json::Value = self.client.send_json(builder).await?;
        match unwrap_data(body)? {
            serde_json::Value::Null => Err(ApiError::NotFound(format!("{} {id}", R::PATH))),
            data => serde_json::from_value(data)
                .map_err(|e| ApiError::Parse(format!("Failed to parse {} {id}: {e}", R::PATH))),
        }
    }

    /// `POST /create`. Returns the created record when the API echoes it.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failure, non-2xx status, or a rejected
    /// envelope.
    #[instrument(skip(self, payload), fields(resource = R::PATH))]
    pub async fn create(&self, payload: &R::Create) -> Result<Option<R::Record>, ApiError> {
        let builder = self.builder(Method::POST, &["create"])?.json(payload);
        let body: serde_json::Value = self.client.send_json(builder).await?;
        Ok(echoed_record(unwrap_data(body)?))
    }

    /// `PUT /{id}` with a partial body. Returns the updated record when the
    /// API echoes it.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failure, non-2xx status, or a rejected
    /// envelope.
    #[instrument(skip(self, payload), fields(resource = R::PATH, id = %id))]
    pub async fn update(&self, id: R::Id, payload: &R::Update) -> Result<Option<R::Record>, ApiError> {
        let id = id.to_string();
        let builder = self.builder(Method::PUT, &[&id])?.json(payload);
        let body: serde_json::Value = self.client.send_json(builder).await?;
        Ok(echoed_record(unwrap_data(body)?))
    }

    /// `DELETE /{id}`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failure or non-2xx status.
    #[instrument(skip(self), fields(resource = R::PATH, id = %id))]
    pub async fn delete(&self, id: R::Id) -> Result<(), ApiError> {
        let id = id.to_string();
        let builder = self.builder(Method::DELETE, &[&id])?;
        self.client.send_empty(builder).await
    }

    /// `PATCH /status/{id}`: flip the record's status flag server-side.
    ///
    /// Not idempotent; each call flips the flag again.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failure or non-2xx status.
    #[instrument(skip(self), fields(resource = R::PATH, id = %id))]
    pub async fn toggle_status(&self, id: R::Id) -> Result<(), ApiError> {
        let id = id.to_string();
        let builder = self.builder(Method::PATCH, &["status", &id])?;
        self.client.send_empty(builder).await
    }
}

impl<R: PasswordReset> ResourceService<'_, R> {
    /// Reset the account's password to the backend default.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failure or non-2xx status.
    #[instrument(skip(self), fields(resource = R::PATH, id = %id))]
    pub async fn reset_password(&self, id: R::Id) -> Result<(), ApiError> {
        let id = id.to_string();
        let builder = self.builder(Method::PATCH, &R::RESET_PASSWORD.segments(&id))?;
        self.client.send_empty(builder).await
    }
}

fn echoed_record<T: DeserializeOwned>(data: serde_json::Value) -> Option<T> {
    if data.is_null() {
        return None;
    }
    match serde_json::from_value(data) {
        Ok(record) => Some(record),
        Err(e) => {
            tracing::debug!(error = %e, "Mutation response did not echo a record");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_password_shapes() {
        assert_eq!(Admins::RESET_PASSWORD.segments("4"), ["reset-password", "4"]);
        assert_eq!(Customers::RESET_PASSWORD.segments("4"), ["4", "reset-password"]);
        assert_eq!(Stores::RESET_PASSWORD.segments("4"), ["4", "reset-password"]);
    }

    #[test]
    fn test_resource_paths() {
        assert_eq!(
            [Admins::PATH, Categories::PATH, Customers::PATH, Products::PATH, Stores::PATH],
            ["admin", "category", "customer", "product", "store"]
        );
    }
}
