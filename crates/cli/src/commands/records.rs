//! Record commands: list, get, status, reset-password, delete.
//!
//! Each command picks the typed resource for its [`ResourceKind`] and runs
//! the same generic call the dashboard makes.

use serde::Serialize;
use serde_json::json;

use pharmacy_admin::api::{
    Admins, ApiClient, ApiToken, Categories, Customers, PasswordReset, Products, Resource, Stores,
};
use pharmacy_admin_core::filters::NoFilters;
use pharmacy_admin_core::list::ListQuery;

use super::{CliError, ListArgs, PasswordAccount, ResourceKind, emit};

/// Print one page of records with its page count.
///
/// # Errors
///
/// Returns `CliError` on API failure or an invalid filter flag.
pub async fn list(
    client: &ApiClient,
    token: ApiToken,
    resource: ResourceKind,
    args: &ListArgs,
) -> Result<(), CliError> {
    match resource {
        ResourceKind::Admins => list_page::<Admins>(client, &token, args.query(NoFilters {})).await,
        ResourceKind::Categories => {
            list_page::<Categories>(client, &token, args.query(args.category_filters())).await
        }
        ResourceKind::Customers => {
            list_page::<Customers>(client, &token, args.query(NoFilters {})).await
        }
        ResourceKind::Products => {
            list_page::<Products>(client, &token, args.query(args.product_filters()?)).await
        }
        ResourceKind::Stores => list_page::<Stores>(client, &token, args.query(NoFilters {})).await,
    }
}

async fn list_page<R>(client: &ApiClient, token: &ApiToken, query: ListQuery<R::Filters>) -> Result<(), CliError>
where
    R: Resource,
    R::Record: Serialize,
{
    let page = client.resource::<R>(Some(token)).list(&query).await?;
    tracing::info!(resource = R::PATH, rows = page.data.len(), "Listed page {}", query.page);
    emit(&json!({
        "page": query.page,
        "totalPages": page.total_pages,
        "data": page.data,
    }))
}

/// Print one record.
///
/// # Errors
///
/// Returns `CliError::Api` for an unknown id or API failure.
pub async fn get(client: &ApiClient, token: ApiToken, resource: ResourceKind, id: i32) -> Result<(), CliError> {
    match resource {
        ResourceKind::Admins => get_one::<Admins>(client, &token, id).await,
        ResourceKind::Categories => get_one::<Categories>(client, &token, id).await,
        ResourceKind::Customers => get_one::<Customers>(client, &token, id).await,
        ResourceKind::Products => get_one::<Products>(client, &token, id).await,
        ResourceKind::Stores => get_one::<Stores>(client, &token, id).await,
    }
}

async fn get_one<R>(client: &ApiClient, token: &ApiToken, id: i32) -> Result<(), CliError>
where
    R: Resource,
    R::Id: From<i32>,
    R::Record: Serialize,
{
    let record = client.resource::<R>(Some(token)).get(R::Id::from(id)).await?;
    emit(&record)
}

/// Flip a record's status flag.
///
/// # Errors
///
/// Returns `CliError::Api` on API failure.
pub async fn toggle_status(
    client: &ApiClient,
    token: ApiToken,
    resource: ResourceKind,
    id: i32,
) -> Result<(), CliError> {
    match resource {
        ResourceKind::Admins => toggle::<Admins>(client, &token, id).await,
        ResourceKind::Categories => toggle::<Categories>(client, &token, id).await,
        ResourceKind::Customers => toggle::<Customers>(client, &token, id).await,
        ResourceKind::Products => toggle::<Products>(client, &token, id).await,
        ResourceKind::Stores => toggle::<Stores>(client, &token, id).await,
    }
}

async fn toggle<R>(client: &ApiClient, token: &ApiToken, id: i32) -> Result<(), CliError>
where
    R: Resource,
    R::Id: From<i32>,
{
    client.resource::<R>(Some(token)).toggle_status(R::Id::from(id)).await?;
    tracing::info!(resource = R::PATH, id, "Status toggled");
    emit(&json!({ "resource": R::PATH, "id": id, "status": "toggled" }))
}

/// Reset an account password.
///
/// # Errors
///
/// Returns `CliError::Api` on API failure.
pub async fn reset_password(
    client: &ApiClient,
    token: ApiToken,
    account: PasswordAccount,
    id: i32,
) -> Result<(), CliError> {
    match account {
        PasswordAccount::Admin => reset::<Admins>(client, &token, id).await,
        PasswordAccount::Customer => reset::<Customers>(client, &token, id).await,
        PasswordAccount::Store => reset::<Stores>(client, &token, id).await,
    }
}

async fn reset<R>(client: &ApiClient, token: &ApiToken, id: i32) -> Result<(), CliError>
where
    R: PasswordReset,
    R::Id: From<i32>,
{
    client.resource::<R>(Some(token)).reset_password(R::Id::from(id)).await?;
    tracing::info!(resource = R::PATH, id, "Password reset");
    emit(&json!({ "resource": R::PATH, "id": id, "status": "password_reset" }))
}

/// Delete a record.
///
/// # Errors
///
/// Returns `CliError::Api` on API failure.
pub async fn delete(client: &ApiClient, token: ApiToken, resource: ResourceKind, id: i32) -> Result<(), CliError> {
    match resource {
        ResourceKind::Admins => remove::<Admins>(client, &token, id).await,
        ResourceKind::Categories => remove::<Categories>(client, &token, id).await,
        ResourceKind::Customers => remove::<Customers>(client, &token, id).await,
        ResourceKind::Products => remove::<Products>(client, &token, id).await,
        ResourceKind::Stores => remove::<Stores>(client, &token, id).await,
    }
}

async fn remove<R>(client: &ApiClient, token: &ApiToken, id: i32) -> Result<(), CliError>
where
    R: Resource,
    R::Id: From<i32>,
{
    client.resource::<R>(Some(token)).delete(R::Id::from(id)).await?;
    tracing::info!(resource = R::PATH, id, "Deleted");
    emit(&json!({ "resource": R::PATH, "id": id, "status": "deleted" }))
}
