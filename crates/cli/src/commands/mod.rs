//! Command implementations.

pub mod auth;
pub mod records;

use std::time::Duration;

use clap::{Args, ValueEnum};
use thiserror::Error;

use pharmacy_admin::api::{ApiClient, ApiError, ApiToken};
use pharmacy_admin::config::{ApiConfig, ConfigError};
use pharmacy_admin_core::filters::{CategoryFilters, CategorySet, ProductFilters, SalesFilter, SortBy};
use pharmacy_admin_core::list::ListQuery;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("No API token: pass --token or set PHARMACY_ADMIN_TOKEN")]
    MissingToken,

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Invalid --sort-by value: {0}")]
    InvalidSort(String),

    #[error("Failed to encode output: {0}")]
    Output(#[from] serde_json::Error),
}

/// Build the API client for `api_url`.
///
/// # Errors
///
/// Returns `CliError::Config` for a malformed URL.
pub fn client(api_url: &str) -> Result<ApiClient, CliError> {
    let config = ApiConfig::new(api_url, Duration::from_secs(30))?;
    Ok(ApiClient::new(&config)?)
}

/// The token every command except `login` needs.
///
/// # Errors
///
/// Returns `CliError::MissingToken` when none was given.
pub fn require_token(token: Option<&str>) -> Result<ApiToken, CliError> {
    token
        .filter(|t| !t.trim().is_empty())
        .map(|t| ApiToken::new(t.trim()))
        .ok_or(CliError::MissingToken)
}

/// Print `value` as pretty JSON on stdout.
///
/// # Errors
///
/// Returns `CliError::Output` if the value cannot be encoded.
#[allow(clippy::print_stdout)]
pub fn emit(value: &impl serde::Serialize) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ResourceKind {
    Admins,
    Categories,
    Customers,
    Products,
    Stores,
}

/// Accounts that support password reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PasswordAccount {
    Admin,
    Customer,
    Store,
}

/// Paging and filter flags of `list`.
///
/// Filters only apply to the resources that have them: `--is-sales` to
/// categories and products, the rest to products.
#[derive(Debug, Clone, Default, Args)]
pub struct ListArgs {
    #[arg(long, default_value_t = 1)]
    pub page: u32,

    #[arg(long, default_value_t = pharmacy_admin::config::DEFAULT_PAGE_SIZE)]
    pub limit: u32,

    #[arg(long, default_value = "")]
    pub search: String,

    /// `true` or `false`; omit for all
    #[arg(long)]
    pub is_sales: Option<bool>,

    /// Comma-separated category ids
    #[arg(long, default_value = "")]
    pub categories: String,

    /// `newest`, `price_asc`, `price_desc` or `best_selling`
    #[arg(long)]
    pub sort_by: Option<String>,
}

impl ListArgs {
    pub fn query<F: pharmacy_admin_core::filters::ListFilters>(&self, filters: F) -> ListQuery<F> {
        ListQuery::new(self.page, self.limit, self.search.trim(), filters)
    }

    #[must_use]
    pub const fn category_filters(&self) -> CategoryFilters {
        CategoryFilters {
            is_sales: SalesFilter::new(self.is_sales),
        }
    }

    /// # Errors
    ///
    /// Returns `CliError::InvalidSort` for an unknown ordering.
    pub fn product_filters(&self) -> Result<ProductFilters, CliError> {
        let sort_by = self
            .sort_by
            .as_deref()
            .map(|raw| raw.parse::<SortBy>().map_err(|_| CliError::InvalidSort(raw.to_string())))
            .transpose()?;

        Ok(ProductFilters {
            is_sales: SalesFilter::new(self.is_sales),
            categories: CategorySet::parse(&self.categories),
            sort_by,
        })
    }
}
