//! Category options for the product filters and product form.
//!
//! Options are fetched per `isSales` value and cached for 60 seconds, so a
//! product search that re-renders the filter bar does not refetch them.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use tracing::instrument;

use pharmacy_admin_core::entities::Category;
use pharmacy_admin_core::filters::{CategoryFilters, SalesFilter};
use pharmacy_admin_core::list::ListQuery;

use crate::api::{ApiClient, ApiError, ApiToken, Categories};

/// Time an option list stays cached.
pub const OPTIONS_TTL: Duration = Duration::from_secs(60);

/// Number of categories offered in a picker.
pub const OPTIONS_LIMIT: u32 = 100;

/// Cache of category option lists keyed by sales filter.
#[derive(Clone)]
pub struct CategoryOptions {
    cache: Cache<SalesFilter, Arc<Vec<Category>>>,
}

impl CategoryOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::with_ttl(OPTIONS_TTL)
    }

    #[must_use]
    pub fn with_ttl(ttl: Duration) -> Self {
        let cache = Cache::builder().max_capacity(8).time_to_live(ttl).build();
        Self { cache }
    }

    /// Categories matching `is_sales`, from cache or the API.
    ///
    /// Failed fetches are not cached.
    ///
    /// # Errors
    ///
    /// Returns the API error if the list call fails.
    #[instrument(skip(self, api, token))]
    pub async fn get(
        &self,
        api: &ApiClient,
        token: Option<&ApiToken>,
        is_sales: SalesFilter,
    ) -> Result<Arc<Vec<Category>>, Arc<ApiError>> {
        self.cache
            .try_get_with(is_sales, async move {
                let query = ListQuery::new(1, OPTIONS_LIMIT, "", CategoryFilters { is_sales });
                let page = api.resource::<Categories>(token).list(&query).await?;
                tracing::debug!(count = page.data.len(), "Fetched category options");
                Ok::<_, ApiError>(Arc::new(page.data))
            })
            .await
    }

    /// Drop every cached list, after a category is created, edited or toggled.
    pub fn invalidate(&self) {
        self.cache.invalidate_all();
    }
}

impl Default for CategoryOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CategoryOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CategoryOptions").finish_non_exhaustive()
    }
}
