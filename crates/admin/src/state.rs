//! Application state shared across handlers.

use std::sync::Arc;

use crate::api::{ApiClient, ApiError};
use crate::config::AdminConfig;
use crate::services::{CategoryOptions, FenceRegistry};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    api: ApiClient,
    category_options: CategoryOptions,
    fences: FenceRegistry,
}

impl AppState {
    /// Build state from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the API client cannot be built.
    pub fn new(config: AdminConfig) -> Result<Self, ApiError> {
        let api = ApiClient::new(&config.api)?;
        let fences = FenceRegistry::new(config.session_ttl);
        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                api,
                category_options: CategoryOptions::new(),
                fences,
            }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    #[must_use]
    pub fn category_options(&self) -> &CategoryOptions {
        &self.inner.category_options
    }

    #[must_use]
    pub fn fences(&self) -> &FenceRegistry {
        &self.inner.fences
    }

    /// Rows per manage table.
    #[must_use]
    pub fn page_size(&self) -> u32 {
        self.inner.config.page_size
    }
}
