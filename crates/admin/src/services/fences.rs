//! Per-login, per-table request fences.
//!
//! Each manage table fragment request takes a ticket from the fence of its
//! (login, table) pair. A handler whose ticket has been superseded by the
//! time the backend answers drops its response.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use uuid::Uuid;

use pharmacy_admin_core::fence::{Fence, FenceTicket};

/// Registry of fences, evicted after a period without requests.
#[derive(Clone)]
pub struct FenceRegistry {
    fences: Cache<(Uuid, &'static str), Arc<Fence>>,
}

impl FenceRegistry {
    #[must_use]
    pub fn new(idle: Duration) -> Self {
        let fences = Cache::builder()
            .max_capacity(10_000)
            .time_to_idle(idle)
            .build();
        Self { fences }
    }

    /// Fence for `table` within the login `login_id`.
    pub async fn fence(&self, login_id: Uuid, table: &'static str) -> Arc<Fence> {
        self.fences
            .get_with((login_id, table), async { Arc::new(Fence::new()) })
            .await
    }

    /// Issue a ticket, returning it with the fence it must be checked against.
    pub async fn issue(&self, login_id: Uuid, table: &'static str) -> (Arc<Fence>, FenceTicket) {
        let fence = self.fence(login_id, table).await;
        let ticket = fence.issue();
        (fence, ticket)
    }
}

impl std::fmt::Debug for FenceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FenceRegistry")
            .field("entries", &self.fences.entry_count())
            .finish()
    }
}
