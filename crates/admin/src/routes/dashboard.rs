//! Dashboard route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use tower_sessions::Session;
use tracing::instrument;

use pharmacy_admin_core::list::ListQuery;

use crate::{
    api::{Admins, ApiError, Categories, Customers, Products, Resource, Stores},
    error::AppError,
    filters,
    middleware::auth::RequireAdminAuth,
    models::CurrentAdmin,
    state::AppState,
};

use super::Layout;

/// Admin user view for templates.
#[derive(Debug, Clone)]
pub struct AdminUserView {
    pub username: String,
    /// First letter for the avatar badge.
    pub initial: String,
}

impl From<&CurrentAdmin> for AdminUserView {
    fn from(admin: &CurrentAdmin) -> Self {
        Self {
            username: admin.username.clone(),
            initial: admin
                .username
                .chars()
                .next()
                .map(|c| c.to_uppercase().to_string())
                .unwrap_or_default(),
        }
    }
}

/// A summary card linking to a manage page.
#[derive(Debug, Clone)]
pub struct SummaryCard {
    pub label: &'static str,
    pub href: &'static str,
    /// Record count, or `None` when the API call failed.
    pub count: Option<u32>,
}

/// Dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub layout: Layout,
    pub cards: Vec<SummaryCard>,
}

/// Number of records of `R`, read from a one-row page's page count.
async fn count<R: Resource>(state: &AppState, admin: &CurrentAdmin) -> Result<Option<u32>, ApiError>
where
    R::Filters: Default,
{
    let query = ListQuery::new(1, 1, "", R::Filters::default());
    match state.api().resource::<R>(admin.token()).list(&query).await {
        Ok(page) => Ok(Some(page.total_pages)),
        Err(e) if e.is_unauthorized() => Err(e),
        Err(e) => {
            tracing::warn!(resource = R::PATH, error = %e, "Failed to count records");
            Ok(None)
        }
    }
}

/// Dashboard page handler.
#[instrument(skip(admin, state, session))]
pub async fn dashboard(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
) -> Result<DashboardTemplate, AppError> {
    let (admins, categories, customers, products, stores) = tokio::join!(
        count::<Admins>(&state, &admin),
        count::<Categories>(&state, &admin),
        count::<Customers>(&state, &admin),
        count::<Products>(&state, &admin),
        count::<Stores>(&state, &admin),
    );

    let cards = vec![
        SummaryCard {
            label: "Tài khoản",
            href: "/admins",
            count: admins?,
        },
        SummaryCard {
            label: "Danh mục",
            href: "/categories",
            count: categories?,
        },
        SummaryCard {
            label: "Khách hàng",
            href: "/customers",
            count: customers?,
        },
        SummaryCard {
            label: "Sản phẩm",
            href: "/products",
            count: products?,
        },
        SummaryCard {
            label: "Cửa hàng",
            href: "/stores",
            count: stores?,
        },
    ];

    Ok(DashboardTemplate {
        layout: Layout::new(&admin, &session, "/").await,
        cards,
    })
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;
    use crate::api::ApiToken;

    #[test]
    fn test_admin_user_view_initial() {
        let admin = CurrentAdmin {
            username: "linh".to_string(),
            token: ApiToken::new("t"),
            expires_at: Utc::now(),
            login_id: Uuid::new_v4(),
        };
        let view = AdminUserView::from(&admin);
        assert_eq!(view.username, "linh");
        assert_eq!(view.initial, "L");
    }
}
