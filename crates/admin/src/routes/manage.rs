//! Handlers shared by every manage page.
//!
//! A manage page is a filter form over a paged table. The table is re-rendered
//! as an HTMX fragment whenever the page, search or filters change; rows are
//! toggled, deleted and reset in place.

use askama::Template;
use axum::{
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use pharmacy_admin_core::filters::ListFilters;
use pharmacy_admin_core::list::{ListParams, ListQuery};
use pharmacy_admin_core::manage::ManageState;

use crate::api::{ApiError, PasswordReset, Resource};
use crate::components::pagination::query_string;
use crate::components::{DataTableConfig, Fragment, PaginationView, SwitchView, Toast};
use crate::error::AppError;
use crate::htmx::HX_PUSH_URL;
use crate::models::CurrentAdmin;
use crate::state::AppState;

use super::render;

const LIST_FAILED: &str = "Không thể tải danh sách!";

/// Body of `PATCH /{res}/{id}/status`: the flag as currently displayed.
#[derive(Debug, Default, Deserialize)]
pub struct StatusForm {
    #[serde(default)]
    pub current: String,
}

impl StatusForm {
    #[must_use]
    pub fn current(&self) -> bool {
        self.current == "true"
    }
}

/// A template that renders a status switch on its own.
#[derive(Template)]
#[template(
    source = r#"{% import "partials/ui.html" as ui %}{% call ui::status_switch(switch) %}{% endcall %}"#,
    ext = "html"
)]
pub struct SwitchTemplate {
    pub switch: SwitchView,
}

/// One fetched page of a table together with the query that produced it.
pub struct LoadedTable<R: pharmacy_admin_core::manage::Record, D, F> {
    pub state: ManageState<R, D>,
    pub query: ListQuery<F>,
    pub pagination: PaginationView,
}

impl<R: pharmacy_admin_core::manage::Record, D, F: ListFilters> LoadedTable<R, D, F> {
    /// An empty table for `query`, shown when the list could not be loaded.
    #[must_use]
    pub fn empty(config: &DataTableConfig, query: ListQuery<F>) -> Self {
        let state = ManageState::new();
        let pagination = PaginationView::new(config.base_path, &query, &state.window());
        Self {
            state,
            query,
            pagination,
        }
    }
}

/// How a table load treats other requests for the same login and table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fencing {
    /// Drop this response if a newer request was issued while it was in flight.
    DropSuperseded,
    /// Take a ticket, so older in-flight fragments lose, but always keep this
    /// response. Used by full pages, which have no previous table to keep.
    Keep,
}

/// Fetch one page for `admin`, fenced per login and table.
///
/// Returns `Ok(None)` when `fencing` is [`Fencing::DropSuperseded`] and a
/// newer request for the same table was issued while this one was in flight.
///
/// # Errors
///
/// Returns the API error if the list call fails.
pub async fn load_table<R: Resource, D>(
    state: &AppState,
    admin: &CurrentAdmin,
    config: &DataTableConfig,
    query: ListQuery<R::Filters>,
    fencing: Fencing,
) -> Result<Option<LoadedTable<R::Record, D, R::Filters>>, ApiError> {
    let (fence, ticket) = state.fences().issue(admin.login_id, config.table_id).await;

    let page = state.api().resource::<R>(admin.token()).list(&query).await?;

    let mut manage = ManageState::new();
    match fencing {
        Fencing::Keep => manage.replace(query.page, page),
        Fencing::DropSuperseded => {
            if !manage.commit(&fence, ticket, query.page, page) {
                tracing::debug!(
                    table = config.table_id,
                    ticket = ticket.sequence(),
                    "Dropping superseded table response"
                );
                return Ok(None);
            }
        }
    }

    let pagination = PaginationView::new(config.base_path, &query, &manage.window());
    Ok(Some(LoadedTable {
        state: manage,
        query,
        pagination,
    }))
}

/// Load the table for a full manage page.
///
/// A failed list renders an empty table plus an error toast; only a rejected
/// token is an error.
///
/// # Errors
///
/// Returns `AppError` when the API rejects the session.
pub async fn load_page<R: Resource, D>(
    state: &AppState,
    admin: &CurrentAdmin,
    config: &DataTableConfig,
    params: ListParams<R::Filters>,
) -> Result<(LoadedTable<R::Record, D, R::Filters>, Option<Toast>), AppError>
where
    R::Filters: Clone,
{
    let query = params.into_query(state.page_size());
    match load_table::<R, D>(state, admin, config, query.clone(), Fencing::Keep).await {
        Ok(Some(loaded)) => Ok((loaded, None)),
        Ok(None) => {
            tracing::warn!(table = config.table_id, "Unfenced page load reported as superseded");
            Ok((LoadedTable::empty(config, query), None))
        }
        Err(e) if e.is_unauthorized() => Err(e.into()),
        Err(e) => {
            tracing::error!(table = config.table_id, error = %e, "Failed to load table");
            Ok((LoadedTable::empty(config, query), Some(Toast::error(LIST_FAILED))))
        }
    }
}

/// Answer a table fragment request.
///
/// Superseded requests get `204 No Content`, which HTMX does not swap. The
/// address bar follows the committed page via `HX-Push-Url`.
///
/// # Errors
///
/// Returns `AppError` when the API rejects the session.
pub async fn table_fragment<R, D, T>(
    state: &AppState,
    admin: &CurrentAdmin,
    config: &DataTableConfig,
    params: ListParams<R::Filters>,
    build: impl FnOnce(LoadedTable<R::Record, D, R::Filters>) -> T,
) -> Result<Response, AppError>
where
    R: Resource,
    T: Template,
{
    let query = params.into_query(state.page_size());
    let loaded = match load_table::<R, D>(state, admin, config, query, Fencing::DropSuperseded).await {
        Ok(Some(loaded)) => loaded,
        Ok(None) => return Ok(StatusCode::NO_CONTENT.into_response()),
        Err(e) => return mutation_failure(e, LIST_FAILED).map(IntoResponse::into_response),
    };

    let page_url = format!(
        "{}?{}",
        config.base_path,
        query_string(&loaded.query.form_pairs(loaded.state.page()))
    );
    let html = render(&build(loaded));

    let mut fragment = Fragment::new(html);
    if let Ok(value) = HeaderValue::from_str(&page_url) {
        fragment = fragment.with_header(HX_PUSH_URL, value);
    }
    Ok(fragment.into_response())
}

/// Turn a failed API call into an error toast that leaves the DOM alone.
///
/// A rejected token is propagated instead, which ends the session.
///
/// # Errors
///
/// Returns `AppError::Api` when the API rejected the session's token.
pub fn mutation_failure(err: ApiError, message: &str) -> Result<Fragment, AppError> {
    if err.is_unauthorized() {
        return Err(err.into());
    }
    tracing::error!(error = %err, "{message}");
    Ok(Fragment::failure(message))
}

/// `PATCH /status/{id}` and render the flipped switch.
///
/// `noun` names the entity in the toast, e.g. `sản phẩm`.
///
/// # Errors
///
/// Returns `AppError` when the API rejects the session.
pub async fn toggle_status<R: Resource>(
    state: &AppState,
    admin: &CurrentAdmin,
    id: R::Id,
    switch: SwitchView,
    noun: &str,
) -> Result<Fragment, AppError> {
    match state.api().resource::<R>(admin.token()).toggle_status(id).await {
        Ok(()) => {
            tracing::info!(resource = R::PATH, id = %id, "Status toggled");
            let flipped = SwitchTemplate {
                switch: switch.flipped(),
            };
            Ok(Fragment::new(render(&flipped))
                .with_toast(Toast::success(format!("Đã thay đổi trạng thái {noun}!"))))
        }
        Err(e) => mutation_failure(e, "Thay đổi trạng thái thất bại!"),
    }
}

/// `DELETE /{id}`. The row is swapped out with an empty body.
///
/// `noun` names the entity in the toast, e.g. `sản phẩm`.
///
/// # Errors
///
/// Returns `AppError` when the API rejects the session.
pub async fn delete<R: Resource>(
    state: &AppState,
    admin: &CurrentAdmin,
    id: R::Id,
    noun: &str,
) -> Result<Fragment, AppError> {
    match state.api().resource::<R>(admin.token()).delete(id).await {
        Ok(()) => {
            tracing::info!(resource = R::PATH, id = %id, "Record deleted");
            Ok(Fragment::empty().with_toast(Toast::success(format!("Xóa {noun} thành công!"))))
        }
        Err(e) => mutation_failure(e, &format!("Xóa {noun} thất bại!")),
    }
}

/// Reset a password and report the outcome as a toast.
///
/// # Errors
///
/// Returns `AppError` when the API rejects the session.
pub async fn reset_password<R: PasswordReset>(
    state: &AppState,
    admin: &CurrentAdmin,
    id: R::Id,
    success: &str,
) -> Result<Fragment, AppError> {
    match state.api().resource::<R>(admin.token()).reset_password(id).await {
        Ok(()) => {
            tracing::info!(resource = R::PATH, id = %id, "Password reset");
            Ok(Fragment::notice(success))
        }
        Err(e) => mutation_failure(e, "Đặt lại mật khẩu thất bại!"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_form_current() {
        assert!(StatusForm { current: "true".into() }.current());
        assert!(!StatusForm { current: "false".into() }.current());
        assert!(!StatusForm::default().current());
    }

    #[test]
    fn test_unauthorized_failure_propagates() {
        let result = mutation_failure(ApiError::Unauthorized, "Xóa sản phẩm thất bại!");
        assert!(matches!(result, Err(AppError::Api(ApiError::Unauthorized))));
    }

    #[test]
    fn test_other_failure_is_a_toast() {
        let err = ApiError::Status {
            status: 500,
            message: "boom".into(),
        };
        assert!(mutation_failure(err, "Cập nhật thất bại!").is_ok());
    }

    #[test]
    fn test_switch_template_renders_flipped_state() {
        let switch = SwitchView::new("/categories", "categories", "danh mục", 4, false).flipped();
        let html = render(&SwitchTemplate { switch });
        assert!(html.contains(r#"hx-patch="/categories/4/status""#));
        assert!(html.contains("switch-on"));
    }
}
