//! Administrator account management.
//!
//! Accounts are edited inline in the table: the edit button swaps a row into
//! a form, save and cancel swap it back.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
    routing::{get, patch, post, put},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use pharmacy_admin_core::entities::{Admin, AdminDraft, CreateAdmin, UpdateAdmin};
use pharmacy_admin_core::filters::NoFilters;
use pharmacy_admin_core::list::ListParams;
use pharmacy_admin_core::manage::{Editable, ManageState};
use pharmacy_admin_core::AdminId;

use crate::{
    api::Admins,
    components::data_table::{admins_table_config, delete_confirm},
    components::toast::set_flash,
    components::{DataTableConfig, Fragment, PaginationView, SwitchView, Toast},
    error::AppError,
    filters,
    htmx,
    middleware::auth::RequireAdminAuth,
    state::AppState,
};

use super::manage::{self, StatusForm};
use super::{Layout, render};

const NOUN: &str = "tài khoản";

/// Event that makes the admins table refetch its current page.
pub const REFRESH_EVENT: &str = "admins-refresh";

/// Build the admins router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admins", get(index).post(create))
        .route("/admins/table", get(table))
        .route("/admins/new", get(new_page))
        .route("/admins/{id}", put(save).delete(remove))
        .route("/admins/{id}/row", get(row))
        .route("/admins/{id}/edit", get(edit))
        .route("/admins/{id}/status", patch(toggle))
        .route("/admins/{id}/reset-password", post(reset_password))
}

/// One table row.
#[derive(Debug, Clone)]
pub struct AdminRow {
    pub id: AdminId,
    pub username: String,
    pub fullname: String,
    pub switch: SwitchView,
    pub delete_confirm: String,
}

impl From<&Admin> for AdminRow {
    fn from(admin: &Admin) -> Self {
        let config = admins_table_config();
        Self {
            id: admin.id,
            username: admin.username.clone(),
            fullname: admin.fullname.clone(),
            switch: SwitchView::new(config.base_path, config.table_id, NOUN, admin.id, admin.is_active),
            delete_confirm: delete_confirm(NOUN, admin.id),
        }
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "admins/index.html")]
pub struct AdminsIndexTemplate {
    pub layout: Layout,
    pub config: DataTableConfig,
    pub search: String,
    pub rows: Vec<AdminRow>,
    pub pagination: PaginationView,
}

#[derive(Template)]
#[template(path = "admins/table.html")]
pub struct AdminsTableTemplate {
    pub config: DataTableConfig,
    pub rows: Vec<AdminRow>,
    pub pagination: PaginationView,
}

#[derive(Template)]
#[template(path = "admins/row.html")]
pub struct AdminRowTemplate {
    pub config: DataTableConfig,
    pub row: AdminRow,
}

#[derive(Template)]
#[template(path = "admins/edit_row.html")]
pub struct AdminEditRowTemplate {
    pub config: DataTableConfig,
    pub row: AdminRow,
    pub draft: AdminDraft,
}

#[derive(Template, WebTemplate)]
#[template(path = "admins/new.html")]
pub struct AdminNewTemplate {
    pub layout: Layout,
    pub form: AdminForm,
}

/// Body of `POST /admins`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdminForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub fullname: String,
    #[serde(default)]
    pub password: String,
}

impl From<&AdminForm> for CreateAdmin {
    fn from(form: &AdminForm) -> Self {
        let password = form.password.trim();
        Self {
            username: form.username.trim().to_string(),
            fullname: form.fullname.trim().to_string(),
            password: (!password.is_empty()).then(|| password.to_string()),
        }
    }
}

fn row_fragment(admin: &Admin) -> String {
    render(&AdminRowTemplate {
        config: admins_table_config(),
        row: AdminRow::from(admin),
    })
}

/// Manage page.
///
/// GET /admins
#[instrument(skip(admin, state, session))]
async fn index(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Query(params): Query<ListParams<NoFilters>>,
) -> Result<AdminsIndexTemplate, AppError> {
    let config = admins_table_config();
    let search = params.search.clone();
    let (loaded, error) = manage::load_page::<Admins, AdminDraft>(&state, &admin, &config, params).await?;

    let mut layout = Layout::new(&admin, &session, config.base_path).await;
    if let Some(toast) = error {
        layout = layout.with_toast(toast);
    }

    Ok(AdminsIndexTemplate {
        layout,
        search,
        rows: loaded.state.rows().iter().map(AdminRow::from).collect(),
        pagination: loaded.pagination,
        config,
    })
}

/// Table fragment.
///
/// GET /admins/table
#[instrument(skip(admin, state))]
async fn table(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Query(params): Query<ListParams<NoFilters>>,
) -> Result<Response, AppError> {
    let config = admins_table_config();
    manage::table_fragment::<Admins, AdminDraft, _>(&state, &admin, &config, params, |loaded| {
        AdminsTableTemplate {
            rows: loaded.state.rows().iter().map(AdminRow::from).collect(),
            pagination: loaded.pagination,
            config: admins_table_config(),
        }
    })
    .await
}

/// Create form.
///
/// GET /admins/new
async fn new_page(RequireAdminAuth(admin): RequireAdminAuth, session: Session) -> AdminNewTemplate {
    AdminNewTemplate {
        layout: Layout::new(&admin, &session, "/admins").await,
        form: AdminForm::default(),
    }
}

/// Create an account.
///
/// POST /admins
#[instrument(skip(admin, state, session, form), fields(username = %form.username))]
async fn create(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<AdminForm>,
) -> Result<Response, AppError> {
    let payload = CreateAdmin::from(&form);
    let message = if payload.is_complete() {
        match state.api().resource::<Admins>(admin.token()).create(&payload).await {
            Ok(_) => {
                tracing::info!("Admin account created");
                set_flash(&session, &Toast::success("Thêm tài khoản thành công!")).await;
                return Ok(Redirect::to("/admins").into_response());
            }
            Err(e) if e.is_unauthorized() => return Err(e.into()),
            Err(e) => {
                tracing::error!(error = %e, "Failed to create admin account");
                "Thêm tài khoản thất bại!"
            }
        }
    } else {
        "Vui lòng nhập đầy đủ thông tin!"
    };

    let layout = Layout::new(&admin, &session, "/admins")
        .await
        .with_toast(Toast::error(message));
    Ok(AdminNewTemplate { layout, form }.into_response())
}

/// View-mode row, used to cancel an edit.
///
/// GET /admins/{id}/row
#[instrument(skip(admin, state))]
async fn row(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<AdminId>,
) -> Result<Fragment, AppError> {
    match state.api().resource::<Admins>(admin.token()).get(id).await {
        Ok(record) => Ok(Fragment::new(row_fragment(&record))),
        Err(e) => manage::mutation_failure(e, "Không thể tải tài khoản!"),
    }
}

/// Edit-mode row.
///
/// GET /admins/{id}/edit
#[instrument(skip(admin, state))]
async fn edit(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<AdminId>,
) -> Result<Fragment, AppError> {
    let record = match state.api().resource::<Admins>(admin.token()).get(id).await {
        Ok(record) => record,
        Err(e) => return manage::mutation_failure(e, "Không thể tải tài khoản!"),
    };

    let draft = record.draft();
    Ok(Fragment::new(render(&AdminEditRowTemplate {
        config: admins_table_config(),
        row: AdminRow::from(&record),
        draft,
    })))
}

/// Save an inline edit and render the row in view mode.
///
/// PUT /admins/{id}
#[instrument(skip(admin, state, draft))]
async fn save(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<AdminId>,
    Form(draft): Form<AdminDraft>,
) -> Result<Fragment, AppError> {
    if draft.username.trim().is_empty() || draft.fullname.trim().is_empty() {
        return Ok(Fragment::failure("Vui lòng nhập đầy đủ thông tin!"));
    }

    let service = state.api().resource::<Admins>(admin.token());
    let record = match service.get(id).await {
        Ok(record) => record,
        Err(e) => return manage::mutation_failure(e, "Cập nhật thất bại!"),
    };
    if let Err(e) = service.update(id, &UpdateAdmin::from(&draft)).await {
        return manage::mutation_failure(e, "Cập nhật thất bại!");
    }
    tracing::info!("Admin account updated");

    let mut rows: ManageState<Admin, AdminDraft> = ManageState::from_rows(vec![record]);
    rows.begin_edit(id);
    rows.update_draft(draft);
    let Some(saved) = rows.commit_save() else {
        return Err(AppError::Internal(format!("admin {id} vanished during save")));
    };

    Ok(Fragment::new(row_fragment(saved)).with_toast(Toast::success("Cập nhật thành công!")))
}

/// PATCH /admins/{id}/status
#[instrument(skip(admin, state, form))]
async fn toggle(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<AdminId>,
    Form(form): Form<StatusForm>,
) -> Result<Fragment, AppError> {
    let config = admins_table_config();
    let switch = SwitchView::new(config.base_path, config.table_id, NOUN, id, form.current());
    manage::toggle_status::<Admins>(&state, &admin, id, switch, NOUN).await
}

/// Delete an account. The table refetches its page afterwards so the page
/// stays full.
///
/// DELETE /admins/{id}
#[instrument(skip(admin, state))]
async fn remove(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<AdminId>,
) -> Result<Fragment, AppError> {
    match state.api().resource::<Admins>(admin.token()).delete(id).await {
        Ok(()) => {
            tracing::info!("Admin account deleted");
            let (name, value) = htmx::trigger(REFRESH_EVENT);
            Ok(Fragment::empty()
                .with_toast(Toast::success(format!("Xóa {NOUN} thành công!")))
                .with_header(name, value))
        }
        Err(e) => manage::mutation_failure(e, &format!("Xóa {NOUN} thất bại!")),
    }
}

/// POST /admins/{id}/reset-password
#[instrument(skip(admin, state))]
async fn reset_password(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<AdminId>,
) -> Result<Fragment, AppError> {
    manage::reset_password::<Admins>(&state, &admin, id, "Mật khẩu đã được đặt lại!").await
}
