//! Pharmacy store accounts.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
    routing::{get, patch, post},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use pharmacy_admin_core::StoreId;
use pharmacy_admin_core::entities::{CreateStore, Store, UpdateStore};
use pharmacy_admin_core::filters::NoFilters;
use pharmacy_admin_core::list::ListParams;

use crate::{
    api::Stores,
    components::data_table::{delete_confirm, stores_table_config},
    components::toast::set_flash,
    components::{DataTableConfig, Fragment, PaginationView, SwitchView, Toast},
    error::AppError,
    filters,
    middleware::auth::RequireAdminAuth,
    models::CurrentAdmin,
    state::AppState,
};

use super::Layout;
use super::manage::{self, StatusForm};

const NOUN: &str = "cửa hàng";

/// Build the stores router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/stores", get(index).post(create))
        .route("/stores/table", get(table))
        .route("/stores/new", get(new_page))
        .route("/stores/{id}", get(edit_page).post(update).delete(remove))
        .route("/stores/{id}/status", patch(toggle))
        .route("/stores/{id}/reset-password", post(reset_password))
}

/// One table row.
#[derive(Debug, Clone)]
pub struct StoreRow {
    pub id: StoreId,
    pub name: String,
    pub username: String,
    pub phonenumber: String,
    pub address: String,
    pub switch: SwitchView,
    pub delete_confirm: String,
    pub reset_confirm: String,
}

impl From<&Store> for StoreRow {
    fn from(store: &Store) -> Self {
        let config = stores_table_config();
        Self {
            id: store.id,
            name: store.name.clone(),
            username: store.username.clone(),
            phonenumber: store.phonenumber.clone(),
            address: [&store.address, &store.ward, &store.district, &store.city]
                .iter()
                .map(|part| part.trim())
                .filter(|part| !part.is_empty())
                .collect::<Vec<_>>()
                .join(", "),
            switch: SwitchView::new(config.base_path, config.table_id, NOUN, store.id, store.is_active),
            delete_confirm: delete_confirm(NOUN, store.id),
            reset_confirm: format!("Bạn có muốn đặt lại mật khẩu cho cửa hàng #{}?", store.id),
        }
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "stores/index.html")]
pub struct StoresIndexTemplate {
    pub layout: Layout,
    pub config: DataTableConfig,
    pub search: String,
    pub rows: Vec<StoreRow>,
    pub pagination: PaginationView,
}

#[derive(Template)]
#[template(path = "stores/table.html")]
pub struct StoresTableTemplate {
    pub config: DataTableConfig,
    pub rows: Vec<StoreRow>,
    pub pagination: PaginationView,
}

#[derive(Template, WebTemplate)]
#[template(path = "stores/form.html")]
pub struct StoreFormTemplate {
    pub layout: Layout,
    pub title: String,
    pub action: String,
    /// Account fields are only editable when creating.
    pub creating: bool,
    pub form: StoreForm,
}

/// The store form. `username` and `password` are ignored on update.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StoreForm {
    pub username: String,
    pub password: String,
    pub name: String,
    pub phonenumber: String,
    pub address: String,
    pub ward: String,
    pub district: String,
    pub city: String,
}

impl From<&StoreForm> for CreateStore {
    fn from(form: &StoreForm) -> Self {
        Self {
            username: form.username.trim().to_string(),
            password: form.password.clone(),
            name: form.name.trim().to_string(),
            phonenumber: form.phonenumber.trim().to_string(),
            address: form.address.trim().to_string(),
            ward: form.ward.trim().to_string(),
            district: form.district.trim().to_string(),
            city: form.city.trim().to_string(),
        }
    }
}

impl From<&StoreForm> for UpdateStore {
    fn from(form: &StoreForm) -> Self {
        Self {
            name: form.name.trim().to_string(),
            phonenumber: form.phonenumber.trim().to_string(),
            address: form.address.trim().to_string(),
            ward: form.ward.trim().to_string(),
            district: form.district.trim().to_string(),
            city: form.city.trim().to_string(),
        }
    }
}

impl From<&Store> for StoreForm {
    fn from(store: &Store) -> Self {
        Self {
            username: store.username.clone(),
            password: String::new(),
            name: store.name.clone(),
            phonenumber: store.phonenumber.clone(),
            address: store.address.clone(),
            ward: store.ward.clone(),
            district: store.district.clone(),
            city: store.city.clone(),
        }
    }
}

async fn form_page(
    admin: &CurrentAdmin,
    session: &Session,
    target: Option<StoreId>,
    form: StoreForm,
) -> StoreFormTemplate {
    let (title, action) = match target {
        Some(id) => (format!("Cập nhật cửa hàng #{id}"), format!("/stores/{id}")),
        None => ("Thêm cửa hàng".to_string(), "/stores".to_string()),
    };
    StoreFormTemplate {
        layout: Layout::new(admin, session, "/stores").await,
        title,
        action,
        creating: target.is_none(),
        form,
    }
}

/// Manage page.
///
/// GET /stores
#[instrument(skip(admin, state, session))]
async fn index(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Query(params): Query<ListParams<NoFilters>>,
) -> Result<StoresIndexTemplate, AppError> {
    let config = stores_table_config();
    let search = params.search.clone();
    let (loaded, error) = manage::load_page::<Stores, ()>(&state, &admin, &config, params).await?;

    let mut layout = Layout::new(&admin, &session, config.base_path).await;
    if let Some(toast) = error {
        layout = layout.with_toast(toast);
    }

    Ok(StoresIndexTemplate {
        layout,
        search,
        rows: loaded.state.rows().iter().map(StoreRow::from).collect(),
        pagination: loaded.pagination,
        config,
    })
}

/// Table fragment.
///
/// GET /stores/table
#[instrument(skip(admin, state))]
async fn table(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Query(params): Query<ListParams<NoFilters>>,
) -> Result<Response, AppError> {
    let config = stores_table_config();
    manage::table_fragment::<Stores, (), _>(&state, &admin, &config, params, |loaded| {
        StoresTableTemplate {
            rows: loaded.state.rows().iter().map(StoreRow::from).collect(),
            pagination: loaded.pagination,
            config: stores_table_config(),
        }
    })
    .await
}

/// GET /stores/new
async fn new_page(RequireAdminAuth(admin): RequireAdminAuth, session: Session) -> StoreFormTemplate {
    form_page(&admin, &session, None, StoreForm::default()).await
}

/// GET /stores/{id}
#[instrument(skip(admin, state, session))]
async fn edit_page(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<StoreId>,
) -> Result<Response, AppError> {
    match state.api().resource::<Stores>(admin.token()).get(id).await {
        Ok(store) => Ok(form_page(&admin, &session, Some(id), StoreForm::from(&store))
            .await
            .into_response()),
        Err(e) if e.is_unauthorized() => Err(e.into()),
        Err(e) => {
            tracing::error!(error = %e, "Failed to load store");
            set_flash(&session, &Toast::error("Không thể tải thông tin cửa hàng!")).await;
            Ok(Redirect::to("/stores").into_response())
        }
    }
}

/// POST /stores
#[instrument(skip(admin, state, session, form), fields(username = %form.username))]
async fn create(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<StoreForm>,
) -> Result<Response, AppError> {
    let payload = CreateStore::from(&form);
    let message = if payload.is_complete() {
        match state.api().resource::<Stores>(admin.token()).create(&payload).await {
            Ok(_) => {
                tracing::info!("Store created");
                set_flash(&session, &Toast::success("Thêm cửa hàng thành công!")).await;
                return Ok(Redirect::to("/stores").into_response());
            }
            Err(e) if e.is_unauthorized() => return Err(e.into()),
            Err(e) => {
                tracing::error!(error = %e, "Failed to create store");
                "Thêm cửa hàng thất bại!"
            }
        }
    } else {
        "Vui lòng nhập đầy đủ thông tin!"
    };

    let mut page = form_page(&admin, &session, None, form).await;
    page.layout = page.layout.with_toast(Toast::error(message));
    Ok(page.into_response())
}

/// POST /stores/{id}
#[instrument(skip(admin, state, session, form))]
async fn update(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<StoreId>,
    Form(form): Form<StoreForm>,
) -> Result<Response, AppError> {
    let payload = UpdateStore::from(&form);
    let message = if payload.name.is_empty() {
        "Vui lòng nhập đầy đủ thông tin!"
    } else {
        match state.api().resource::<Stores>(admin.token()).update(id, &payload).await {
            Ok(_) => {
                tracing::info!("Store updated");
                set_flash(&session, &Toast::success("Cập nhật thành công!")).await;
                return Ok(Redirect::to("/stores").into_response());
            }
            Err(e) if e.is_unauthorized() => return Err(e.into()),
            Err(e) => {
                tracing::error!(error = %e, "Failed to update store");
                "Cập nhật thất bại!"
            }
        }
    };

    let mut page = form_page(&admin, &session, Some(id), form).await;
    page.layout = page.layout.with_toast(Toast::error(message));
    Ok(page.into_response())
}

/// PATCH /stores/{id}/status
#[instrument(skip(admin, state, form))]
async fn toggle(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<StoreId>,
    Form(form): Form<StatusForm>,
) -> Result<Fragment, AppError> {
    let config = stores_table_config();
    let switch = SwitchView::new(config.base_path, config.table_id, NOUN, id, form.current());
    manage::toggle_status::<Stores>(&state, &admin, id, switch, NOUN).await
}

/// DELETE /stores/{id}
#[instrument(skip(admin, state))]
async fn remove(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<StoreId>,
) -> Result<Fragment, AppError> {
    manage::delete::<Stores>(&state, &admin, id, NOUN).await
}

/// POST /stores/{id}/reset-password
#[instrument(skip(admin, state))]
async fn reset_password(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<StoreId>,
) -> Result<Fragment, AppError> {
    manage::reset_password::<Stores>(&state, &admin, id, "Đã đặt lại mật khẩu!").await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> Store {
        serde_json::from_value(serde_json::json!({
            "id": 2, "username": "q10", "name": "Nhà thuốc Quận 10",
            "address": "12 Lý Thường Kiệt", "ward": " ", "district": "Quận 10",
            "city": "TP.HCM", "is_active": true
        }))
        .unwrap()
    }

    #[test]
    fn test_row_joins_address() {
        let row = StoreRow::from(&store());
        assert_eq!(row.address, "12 Lý Thường Kiệt, Quận 10, TP.HCM");
        assert_eq!(row.reset_confirm, "Bạn có muốn đặt lại mật khẩu cho cửa hàng #2?");
    }

    #[test]
    fn test_create_requires_account_fields() {
        let form = StoreForm {
            username: "q10".into(),
            name: "Nhà thuốc Quận 10".into(),
            ..StoreForm::default()
        };
        assert!(!CreateStore::from(&form).is_complete());

        let form = StoreForm {
            password: "secret".into(),
            ..form
        };
        assert!(CreateStore::from(&form).is_complete());
    }

    #[test]
    fn test_update_drops_account_fields() {
        let form = StoreForm::from(&store());
        assert!(form.password.is_empty());
        let payload = UpdateStore::from(&form);
        assert_eq!(payload.name, "Nhà thuốc Quận 10");
        assert_eq!(payload.ward, "");
    }
}
