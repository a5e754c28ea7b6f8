//! Customer accounts: list, detail, activation and password reset.
//!
//! Customers register through the shopping app; the dashboard never creates or
//! edits them.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::{Path, Query, State},
    response::Response,
    routing::{get, patch, post},
};
use tower_sessions::Session;
use tracing::instrument;

use pharmacy_admin_core::CustomerId;
use pharmacy_admin_core::entities::{Address, Customer, Order};
use pharmacy_admin_core::filters::NoFilters;
use pharmacy_admin_core::list::ListParams;

use crate::{
    api::Customers,
    components::data_table::{customers_table_config, delete_confirm},
    components::{DataTableConfig, Fragment, PaginationView, SwitchView, Toast},
    error::AppError,
    filters::{self, display_date, display_datetime},
    middleware::auth::RequireAdminAuth,
    state::AppState,
};

use super::Layout;
use super::manage::{self, StatusForm};

const NOUN: &str = "khách hàng";

/// Build the customers router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/customers", get(index))
        .route("/customers/table", get(table))
        .route("/customers/{id}", get(detail).delete(remove))
        .route("/customers/{id}/status", patch(toggle))
        .route("/customers/{id}/reset-password", post(reset_password))
}

/// One table row.
#[derive(Debug, Clone)]
pub struct CustomerRow {
    pub id: CustomerId,
    pub fullname: String,
    pub email: String,
    pub phonenumber: String,
    pub switch: SwitchView,
    pub delete_confirm: String,
    pub reset_confirm: String,
}

impl From<&Customer> for CustomerRow {
    fn from(customer: &Customer) -> Self {
        let config = customers_table_config();
        Self {
            id: customer.id,
            fullname: customer.fullname.clone(),
            email: customer.email.clone(),
            phonenumber: customer.phonenumber.clone(),
            switch: SwitchView::new(
                config.base_path,
                config.table_id,
                NOUN,
                customer.id,
                customer.is_active,
            ),
            delete_confirm: delete_confirm(NOUN, customer.id),
            reset_confirm: format!("Bạn có muốn đặt lại mật khẩu cho khách hàng #{}?", customer.id),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AddressView {
    pub recipient_name: String,
    pub phonenumber: String,
    pub line: String,
    pub is_default: bool,
}

impl From<&Address> for AddressView {
    fn from(address: &Address) -> Self {
        Self {
            recipient_name: address.recipient_name.clone(),
            phonenumber: address.phonenumber.clone(),
            line: address.one_line(),
            is_default: address.is_default,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OrderView {
    pub id: String,
    pub created_at: String,
    pub total: String,
    pub status: String,
    pub payment_method: String,
    pub payment_status: String,
    pub shipping_address: String,
}

impl From<&Order> for OrderView {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id.to_string(),
            created_at: display_datetime(order.created_at.as_ref()),
            total: order.total_price.to_string(),
            status: order.status.clone(),
            payment_method: order.payment_method.clone(),
            payment_status: order.payment_status.clone(),
            shipping_address: order.shipping_address(),
        }
    }
}

/// Everything shown on the customer detail page.
#[derive(Debug, Clone)]
pub struct CustomerDetail {
    pub id: CustomerId,
    pub fullname: String,
    pub email: String,
    pub phonenumber: String,
    pub gender: String,
    pub birthday: String,
    pub is_verified: bool,
    pub is_active: bool,
    pub created_at: String,
    pub addresses: Vec<AddressView>,
    pub orders: Vec<OrderView>,
}

impl From<&Customer> for CustomerDetail {
    fn from(customer: &Customer) -> Self {
        Self {
            id: customer.id,
            fullname: customer.fullname.clone(),
            email: customer.email.clone(),
            phonenumber: customer.phonenumber.clone(),
            gender: customer.gender.map(|g| g.label().to_string()).unwrap_or_default(),
            birthday: display_date(customer.birthday.as_ref()),
            is_verified: customer.is_verified,
            is_active: customer.is_active,
            created_at: display_datetime(customer.created_at.as_ref()),
            addresses: customer.addresses.iter().map(AddressView::from).collect(),
            orders: customer.orders.iter().map(OrderView::from).collect(),
        }
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "customers/index.html")]
pub struct CustomersIndexTemplate {
    pub layout: Layout,
    pub config: DataTableConfig,
    pub search: String,
    pub rows: Vec<CustomerRow>,
    pub pagination: PaginationView,
}

#[derive(Template)]
#[template(path = "customers/table.html")]
pub struct CustomersTableTemplate {
    pub config: DataTableConfig,
    pub rows: Vec<CustomerRow>,
    pub pagination: PaginationView,
}

#[derive(Template, WebTemplate)]
#[template(path = "customers/detail.html")]
pub struct CustomerDetailTemplate {
    pub layout: Layout,
    pub title: String,
    /// `None` when the customer could not be loaded.
    pub customer: Option<CustomerDetail>,
}

/// Manage page.
///
/// GET /customers
#[instrument(skip(admin, state, session))]
async fn index(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Query(params): Query<ListParams<NoFilters>>,
) -> Result<CustomersIndexTemplate, AppError> {
    let config = customers_table_config();
    let search = params.search.clone();
    let (loaded, error) = manage::load_page::<Customers, ()>(&state, &admin, &config, params).await?;

    let mut layout = Layout::new(&admin, &session, config.base_path).await;
    if let Some(toast) = error {
        layout = layout.with_toast(toast);
    }

    Ok(CustomersIndexTemplate {
        layout,
        search,
        rows: loaded.state.rows().iter().map(CustomerRow::from).collect(),
        pagination: loaded.pagination,
        config,
    })
}

/// Table fragment.
///
/// GET /customers/table
#[instrument(skip(admin, state))]
async fn table(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Query(params): Query<ListParams<NoFilters>>,
) -> Result<Response, AppError> {
    let config = customers_table_config();
    manage::table_fragment::<Customers, (), _>(&state, &admin, &config, params, |loaded| {
        CustomersTableTemplate {
            rows: loaded.state.rows().iter().map(CustomerRow::from).collect(),
            pagination: loaded.pagination,
            config: customers_table_config(),
        }
    })
    .await
}

/// Customer detail with addresses and order history.
///
/// GET /customers/{id}
#[instrument(skip(admin, state, session))]
async fn detail(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<CustomerId>,
) -> Result<CustomerDetailTemplate, AppError> {
    let layout = Layout::new(&admin, &session, "/customers").await;
    let title = format!("Chi tiết Khách hàng #{id}");

    match state.api().resource::<Customers>(admin.token()).get(id).await {
        Ok(customer) => Ok(CustomerDetailTemplate {
            layout,
            title,
            customer: Some(CustomerDetail::from(&customer)),
        }),
        Err(e) if e.is_unauthorized() => Err(e.into()),
        Err(e) => {
            tracing::error!(error = %e, "Failed to load customer");
            Ok(CustomerDetailTemplate {
                layout: layout.with_toast(Toast::error("Không thể tải thông tin khách hàng!")),
                title,
                customer: None,
            })
        }
    }
}

/// PATCH /customers/{id}/status
#[instrument(skip(admin, state, form))]
async fn toggle(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<CustomerId>,
    Form(form): Form<StatusForm>,
) -> Result<Fragment, AppError> {
    let config = customers_table_config();
    let switch = SwitchView::new(config.base_path, config.table_id, NOUN, id, form.current());
    manage::toggle_status::<Customers>(&state, &admin, id, switch, NOUN).await
}

/// DELETE /customers/{id}
#[instrument(skip(admin, state))]
async fn remove(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<CustomerId>,
) -> Result<Fragment, AppError> {
    manage::delete::<Customers>(&state, &admin, id, NOUN).await
}

/// POST /customers/{id}/reset-password
#[instrument(skip(admin, state))]
async fn reset_password(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<CustomerId>,
) -> Result<Fragment, AppError> {
    manage::reset_password::<Customers>(&state, &admin, id, "Đã đặt lại mật khẩu!").await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::UNSET;

    fn customer() -> Customer {
        serde_json::from_value(serde_json::json!({
            "id": 9,
            "email": "an@example.com",
            "fullname": "Trần An",
            "is_active": true,
            "addresses": [{
                "id": 1, "recipient_name": "Trần An", "address": "12 Lý Thường Kiệt",
                "district": "Quận 10", "city": "TP.HCM", "is_default": true
            }],
            "orders": [{"id": 100, "total_price": 250000, "status": "pending"}]
        }))
        .unwrap()
    }

    #[test]
    fn test_detail_view_fills_unset_fields() {
        let detail = CustomerDetail::from(&customer());
        assert_eq!(detail.birthday, UNSET);
        assert_eq!(detail.gender, "");
        assert_eq!(detail.addresses.first().unwrap().line, "12 Lý Thường Kiệt, Quận 10, TP.HCM");
        let order = detail.orders.first().unwrap();
        assert_eq!(order.total, "250.000 VNĐ");
        assert_eq!(order.created_at, UNSET);
    }

    #[test]
    fn test_row_confirmations() {
        let row = CustomerRow::from(&customer());
        assert_eq!(row.reset_confirm, "Bạn có muốn đặt lại mật khẩu cho khách hàng #9?");
        assert_eq!(row.delete_confirm, "Bạn có chắc chắn muốn xóa khách hàng #9?");
        assert_eq!(row.switch.url, "/customers/9/status");
        assert!(row.switch.checked);
    }

    #[test]
    fn test_table_renders_rows() {
        let html = CustomersTableTemplate {
            config: customers_table_config(),
            rows: vec![CustomerRow::from(&customer())],
            pagination: PaginationView {
                label: "Trang 1 / 1".into(),
                current_url: "/customers/table?page=1".into(),
                prev: None,
                next: None,
                pages: Vec::new(),
            },
        }
        .render()
        .unwrap();
        assert!(html.contains(r#"href="/customers/9""#));
        assert!(html.contains(r#"hx-post="/customers/9/reset-password""#));
        assert!(html.contains(r#"hx-swap="none""#));
    }
}
