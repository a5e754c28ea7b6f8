//! Product catalogue management.
//!
//! The list has the richest filter bar: search, sales flag, a multi-select
//! category panel and the sort order. Products are created and edited on a
//! full-page form.

use std::str::FromStr;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
    routing::{get, patch},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use pharmacy_admin_core::entities::{Category, Product, ProductInput};
use pharmacy_admin_core::filters::{ProductFilters, SalesFilter};
use pharmacy_admin_core::list::ListParams;
use pharmacy_admin_core::{Price, ProductId};

use crate::{
    api::Products,
    components::data_table::{delete_confirm, products_table_config},
    components::filter_bar::{
        CategoryChoice, SelectOption, category_choices, category_dropdown, sales_options,
        sort_options,
    },
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

const NOUN: &str = "sản phẩm";

const SAVED: &str = "Sản phẩm đã được thêm/cập nhật thành công!";

/// Build the products router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/products", get(index).post(create))
        .route("/products/table", get(table))
        .route("/products/new", get(new_page))
        .route("/products/{id}", get(edit_page).post(update).delete(remove))
        .route("/products/{id}/status", patch(toggle))
}

/// One table row.
#[derive(Debug, Clone)]
pub struct ProductRow {
    pub id: ProductId,
    pub name: String,
    pub image: String,
    pub price: String,
    pub stock: i64,
    pub category: String,
    pub switch: SwitchView,
    pub delete_confirm: String,
}

impl From<&Product> for ProductRow {
    fn from(product: &Product) -> Self {
        let config = products_table_config();
        Self {
            id: product.id,
            name: product.name.clone(),
            image: product.image.clone(),
            price: product.price.to_string(),
            stock: product.stock,
            category: product
                .category
                .as_ref()
                .map(|c| c.name.clone())
                .unwrap_or_default(),
            switch: SwitchView::new(
                config.base_path,
                config.table_id,
                NOUN,
                product.id,
                product.is_sales,
            ),
            delete_confirm: delete_confirm(NOUN, product.id),
        }
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub layout: Layout,
    pub config: DataTableConfig,
    pub search: String,
    pub sales_options: Vec<SelectOption>,
    pub sort_options: Vec<SelectOption>,
    /// Committed category selection, comma-joined.
    pub categories: String,
    pub category_count: usize,
    pub choices: Vec<CategoryChoice>,
    pub rows: Vec<ProductRow>,
    pub pagination: PaginationView,
}

#[derive(Template)]
#[template(path = "products/table.html")]
pub struct ProductsTableTemplate {
    pub config: DataTableConfig,
    pub rows: Vec<ProductRow>,
    pub pagination: PaginationView,
}

#[derive(Template, WebTemplate)]
#[template(path = "products/form.html")]
pub struct ProductFormTemplate {
    pub layout: Layout,
    pub title: String,
    /// Form `action`: `/products` or `/products/{id}`.
    pub action: String,
    pub form: ProductForm,
    pub category_options: Vec<SelectOption>,
}

/// The product form as submitted. Every field arrives as text and is
/// validated into a [`ProductInput`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProductForm {
    pub name: String,
    pub description: String,
    pub price: String,
    pub stock: String,
    pub discount: String,
    pub packaging: String,
    pub specification: String,
    pub indications: String,
    pub instructions: String,
    pub origin: String,
    pub brand: String,
    pub ingredients: String,
    pub note: String,
    pub category_id: String,
    pub image: String,
    /// Checkbox: present when ticked.
    pub is_sales: Option<String>,
}

impl ProductForm {
    /// Whether the sales checkbox is ticked.
    #[must_use]
    pub const fn on_sale(&self) -> bool {
        self.is_sales.is_some()
    }

    /// Categories the dropdown offers: on-sale ones for a product on sale,
    /// every category otherwise.
    #[must_use]
    pub const fn category_filter(&self) -> SalesFilter {
        if self.on_sale() {
            SalesFilter::ON_SALE
        } else {
            SalesFilter::ALL
        }
    }

    /// Validate into an API payload.
    ///
    /// # Errors
    ///
    /// Returns the message to show when a field is missing or malformed.
    pub fn to_input(&self) -> Result<ProductInput, &'static str> {
        let name = self.name.trim();
        if name.is_empty() || self.price.trim().is_empty() {
            return Err("Vui lòng nhập đầy đủ thông tin!");
        }

        let price = parse_amount(&self.price)
            .filter(|p| !p.is_sign_negative())
            .ok_or("Giá sản phẩm không hợp lệ!")?;

        let stock = match self.stock.trim() {
            "" => 0,
            raw => raw
                .parse::<i64>()
                .ok()
                .filter(|s| *s >= 0)
                .ok_or("Số lượng không hợp lệ!")?,
        };

        let discount = match self.discount.trim() {
            "" => Decimal::ZERO,
            raw => Decimal::from_str(raw)
                .ok()
                .filter(|d| *d >= Decimal::ZERO && *d <= Decimal::ONE_HUNDRED)
                .ok_or("Giảm giá không hợp lệ!")?,
        };

        Ok(ProductInput {
            name: name.to_string(),
            description: self.description.trim().to_string(),
            price: Price::new(price),
            stock,
            discount,
            packaging: self.packaging.trim().to_string(),
            specification: self.specification.trim().to_string(),
            indications: self.indications.trim().to_string(),
            instructions: self.instructions.trim().to_string(),
            origin: self.origin.trim().to_string(),
            brand: self.brand.trim().to_string(),
            ingredients: self.ingredients.trim().to_string(),
            note: self.note.trim().to_string(),
            category_id: self.category_id.parse().ok(),
            image: self.image.trim().to_string(),
            is_sales: self.on_sale(),
        })
    }
}

impl From<&Product> for ProductForm {
    fn from(p: &Product) -> Self {
        Self {
            name: p.name.clone(),
            description: p.description.clone(),
            price: p.price.amount().trunc().to_string(),
            stock: p.stock.to_string(),
            discount: p.discount.normalize().to_string(),
            packaging: p.packaging.clone(),
            specification: p.specification.clone(),
            indications: p.indications.clone(),
            instructions: p.instructions.clone(),
            origin: p.origin.clone(),
            brand: p.brand.clone(),
            ingredients: p.ingredients.clone(),
            note: p.note.clone(),
            category_id: p.category_id.map(|id| id.to_string()).unwrap_or_default(),
            image: p.image.clone(),
            is_sales: p.is_sales.then(|| "on".to_string()),
        }
    }
}

/// Parse a VND amount, accepting `.`, `,` and spaces as thousands grouping.
fn parse_amount(raw: &str) -> Option<Decimal> {
    let digits: String = raw
        .chars()
        .filter(|c| !matches!(c, '.' | ',' | ' '))
        .collect();
    Decimal::from_str(&digits).ok()
}

/// Category options for a picker. A failed fetch yields no options.
async fn category_options(
    state: &AppState,
    admin: &CurrentAdmin,
    is_sales: SalesFilter,
) -> Result<Vec<Category>, AppError> {
    match state
        .category_options()
        .get(state.api(), admin.token(), is_sales)
        .await
    {
        Ok(categories) => Ok(categories.as_ref().clone()),
        Err(e) if e.is_unauthorized() => Err(AppError::Unauthorized),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load category options");
            Ok(Vec::new())
        }
    }
}

/// Manage page.
///
/// GET /products
#[instrument(skip(admin, state, session))]
async fn index(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Query(params): Query<ListParams<ProductFilters>>,
) -> Result<ProductsIndexTemplate, AppError> {
    let config = products_table_config();
    let search = params.search.clone();
    let chosen = params.filters.clone();

    let (table, options) = tokio::join!(
        manage::load_page::<Products, ()>(&state, &admin, &config, params),
        category_options(&state, &admin, chosen.is_sales),
    );
    let (loaded, error) = table?;
    let options = options?;

    let mut layout = Layout::new(&admin, &session, config.base_path).await;
    if let Some(toast) = error {
        layout = layout.with_toast(toast);
    }

    Ok(ProductsIndexTemplate {
        layout,
        search,
        sales_options: sales_options(chosen.is_sales),
        sort_options: sort_options(chosen.displayed_sort()),
        categories: chosen.categories.joined(),
        category_count: chosen.categories.len(),
        choices: category_choices(&options, &chosen.categories),
        rows: loaded.state.rows().iter().map(ProductRow::from).collect(),
        pagination: loaded.pagination,
        config,
    })
}

/// Table fragment.
///
/// GET /products/table
#[instrument(skip(admin, state))]
async fn table(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Query(params): Query<ListParams<ProductFilters>>,
) -> Result<Response, AppError> {
    let config = products_table_config();
    manage::table_fragment::<Products, (), _>(&state, &admin, &config, params, |loaded| {
        ProductsTableTemplate {
            rows: loaded.state.rows().iter().map(ProductRow::from).collect(),
            pagination: loaded.pagination,
            config: products_table_config(),
        }
    })
    .await
}

async fn form_page(
    state: &AppState,
    admin: &CurrentAdmin,
    session: &Session,
    target: Option<ProductId>,
    form: ProductForm,
) -> Result<ProductFormTemplate, AppError> {
    let options = category_options(state, admin, form.category_filter()).await?;
    let (title, action) = match target {
        Some(id) => (format!("Cập nhật sản phẩm #{id}"), format!("/products/{id}")),
        None => ("Thêm sản phẩm".to_string(), "/products".to_string()),
    };
    Ok(ProductFormTemplate {
        layout: Layout::new(admin, session, "/products").await,
        title,
        action,
        category_options: category_dropdown(&options, form.category_id.parse().ok()),
        form,
    })
}

/// Create form.
///
/// GET /products/new
#[instrument(skip(admin, state, session))]
async fn new_page(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
) -> Result<ProductFormTemplate, AppError> {
    form_page(&state, &admin, &session, None, ProductForm::default()).await
}

/// Edit form.
///
/// GET /products/{id}
#[instrument(skip(admin, state, session))]
async fn edit_page(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<ProductId>,
) -> Result<Response, AppError> {
    match state.api().resource::<Products>(admin.token()).get(id).await {
        Ok(product) => {
            let page = form_page(&state, &admin, &session, Some(id), ProductForm::from(&product)).await?;
            Ok(page.into_response())
        }
        Err(e) if e.is_unauthorized() => Err(e.into()),
        Err(e) => {
            tracing::error!(error = %e, "Failed to load product");
            set_flash(&session, &Toast::error("Không thể tải thông tin sản phẩm!")).await;
            Ok(Redirect::to("/products").into_response())
        }
    }
}

/// Create a product.
///
/// POST /products
#[instrument(skip(admin, state, session, form), fields(name = %form.name))]
async fn create(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<ProductForm>,
) -> Result<Response, AppError> {
    submit(&state, &admin, &session, None, form).await
}

/// Save the edit form.
///
/// POST /products/{id}
#[instrument(skip(admin, state, session, form))]
async fn update(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<ProductId>,
    Form(form): Form<ProductForm>,
) -> Result<Response, AppError> {
    submit(&state, &admin, &session, Some(id), form).await
}

async fn submit(
    state: &AppState,
    admin: &CurrentAdmin,
    session: &Session,
    target: Option<ProductId>,
    form: ProductForm,
) -> Result<Response, AppError> {
    let message = match form.to_input() {
        Err(message) => message,
        Ok(input) => {
            let service = state.api().resource::<Products>(admin.token());
            let result = match target {
                Some(id) => service.update(id, &input).await,
                None => service.create(&input).await,
            };
            match result {
                Ok(_) => {
                    tracing::info!(product_id = ?target, "Product saved");
                    set_flash(session, &Toast::success(SAVED)).await;
                    return Ok(Redirect::to("/products").into_response());
                }
                Err(e) if e.is_unauthorized() => return Err(e.into()),
                Err(e) => {
                    tracing::error!(error = %e, "Failed to save product");
                    if target.is_some() {
                        "Lỗi khi cập nhật sản phẩm. Vui lòng thử lại!"
                    } else {
                        "Lỗi khi thêm sản phẩm. Vui lòng thử lại!"
                    }
                }
            }
        }
    };

    let mut page = form_page(state, admin, session, target, form).await?;
    page.layout = page.layout.with_toast(Toast::error(message));
    Ok(page.into_response())
}

/// PATCH /products/{id}/status
#[instrument(skip(admin, state, form))]
async fn toggle(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    Form(form): Form<StatusForm>,
) -> Result<Fragment, AppError> {
    let config = products_table_config();
    let switch = SwitchView::new(config.base_path, config.table_id, NOUN, id, form.current());
    manage::toggle_status::<Products>(&state, &admin, id, switch, NOUN).await
}

/// DELETE /products/{id}
#[instrument(skip(admin, state))]
async fn remove(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Fragment, AppError> {
    manage::delete::<Products>(&state, &admin, id, NOUN).await
}
