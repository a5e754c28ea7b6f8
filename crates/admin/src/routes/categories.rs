//! Category management, plus the category pickers used by the product pages.
//!
//! Any write here invalidates the cached picker options.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
    routing::{get, patch, put},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use pharmacy_admin_core::CategoryId;
use pharmacy_admin_core::entities::{Category, CategoryDraft, CreateCategory, UpdateCategory};
use pharmacy_admin_core::filters::{CategoryFilters, CategorySet, SalesFilter};
use pharmacy_admin_core::list::ListParams;
use pharmacy_admin_core::manage::{Editable, ManageState};

use crate::{
    api::Categories,
    components::data_table::{categories_table_config, delete_confirm},
    components::filter_bar::{
        CategoryChoice, SelectOption, category_choices, category_dropdown, sales_options,
    },
    components::toast::set_flash,
    components::{DataTableConfig, Fragment, PaginationView, SwitchView, Toast},
    error::AppError,
    filters,
    middleware::auth::RequireAdminAuth,
    state::AppState,
};

use super::manage::{self, StatusForm};
use super::{Layout, render};

const NOUN: &str = "danh mục";

const NAME_REQUIRED: &str = "Vui lòng nhập tên danh mục!";

/// Build the categories router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/categories", get(index).post(create))
        .route("/categories/table", get(table))
        .route("/categories/new", get(new_page))
        .route("/categories/options", get(options))
        .route("/categories/{id}", put(save).delete(remove))
        .route("/categories/{id}/row", get(row))
        .route("/categories/{id}/edit", get(edit))
        .route("/categories/{id}/status", patch(toggle))
}

/// One table row.
#[derive(Debug, Clone)]
pub struct CategoryRow {
    pub id: CategoryId,
    pub name: String,
    pub description: String,
    pub switch: SwitchView,
    pub delete_confirm: String,
}

impl From<&Category> for CategoryRow {
    fn from(category: &Category) -> Self {
        let config = categories_table_config();
        Self {
            id: category.id,
            name: category.name.clone(),
            description: category.description.clone(),
            switch: SwitchView::new(
                config.base_path,
                config.table_id,
                NOUN,
                category.id,
                category.is_sales,
            ),
            delete_confirm: delete_confirm(NOUN, category.id),
        }
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "categories/index.html")]
pub struct CategoriesIndexTemplate {
    pub layout: Layout,
    pub config: DataTableConfig,
    pub search: String,
    pub sales_options: Vec<SelectOption>,
    pub rows: Vec<CategoryRow>,
    pub pagination: PaginationView,
}

#[derive(Template)]
#[template(path = "categories/table.html")]
pub struct CategoriesTableTemplate {
    pub config: DataTableConfig,
    pub rows: Vec<CategoryRow>,
    pub pagination: PaginationView,
}

#[derive(Template)]
#[template(path = "categories/row.html")]
pub struct CategoryRowTemplate {
    pub config: DataTableConfig,
    pub row: CategoryRow,
}

#[derive(Template)]
#[template(path = "categories/edit_row.html")]
pub struct CategoryEditRowTemplate {
    pub config: DataTableConfig,
    pub row: CategoryRow,
    pub draft: CategoryDraft,
}

#[derive(Template, WebTemplate)]
#[template(path = "categories/new.html")]
pub struct CategoryNewTemplate {
    pub layout: Layout,
    pub form: CreateCategory,
}

/// Checkboxes of the product filter's category panel.
#[derive(Template)]
#[template(path = "partials/category_checklist.html")]
pub struct CategoryChecklistTemplate {
    pub choices: Vec<CategoryChoice>,
}

/// The category `<select>` of the product form.
#[derive(Template)]
#[template(path = "partials/category_select.html")]
pub struct CategorySelectTemplate {
    pub category_options: Vec<SelectOption>,
}

/// How the options endpoint renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionsStyle {
    #[default]
    Checkbox,
    Select,
}

/// Query of `GET /categories/options`.
///
/// The product form's sales checkbox reloads its dropdown with `is_sales`
/// and `category_id`; the snake_case aliases accept those names.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OptionsQuery {
    #[serde(default, rename = "isSales", alias = "is_sales")]
    pub is_sales: SalesFilter,
    /// Committed panel selection, kept ticked when the panel reloads.
    #[serde(default)]
    pub categories: CategorySet,
    /// Selected id of the product form's dropdown.
    #[serde(default, rename = "categoryId", alias = "category_id")]
    pub category_id: String,
    #[serde(default)]
    pub style: OptionsStyle,
}

fn row_fragment(category: &Category) -> String {
    render(&CategoryRowTemplate {
        config: categories_table_config(),
        row: CategoryRow::from(category),
    })
}

/// Manage page.
///
/// GET /categories
#[instrument(skip(admin, state, session))]
async fn index(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Query(params): Query<ListParams<CategoryFilters>>,
) -> Result<CategoriesIndexTemplate, AppError> {
    let config = categories_table_config();
    let search = params.search.clone();
    let is_sales = params.filters.is_sales;
    let (loaded, error) =
        manage::load_page::<Categories, CategoryDraft>(&state, &admin, &config, params).await?;

    let mut layout = Layout::new(&admin, &session, config.base_path).await;
    if let Some(toast) = error {
        layout = layout.with_toast(toast);
    }

    Ok(CategoriesIndexTemplate {
        layout,
        search,
        sales_options: sales_options(is_sales),
        rows: loaded.state.rows().iter().map(CategoryRow::from).collect(),
        pagination: loaded.pagination,
        config,
    })
}

/// Table fragment.
///
/// GET /categories/table
#[instrument(skip(admin, state))]
async fn table(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Query(params): Query<ListParams<CategoryFilters>>,
) -> Result<Response, AppError> {
    let config = categories_table_config();
    manage::table_fragment::<Categories, CategoryDraft, _>(&state, &admin, &config, params, |loaded| {
        CategoriesTableTemplate {
            rows: loaded.state.rows().iter().map(CategoryRow::from).collect(),
            pagination: loaded.pagination,
            config: categories_table_config(),
        }
    })
    .await
}

/// Category picker options for the product pages.
///
/// GET /categories/options
#[instrument(skip(admin, state))]
async fn options(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Query(query): Query<OptionsQuery>,
) -> Result<Fragment, AppError> {
    let categories = match state
        .category_options()
        .get(state.api(), admin.token(), query.is_sales)
        .await
    {
        Ok(categories) => categories,
        Err(e) if e.is_unauthorized() => return Err(AppError::Unauthorized),
        Err(e) => {
            tracing::error!(error = %e, "Failed to load category options");
            return Ok(Fragment::failure("Không thể tải danh mục!"));
        }
    };

    let html = match query.style {
        OptionsStyle::Checkbox => render(&CategoryChecklistTemplate {
            choices: category_choices(&categories, &query.categories),
        }),
        OptionsStyle::Select => render(&CategorySelectTemplate {
            category_options: category_dropdown(&categories, query.category_id.parse().ok()),
        }),
    };
    Ok(Fragment::new(html))
}

/// Create form.
///
/// GET /categories/new
async fn new_page(RequireAdminAuth(admin): RequireAdminAuth, session: Session) -> CategoryNewTemplate {
    CategoryNewTemplate {
        layout: Layout::new(&admin, &session, "/categories").await,
        form: CreateCategory::default(),
    }
}

/// Create a category.
///
/// POST /categories
#[instrument(skip(admin, state, session, form), fields(name = %form.name))]
async fn create(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<CreateCategory>,
) -> Result<Response, AppError> {
    let payload = CreateCategory {
        name: form.name.trim().to_string(),
        description: form.description.trim().to_string(),
    };

    let message = if payload.name.is_empty() {
        NAME_REQUIRED
    } else {
        match state.api().resource::<Categories>(admin.token()).create(&payload).await {
            Ok(_) => {
                state.category_options().invalidate();
                tracing::info!("Category created");
                set_flash(&session, &Toast::success("Thêm danh mục thành công!")).await;
                return Ok(Redirect::to("/categories").into_response());
            }
            Err(e) if e.is_unauthorized() => return Err(e.into()),
            Err(e) => {
                tracing::error!(error = %e, "Failed to create category");
                "Thêm danh mục thất bại!"
            }
        }
    };

    let layout = Layout::new(&admin, &session, "/categories")
        .await
        .with_toast(Toast::error(message));
    Ok(CategoryNewTemplate { layout, form }.into_response())
}

/// View-mode row, used to cancel an edit.
///
/// GET /categories/{id}/row
#[instrument(skip(admin, state))]
async fn row(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
) -> Result<Fragment, AppError> {
    match state.api().resource::<Categories>(admin.token()).get(id).await {
        Ok(record) => Ok(Fragment::new(row_fragment(&record))),
        Err(e) => manage::mutation_failure(e, "Không thể tải danh mục!"),
    }
}

/// Edit-mode row.
///
/// GET /categories/{id}/edit
#[instrument(skip(admin, state))]
async fn edit(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
) -> Result<Fragment, AppError> {
    let record = match state.api().resource::<Categories>(admin.token()).get(id).await {
        Ok(record) => record,
        Err(e) => return manage::mutation_failure(e, "Không thể tải danh mục!"),
    };

    let draft = record.draft();
    Ok(Fragment::new(render(&CategoryEditRowTemplate {
        config: categories_table_config(),
        row: CategoryRow::from(&record),
        draft,
    })))
}

/// Save an inline edit and render the row in view mode.
///
/// PUT /categories/{id}
#[instrument(skip(admin, state, draft))]
async fn save(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
    Form(draft): Form<CategoryDraft>,
) -> Result<Fragment, AppError> {
    if draft.name.trim().is_empty() {
        return Ok(Fragment::failure(NAME_REQUIRED));
    }

    let service = state.api().resource::<Categories>(admin.token());
    let record = match service.get(id).await {
        Ok(record) => record,
        Err(e) => return manage::mutation_failure(e, "Cập nhật thất bại!"),
    };
    if let Err(e) = service.update(id, &UpdateCategory::from(&draft)).await {
        return manage::mutation_failure(e, "Cập nhật thất bại!");
    }
    state.category_options().invalidate();
    tracing::info!("Category updated");

    let mut rows: ManageState<Category, CategoryDraft> = ManageState::from_rows(vec![record]);
    rows.begin_edit(id);
    rows.update_draft(draft);
    let Some(saved) = rows.commit_save() else {
        return Err(AppError::Internal(format!("category {id} vanished during save")));
    };

    Ok(Fragment::new(row_fragment(saved)).with_toast(Toast::success("Cập nhật danh mục thành công!")))
}

/// PATCH /categories/{id}/status
#[instrument(skip(admin, state, form))]
async fn toggle(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
    Form(form): Form<StatusForm>,
) -> Result<Fragment, AppError> {
    let config = categories_table_config();
    let switch = SwitchView::new(config.base_path, config.table_id, NOUN, id, form.current());
    let fragment = manage::toggle_status::<Categories>(&state, &admin, id, switch, NOUN).await?;
    state.category_options().invalidate();
    Ok(fragment)
}

/// DELETE /categories/{id}
#[instrument(skip(admin, state))]
async fn remove(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
) -> Result<Fragment, AppError> {
    let fragment = manage::delete::<Categories>(&state, &admin, id, NOUN).await?;
    state.category_options().invalidate();
    Ok(fragment)
}

#[cfg(test)]
mod tests {
    use axum::http::Uri;

    use super::*;

    fn category(id: i32, name: &str, is_sales: bool) -> Category {
        Category {
            id: CategoryId::new(id),
            name: name.into(),
            description: "Bổ sung vi chất".into(),
            is_sales,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_options_query_defaults_to_checkboxes() {
        let uri: Uri = "/categories/options?isSales=true&categories=1,3".parse().unwrap();
        let Query(query) = Query::<OptionsQuery>::try_from_uri(&uri).unwrap();
        assert_eq!(query.style, OptionsStyle::Checkbox);
        assert_eq!(query.is_sales, SalesFilter::ON_SALE);
        assert_eq!(query.categories.joined(), "1,3");

        let uri: Uri = "/categories/options?style=select&categoryId=4".parse().unwrap();
        let Query(query) = Query::<OptionsQuery>::try_from_uri(&uri).unwrap();
        assert_eq!(query.style, OptionsStyle::Select);
        assert_eq!(query.category_id, "4");
    }

    #[test]
    fn test_checklist_has_no_submitted_name() {
        let options = [category(1, "Vitamin", true), category(2, "Thuốc ho", true)];
        let html = render(&CategoryChecklistTemplate {
            choices: category_choices(&options, &CategorySet::parse("2")),
        });
        assert!(html.contains(r#"value="2" checked"#));
        assert!(html.contains("Thuốc ho"));
        assert!(!html.contains("name="));
    }

    #[test]
    fn test_select_keeps_placeholder() {
        let options = [category(1, "Vitamin", true)];
        let html = render(&CategorySelectTemplate {
            category_options: category_dropdown(&options, Some(CategoryId::new(1))),
        });
        assert!(html.contains("Danh mục sản phẩm"));
        assert!(html.contains(r#"value="1" selected"#));
    }

    #[test]
    fn test_row_renders_switch_and_delete() {
        let html = row_fragment(&category(4, "Vitamin", false));
        assert!(html.contains(r#"hx-patch="/categories/4/status""#));
        assert!(!html.contains("switch-on"));
        assert!(html.contains("Bạn có chắc chắn muốn xóa danh mục #4?"));
        assert!(html.contains(r#"hx-get="/categories/4/edit""#));
    }
}
