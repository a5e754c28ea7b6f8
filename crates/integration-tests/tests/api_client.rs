//! The typed API client against the mock pharmacy API.

use std::time::Duration;

use axum::http::Method;
use secrecy::SecretString;

use pharmacy_admin::api::{Admins, ApiClient, ApiError, ApiToken, Categories, Customers, Products, Stores};
use pharmacy_admin::config::ApiConfig;
use pharmacy_admin_core::filters::{CategoryFilters, CategorySet, NoFilters, ProductFilters, SalesFilter, SortBy};
use pharmacy_admin_core::list::ListQuery;
use pharmacy_admin_core::{AdminId, CategoryId, CustomerId, ProductId, StoreId};
use pharmacy_admin_integration_tests::{
    ADMIN_PASSWORD, ADMIN_USERNAME, MockBackend, TOKEN_EXP, mock_token,
};

async fn client() -> (MockBackend, ApiClient) {
    let backend = MockBackend::seeded();
    let url = backend.spawn().await;
    let config = ApiConfig::new(&url, Duration::from_secs(5)).unwrap();
    (backend, ApiClient::new(&config).unwrap())
}

fn token() -> ApiToken {
    ApiToken::new(mock_token())
}

#[tokio::test]
async fn test_login_reads_token_expiry() {
    let (backend, api) = client().await;

    let session = api
        .login(ADMIN_USERNAME, &SecretString::from(ADMIN_PASSWORD.to_string()))
        .await
        .unwrap();

    assert_eq!(session.token.expose(), mock_token());
    assert_eq!(session.expires_at.unwrap().timestamp(), TOKEN_EXP);
    let call = backend.last_call("/admin/auth/login").unwrap();
    assert_eq!(call.method, Method::POST);
    assert!(call.authorization.is_none());
}

#[tokio::test]
async fn test_login_with_wrong_password_is_rejected() {
    let (_backend, api) = client().await;

    let err = api
        .login(ADMIN_USERNAME, &SecretString::from("wrong".to_string()))
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Rejected(ref m) if m == "Sai tên đăng nhập hoặc mật khẩu"));
}

#[tokio::test]
async fn test_list_sends_paging_and_bearer_token() {
    let (backend, api) = client().await;
    let token = token();

    let query = ListQuery::new(1, 2, "", NoFilters {});
    let page = api.resource::<Admins>(Some(&token)).list(&query).await.unwrap();

    assert_eq!(page.data.len(), 2);
    assert_eq!(page.total_pages, 1);
    let call = backend.last_call("/admin/").unwrap();
    assert_eq!(call.path, "/admin/");
    assert_eq!(call.query.get("page").unwrap(), "1");
    assert_eq!(call.query.get("limit").unwrap(), "2");
    assert_eq!(call.authorization.unwrap(), format!("Bearer {}", mock_token()));
}

#[tokio::test]
async fn test_product_filters_reach_the_query_string() {
    let (backend, api) = client().await;
    let token = token();

    let filters = ProductFilters {
        is_sales: SalesFilter::ON_SALE,
        categories: CategorySet::parse("1"),
        sort_by: Some(SortBy::PriceDesc),
    };
    let query = ListQuery::new(1, 10, "vitamin", filters);
    let page = api.resource::<Products>(Some(&token)).list(&query).await.unwrap();

    let names: Vec<_> = page.data.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["Vitamin C 500mg"]);
    let call = backend.last_call("/product/").unwrap();
    assert_eq!(call.query.get("isSales").unwrap(), "1");
    assert_eq!(call.query.get("categories").unwrap(), "1");
    assert_eq!(call.query.get("sortBy").unwrap(), "price_desc");
    assert_eq!(call.query.get("search").unwrap(), "vitamin");
}

#[tokio::test]
async fn test_unset_sales_filter_is_omitted() {
    let (backend, api) = client().await;
    let token = token();

    let query = ListQuery::new(1, 10, "", CategoryFilters::default());
    let page = api.resource::<Categories>(Some(&token)).list(&query).await.unwrap();

    assert_eq!(page.data.len(), 3);
    assert!(!backend.last_call("/category/").unwrap().query.contains_key("isSales"));
}

#[tokio::test]
async fn test_get_unwraps_nested_records() {
    let (_backend, api) = client().await;
    let token = token();

    let customer = api
        .resource::<Customers>(Some(&token))
        .get(CustomerId::new(9))
        .await
        .unwrap();

    assert_eq!(customer.fullname, "Trần An");
    assert_eq!(customer.addresses.len(), 1);
    assert_eq!(customer.orders.first().unwrap().total_price.to_string(), "250.000 VNĐ");
}

#[tokio::test]
async fn test_unknown_id_is_not_found() {
    let (_backend, api) = client().await;
    let token = token();

    let err = api
        .resource::<Stores>(Some(&token))
        .get(StoreId::new(404))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}

#[tokio::test]
async fn test_toggle_status_flips_the_flag() {
    let (backend, api) = client().await;
    let token = token();
    let products = api.resource::<Products>(Some(&token));

    products.toggle_status(ProductId::new(1)).await.unwrap();
    assert_eq!(backend.record("product", 1).unwrap()["is_sales"], false);

    products.toggle_status(ProductId::new(1)).await.unwrap();
    assert_eq!(backend.record("product", 1).unwrap()["is_sales"], true);
    assert_eq!(backend.last_call("/product/status").unwrap().method, Method::PATCH);
}

#[tokio::test]
async fn test_reset_password_paths_differ_per_resource() {
    let (backend, api) = client().await;
    let token = token();

    api.resource::<Admins>(Some(&token))
        .reset_password(AdminId::new(2))
        .await
        .unwrap();
    api.resource::<Customers>(Some(&token))
        .reset_password(CustomerId::new(9))
        .await
        .unwrap();

    let paths: Vec<_> = backend
        .calls()
        .into_iter()
        .filter(|c| c.method == Method::PATCH)
        .map(|c| c.path)
        .collect();
    assert_eq!(paths, ["/admin/reset-password/2", "/customer/9/reset-password"]);
}

#[tokio::test]
async fn test_delete_removes_the_record() {
    let (backend, api) = client().await;
    let token = token();

    api.resource::<Categories>(Some(&token))
        .delete(CategoryId::new(3))
        .await
        .unwrap();
    assert!(backend.record("category", 3).is_none());
}

#[tokio::test]
async fn test_missing_or_revoked_token_is_unauthorized() {
    let (backend, api) = client().await;

    let query = ListQuery::new(1, 5, "", NoFilters {});
    let err = api.resource::<Stores>(None).list(&query).await.unwrap_err();
    assert!(err.is_unauthorized());

    backend.revoke_token();
    let token = token();
    let err = api.resource::<Stores>(Some(&token)).list(&query).await.unwrap_err();
    assert!(err.is_unauthorized());
}

#[tokio::test]
async fn test_server_error_is_a_status_error() {
    let (backend, api) = client().await;
    backend.fail_resource("store");
    let token = token();

    let query = ListQuery::new(1, 5, "", NoFilters {});
    let err = api.resource::<Stores>(Some(&token)).list(&query).await.unwrap_err();
    assert!(matches!(err, ApiError::Status { status: 500, ref message } if message == "Internal error"));
}
