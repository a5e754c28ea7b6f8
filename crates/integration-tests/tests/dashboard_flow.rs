//! End-to-end dashboard flows: a cookie-keeping client drives the dashboard,
//! which talks to the mock pharmacy API.

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::LOCATION;

use pharmacy_admin_integration_tests::{MockBackend, browser, login, mock_token, spawn_dashboard};

struct Harness {
    backend: MockBackend,
    base: String,
    client: reqwest::Client,
}

async fn logged_in() -> Harness {
    let backend = MockBackend::seeded();
    let api = backend.spawn().await;
    let base = spawn_dashboard(&api).await;
    let client = browser();

    let response = login(&client, &base).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers().get(LOCATION).unwrap(), "/");

    Harness { backend, base, client }
}

impl Harness {
    async fn get(&self, path: &str) -> reqwest::Response {
        self.client.get(format!("{}{path}", self.base)).send().await.unwrap()
    }

    async fn htmx(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, format!("{}{path}", self.base))
            .header("HX-Request", "true")
    }
}

#[tokio::test]
async fn test_pages_require_login() {
    let backend = MockBackend::seeded();
    let base = spawn_dashboard(&backend.spawn().await).await;
    let client = browser();

    let response = client.get(format!("{base}/products")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers().get(LOCATION).unwrap(), "/login");

    let page = client.get(format!("{base}/login")).send().await.unwrap();
    assert_eq!(page.status(), StatusCode::OK);
    let html = page.text().await.unwrap();
    assert!(html.contains("Tên tài khoản"));
    assert!(html.contains("Mật khẩu"));
}

#[tokio::test]
async fn test_wrong_password_shows_api_message() {
    let backend = MockBackend::seeded();
    let base = spawn_dashboard(&backend.spawn().await).await;
    let client = browser();

    let response = client
        .post(format!("{base}/login"))
        .form(&[("username", "admin"), ("password", "nope")])
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = response.text().await.unwrap();
    assert!(html.contains("Sai tên đăng nhập hoặc mật khẩu"));
    assert!(html.contains(r#"value="admin""#));
}

#[tokio::test]
async fn test_dashboard_home_after_login() {
    let h = logged_in().await;

    let response = h.get("/").await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = response.text().await.unwrap();
    assert!(html.contains("Trang chủ"));
    assert!(html.contains("adminPharmacy"));
    assert!(html.contains(r#"href="/products""#));
}

#[tokio::test]
async fn test_product_page_searches_with_page_size() {
    let h = logged_in().await;

    let html = h.get("/products?search=vitamin").await.text().await.unwrap();
    assert!(html.contains("Vitamin C 500mg"));
    assert!(html.contains("Vitamin D3"));
    assert!(!html.contains("Siro ho Prospan"));
    assert!(html.contains("120.000 VNĐ"));

    let call = h.backend.last_call("/product/").unwrap();
    assert_eq!(call.query.get("search").unwrap(), "vitamin");
    assert_eq!(call.query.get("limit").unwrap(), "5");
    assert_eq!(call.authorization.unwrap(), format!("Bearer {}", mock_token()));
}

#[tokio::test]
async fn test_table_fragment_applies_filters_and_pushes_url() {
    let h = logged_in().await;

    let response = h
        .htmx(reqwest::Method::GET, "/products/table?isSales=true&categories=1")
        .await
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("hx-push-url").unwrap(),
        "/products?page=1&isSales=true&categories=1"
    );
    let html = response.text().await.unwrap();
    assert!(html.contains(r#"id="table""#));
    assert!(html.contains("Vitamin C 500mg"));
    assert!(!html.contains("Vitamin D3"));
    assert!(!html.contains("<html"));

    let call = h.backend.last_call("/product/").unwrap();
    assert_eq!(call.query.get("isSales").unwrap(), "1");
    assert_eq!(call.query.get("categories").unwrap(), "1");
}

#[tokio::test]
async fn test_status_toggle_renders_flipped_switch() {
    let h = logged_in().await;

    let response = h
        .htmx(reqwest::Method::PATCH, "/products/2/status")
        .await
        .form(&[("current", "true")])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = response.text().await.unwrap();
    assert!(html.contains(r#"id="products-status-2""#));
    assert!(!html.contains("switch-on"));
    assert!(html.contains("Đã thay đổi trạng thái sản phẩm!"));
    assert_eq!(h.backend.record("product", 2).unwrap()["is_sales"], false);
}

#[tokio::test]
async fn test_delete_category_removes_row() {
    let h = logged_in().await;

    let response = h
        .htmx(reqwest::Method::DELETE, "/categories/3")
        .await
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.text().await.unwrap().contains("Xóa danh mục thành công!"));
    assert!(h.backend.record("category", 3).is_none());
}

#[tokio::test]
async fn test_inline_admin_edit_saves_and_renders_row() {
    let h = logged_in().await;

    let edit = h
        .htmx(reqwest::Method::GET, "/admins/2/edit")
        .await
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(edit.contains("data-editing"));
    assert!(edit.contains(r#"value="Nguyễn Linh""#));

    let saved = h
        .htmx(reqwest::Method::PUT, "/admins/2")
        .await
        .form(&[("username", "linh"), ("fullname", "Nguyễn Thị Linh")])
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(saved.contains("Nguyễn Thị Linh"));
    assert!(!saved.contains("data-editing"));
    assert!(saved.contains("Cập nhật thành công!"));

    let call = h.backend.last_call("/admin/2").unwrap();
    assert_eq!(call.method, reqwest::Method::PUT);
    assert_eq!(call.body.unwrap()["fullname"], "Nguyễn Thị Linh");
}

#[tokio::test]
async fn test_reset_password_leaves_row_alone() {
    let h = logged_in().await;

    let response = h
        .htmx(reqwest::Method::POST, "/customers/9/reset-password")
        .await
        .send()
        .await
        .unwrap();
    assert_eq!(response.headers().get("hx-reswap").unwrap(), "none");
    assert!(response.text().await.unwrap().contains("Đã đặt lại mật khẩu!"));
    assert_eq!(h.backend.last_call("/customer/9").unwrap().path, "/customer/9/reset-password");
}

#[tokio::test]
async fn test_customer_detail_shows_addresses_and_orders() {
    let h = logged_in().await;

    let html = h.get("/customers/9").await.text().await.unwrap();
    assert!(html.contains("Chi tiết Khách hàng #9"));
    assert!(html.contains("12 Lý Thường Kiệt, Quận 10, TP.HCM"));
    assert!(html.contains("250.000 VNĐ"));
}

#[tokio::test]
async fn test_failed_list_renders_empty_table_with_toast() {
    let h = logged_in().await;
    h.backend.fail_resource("store");

    let response = h.get("/stores").await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = response.text().await.unwrap();
    assert!(html.contains("Không thể tải danh sách!"));
    assert!(html.contains("Không có dữ liệu"));
}

#[tokio::test]
async fn test_revoked_token_ends_the_session() {
    let h = logged_in().await;
    h.backend.revoke_token();

    let response = h
        .htmx(reqwest::Method::GET, "/products/table")
        .await
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers().get("hx-redirect").unwrap(), "/login");

    let response = h.get("/products").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers().get(LOCATION).unwrap(), "/login");
    assert!(h.backend.last_call("/product/").is_some());
}

#[tokio::test]
async fn test_logout_clears_session() {
    let h = logged_in().await;

    let response = h.client.post(format!("{}/logout", h.base)).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let response = h.get("/").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers().get(LOCATION).unwrap(), "/login");
}

#[tokio::test]
async fn test_full_page_survives_a_newer_fragment() {
    let h = logged_in().await;
    h.backend.delay_search("nhà thuốc", Duration::from_millis(500));

    let page = h.client.get(format!("{}/stores", h.base)).query(&[("search", "nhà thuốc")]).send();
    let fragment = async {
        tokio::time::sleep(Duration::from_millis(100)).await;
        h.htmx(reqwest::Method::GET, "/stores/table?search=q10").await.send().await.unwrap()
    };
    let (page, fragment) = tokio::join!(page, fragment);

    assert_eq!(fragment.status(), StatusCode::OK);
    let page = page.unwrap();
    assert_eq!(page.status(), StatusCode::OK);
    let html = page.text().await.unwrap();
    assert!(html.contains("Nhà thuốc Quận 10"));
    assert!(!html.contains("Không thể tải danh sách!"));
}

#[tokio::test]
async fn test_overtaken_fragment_is_not_swapped() {
    let h = logged_in().await;
    h.backend.delay_search("nhà thuốc", Duration::from_millis(500));

    let slow = async {
        h.htmx(reqwest::Method::GET, "/stores/table")
            .await
            .query(&[("search", "nhà thuốc")])
            .send()
            .await
            .unwrap()
    };
    let fast = async {
        tokio::time::sleep(Duration::from_millis(100)).await;
        h.htmx(reqwest::Method::GET, "/stores/table?search=q10").await.send().await.unwrap()
    };
    let (slow, fast) = tokio::join!(slow, fast);

    assert_eq!(slow.status(), StatusCode::NO_CONTENT);
    assert!(slow.text().await.unwrap().is_empty());
    assert_eq!(fast.status(), StatusCode::OK);
    assert!(fast.text().await.unwrap().contains("Nhà thuốc Quận 10"));
}

#[tokio::test]
async fn test_add_product_posts_numeric_price_without_empty_category() {
    let h = logged_in().await;

    let response = h
        .client
        .post(format!("{}/products", h.base))
        .form(&[
            ("name", "Men vi sinh"),
            ("price", "60.000"),
            ("stock", "25"),
            ("discount", "10"),
            ("category_id", ""),
            ("is_sales", "true"),
        ])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers().get(LOCATION).unwrap(), "/products");

    let call = h.backend.last_call("/product/create").unwrap();
    assert_eq!(call.method, reqwest::Method::POST);
    let body = call.body.unwrap();
    assert!(body["price"].is_number());
    assert_eq!(body["price"].as_f64(), Some(60_000.0));
    assert_eq!(body["stock"], 25);
    assert!(body.get("category_id").is_none());
    assert_eq!(body["is_sales"], true);

    let html = h.get("/products").await.text().await.unwrap();
    assert!(html.contains("Sản phẩm đã được thêm/cập nhật thành công!"));
    assert!(html.contains("Men vi sinh"));
}

#[tokio::test]
async fn test_edit_product_puts_whole_record() {
    let h = logged_in().await;

    let edit = h.get("/products/1").await.text().await.unwrap();
    assert!(edit.contains(r#"value="Vitamin C 500mg""#));

    let response = h
        .client
        .post(format!("{}/products/1", h.base))
        .form(&[
            ("name", "Vitamin C 1000mg"),
            ("price", "135000"),
            ("stock", "40"),
            ("category_id", "1"),
        ])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let call = h.backend.last_call("/product/1").unwrap();
    assert_eq!(call.method, reqwest::Method::PUT);
    let body = call.body.unwrap();
    assert_eq!(body["name"], "Vitamin C 1000mg");
    assert_eq!(body["price"].as_f64(), Some(135_000.0));
    assert_eq!(body["category_id"], 1);
    assert_eq!(body["is_sales"], false);
    assert_eq!(h.backend.record("product", 1).unwrap()["name"], "Vitamin C 1000mg");
}

#[tokio::test]
async fn test_store_account_fields_only_sent_on_create() {
    let h = logged_in().await;

    let created = h
        .client
        .post(format!("{}/stores", h.base))
        .form(&[
            ("username", "q3"),
            ("password", "khoimau"),
            ("name", "Nhà thuốc Quận 3"),
            ("phonenumber", "0287654321"),
            ("city", "TP.HCM"),
        ])
        .send()
        .await
        .unwrap();
    assert_eq!(created.status(), StatusCode::SEE_OTHER);
    let body = h.backend.last_call("/store/create").unwrap().body.unwrap();
    assert_eq!(body["username"], "q3");
    assert_eq!(body["password"], "khoimau");
    assert_eq!(body["name"], "Nhà thuốc Quận 3");

    let updated = h
        .client
        .post(format!("{}/stores/4", h.base))
        .form(&[
            ("username", "hacked"),
            ("password", "hacked"),
            ("name", "Nhà thuốc Quận 10 (mới)"),
            ("district", "Quận 10"),
        ])
        .send()
        .await
        .unwrap();
    assert_eq!(updated.status(), StatusCode::SEE_OTHER);
    let call = h.backend.last_call("/store/4").unwrap();
    assert_eq!(call.method, reqwest::Method::PUT);
    let body = call.body.unwrap();
    assert_eq!(body["name"], "Nhà thuốc Quận 10 (mới)");
    assert!(body.get("username").is_none());
    assert!(body.get("password").is_none());
    assert_eq!(h.backend.record("store", 4).unwrap()["username"], "q10");
}

#[tokio::test]
async fn test_create_admin_and_category_from_forms() {
    let h = logged_in().await;

    let admin = h
        .client
        .post(format!("{}/admins", h.base))
        .form(&[("username", "minh"), ("fullname", "Lê Minh"), ("password", "")])
        .send()
        .await
        .unwrap();
    assert_eq!(admin.status(), StatusCode::SEE_OTHER);
    assert_eq!(admin.headers().get(LOCATION).unwrap(), "/admins");
    let body = h.backend.last_call("/admin/create").unwrap().body.unwrap();
    assert_eq!(body["username"], "minh");
    assert!(body.get("password").is_none());
    assert_eq!(h.backend.record("admin", 3).unwrap()["fullname"], "Lê Minh");

    let category = h
        .client
        .post(format!("{}/categories", h.base))
        .form(&[("name", "Chăm sóc da"), ("description", "Kem dưỡng")])
        .send()
        .await
        .unwrap();
    assert_eq!(category.status(), StatusCode::SEE_OTHER);
    assert_eq!(category.headers().get(LOCATION).unwrap(), "/categories");
    let body = h.backend.last_call("/category/create").unwrap().body.unwrap();
    assert_eq!(body["name"], "Chăm sóc da");
    assert_eq!(body["description"], "Kem dưỡng");

    let html = h.get("/categories").await.text().await.unwrap();
    assert!(html.contains("Thêm danh mục thành công!"));
}

#[tokio::test]
async fn test_admin_delete_asks_the_table_to_refetch() {
    let h = logged_in().await;

    let response = h
        .htmx(reqwest::Method::DELETE, "/admins/2")
        .await
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers().get("hx-trigger").unwrap(), "admins-refresh");
    assert!(response.text().await.unwrap().contains("Xóa tài khoản thành công!"));
    assert!(h.backend.record("admin", 2).is_none());
}

#[tokio::test]
async fn test_sales_checkbox_reloads_product_category_select() {
    let h = logged_in().await;

    let form = h.get("/products/new").await.text().await.unwrap();
    assert!(form.contains(r#"hx-get="/categories/options""#));
    assert!(form.contains("Ngừng kinh doanh"));

    let response = h
        .htmx(reqwest::Method::GET, "/categories/options?style=select&is_sales=true&category_id=2")
        .await
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = response.text().await.unwrap();
    assert!(html.contains(r#"<select name="category_id""#));
    assert!(html.contains(r#"<option value="2" selected>Thuốc ho</option>"#));
    assert!(html.contains("Vitamin"));
    assert!(!html.contains("Ngừng kinh doanh"));
    assert_eq!(h.backend.last_call("/category/").unwrap().query.get("isSales").unwrap(), "1");
}
