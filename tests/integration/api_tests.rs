//! API integration tests
//!
//! Each test serves the full router on an ephemeral port, backed by an
//! in-memory database and a fake catalog upstream.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{
    header::{COOKIE, LOCATION, SET_COOKIE},
    redirect::Policy,
    Client, Response, StatusCode,
};
use serde_json::Value;

use bookshelf_server::{
    api,
    config::{AppConfig, DatabaseConfig},
    error::{AppError, AppResult},
    models::volume::{ImageLinks, Volume, VolumeInfo, VolumesPage},
    repository,
    services::catalog::{CatalogClient, PALETTE},
    AppState,
};

struct FakeCatalog {
    fail: bool,
}

fn volume(id: &str, title: &str) -> Volume {
    Volume {
        id: id.to_string(),
        volume_info: VolumeInfo {
            title: Some(title.to_string()),
            authors: Some(vec!["Frank Herbert".to_string()]),
            image_links: Some(ImageLinks {
                small_thumbnail: None,
                thumbnail: Some(format!("http://books.example/{}.jpg", id)),
            }),
            preview_link: Some(format!("http://books.example/{}", id)),
            ..Default::default()
        },
    }
}

#[async_trait]
impl CatalogClient for FakeCatalog {
    async fn search_volumes(&self, query: &str, _max_results: usize) -> AppResult<VolumesPage> {
        if self.fail {
            return Err(AppError::CatalogUnavailable("connection refused".to_string()));
        }
        Ok(VolumesPage {
            total_items: Some(8),
            items: Some(
                (0..8)
                    .map(|i| volume(&format!("vol{}", i), &format!("{} volume {}", query, i)))
                    .collect(),
            ),
        })
    }

    async fn get_volume(&self, id: &str) -> AppResult<Volume> {
        if self.fail {
            return Err(AppError::CatalogUnavailable("connection refused".to_string()));
        }
        match id {
            "missing" => Err(AppError::NotFound(format!("No catalog entry with id {}", id))),
            "noimage" => {
                let mut v = volume(id, "Coverless");
                v.volume_info.image_links = None;
                Ok(v)
            }
            _ => Ok(volume(id, &format!("Book {}", id))),
        }
    }
}

struct TestApp {
    base: String,
    client: Client,
}

async fn spawn_app_with(config: AppConfig, fail: bool) -> TestApp {
    let pool = repository::connect(&DatabaseConfig {
        url: "sqlite::memory:".to_string(),
        max_connections: 1,
        min_connections: 1,
    })
    .await
    .expect("Failed to open in-memory database");

    let state = AppState::new(Arc::new(config), pool, Arc::new(FakeCatalog { fail }));
    let app = api::router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("No local address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server failed");
    });

    let client = Client::builder()
        .redirect(Policy::none())
        .build()
        .expect("Failed to build client");

    TestApp {
        base: format!("http://{}", addr),
        client,
    }
}

async fn spawn_app() -> TestApp {
    spawn_app_with(AppConfig::default(), false).await
}

/// Value of cookie `name` from the response's Set-Cookie headers
fn cookie_value(response: &Response, name: &str) -> Option<String> {
    let prefix = format!("{}=", name);
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with(&prefix))
        .map(|v| v[prefix.len()..].split(';').next().unwrap_or_default().to_string())
}

fn location(response: &Response) -> &str {
    response
        .headers()
        .get(LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

impl TestApp {
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    async fn get(&self, path: &str, session: Option<&str>) -> Response {
        let mut request = self.client.get(self.url(path));
        if let Some(token) = session {
            request = request.header(COOKIE, format!("session={}", token));
        }
        request.send().await.expect("Failed to send request")
    }

    async fn post_form(&self, path: &str, form: &[(&str, &str)], session: Option<&str>) -> Response {
        let mut request = self.client.post(self.url(path)).form(form);
        if let Some(token) = session {
            request = request.header(COOKIE, format!("session={}", token));
        }
        request.send().await.expect("Failed to send request")
    }

    async fn register(&self, email: &str, name: &str, password: &str) -> Response {
        self.post_form(
            "/register",
            &[("email", email), ("name", name), ("password", password)],
            None,
        )
        .await
    }

    /// Register and return the session token
    async fn signup(&self, email: &str, name: &str) -> String {
        let response = self.register(email, name, "spice-must-flow").await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        cookie_value(&response, "session").expect("No session cookie")
    }
}

#[tokio::test]
async fn test_health_check() {
    let app = spawn_app().await;

    let response = app.get("/health", None).await;
    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");

    let response = app.get("/ready", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
async fn test_anonymous_home_shows_landing() {
    let app = spawn_app().await;

    let response = app.get("/", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.text().await.unwrap();
    assert!(body.contains("Your personal library"));
    assert!(!body.contains("Find a book"));
}

#[tokio::test]
async fn test_anonymous_search_post_without_body_shows_landing() {
    let app = spawn_app().await;

    let response = app.client.post(app.url("/")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.text().await.unwrap();
    assert!(body.contains("Your personal library"));

    let token = app.signup("paul@arrakis.org", "Paul").await;
    let response = app
        .client
        .post(app.url("/"))
        .header(COOKIE, format!("session={}", token))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_register_establishes_session() {
    let app = spawn_app().await;

    let response = app.register("paul@arrakis.org", "Paul", "spice").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
    let token = cookie_value(&response, "session").expect("No session cookie");

    let body = app.get("/", Some(&token)).await.text().await.unwrap();
    assert!(body.contains("Find a book"));
    assert!(body.contains("Paul"));

    // Logged-in users are sent home from the anonymous-only pages
    let response = app.get("/register", Some(&token)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
}

#[tokio::test]
async fn test_duplicate_registration_flashes_and_redirects_to_login() {
    let app = spawn_app().await;
    app.signup("paul@arrakis.org", "Paul").await;

    let response = app.register("paul@arrakis.org", "Impostor", "other").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");
    assert!(cookie_value(&response, "session").is_none());
    let flash = cookie_value(&response, "flash").expect("No flash cookie");

    let login_page = app
        .client
        .get(app.url("/login"))
        .header(COOKIE, format!("flash={}", flash))
        .send()
        .await
        .unwrap();
    let cleared = cookie_value(&login_page, "flash");
    assert_eq!(cleared.as_deref(), Some(""));
    let body = login_page.text().await.unwrap();
    assert!(body.contains("Email already exists! Try logging in instead."));

    // The original account still logs in with its own password
    let response = app
        .post_form(
            "/login",
            &[("email", "paul@arrakis.org"), ("password", "spice-must-flow")],
            None,
        )
        .await;
    assert_eq!(location(&response), "/");
}

#[tokio::test]
async fn test_invalid_registration_form_is_rerendered() {
    let app = spawn_app().await;

    let response = app.register("not-an-email", "Paul", "spice").await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = response.text().await.unwrap();
    assert!(body.contains("Please enter a valid email address"));
}

#[tokio::test]
async fn test_login_failures_are_uniform() {
    let app = spawn_app().await;
    app.signup("jessica@arrakis.org", "Jessica").await;

    let wrong_password = app
        .post_form(
            "/login",
            &[("email", "jessica@arrakis.org"), ("password", "nope")],
            None,
        )
        .await;
    let unknown_email = app
        .post_form(
            "/login",
            &[("email", "nobody@arrakis.org"), ("password", "nope")],
            None,
        )
        .await;

    for response in [&wrong_password, &unknown_email] {
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(response), "/login");
        assert!(cookie_value(response, "session").is_none());
    }
    assert_eq!(
        cookie_value(&wrong_password, "flash"),
        cookie_value(&unknown_email, "flash")
    );

    let response = app
        .post_form(
            "/login",
            &[("email", "Jessica@Arrakis.org"), ("password", "spice-must-flow")],
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
    assert!(cookie_value(&response, "session").is_some());
}

#[tokio::test]
async fn test_logout_clears_session() {
    let app = spawn_app().await;
    let token = app.signup("paul@arrakis.org", "Paul").await;

    let response = app.get("/logout", Some(&token)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
    assert_eq!(cookie_value(&response, "session").as_deref(), Some(""));
}

#[tokio::test]
async fn test_forged_session_is_anonymous() {
    let app = spawn_app().await;

    let body = app.get("/", Some("not-a-token")).await.text().await.unwrap();
    assert!(body.contains("Your personal library"));
}

#[tokio::test]
async fn test_search_requires_login() {
    let app = spawn_app().await;

    let response = app.get("/search/dune", None).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");
    assert!(cookie_value(&response, "flash").is_some());
}

#[tokio::test]
async fn test_search_form_redirects_to_search_page() {
    let app = spawn_app().await;
    let token = app.signup("paul@arrakis.org", "Paul").await;

    let response = app.post_form("/", &[("title", "children of dune")], Some(&token)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/search/children%20of%20dune");

    let response = app.post_form("/", &[("title", "")], Some(&token)).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_search_renders_five_colored_results_in_order() {
    let app = spawn_app().await;
    let token = app.signup("paul@arrakis.org", "Paul").await;

    let response = app.get("/search/dune", Some(&token)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.text().await.unwrap();

    assert!(body.contains("<h1>Dune</h1>"));
    assert_eq!(body.matches(r#"<article class="book""#).count(), 5);

    let mut cursor = 0;
    for (idx, color) in PALETTE.iter().take(5).enumerate() {
        let title = format!("dune volume {}", idx);
        let title_at = body[cursor..].find(&title).expect("result missing or out of order") + cursor;
        let color_at = body[cursor..].find(color).expect("color missing") + cursor;
        assert!(color_at < title_at);
        cursor = title_at;
    }
    assert!(!body.contains("dune volume 5"));
}

#[tokio::test]
async fn test_checkout_is_idempotent_per_catalog_id() {
    let app = spawn_app().await;
    let first = app.signup("first@arrakis.org", "First").await;
    let second = app.signup("second@arrakis.org", "Second").await;

    let body = app.post_form("/checkout/vol1", &[], Some(&first)).await.text().await.unwrap();
    assert!(body.contains("Enjoy your book!"));
    assert!(body.contains("Book vol1"));

    let body = app.get("/checkout/vol1", Some(&first)).await.text().await.unwrap();
    assert!(body.contains("already in your collection"));

    let body = app.post_form("/checkout/vol1", &[], Some(&second)).await.text().await.unwrap();
    assert!(body.contains("already checked out"));

    let body = app.get("/collection", Some(&first)).await.text().await.unwrap();
    assert_eq!(body.matches("Book vol1").count(), 1);

    let body = app.get("/collection", Some(&second)).await.text().await.unwrap();
    assert!(!body.contains("Book vol1"));
}

#[tokio::test]
async fn test_checkout_without_image_links_is_rejected() {
    let app = spawn_app().await;
    let token = app.signup("paul@arrakis.org", "Paul").await;

    let response = app.post_form("/checkout/noimage", &[], Some(&token)).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = response.text().await.unwrap();
    assert!(body.contains("no cover image"));

    let response = app.post_form("/checkout/missing", &[], Some(&token)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_catalog_failure_renders_error_page() {
    let app = spawn_app_with(AppConfig::default(), true).await;
    let token = app.signup("paul@arrakis.org", "Paul").await;

    let response = app.get("/search/dune", Some(&token)).await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = response.text().await.unwrap();
    assert!(body.contains("The book catalog is unavailable right now."));
    assert!(!body.contains("connection refused"));
}

#[tokio::test]
async fn test_admin_route_permissions() {
    let app = spawn_app().await;
    let admin = app.signup("leto@arrakis.org", "Leto").await;
    let member = app.signup("gurney@arrakis.org", "Gurney").await;

    let response = app.get("/admin/users", None).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app.get("/admin/users", Some(&member)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app.get("/admin/users", Some(&admin)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.text().await.unwrap();
    assert!(body.contains("leto@arrakis.org"));
    assert!(body.contains("gurney@arrakis.org"));
}

#[tokio::test]
async fn test_admin_role_from_configured_emails() {
    let mut config = AppConfig::default();
    config.auth.first_user_is_admin = false;
    config.auth.admin_emails = vec!["mentat@arrakis.org".to_string()];
    let app = spawn_app_with(config, false).await;

    let member = app.signup("leto@arrakis.org", "Leto").await;
    let admin = app.signup("mentat@arrakis.org", "Thufir").await;

    assert_eq!(app.get("/admin/users", Some(&member)).await.status(), StatusCode::FORBIDDEN);
    assert_eq!(app.get("/admin/users", Some(&admin)).await.status(), StatusCode::OK);
}
