use chrono::{Duration as ChronoDuration, Utc};
use catalog_auth::{JwtClaims, PrincipalId, Role};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::StatusCode;
use serde_json::{Value, json};

const SECRET: &str = "test-secret";
const ADMIN_EMAIL: &str = "root@example.com";
const ADMIN_PASSWORD: &str = "root_pass_123";

struct TestServer {
    base_url: String,
    client: reqwest::Client,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Same router as prod, bound to an ephemeral port.
        let config = catalog_api::config::ApiConfig::from_lookup(|key| match key {
            "JWT_SECRET" => Some(SECRET.to_string()),
            "CATALOG_ADMIN_EMAIL" => Some(ADMIN_EMAIL.to_string()),
            "CATALOG_ADMIN_PASSWORD" => Some(ADMIN_PASSWORD.to_string()),
            _ => None,
        })
        .expect("test config");
        let app = catalog_api::app::build_app(&config).expect("catalog startup");
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            client: reqwest::Client::new(),
            handle,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post(&self, token: &str, path: &str, body: Value) -> (StatusCode, Value) {
        let res = self.client.post(self.url(path)).bearer_auth(token).json(&body).send().await.unwrap();
        let status = res.status();
        (status, res.json().await.unwrap_or(Value::Null))
    }

    async fn post_anonymous(&self, path: &str, body: Value) -> (StatusCode, Value) {
        let res = self.client.post(self.url(path)).json(&body).send().await.unwrap();
        let status = res.status();
        (status, res.json().await.unwrap_or(Value::Null))
    }

    async fn sign_in(&self, email: &str, password: &str) -> String {
        let (status, body) = self
            .post_anonymous("/users/token", json!({ "email": email, "password": password }))
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body["token"].as_str().unwrap().to_string()
    }

    async fn patch(&self, token: &str, path: &str, body: Value) -> (StatusCode, Value) {
        let res = self.client.patch(self.url(path)).bearer_auth(token).json(&body).send().await.unwrap();
        let status = res.status();
        (status, res.json().await.unwrap_or(Value::Null))
    }

    async fn get(&self, token: &str, path: &str) -> (StatusCode, Value) {
        let res = self.client.get(self.url(path)).bearer_auth(token).send().await.unwrap();
        let status = res.status();
        (status, res.json().await.unwrap_or(Value::Null))
    }

    async fn delete(&self, token: &str, path: &str) -> StatusCode {
        self.client.delete(self.url(path)).bearer_auth(token).send().await.unwrap().status()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn mint_jwt(principal: PrincipalId, roles: &[&'static str]) -> String {
    let now = Utc::now();
    let claims = JwtClaims {
        sub: principal,
        roles: roles.iter().map(|r| Role::new(*r)).collect(),
        issued_at: now,
        expires_at: now + ChronoDuration::minutes(10),
    };

    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .expect("failed to encode jwt")
}

fn editor() -> String {
    mint_jwt(PrincipalId::new(), &["editor"])
}

#[tokio::test]
async fn health_is_public_and_catalog_requires_auth() {
    let srv = TestServer::spawn().await;

    let res = srv.client.get(srv.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = srv.client.get(srv.url("/categories")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = srv.client.get(srv.url("/whoami")).bearer_auth("garbage").send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn whoami_reflects_token() {
    let srv = TestServer::spawn().await;
    let principal = PrincipalId::new();
    let token = mint_jwt(principal, &["viewer"]);

    let (status, body) = srv.get(&token, "/whoami").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["principal_id"].as_str().unwrap(), principal.to_string());
    assert_eq!(body["permissions"], json!(["catalog.read"]));
}

#[tokio::test]
async fn viewer_cannot_write() {
    let srv = TestServer::spawn().await;
    let token = mint_jwt(PrincipalId::new(), &["viewer"]);

    let (status, body) = srv.post(&token, "/brands", json!({ "name": "Acme" })).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "forbidden");

    let (status, _) = srv.get(&token, "/brands").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn product_line_ordering_lifecycle() {
    let srv = TestServer::spawn().await;
    let token = editor();

    let (status, product) = srv.post(&token, "/products", json!({ "name": "Trail Shoe" })).await;
    assert_eq!(status, StatusCode::CREATED);
    let slug = product["slug"].as_str().unwrap().to_string();
    assert!(slug.starts_with("trail-shoe-"));

    let lines_path = format!("/products/{slug}/lines");
    let mut orderings = Vec::new();
    for sku in ["red", "green", "blue"] {
        let (status, line) = srv.post(&token, &lines_path, json!({ "sku": sku, "price": 8900, "stock_qty": 4 })).await;
        assert_eq!(status, StatusCode::CREATED);
        orderings.push(line["ordering"].as_u64().unwrap());
    }
    assert_eq!(orderings, vec![1, 2, 3]);

    let (status, body) = srv.post(&token, &lines_path, json!({ "sku": "black", "price": 1, "ordering": 2 })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "duplicate_ordering");

    let (status, body) = srv.post(&token, &lines_path, json!({ "sku": "white", "price": 1, "ordering": 0 })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");

    let (status, detail) = srv.get(&token, &format!("/products/{slug}")).await;
    assert_eq!(status, StatusCode::OK);
    let skus: Vec<&str> = detail["lines"].as_array().unwrap().iter().map(|l| l["sku"].as_str().unwrap()).collect();
    assert_eq!(skus, vec!["red", "green", "blue"]);

    let (status, _) = srv.post(&token, "/products/no-such-product/lines", json!({ "sku": "x", "price": 1 })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn images_are_ordered_within_their_line() {
    let srv = TestServer::spawn().await;
    let token = editor();

    let (_, product) = srv.post(&token, "/products", json!({ "name": "Lamp" })).await;
    let slug = product["slug"].as_str().unwrap();
    let (_, line) = srv.post(&token, &format!("/products/{slug}/lines"), json!({ "sku": "brass", "price": 10 })).await;
    let line_id = line["id"].as_str().unwrap();

    let (status, first) = srv.post(&token, "/images", json!({ "product_line": line_id, "alt_text": "front" })).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(first["ordering"], 1);

    let image_id = first["id"].as_str().unwrap();
    let (status, uploaded) = srv.post(&token, &format!("/images/{image_id}/upload"), json!({ "filename": "front.jpg" })).await;
    assert_eq!(status, StatusCode::OK);
    assert!(uploaded["image"].as_str().unwrap().ends_with(".jpg"));

    let (status, _) = srv.patch(&token, &format!("/images/{image_id}"), json!({ "ordering": 5 })).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn category_tree_rules_over_http() {
    let srv = TestServer::spawn().await;
    let token = editor();

    let (_, c) = srv.post(&token, "/categories", json!({ "name": "Outdoor" })).await;
    let c_id = c["id"].as_str().unwrap().to_string();
    let (_, d) = srv.post(&token, "/categories", json!({ "name": "Tents", "parent": c_id })).await;
    let d_id = d["id"].as_str().unwrap().to_string();
    let (_, f) = srv.post(&token, "/categories", json!({ "name": "Dome Tents", "parent": d_id })).await;
    let f_id = f["id"].as_str().unwrap().to_string();

    let (status, body) = srv.patch(&token, &format!("/categories/{c_id}"), json!({ "parent": f_id })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "cyclic_parent");

    let (status, below) = srv.get(&token, &format!("/categories/{c_id}/descendants?include_self=true")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(below.as_array().unwrap().len(), 3);

    srv.post(&token, "/products", json!({ "name": "Two Person Dome", "category": f_id })).await;
    let (_, listed) = srv.get(&token, "/products?category=Outdoor").await;
    assert_eq!(listed.as_array().unwrap().len(), 1);

    assert_eq!(srv.delete(&token, &format!("/categories/{d_id}")).await, StatusCode::OK);
    let (_, orphan) = srv.get(&token, &format!("/categories/{f_id}")).await;
    assert!(orphan["parent"].is_null());

    let (status, _) = srv.get(&token, "/categories/not-a-uuid").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn catalogs_are_isolated_per_owner() {
    let srv = TestServer::spawn().await;
    let alice = editor();
    let bob = editor();

    let (_, brand) = srv.post(&alice, "/brands", json!({ "name": "Acme" })).await;
    let brand_id = brand["id"].as_str().unwrap();

    let (status, _) = srv.get(&bob, &format!("/brands/{brand_id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (_, bobs) = srv.get(&bob, "/brands").await;
    assert!(bobs.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn attributes_with_variations_link_to_lines() {
    let srv = TestServer::spawn().await;
    let token = editor();

    let (status, attr) = srv
        .post(&token, "/attributes", json!({ "name": "Color", "variations": ["Red", "Blue"] }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(attr["name"], "color");
    let red = attr["variations"].as_array().unwrap().iter().find(|v| v["name"] == "Red").unwrap()["id"]
        .as_str()
        .unwrap()
        .to_string();

    let (_, product) = srv.post(&token, "/products", json!({ "name": "Tee" })).await;
    let slug = product["slug"].as_str().unwrap();
    let (_, line) = srv.post(&token, &format!("/products/{slug}/lines"), json!({ "sku": "tee-red", "price": 1500 })).await;
    let line_id = line["id"].as_str().unwrap();

    let link = format!("/product-lines/{line_id}/variations/{red}");
    let (status, _) = srv.post(&token, &link, json!({})).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = srv.post(&token, &link, json!({})).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, detail) = srv.get(&token, &format!("/products/{slug}")).await;
    assert_eq!(detail["lines"][0]["variations"][0]["name"], "Red");

    assert_eq!(srv.delete(&token, &link).await, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn registration_normalizes_email_and_hides_password() {
    let srv = TestServer::spawn().await;

    let (status, user) = srv
        .post_anonymous("/users", json!({ "email": "sample_one@EXAMPLE.com", "password": "test_pass123" }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(user["email"], "sample_one@example.com");
    assert_eq!(user["name"], "sample_one");
    assert!(user.get("password").is_none());

    let (status, body) = srv
        .post_anonymous("/users", json!({ "email": "sample_one@example.com", "password": "test_pass123" }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "conflict");

    let (status, body) = srv
        .post_anonymous("/users", json!({ "email": "short@example.com", "password": "pw" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");

    let (status, _) = srv.post_anonymous("/users", json!({ "email": "", "password": "test_pass123" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn issued_token_signs_in_to_the_catalog() {
    let srv = TestServer::spawn().await;
    let (_, user) = srv
        .post_anonymous(
            "/users",
            json!({ "email": "writer@example.com", "name": "Writer", "password": "test_pass123" }),
        )
        .await;

    let (status, body) = srv
        .post_anonymous("/users/token", json!({ "email": "writer@example.com", "password": "wrong_pass" }))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "invalid_credentials");

    let token = srv.sign_in("writer@example.com", "test_pass123").await;
    let (status, who) = srv.get(&token, "/whoami").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(who["principal_id"], user["id"]);
    assert_eq!(who["roles"], json!(["editor"]));

    let (status, _) = srv.post(&token, "/brands", json!({ "name": "Acme" })).await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn configured_admin_signs_in_as_admin() {
    let srv = TestServer::spawn().await;
    let token = srv.sign_in(ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let (_, who) = srv.get(&token, "/whoami").await;
    assert_eq!(who["roles"], json!(["admin"]));
    let (_, me) = srv.get(&token, "/users/me").await;
    assert_eq!(me["is_staff"], true);
}

#[tokio::test]
async fn own_profile_read_update_delete() {
    let srv = TestServer::spawn().await;
    srv.post_anonymous("/users", json!({ "email": "self@example.com", "password": "test_pass123" }))
        .await;
    let token = srv.sign_in("self@example.com", "test_pass123").await;

    let res = srv.client.get(srv.url("/users/me")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let (status, me) = srv.get(&token, "/users/me").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["email"], "self@example.com");

    let (status, body) = srv.patch(&token, "/users/me", json!({ "password": "short" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");

    let (status, me) = srv
        .patch(&token, "/users/me", json!({ "name": "New Name", "password": "new_pass_456" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["name"], "New Name");
    srv.sign_in("self@example.com", "new_pass_456").await;

    assert_eq!(srv.delete(&token, "/users/me").await, StatusCode::NO_CONTENT);
    let (status, _) = srv.get(&token, "/users/me").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = srv
        .post_anonymous("/users/token", json!({ "email": "self@example.com", "password": "new_pass_456" }))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn minted_principal_without_account_has_no_profile() {
    let srv = TestServer::spawn().await;
    let (status, _) = srv.get(&editor(), "/users/me").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
