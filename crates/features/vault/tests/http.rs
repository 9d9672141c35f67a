use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use jsonwebtoken::{EncodingKey, Header, encode};
use serde_json::{Value, json};
use svault_domain::config::{ApiConfig, StoreKind};
use svault_kernel::server::ApiState;
use tower::ServiceExt;

const SECRET: &str = "http-test-secret";

fn config() -> ApiConfig {
    let mut config = ApiConfig::default();
    config.security.jwt.secret = SECRET.to_owned();
    config.vault.store = StoreKind::Memory;
    config
}

fn app_with(state: ApiState) -> Router {
    svault_vault::api::router().with_state(state).into()
}

fn app() -> Router {
    let config = config();
    let slice = svault_vault::init(&config.vault, None).expect("vault slice");
    app_with(ApiState::builder().config(config).register_slice(slice).build().expect("state"))
}

fn token(owner: &str) -> String {
    let claims = json!({ "userId": owner, "exp": jsonwebtoken::get_current_timestamp() + 600 });
    encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET.as_bytes())).unwrap()
}

async fn call(app: &Router, method: Method, uri: &str, owner: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(owner) = owner {
        request = request.header(header::AUTHORIZATION, format!("Bearer {}", token(owner)));
    }
    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
    (status, value)
}

#[tokio::test]
async fn every_route_requires_a_principal() {
    let app = app();
    let routes = [
        (Method::GET, "/vault"),
        (Method::POST, "/vault"),
        (Method::GET, "/vault/abc"),
        (Method::PUT, "/vault/abc"),
        (Method::DELETE, "/vault/abc"),
        (Method::GET, "/vault/generate-password"),
    ];

    for (method, uri) in routes {
        let (status, body) = call(&app, method, uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
        assert_eq!(body, json!({ "error": "Unauthorized" }));
    }
}

#[tokio::test]
async fn create_list_update_delete_with_envelopes() {
    let app = app();

    let (status, body) = call(
        &app,
        Method::POST,
        "/vault",
        Some("alice"),
        Some(json!({ "title": "Work Gmail", "password": "U2FsdGVkX1+blob", "userId": "mallory" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Vault entry created");
    let entry = &body["vault"];
    assert_eq!(entry["ownerId"], "alice");
    assert_eq!(entry["username"], "");
    assert_eq!(entry["url"], "");
    assert_eq!(entry["notes"], "");
    assert!(entry["createdAt"].is_string());
    let id = entry["id"].as_str().unwrap().to_owned();

    call(&app, Method::POST, "/vault", Some("alice"), Some(json!({ "title": "Bank", "password": "x" }))).await;

    let (status, body) = call(&app, Method::GET, "/vault?search=gmail", Some("alice"), None).await;
    assert_eq!(status, StatusCode::OK);
    let vaults = body["vaults"].as_array().unwrap();
    assert_eq!(vaults.len(), 1);
    assert_eq!(vaults[0]["id"], id.as_str());

    let (_, body) = call(&app, Method::GET, "/vault", Some("mallory"), None).await;
    assert_eq!(body, json!({ "vaults": [] }));

    let (status, body) = call(
        &app,
        Method::PUT,
        &format!("/vault/{id}"),
        Some("alice"),
        Some(json!({ "notes": "", "url": "https://mail.example", "title": "" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Vault entry updated");
    assert_eq!(body["vault"]["title"], "Work Gmail");
    assert_eq!(body["vault"]["url"], "https://mail.example");

    let (status, body) = call(&app, Method::GET, &format!("/vault/{id}"), Some("alice"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["vault"]["url"], "https://mail.example");

    let (status, body) = call(&app, Method::DELETE, &format!("/vault/{id}"), Some("alice"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "Vault entry deleted" }));

    let (status, body) = call(&app, Method::DELETE, &format!("/vault/{id}"), Some("alice"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Vault entry not found" }));
}

#[tokio::test]
async fn foreign_entries_are_not_found() {
    let app = app();
    let (_, body) = call(&app, Method::POST, "/vault", Some("alice"), Some(json!({ "title": "t", "password": "p" }))).await;
    let uri = format!("/vault/{}", body["vault"]["id"].as_str().unwrap());

    for (method, payload) in [
        (Method::GET, None),
        (Method::PUT, Some(json!({ "title": "pwned" }))),
        (Method::DELETE, None),
    ] {
        let (status, body) = call(&app, method, &uri, Some("mallory"), payload).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "error": "Vault entry not found" }));
    }
}

#[tokio::test]
async fn validation_and_malformed_bodies_are_bad_requests() {
    let app = app();

    let (status, body) =
        call(&app, Method::POST, "/vault", Some("alice"), Some(json!({ "title": "t" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Title and password are required" }));

    let (status, body) =
        call(&app, Method::POST, "/vault", Some("alice"), Some(json!({ "title": 5, "password": "p" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn generates_passwords_from_query_options() {
    let app = app();

    let (status, body) = call(
        &app,
        Method::GET,
        "/vault/generate-password?length=24&symbols=false&exclude_similar=true",
        Some("alice"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["length"], 24);
    let password = body["password"].as_str().unwrap();
    assert_eq!(password.len(), 24);
    assert!(password.chars().all(char::is_alphanumeric));

    let (status, body) = call(
        &app,
        Method::GET,
        "/vault/generate-password?uppercase=false&lowercase=false&numbers=false&symbols=false",
        Some("alice"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Please select at least one character type" }));
}

#[tokio::test]
async fn missing_slice_is_a_generic_internal_error() {
    let app = app_with(ApiState::builder().config(config()).build().unwrap());

    let (status, body) = call(&app, Method::GET, "/vault", Some("alice"), None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Internal server error" }));
}
