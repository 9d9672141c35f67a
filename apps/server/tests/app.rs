use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use svault_domain::config::{ApiConfig, StoreKind};
use svault_server::Server;
use tower::ServiceExt;

async fn get(server: &Server, uri: &str) -> (StatusCode, Vec<u8>) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let response = server.router().oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

fn memory_config() -> ApiConfig {
    let mut cfg = ApiConfig::default();
    cfg.vault.store = StoreKind::Memory;
    cfg
}

#[tokio::test]
async fn serves_health_docs_and_guarded_vault_routes() {
    let server = Server::builder().config(memory_config()).build().await.unwrap();
    assert_eq!(server.state().slice_names().collect::<Vec<_>>(), ["Vault"]);

    let (status, body) = get(&server, "/health").await;
    assert_eq!(status, StatusCode::OK);
    let health: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(health["status"], "up");
    assert_eq!(health["store"], "memory");
    assert_eq!(health["slices"], serde_json::json!(["Vault"]));

    let (status, body) = get(&server, "/api").await;
    assert_eq!(status, StatusCode::OK);
    let page = String::from_utf8(body).unwrap();
    assert!(page.contains("bearer_auth"));
    assert!(page.contains("/vault/generate-password"));

    let (status, _) = get(&server, "/vault").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn database_store_connects_and_migrates() {
    let server = Server::builder().build().await.unwrap();

    let (status, body) = get(&server, "/health").await;
    assert_eq!(status, StatusCode::OK);
    let health: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(health["store"], "database");
    assert_eq!(health["checks"], serde_json::json!([{ "name": "database", "healthy": true }]));

    let (status, _) = get(&server, "/vault").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn missing_certificates_fail_fast() {
    let mut cfg = memory_config();
    cfg.server.ssl = Some(svault_domain::config::SslConfig {
        cert: "/nonexistent/cert.pem".into(),
        key: "/nonexistent/key.pem".into(),
    });

    let err = Server::builder().config(cfg).build().await.unwrap_err();
    assert!(err.to_string().contains("SSL certificate not found"));
}
