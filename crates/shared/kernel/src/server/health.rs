use async_trait::async_trait;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::{Json, response::IntoResponse};
use std::fmt::Debug;
use std::sync::LazyLock;
use std::time::Instant;
use svault_derive::{api_handler, api_model};
use svault_domain::constants::SYSTEM_TAG;
use tracing::warn;

use super::ApiState;

/// A dependency whose reachability is part of the health report.
#[async_trait]
pub trait HealthCheck: Debug + Send + Sync {
    /// Short label shown in the report (e.g. `"database"`).
    fn name(&self) -> &'static str;

    async fn healthy(&self) -> bool;
}

#[api_model]
/// Outcome of one dependency probe
struct CheckReport {
    name: &'static str,
    healthy: bool,
}

#[api_model]
/// Health check response
struct HealthResponse {
    /// `up`, or `degraded` when a dependency probe fails
    status: &'static str,
    version: &'static str,
    /// Uptime in seconds
    uptime: u64,
    /// Where vault entries are kept (`database` or `memory`)
    store: &'static str,
    /// Registered feature slices
    slices: Vec<String>,
    checks: Vec<CheckReport>,
}

static START_TIME: LazyLock<Instant> = LazyLock::new(Instant::now);

#[api_handler(
    get,
    path = "/health",
    responses(
        (status = OK, description = "Service and its dependencies are up", body = HealthResponse),
        (status = SERVICE_UNAVAILABLE, description = "A dependency probe failed", body = HealthResponse),
    ),
    tag = SYSTEM_TAG,
)]
pub(super) async fn health_handler(State(state): State<ApiState>) -> impl IntoResponse {
    let mut checks = Vec::with_capacity(state.health_checks().len());
    for check in state.health_checks() {
        let healthy = check.healthy().await;
        if !healthy {
            warn!(check = check.name(), "Health probe failed");
        }
        checks.push(CheckReport { name: check.name(), healthy });
    }

    let degraded = checks.iter().any(|check| !check.healthy);
    let mut slices: Vec<String> = state.slice_names().map(str::to_owned).collect();
    slices.sort_unstable();

    let body = HealthResponse {
        status: if degraded { "degraded" } else { "up" },
        version: env!("CARGO_PKG_VERSION"),
        uptime: START_TIME.elapsed().as_secs(),
        store: state.config.vault.store.as_str(),
        slices,
        checks,
    };
    let status = if degraded { StatusCode::SERVICE_UNAVAILABLE } else { StatusCode::OK };

    (
        status,
        [
            (header::CACHE_CONTROL, "no-store, no-cache, must-revalidate"),
            (header::PRAGMA, "no-cache"),
        ],
        Json(body),
    )
}
