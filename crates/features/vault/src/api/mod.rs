//! HTTP surface of the vault slice.

pub mod dto;
mod handlers;

use svault_kernel::server::ApiState;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

/// `/vault` routes; every one of them requires a bearer token.
pub fn router() -> OpenApiRouter<ApiState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::list_entries, handlers::create_entry))
        .routes(routes!(handlers::get_entry, handlers::update_entry, handlers::delete_entry))
        .routes(routes!(handlers::generate_password))
}
