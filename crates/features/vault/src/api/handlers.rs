use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use svault_derive::api_handler;
use svault_domain::constants::VAULT_TAG;
use svault_kernel::security::Principal;
use svault_kernel::server::{ApiError, ApiJson, ApiQuery, ApiState, ErrorBody};

use super::dto::{
    EntryListResponse, EntryMessageResponse, EntryResponse, GeneratedPasswordResponse,
    ListQuery, MessageResponse,
};
use crate::Vault;
use crate::generator::PasswordOptions;
use crate::model::EntryFields;

#[api_handler(
    get,
    path = "/vault",
    params(ListQuery),
    responses(
        (status = OK, description = "Entries of the caller, newest first", body = EntryListResponse),
        (status = UNAUTHORIZED, body = ErrorBody),
    ),
    security(("bearer_auth" = [])),
    tag = VAULT_TAG,
)]
pub(super) async fn list_entries(
    State(state): State<ApiState>,
    principal: Principal,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> Result<Json<EntryListResponse>, ApiError> {
    let vault = state.try_get_slice::<Vault>()?;
    let vaults =
        vault.service.list_entries(principal.owner_id(), query.search.as_deref()).await?;

    Ok(Json(EntryListResponse { vaults }))
}

#[api_handler(
    post,
    path = "/vault",
    request_body = EntryFields,
    responses(
        (status = CREATED, description = "Entry stored", body = EntryMessageResponse),
        (status = BAD_REQUEST, description = "Title or password missing", body = ErrorBody),
        (status = UNAUTHORIZED, body = ErrorBody),
    ),
    security(("bearer_auth" = [])),
    tag = VAULT_TAG,
)]
pub(super) async fn create_entry(
    State(state): State<ApiState>,
    principal: Principal,
    ApiJson(fields): ApiJson<EntryFields>,
) -> Result<(StatusCode, Json<EntryMessageResponse>), ApiError> {
    let vault = state.try_get_slice::<Vault>()?;
    let entry = vault.service.create_entry(principal.owner_id(), fields).await?;

    Ok((
        StatusCode::CREATED,
        Json(EntryMessageResponse { message: "Vault entry created", vault: entry }),
    ))
}

#[api_handler(
    get,
    path = "/vault/{id}",
    params(("id" = String, Path, description = "Entry id")),
    responses(
        (status = OK, body = EntryResponse),
        (status = NOT_FOUND, body = ErrorBody),
        (status = UNAUTHORIZED, body = ErrorBody),
    ),
    security(("bearer_auth" = [])),
    tag = VAULT_TAG,
)]
pub(super) async fn get_entry(
    State(state): State<ApiState>,
    principal: Principal,
    Path(id): Path<String>,
) -> Result<Json<EntryResponse>, ApiError> {
    let vault = state.try_get_slice::<Vault>()?;
    let entry = vault.service.get_entry(principal.owner_id(), &id).await?;

    Ok(Json(EntryResponse { vault: entry }))
}

#[api_handler(
    put,
    path = "/vault/{id}",
    params(("id" = String, Path, description = "Entry id")),
    request_body = EntryFields,
    responses(
        (status = OK, description = "Entry updated", body = EntryMessageResponse),
        (status = NOT_FOUND, body = ErrorBody),
        (status = UNAUTHORIZED, body = ErrorBody),
    ),
    security(("bearer_auth" = [])),
    tag = VAULT_TAG,
)]
pub(super) async fn update_entry(
    State(state): State<ApiState>,
    principal: Principal,
    Path(id): Path<String>,
    ApiJson(fields): ApiJson<EntryFields>,
) -> Result<Json<EntryMessageResponse>, ApiError> {
    let vault = state.try_get_slice::<Vault>()?;
    let entry = vault.service.update_entry(principal.owner_id(), &id, fields).await?;

    Ok(Json(EntryMessageResponse { message: "Vault entry updated", vault: entry }))
}

#[api_handler(
    delete,
    path = "/vault/{id}",
    params(("id" = String, Path, description = "Entry id")),
    responses(
        (status = OK, description = "Entry deleted", body = MessageResponse),
        (status = NOT_FOUND, body = ErrorBody),
        (status = UNAUTHORIZED, body = ErrorBody),
    ),
    security(("bearer_auth" = [])),
    tag = VAULT_TAG,
)]
pub(super) async fn delete_entry(
    State(state): State<ApiState>,
    principal: Principal,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let vault = state.try_get_slice::<Vault>()?;
    vault.service.delete_entry(principal.owner_id(), &id).await?;

    Ok(Json(MessageResponse { message: "Vault entry deleted" }))
}

#[api_handler(
    get,
    path = "/vault/generate-password",
    params(PasswordOptions),
    responses(
        (status = OK, body = GeneratedPasswordResponse),
        (status = BAD_REQUEST, description = "No character class selected", body = ErrorBody),
        (status = UNAUTHORIZED, body = ErrorBody),
    ),
    security(("bearer_auth" = [])),
    tag = VAULT_TAG,
)]
pub(super) async fn generate_password(
    _principal: Principal,
    ApiQuery(options): ApiQuery<PasswordOptions>,
) -> Result<Json<GeneratedPasswordResponse>, ApiError> {
    let password = options.generate()?;

    Ok(Json(GeneratedPasswordResponse { length: password.len(), password }))
}
