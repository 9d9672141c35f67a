use serde::Deserialize;
use svault_derive::api_model;

use crate::model::VaultEntry;

/// `GET /vault` query.
#[derive(Debug, Default, Deserialize)]
#[cfg_attr(feature = "server", derive(utoipa::IntoParams), into_params(parameter_in = Query))]
pub struct ListQuery {
    /// Case-insensitive substring of the title (and username, when enabled)
    pub search: Option<String>,
}

#[api_model]
pub struct EntryListResponse {
    pub vaults: Vec<VaultEntry>,
}

#[api_model]
pub struct EntryResponse {
    pub vault: VaultEntry,
}

#[api_model]
pub struct EntryMessageResponse {
    pub message: &'static str,
    pub vault: VaultEntry,
}

#[api_model]
pub struct MessageResponse {
    pub message: &'static str,
}

#[api_model]
pub struct GeneratedPasswordResponse {
    pub password: String,
    pub length: usize,
}
