//! Well-known names used across crates.

/// Service name used for log file prefixes and the OpenAPI title.
pub const SERVICE_NAME: &str = "svault";

/// Table holding one document per vault entry.
pub const VAULT_TABLE: &str = "vault";

/// Slice key used for migrations and logging.
pub const VAULT_SLICE: &str = "vault";

/// Legacy process-wide passphrase. Only suitable for development and for reading data
/// written by deployments that never changed it.
pub const DEFAULT_VAULT_PASSPHRASE: &str = "default-key-change-in-production";

/// Prefix of environment variables that override the config file.
pub const ENV_PREFIX: &str = "SVAULT";

/// Default config file looked up next to the binary.
pub const DEFAULT_CONFIG_FILE: &str = "server.toml";

/// OpenAPI tag for operational endpoints.
pub const SYSTEM_TAG: &str = "System";

/// OpenAPI tag for the vault routes.
pub const VAULT_TAG: &str = "Vault";
