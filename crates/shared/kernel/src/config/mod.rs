use config::{Config, Environment, File};
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use svault_domain::constants::{DEFAULT_CONFIG_FILE, ENV_PREFIX};
use tracing::info;

#[svault_derive::svault_error]
pub enum ConfigError {
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },
}

/// Loads configuration from a file overlaid with environment overrides.
///
/// 1. **Base File**: `path` when given (must exist), otherwise `server.toml` in the
///    working directory (optional, so a deployment can run from the environment alone).
/// 2. **Environment Overrides**: variables prefixed with `SVAULT__`, nested with double
///    underscores (`SVAULT__SECURITY__JWT__SECRET` maps to `security.jwt.secret`).
///
/// # Errors
/// * An explicitly given file is missing or unreadable.
/// * The merged values do not deserialize into `T`.
///
/// # Example
/// ```rust
/// use svault_kernel::config::load_config;
///
/// #[derive(Default, serde::Deserialize)]
/// struct AppConfig {
///     port: u16,
/// }
///
/// let cfg: AppConfig = load_config(Some("config/local.toml")).unwrap_or_default();
/// ```
pub fn load_config<T>(path: Option<impl AsRef<Path>>) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let (effective_path, required) = path.map_or_else(
        || (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        |p| (p.as_ref().to_path_buf(), true),
    );

    let builder = Config::builder()
        .add_source(File::from(effective_path.as_path()).required(required))
        .add_source(Environment::with_prefix(ENV_PREFIX).separator("__").try_parsing(true));

    info!(path = %effective_path.display(), required, "Loading config");

    let config = builder
        .build()
        .context("Failed to build config")?
        .try_deserialize::<T>()
        .context("Failed to deserialize config")?;

    Ok(config)
}
