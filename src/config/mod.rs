// src/config/mod.rs
mod models;

pub use models::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Prefix for environment overrides, e.g. `DASHBOARD_ENDPOINTS__SERVICE_A_URL`.
pub const ENV_PREFIX: &str = "DASHBOARD";

/// Load configuration from an optional file (YAML or JSON), then layer
/// `DASHBOARD_*` environment variables on top.
pub async fn load_config<P: AsRef<Path>>(path: Option<P>) -> Result<DashboardConfig> {
    let base = match path {
        Some(path) => read_config_file(path.as_ref()).await?,
        None => DashboardConfig::default(),
    };

    let config = apply_env_overrides(&base, config::Environment::with_prefix(ENV_PREFIX))?;
    config.validate()?;
    Ok(config)
}

async fn read_config_file(path: &Path) -> Result<DashboardConfig> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read config file {}", path.display()))?;

    let config: DashboardConfig = match path.extension().and_then(|s| s.to_str()) {
        Some("yaml") | Some("yml") => {
            serde_yaml::from_str(&contents).context("Failed to parse YAML config")?
        }
        _ => serde_json::from_str(&contents).context("Failed to parse JSON config")?,
    };

    Ok(config)
}

/// Overlay an environment source on an already-parsed config. Takes the
/// source explicitly so tests can feed a fixed map instead of the process env.
pub fn apply_env_overrides(
    base: &DashboardConfig,
    env: config::Environment,
) -> Result<DashboardConfig> {
    let settings = config::Config::builder()
        .add_source(config::Config::try_from(base).context("Failed to seed config")?)
        .add_source(env.prefix_separator("_").separator("__").try_parsing(true))
        .build()
        .context("Failed to merge environment config")?;

    settings
        .try_deserialize()
        .context("Failed to deserialize merged config")
}
