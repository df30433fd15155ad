//! Configuration file resolution and loading.

use std::path::PathBuf;

use phone_scout::{ScoutConfig, ScoutResult};

/// Environment variable naming a configuration file.
pub const CONFIG_ENV: &str = "PHONE_SCOUT_CONFIG";

/// Configuration file looked up in the working directory.
pub const CWD_CONFIG: &str = "phone-scout.json";

/// Resolve the configuration path: explicit flag, then env var, then the
/// working directory. `None` means run on built-in defaults.
pub fn resolve_config_path(explicit: Option<&str>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(PathBuf::from(path));
    }

    if let Ok(env_path) = std::env::var(CONFIG_ENV) {
        if !env_path.trim().is_empty() {
            return Some(PathBuf::from(env_path));
        }
    }

    let cwd_config = PathBuf::from(CWD_CONFIG);
    if cwd_config.exists() {
        return Some(cwd_config);
    }

    None
}

/// Load the resolved configuration, or defaults when no file is found.
pub fn load_config(explicit: Option<&str>) -> ScoutResult<ScoutConfig> {
    match resolve_config_path(explicit) {
        Some(path) => {
            tracing::info!("Config: {}", path.display());
            ScoutConfig::load(&path)
        }
        None => {
            tracing::info!("Config: built-in defaults");
            Ok(ScoutConfig::default())
        }
    }
}
