mod config;

pub use config::{AudioConfig, Config};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns `~/.config/shotclock[-dev]/` based on SHOTCLOCK_ENV.
///
/// Set SHOTCLOCK_ENV=dev to use a separate development data directory.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("SHOTCLOCK_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("shotclock-dev")
    } else {
        base_dir.join("shotclock")
    };

    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::DirUnavailable {
        path: dir.clone(),
        message: e.to_string(),
    })?;
    Ok(dir)
}
