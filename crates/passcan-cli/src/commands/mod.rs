//! Subcommands and the helpers they share.

pub mod batch;
pub mod config;
pub mod process;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use passcan_core::ocr::EngineFactory;
use passcan_core::PasscanConfig;

/// Default configuration file location.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("passcan")
        .join("config.json")
}

/// Load the configuration from `path`, else the default location, else
/// built-in defaults.
pub fn load_config(path: Option<&str>) -> anyhow::Result<PasscanConfig> {
    if let Some(path) = path {
        return Ok(PasscanConfig::from_file(Path::new(path))?);
    }

    let default_path = default_config_path();
    if default_path.exists() {
        debug!("Loading configuration from {}", default_path.display());
        Ok(PasscanConfig::from_file(&default_path)?)
    } else {
        Ok(PasscanConfig::default())
    }
}

/// Engine factory for this build.
#[cfg(feature = "leptess")]
pub fn engine_factory(config: &PasscanConfig) -> Arc<dyn EngineFactory> {
    Arc::new(passcan_core::ocr::LeptessFactory::from_config(&config.ocr))
}

/// Engine factory for this build.
#[cfg(not(feature = "leptess"))]
pub fn engine_factory(config: &PasscanConfig) -> Arc<dyn EngineFactory> {
    Arc::new(passcan_core::ocr::TesseractCliFactory::from_config(&config.ocr))
}
