//! Configuration loading for the control unit binary.
//!
//! Reads one rig TOML, applies command-line overrides and validates the
//! result. A missing file is an error; missing sections are not. Loading
//! happens before logging is installed, so nothing here logs.

use mixmate_common::config::{ConfigError, ConfigLoader, Validate};
use mixmate_common::control_unit::config::RigConfig;
use std::path::{Path, PathBuf};

/// Validated configuration, ready for runtime use.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// File the configuration came from.
    pub source: PathBuf,
    /// Rig tables.
    pub rig: RigConfig,
}

/// Command-line values that take precedence over the file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    /// Bus bridge endpoint.
    pub bind: Option<String>,
}

/// Load `path`, apply `overrides`, validate.
pub fn load_config(path: &Path, overrides: &Overrides) -> Result<LoadedConfig, ConfigError> {
    let mut rig = RigConfig::load(path)?;
    if let Some(bind) = &overrides.bind {
        rig.bus.bind.clone_from(bind);
    }
    rig.validate()?;
    Ok(LoadedConfig {
        source: path.to_path_buf(),
        rig,
    })
}
