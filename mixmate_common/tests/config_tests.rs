//! Rig configuration loading tests.
//!
//! Loads the shipped sample file and hand-written documents from disk through
//! `ConfigLoader::load_validated`.

use mixmate_common::config::{ConfigError, ConfigLoader, LogLevel, Validate};
use mixmate_common::consts::*;
use mixmate_common::control_unit::config::{AxisConfig, RigConfig};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn sample_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../config/mixmate.toml")
}

#[test]
fn shipped_sample_matches_defaults() {
    let loaded = RigConfig::load_validated(&sample_path()).unwrap();
    let defaults = RigConfig::default();

    assert_eq!(loaded.axes, defaults.axes);
    assert_eq!(loaded.detector, defaults.detector);
    assert_eq!(loaded.motion.steps_per_mm, defaults.motion.steps_per_mm);
    assert_eq!(loaded.homing.timeout_ms, defaults.homing.timeout_ms);
    assert_eq!(loaded.band.timeout_ms, defaults.band.timeout_ms);
    assert_eq!(loaded.bus.address, BUS_ADDRESS);
    assert_eq!(loaded.bus.bind, DEFAULT_BUS_BIND);
}

#[test]
fn partial_file_keeps_remaining_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("rig.toml");
    fs::write(
        &path,
        r#"
[shared]
log_level = "debug"

[band]
timeout_ms = 4000
"#,
    )
    .unwrap();

    let cfg = RigConfig::load_validated(&path).unwrap();
    assert_eq!(cfg.shared.log_level, LogLevel::Debug);
    assert_eq!(cfg.band.timeout_ms, 4000);
    assert_eq!(cfg.band.load_sample_interval_ms, DEFAULT_LOAD_SAMPLE_INTERVAL_MS);
    assert_eq!(cfg.axes[CARRIAGE_AXIS], AxisConfig::carriage());
}

#[test]
fn thirteen_axes_fail_to_parse() {
    let mut doc = String::new();
    for _ in 0..AXIS_COUNT + 1 {
        doc.push_str("[[axes]]\nmax_speed = 1000.0\n\n");
    }
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("rig.toml");
    fs::write(&path, doc).unwrap();

    assert!(matches!(
        RigConfig::load(&path),
        Err(ConfigError::ParseError(_))
    ));
}

#[test]
fn zero_timeout_fails_validation() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("rig.toml");
    fs::write(&path, "[homing]\ntimeout_ms = 0\n").unwrap();

    let cfg = RigConfig::load(&path).unwrap();
    assert!(cfg.validate().is_err());
    assert!(matches!(
        RigConfig::load_validated(&path),
        Err(ConfigError::ValidationError(_))
    ));
}
