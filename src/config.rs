//! Configuration management.
//!
//! Settings live in a TOML file under the platform config directory. A
//! missing file means defaults; every section and field is optional.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::gesture::GestureConfig;
use crate::keypad::LayoutConfig;

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Press detection thresholds
    pub gesture: GestureConfig,
    /// Keypad placement
    pub layout: LayoutConfig,
}

impl Config {
    /// Gets the platform-specific config directory path.
    ///
    /// - Linux: `~/.config/aircalc/`
    /// - macOS: `~/Library/Application Support/aircalc/`
    /// - Windows: `%APPDATA%\aircalc\`
    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to determine config directory")?
            .join("aircalc");

        Ok(config_dir)
    }

    /// Gets the full path to the default config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Loads configuration from the default location.
    ///
    /// If the file doesn't exist, returns default configuration.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Loads and validates configuration from a specific file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        info!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Saves configuration using temp file + rename.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        self.validate()?;

        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).with_context(|| {
                format!("Failed to create config directory: {}", dir.display())
            })?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        let temp_path = path.with_extension("toml.tmp");
        fs::write(&temp_path, content).with_context(|| {
            format!("Failed to write temp config file: {}", temp_path.display())
        })?;

        fs::rename(&temp_path, path)
            .with_context(|| format!("Failed to rename temp config file to: {}", path.display()))?;

        Ok(())
    }

    /// Validates configuration values.
    pub fn validate(&self) -> Result<()> {
        let gesture = &self.gesture;
        if gesture.dwell_frames == 0 {
            anyhow::bail!("gesture.dwell_frames must be at least 1");
        }
        if gesture.cooldown_frames == 0 {
            anyhow::bail!("gesture.cooldown_frames must be at least 1");
        }
        if !(gesture.pinch_ratio > 0.0 && gesture.pinch_ratio.is_finite()) {
            anyhow::bail!(
                "gesture.pinch_ratio must be positive, got {}",
                gesture.pinch_ratio
            );
        }
        if !(gesture.pinch_floor_px >= 0.0 && gesture.pinch_floor_px.is_finite()) {
            anyhow::bail!(
                "gesture.pinch_floor_px must not be negative, got {}",
                gesture.pinch_floor_px
            );
        }

        let layout = &self.layout;
        if layout.columns == 0 || layout.rows == 0 {
            anyhow::bail!(
                "layout must have at least one column and row, got {}x{}",
                layout.columns,
                layout.rows
            );
        }
        for (name, ratio) in [
            ("width_ratio", layout.width_ratio),
            ("height_ratio", layout.height_ratio),
        ] {
            if !(ratio > 0.0 && ratio <= 1.0) {
                anyhow::bail!("layout.{} must be in (0, 1], got {}", name, ratio);
            }
        }
        if layout.margin < 0 {
            anyhow::bail!("layout.margin must not be negative, got {}", layout.margin);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.gesture.dwell_frames, 12);
        assert_eq!(config.gesture.cooldown_frames, 12);
        assert_eq!(config.layout.columns, 4);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[gesture]\ndwell_frames = 20\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.gesture.dwell_frames, 20);
        assert_eq!(config.gesture.cooldown_frames, 12);
        assert_eq!(config.layout, LayoutConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.gesture.pinch_ratio = 0.05;
        config.layout.margin = 40;
        config.save_to(&path).unwrap();

        assert_eq!(Config::load_from(&path).unwrap(), config);
        assert!(!path.with_extension("toml.tmp").exists());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.gesture.dwell_frames = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.layout.width_ratio = 1.5;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.layout.rows = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.gesture.pinch_ratio = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_reports_parse_errors() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[gesture\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
