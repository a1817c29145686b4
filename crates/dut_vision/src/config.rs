//! Library configuration loaded once at construction
//!
//! The config file is TOML with one `[DUT.<name>]` table per managed device
//! and an optional `[paths]` table for resource locations:
//!
//! ```toml
//! [paths]
//! resource_dir = "Resources"
//! output_dir = "output"
//!
//! [DUT.Phone]
//! device_id = "emulator-5554"
//! platform_version = "14"
//! ```

use crate::error::{KeywordError, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Capability settings for one DUT, immutable for the process lifetime
#[derive(Debug, Clone, Deserialize)]
pub struct DutSection {
    /// Serial adb addresses the device by (`adb -s <device_id>`)
    pub device_id: String,
    /// Remaining capability keys, kept verbatim for callers that want them
    #[serde(flatten)]
    pub extra: HashMap<String, toml::Value>,
}

/// Resource and output locations, resolved relative to the project root
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PathsSection {
    pub resource_dir: PathBuf,
    pub output_dir: PathBuf,
}

impl Default for PathsSection {
    fn default() -> Self {
        Self {
            resource_dir: PathBuf::from("Resources"),
            output_dir: PathBuf::from("output"),
        }
    }
}

/// Parsed configuration file
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default, rename = "DUT")]
    duts: HashMap<String, DutSection>,
    #[serde(default)]
    paths: PathsSection,
}

impl Config {
    /// Load and parse a TOML config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            KeywordError::ConfigNotFound(format!("Config file {}: {}", path.display(), e))
        })?;
        let config: Config = toml::from_str(&raw)?;
        Ok(config)
    }

    /// Parse config from an in-memory TOML string
    pub fn parse(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Look up the DUT section for a logical device name
    pub fn dut(&self, name: &str) -> Result<&DutSection> {
        self.duts
            .get(name)
            .ok_or_else(|| KeywordError::ConfigNotFound(format!("DUT section 'DUT.{}' not found", name)))
    }

    /// All configured DUT names
    pub fn dut_names(&self) -> impl Iterator<Item = &str> {
        self.duts.keys().map(|s| s.as_str())
    }

    /// Directory holding coordinate JSON files
    pub fn coordinates_dir(&self) -> PathBuf {
        self.paths.resource_dir.join("Coordinates")
    }

    /// Directory holding reference images for template matching
    pub fn images_dir(&self) -> PathBuf {
        self.paths.resource_dir.join("images")
    }

    /// Directory for screenshots and pulled recordings
    pub fn output_dir(&self) -> &Path {
        &self.paths.output_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        [paths]
        resource_dir = "Res"
        output_dir = "out"

        [DUT.Phone]
        device_id = "emulator-5554"
        platform_version = "14"

        [DUT.Cluster]
        device_id = "R58M123ABC"
    "#;

    #[test]
    fn test_parse_sections() {
        let config = Config::parse(SAMPLE).unwrap();
        let phone = config.dut("Phone").unwrap();
        assert_eq!(phone.device_id, "emulator-5554");
        assert_eq!(
            phone.extra.get("platform_version").and_then(|v| v.as_str()),
            Some("14")
        );
        assert_eq!(config.dut("Cluster").unwrap().device_id, "R58M123ABC");
    }

    #[test]
    fn test_missing_dut_is_config_not_found() {
        let config = Config::parse(SAMPLE).unwrap();
        let err = config.dut("Tablet").unwrap_err();
        assert!(matches!(err, KeywordError::ConfigNotFound(_)));
        assert!(err.to_string().contains("DUT.Tablet"));
    }

    #[test]
    fn test_default_paths() {
        let config = Config::parse("[DUT.Phone]\ndevice_id = \"x\"\n").unwrap();
        assert_eq!(config.coordinates_dir(), PathBuf::from("Resources/Coordinates"));
        assert_eq!(config.images_dir(), PathBuf::from("Resources/images"));
        assert_eq!(config.output_dir(), Path::new("output"));
    }

    #[test]
    fn test_load_missing_file_is_config_not_found() {
        let err = Config::load("/nonexistent/config.toml").unwrap_err();
        assert!(matches!(err, KeywordError::ConfigNotFound(_)));
    }
}
