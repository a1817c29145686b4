//! External tool probing, run once at library construction
//!
//! Rust links its library dependencies at build time, so the only runtime
//! dependencies worth probing are the external executables: `adb` (shell
//! commands, gestures, screenshots, recording) and `tesseract` (OCR taps).
//! A missing tool is reported and logged, never fatal; actions that need it
//! fail when called.

use std::path::PathBuf;
use tracing::{info, warn};

/// Environment variable overriding the tesseract executable path
pub const TESSERACT_CMD_ENV: &str = "TESSERACT_CMD";

/// Whether a probed executable was resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolStatus {
    Found(PathBuf),
    Missing,
}

impl ToolStatus {
    pub fn is_found(&self) -> bool {
        matches!(self, ToolStatus::Found(_))
    }

    /// Resolved path, if found
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            ToolStatus::Found(p) => Some(p),
            ToolStatus::Missing => None,
        }
    }
}

/// Structured result of the construction-time dependency probe
#[derive(Debug, Clone)]
pub struct CapabilityReport {
    pub adb: ToolStatus,
    pub tesseract: ToolStatus,
}

impl CapabilityReport {
    /// Probe the PATH (and `TESSERACT_CMD`) for required external tools
    pub fn probe() -> Self {
        let adb = match which::which("adb") {
            Ok(path) => ToolStatus::Found(path),
            Err(_) => ToolStatus::Missing,
        };

        // Explicit override wins over PATH lookup
        let tesseract = match std::env::var(TESSERACT_CMD_ENV) {
            Ok(cmd) if !cmd.is_empty() => ToolStatus::Found(PathBuf::from(cmd)),
            _ => match which::which("tesseract") {
                Ok(path) => ToolStatus::Found(path),
                Err(_) => ToolStatus::Missing,
            },
        };

        Self { adb, tesseract }
    }

    /// Names of tools that were not resolved, with the capabilities they gate
    pub fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if !self.adb.is_found() {
            missing.push("adb");
        }
        if !self.tesseract.is_found() {
            missing.push("tesseract");
        }
        missing
    }

    /// Log the probe outcome; warnings only, construction always continues
    pub fn log(&self) {
        match &self.adb {
            ToolStatus::Found(path) => info!("adb detected at {}", path.display()),
            ToolStatus::Missing => warn!(
                "adb not found in PATH; shell commands, gestures, screenshots and \
                 screen recording will fail at call time"
            ),
        }
        match &self.tesseract {
            ToolStatus::Found(path) => info!("tesseract detected at {}", path.display()),
            ToolStatus::Missing => warn!(
                "tesseract not found (set {} to override); OCR-based taps will \
                 fail at call time",
                TESSERACT_CMD_ENV
            ),
        }
    }

    /// Command name to invoke adb with, falling back to the bare name
    pub fn adb_command(&self) -> PathBuf {
        self.adb
            .path()
            .cloned()
            .unwrap_or_else(|| PathBuf::from("adb"))
    }

    /// Command name to invoke tesseract with, falling back to the bare name
    pub fn tesseract_command(&self) -> PathBuf {
        self.tesseract
            .path()
            .cloned()
            .unwrap_or_else(|| PathBuf::from("tesseract"))
    }
}
