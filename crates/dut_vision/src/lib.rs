//! dut_vision: keyword-style Android automation library
//!
//! This library provides named automation actions for test scripts:
//! - Multi-DUT session management over adb
//! - Text verification from the UI hierarchy
//! - OCR-based tapping via the tesseract binary
//! - Image verification and clicking via template matching
//! - Coordinate taps from JSON resource files
//! - Shell command execution and key events
//! - Safe swipe/scroll gestures and screen recording
//!
//! # Example
//!
//! ```no_run
//! use dut_vision::KeywordLibrary;
//!
//! #[tokio::main]
//! async fn main() -> dut_vision::Result<()> {
//!     let mut lib = KeywordLibrary::new("dutvision.toml")?;
//!
//!     lib.verify_text("Settings", "Phone").await?;
//!     lib.tap_by_coordinates("login.json", "login_button", "Phone").await?;
//!     lib.verify_image("logo.png", "Phone", None).await?;
//!
//!     lib.close_all_sessions().await
//! }
//! ```

// Core modules
pub mod error;

// Configuration and probing
pub mod config;
pub mod deps;

// Device backend
pub mod adb;

// Core functionality
pub mod keywords;
pub mod resources;
pub mod session;
pub mod ui;
pub mod vision;

// Re-export commonly used types and functions
pub use error::{KeywordError, Result};

// Config re-exports
pub use config::{Config, DutSection};

// Prober re-exports
pub use deps::{CapabilityReport, ToolStatus, TESSERACT_CMD_ENV};

// adb re-exports
pub use adb::{list_devices, DeviceInfo, Direction, GestureBand, ScreenRecorder};

// Session re-exports
pub use session::{DeviceSession, SessionRegistry};

// Vision re-exports
pub use vision::{OcrWord, TemplateMatch};

// Dispatcher re-exports
pub use keywords::{
    KeywordLibrary, CLICK_IMAGE_THRESHOLD, SHELL_TIMEOUT_MS, VERIFY_IMAGE_THRESHOLD,
};
