//! Keyword dispatcher: named automation actions over managed DUT sessions
//!
//! Every action takes a logical DUT name, routes through the session
//! registry, and delegates to adb, the OCR engine, or the template matcher.
//! Actions run the underlying operation exactly once; there are no retries.

use crate::adb;
use crate::config::{Config, DutSection};
use crate::deps::CapabilityReport;
use crate::error::{KeywordError, Result};
use crate::resources;
use crate::session::SessionRegistry;
use crate::ui;
use crate::vision;
use std::path::{Path, PathBuf};
use tracing::info;

/// Default similarity threshold for verify-only image checks
pub const VERIFY_IMAGE_THRESHOLD: f64 = 0.9;
/// Default similarity threshold for click-and-verify image checks
pub const CLICK_IMAGE_THRESHOLD: f64 = 0.8;
/// Default timeout for device shell commands
pub const SHELL_TIMEOUT_MS: u64 = 5000;

const GESTURE_DURATION_MS: u32 = 300;

/// Keyword library instance: config, session registry, and capability report.
///
/// Owns all mutable state for one test-run context. Create one per run;
/// nothing here is global, so separate instances never share sessions.
pub struct KeywordLibrary {
    config: Config,
    registry: SessionRegistry,
    report: CapabilityReport,
}

impl KeywordLibrary {
    /// Load the config file and probe external tools
    pub fn new(config_path: impl AsRef<Path>) -> Result<Self> {
        let config = Config::load(config_path)?;
        Ok(Self::with_config(config))
    }

    /// Build from an already-parsed config
    pub fn with_config(config: Config) -> Self {
        let report = CapabilityReport::probe();
        report.log();
        Self {
            config,
            registry: SessionRegistry::new(),
            report,
        }
    }

    /// Structured result of the construction-time dependency probe
    pub fn capabilities(&self) -> &CapabilityReport {
        &self.report
    }

    /// Capability section for a logical DUT name
    pub fn device_config(&self, dut_name: &str) -> Result<&DutSection> {
        self.config.dut(dut_name)
    }

    /// Device serial for the session, creating the session on first use
    fn device_id(&mut self, dut_name: &str) -> Result<String> {
        let session = self.registry.get_or_create(dut_name, &self.config)?;
        Ok(session.device_id().to_string())
    }

    /// Verify that exact visible text is present on screen.
    ///
    /// Comparison is case-sensitive against the trimmed set of texts in the
    /// current UI hierarchy.
    pub async fn verify_text(&mut self, expected_text: &str, dut_name: &str) -> Result<()> {
        let device_id = self.device_id(dut_name)?;
        let adb = self.report.adb_command();

        let visible = ui::visible_texts(&adb, &device_id).await?;
        if visible.iter().any(|t| t == expected_text) {
            info!("Text verified on {}: {}", dut_name, expected_text);
            return Ok(());
        }

        Err(KeywordError::NotFound(format!(
            "Exact text '{}' not found on {}",
            expected_text, dut_name
        )))
    }

    /// Tap a named coordinate from a JSON file under `Resources/Coordinates`
    pub async fn tap_by_coordinates(
        &mut self,
        json_name: &str,
        key_name: &str,
        dut_name: &str,
    ) -> Result<(i32, i32)> {
        let device_id = self.device_id(dut_name)?;
        let adb = self.report.adb_command();

        let (x, y) = resources::load_point(&self.config.coordinates_dir(), json_name, key_name)?;
        adb::tap(&adb, &device_id, x, y).await?;

        info!("Tapped ({}, {}) on {}", x, y, dut_name);
        Ok((x, y))
    }

    /// Tap visible text located by OCR instead of the UI hierarchy.
    ///
    /// Taps the center of the first OCR word whose trimmed text exactly
    /// equals `expected_text`, in recognition order.
    pub async fn tap_by_text(&mut self, expected_text: &str, dut_name: &str) -> Result<(i32, i32)> {
        let device_id = self.device_id(dut_name)?;
        let adb = self.report.adb_command();
        let tesseract = self.report.tesseract_command();

        let screenshot = adb::capture(&adb, &device_id, self.config.output_dir(), "ocr").await?;
        let words = vision::recognize(&tesseract, &screenshot).await?;

        let word = vision::find_word(&words, expected_text).ok_or_else(|| {
            KeywordError::NotFound(format!(
                "Text '{}' not found via OCR on {}",
                expected_text, dut_name
            ))
        })?;

        let (x, y) = word.center();
        adb::tap(&adb, &device_id, x, y).await?;

        info!("Tapped OCR text '{}' at ({}, {}) on {}", expected_text, x, y, dut_name);
        Ok((x, y))
    }

    /// Verify a reference image appears on screen via template matching.
    ///
    /// Returns the best match score. Succeeds iff score >= threshold
    /// (default 0.9); equality passes.
    pub async fn verify_image(
        &mut self,
        image_name: &str,
        dut_name: &str,
        threshold: Option<f64>,
    ) -> Result<f64> {
        let threshold = threshold.unwrap_or(VERIFY_IMAGE_THRESHOLD);
        let (m, _, _) = self.match_reference(image_name, dut_name, "verify").await?;
        let score = ensure_threshold(m.score, threshold)?;

        info!("Image '{}' verified on {} (score {:.3})", image_name, dut_name, score);
        Ok(score)
    }

    /// Locate a reference image on screen and tap it.
    ///
    /// The tap point is the match's top-left corner offset by half the
    /// reference image's width and height. Default threshold 0.8.
    pub async fn click_by_image(
        &mut self,
        image_name: &str,
        dut_name: &str,
        threshold: Option<f64>,
    ) -> Result<(i32, i32)> {
        let threshold = threshold.unwrap_or(CLICK_IMAGE_THRESHOLD);
        let (m, tw, th) = self.match_reference(image_name, dut_name, "click").await?;
        ensure_threshold(m.score, threshold)?;

        let (x, y) = vision::click_point(&m, tw, th);
        let device_id = self.device_id(dut_name)?;
        let adb = self.report.adb_command();
        adb::tap(&adb, &device_id, x, y).await?;

        info!("Clicked image '{}' at ({}, {}) on {}", image_name, x, y, dut_name);
        Ok((x, y))
    }

    /// Screenshot the device and match one reference image against it
    async fn match_reference(
        &mut self,
        image_name: &str,
        dut_name: &str,
        label: &str,
    ) -> Result<(vision::TemplateMatch, u32, u32)> {
        let device_id = self.device_id(dut_name)?;
        let adb = self.report.adb_command();

        let ref_path = resources::reference_image_path(&self.config.images_dir(), image_name)?;
        let screenshot = adb::capture(&adb, &device_id, self.config.output_dir(), label).await?;

        let reference = image::open(&ref_path)?.to_luma8();
        let screen = image::open(&screenshot)?.to_luma8();

        let m = vision::match_template(&screen, &reference)?;
        Ok((m, reference.width(), reference.height()))
    }

    /// Run a shell command on the device and return trimmed stdout.
    ///
    /// The command string is split on whitespace: first token is the
    /// command, the rest its arguments.
    pub async fn run_command(
        &mut self,
        command: &str,
        dut_name: &str,
        timeout_ms: Option<u64>,
    ) -> Result<String> {
        let device_id = self.device_id(dut_name)?;
        let adb = self.report.adb_command();

        adb::shell(
            &adb,
            &device_id,
            command,
            timeout_ms.unwrap_or(SHELL_TIMEOUT_MS),
        )
        .await
    }

    /// Press a hardware/system key by Android keycode
    pub async fn press_key(&mut self, keycode: i32, dut_name: &str) -> Result<()> {
        let device_id = self.device_id(dut_name)?;
        let adb = self.report.adb_command();
        adb::key_event(&adb, &device_id, keycode).await
    }

    /// Horizontal swipe confined to the middle third of the screen height
    pub async fn swipe(
        &mut self,
        dut_name: &str,
        direction: adb::Direction,
        percent: f64,
    ) -> Result<()> {
        self.gesture(dut_name, direction, percent, (0.1, 0.35, 0.8, 0.3))
            .await
    }

    /// Vertical scroll confined to a band covering most of the screen
    pub async fn scroll(
        &mut self,
        dut_name: &str,
        direction: adb::Direction,
        percent: f64,
    ) -> Result<()> {
        self.gesture(dut_name, direction, percent, (0.1, 0.15, 0.8, 0.7))
            .await
    }

    async fn gesture(
        &mut self,
        dut_name: &str,
        direction: adb::Direction,
        percent: f64,
        fractions: (f64, f64, f64, f64),
    ) -> Result<()> {
        let device_id = self.device_id(dut_name)?;
        let adb = self.report.adb_command();

        let (width, height) = adb::window_size(&adb, &device_id).await?;
        let (left, top, w, h) = fractions;
        let band = adb::GestureBand::from_fractions(width, height, left, top, w, h);

        adb::swipe_band(&adb, &device_id, band, direction, percent, GESTURE_DURATION_MS).await
    }

    /// Start a screen recording for the DUT; returns the on-device path.
    ///
    /// One recording per device: starting while one is active fails.
    pub async fn start_screen_recording(
        &mut self,
        dut_name: &str,
        test_name: &str,
    ) -> Result<String> {
        let adb = self.report.adb_command();
        let session = self.registry.get_or_create(dut_name, &self.config)?;
        session.start_recording(&adb, test_name).await
    }

    /// Stop the DUT's recording and pull the video to `local_video_path`.
    ///
    /// Fails with `NotFound` if no recording was started for this DUT.
    pub async fn stop_screen_recording(
        &mut self,
        dut_name: &str,
        local_video_path: &Path,
    ) -> Result<PathBuf> {
        let adb = self.report.adb_command();
        let session = self.registry.get_or_create(dut_name, &self.config)?;
        session.stop_recording(&adb, local_video_path).await
    }

    /// Tear down every cached session
    pub async fn close_all_sessions(&mut self) -> Result<()> {
        self.registry.release_all().await
    }

    /// Number of live sessions
    pub fn session_count(&self) -> usize {
        self.registry.len()
    }
}

/// Threshold gate shared by verify and click paths: equality passes
fn ensure_threshold(score: f64, threshold: f64) -> Result<f64> {
    if score >= threshold {
        Ok(score)
    } else {
        Err(KeywordError::MatchBelowThreshold { score, threshold })
    }
}
