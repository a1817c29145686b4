//! Screen capture to a local PNG file

use crate::error::{KeywordError, Result};
use chrono::Local;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

const REMOTE_SCREENSHOT_PATH: &str = "/sdcard/dut_vision_screen.png";

/// Capture the device screen and pull it into `output_dir`.
///
/// The local filename is `<label>_<timestamp>.png` so repeated captures from
/// one test run never collide.
pub async fn capture(
    adb: &Path,
    device_id: &str,
    output_dir: &Path,
    label: &str,
) -> Result<PathBuf> {
    tokio::fs::create_dir_all(output_dir)
        .await
        .map_err(KeywordError::Io)?;

    let mut cmd = Command::new(adb);
    cmd.arg("-s")
        .arg(device_id)
        .arg("shell")
        .arg("screencap")
        .arg("-p")
        .arg(REMOTE_SCREENSHOT_PATH);

    let output = tokio::time::timeout(Duration::from_secs(10), cmd.output())
        .await
        .map_err(|_| KeywordError::Timeout("Screenshot timeout after 10s".to_string()))?
        .map_err(KeywordError::Io)?;

    let combined = format!(
        "{}{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
    if combined.contains("Status: -1") || combined.contains("Failed") {
        return Err(KeywordError::CommandFailed(format!(
            "screencap failed on {}: {}",
            device_id,
            combined.trim()
        )));
    }

    let timestamp = Local::now().format("%Y%m%d_%H%M%S%3f");
    let local_path = output_dir.join(format!("{}_{}.png", label, timestamp));

    let mut cmd = Command::new(adb);
    cmd.arg("-s")
        .arg(device_id)
        .arg("pull")
        .arg(REMOTE_SCREENSHOT_PATH)
        .arg(&local_path);

    let pull = tokio::time::timeout(Duration::from_secs(5), cmd.output())
        .await
        .map_err(|_| KeywordError::Timeout("Screenshot pull timeout after 5s".to_string()))?
        .map_err(KeywordError::Io)?;

    if !pull.status.success() {
        let combined = format!(
            "{}{}",
            String::from_utf8_lossy(&pull.stdout),
            String::from_utf8_lossy(&pull.stderr)
        );
        return Err(KeywordError::CommandFailed(format!(
            "adb pull failed: {}",
            combined.trim()
        )));
    }

    let size = tokio::fs::metadata(&local_path)
        .await
        .map(|m| m.len())
        .unwrap_or(0);
    if size == 0 {
        return Err(KeywordError::CommandFailed(format!(
            "Pulled screenshot {} is empty",
            local_path.display()
        )));
    }

    debug!("Screenshot saved: {} ({} bytes)", local_path.display(), size);
    Ok(local_path)
}
