//! Screen recording via a spawned `adb shell screenrecord` process
//!
//! One recorder per device session; the registry owns the handle.

use crate::error::{KeywordError, Result};
use chrono::Local;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::{Child, Command};
use tracing::{debug, info};

/// A running `screenrecord` process plus the remote file it writes
#[derive(Debug)]
pub struct ScreenRecorder {
    child: Child,
    remote_path: String,
}

impl ScreenRecorder {
    /// Start recording into a timestamped file under /sdcard
    pub async fn start(adb: &Path, device_id: &str, test_name: &str) -> Result<Self> {
        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        let remote_path = format!("/sdcard/{}_{}_{}.mp4", device_id, timestamp, test_name);

        let child = Command::new(adb)
            .arg("-s")
            .arg(device_id)
            .arg("shell")
            .arg("screenrecord")
            .arg(&remote_path)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(KeywordError::Io)?;

        info!("Screen recording started on {}: {}", device_id, remote_path);
        Ok(Self { child, remote_path })
    }

    /// Remote file path the recording is written to
    pub fn remote_path(&self) -> &str {
        &self.remote_path
    }

    /// Stop the recorder and pull the video to `local_path`
    pub async fn stop(mut self, adb: &Path, device_id: &str, local_path: &Path) -> Result<PathBuf> {
        self.child.kill().await.map_err(KeywordError::Io)?;
        self.child.wait().await.map_err(KeywordError::Io)?;
        debug!("screenrecord process stopped on {}", device_id);

        // screenrecord finalizes the mp4 moov atom after the client drops
        tokio::time::sleep(Duration::from_millis(500)).await;

        let output = Command::new(adb)
            .arg("-s")
            .arg(device_id)
            .arg("pull")
            .arg(&self.remote_path)
            .arg(local_path)
            .output()
            .await
            .map_err(KeywordError::Io)?;

        if !output.status.success() {
            let combined = format!(
                "{}{}",
                String::from_utf8_lossy(&output.stdout),
                String::from_utf8_lossy(&output.stderr)
            );
            return Err(KeywordError::CommandFailed(format!(
                "adb pull of {} failed: {}",
                self.remote_path,
                combined.trim()
            )));
        }

        info!("Recording pulled to {}", local_path.display());
        Ok(local_path.to_path_buf())
    }

    /// Kill the recorder without pulling the file, for session teardown
    pub async fn abort(mut self) -> Result<()> {
        self.child.kill().await.map_err(KeywordError::Io)?;
        self.child.wait().await.map_err(KeywordError::Io)?;
        Ok(())
    }
}
