//! Device session registry
//!
//! One live session per logical DUT name, created lazily from the DUT's
//! config section and cached for the rest of the run. The registry is an
//! owned object, not a process-wide singleton, so independent library
//! instances can manage disjoint device sets in one process.

use crate::adb::ScreenRecorder;
use crate::config::Config;
use crate::error::{KeywordError, Result};
use chrono::{DateTime, Local};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Live handle to one DUT
#[derive(Debug)]
pub struct DeviceSession {
    name: String,
    device_id: String,
    created_at: DateTime<Local>,
    /// Active recorder for this device, at most one at a time
    recorder: Option<ScreenRecorder>,
}

impl DeviceSession {
    fn new(name: &str, device_id: &str) -> Self {
        Self {
            name: name.to_string(),
            device_id: device_id.to_string(),
            created_at: Local::now(),
            recorder: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    pub fn created_at(&self) -> DateTime<Local> {
        self.created_at
    }

    pub fn is_recording(&self) -> bool {
        self.recorder.is_some()
    }

    /// Start a screen recording for this device
    pub async fn start_recording(&mut self, adb: &Path, test_name: &str) -> Result<String> {
        if self.recorder.is_some() {
            return Err(KeywordError::CommandFailed(format!(
                "A screen recording is already active on '{}'",
                self.name
            )));
        }

        let recorder = ScreenRecorder::start(adb, &self.device_id, test_name).await?;
        let remote_path = recorder.remote_path().to_string();
        self.recorder = Some(recorder);
        Ok(remote_path)
    }

    /// Stop the active recording and pull the video to `local_path`
    pub async fn stop_recording(&mut self, adb: &Path, local_path: &Path) -> Result<PathBuf> {
        let recorder = self.recorder.take().ok_or_else(|| {
            KeywordError::NotFound(format!("No active screen recording on '{}'", self.name))
        })?;
        recorder.stop(adb, &self.device_id, local_path).await
    }

    /// Tear down the session, killing any recorder still running
    pub async fn close(&mut self) -> Result<()> {
        if let Some(recorder) = self.recorder.take() {
            debug!("Aborting active recording on '{}'", self.name);
            recorder.abort().await?;
        }
        Ok(())
    }
}

/// Maps logical DUT names to live sessions
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: HashMap<String, DeviceSession>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached session for `name`, creating it from the DUT's
    /// config section on first use. The config lookup happens before any
    /// device interaction, so an unknown name never touches adb.
    pub fn get_or_create(&mut self, name: &str, config: &Config) -> Result<&mut DeviceSession> {
        match self.sessions.entry(name.to_string()) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let section = config.dut(name)?;
                info!("Creating session '{}' -> device {}", name, section.device_id);
                Ok(entry.insert(DeviceSession::new(name, &section.device_id)))
            }
        }
    }

    /// Cached session for `name`, if one exists
    pub fn get(&mut self, name: &str) -> Option<&mut DeviceSession> {
        self.sessions.get_mut(name)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Close every session and clear the cache.
    ///
    /// Closes run in iteration order; the first failure propagates and
    /// aborts the remaining teardowns.
    pub async fn release_all(&mut self) -> Result<()> {
        for (name, mut session) in self.sessions.drain() {
            debug!("Closing session '{}'", name);
            session.close().await?;
        }
        Ok(())
    }
}
