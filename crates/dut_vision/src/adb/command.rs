//! adb invocation plumbing: shell commands, taps, key events, gestures

use crate::error::{KeywordError, Result};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

/// Build an adb command addressed at one device
fn adb_cmd(adb: &Path, device_id: &str) -> Command {
    let mut cmd = Command::new(adb);
    cmd.arg("-s").arg(device_id);
    cmd
}

/// Split a shell command string on whitespace: first token is the command,
/// the rest are its arguments
pub fn split_command(command: &str) -> Option<(&str, Vec<&str>)> {
    let mut parts = command.split_whitespace();
    let head = parts.next()?;
    Some((head, parts.collect()))
}

/// Run a shell command on the device and return trimmed stdout
pub async fn shell(
    adb: &Path,
    device_id: &str,
    command: &str,
    timeout_ms: u64,
) -> Result<String> {
    let (head, args) = split_command(command)
        .ok_or_else(|| KeywordError::CommandFailed("Empty shell command".to_string()))?;

    let mut cmd = adb_cmd(adb, device_id);
    cmd.arg("shell").arg(head);
    for arg in args {
        cmd.arg(arg);
    }

    debug!("shell on {}: {}", device_id, command);

    let output = tokio::time::timeout(Duration::from_millis(timeout_ms), cmd.output())
        .await
        .map_err(|_| {
            KeywordError::Timeout(format!("Shell command timeout after {}ms", timeout_ms))
        })?
        .map_err(KeywordError::Io)?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(KeywordError::CommandFailed(stderr.trim().to_string()));
    }

    let stdout = String::from_utf8(output.stdout)?;
    Ok(stdout.trim().to_string())
}

/// Tap at the specified pixel coordinates
pub async fn tap(adb: &Path, device_id: &str, x: i32, y: i32) -> Result<()> {
    let mut cmd = adb_cmd(adb, device_id);
    cmd.arg("shell")
        .arg("input")
        .arg("tap")
        .arg(x.to_string())
        .arg(y.to_string());

    debug!("tap ({}, {}) on {}", x, y, device_id);
    cmd.output().await.map_err(KeywordError::Io)?;
    Ok(())
}

/// Press a hardware/system key by Android keycode
pub async fn key_event(adb: &Path, device_id: &str, keycode: i32) -> Result<()> {
    let mut cmd = adb_cmd(adb, device_id);
    cmd.arg("shell")
        .arg("input")
        .arg("keyevent")
        .arg(keycode.to_string());

    cmd.output().await.map_err(KeywordError::Io)?;
    Ok(())
}

/// Current screen size in pixels, from `wm size`
pub async fn window_size(adb: &Path, device_id: &str) -> Result<(u32, u32)> {
    let mut cmd = adb_cmd(adb, device_id);
    cmd.arg("shell").arg("wm").arg("size");

    let output = tokio::time::timeout(Duration::from_secs(5), cmd.output())
        .await
        .map_err(|_| KeywordError::Timeout("wm size timeout after 5s".to_string()))?
        .map_err(KeywordError::Io)?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    parse_window_size(&stdout)
}

lazy_static::lazy_static! {
    static ref WM_SIZE_RE: regex::Regex =
        regex::Regex::new(r"(Override|Physical) size:\s*(\d+)x(\d+)").unwrap();
}

/// Parse `wm size` output; an Override line wins over the Physical one
pub fn parse_window_size(output: &str) -> Result<(u32, u32)> {
    let mut physical = None;
    for caps in WM_SIZE_RE.captures_iter(output) {
        let w: u32 = caps[2].parse().map_err(|_| {
            KeywordError::ParseError(format!("Bad width in wm size output: {}", &caps[2]))
        })?;
        let h: u32 = caps[3].parse().map_err(|_| {
            KeywordError::ParseError(format!("Bad height in wm size output: {}", &caps[3]))
        })?;
        if &caps[1] == "Override" {
            return Ok((w, h));
        }
        physical = Some((w, h));
    }

    physical.ok_or_else(|| {
        KeywordError::ParseError(format!("No screen size in wm size output: {}", output.trim()))
    })
}

/// Scroll direction for swipe/scroll gestures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl FromStr for Direction {
    type Err = KeywordError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "left" => Ok(Direction::Left),
            "right" => Ok(Direction::Right),
            "up" => Ok(Direction::Up),
            "down" => Ok(Direction::Down),
            other => Err(KeywordError::ParseError(format!(
                "Unknown direction '{}', expected left/right/up/down",
                other
            ))),
        }
    }
}

/// Screen region a gesture is confined to, in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GestureBand {
    pub left: i32,
    pub top: i32,
    pub width: i32,
    pub height: i32,
}

impl GestureBand {
    /// Band as a fraction of the full screen size
    pub fn from_fractions(
        screen_w: u32,
        screen_h: u32,
        left: f64,
        top: f64,
        width: f64,
        height: f64,
    ) -> Self {
        Self {
            left: (screen_w as f64 * left) as i32,
            top: (screen_h as f64 * top) as i32,
            width: (screen_w as f64 * width) as i32,
            height: (screen_h as f64 * height) as i32,
        }
    }
}

/// Finger start/end points for a scroll gesture inside a band.
///
/// `direction` is the scroll direction; the finger travels the opposite way,
/// starting at the band edge and covering `percent` of the band's extent
/// along the scroll axis.
pub fn band_swipe_points(
    band: GestureBand,
    direction: Direction,
    percent: f64,
) -> ((i32, i32), (i32, i32)) {
    let percent = percent.clamp(0.0, 1.0);
    let center_x = band.left + band.width / 2;
    let center_y = band.top + band.height / 2;

    match direction {
        Direction::Down => {
            let travel = (band.height as f64 * percent) as i32;
            let start = (center_x, band.top + band.height);
            let end = (center_x, band.top + band.height - travel);
            (start, end)
        }
        Direction::Up => {
            let travel = (band.height as f64 * percent) as i32;
            let start = (center_x, band.top);
            let end = (center_x, band.top + travel);
            (start, end)
        }
        Direction::Left => {
            let travel = (band.width as f64 * percent) as i32;
            let start = (band.left + band.width, center_y);
            let end = (band.left + band.width - travel, center_y);
            (start, end)
        }
        Direction::Right => {
            let travel = (band.width as f64 * percent) as i32;
            let start = (band.left, center_y);
            let end = (band.left + travel, center_y);
            (start, end)
        }
    }
}

/// Issue a scroll gesture confined to a band of the screen
pub async fn swipe_band(
    adb: &Path,
    device_id: &str,
    band: GestureBand,
    direction: Direction,
    percent: f64,
    duration_ms: u32,
) -> Result<()> {
    let ((sx, sy), (ex, ey)) = band_swipe_points(band, direction, percent);

    let mut cmd = adb_cmd(adb, device_id);
    cmd.arg("shell")
        .arg("input")
        .arg("swipe")
        .arg(sx.to_string())
        .arg(sy.to_string())
        .arg(ex.to_string())
        .arg(ey.to_string())
        .arg(duration_ms.to_string());

    debug!(
        "swipe {:?} {:.0}% on {}: ({}, {}) -> ({}, {})",
        direction,
        percent * 100.0,
        device_id,
        sx,
        sy,
        ex,
        ey
    );
    cmd.output().await.map_err(KeywordError::Io)?;
    Ok(())
}

/// Information about one attached device, from `adb devices -l`
#[derive(Debug, Clone)]
pub struct DeviceInfo {
    pub device_id: String,
    pub status: String,
    pub model: Option<String>,
}

/// List attached devices
pub async fn list_devices(adb: &Path) -> Result<Vec<DeviceInfo>> {
    let output = tokio::time::timeout(
        Duration::from_secs(5),
        Command::new(adb).arg("devices").arg("-l").output(),
    )
    .await
    .map_err(|_| KeywordError::Timeout("List devices timeout after 5s".to_string()))?
    .map_err(KeywordError::Io)?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    Ok(parse_device_list(&stdout))
}

/// Parse `adb devices -l` output, skipping the header line
pub fn parse_device_list(output: &str) -> Vec<DeviceInfo> {
    let mut devices = Vec::new();

    for line in output.lines().skip(1) {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 2 {
            continue;
        }

        let mut model = None;
        for part in &parts[2..] {
            if let Some(rest) = part.strip_prefix("model:") {
                model = Some(rest.to_string());
                break;
            }
        }

        devices.push(DeviceInfo {
            device_id: parts[0].to_string(),
            status: parts[1].to_string(),
            model,
        });
    }

    devices
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_command() {
        let (head, args) = split_command("dumpsys battery set level 42").unwrap();
        assert_eq!(head, "dumpsys");
        assert_eq!(args, vec!["battery", "set", "level", "42"]);

        let (head, args) = split_command("getprop").unwrap();
        assert_eq!(head, "getprop");
        assert!(args.is_empty());

        assert!(split_command("   ").is_none());
    }

    #[test]
    fn test_parse_window_size_physical() {
        let (w, h) = parse_window_size("Physical size: 1080x2400\n").unwrap();
        assert_eq!((w, h), (1080, 2400));
    }

    #[test]
    fn test_parse_window_size_override_wins() {
        let out = "Physical size: 1080x2400\nOverride size: 720x1600\n";
        assert_eq!(parse_window_size(out).unwrap(), (720, 1600));
    }

    #[test]
    fn test_parse_window_size_garbage() {
        assert!(matches!(
            parse_window_size("no sizes here"),
            Err(KeywordError::ParseError(_))
        ));
    }

    #[test]
    fn test_direction_parsing() {
        assert_eq!("Left".parse::<Direction>().unwrap(), Direction::Left);
        assert_eq!("DOWN".parse::<Direction>().unwrap(), Direction::Down);
        assert!("sideways".parse::<Direction>().is_err());
    }

    #[test]
    fn test_band_swipe_points_down() {
        // 1080x2400 screen, vertical scroll band
        let band = GestureBand::from_fractions(1080, 2400, 0.1, 0.15, 0.8, 0.7);
        assert_eq!(band, GestureBand { left: 108, top: 360, width: 864, height: 1680 });

        let ((sx, sy), (ex, ey)) = band_swipe_points(band, Direction::Down, 0.9);
        // Finger travels up to scroll down, staying inside the band
        assert_eq!(sx, ex);
        assert_eq!(sy, 360 + 1680);
        assert_eq!(ey, 360 + 1680 - 1512);
    }

    #[test]
    fn test_band_swipe_points_left() {
        let band = GestureBand { left: 100, top: 700, width: 800, height: 600 };
        let ((sx, sy), (ex, ey)) = band_swipe_points(band, Direction::Left, 0.5);
        assert_eq!(sy, ey);
        assert_eq!(sy, 700 + 300);
        assert_eq!(sx, 900);
        assert_eq!(ex, 500);
    }

    #[test]
    fn test_band_swipe_percent_clamped() {
        let band = GestureBand { left: 0, top: 0, width: 100, height: 100 };
        let ((_, sy), (_, ey)) = band_swipe_points(band, Direction::Down, 1.5);
        assert_eq!(sy - ey, 100);
    }

    #[test]
    fn test_parse_device_list() {
        let out = "List of devices attached\n\
                   emulator-5554          device product:sdk model:sdk_gphone64 device:emu64x\n\
                   R58M123ABC             offline\n\n";
        let devices = parse_device_list(out);
        assert_eq!(devices.len(), 2);
        assert_eq!(devices[0].device_id, "emulator-5554");
        assert_eq!(devices[0].status, "device");
        assert_eq!(devices[0].model.as_deref(), Some("sdk_gphone64"));
        assert_eq!(devices[1].status, "offline");
        assert!(devices[1].model.is_none());
    }
}
