//! adb layer for Android device control
//!
//! This module provides:
//! - `command`: shell execution, taps, key events, gestures, device listing
//! - `screenshot`: screen capture to a local file
//! - `recording`: `screenrecord` process management

mod command;
mod recording;
mod screenshot;

pub use command::{
    band_swipe_points, key_event, list_devices, parse_device_list, parse_window_size, shell,
    split_command, swipe_band, tap, window_size, DeviceInfo, Direction, GestureBand,
};
pub use recording::ScreenRecorder;
pub use screenshot::capture;
