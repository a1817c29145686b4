//! Project resource lookup: coordinate files and reference images
//!
//! Coordinate files are JSON documents mapping a key to a point:
//!
//! ```json
//! {"login_button": {"x": 100, "y": 200}}
//! ```

use crate::error::{KeywordError, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, Deserialize)]
struct Point {
    x: i32,
    y: i32,
}

/// Read a named coordinate from a JSON file under the coordinates directory.
///
/// A missing file or missing key is a configuration error, never a default.
pub fn load_point(coordinates_dir: &Path, json_name: &str, key: &str) -> Result<(i32, i32)> {
    let json_file = coordinates_dir.join(json_name);
    if !json_file.is_file() {
        return Err(KeywordError::ConfigNotFound(format!(
            "Coordinate file not found: {}",
            json_file.display()
        )));
    }

    let raw = std::fs::read_to_string(&json_file)?;
    let points: HashMap<String, Point> = serde_json::from_str(&raw)?;

    let point = points.get(key).ok_or_else(|| {
        KeywordError::ConfigNotFound(format!(
            "Key '{}' not found in {}",
            key,
            json_file.display()
        ))
    })?;

    Ok((point.x, point.y))
}

/// Resolve a reference image under the images directory
pub fn reference_image_path(images_dir: &Path, image_name: &str) -> Result<PathBuf> {
    let path = images_dir.join(image_name);
    if !path.is_file() {
        return Err(KeywordError::ConfigNotFound(format!(
            "Reference image not found: {}",
            path.display()
        )));
    }
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_load_point() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join("login.json"),
            r#"{"login_button": {"x": 100, "y": 200}, "cancel": {"x": 5, "y": 9}}"#,
        )
        .unwrap();

        let (x, y) = load_point(dir.path(), "login.json", "login_button").unwrap();
        assert_eq!((x, y), (100, 200));
    }

    #[test]
    fn test_missing_file_is_config_not_found() {
        let dir = tempdir().unwrap();
        let err = load_point(dir.path(), "absent.json", "any").unwrap_err();
        assert!(matches!(err, KeywordError::ConfigNotFound(_)));
    }

    #[test]
    fn test_missing_key_is_config_not_found() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("login.json"), r#"{"other": {"x": 1, "y": 2}}"#).unwrap();

        let err = load_point(dir.path(), "login.json", "login_button").unwrap_err();
        assert!(matches!(err, KeywordError::ConfigNotFound(_)));
        assert!(err.to_string().contains("login_button"));
    }

    #[test]
    fn test_invalid_json_propagates() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("bad.json"), "{not json").unwrap();
        let err = load_point(dir.path(), "bad.json", "k").unwrap_err();
        assert!(matches!(err, KeywordError::Json(_)));
    }

    #[test]
    fn test_reference_image_path() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("logo.png"), b"png").unwrap();

        assert_eq!(
            reference_image_path(dir.path(), "logo.png").unwrap(),
            dir.path().join("logo.png")
        );
        assert!(matches!(
            reference_image_path(dir.path(), "missing.png"),
            Err(KeywordError::ConfigNotFound(_))
        ));
    }
}
