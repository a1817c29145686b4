//! OCR via the external tesseract binary
//!
//! `tesseract <image> stdout tsv` prints one row per recognized element;
//! word rows are level 5 and carry text plus a pixel bounding box.

use crate::error::{KeywordError, Result};
use std::path::Path;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

/// One recognized word with its bounding box in screenshot pixels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OcrWord {
    pub text: String,
    pub left: i32,
    pub top: i32,
    pub width: i32,
    pub height: i32,
}

impl OcrWord {
    /// Center of the bounding box, the point to tap
    pub fn center(&self) -> (i32, i32) {
        (self.left + self.width / 2, self.top + self.height / 2)
    }
}

/// Run tesseract on an image file and collect the recognized words
pub async fn recognize(tesseract: &Path, image_path: &Path) -> Result<Vec<OcrWord>> {
    let output = tokio::time::timeout(
        Duration::from_secs(30),
        Command::new(tesseract)
            .arg(image_path)
            .arg("stdout")
            .arg("tsv")
            .output(),
    )
    .await
    .map_err(|_| KeywordError::Timeout("OCR timeout after 30s".to_string()))?
    .map_err(KeywordError::Io)?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(KeywordError::CommandFailed(format!(
            "tesseract failed on {}: {}",
            image_path.display(),
            stderr.trim()
        )));
    }

    let tsv = String::from_utf8(output.stdout)?;
    let words = parse_tsv(&tsv);
    debug!("OCR found {} words in {}", words.len(), image_path.display());
    Ok(words)
}

/// Parse tesseract TSV output, keeping word-level rows only
pub fn parse_tsv(tsv: &str) -> Vec<OcrWord> {
    let mut words = Vec::new();

    // Row layout: level page block par line word left top width height conf text
    for line in tsv.lines().skip(1) {
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < 12 || fields[0] != "5" {
            continue;
        }

        let parse = |s: &str| s.parse::<i32>().ok();
        let (left, top, width, height) = match (
            parse(fields[6]),
            parse(fields[7]),
            parse(fields[8]),
            parse(fields[9]),
        ) {
            (Some(l), Some(t), Some(w), Some(h)) => (l, t, w, h),
            _ => continue,
        };

        words.push(OcrWord {
            text: fields[11].to_string(),
            left,
            top,
            width,
            height,
        });
    }

    words
}

/// First word whose trimmed text exactly equals `target`, in result order
pub fn find_word<'a>(words: &'a [OcrWord], target: &str) -> Option<&'a OcrWord> {
    words.iter().find(|w| w.text.trim() == target)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TSV: &str = "level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\tleft\ttop\twidth\theight\tconf\ttext\n\
        1\t1\t0\t0\t0\t0\t0\t0\t1080\t2400\t-1\t\n\
        3\t1\t1\t1\t0\t0\t40\t100\t400\t60\t-1\t\n\
        5\t1\t1\t1\t1\t1\t40\t100\t120\t40\t96.5\tLogin\n\
        5\t1\t1\t1\t1\t2\t180\t100\t140\t40\t91.0\tnow \n\
        5\t1\t1\t1\t2\t1\t40\t200\t120\t40\t88.2\tLogin\n";

    #[test]
    fn test_parse_tsv_keeps_word_rows() {
        let words = parse_tsv(TSV);
        assert_eq!(words.len(), 3);
        assert_eq!(words[0].text, "Login");
        assert_eq!(
            words[0],
            OcrWord { text: "Login".to_string(), left: 40, top: 100, width: 120, height: 40 }
        );
    }

    #[test]
    fn test_parse_tsv_skips_malformed_rows() {
        let words = parse_tsv("header\n5\tshort\n5\t1\t1\t1\t1\t1\tx\t0\t0\t0\t0\tbad\n");
        assert!(words.is_empty());
    }

    #[test]
    fn test_find_word_first_exact_match_wins() {
        let words = parse_tsv(TSV);
        let hit = find_word(&words, "Login").unwrap();
        assert_eq!((hit.left, hit.top), (40, 100));
    }

    #[test]
    fn test_find_word_trims_ocr_text() {
        let words = parse_tsv(TSV);
        // Raw OCR text is "now " with a trailing space
        let hit = find_word(&words, "now").unwrap();
        assert_eq!(hit.center(), (180 + 70, 100 + 20));
    }

    #[test]
    fn test_find_word_is_case_sensitive() {
        let words = parse_tsv(TSV);
        assert!(find_word(&words, "login").is_none());
        assert!(find_word(&words, "Sign out").is_none());
    }

    #[test]
    fn test_center() {
        let w = OcrWord { text: "x".into(), left: 10, top: 20, width: 31, height: 11 };
        assert_eq!(w.center(), (25, 25));
    }
}
