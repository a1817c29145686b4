//! Grayscale template matching
//!
//! Zero-mean normalized cross-correlation, the same measure OpenCV calls
//! `TM_CCOEFF_NORMED`: 1.0 is a perfect match, values near 0 mean no
//! correlation. Only the best match is reported.

use crate::error::{KeywordError, Result};
use image::GrayImage;

/// Best match of a template against a screenshot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemplateMatch {
    /// Normalized correlation score of the best window, in [-1, 1]
    pub score: f64,
    /// Top-left corner of the best window in screenshot coordinates
    pub x: u32,
    pub y: u32,
}

/// Tap point for a match: top-left offset by half the template size
pub fn click_point(m: &TemplateMatch, template_w: u32, template_h: u32) -> (i32, i32) {
    (
        m.x as i32 + (template_w / 2) as i32,
        m.y as i32 + (template_h / 2) as i32,
    )
}

/// Slide `template` over `screen` and return the best-scoring position
pub fn match_template(screen: &GrayImage, template: &GrayImage) -> Result<TemplateMatch> {
    let (sw, sh) = screen.dimensions();
    let (tw, th) = template.dimensions();

    if tw == 0 || th == 0 {
        return Err(KeywordError::CommandFailed(
            "Template image is empty".to_string(),
        ));
    }
    if tw > sw || th > sh {
        return Err(KeywordError::CommandFailed(format!(
            "Template {}x{} is larger than screenshot {}x{}",
            tw, th, sw, sh
        )));
    }

    let n = (tw * th) as f64;

    // Mean-centered template and its sum of squared deviations, computed once
    let t_pixels: Vec<f64> = template.pixels().map(|p| p.0[0] as f64).collect();
    let t_mean = t_pixels.iter().sum::<f64>() / n;
    let t_dev: Vec<f64> = t_pixels.iter().map(|v| v - t_mean).collect();
    let t_ssd: f64 = t_dev.iter().map(|v| v * v).sum();

    let mut best = TemplateMatch { score: f64::NEG_INFINITY, x: 0, y: 0 };

    for y in 0..=(sh - th) {
        for x in 0..=(sw - tw) {
            // Single pass over the window: sum, sum of squares, and the
            // cross term against the centered template. Since the centered
            // template sums to zero, the window mean cancels out of the
            // numerator.
            let mut s_sum = 0.0;
            let mut s_sq = 0.0;
            let mut cross = 0.0;

            for j in 0..th {
                for i in 0..tw {
                    let s = screen.get_pixel(x + i, y + j).0[0] as f64;
                    s_sum += s;
                    s_sq += s * s;
                    cross += s * t_dev[(j * tw + i) as usize];
                }
            }

            let s_ssd = s_sq - s_sum * s_sum / n;
            let denom = (t_ssd * s_ssd).sqrt();
            let score = if denom > f64::EPSILON { cross / denom } else { 0.0 };

            if score > best.score {
                best = TemplateMatch { score, x, y };
            }
        }
    }

    Ok(best)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn gray(width: u32, height: u32, fill: u8) -> GrayImage {
        GrayImage::from_pixel(width, height, Luma([fill]))
    }

    /// Flat dark screen with a bright textured 3x3 block at (5, 4).
    ///
    /// The block carries its own pattern so the matching window is not flat
    /// (a flat window has zero variance and scores 0 by definition).
    fn screen_with_block() -> GrayImage {
        let mut screen = gray(12, 10, 20);
        for y in 4..7 {
            for x in 5..8 {
                screen.put_pixel(x, y, Luma([230 + (((x + y) % 3) * 5) as u8]));
            }
        }
        screen
    }

    #[test]
    fn test_exact_patch_found_at_location() {
        let screen = screen_with_block();
        // Cut the template straight out of the screen: perfect correlation
        let template = image::imageops::crop_imm(&screen, 5, 4, 3, 3).to_image();

        let m = match_template(&screen, &template).unwrap();
        assert_eq!((m.x, m.y), (5, 4));
        assert!(m.score > 0.999, "score was {}", m.score);
    }

    #[test]
    fn test_similar_patch_scores_high_but_below_one() {
        let screen = screen_with_block();
        let mut template = image::imageops::crop_imm(&screen, 5, 4, 3, 3).to_image();
        // Nudge one pixel so the window is close but no longer an exact
        // (or affine) copy of the template
        let v = template.get_pixel(2, 2).0[0];
        template.put_pixel(2, 2, Luma([v + 8]));

        let m = match_template(&screen, &template).unwrap();
        assert_eq!((m.x, m.y), (5, 4));
        assert!(m.score > 0.8 && m.score < 0.9999, "score was {}", m.score);
    }

    #[test]
    fn test_unrelated_template_scores_low() {
        let screen = screen_with_block();
        // Strong gradient unlike anything in the screen
        let mut template = gray(3, 3, 0);
        for y in 0..3 {
            for x in 0..3 {
                template.put_pixel(x, y, Luma([(x * 80) as u8]));
            }
        }
        let m = match_template(&screen, &template).unwrap();
        assert!(m.score < 0.9, "score was {}", m.score);
    }

    #[test]
    fn test_template_larger_than_screen() {
        let err = match_template(&gray(4, 4, 10), &gray(8, 8, 10)).unwrap_err();
        assert!(matches!(err, KeywordError::CommandFailed(_)));
    }

    #[test]
    fn test_flat_images_score_zero() {
        let m = match_template(&gray(6, 6, 50), &gray(2, 2, 50)).unwrap();
        assert_eq!(m.score, 0.0);
    }

    #[test]
    fn test_click_point_offsets_by_half_template() {
        let m = TemplateMatch { score: 1.0, x: 100, y: 200 };
        assert_eq!(click_point(&m, 40, 20), (120, 210));
    }
}
