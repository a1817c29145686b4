//! Computer-vision helpers for screenshot-based actions
//!
//! - `template`: normalized cross-correlation template matching
//! - `ocr`: word recognition via the tesseract binary

mod ocr;
mod template;

pub use ocr::{find_word, parse_tsv, recognize, OcrWord};
pub use template::{click_point, match_template, TemplateMatch};
