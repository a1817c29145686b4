//! Visible-text snapshot from the UI hierarchy
//!
//! `uiautomator dump` writes the current window hierarchy as XML; the text
//! attributes of that dump are the set of strings a user can currently read
//! on screen.

use crate::adb;
use crate::error::Result;
use std::path::Path;

const REMOTE_DUMP_PATH: &str = "/sdcard/dut_vision_window_dump.xml";

/// Snapshot the trimmed, non-empty visible texts on screen
pub async fn visible_texts(adb_path: &Path, device_id: &str) -> Result<Vec<String>> {
    adb::shell(
        adb_path,
        device_id,
        &format!("uiautomator dump {}", REMOTE_DUMP_PATH),
        10_000,
    )
    .await?;

    let xml = adb::shell(
        adb_path,
        device_id,
        &format!("cat {}", REMOTE_DUMP_PATH),
        5_000,
    )
    .await?;

    Ok(extract_texts(&xml))
}

lazy_static::lazy_static! {
    static ref TEXT_ATTR_RE: regex::Regex = regex::Regex::new(r#"text="([^"]*)""#).unwrap();
}

/// Pull non-empty `text="..."` attributes out of a hierarchy dump
pub fn extract_texts(xml: &str) -> Vec<String> {
    TEXT_ATTR_RE.captures_iter(xml)
        .map(|caps| unescape_xml(&caps[1]))
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
        .collect()
}

/// Decode the entities uiautomator emits in attribute values
fn unescape_xml(value: &str) -> String {
    value
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&#10;", "\n")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    const DUMP: &str = r#"<?xml version='1.0' encoding='UTF-8'?>
<hierarchy rotation="0">
  <node index="0" text="" resource-id="android:id/content" class="android.widget.FrameLayout">
    <node index="0" text="Settings" class="android.widget.TextView" />
    <node index="1" text="  Wi-Fi  " class="android.widget.TextView" />
    <node index="2" text="Tom &amp; Jerry" class="android.widget.TextView" />
    <node index="3" text="" class="android.widget.ImageView" />
  </node>
</hierarchy>"#;

    #[test]
    fn test_extract_texts_skips_empty_and_trims() {
        let texts = extract_texts(DUMP);
        assert_eq!(texts, vec!["Settings", "Wi-Fi", "Tom & Jerry"]);
    }

    #[test]
    fn test_extract_texts_empty_dump() {
        assert!(extract_texts("<hierarchy/>").is_empty());
    }

    #[test]
    fn test_unescape_entities() {
        assert_eq!(unescape_xml("a &lt;b&gt; &quot;c&quot; &apos;d&apos;"), "a <b> \"c\" 'd'");
    }
}
