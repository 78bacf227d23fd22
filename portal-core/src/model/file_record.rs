//! ``src/model/file_record.rs``
//! ============================================================================
//! # `FileRecord`: one stored file as reported by the directory endpoints

use chrono::{DateTime, Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Display format for upload timestamps, e.g. `Jan 1, 2024, 12:00 AM`.
const DISPLAY_FORMAT: &str = "%b %-d, %Y, %I:%M %p";

/// A file entry from `GET /files` or `GET /search`.
///
/// Records are only ever produced by deserializing a response and are never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Opaque identifier, stable across listings.
    pub id: String,

    /// Display name; also the download key. Not guaranteed unique.
    pub name: String,

    /// ISO-like timestamp string; may not parse.
    #[serde(rename = "uploadDate")]
    pub upload_date: String,
}

impl FileRecord {
    pub fn new(id: impl Into<String>, name: impl Into<String>, upload_date: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            upload_date: upload_date.into(),
        }
    }

    /// Upload date in local time, or the raw string when it does not parse.
    pub fn display_date(&self) -> String {
        format_upload_date(&self.upload_date)
    }
}

/// Parse failures are not errors: the raw value is shown unchanged.
pub fn format_upload_date(raw: &str) -> String {
    let trimmed = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return dt.with_timezone(&Local).format(DISPLAY_FORMAT).to_string();
    }

    // naive ISO timestamps, with or without fractional seconds
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return naive.format(DISPLAY_FORMAT).to_string();
        }
    }

    raw.to_string()
}
