use serde::{Deserialize, Serialize};

use crate::utils::format_uploaded;

/// Server-reported metadata for one stored file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    pub filename: String,
    /// Missing timestamps render as blank; the row is keyed by filename.
    #[serde(default)]
    pub uploaded: String,
}

impl FileRecord {
    pub fn new(filename: impl Into<String>, uploaded: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            uploaded: uploaded.into(),
        }
    }

    pub fn uploaded_display(&self) -> String {
        format_uploaded(&self.uploaded)
    }
}

/// A share link generated by the server for one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareLink {
    pub filename: String,
    pub url: String,
}

/// Loose view of any JSON reply body. Every field is optional because the
/// server only sends the ones relevant to the call.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct Reply {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub share_url: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
}

impl Reply {
    /// Parse a reply body, treating anything that is not a JSON object as empty.
    pub fn parse(body: &[u8]) -> Self {
        serde_json::from_slice(body).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_ignores_extra_fields() {
        let json = r#"{"filename": "a.txt", "uploaded": "2024-05-01 10:00:00", "s3_key": "bob/20240501_a.txt"}"#;
        let record: FileRecord = serde_json::from_str(json).expect("record should parse");
        assert_eq!(record, FileRecord::new("a.txt", "2024-05-01 10:00:00"));
    }

    #[test]
    fn test_reply_parse_non_json_is_empty() {
        let reply = Reply::parse(b"<html>Internal Server Error</html>");
        assert!(reply.error.is_none());
        assert!(reply.token.is_none());
    }

    #[test]
    fn test_reply_parse_error_field() {
        let reply = Reply::parse(br#"{"error": "invalid credentials"}"#);
        assert_eq!(reply.error.as_deref(), Some("invalid credentials"));
    }
}
