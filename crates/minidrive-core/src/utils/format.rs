use chrono::NaiveDateTime;

/// Timestamp layouts the server is known to send for `uploaded`.
const UPLOADED_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Format an upload timestamp for display.
/// Unknown layouts are shown as sent.
pub fn format_uploaded(uploaded: &str) -> String {
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(uploaded) {
        return dt.format("%b %d, %Y %H:%M").to_string();
    }
    for fmt in UPLOADED_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(uploaded, fmt) {
            return dt.format("%b %d, %Y %H:%M").to_string();
        }
    }
    uploaded.to_string()
}

/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Case-insensitive substring check. `needle` must already be lowercase.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}
