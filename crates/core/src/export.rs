//! Comment export
//!
//! Renders the current comment list to a portable string. JSON carries the
//! stable interchange fields only (id, text, page position, timestamp);
//! normalized coordinates and anchors are implementation detail and stay
//! out of exports. Markdown is a human-readable digest with one bullet per
//! comment.

use chrono::{SecondsFormat, TimeZone, Utc};
use pin_model::Comment;
use serde::Serialize;
use tracing::warn;

/// Export rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Json,
    Markdown,
}

#[derive(Serialize)]
struct ExportRecord<'a> {
    id: &'a str,
    text: &'a str,
    x: f32,
    y: f32,
    timestamp: i64,
}

/// Render the comment list in the requested format, preserving insertion
/// order.
///
/// An empty list exports to `"[]"` as JSON and the empty string as
/// Markdown.
pub fn export_comments(comments: &[Comment], format: ExportFormat) -> String {
    match format {
        ExportFormat::Json => export_json(comments),
        ExportFormat::Markdown => export_markdown(comments),
    }
}

fn export_json(comments: &[Comment]) -> String {
    let records: Vec<ExportRecord<'_>> = comments
        .iter()
        .map(|c| ExportRecord {
            id: &c.id,
            text: &c.text,
            x: c.x,
            y: c.y,
            timestamp: c.timestamp,
        })
        .collect();

    match serde_json::to_string_pretty(&records) {
        Ok(json) => json,
        Err(err) => {
            warn!(error = %err, "comment export serialization failed");
            "[]".to_string()
        }
    }
}

fn export_markdown(comments: &[Comment]) -> String {
    if comments.is_empty() {
        return String::new();
    }

    let mut out = String::from("# Comments\n\n");
    for comment in comments {
        out.push_str(&format!(
            "- ({}, {}) {} \u{2014} {}\n",
            comment.x,
            comment.y,
            escape_markdown(&comment.text),
            format_timestamp(comment.timestamp),
        ));
    }

    out
}

/// Escape characters Markdown would otherwise treat as formatting.
fn escape_markdown(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(ch, '\\' | '`' | '*' | '_' | '[' | ']' | '#') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// Millisecond Unix timestamp as RFC 3339 UTC; out-of-range values fall
/// back to the raw number.
fn format_timestamp(ts: i64) -> String {
    match Utc.timestamp_millis_opt(ts).single() {
        Some(datetime) => datetime.to_rfc3339_opts(SecondsFormat::Millis, true),
        None => ts.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comment(id: &str, text: &str, x: f32, y: f32, timestamp: i64) -> Comment {
        Comment {
            id: id.to_string(),
            text: text.to_string(),
            x,
            y,
            timestamp,
            nx: Some(0.5),
            ny: Some(0.5),
            anchor: None,
        }
    }

    #[test]
    fn test_json_export_carries_interchange_fields_only() {
        let comments = vec![comment("c1", "note", 10.0, 20.0, 1_700_000_000_000)];
        let json = export_comments(&comments, ExportFormat::Json);

        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        let record = &parsed[0];
        assert_eq!(record["id"], "c1");
        assert_eq!(record["text"], "note");
        assert_eq!(record["x"], 10.0);
        assert_eq!(record["timestamp"], 1_700_000_000_000i64);
        // Normalized coordinates and anchors do not leak into exports.
        assert!(record.get("nx").is_none());
        assert!(record.get("anchor").is_none());
    }

    #[test]
    fn test_json_export_of_empty_list() {
        assert_eq!(export_comments(&[], ExportFormat::Json), "[]");
    }

    #[test]
    fn test_markdown_export_of_empty_list_is_empty_string() {
        assert_eq!(export_comments(&[], ExportFormat::Markdown), "");
    }

    #[test]
    fn test_markdown_export_layout() {
        let comments = vec![
            comment("c1", "first note", 10.0, 20.0, 0),
            comment("c2", "second note", 30.5, 40.5, 0),
        ];
        let md = export_comments(&comments, ExportFormat::Markdown);

        assert!(md.starts_with("# Comments\n\n"));
        assert!(md.contains("- (10, 20) first note \u{2014} 1970-01-01T00:00:00.000Z"));
        assert!(md.contains("- (30.5, 40.5) second note"));
    }

    #[test]
    fn test_markdown_escapes_formatting_characters() {
        let comments = vec![comment("c1", "*bold* [link] `code` #tag", 0.0, 0.0, 0)];
        let md = export_comments(&comments, ExportFormat::Markdown);
        assert!(md.contains(r"\*bold\* \[link\] \`code\` \#tag"));
    }

    #[test]
    fn test_export_preserves_insertion_order() {
        let comments = vec![
            comment("b", "second added first", 0.0, 0.0, 200),
            comment("a", "first added last", 0.0, 0.0, 100),
        ];

        let json = export_comments(&comments, ExportFormat::Json);
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed[0]["id"], "b");
        assert_eq!(parsed[1]["id"], "a");
    }

    #[test]
    fn test_out_of_range_timestamp_falls_back_to_raw() {
        assert_eq!(format_timestamp(i64::MAX), i64::MAX.to_string());
    }
}
