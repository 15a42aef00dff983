//! Line codec for the message log.
//!
//! Every record occupies one line:
//!
//! ```text
//! [2024-05-01 14:03:22] (Assistente) Mensagem: hello | Imagem: https://host/pic.png
//! ```
//!
//! The ` | Imagem: ...` suffix is written only when the record carries an image reference.
//! Nothing is escaped, so a message that itself contains ` | Imagem: ` is split at the first
//! occurrence when read back.
//!
//! Parsing is best effort. Candidate patterns are tried in order and the first match wins; a
//! line matching none of them becomes [`Record::default`] instead of an error.

use super::types::Record;
use regex::{Captures, Regex};
use std::sync::OnceLock;
use time::{OffsetDateTime, format_description::BorrowedFormatItem, macros::format_description};

const TIMESTAMP_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

/// Timestamp used when the clock cannot be formatted.
const FALLBACK_TIMESTAMP: &str = "1970-01-01 00:00:00";

/// Line with an image segment. The pipe before `Imagem:` is optional.
const WITH_IMAGE_PATTERN: &str = r"\[(.*?)\] \((.*?)\) Mensagem: (.*?) \|? Imagem: (.*)";
/// Line without an image segment; the message runs to the end of the line.
const MESSAGE_ONLY_PATTERN: &str = r"\[(.*?)\] \((.*?)\) Mensagem: (.*?)$";

struct LinePattern {
    name: &'static str,
    regex: Regex,
}

impl LinePattern {
    fn compile(name: &'static str, pattern: &str) -> Self {
        Self {
            name,
            regex: Regex::new(pattern).expect("line pattern is a valid regex"),
        }
    }

    fn capture(&self, line: &str) -> Option<Record> {
        self.regex.captures(line).map(|caps| {
            Record::new(
                group(&caps, 1),
                group(&caps, 2),
                group(&caps, 3),
                caps.get(4).map(|value| value.as_str().to_string()),
            )
        })
    }
}

fn group(caps: &Captures<'_>, index: usize) -> String {
    caps.get(index)
        .map(|value| value.as_str().to_string())
        .unwrap_or_default()
}

fn line_patterns() -> &'static [LinePattern] {
    static PATTERNS: OnceLock<Vec<LinePattern>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        vec![
            LinePattern::compile("with_image", WITH_IMAGE_PATTERN),
            LinePattern::compile("message_only", MESSAGE_ONLY_PATTERN),
        ]
    })
}

/// Current local time in the log's `YYYY-MM-DD HH:MM:SS` format.
///
/// Falls back to UTC when the local offset cannot be determined.
pub fn current_timestamp() -> String {
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    format_timestamp(now)
}

/// Format an instant with second resolution.
pub fn format_timestamp(instant: OffsetDateTime) -> String {
    instant
        .format(TIMESTAMP_FORMAT)
        .unwrap_or_else(|_| FALLBACK_TIMESTAMP.to_string())
}

/// Build a record stamped with the current time.
pub fn stamp(source: &str, message: &str, image_reference: Option<&str>) -> Record {
    Record::new(
        current_timestamp(),
        source,
        message,
        image_reference.map(str::to_string),
    )
}

/// Render a record as one log line, including the trailing `\n`.
pub fn format_line(record: &Record) -> String {
    let mut line = format!(
        "[{}] ({}) Mensagem: {}",
        record.timestamp, record.source, record.message
    );
    if let Some(image) = record.image_reference.as_deref().filter(|v| !v.is_empty()) {
        line.push_str(" | Imagem: ");
        line.push_str(image);
    }
    line.push('\n');
    line
}

/// Recover a record from one log line. Never fails.
pub fn parse_line(line: &str) -> Record {
    for pattern in line_patterns() {
        if let Some(record) = pattern.capture(line) {
            tracing::trace!(pattern = pattern.name, "Parsed log line");
            return record;
        }
    }
    tracing::warn!(line, "Unrecognized log line; returning empty record");
    Record::default()
}
