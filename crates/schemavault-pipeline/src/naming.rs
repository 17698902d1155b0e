//! Artifact file names.

use chrono::{DateTime, SecondsFormat, Utc};

/// Which pipeline produced a scratch file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Dump,
    Restore,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Dump => "dump",
            Operation::Restore => "restore",
        }
    }
}

/// Replaces every character outside `[A-Za-z0-9_]` with `_`.
pub fn sanitize_schema(schema: &str) -> String {
    schema
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

/// `<operation>-<sanitized schema>-<timestamp>.yaml`, where the timestamp is
/// an ISO-8601 UTC instant with millisecond precision and `:`/`.` turned into `-`.
pub fn artifact_file_name(operation: Operation, schema: &str, at: DateTime<Utc>) -> String {
    let timestamp = at
        .to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace([':', '.'], "-");
    format!(
        "{}-{}-{}.yaml",
        operation.as_str(),
        sanitize_schema(schema),
        timestamp
    )
}
