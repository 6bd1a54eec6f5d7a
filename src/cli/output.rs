//! Output formatting for CLI commands

use serde::Serialize;

use crate::notification::NotifierConfig;

/// Format output as pretty JSON
pub fn format_json<T: Serialize>(data: &T) -> String {
    serde_json::to_string_pretty(data).unwrap_or_else(|_| "{}".to_string())
}

/// 通知器列表：JSON 或每行一个
pub fn format_notifiers(notifiers: &[NotifierConfig], json: bool) -> String {
    if json {
        return format_json(&notifiers);
    }

    notifiers
        .iter()
        .map(|n| {
            let script = n.script_suffix.as_deref().unwrap_or(&n.name);
            if n.script_fields.is_empty() {
                format!("{} -> script.{}", n.name, script)
            } else {
                format!("{} -> script.{} ({} mapped fields)", n.name, script, n.script_fields.len())
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
