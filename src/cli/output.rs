//! Colored terminal output helpers.
//!
//! All user-facing console output goes through these functions so we get
//! consistent styling across every command.

use comfy_table::{ContentArrangement, Table};
use console::{style, StyledObject};
use serde_json::Value;

use crate::backend::SecretData;
use crate::engine::Mount;

/// Turn styling on or off for both stdout and stderr.
pub fn set_colors(enabled: bool) {
    console::set_colors_enabled(enabled);
    console::set_colors_enabled_stderr(enabled);
}

/// Kind of one-line status message, which fixes its marker and color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Success,
    Failure,
    Warning,
    Info,
}

impl Status {
    fn marker(self) -> StyledObject<&'static str> {
        match self {
            Status::Success => style("\u{2713}").green().bold(),
            Status::Failure => style("\u{2717}").red().bold(),
            Status::Warning => style("\u{26a0}").yellow().bold(),
            Status::Info => style("\u{2139}").blue().bold(),
        }
    }

    /// Failures and warnings go to stderr.
    fn on_stderr(self) -> bool {
        matches!(self, Status::Failure | Status::Warning)
    }

    fn line(self, msg: &str) -> String {
        let marker = if self.on_stderr() {
            self.marker().for_stderr()
        } else {
            self.marker()
        };
        format!("{marker} {msg}")
    }

    fn print(self, msg: &str) {
        if self.on_stderr() {
            eprintln!("{}", self.line(msg));
        } else {
            println!("{}", self.line(msg));
        }
    }
}

pub fn success(msg: &str) {
    Status::Success.print(msg);
}

pub fn error(msg: &str) {
    Status::Failure.print(msg);
}

pub fn warning(msg: &str) {
    Status::Warning.print(msg);
}

pub fn info(msg: &str) {
    Status::Info.print(msg);
}

/// Dimmed follow-up hint under a status line.
pub fn tip(msg: &str) {
    println!("{} {}", style("\u{2192}").dim(), style(msg).dim());
}

/// Print one name per line, indented.
pub fn print_list(items: &[String]) {
    for item in items {
        println!("  {item}");
    }
}

/// Version column for a mount: the KV version, or `N/A`.
pub fn version_label(mount: &Mount) -> String {
    mount
        .engine()
        .kv_version()
        .map_or_else(|| "N/A".to_string(), |v| v.to_string())
}

/// Print a table of mounts (Mount, Description, Type, Version).
pub fn print_mounts_table(mounts: &[Mount]) {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Mount", "Description", "Type", "Version"]);

    for m in mounts {
        table.add_row(vec![
            m.name().to_string(),
            m.description().unwrap_or_default().to_string(),
            m.engine().engine_type().to_string(),
            version_label(m),
        ]);
    }

    println!("{table}");
}

/// Print a secret's fields as a Key/Value table.
pub fn print_secret_table(data: &SecretData) {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Key", "Value"]);

    for (key, value) in data {
        table.add_row(vec![key.clone(), display_value(value)]);
    }

    println!("{table}");
}

/// Strings print bare; everything else as compact JSON.
fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{KvVersion, SecretEngine};
    use serde_json::json;

    #[test]
    fn version_label_for_kv_and_other() {
        let kv = Mount::new("secret", SecretEngine::Kv(KvVersion::V2), None);
        let transit = Mount::new("transit", SecretEngine::Other("transit".into()), None);
        assert_eq!(version_label(&kv), "2");
        assert_eq!(version_label(&transit), "N/A");
    }

    #[test]
    fn status_lines_and_streams() {
        set_colors(false);
        assert_eq!(Status::Success.line("Vault 'dev' added"), "\u{2713} Vault 'dev' added");
        assert_eq!(Status::Warning.line("gone"), "\u{26a0} gone");
        assert!(Status::Failure.on_stderr());
        assert!(Status::Warning.on_stderr());
        assert!(!Status::Success.on_stderr());
        assert!(!Status::Info.on_stderr());
    }

    #[test]
    fn display_value_strips_string_quotes() {
        assert_eq!(display_value(&json!("hunter2")), "hunter2");
        assert_eq!(display_value(&json!(42)), "42");
        assert_eq!(display_value(&json!({"a": true})), r#"{"a":true}"#);
    }
}
