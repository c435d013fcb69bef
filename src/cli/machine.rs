//! Machine-readable output.
//!
//! With `--machine-output` every invocation prints exactly one JSON document
//! on stdout: the command's report plus an `exitCode` field, or an
//! `{"exitCode", "errorMessage"}` document on failure.

use serde::Serialize;

use crate::cli::{output, Cli};
use crate::errors::{Result, VaultUtilError};

/// A command result that can be shown on the console or as JSON.
pub trait Report: Serialize {
    /// Human-readable rendering.
    fn print_console(&self);
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Envelope<'a, T: Serialize> {
    exit_code: i32,
    #[serde(flatten)]
    body: &'a T,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorReport<'a> {
    exit_code: i32,
    error_message: &'a str,
}

/// Render a successful report as a JSON document.
pub fn render<T: Serialize>(report: &T) -> Result<String> {
    serde_json::to_string(&Envelope {
        exit_code: 0,
        body: report,
    })
    .map_err(|e| VaultUtilError::Serialization(e.to_string()))
}

/// Render a failure as a JSON document.
pub fn render_error(err: &VaultUtilError) -> String {
    let message = err.to_string();
    let report = ErrorReport {
        exit_code: err.exit_code(),
        error_message: &message,
    };
    // Two plain fields; serialization cannot fail.
    serde_json::to_string(&report).unwrap_or_default()
}

/// Print a report in the format selected on the command line.
pub fn emit<R: Report>(cli: &Cli, report: &R) -> Result<()> {
    if cli.machine_output {
        println!("{}", render(report)?);
    } else {
        report.print_console();
    }
    Ok(())
}

/// Print a failure in the format selected on the command line.
pub fn emit_error(machine_output: bool, err: &VaultUtilError) {
    if machine_output {
        println!("{}", render_error(err));
    } else {
        output::error(&err.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct Sample {
        secret_exists: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        secret_key: Option<String>,
    }

    #[test]
    fn success_report_carries_exit_code() {
        let rendered = render(&Sample {
            secret_exists: true,
            secret_key: Some("secret/app".into()),
        })
        .unwrap();
        let value: Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(
            value,
            json!({"exitCode": 0, "secretExists": true, "secretKey": "secret/app"})
        );
    }

    #[test]
    fn absent_optional_fields_are_omitted() {
        let rendered = render(&Sample {
            secret_exists: false,
            secret_key: None,
        })
        .unwrap();
        assert_eq!(rendered, r#"{"exitCode":0,"secretExists":false}"#);
    }

    #[test]
    fn error_report_uses_error_exit_code() {
        let err = VaultUtilError::MountNotFound("nope/".into());
        let value: Value = serde_json::from_str(&render_error(&err)).unwrap();
        assert_eq!(value["exitCode"], json!(250));
        assert_eq!(value["errorMessage"], json!(err.to_string()));
    }
}
