//! `vault-util list-mounts` — show the secret mounts on a vault.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::cli::machine::{emit, Report};
use crate::cli::{connect, output, Cli};
use crate::engine::{list_mounts, Mount};
use crate::errors::Result;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MountNames {
    pub mount_names: Vec<String>,
}

impl Report for MountNames {
    fn print_console(&self) {
        output::info(&format!("{} secret mount(s)", self.mount_names.len()));
        output::print_list(&self.mount_names);
    }
}

#[derive(Debug, Serialize)]
pub struct MountDetail {
    #[serde(rename = "type")]
    pub engine_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub description: String,
}

#[derive(Debug, Serialize)]
pub struct MountDetails {
    pub mounts: BTreeMap<String, MountDetail>,
    #[serde(skip)]
    rows: Vec<Mount>,
}

impl MountDetails {
    pub fn new(rows: Vec<Mount>) -> Self {
        let mounts = rows
            .iter()
            .map(|m| {
                let detail = MountDetail {
                    engine_type: m.engine().engine_type().to_string(),
                    version: m.engine().kv_version().map(|v| v.to_string()),
                    description: m.description().unwrap_or_default().to_string(),
                };
                (m.name().to_string(), detail)
            })
            .collect();
        Self { mounts, rows }
    }
}

impl Report for MountDetails {
    fn print_console(&self) {
        output::print_mounts_table(&self.rows);
    }
}

/// Execute the `list-mounts` command.
pub fn execute(cli: &Cli, detail: bool) -> Result<()> {
    let backend = connect(cli)?;
    let mounts = list_mounts(&backend)?;

    if detail {
        emit(cli, &MountDetails::new(mounts))
    } else {
        let mount_names = mounts.iter().map(|m| m.name().to_string()).collect();
        emit(cli, &MountNames { mount_names })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::machine::render;
    use crate::engine::{KvVersion, SecretEngine};
    use serde_json::{json, Value};

    #[test]
    fn detail_json_omits_version_for_other_engines() {
        let report = MountDetails::new(vec![
            Mount::new(
                "secret/",
                SecretEngine::Kv(KvVersion::V2),
                Some("key/value".into()),
            ),
            Mount::new("transit/", SecretEngine::Other("transit".into()), None),
        ]);

        let value: Value = serde_json::from_str(&render(&report).unwrap()).unwrap();
        assert_eq!(
            value,
            json!({
                "exitCode": 0,
                "mounts": {
                    "secret/": {"type": "kv", "version": "2", "description": "key/value"},
                    "transit/": {"type": "transit", "description": ""}
                }
            })
        );
    }
}
