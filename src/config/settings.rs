use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{Result, VaultUtilError};

use super::instance::VaultInstance;

/// Saved vault connections, loaded from `~/.vault-util-settings.json`.
///
/// A missing file is the same as a file with no vaults in it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Vault connections keyed by the name used with `--vault-name`.
    #[serde(default)]
    pub vaults: BTreeMap<String, VaultInstance>,
}

// ── Implementation ───────────────────────────────────────────────────

impl Settings {
    /// Name of the settings file in the user's home directory.
    const FILE_NAME: &'static str = ".vault-util-settings.json";

    /// Default settings path: `$HOME/.vault-util-settings.json`.
    pub fn default_path() -> Result<PathBuf> {
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .map_err(|_| {
                VaultUtilError::Settings("cannot determine the user home directory".into())
            })?;
        Ok(Self::path_from_home(Path::new(&home)))
    }

    /// Settings path inside a given home directory.
    pub fn path_from_home(home: &Path) -> PathBuf {
        home.join(Self::FILE_NAME)
    }

    /// Whether a settings file is present at `path`.
    pub fn exists(path: &Path) -> bool {
        path.is_file()
    }

    /// Load settings from `path`.
    ///
    /// A missing file is an error here; use `load_or_default` when absence
    /// should mean "no vaults configured".
    pub fn load(path: &Path) -> Result<Self> {
        if !Self::exists(path) {
            return Err(VaultUtilError::SettingsNotFound(path.to_path_buf()));
        }

        let contents = fs::read_to_string(path)?;

        let settings: Settings = serde_json::from_str(&contents).map_err(|e| {
            VaultUtilError::Settings(format!("Failed to parse {}: {e}", path.display()))
        })?;

        debug!(path = %path.display(), vaults = settings.vaults.len(), "settings file read");
        Ok(settings)
    }

    /// Load settings from `path`, or empty settings if the file is missing.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if Self::exists(path) {
            Self::load(path)
        } else {
            debug!(path = %path.display(), "settings file does not exist, using blank settings");
            Ok(Self::default())
        }
    }

    /// Write settings to `path`, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string_pretty(self)
            .map_err(|e| VaultUtilError::Serialization(format!("settings: {e}")))?;
        fs::write(path, json)?;

        // The file holds vault tokens; keep it owner-only on Unix.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
        }

        Ok(())
    }

    /// Add a vault, replacing any existing entry with the same name.
    ///
    /// Returns `true` if an existing entry was replaced.
    pub fn add_vault(&mut self, name: &str, instance: VaultInstance) -> bool {
        let replaced = self.vaults.insert(name.to_string(), instance).is_some();
        if replaced {
            debug!(vault = %name, "vault already exists, updating settings");
        }
        replaced
    }

    /// Remove a vault. Returns `false` if it was not present.
    pub fn delete_vault(&mut self, name: &str) -> bool {
        self.vaults.remove(name).is_some()
    }

    /// Look up a saved vault by name.
    pub fn vault(&self, name: &str) -> Result<&VaultInstance> {
        self.vaults
            .get(name)
            .ok_or_else(|| VaultUtilError::VaultNotConfigured(name.to_string()))
    }

    /// Saved vault names, sorted.
    pub fn vault_names(&self) -> Vec<String> {
        self.vaults.keys().cloned().collect()
    }
}

// ── Tests ────────────────────────────────────────────────────────────
