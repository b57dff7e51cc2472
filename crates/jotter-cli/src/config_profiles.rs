//! Named CLI profiles stored as JSON under the user's config directory.

use std::collections::BTreeMap;
use std::fmt::Display;
use std::io;
use std::path::{Path, PathBuf};

use jotter_core::config::ClientConfig;
use jotter_core::util::normalize_text_option;
use serde::{Deserialize, Serialize};

pub const PROFILE_ENV: &str = "JOTTER_PROFILE";
pub const DEFAULT_PROFILE: &str = "default";
const FILE_VERSION: u32 = 1;

/// Contents of `cli-config.json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CliProfilesConfig {
    #[serde(default = "current_version")]
    pub version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_profile: Option<String>,
    #[serde(default)]
    pub profiles: BTreeMap<String, CliProfile>,
}

/// Backend settings for one profile. Unset values fall through to the
/// environment or built-in defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CliProfile {
    pub firebase_api_key: Option<String>,
    pub firebase_project_id: Option<String>,
    pub firestore_database: Option<String>,
    pub notes_collection: Option<String>,
    pub share_base_url: Option<String>,
}

const fn current_version() -> u32 {
    FILE_VERSION
}

impl Default for CliProfilesConfig {
    fn default() -> Self {
        Self {
            version: FILE_VERSION,
            active_profile: None,
            profiles: BTreeMap::new(),
        }
    }
}

pub fn config_path() -> Result<PathBuf, String> {
    let base = dirs::config_dir()
        .ok_or_else(|| "Could not locate a config directory for this user".to_string())?;
    Ok(base.join("jotter").join("cli-config.json"))
}

/// Trimmed profile name, `None` when blank.
pub fn normalize_profile_name(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
}

fn file_error(action: &str, path: &Path, error: impl Display) -> String {
    format!("Failed to {action} {}: {error}", path.display())
}

impl CliProfilesConfig {
    pub fn load() -> Result<Self, String> {
        Self::load_from_path(&config_path()?)
    }

    /// A missing file is an empty configuration.
    pub fn load_from_path(path: &Path) -> Result<Self, String> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(error) => return Err(file_error("read", path, error)),
        };
        let mut config: Self =
            serde_json::from_str(&raw).map_err(|error| file_error("parse", path, error))?;
        config.tidy();
        Ok(config)
    }

    pub fn save(&self) -> Result<PathBuf, String> {
        let path = config_path()?;
        self.save_to_path(&path).map(|()| path)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<(), String> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).map_err(|error| file_error("create", dir, error))?;
        }
        let mut tidy = self.clone();
        tidy.tidy();
        let mut json = serde_json::to_string_pretty(&tidy)
            .map_err(|error| format!("Failed to encode CLI config: {error}"))?;
        json.push('\n');
        std::fs::write(path, json).map_err(|error| file_error("write", path, error))
    }

    /// First non-blank of: `explicit`, `JOTTER_PROFILE`, the active profile,
    /// then `default`.
    pub fn resolve_profile_name(&self, explicit: Option<&str>) -> String {
        let from_env = std::env::var(PROFILE_ENV).ok();
        let name = [explicit, from_env.as_deref(), self.active_profile.as_deref()]
            .into_iter()
            .find_map(normalize_profile_name)
            .unwrap_or_else(|| DEFAULT_PROFILE.to_string());
        name
    }

    pub fn profile(&self, name: &str) -> Option<&CliProfile> {
        self.profiles.get(name)
    }

    pub fn profile_mut_or_default(&mut self, name: &str) -> &mut CliProfile {
        self.profiles.entry(name.to_string()).or_default()
    }

    fn tidy(&mut self) {
        self.active_profile = normalize_profile_name(self.active_profile.as_deref());
        self.profiles.values_mut().for_each(CliProfile::tidy);
    }
}

impl CliProfile {
    /// Profile values as a client config, without environment overrides.
    pub fn client_config(&self) -> ClientConfig {
        let mut tidy = self.clone();
        tidy.tidy();
        ClientConfig {
            firebase_api_key: tidy.firebase_api_key,
            firebase_project_id: tidy.firebase_project_id,
            firestore_database: tidy.firestore_database,
            notes_collection: tidy.notes_collection,
            share_base_url: tidy.share_base_url,
            poll_interval_ms: None,
        }
    }

    fn tidy(&mut self) {
        for field in [
            &mut self.firebase_api_key,
            &mut self.firebase_project_id,
            &mut self.firestore_database,
            &mut self.notes_collection,
        ] {
            *field = normalize_text_option(field.take());
        }
        self.share_base_url = normalize_text_option(self.share_base_url.take())
            .map(|url| url.trim_end_matches('/').to_string());
    }
}
