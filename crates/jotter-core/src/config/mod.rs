//! Client configuration.
//!
//! `ClientConfig` is shared by the desktop and CLI clients to locate the
//! Firebase project backing auth and notes. Values come from bundled JSON,
//! CLI profiles, or `JOTTER_*` environment variables.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Error, Result};
use crate::store::{DEFAULT_COLLECTION, DEFAULT_DATABASE, DEFAULT_POLL_INTERVAL};
use crate::util::{is_http_url, normalize_text_option};

pub const ENV_FIREBASE_API_KEY: &str = "JOTTER_FIREBASE_API_KEY";
pub const ENV_FIREBASE_PROJECT_ID: &str = "JOTTER_FIREBASE_PROJECT_ID";
pub const ENV_FIRESTORE_DATABASE: &str = "JOTTER_FIRESTORE_DATABASE";
pub const ENV_NOTES_COLLECTION: &str = "JOTTER_NOTES_COLLECTION";
pub const ENV_SHARE_BASE_URL: &str = "JOTTER_SHARE_BASE_URL";
pub const ENV_POLL_INTERVAL_MS: &str = "JOTTER_POLL_INTERVAL_MS";

/// Public client configuration.
///
/// Firebase web API keys identify the project and are safe to ship.
/// Secret credentials must never be stored here.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    #[serde(default)]
    pub firebase_api_key: Option<String>,
    #[serde(default)]
    pub firebase_project_id: Option<String>,
    #[serde(default)]
    pub firestore_database: Option<String>,
    #[serde(default)]
    pub notes_collection: Option<String>,
    #[serde(default)]
    pub share_base_url: Option<String>,
    #[serde(default)]
    pub poll_interval_ms: Option<u64>,
}

impl ClientConfig {
    /// Read `JOTTER_*` variables from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let poll_interval_ms = match normalize_text_option(lookup(ENV_POLL_INTERVAL_MS)) {
            Some(raw) => Some(raw.parse::<u64>().map_err(|_| {
                Error::Config(format!("{ENV_POLL_INTERVAL_MS} must be a whole number: {raw}"))
            })?),
            None => None,
        };

        Ok(Self {
            firebase_api_key: normalize_text_option(lookup(ENV_FIREBASE_API_KEY)),
            firebase_project_id: normalize_text_option(lookup(ENV_FIREBASE_PROJECT_ID)),
            firestore_database: normalize_text_option(lookup(ENV_FIRESTORE_DATABASE)),
            notes_collection: normalize_text_option(lookup(ENV_NOTES_COLLECTION)),
            share_base_url: normalize_text_option(lookup(ENV_SHARE_BASE_URL)),
            poll_interval_ms,
        })
    }

    /// Fill every unset field from `fallback`.
    #[must_use]
    pub fn or(self, fallback: Self) -> Self {
        Self {
            firebase_api_key: self.firebase_api_key.or(fallback.firebase_api_key),
            firebase_project_id: self.firebase_project_id.or(fallback.firebase_project_id),
            firestore_database: self.firestore_database.or(fallback.firestore_database),
            notes_collection: self.notes_collection.or(fallback.notes_collection),
            share_base_url: self.share_base_url.or(fallback.share_base_url),
            poll_interval_ms: self.poll_interval_ms.or(fallback.poll_interval_ms),
        }
    }

    /// Base URL share links are built on, when configured.
    pub fn share_base(&self) -> Result<Option<Url>> {
        let Some(raw) = normalize_text_option(self.share_base_url.clone()) else {
            return Ok(None);
        };
        if !is_http_url(&raw) {
            return Err(Error::Config(
                "share_base_url must include http:// or https://".to_string(),
            ));
        }
        Url::parse(&raw)
            .map(Some)
            .map_err(|error| Error::Config(format!("invalid share_base_url: {error}")))
    }

    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval_ms
            .map_or(DEFAULT_POLL_INTERVAL, Duration::from_millis)
    }
}

/// Everything needed to talk to one Firebase project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirebaseSettings {
    pub api_key: String,
    pub project_id: String,
    pub database: String,
    pub collection: String,
    pub poll_interval: Duration,
}

/// Resolve Firebase settings from `config`.
///
/// `Ok(None)` when neither the API key nor the project id is set. Setting
/// only one of them is a configuration error.
pub fn resolve_firebase_config(config: &ClientConfig) -> Result<Option<FirebaseSettings>> {
    let api_key = normalize_text_option(config.firebase_api_key.clone());
    let project_id = normalize_text_option(config.firebase_project_id.clone());

    let (api_key, project_id) = match (api_key, project_id) {
        (None, None) => return Ok(None),
        (Some(api_key), Some(project_id)) => (api_key, project_id),
        (Some(_), None) => {
            return Err(Error::Config(format!(
                "Firebase is partially configured: {ENV_FIREBASE_PROJECT_ID} is missing"
            )))
        }
        (None, Some(_)) => {
            return Err(Error::Config(format!(
                "Firebase is partially configured: {ENV_FIREBASE_API_KEY} is missing"
            )))
        }
    };

    Ok(Some(FirebaseSettings {
        api_key,
        project_id,
        database: normalize_text_option(config.firestore_database.clone())
            .unwrap_or_else(|| DEFAULT_DATABASE.to_string()),
        collection: normalize_text_option(config.notes_collection.clone())
            .unwrap_or_else(|| DEFAULT_COLLECTION.to_string()),
        poll_interval: config.poll_interval(),
    }))
}

/// Parse bundled client config JSON. Blank input yields the empty config.
pub fn parse_client_config(payload: &str) -> Result<ClientConfig> {
    if payload.trim().is_empty() {
        return Ok(ClientConfig::default());
    }
    serde_json::from_str(payload)
        .map_err(|error| Error::Config(format!("invalid client config JSON: {error}")))
}
