//! Bakes `JOTTER_*` build-time settings into `desktop-client-config.json`
//! so release builds run without a `.env` next to them.

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

/// Environment variable and the `ClientConfig` field it fills.
const FIELDS: [(&str, &str); 6] = [
    ("JOTTER_FIREBASE_API_KEY", "firebase_api_key"),
    ("JOTTER_FIREBASE_PROJECT_ID", "firebase_project_id"),
    ("JOTTER_FIRESTORE_DATABASE", "firestore_database"),
    ("JOTTER_NOTES_COLLECTION", "notes_collection"),
    ("JOTTER_SHARE_BASE_URL", "share_base_url"),
    ("JOTTER_POLL_INTERVAL_MS", "poll_interval_ms"),
];

fn main() {
    for (var, _) in FIELDS {
        println!("cargo:rerun-if-env-changed={var}");
    }
    if let Err(error) = embed_client_config() {
        println!("cargo:warning=failed to generate desktop client config: {error}");
    }
}

fn embed_client_config() -> io::Result<()> {
    let manifest_dir =
        env::var_os("CARGO_MANIFEST_DIR").map_or_else(|| PathBuf::from("."), PathBuf::from);
    let dotenv = manifest_dir.join("../../.env");
    if dotenv.exists() {
        let _ = dotenvy::from_path(&dotenv);
    }

    let out_dir = env::var_os("OUT_DIR")
        .map(PathBuf::from)
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "OUT_DIR is not set"))?;

    let mut config = Map::new();
    for (var, field) in FIELDS {
        let Some(value) = env::var(var).ok().filter(|value| !value.trim().is_empty()) else {
            continue;
        };
        let value = value.trim();
        let json = if field == "poll_interval_ms" {
            match value.parse::<u64>() {
                Ok(millis) => Value::from(millis),
                Err(_) => continue,
            }
        } else {
            Value::from(value)
        };
        config.insert(field.to_string(), json);
    }

    write_pretty(&out_dir.join("desktop-client-config.json"), &Value::Object(config))
}

fn write_pretty(path: &Path, value: &Value) -> io::Result<()> {
    let content = serde_json::to_string_pretty(value)
        .map_err(|error| io::Error::new(io::ErrorKind::InvalidData, error))?;
    fs::write(path, content)
}
