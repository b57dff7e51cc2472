//! Desktop client configuration: build-time embedded JSON plus runtime env.

use jotter_core::config::{parse_client_config, ClientConfig};
use url::Url;

/// Where the desktop app "lives" when no web app URL is configured.
///
/// Share links built from it can be passed back to `jotter-desktop` as a
/// launch argument.
pub const DESKTOP_LOCATION: &str = "jotter://app/";

const EMBEDDED_CONFIG: &str = include_str!(concat!(env!("OUT_DIR"), "/desktop-client-config.json"));

/// Runtime environment values win over the embedded ones.
pub fn load_client_config() -> jotter_core::Result<ClientConfig> {
    let embedded = parse_embedded_config(EMBEDDED_CONFIG);
    Ok(ClientConfig::from_env()?.or(embedded))
}

/// A broken embedded payload is logged and ignored.
pub fn parse_embedded_config(raw: &str) -> ClientConfig {
    parse_client_config(raw).unwrap_or_else(|error| {
        tracing::warn!("Failed to parse embedded client config: {}", error);
        ClientConfig::default()
    })
}

/// Base URL for share links: the configured web app, or the desktop itself.
pub fn share_location(config: &ClientConfig) -> jotter_core::Result<Url> {
    match config.share_base()? {
        Some(url) => Ok(url),
        None => Url::parse(DESKTOP_LOCATION)
            .map_err(|error| jotter_core::Error::Config(error.to_string())),
    }
}
