//! Small helpers shared by config, auth and the stores.

use chrono::Utc;

/// Trimmed text, or `None` when absent or blank.
pub fn normalize_text_option(value: Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

/// Whether `value` names an `http` or `https` URL.
pub fn is_http_url(value: &str) -> bool {
    ["http://", "https://"]
        .iter()
        .any(|scheme| value.starts_with(scheme))
}

/// Seconds since the Unix epoch.
pub fn unix_timestamp_now() -> i64 {
    Utc::now().timestamp()
}

/// Milliseconds since the Unix epoch; the unit note timestamps use.
pub fn unix_timestamp_millis_now() -> i64 {
    Utc::now().timestamp_millis()
}
