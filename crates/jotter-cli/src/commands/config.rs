use std::env;

use jotter_core::config::{
    ENV_FIREBASE_API_KEY, ENV_FIREBASE_PROJECT_ID, ENV_FIRESTORE_DATABASE, ENV_NOTES_COLLECTION,
    ENV_SHARE_BASE_URL,
};
use jotter_core::util::{is_http_url, normalize_text_option};

use crate::cli::ConfigCommands;
use crate::config_profiles::{CliProfile, CliProfilesConfig};
use crate::error::CliError;

/// Explicit flag values for `config init`.
#[derive(Debug, Default)]
pub struct ProfileValues {
    pub api_key: Option<String>,
    pub project_id: Option<String>,
    pub database: Option<String>,
    pub collection: Option<String>,
    pub share_base_url: Option<String>,
}

pub fn run_config(command: ConfigCommands, global_profile: Option<&str>) -> Result<(), CliError> {
    match command {
        ConfigCommands::Init {
            profile,
            api_key,
            project_id,
            database,
            collection,
            share_base_url,
            no_activate,
        } => run_config_init(
            profile.as_deref().or(global_profile),
            ProfileValues {
                api_key,
                project_id,
                database,
                collection,
                share_base_url,
            },
            no_activate,
        ),
    }
}

pub fn run_config_init(
    profile_name: Option<&str>,
    values: ProfileValues,
    no_activate: bool,
) -> Result<(), CliError> {
    let mut config = CliProfilesConfig::load().map_err(CliError::Config)?;
    let profile_name = config.resolve_profile_name(profile_name);

    let profile = config.profile_mut_or_default(&profile_name);
    merge_profile_values(profile, values, |name| env::var(name).ok());
    validate_profile(profile)?;

    if !no_activate {
        config.active_profile = Some(profile_name.clone());
    }

    let path = config.save().map_err(CliError::Config)?;
    println!(
        "Profile '{}' initialized at {}",
        profile_name,
        path.display()
    );

    let profile = config
        .profiles
        .get(&profile_name)
        .ok_or_else(|| CliError::Config("Failed to persist profile".to_string()))?;
    let missing_fields = missing_fields(profile);
    if missing_fields.is_empty() {
        println!(
            "Profile '{profile_name}' is ready. Run `jotter auth login --email <email> --password <password>`."
        );
    } else {
        println!(
            "Profile '{}' is missing: {}",
            profile_name,
            missing_fields.join(", ")
        );
    }

    Ok(())
}

/// Flag values win, then the environment, then what the profile already had.
pub fn merge_profile_values(
    profile: &mut CliProfile,
    values: ProfileValues,
    lookup: impl Fn(&str) -> Option<String>,
) {
    let pick = |explicit: Option<String>, env_name: &str, existing: Option<String>| {
        normalize_text_option(explicit)
            .or_else(|| normalize_text_option(lookup(env_name)))
            .or_else(|| normalize_text_option(existing))
    };

    profile.firebase_api_key = pick(
        values.api_key,
        ENV_FIREBASE_API_KEY,
        profile.firebase_api_key.take(),
    );
    profile.firebase_project_id = pick(
        values.project_id,
        ENV_FIREBASE_PROJECT_ID,
        profile.firebase_project_id.take(),
    );
    profile.firestore_database = pick(
        values.database,
        ENV_FIRESTORE_DATABASE,
        profile.firestore_database.take(),
    );
    profile.notes_collection = pick(
        values.collection,
        ENV_NOTES_COLLECTION,
        profile.notes_collection.take(),
    );
    profile.share_base_url = pick(
        values.share_base_url,
        ENV_SHARE_BASE_URL,
        profile.share_base_url.take(),
    )
    .map(|url| url.trim_end_matches('/').to_string());
}

fn validate_profile(profile: &CliProfile) -> Result<(), CliError> {
    if let Some(url) = profile.share_base_url.as_deref() {
        if !is_http_url(url) {
            return Err(CliError::Config(
                "share_base_url must include http:// or https://".to_string(),
            ));
        }
    }
    Ok(())
}

pub fn missing_fields(profile: &CliProfile) -> Vec<&'static str> {
    let mut missing = Vec::new();
    if profile.firebase_api_key.is_none() {
        missing.push("api_key");
    }
    if profile.firebase_project_id.is_none() {
        missing.push("project_id");
    }
    missing
}
