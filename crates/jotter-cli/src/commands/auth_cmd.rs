use jotter_core::auth::{describe_auth_error, AuthMode, Credentials};
use jotter_core::config::resolve_firebase_config;

use crate::auth::{clear_stored_session, load_stored_session};
use crate::cli::AuthCommands;
use crate::commands::common::{connect_backend, load_context};
use crate::error::CliError;

pub async fn run_auth(command: AuthCommands, global_profile: Option<&str>) -> Result<(), CliError> {
    match command {
        AuthCommands::Login {
            profile,
            email,
            password,
        } => {
            sign_in_or_up(
                AuthMode::SignIn,
                profile.as_deref().or(global_profile),
                &email,
                &password,
            )
            .await
        }
        AuthCommands::Signup {
            profile,
            email,
            password,
        } => {
            sign_in_or_up(
                AuthMode::SignUp,
                profile.as_deref().or(global_profile),
                &email,
                &password,
            )
            .await
        }
        AuthCommands::Status { profile } => {
            let context = load_context(profile.as_deref().or(global_profile))?;
            let profile_name = &context.profile_name;

            if resolve_firebase_config(&context.config)?.is_none() {
                let stored = load_stored_session(profile_name)?;
                if stored.is_some() {
                    println!("Profile '{profile_name}' has a stored session but no Firebase config.");
                } else {
                    println!("Profile '{profile_name}' is not configured.");
                }
                return Ok(());
            }

            let backend = connect_backend(&context).await?;
            if let Some(identity) = backend.auth.current_identity() {
                println!(
                    "Profile '{}' is signed in as {} (uid={})",
                    profile_name,
                    identity.display_label(),
                    identity.uid
                );
            } else {
                println!("Profile '{profile_name}' is not signed in.");
            }
            Ok(())
        }
        AuthCommands::Logout { profile } => {
            let context = load_context(profile.as_deref().or(global_profile))?;
            let profile_name = &context.profile_name;

            if resolve_firebase_config(&context.config)?.is_some() {
                let backend = connect_backend(&context).await?;
                backend.auth.sign_out().await?;
            } else {
                clear_stored_session(profile_name)?;
            }

            println!("Signed out profile '{profile_name}'");
            Ok(())
        }
    }
}

async fn sign_in_or_up(
    mode: AuthMode,
    profile: Option<&str>,
    email: &str,
    password: &str,
) -> Result<(), CliError> {
    let credentials = Credentials::new(email, password)?;
    let context = load_context(profile)?;
    let backend = connect_backend(&context).await?;

    let result = match mode {
        AuthMode::SignIn => backend.auth.sign_in(&credentials).await,
        AuthMode::SignUp => backend.auth.sign_up(&credentials).await,
    };
    let identity = result.map_err(|error| CliError::AuthFailed(describe_auth_error(mode, &error)))?;

    let verb = match mode {
        AuthMode::SignIn => "Signed in",
        AuthMode::SignUp => "Created account and signed in",
    };
    println!(
        "{verb} profile '{}' as {}",
        context.profile_name,
        identity.display_label()
    );
    Ok(())
}
