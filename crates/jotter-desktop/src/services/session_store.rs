//! The desktop keeps one signed-in session in the OS keyring.

use jotter_core::auth::{AuthError, AuthResult, AuthSession, SessionPersistence};
use keyring::Entry;

const SERVICE: &str = "jotter";
const ACCOUNT: &str = "firebase_session";

#[derive(Debug, Clone, Copy, Default)]
pub struct KeyringSessionStore;

fn keyring_error(error: keyring::Error) -> AuthError {
    AuthError::SecureStorage(error.to_string())
}

fn session_entry() -> AuthResult<Entry> {
    Entry::new(SERVICE, ACCOUNT).map_err(keyring_error)
}

impl SessionPersistence for KeyringSessionStore {
    fn load_session(&self) -> AuthResult<Option<AuthSession>> {
        let raw = match session_entry()?.get_password() {
            Ok(raw) => raw,
            Err(keyring::Error::NoEntry) => return Ok(None),
            Err(error) => return Err(keyring_error(error)),
        };
        Ok(Some(serde_json::from_str(&raw)?))
    }

    fn save_session(&self, session: &AuthSession) -> AuthResult<()> {
        let raw = serde_json::to_string(session)?;
        session_entry()?.set_password(&raw).map_err(keyring_error)
    }

    fn clear_session(&self) -> AuthResult<()> {
        session_entry()?
            .delete_credential()
            .or_else(|error| match error {
                keyring::Error::NoEntry => Ok(()),
                other => Err(keyring_error(other)),
            })
    }
}
