//! CLI session persistence in the OS keychain, one entry per profile.
//!
//! Unit tests swap the keychain for a process-wide map so they never touch
//! the real credential store.

use jotter_core::auth::{AuthError, AuthResult, AuthSession, SessionPersistence};

/// Keychain-backed session slot for one profile.
#[derive(Debug, Clone)]
pub struct SessionStore {
    account: String,
}

impl SessionStore {
    pub fn new(profile_name: &str) -> Self {
        Self {
            account: format!("firebase_session:{profile_name}"),
        }
    }
}

impl SessionPersistence for SessionStore {
    fn load_session(&self) -> AuthResult<Option<AuthSession>> {
        secrets::read(&self.account)?
            .map(|raw| serde_json::from_str(&raw).map_err(AuthError::from))
            .transpose()
    }

    fn save_session(&self, session: &AuthSession) -> AuthResult<()> {
        secrets::write(&self.account, &serde_json::to_string(session)?)
    }

    fn clear_session(&self) -> AuthResult<()> {
        secrets::delete(&self.account)
    }
}

pub fn load_stored_session(profile_name: &str) -> AuthResult<Option<AuthSession>> {
    SessionStore::new(profile_name).load_session()
}

pub fn clear_stored_session(profile_name: &str) -> AuthResult<()> {
    SessionStore::new(profile_name).clear_session()
}

fn storage_error(error: impl std::fmt::Display) -> AuthError {
    AuthError::SecureStorage(error.to_string())
}

#[cfg(not(test))]
mod secrets {
    use jotter_core::auth::AuthResult;
    use keyring::Entry;

    use super::storage_error;

    const SERVICE: &str = "jotter-cli";

    fn entry(account: &str) -> AuthResult<Entry> {
        Entry::new(SERVICE, account).map_err(storage_error)
    }

    pub fn read(account: &str) -> AuthResult<Option<String>> {
        match entry(account)?.get_password() {
            Ok(raw) => Ok(Some(raw)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(error) => Err(storage_error(error)),
        }
    }

    pub fn write(account: &str, value: &str) -> AuthResult<()> {
        entry(account)?.set_password(value).map_err(storage_error)
    }

    pub fn delete(account: &str) -> AuthResult<()> {
        match entry(account)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(error) => Err(storage_error(error)),
        }
    }
}


#[cfg(test)]
mod tests {
    use jotter_core::auth::Identity;

    use super::*;

    fn session(uid: &str) -> AuthSession {
        AuthSession {
            id_token: "secret-id-token".to_string(),
            refresh_token: "secret-refresh-token".to_string(),
            expires_at: 1_700_000_000,
            identity: Identity {
                uid: uid.to_string(),
                email: None,
            },
        }
    }

    #[test]
    fn sessions_are_scoped_per_profile() {
        let work = SessionStore::new("test-work");
        let home = SessionStore::new("test-home");
        work.save_session(&session("w")).unwrap();

        assert_eq!(
            load_stored_session("test-work").unwrap().map(|s| s.identity.uid),
            Some("w".to_string())
        );
        assert!(home.load_session().unwrap().is_none());

        clear_stored_session("test-work").unwrap();
        assert!(load_stored_session("test-work").unwrap().is_none());
    }

    #[test]
    fn clearing_an_empty_slot_is_fine() {
        clear_stored_session("test-never-saved").unwrap();
        assert!(load_stored_session("test-never-saved").unwrap().is_none());
    }
}
