//! Firebase Authentication (Identity Toolkit REST) client.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use tokio::sync::watch;

use super::{
    AccessTokenSource, AuthError, AuthErrorCode, AuthResult, AuthSession, Credentials, Identity,
    IdentityProvider, IdentityWatch, SessionPersistence,
};
use crate::util::{is_http_url, unix_timestamp_now};

const IDENTITY_TOOLKIT_URL: &str = "https://identitytoolkit.googleapis.com/v1";
const SECURE_TOKEN_URL: &str = "https://securetoken.googleapis.com/v1";

/// Email/password auth against Firebase, with sessions kept in `S`.
#[derive(Clone)]
pub struct FirebaseAuthClient<S: SessionPersistence> {
    api_key: String,
    identity_url: String,
    token_url: String,
    client: Client,
    store: S,
    session: Arc<Mutex<Option<AuthSession>>>,
    identity_tx: Arc<watch::Sender<Option<Identity>>>,
}

impl<S: SessionPersistence> FirebaseAuthClient<S> {
    pub fn new(api_key: impl AsRef<str>, store: S) -> AuthResult<Self> {
        Self::with_endpoints(api_key, IDENTITY_TOOLKIT_URL, SECURE_TOKEN_URL, store)
    }

    /// Point the client at alternative endpoints, e.g. the auth emulator.
    pub fn with_endpoints(
        api_key: impl AsRef<str>,
        identity_url: impl AsRef<str>,
        token_url: impl AsRef<str>,
        store: S,
    ) -> AuthResult<Self> {
        let api_key = normalize_api_key(api_key.as_ref())?;
        let identity_url = normalize_endpoint(identity_url.as_ref())?;
        let token_url = normalize_endpoint(token_url.as_ref())?;
        let (identity_tx, _) = watch::channel(None);

        Ok(Self {
            api_key,
            identity_url,
            token_url,
            client: Client::builder().build()?,
            store,
            session: Arc::new(Mutex::new(None)),
            identity_tx: Arc::new(identity_tx),
        })
    }

    /// Load a persisted session, refreshing it when expired.
    ///
    /// A session that cannot be refreshed is discarded; the client then
    /// starts signed out.
    pub async fn restore_session(&self) -> AuthResult<Option<Identity>> {
        let Some(stored_session) = self.store.load_session()? else {
            return Ok(None);
        };

        if !stored_session.is_expired() {
            let identity = stored_session.identity.clone();
            self.publish(Some(stored_session));
            return Ok(Some(identity));
        }

        match self.refresh(&stored_session).await {
            Ok(refreshed) => {
                self.store.save_session(&refreshed)?;
                let identity = refreshed.identity.clone();
                self.publish(Some(refreshed));
                Ok(Some(identity))
            }
            Err(error) => {
                tracing::warn!("Failed to refresh persisted session: {}", error);
                self.store.clear_session()?;
                self.publish(None);
                Ok(None)
            }
        }
    }

    async fn password_request(
        &self,
        method: &str,
        credentials: &Credentials,
    ) -> AuthResult<AuthSession> {
        let payload = serde_json::json!({
            "email": credentials.email,
            "password": credentials.password,
            "returnSecureToken": true,
        });
        let request = self
            .client
            .post(format!("{}/accounts:{method}", self.identity_url))
            .query(&[("key", &self.api_key)])
            .json(&payload);

        let response: PasswordAuthResponse = send_json(request).await?;
        let session = response.into_session();
        self.store.save_session(&session)?;
        self.publish(Some(session.clone()));
        Ok(session)
    }

    async fn refresh(&self, session: &AuthSession) -> AuthResult<AuthSession> {
        if session.refresh_token.trim().is_empty() {
            return Err(AuthError::InvalidConfiguration(
                "Refresh token must not be empty",
            ));
        }

        let payload = serde_json::json!({
            "grant_type": "refresh_token",
            "refresh_token": session.refresh_token,
        });
        let request = self
            .client
            .post(format!("{}/token", self.token_url))
            .query(&[("key", &self.api_key)])
            .json(&payload);

        let response: RefreshResponse = send_json(request).await?;
        Ok(response.into_session(&session.identity))
    }

    fn current_session(&self) -> Option<AuthSession> {
        self.session.lock().ok().and_then(|guard| guard.clone())
    }

    fn publish(&self, session: Option<AuthSession>) {
        let next_identity = session.as_ref().map(|session| session.identity.clone());
        if let Ok(mut guard) = self.session.lock() {
            *guard = session;
        }
        self.identity_tx.send_if_modified(|current| {
            if *current == next_identity {
                false
            } else {
                current.clone_from(&next_identity);
                true
            }
        });
    }
}

#[async_trait]
impl<S: SessionPersistence> IdentityProvider for FirebaseAuthClient<S> {
    async fn sign_in(&self, credentials: &Credentials) -> AuthResult<Identity> {
        let session = self
            .password_request("signInWithPassword", credentials)
            .await?;
        tracing::info!("Signed in as {}", session.identity.display_label());
        Ok(session.identity)
    }

    async fn sign_up(&self, credentials: &Credentials) -> AuthResult<Identity> {
        let session = self.password_request("signUp", credentials).await?;
        tracing::info!("Created account for {}", session.identity.display_label());
        Ok(session.identity)
    }

    async fn sign_out(&self) -> AuthResult<()> {
        self.store.clear_session()?;
        self.publish(None);
        tracing::info!("Signed out");
        Ok(())
    }

    fn current_identity(&self) -> Option<Identity> {
        self.identity_tx.borrow().clone()
    }

    fn subscribe(&self) -> IdentityWatch {
        self.identity_tx.subscribe()
    }
}

#[async_trait]
impl<S: SessionPersistence> AccessTokenSource for FirebaseAuthClient<S> {
    async fn access_token(&self) -> AuthResult<Option<String>> {
        let Some(session) = self.current_session() else {
            return Ok(None);
        };
        if !session.is_expired() {
            return Ok(Some(session.id_token));
        }

        let refreshed = self.refresh(&session).await?;
        self.store.save_session(&refreshed)?;
        let token = refreshed.id_token.clone();
        self.publish(Some(refreshed));
        Ok(Some(token))
    }
}

pub fn normalize_api_key(api_key: &str) -> AuthResult<String> {
    let api_key = api_key.trim();
    if api_key.is_empty() {
        return Err(AuthError::InvalidConfiguration(
            "Firebase API key must not be empty",
        ));
    }
    Ok(api_key.to_string())
}

fn normalize_endpoint(url: &str) -> AuthResult<String> {
    let trimmed = url.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(AuthError::InvalidConfiguration(
            "Auth endpoint must not be empty",
        ));
    }
    if !is_http_url(trimmed) {
        return Err(AuthError::InvalidConfiguration(
            "Auth endpoint must include http:// or https://",
        ));
    }
    Ok(trimmed.to_string())
}

async fn send_json<T: serde::de::DeserializeOwned>(request: RequestBuilder) -> AuthResult<T> {
    let response = request.send().await?;
    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(parse_api_error(status, &body));
    }
    Ok(response.json::<T>().await?)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PasswordAuthResponse {
    local_id: String,
    email: Option<String>,
    id_token: String,
    refresh_token: String,
    expires_in: Option<String>,
}

impl PasswordAuthResponse {
    fn into_session(self) -> AuthSession {
        AuthSession {
            expires_at: expires_at_from(self.expires_in.as_deref()),
            id_token: self.id_token,
            refresh_token: self.refresh_token,
            identity: Identity {
                uid: self.local_id,
                email: self.email.filter(|email| !email.trim().is_empty()),
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    id_token: String,
    refresh_token: String,
    expires_in: Option<String>,
    user_id: Option<String>,
}

impl RefreshResponse {
    fn into_session(self, previous: &Identity) -> AuthSession {
        AuthSession {
            expires_at: expires_at_from(self.expires_in.as_deref()),
            id_token: self.id_token,
            refresh_token: self.refresh_token,
            identity: Identity {
                uid: self.user_id.unwrap_or_else(|| previous.uid.clone()),
                email: previous.email.clone(),
            },
        }
    }
}

/// Firebase reports lifetimes as a decimal string of seconds.
fn expires_at_from(expires_in: Option<&str>) -> i64 {
    let seconds = expires_in
        .and_then(|raw| raw.trim().parse::<i64>().ok())
        .unwrap_or(3600);
    unix_timestamp_now().saturating_add(seconds)
}

#[derive(Debug, Deserialize)]
struct FirebaseErrorResponse {
    error: FirebaseErrorBody,
}

#[derive(Debug, Deserialize)]
struct FirebaseErrorBody {
    message: Option<String>,
}

fn parse_api_error(status: StatusCode, body: &str) -> AuthError {
    let reported = serde_json::from_str::<FirebaseErrorResponse>(body)
        .ok()
        .and_then(|payload| payload.error.message)
        .map(|message| message.trim().to_string())
        .filter(|message| !message.is_empty());

    let Some(reported) = reported else {
        let trimmed = body.trim();
        let message = if trimmed.is_empty() {
            format!("HTTP {}", status.as_u16())
        } else {
            format!("{} ({})", trimmed, status.as_u16())
        };
        return AuthError::api(AuthErrorCode::Other, message);
    };

    // e.g. "WEAK_PASSWORD : Password should be at least 6 characters"
    let (raw_code, detail) = reported
        .split_once(" : ")
        .map_or((reported.as_str(), None), |(code, detail)| {
            (code.trim(), Some(detail.trim()))
        });
    let code = map_error_code(raw_code);
    let message = detail.map_or_else(
        || format!("{} ({})", describe_error_code(raw_code), status.as_u16()),
        |detail| format!("{detail} ({})", status.as_u16()),
    );
    AuthError::api(code, message)
}

fn map_error_code(raw_code: &str) -> AuthErrorCode {
    match raw_code {
        "EMAIL_NOT_FOUND" | "USER_NOT_FOUND" => AuthErrorCode::UserNotFound,
        "EMAIL_EXISTS" => AuthErrorCode::EmailAlreadyInUse,
        "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" | "INVALID_EMAIL" => {
            AuthErrorCode::InvalidCredentials
        }
        "WEAK_PASSWORD" => AuthErrorCode::WeakPassword,
        "TOO_MANY_ATTEMPTS_TRY_LATER" => AuthErrorCode::TooManyAttempts,
        _ => AuthErrorCode::Other,
    }
}

fn describe_error_code(raw_code: &str) -> &str {
    match raw_code {
        "EMAIL_NOT_FOUND" | "USER_NOT_FOUND" => "There is no account for this email",
        "EMAIL_EXISTS" => "The email address is already in use",
        "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" => "Invalid email or password",
        "INVALID_EMAIL" => "The email address is badly formatted",
        "USER_DISABLED" => "This account has been disabled",
        "TOO_MANY_ATTEMPTS_TRY_LATER" => "Too many attempts, try again later",
        other => other,
    }
}
