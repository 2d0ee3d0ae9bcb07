//! Auth API client for the hosted backend.
//!
//! The backend's auth endpoint owns identity: email/password sign-up and
//! sign-in, bearer-token sign-out, and current-user retrieval. The storefront
//! never stores credentials; it keeps only the returned session in the
//! server-side session store.
//!
//! # Example
//!
//! ```rust,ignore
//! use unison_storefront::backend::AuthClient;
//!
//! let auth = AuthClient::new(&config.backend);
//!
//! let session = auth.sign_in("shopper@example.com", "hunter2hunter2").await?;
//! let user = auth.get_user(&session.access_token).await?;
//! auth.sign_out(&session.access_token).await?;
//! ```

use std::sync::Arc;

use secrecy::ExposeSecret;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tracing::instrument;

use unison_core::UserId;

use crate::config::BackendConfig;

/// Errors from the backend's auth endpoint.
#[derive(Debug, Error)]
pub enum AuthError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Email/password combination was rejected.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// An account with this email already exists.
    #[error("user already exists")]
    UserAlreadyExists,

    /// The backend rejected the password as too weak.
    #[error("weak password: {0}")]
    WeakPassword(String),

    /// The email address failed validation.
    #[error("invalid email: {0}")]
    InvalidEmail(String),

    /// Any other error reported by the auth endpoint.
    #[error("auth error: {0}")]
    Other(String),
}

/// The signed-in identity returned by the auth endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthUser {
    pub id: UserId,
    pub email: Option<String>,
}

/// A session issued by the auth endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthSession {
    /// Bearer token for row API calls under this user's identity.
    pub access_token: String,
    /// Token used to obtain a fresh access token.
    pub refresh_token: Option<String>,
    /// Access token lifetime in seconds.
    pub expires_in: Option<i64>,
    /// The authenticated user.
    pub user: AuthUser,
}

/// Error body shape used by the auth endpoint. Older and newer deployments
/// disagree on field names, so all are optional.
#[derive(Debug, Deserialize)]
struct AuthErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    error_code: Option<String>,
}

impl AuthErrorBody {
    fn message(&self) -> String {
        self.error_description
            .clone()
            .or_else(|| self.msg.clone())
            .or_else(|| self.error.clone())
            .unwrap_or_else(|| "unknown auth error".to_string())
    }

    fn code(&self) -> Option<&str> {
        self.error_code.as_deref().or(self.error.as_deref())
    }
}

/// Client for the backend's auth endpoint.
#[derive(Clone)]
pub struct AuthClient {
    inner: Arc<AuthClientInner>,
}

struct AuthClientInner {
    client: reqwest::Client,
    endpoint: String,
    anon_key: String,
}

impl AuthClient {
    /// Create a new auth client from backend configuration.
    #[must_use]
    pub fn new(config: &BackendConfig) -> Self {
        let endpoint = format!("{}/auth/v1", config.url.trim_end_matches('/'));
        Self {
            inner: Arc::new(AuthClientInner {
                client: reqwest::Client::new(),
                endpoint,
                anon_key: config.anon_key.expose_secret().to_string(),
            }),
        }
    }

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.inner
            .client
            .post(format!("{}{path}", self.inner.endpoint))
            .header("apikey", &self.inner.anon_key)
    }

    /// Register a new account.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::UserAlreadyExists`] for a duplicate email,
    /// [`AuthError::WeakPassword`] / [`AuthError::InvalidEmail`] for rejected
    /// inputs, or a transport error.
    #[instrument(skip(self, password))]
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        let response = self
            .post("/signup")
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        into_session(response).await
    }

    /// Exchange email/password for a session.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] when the combination is
    /// rejected, or a transport error.
    #[instrument(skip(self, password))]
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        let response = self
            .post("/token?grant_type=password")
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        into_session(response).await
    }

    /// Revoke the session behind `access_token`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the revocation. Callers clear
    /// the server-side session regardless.
    #[instrument(skip(self, access_token))]
    pub async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
        let response = self
            .post("/logout")
            .bearer_auth(access_token)
            .send()
            .await?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(classify(response).await)
        }
    }

    /// Fetch the user behind `access_token`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] for an expired or revoked
    /// token, or a transport error.
    #[instrument(skip(self, access_token))]
    pub async fn get_user(&self, access_token: &str) -> Result<AuthUser, AuthError> {
        let response = self
            .inner
            .client
            .get(format!("{}/user", self.inner.endpoint))
            .header("apikey", &self.inner.anon_key)
            .bearer_auth(access_token)
            .send()
            .await?;
        if response.status().is_success() {
            Ok(serde_json::from_str(&response.text().await?)?)
        } else {
            Err(classify(response).await)
        }
    }
}

/// Parse a successful token response, or classify the error body.
async fn into_session(response: reqwest::Response) -> Result<AuthSession, AuthError> {
    if response.status().is_success() {
        Ok(serde_json::from_str(&response.text().await?)?)
    } else {
        Err(classify(response).await)
    }
}

/// Map an error response to the auth taxonomy.
async fn classify(response: reqwest::Response) -> AuthError {
    let status = response.status();
    let Ok(text) = response.text().await else {
        return AuthError::Other(format!("HTTP {status}"));
    };
    let body: AuthErrorBody = serde_json::from_str(&text).unwrap_or(AuthErrorBody {
        error: None,
        error_description: None,
        msg: None,
        error_code: None,
    });
    classify_body(status.as_u16(), &body)
}

fn classify_body(status: u16, body: &AuthErrorBody) -> AuthError {
    let message = body.message();
    let lowered = message.to_lowercase();

    match body.code() {
        Some("invalid_grant" | "invalid_credentials") => return AuthError::InvalidCredentials,
        Some("user_already_exists" | "email_exists") => return AuthError::UserAlreadyExists,
        Some("weak_password") => return AuthError::WeakPassword(message),
        _ => {}
    }

    if lowered.contains("already registered") || lowered.contains("already exists") {
        AuthError::UserAlreadyExists
    } else if lowered.contains("password") && status == 422 {
        AuthError::WeakPassword(message)
    } else if lowered.contains("invalid login") || status == 401 {
        AuthError::InvalidCredentials
    } else if lowered.contains("email") && status == 400 {
        AuthError::InvalidEmail(message)
    } else {
        AuthError::Other(message)
    }
}
