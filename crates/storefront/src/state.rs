//! Application state shared across handlers.

use std::sync::Arc;

use crate::backend::{AuthClient, RestClient};
use crate::config::StorefrontConfig;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the backend clients and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    rest: RestClient,
    auth: AuthClient,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: StorefrontConfig) -> Self {
        let rest = RestClient::new(&config.backend);
        let auth = AuthClient::new(&config.backend);

        Self {
            inner: Arc::new(AppStateInner { config, rest, auth }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the backend row API client (anonymous identity).
    #[must_use]
    pub fn rest(&self) -> &RestClient {
        &self.inner.rest
    }

    /// Get a row API client acting under a signed-in user's token.
    ///
    /// Row-level security on the backend scopes reads and writes to the
    /// token's user.
    #[must_use]
    pub fn rest_as_user(&self, access_token: &str) -> RestClient {
        self.inner.rest.as_user(access_token)
    }

    /// Get a reference to the backend auth client.
    #[must_use]
    pub fn auth(&self) -> &AuthClient {
        &self.inner.auth
    }
}
