//! Session-related types.
//!
//! Types stored in the session for authentication state.

use serde::{Deserialize, Serialize};

use unison_core::UserId;

/// Session-stored user identity.
///
/// Minimal data stored in the session to identify the signed-in user and
/// authenticate their backend requests. The session store is server-side,
/// so the access token never reaches the browser.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User's backend ID.
    pub id: UserId,
    /// User's email address, when the backend reported one.
    pub email: Option<String>,
    /// Bearer token for row API calls under this user's identity.
    pub access_token: String,
}

/// Session keys for authentication data.
pub mod keys {
    /// Key for storing the current signed-in user.
    pub const CURRENT_USER: &str = "current_user";
}
