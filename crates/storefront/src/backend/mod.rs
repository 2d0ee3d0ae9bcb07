//! Clients for the hosted backend-as-a-service.
//!
//! # Architecture
//!
//! - The backend is the source of truth - NO local persistence, direct API
//!   calls over its row-oriented REST interface and its auth endpoint
//! - Mutations never patch local state; callers re-fetch the whole collection
//!   afterwards, so observed state always equals the last completed fetch
//!
//! # APIs
//!
//! ## Row API (`/rest/v1`)
//! - Equality-filtered selects, ordering, limits, embedded-resource joins
//! - Inserts, updates, and deletes against named relations
//!
//! ## Auth API (`/auth/v1`)
//! - Email/password sign-up, sign-in, sign-out
//! - Session token retrieval for row-level security
//!
//! # Example
//!
//! ```rust,ignore
//! use unison_storefront::backend::{Query, RestClient, SortOrder};
//!
//! let rest = RestClient::new(&config.backend);
//!
//! // Top-selling products, best rated first
//! let products: Vec<Product> = rest
//!     .select(
//!         Query::table("products")
//!             .eq("is_top_selling", "true")
//!             .order("rating", SortOrder::Descending)
//!             .limit(6),
//!     )
//!     .await?;
//! ```

pub mod auth;
pub mod rest;
pub mod types;

pub use auth::{AuthClient, AuthError, AuthSession, AuthUser};
pub use rest::{Query, RestClient, SortOrder};
pub use types::*;

use thiserror::Error;

/// Errors that can occur when talking to the hosted backend's row API.
#[derive(Debug, Error)]
pub enum BackendError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend rejected the request with a structured error body.
    #[error("API error: {0}")]
    Api(ApiError),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by the backend.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),
}

/// A structured error body returned by the row API.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct ApiError {
    /// Machine-readable error code (e.g., `PGRST116`, `23505`).
    #[serde(default)]
    pub code: Option<String>,
    /// Human-readable message.
    #[serde(default)]
    pub message: Option<String>,
    /// Additional detail, when provided.
    #[serde(default)]
    pub details: Option<String>,
    /// Remediation hint, when provided.
    #[serde(default)]
    pub hint: Option<String>,
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut parts = Vec::new();
        if let Some(code) = &self.code {
            parts.push(format!("[{code}]"));
        }
        if let Some(message) = &self.message {
            parts.push(message.clone());
        }
        if let Some(details) = &self.details {
            parts.push(format!("details: {details}"));
        }
        if let Some(hint) = &self.hint {
            parts.push(format!("hint: {hint}"));
        }
        if parts.is_empty() {
            write!(f, "(no error details provided)")
        } else {
            write!(f, "{}", parts.join(" "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_error_display() {
        let err = BackendError::NotFound("product 123".to_string());
        assert_eq!(err.to_string(), "Not found: product 123");
    }

    #[test]
    fn test_api_error_formatting() {
        let err = BackendError::Api(ApiError {
            code: Some("23505".to_string()),
            message: Some("duplicate key value".to_string()),
            details: Some("Key (id) already exists.".to_string()),
            hint: None,
        });
        assert_eq!(
            err.to_string(),
            "API error: [23505] duplicate key value details: Key (id) already exists."
        );
    }

    #[test]
    fn test_api_error_no_details() {
        let err = ApiError {
            code: None,
            message: None,
            details: None,
            hint: None,
        };
        assert_eq!(err.to_string(), "(no error details provided)");
    }

    #[test]
    fn test_rate_limited_error() {
        let err = BackendError::RateLimited(60);
        assert_eq!(err.to_string(), "Rate limited, retry after 60 seconds");
    }
}
