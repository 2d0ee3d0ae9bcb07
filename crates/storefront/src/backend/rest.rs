//! Row API client implementation.
//!
//! Speaks the backend's PostgREST-style row interface: equality filters,
//! ordering, limits, and embedded-resource joins are expressed as query
//! parameters on `/rest/v1/{table}`. The [`Query`] builder is pure (no I/O)
//! so parameter construction is unit-testable.

use std::sync::Arc;

use reqwest::Method;
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::instrument;

use crate::backend::{ApiError, BackendError};
use crate::config::BackendConfig;

// =============================================================================
// Query builder
// =============================================================================

/// Sort direction for an `order` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    const fn suffix(self) -> &'static str {
        match self {
            Self::Ascending => "asc",
            Self::Descending => "desc",
        }
    }
}

/// A query against one named relation.
///
/// Mirrors the operations the storefront actually issues: column selection
/// (including joins like `*,product:products(*)`), equality filters,
/// a single ordering, and a row limit.
#[derive(Debug, Clone)]
pub struct Query {
    table: String,
    select: Option<String>,
    filters: Vec<(String, String)>,
    order: Option<(String, SortOrder)>,
    limit: Option<u32>,
}

impl Query {
    /// Start a query against `table`.
    #[must_use]
    pub fn table(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            select: None,
            filters: Vec::new(),
            order: None,
            limit: None,
        }
    }

    /// Set the column list, e.g. `"*"` or `"*,product:products(*)"`.
    #[must_use]
    pub fn select(mut self, columns: impl Into<String>) -> Self {
        self.select = Some(columns.into());
        self
    }

    /// Add an equality filter on `column`.
    #[must_use]
    pub fn eq(mut self, column: impl Into<String>, value: impl ToString) -> Self {
        self.filters
            .push((column.into(), format!("eq.{}", value.to_string())));
        self
    }

    /// Order results by `column`.
    #[must_use]
    pub fn order(mut self, column: impl Into<String>, direction: SortOrder) -> Self {
        self.order = Some((column.into(), direction));
        self
    }

    /// Limit the number of returned rows.
    #[must_use]
    pub const fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// The relation this query targets.
    #[must_use]
    pub fn table_name(&self) -> &str {
        &self.table
    }

    /// Render the query parameters in a deterministic order:
    /// select, filters (insertion order), order, limit.
    #[must_use]
    pub fn params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        if let Some(select) = &self.select {
            params.push(("select".to_string(), select.clone()));
        }
        for (column, filter) in &self.filters {
            params.push((column.clone(), filter.clone()));
        }
        if let Some((column, direction)) = &self.order {
            params.push((
                "order".to_string(),
                format!("{column}.{}", direction.suffix()),
            ));
        }
        if let Some(limit) = self.limit {
            params.push(("limit".to_string(), limit.to_string()));
        }
        params
    }
}

// =============================================================================
// RestClient
// =============================================================================

/// Client for the backend's row API.
///
/// Cheaply cloneable; the HTTP client and endpoint are shared behind an `Arc`.
/// By default requests are authorized with the public (anon) key; use
/// [`RestClient::as_user`] to scope requests to a signed-in user's access
/// token so the backend's row-level security applies.
#[derive(Clone)]
pub struct RestClient {
    inner: Arc<RestClientInner>,
    /// User access token overriding the anon key, when present.
    bearer: Option<String>,
}

struct RestClientInner {
    client: reqwest::Client,
    endpoint: String,
    anon_key: String,
}

impl RestClient {
    /// Create a new row API client from backend configuration.
    #[must_use]
    pub fn new(config: &BackendConfig) -> Self {
        let endpoint = format!("{}/rest/v1", config.url.trim_end_matches('/'));
        Self {
            inner: Arc::new(RestClientInner {
                client: reqwest::Client::new(),
                endpoint,
                anon_key: config.anon_key.expose_secret().to_string(),
            }),
            bearer: None,
        }
    }

    /// Scope this client to a signed-in user's access token.
    #[must_use]
    pub fn as_user(&self, access_token: &str) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            bearer: Some(access_token.to_string()),
        }
    }

    fn token(&self) -> &str {
        self.bearer.as_deref().unwrap_or(&self.inner.anon_key)
    }

    fn request(&self, method: Method, query: &Query) -> reqwest::RequestBuilder {
        let url = format!("{}/{}", self.inner.endpoint, query.table_name());
        self.inner
            .client
            .request(method, url)
            .header("apikey", &self.inner.anon_key)
            .bearer_auth(self.token())
            .query(&query.params())
    }

    /// Fetch all rows matching `query`.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] on transport failure, a structured API error,
    /// or an unparseable response body.
    #[instrument(skip(self), fields(table = query.table_name()))]
    pub async fn select<T: DeserializeOwned>(&self, query: Query) -> Result<Vec<T>, BackendError> {
        let query = if query.select.is_some() {
            query
        } else {
            query.select("*")
        };
        let response = self.request(Method::GET, &query).send().await?;
        let body = check(response).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Insert one row into `table`.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] on transport failure or a structured API
    /// error (e.g. a row-level security rejection).
    #[instrument(skip(self, row))]
    pub async fn insert<B: Serialize + Sync>(
        &self,
        table: &str,
        row: &B,
    ) -> Result<(), BackendError> {
        let query = Query::table(table);
        let response = self
            .request(Method::POST, &query)
            .header("Prefer", "return=minimal")
            .json(row)
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    /// Apply `patch` to every row matching `query`.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] on transport failure or a structured API error.
    #[instrument(skip(self, patch), fields(table = query.table_name()))]
    pub async fn update<B: Serialize + Sync>(
        &self,
        query: Query,
        patch: &B,
    ) -> Result<(), BackendError> {
        let response = self
            .request(Method::PATCH, &query)
            .header("Prefer", "return=minimal")
            .json(patch)
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    /// Delete every row matching `query`.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] on transport failure or a structured API error.
    #[instrument(skip(self), fields(table = query.table_name()))]
    pub async fn delete(&self, query: Query) -> Result<(), BackendError> {
        let response = self.request(Method::DELETE, &query).send().await?;
        check(response).await?;
        Ok(())
    }
}

/// Map a response to its body text, converting error statuses to
/// [`BackendError`].
async fn check(response: reqwest::Response) -> Result<String, BackendError> {
    let status = response.status();

    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        let retry_after = response
            .headers()
            .get("Retry-After")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(1);
        return Err(BackendError::RateLimited(retry_after));
    }

    let body = response.text().await?;

    if !status.is_success() {
        tracing::error!(
            status = %status,
            body = %body.chars().take(500).collect::<String>(),
            "backend row API returned non-success status"
        );
        let api_error = serde_json::from_str::<ApiError>(&body).unwrap_or(ApiError {
            code: None,
            message: Some(format!(
                "HTTP {status}: {}",
                body.chars().take(200).collect::<String>()
            )),
            details: None,
            hint: None,
        });
        return Err(BackendError::Api(api_error));
    }

    Ok(body)
}
