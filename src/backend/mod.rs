//! Typed client for the hosted backend's generated REST interface.
//!
//! Tables are addressed by name and filtered with the PostgREST query
//! dialect (`?column=eq.value&order=column.asc`). The client is built once
//! from configuration and shared by handle.

pub mod records;
mod trips;

pub use records::{Activity, CommunityLike, CommunityPost, Destination, Expense, NewCommunityPost, Trip};
pub use trips::{TripBundle, TripRepository};

use crate::config::BackendConfig;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("backend request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("backend returned {status} for '{table}': {body}")]
    Status {
        table: String,
        status: u16,
        body: String,
    },

    #[error("could not decode '{table}' rows: {message}")]
    Decode { table: String, message: String },

    #[error("no matching row in '{table}'")]
    NotFound { table: String },

    #[error("invalid backend configuration: {0}")]
    Config(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Ascending => f.write_str("asc"),
            Direction::Descending => f.write_str("desc"),
        }
    }
}

/// Row selection for one table request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    select: Option<String>,
    filters: Vec<(String, String)>,
    order: Vec<String>,
    limit: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Column list, including embedded relations such as `*,trip_activities(*)`.
    pub fn select(mut self, columns: impl Into<String>) -> Self {
        self.select = Some(columns.into());
        self
    }

    pub fn eq(self, column: &str, value: impl fmt::Display) -> Self {
        self.filter(column, "eq", value)
    }

    pub fn filter(mut self, column: &str, op: &str, value: impl fmt::Display) -> Self {
        self.filters
            .push((column.to_string(), format!("{}.{}", op, value)));
        self
    }

    pub fn order(mut self, column: &str, direction: Direction) -> Self {
        self.order.push(format!("{}.{}", column, direction));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::with_capacity(self.filters.len() + 3);
        if let Some(select) = &self.select {
            pairs.push(("select".to_string(), select.clone()));
        }
        pairs.extend(self.filters.iter().cloned());
        if !self.order.is_empty() {
            pairs.push(("order".to_string(), self.order.join(",")));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit".to_string(), limit.to_string()));
        }
        pairs
    }
}

#[derive(Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    rest_url: String,
}

impl fmt::Debug for BackendClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendClient")
            .field("rest_url", &self.rest_url)
            .finish_non_exhaustive()
    }
}

impl BackendClient {
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let base = config.url.trim().trim_end_matches('/');
        if base.is_empty() {
            return Err(BackendError::Config("backend.url is empty".into()));
        }

        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(&config.anon_key)
            .map_err(|e| BackendError::Config(format!("backend.anon_key: {}", e)))?;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", config.anon_key))
            .map_err(|e| BackendError::Config(format!("backend.anon_key: {}", e)))?;
        headers.insert("apikey", key);
        headers.insert(reqwest::header::AUTHORIZATION, bearer);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            rest_url: format!("{}/rest/v1", base),
        })
    }

    pub fn table_url(&self, table: &str) -> String {
        format!("{}/{}", self.rest_url, table)
    }

    pub async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &Query,
    ) -> Result<Vec<T>, BackendError> {
        tracing::debug!(table, query = ?query.to_pairs(), "select");
        let response = self
            .http
            .get(self.table_url(table))
            .query(&query.to_pairs())
            .send()
            .await?;
        decode_rows(table, response).await
    }

    /// Exactly one row, or `NotFound`.
    pub async fn select_one<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &Query,
    ) -> Result<T, BackendError> {
        let query = query.clone().limit(1);
        self.select::<T>(table, &query)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| BackendError::NotFound {
                table: table.to_string(),
            })
    }

    /// Inserts one row and returns it as stored.
    pub async fn insert<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        table: &str,
        row: &B,
    ) -> Result<T, BackendError> {
        tracing::debug!(table, "insert");
        let response = self
            .http
            .post(self.table_url(table))
            .header("Prefer", "return=representation")
            .json(row)
            .send()
            .await?;
        first_row(table, decode_rows(table, response).await?)
    }

    /// Applies `patch` to every row matching `query`, returning the updated rows.
    pub async fn update<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        table: &str,
        query: &Query,
        patch: &B,
    ) -> Result<Vec<T>, BackendError> {
        tracing::debug!(table, query = ?query.to_pairs(), "update");
        let response = self
            .http
            .patch(self.table_url(table))
            .header("Prefer", "return=representation")
            .query(&query.to_pairs())
            .json(patch)
            .send()
            .await?;
        decode_rows(table, response).await
    }

    /// Deletes matching rows and returns how many were removed.
    pub async fn delete(&self, table: &str, query: &Query) -> Result<usize, BackendError> {
        tracing::debug!(table, query = ?query.to_pairs(), "delete");
        let response = self
            .http
            .delete(self.table_url(table))
            .header("Prefer", "return=representation")
            .query(&query.to_pairs())
            .send()
            .await?;
        let rows: Vec<serde_json::Value> = decode_rows(table, response).await?;
        Ok(rows.len())
    }
}

fn first_row<T>(table: &str, rows: Vec<T>) -> Result<T, BackendError> {
    rows.into_iter().next().ok_or_else(|| BackendError::NotFound {
        table: table.to_string(),
    })
}

async fn decode_rows<T: DeserializeOwned>(
    table: &str,
    response: reqwest::Response,
) -> Result<Vec<T>, BackendError> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(BackendError::Status {
            table: table.to_string(),
            status: status.as_u16(),
            body,
        });
    }
    parse_rows(table, &body)
}

/// Decodes a JSON array of rows. A row missing a required column fails the
/// whole read instead of being coerced.
pub(crate) fn parse_rows<T: DeserializeOwned>(table: &str, body: &str) -> Result<Vec<T>, BackendError> {
    serde_json::from_str(body).map_err(|e| BackendError::Decode {
        table: table.to_string(),
        message: e.to_string(),
    })
}
