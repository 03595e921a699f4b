//! Reading sources: where a refresh cycle gets its raw batch from.
//!
//! The refresher only sees [`ReadingSource`]; the PostgreSQL table and the
//! upstream HTTP API are interchangeable behind it, and tests plug in an
//! in-memory source.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;

use crate::models::RawRecord;
use crate::store;

// ---

/// Failure to obtain a batch. Never fatal: the refresher keeps the last
/// good series and tries again on the next tick.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("upstream returned HTTP {0}")]
    Status(u16),
    #[error("could not decode response: {0}")]
    Decode(String),
    #[error("database error: {0}")]
    Database(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            FetchError::Decode(e.to_string())
        } else {
            FetchError::Transport(e.to_string())
        }
    }
}

impl From<sqlx::Error> for FetchError {
    fn from(e: sqlx::Error) -> Self {
        FetchError::Database(e.to_string())
    }
}

/// Provider of the latest raw records, newest first or in any order.
#[async_trait]
pub trait ReadingSource: Send + Sync {
    async fn fetch_latest(&self, limit: u32) -> Result<Vec<RawRecord>, FetchError>;

    /// Short name for logs.
    fn name(&self) -> &str;
}

/// Reads straight from the `sensor_data` table.
pub struct PgReadingSource {
    pool: PgPool,
}

impl PgReadingSource {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReadingSource for PgReadingSource {
    async fn fetch_latest(&self, limit: u32) -> Result<Vec<RawRecord>, FetchError> {
        // ---
        let mut conn = self.pool.acquire().await?;
        let records = store::latest_rows(&mut *conn, limit).await?;
        Ok(records)
    }

    fn name(&self) -> &str {
        "postgres"
    }
}

/// Polls an upstream list endpoint over HTTP.
pub struct HttpReadingSource {
    client: reqwest::Client,
    url: String,
}

impl HttpReadingSource {
    pub fn new(url: impl Into<String>) -> Self {
        // ---
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }
}

#[async_trait]
impl ReadingSource for HttpReadingSource {
    async fn fetch_latest(&self, limit: u32) -> Result<Vec<RawRecord>, FetchError> {
        // ---
        tracing::debug!("Fetching up to {} readings from {}", limit, self.url);

        let response = self
            .client
            .get(&self.url)
            .query(&[("limit", limit)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body: Value = response.json().await?;
        let mut records = records_from_body(body)?;
        records.truncate(limit as usize);
        Ok(records)
    }

    fn name(&self) -> &str {
        "http"
    }
}

/// Extract records from `{"data": [...]}` or a bare array. Array items that
/// are not objects are skipped.
pub fn records_from_body(body: Value) -> Result<Vec<RawRecord>, FetchError> {
    // ---
    let items = match body {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Array(items)) => items,
            _ => {
                return Err(FetchError::Decode(
                    "response has no 'data' array".to_string(),
                ))
            }
        },
        other => {
            return Err(FetchError::Decode(format!(
                "expected object or array, got {}",
                other
            )))
        }
    };

    let total = items.len();
    let records: Vec<RawRecord> = items
        .into_iter()
        .filter_map(|item| match item {
            Value::Object(map) => Some(map),
            _ => None,
        })
        .collect();

    if records.len() < total {
        tracing::debug!("Skipped {} non-object items", total - records.len());
    }
    Ok(records)
}
