//! Persistence for confessions.
//!
//! The hosted store is reached over its PostgREST interface ([`RestStore`]);
//! [`SqliteStore`] is an embedded stand-in for local runs and tests. Both sit
//! behind [`Store`], selected by the connection URL.

pub mod migrations;
pub mod models;
pub mod rest;
pub mod sqlite;

use december_types::models::{Confession, ConfessionId};
use thiserror::Error;

pub use rest::RestStore;
pub use sqlite::SqliteStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("confession {0} not found")]
    NotFound(ConfessionId),

    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("store returned {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("corrupt row: {0}")]
    Corrupt(String),

    #[error("unsupported store url '{0}'")]
    InvalidUrl(String),

    #[error("store task failed: {0}")]
    Task(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Clone)]
pub enum Store {
    Sqlite(SqliteStore),
    Rest(RestStore),
}

impl Store {
    /// `sqlite::memory:` and `sqlite://<path>` select the embedded backend,
    /// `http(s)://` the hosted one.
    pub fn connect(url: &str, key: &str) -> Result<Self> {
        if url == "sqlite::memory:" {
            return Ok(Self::Sqlite(SqliteStore::open_in_memory()?));
        }
        if let Some(path) = url.strip_prefix("sqlite://") {
            return Ok(Self::Sqlite(SqliteStore::open(std::path::Path::new(path))?));
        }
        if url.starts_with("http://") || url.starts_with("https://") {
            return Ok(Self::Rest(RestStore::new(url, key)?));
        }
        Err(StoreError::InvalidUrl(url.to_string()))
    }

    pub fn backend(&self) -> &'static str {
        match self {
            Self::Sqlite(_) => "sqlite",
            Self::Rest(_) => "rest",
        }
    }

    pub async fn list_all(&self) -> Result<Vec<Confession>> {
        match self {
            Self::Sqlite(s) => s.list_all().await,
            Self::Rest(s) => s.list_all().await,
        }
    }

    /// Insert with `likes = 0`; the store assigns `id` and `created_at`.
    pub async fn insert(&self, text: &str) -> Result<Confession> {
        match self {
            Self::Sqlite(s) => s.insert(text).await,
            Self::Rest(s) => s.insert(text).await,
        }
    }

    /// Increment `likes` by one and return the new count.
    pub async fn like(&self, id: &ConfessionId) -> Result<u64> {
        match self {
            Self::Sqlite(s) => s.like(id).await,
            Self::Rest(s) => s.like(id).await,
        }
    }

    /// Cheap connectivity probe for the health endpoint.
    pub async fn ping(&self) -> Result<()> {
        match self {
            Self::Sqlite(s) => s.ping().await,
            Self::Rest(s) => s.ping().await,
        }
    }
}
