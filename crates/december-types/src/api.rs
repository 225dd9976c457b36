use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::ConfessionId;

// -- Messages --

/// `text` is optional on the wire so a missing field reaches the validator
/// instead of failing JSON extraction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubmitConfessionRequest {
    #[serde(default)]
    pub text: Option<String>,
}

impl SubmitConfessionRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitConfessionResponse {
    pub message: String,
    pub id: ConfessionId,
}

// -- Likes --

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikeResponse {
    pub likes: u64,
}

// -- Health --

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseStatus {
    Connected,
    Disconnected,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<DatabaseStatus>,
}

// -- Errors --

/// Body of every non-2xx API response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    /// Measured character count, present on length violations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<usize>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            length: None,
        }
    }
}
