//! API errors and their HTTP mapping.
//!
//! Validation failures are the caller's fault and carry a specific message.
//! Store failures are logged and reported generically.

use axum::Json;
use axum::http::{HeaderName, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use december_db::StoreError;
use december_filter::ValidationError;
use december_types::api::ErrorBody;
use thiserror::Error;
use tracing::{debug, error};

const GENERIC_SERVER_ERROR: &str = "Server error";
const NOT_FOUND: &str = "Tulisan tidak ditemukan.";
const MALFORMED: &str = "Permintaan tidak valid.";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("malformed request body")]
    Malformed,

    #[error("not found")]
    NotFound,

    #[error("store failure: {0}")]
    Store(StoreError),

    #[error("rate limited for {retry_after_secs}s")]
    RateLimited {
        message: String,
        limit: u32,
        retry_after_secs: u64,
    },
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(_) => Self::NotFound,
            other => Self::Store(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::Validation(e) => {
                debug!("Rejected submission: {}", e);
                let length = match &e {
                    ValidationError::Length { count } => Some(*count),
                    _ => None,
                };
                let body = ErrorBody {
                    error: e.to_string(),
                    length,
                };
                (StatusCode::BAD_REQUEST, Json(body)).into_response()
            }
            Self::Malformed => (StatusCode::BAD_REQUEST, Json(ErrorBody::new(MALFORMED))).into_response(),
            Self::NotFound => (StatusCode::NOT_FOUND, Json(ErrorBody::new(NOT_FOUND))).into_response(),
            Self::Store(e) => {
                error!("Store error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorBody::new(GENERIC_SERVER_ERROR)),
                )
                    .into_response()
            }
            Self::RateLimited {
                message,
                limit,
                retry_after_secs,
            } => {
                let mut resp =
                    (StatusCode::TOO_MANY_REQUESTS, Json(ErrorBody::new(message))).into_response();
                let headers = resp.headers_mut();
                headers.insert(header::RETRY_AFTER, HeaderValue::from(retry_after_secs));
                headers.insert(HeaderName::from_static("ratelimit-limit"), HeaderValue::from(limit));
                headers.insert(HeaderName::from_static("ratelimit-remaining"), HeaderValue::from(0u32));
                headers.insert(
                    HeaderName::from_static("ratelimit-reset"),
                    HeaderValue::from(retry_after_secs),
                );
                resp
            }
        }
    }
}
