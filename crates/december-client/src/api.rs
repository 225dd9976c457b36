use std::time::Duration;

use reqwest::{Client, Response};
use thiserror::Error;
use tracing::warn;

use december_types::api::{ErrorBody, LikeResponse, SubmitConfessionRequest, SubmitConfessionResponse};
use december_types::models::{Confession, ConfessionId};

const GENERIC_SUBMIT_ERROR: &str = "Gagal melepaskan tulisanmu";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with an error status and, usually, a message.
    #[error("server rejected request ({status}): {message:?}")]
    Rejected { status: u16, message: Option<String> },
}

impl ClientError {
    /// Server-provided message when there is one, else a generic line.
    pub fn user_message(&self) -> String {
        match self {
            Self::Rejected {
                message: Some(m), ..
            } => m.clone(),
            _ => GENERIC_SUBMIT_ERROR.to_string(),
        }
    }
}

/// Thin async client for the `/api` surface.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base: String,
}

impl ApiClient {
    /// `base` is the API root, e.g. `http://localhost:5000/api` or `/api`
    /// resolved against the page origin.
    pub fn new(base: &str) -> Result<Self, ClientError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            base: base.trim_end_matches('/').to_string(),
        })
    }

    pub async fn list(&self) -> Result<Vec<Confession>, ClientError> {
        let resp = self.client.get(format!("{}/messages", self.base)).send().await?;
        Ok(check(resp).await?.json().await?)
    }

    pub async fn submit(&self, text: &str) -> Result<SubmitConfessionResponse, ClientError> {
        let resp = self
            .client
            .post(format!("{}/messages", self.base))
            .json(&SubmitConfessionRequest::new(text))
            .send()
            .await?;
        Ok(check(resp).await?.json().await?)
    }

    pub async fn like(&self, id: &ConfessionId) -> Result<u64, ClientError> {
        let resp = self
            .client
            .post(format!("{}/messages/{}/like", self.base, id))
            .send()
            .await?;
        let body: LikeResponse = check(resp).await?.json().await?;
        Ok(body.likes)
    }
}

async fn check(resp: Response) -> Result<Response, ClientError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let message = match resp.json::<ErrorBody>().await {
        Ok(body) => Some(body.error),
        Err(e) => {
            warn!("Unreadable error body for {}: {}", status, e);
            None
        }
    };

    Err(ClientError::Rejected {
        status: status.as_u16(),
        message,
    })
}
