use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use december_types::models::{Confession, ConfessionId};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use crate::models::ConfessionRow;
use crate::{Result, StoreError};

const TABLE: &str = "messages";
const INCREMENT_RPC: &str = "increment_likes";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
/// Postgres `invalid_text_representation`: the id does not fit the column type.
const INVALID_TEXT_REPRESENTATION: &str = "22P02";

/// Hosted store reached through its PostgREST endpoint (`/rest/v1`).
#[derive(Clone)]
pub struct RestStore {
    client: Client,
    base: String,
    key: String,
    /// Set once the server reports the increment RPC is missing, so later
    /// likes go straight to the read-then-write path.
    rpc_missing: Arc<AtomicBool>,
}

#[derive(Deserialize)]
struct LikesRow {
    likes: Option<u64>,
}

impl RestStore {
    pub fn new(url: &str, key: &str) -> Result<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            base: format!("{}/rest/v1", url.trim_end_matches('/')),
            key: key.to_string(),
            rpc_missing: Arc::new(AtomicBool::new(false)),
        })
    }

    fn table_url(&self) -> String {
        format!("{}/{}", self.base, TABLE)
    }

    fn authed(&self, req: RequestBuilder) -> RequestBuilder {
        req.header("apikey", &self.key).bearer_auth(&self.key)
    }

    pub async fn list_all(&self) -> Result<Vec<Confession>> {
        let resp = self
            .authed(self.client.get(self.table_url()))
            .query(&[("select", "id,text,created_at,likes")])
            .send()
            .await?;
        let rows: Vec<ConfessionRow> = check(resp).await?.json().await?;
        rows.into_iter().map(Confession::try_from).collect()
    }

    pub async fn insert(&self, text: &str) -> Result<Confession> {
        let resp = self
            .authed(self.client.post(self.table_url()))
            .header("Prefer", "return=representation")
            .json(&json!([{ "text": text, "likes": 0 }]))
            .send()
            .await?;

        let mut rows: Vec<ConfessionRow> = check(resp).await?.json().await?;
        if rows.is_empty() {
            return Err(StoreError::Corrupt("insert returned no rows".into()));
        }
        Confession::try_from(rows.swap_remove(0))
    }

    /// Prefers the atomic `increment_likes(row_id)` RPC. Without it, falls
    /// back to read-then-write, which can lose updates when two likes on the
    /// same row race.
    pub async fn like(&self, id: &ConfessionId) -> Result<u64> {
        if !self.rpc_missing.load(Ordering::Relaxed) {
            let resp = self
                .authed(self.client.post(format!("{}/rpc/{}", self.base, INCREMENT_RPC)))
                .json(&json!({ "row_id": id }))
                .send()
                .await?;

            let status = resp.status();
            if status.is_success() {
                let likes: Option<u64> = resp.json().await?;
                return likes.ok_or_else(|| StoreError::NotFound(id.clone()));
            }

            let body = resp.text().await.unwrap_or_default();
            if is_invalid_id(status, &body) {
                return Err(StoreError::NotFound(id.clone()));
            }
            if status == StatusCode::NOT_FOUND {
                self.rpc_missing.store(true, Ordering::Relaxed);
            }
            warn!("increment RPC failed ({}): {}; falling back to read-then-write", status, body);
        }

        self.like_read_then_write(id).await
    }

    async fn like_read_then_write(&self, id: &ConfessionId) -> Result<u64> {
        let filter = format!("eq.{}", id);

        let resp = self
            .authed(self.client.get(self.table_url()))
            .query(&[("select", "likes"), ("id", filter.as_str())])
            .send()
            .await?;
        let rows: Vec<LikesRow> = check_for(resp, id).await?.json().await?;
        let current = rows
            .first()
            .ok_or_else(|| StoreError::NotFound(id.clone()))?
            .likes
            .unwrap_or(0);

        let likes = current + 1;
        let resp = self
            .authed(self.client.patch(self.table_url()))
            .query(&[("id", filter.as_str())])
            .json(&json!({ "likes": likes }))
            .send()
            .await?;
        check_for(resp, id).await?;

        debug!("Like on {} via read-then-write: {} -> {}", id, current, likes);
        Ok(likes)
    }

    pub async fn ping(&self) -> Result<()> {
        let resp = self
            .authed(self.client.get(self.table_url()))
            .query(&[("select", "id"), ("limit", "1")])
            .send()
            .await?;
        check(resp).await?;
        Ok(())
    }
}

fn is_invalid_id(status: StatusCode, body: &str) -> bool {
    status == StatusCode::BAD_REQUEST && body.contains(INVALID_TEXT_REPRESENTATION)
}

async fn check(resp: Response) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(StoreError::Upstream {
        status: status.as_u16(),
        body,
    })
}

/// Like [`check`], but an id the column cannot hold is simply not found.
async fn check_for(resp: Response, id: &ConfessionId) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    if is_invalid_id(status, &body) {
        return Err(StoreError::NotFound(id.clone()));
    }
    Err(StoreError::Upstream {
        status: status.as_u16(),
        body,
    })
}
