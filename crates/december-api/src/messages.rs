use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::{debug, info};

use december_types::api::{SubmitConfessionRequest, SubmitConfessionResponse};

use crate::error::ApiError;
use crate::state::AppState;
use crate::subset::select_random_subset;

const RELEASED: &str = "Tulisan berhasil dilepaskan.";

/// GET /api/messages: a fresh random handful of confessions per call.
pub async fn list_messages(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let all = state.store.list_all().await?;
    let total = all.len();

    let subset = select_random_subset(all, &mut rand::rng());
    debug!("Listing {} of {} confessions", subset.len(), total);

    Ok(Json(subset))
}

/// POST /api/messages: validate, filter, then persist.
pub async fn submit_message(
    State(state): State<AppState>,
    payload: Result<Json<SubmitConfessionRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload.map_err(|_| ApiError::Malformed)?;

    let text = state.validator.validate(req.text.as_deref())?;
    let created = state.store.insert(&text).await?;

    info!("Confession {} released ({} chars)", created.id, text.chars().count());

    Ok((
        StatusCode::CREATED,
        Json(SubmitConfessionResponse {
            message: RELEASED.to_string(),
            id: created.id,
        }),
    ))
}
