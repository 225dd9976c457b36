use axum::{
    Json,
    extract::{Path, State, rejection::PathRejection},
    response::IntoResponse,
};
use tracing::debug;

use december_types::api::LikeResponse;
use december_types::models::ConfessionId;

use crate::error::ApiError;
use crate::state::AppState;

/// POST /api/messages/{id}/like
///
/// Ids are opaque here; whether one exists is the store's call.
pub async fn like_message(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Path(id) = id.map_err(|_| ApiError::NotFound)?;
    let id = ConfessionId::from(id);

    let likes = state.store.like(&id).await?;
    debug!("Confession {} now has {} likes", id, likes);

    Ok(Json(LikeResponse { likes }))
}
