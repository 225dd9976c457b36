pub mod error;
pub mod health;
pub mod likes;
pub mod messages;
pub mod middleware;
pub mod state;
pub mod subset;

use axum::{
    Router,
    handler::Handler,
    middleware::from_fn_with_state,
    routing::{get, post},
};

use crate::middleware::{RateLimiter, limit_submissions};
use crate::state::AppState;

/// All `/api` routes. Only submissions go through the rate limiter.
pub fn router(state: AppState, limiter: RateLimiter) -> Router {
    let submit = messages::submit_message.layer(from_fn_with_state(limiter, limit_submissions));

    Router::new()
        .route("/api/messages", get(messages::list_messages).post(submit))
        .route("/api/messages/{id}/like", post(likes::like_message))
        .route("/api/health", get(health::health))
        .with_state(state)
}
