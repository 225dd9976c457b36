mod config;

use std::net::SocketAddr;
use std::path::Path;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use december_api::middleware::{RateLimitConfig, RateLimiter};
use december_api::state::AppStateInner;
use december_db::Store;
use december_filter::{FilterRules, ProfanityFilter, Validator};

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "december=debug,december_api=debug,december_db=info,tower_http=debug".into()),
        )
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("FATAL: {}", e);
            eprintln!("       DECEMBER_STORE_URL and DECEMBER_STORE_KEY must be set.");
            std::process::exit(1);
        }
    };

    let store = Store::connect(&config.store_url, &config.store_key)?;
    info!("Store backend: {}", store.backend());

    let validator = Validator::new(load_filter(config.filter_rules.as_deref())?, config.strict_charset)?;
    if !validator.strict_charset() {
        info!("Character allowlist disabled");
    }

    let limiter = RateLimiter::new(RateLimitConfig {
        max_requests: config.rate_limit_max,
        window: config.rate_limit_window,
        trust_forwarded: config.trust_forwarded,
    });

    let app = build_app(AppStateInner::new(store, validator), limiter, &config.public_dir);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("December server listening on {}", addr);
    info!(
        "Submissions limited to {} per {}s",
        config.rate_limit_max,
        config.rate_limit_window.as_secs()
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    Ok(())
}

fn load_filter(path: Option<&Path>) -> anyhow::Result<ProfanityFilter> {
    let rules = match path {
        Some(path) => {
            info!("Loading filter rules from {}", path.display());
            FilterRules::load(path)?
        }
        None => FilterRules::default(),
    };

    let unreachable = rules.unreachable_words();
    if !unreachable.is_empty() {
        warn!("Filter words that normalization can never match: {:?}", unreachable);
    }

    let filter = ProfanityFilter::new(rules)?;
    info!(
        "Profanity filter: {} words, {} patterns",
        filter.word_count(),
        filter.pattern_count()
    );
    Ok(filter)
}

/// API routes plus the single-page client. Any path the API does not claim
/// is answered with `index.html` so client-side routing owns it.
fn build_app(state: december_api::state::AppState, limiter: RateLimiter, public_dir: &Path) -> Router {
    let client = ServeDir::new(public_dir).fallback(ServeFile::new(public_dir.join("index.html")));

    december_api::router(state, limiter)
        .fallback_service(client)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        let mut sigterm =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                .expect("failed to install SIGTERM handler");
        tokio::select! {
            _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
            _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
