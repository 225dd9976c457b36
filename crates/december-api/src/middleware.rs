use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, HeaderName, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::debug;

use crate::error::ApiError;

/// Windows are swept once the table grows past this many clients.
const SWEEP_THRESHOLD: usize = 1024;

#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub max_requests: u32,
    pub window: Duration,
    /// Take the client address from `X-Forwarded-For` (behind a proxy).
    pub trust_forwarded: bool,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 5,
            window: Duration::from_secs(15 * 60),
            trust_forwarded: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allowed { remaining: u32, reset_after: Duration },
    Limited { retry_after: Duration },
}

struct Window {
    count: u32,
    started: Instant,
}

/// Fixed-window limiter keyed by client address. Requests over the cap are
/// rejected outright, never queued.
#[derive(Clone)]
pub struct RateLimiter {
    inner: Arc<RateLimiterInner>,
}

struct RateLimiterInner {
    config: RateLimitConfig,
    windows: Mutex<HashMap<IpAddr, Window>>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            inner: Arc::new(RateLimiterInner {
                config,
                windows: Mutex::new(HashMap::new()),
            }),
        }
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.inner.config
    }

    pub fn check(&self, client: IpAddr, now: Instant) -> Decision {
        let config = &self.inner.config;
        let mut windows = self
            .inner
            .windows
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if windows.len() > SWEEP_THRESHOLD {
            windows.retain(|_, w| now.duration_since(w.started) < config.window);
        }

        let window = windows.entry(client).or_insert(Window {
            count: 0,
            started: now,
        });

        if now.duration_since(window.started) >= config.window {
            window.count = 0;
            window.started = now;
        }

        let reset_after = config.window.saturating_sub(now.duration_since(window.started));

        if window.count < config.max_requests {
            window.count += 1;
            Decision::Allowed {
                remaining: config.max_requests - window.count,
                reset_after,
            }
        } else {
            Decision::Limited {
                retry_after: reset_after,
            }
        }
    }

    /// Connection address, or the first `X-Forwarded-For` hop when trusted.
    fn client_ip(&self, req: &Request) -> IpAddr {
        if self.inner.config.trust_forwarded {
            if let Some(ip) = forwarded_for(req.headers()) {
                return ip;
            }
        }

        req.extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip())
            .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST))
    }

    fn rejection_message(&self) -> String {
        let minutes = self.inner.config.window.as_secs().div_ceil(60).max(1);
        format!("Terlalu sering. Tunggu {} menit.", minutes)
    }
}

fn forwarded_for(headers: &HeaderMap) -> Option<IpAddr> {
    headers
        .get("x-forwarded-for")?
        .to_str()
        .ok()?
        .split(',')
        .next()?
        .trim()
        .parse()
        .ok()
}

fn ceil_secs(d: Duration) -> u64 {
    d.as_secs() + u64::from(d.subsec_nanos() > 0)
}

/// Throttle submissions per client.
pub async fn limit_submissions(
    State(limiter): State<RateLimiter>,
    req: Request,
    next: Next,
) -> Response {
    let client = limiter.client_ip(&req);

    match limiter.check(client, Instant::now()) {
        Decision::Allowed {
            remaining,
            reset_after,
        } => {
            let mut resp = next.run(req).await;
            let headers = resp.headers_mut();
            headers.insert(
                HeaderName::from_static("ratelimit-limit"),
                HeaderValue::from(limiter.config().max_requests),
            );
            headers.insert(HeaderName::from_static("ratelimit-remaining"), HeaderValue::from(remaining));
            headers.insert(
                HeaderName::from_static("ratelimit-reset"),
                HeaderValue::from(ceil_secs(reset_after)),
            );
            resp
        }
        Decision::Limited { retry_after } => {
            debug!("Rate limited submission from {}", client);
            ApiError::RateLimited {
                message: limiter.rejection_message(),
                limit: limiter.config().max_requests,
                retry_after_secs: ceil_secs(retry_after),
            }
            .into_response()
        }
    }
}
