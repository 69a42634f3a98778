//! Token bucket rate limiter middleware, per endpoint class.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::extract::{ConnectInfo, Request, State};
use axum::http::Method;
use axum::middleware::Next;
use axum::response::Response;
use tokio::sync::Mutex;

use todotracker_core::error::AppError;

use crate::state::AppState;

/// Simple in-memory token bucket rate limiter.
#[derive(Debug)]
pub struct RateLimiter {
    /// Client key → bucket state.
    buckets: Arc<Mutex<HashMap<String, TokenBucket>>>,
    /// Maximum tokens per bucket (burst size).
    max_tokens: u32,
    /// Token refill rate per second.
    refill_rate: f64,
}

#[derive(Debug, Clone)]
struct TokenBucket {
    tokens: f64,
    last_refill: Instant,
}

impl RateLimiter {
    /// Creates a limiter allowing `per_minute` requests per minute with a
    /// burst of the same size.
    pub fn per_minute(per_minute: u32) -> Self {
        Self {
            buckets: Arc::new(Mutex::new(HashMap::new())),
            max_tokens: per_minute.max(1),
            refill_rate: f64::from(per_minute.max(1)) / 60.0,
        }
    }

    /// Attempts to consume a token for the given key.
    pub async fn check(&self, key: &str) -> bool {
        let mut buckets = self.buckets.lock().await;
        let now = Instant::now();

        let bucket = buckets.entry(key.to_string()).or_insert(TokenBucket {
            tokens: f64::from(self.max_tokens),
            last_refill: now,
        });

        // Refill tokens
        let elapsed = now.duration_since(bucket.last_refill).as_secs_f64();
        bucket.tokens = (bucket.tokens + elapsed * self.refill_rate).min(f64::from(self.max_tokens));
        bucket.last_refill = now;

        // Try to consume
        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

/// Rate limit for the default endpoint class. Read-only methods pass
/// untouched; mutations consume a token.
pub async fn default_rate_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if !state.config.rate_limit.enabled {
        return Ok(next.run(request).await);
    }
    if matches!(
        *request.method(),
        Method::GET | Method::HEAD | Method::OPTIONS
    ) {
        return Ok(next.run(request).await);
    }

    if !state.default_limiter.check(&client_key(&request)).await {
        return Err(AppError::rate_limited("Rate limit exceeded"));
    }
    Ok(next.run(request).await)
}

/// Rate limit for the upload endpoint class.
pub async fn upload_rate_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if !state.config.rate_limit.enabled {
        return Ok(next.run(request).await);
    }

    if !state.upload_limiter.check(&client_key(&request)).await {
        return Err(AppError::rate_limited("Upload rate limit exceeded"));
    }
    Ok(next.run(request).await)
}

/// Client key for bucketing: the first `X-Forwarded-For` entry when
/// present (reverse proxy setups), otherwise the peer address.
fn client_key(request: &Request) -> String {
    if let Some(forwarded) = request
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        && let Some(first) = forwarded.split(',').next()
    {
        return first.trim().to_string();
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0.ip().to_string())
        .unwrap_or_else(|| "local".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bucket_exhausts_and_refills() {
        let limiter = RateLimiter::per_minute(2);

        assert!(limiter.check("a").await);
        assert!(limiter.check("a").await);
        assert!(!limiter.check("a").await);

        // A different client has its own bucket.
        assert!(limiter.check("b").await);
    }
}
