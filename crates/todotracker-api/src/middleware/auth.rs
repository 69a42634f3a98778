//! Optional API key authentication middleware.
//!
//! Disabled when no key is configured. The key may arrive in the
//! `X-API-Key` header (preferred) or the `api_key` query parameter.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use todotracker_core::error::AppError;

use crate::state::AppState;

/// Middleware that rejects requests without a valid API key when
/// authentication is enabled.
pub async fn require_api_key(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(expected) = state.config.auth.api_key.as_deref() else {
        // No key configured: authentication is disabled.
        return Ok(next.run(request).await);
    };

    let provided = header_key(&request).or_else(|| query_key(&request));

    let Some(provided) = provided else {
        return Err(AppError::unauthorized(
            "API key required. Provide via X-API-Key header or api_key query parameter.",
        ));
    };

    if !keys_match(&provided, expected) {
        return Err(AppError::unauthorized("Invalid API key"));
    }

    Ok(next.run(request).await)
}

fn header_key(request: &Request) -> Option<String> {
    request
        .headers()
        .get("x-api-key")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

fn query_key(request: &Request) -> Option<String> {
    request
        .uri()
        .query()?
        .split('&')
        .find_map(|pair| pair.strip_prefix("api_key="))
        .map(str::to_string)
}

/// Constant-time key comparison.
///
/// Hashes both sides to equal-length digests first, then compares with
/// `subtle`, so neither length nor content differences leak timing.
fn keys_match(provided: &str, expected: &str) -> bool {
    let provided = Sha256::digest(provided.as_bytes());
    let expected = Sha256::digest(expected.as_bytes());
    provided.ct_eq(&expected).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_match() {
        assert!(keys_match("secret", "secret"));
        assert!(!keys_match("secret", "other"));
        assert!(!keys_match("secret", "secret-but-longer"));
    }
}
