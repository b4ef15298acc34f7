use crate::error::AppError;
use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use governor::{
    Quota, RateLimiter,
    clock::{Clock, DefaultClock},
    state::keyed::DashMapStateStore,
};
use std::{net::IpAddr, num::NonZeroU32, sync::Arc, time::Duration};

/// Header carrying the authenticated caller, set by the identity proxy.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Rate limiter keyed by caller (user id, or client IP as a fallback).
pub type KeyedRateLimiter = Arc<RateLimiter<String, DashMapStateStore<String>, DefaultClock>>;

/// Create a keyed limiter allowing `attempts` requests per `window_seconds`,
/// replenished evenly across the window.
pub fn create_keyed_rate_limiter(attempts: u32, window_seconds: u64) -> KeyedRateLimiter {
    let attempts = attempts.max(1);
    let period = Duration::from_millis(((window_seconds * 1000) / attempts as u64).max(1));
    let burst = NonZeroU32::new(attempts).unwrap_or(NonZeroU32::MIN);
    let quota = Quota::with_period(period)
        .unwrap_or_else(|| Quota::per_second(burst))
        .allow_burst(burst);

    Arc::new(RateLimiter::dashmap(quota))
}

/// Derive the limiter key for a request.
pub fn rate_limit_key(headers: &HeaderMap) -> Option<String> {
    let user_id = headers
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty());

    if let Some(user_id) = user_id {
        return Some(format!("user:{}", user_id));
    }

    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .and_then(|s| s.trim().parse::<IpAddr>().ok())
        .map(|ip| format!("ip:{}", ip))
}

/// Middleware for per-caller rate limiting.
pub async fn user_rate_limit_middleware(
    State(limiter): State<KeyedRateLimiter>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(key) = rate_limit_key(request.headers()) else {
        tracing::warn!("Could not determine caller for rate limiting");
        return Ok(next.run(request).await);
    };

    match limiter.check_key(&key) {
        Ok(_) => Ok(next.run(request).await),
        Err(negative) => {
            let wait_time = negative.wait_time_from(DefaultClock::default().now());
            tracing::warn!(key = %key, "Rate limit exceeded");
            Err(AppError::TooManyRequests(
                "Too many requests. Please try again later.".to_string(),
                Some(wait_time.as_secs().max(1)),
            ))
        }
    }
}
