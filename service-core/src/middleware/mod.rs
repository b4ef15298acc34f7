pub mod metrics;
pub mod rate_limit;
pub mod security_headers;
pub mod tracing;

pub use metrics::metrics_middleware;
pub use rate_limit::{
    KeyedRateLimiter, USER_ID_HEADER, create_keyed_rate_limiter, user_rate_limit_middleware,
};
pub use security_headers::security_headers_middleware;
pub use tracing::request_id_middleware;
