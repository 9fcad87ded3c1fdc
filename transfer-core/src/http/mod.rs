//! The authenticated, retrying, rate-limited HTTP client bound to a single
//! server.

mod client;
mod rate_limiter;

pub use client::{ConnectionTestResult, HttpClient, HttpClientError, HttpClientOptions, HttpClientStats, DEFAULT_MAX_REQUESTS_PER_SECOND, DEFAULT_MAX_RETRIES, DEFAULT_TIMEOUT_MS};
pub use rate_limiter::RateLimiter;
