//! HTTP client module
//!
//! Provides the HTTP client every storefront request goes through.
//!
//! # Features
//!
//! - **Session Auth**: Bearer token taken from the current session
//! - **Bodies**: JSON and multipart/form-data (image uploads)
//! - **Retries**: Opt-in retry with constant, linear or exponential backoff
//! - **Rate Limiting**: Opt-in token bucket rate limiter using governor

mod client;
mod rate_limit;

pub use client::{
    HttpClient, HttpClientConfig, HttpClientConfigBuilder, MultipartField, RequestBody,
    RequestConfig,
};
pub use rate_limit::{RateLimiter, RateLimiterConfig};
