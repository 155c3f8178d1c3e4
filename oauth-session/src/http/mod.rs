//! HTTP transport used to reach provider token and user-info endpoints.

mod client;
mod retry;

pub use client::{HttpClient, HttpClientBuilder};
pub use retry::BackoffPolicy;
