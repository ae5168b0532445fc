//! HTTP client layer — `NexusHttp` with a configurable retry policy.

pub mod client;
pub mod retry;

pub use client::{Endpoints, NexusHttp};
pub use retry::{RetryConfig, RetryPolicy};

#[cfg(test)]
pub(crate) mod stub;
