//! Execution helpers
//!
//! Provides:
//! - Retry with fixed or exponential backoff

pub mod retry;

pub use retry::{retry, RetryConfig};
