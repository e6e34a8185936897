//! Sliding-window command rate limiting.
//!
//! Each `(user, command)` pair keeps a log of consumption timestamps. A call
//! is allowed while fewer than `limit` timestamps fall inside the trailing
//! window. When the backend is missing or failing the limiter fails open.
//!
//! # Example
//!
//! ```
//! use herald_core::UserId;
//! use herald_rate_limit::{InMemoryWindow, RateLimitConfig, RateLimiter};
//! use std::sync::Arc;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let limiter = RateLimiter::new(RateLimitConfig::default())
//!     .with_backend(Arc::new(InMemoryWindow::new()));
//! let decision = limiter.check_and_consume("welcome", UserId(1)).await;
//! assert!(!decision.limited);
//! assert_eq!(decision.remaining, 4);
//! # });
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod config;
mod limiter;
mod memory;
#[cfg(feature = "redis")]
mod redis_backend;

pub use backend::{WindowBackend, WindowOutcome};
pub use config::{CommandLimit, RateLimitConfig};
pub use limiter::{FAIL_OPEN_REMAINING, MIN_PURGE_INTERVAL, RateLimitDecision, RateLimiter};
pub use memory::InMemoryWindow;
#[cfg(feature = "redis")]
pub use redis_backend::RedisWindow;
