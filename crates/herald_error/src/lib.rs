//! Error types for Herald.
//!
//! This crate provides the foundation error types used throughout the Herald workspace.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All errors use `#[track_caller]` for automatic location capture
//!
//! # Examples
//!
//! ```
//! use herald_error::{HeraldResult, ValidationError, ValidationErrorKind};
//!
//! fn set_color(color: &str) -> HeraldResult<()> {
//!     Err(ValidationError::new(ValidationErrorKind::InvalidColor(color.to_string())))?
//! }
//!
//! assert!(set_color("blue").is_err());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod rate_limit;
mod scheduler;
mod store;
mod validation;

pub use config::ConfigError;
pub use error::{HeraldError, HeraldErrorKind, HeraldResult};
pub use rate_limit::{RateLimitError, RateLimitErrorKind};
pub use scheduler::{SchedulerError, SchedulerErrorKind};
pub use store::{StoreError, StoreErrorKind};
pub use validation::{ValidationError, ValidationErrorKind};
