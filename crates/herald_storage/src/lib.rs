//! Store abstractions for Herald.
//!
//! [`ConfigStore`] persists guild configuration documents and [`StatsStore`]
//! persists engagement counters and history. Both are async traits so that
//! the in-memory implementations and the PostgreSQL backend (feature
//! `database`) are interchangeable behind `Arc<dyn _>`.
//!
//! [`TimeoutStore`] bounds every call of a wrapped store, turning a hung
//! backend into an ordinary [`StoreErrorKind::Timeout`](herald_error::StoreErrorKind::Timeout).

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config_store;
mod memory;
mod stats_store;
mod timeout;

#[cfg(feature = "database")]
pub mod postgres;

pub use config_store::{ConfigStore, ConfigWrite};
pub use memory::InMemoryStatsStore;
pub use stats_store::StatsStore;
pub use timeout::{DEFAULT_STORE_TIMEOUT, TimeoutStore, with_timeout};

use herald_error::StoreError;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
