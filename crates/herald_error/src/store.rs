//! Persistent store error types.

/// Store failure conditions.
///
/// Every kind degrades the same way at the call site: the caller logs it and
/// falls back to cached, default or in-memory state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum StoreErrorKind {
    /// Backend not reachable or not configured
    #[display("Store unavailable: {}", _0)]
    Unavailable(String),
    /// Operation exceeded the configured store timeout
    #[display("Store operation timed out after {}ms", _0)]
    Timeout(u64),
    /// Connection could not be established or checked out of the pool
    #[display("Store connection error: {}", _0)]
    Connection(String),
    /// Query execution failed
    #[display("Store query error: {}", _0)]
    Query(String),
    /// Stored document could not be encoded or decoded
    #[display("Serialization error: {}", _0)]
    Serialization(String),
    /// Blocking worker panicked or was cancelled
    #[display("Store task failed: {}", _0)]
    Task(String),
}

/// Store error with source location tracking.
///
/// # Examples
///
/// ```
/// use herald_error::{StoreError, StoreErrorKind};
///
/// let err = StoreError::new(StoreErrorKind::Timeout(5000));
/// assert!(format!("{}", err).contains("timed out"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Store Error: {} at line {} in {}", kind, line, file)]
pub struct StoreError {
    /// The kind of error that occurred
    pub kind: StoreErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl StoreError {
    /// Create a new StoreError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: StoreErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Whether the error was caused by the store timeout elapsing.
    pub fn is_timeout(&self) -> bool {
        matches!(self.kind, StoreErrorKind::Timeout(_))
    }
}

#[cfg(feature = "database")]
impl From<diesel::result::Error> for StoreError {
    fn from(err: diesel::result::Error) -> Self {
        StoreError::new(StoreErrorKind::Query(err.to_string()))
    }
}

#[cfg(feature = "database")]
impl From<diesel::ConnectionError> for StoreError {
    fn from(err: diesel::ConnectionError) -> Self {
        StoreError::new(StoreErrorKind::Connection(err.to_string()))
    }
}

#[cfg(feature = "database")]
impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::new(StoreErrorKind::Serialization(err.to_string()))
    }
}
