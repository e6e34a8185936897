//! Rate limiter backend error types.

/// Rate limiter backend failure conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum RateLimitErrorKind {
    /// Backend could not be reached
    #[display("Rate limit backend unavailable: {}", _0)]
    BackendUnavailable(String),
    /// Backend returned a reply that could not be interpreted
    #[display("Unexpected rate limit backend reply: {}", _0)]
    InvalidReply(String),
}

/// Rate limit error with source location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Rate Limit Error: {} at line {} in {}", kind, line, file)]
pub struct RateLimitError {
    /// The kind of error that occurred
    pub kind: RateLimitErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl RateLimitError {
    /// Create a new RateLimitError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: RateLimitErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
