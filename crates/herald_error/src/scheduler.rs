//! Scheduler error types.

/// Scheduler failure conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum SchedulerErrorKind {
    /// No representable boundary follows the given instant
    #[display("No boundary after {}", _0)]
    NoBoundary(String),
}

/// Scheduler error with source location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Scheduler Error: {} at line {} in {}", kind, line, file)]
pub struct SchedulerError {
    /// The kind of error that occurred
    pub kind: SchedulerErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl SchedulerError {
    /// Create a new SchedulerError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: SchedulerErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
