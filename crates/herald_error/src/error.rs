//! Top-level error wrapper types.

use crate::{ConfigError, RateLimitError, SchedulerError, StoreError, ValidationError};

/// Every error condition raised inside the Herald workspace.
///
/// # Examples
///
/// ```
/// use herald_error::{HeraldError, StoreError, StoreErrorKind};
///
/// let store_err = StoreError::new(StoreErrorKind::Unavailable("refused".into()));
/// let err: HeraldError = store_err.into();
/// assert!(format!("{}", err).contains("Store Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum HeraldErrorKind {
    /// Settings error
    #[from(ConfigError)]
    Config(ConfigError),
    /// Persistent store error
    #[from(StoreError)]
    Store(StoreError),
    /// Rejected administrative write
    #[from(ValidationError)]
    Validation(ValidationError),
    /// Rate limiter backend error
    #[from(RateLimitError)]
    RateLimit(RateLimitError),
    /// Scheduler error
    #[from(SchedulerError)]
    Scheduler(SchedulerError),
}

/// Herald error with kind discrimination.
///
/// # Examples
///
/// ```
/// use herald_error::{ConfigError, HeraldResult};
///
/// fn might_fail() -> HeraldResult<()> {
///     Err(ConfigError::new("Missing field"))?
/// }
///
/// assert!(might_fail().is_err());
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Herald Error: {}", _0)]
pub struct HeraldError(Box<HeraldErrorKind>);

impl HeraldError {
    /// Create a new error from a kind.
    pub fn new(kind: HeraldErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &HeraldErrorKind {
        &self.0
    }

    /// Whether this error rejected an administrative write.
    pub fn is_validation(&self) -> bool {
        matches!(*self.0, HeraldErrorKind::Validation(_))
    }
}

impl<T> From<T> for HeraldError
where
    T: Into<HeraldErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Herald operations.
pub type HeraldResult<T> = std::result::Result<T, HeraldError>;
