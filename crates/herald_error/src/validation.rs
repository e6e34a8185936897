//! Administrative write validation errors.

/// Reasons an administrative configuration write is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum ValidationErrorKind {
    /// Color is not a `#RRGGBB` hex string
    #[display("Invalid color '{}': expected #RRGGBB", _0)]
    InvalidColor(String),
    /// Prefix is empty or whitespace
    #[display("Prefix must not be empty")]
    EmptyPrefix,
    /// Prefix contains whitespace
    #[display("Prefix '{}' must not contain whitespace", _0)]
    PrefixWhitespace(String),
    /// Prefix exceeds the maximum length
    #[display("Prefix is {} characters, maximum is {}", length, max)]
    PrefixTooLong {
        /// Actual length in characters
        length: usize,
        /// Maximum allowed length
        max: usize,
    },
    /// Two channel overrides share the same channel id
    #[display("Channel {} is configured more than once", _0)]
    DuplicateChannel(u64),
    /// Channel override does not exist
    #[display("Channel {} has no override", _0)]
    UnknownChannel(u64),
    /// A text field exceeds its platform limit
    #[display("Field '{}' is {} characters, maximum is {}", field, length, max)]
    FieldTooLong {
        /// Field name
        field: String,
        /// Actual length in characters
        length: usize,
        /// Maximum allowed length
        max: usize,
    },
}

/// Validation error with source location tracking.
///
/// # Examples
///
/// ```
/// use herald_error::{ValidationError, ValidationErrorKind};
///
/// let err = ValidationError::new(ValidationErrorKind::DuplicateChannel(42));
/// assert!(format!("{}", err).contains("more than once"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Validation Error: {} at line {} in {}", kind, line, file)]
pub struct ValidationError {
    /// The kind of error that occurred
    pub kind: ValidationErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl ValidationError {
    /// Create a new ValidationError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: ValidationErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
