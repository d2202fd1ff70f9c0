//! Failure kinds raised by value operations.
//!
//! Every error is raised at the point of detection and handed back to the
//! immediate caller. Null inputs are never errors, they are answered with a
//! null result before any of these paths are reached.

use crate::sql::types::TypeId;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TypeError {
    /// Arithmetic overflow, or a value that does not fit the target type.
    #[error("the resulting value is outside the range for the data type {0}")]
    OutOfRange(TypeId),

    #[error("attempt to divide by zero")]
    DivideByZero,

    /// A literal that cannot be converted into the named type.
    #[error("invalid character string format for type {type_id}: {input:?}")]
    InvalidFormat { type_id: TypeId, input: String },

    /// Escape character at the end of a LIKE pattern, or followed by
    /// something other than `_`, `%` or itself.
    #[error("escape character must be followed by escape character, '_', or '%'")]
    InvalidEscapeSequence,

    #[error("escape character must be a string of length 1, found {0:?}")]
    InvalidEscapeCharacter(String),

    #[error("the escape clause of a LIKE predicate evaluated to NULL")]
    NullEscape,

    #[error("the syntax of the string representation of a date/time value is incorrect: {0:?}")]
    DateTimeSyntax(String),

    #[error("an attempt was made to get a date/time value from a string that is out of range")]
    DateTimeRange,

    #[error("the start position or length argument of SUBSTR is out of range")]
    SubstringRange,

    #[error("cannot take the square root of a negative number: {0}")]
    SqrtOfNegative(f64),

    /// A value wider than the declared width of its column.
    #[error("a truncation error was encountered trying to shrink {type_id} to length {width}")]
    Truncation { type_id: TypeId, width: usize },

    #[error("comparisons between {left} and {right} are not supported")]
    TypeMismatch { left: TypeId, right: TypeId },

    /// Stored bytes that cannot be decoded.
    #[error("corrupted value encoding: {0}")]
    Corrupted(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl TypeError {
    pub(crate) fn invalid_format(type_id: TypeId, input: impl Into<String>) -> Self {
        Self::InvalidFormat {
            type_id,
            input: input.into(),
        }
    }

    pub(crate) fn corrupted(msg: impl Into<String>) -> Self {
        Self::Corrupted(msg.into())
    }
}

impl From<toml::de::Error> for TypeError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<std::io::Error> for TypeError {
    fn from(err: std::io::Error) -> Self {
        Self::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, TypeError>;
