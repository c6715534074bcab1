//! Error types for column inspection.

use thiserror::Error;

use crate::column::FieldType;
use crate::layout::LayoutVersion;
use crate::mirror::Mismatch;

/// Result type alias for inspection operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for inspection and column metadata operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The cursor argument was absent.
    #[error("argument must not be nil")]
    NilArgument,

    /// The cursor argument is neither a `Row` nor a `Rows`.
    #[error("argument was not Row or Rows")]
    WrongType,

    /// A single-row wrapper holds neither rows nor an error.
    #[error("row holds neither rows nor an error")]
    RowStateInconsistent,

    /// The requested metadata cannot be read from this cursor.
    #[error("{operation} is not available")]
    Unavailable { operation: &'static str },

    /// The driver's internal layout does not match the expected layout.
    ///
    /// This disables extraction for the rest of the process.
    #[error("unexpected structure for {layout} layout: {mismatch}")]
    StructuralMismatch {
        layout: LayoutVersion,
        mismatch: Mismatch,
    },

    /// A wrapper type does not expose the field the extractor needs.
    #[error("unexpected structure of {type_name}: field '{field}' could not be read")]
    UnexpectedStructure {
        type_name: &'static str,
        field: &'static str,
    },

    /// Invalid declaration parameters.
    #[error(transparent)]
    Parameter(#[from] ParameterError),

    /// No native type can represent the column.
    #[error("no matching native type for {field_type}")]
    NoNativeMapping { field_type: FieldType },

    /// Invalid configuration value.
    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// Error reported by the driver.
    #[error("driver error: {message}")]
    Driver { message: String },
}

impl Error {
    /// Create a driver error.
    pub fn driver(message: impl Into<String>) -> Self {
        Self::Driver {
            message: message.into(),
        }
    }

    /// Whether this error means the metadata cannot be extracted at all.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            Error::Unavailable { .. } | Error::StructuralMismatch { .. }
        )
    }
}

/// Rejected argument shape for a type declaration.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterError {
    #[error("can't create declaration for NULL")]
    NoDeclarationForNullType,

    #[error("parameter error, unknown type")]
    UnknownType,

    #[error("parameter error, must be none")]
    ExpectedNone,

    #[error("parameter error, must be none or one int (length)")]
    ExpectedOptionalLength,

    #[error("parameter error, must be one int (length)")]
    ExpectedLength,

    #[error("parameter error, must be none or two ints (length, decimals)")]
    ExpectedOptionalPrecision,

    #[error("parameter error, must be none, one int (length) or two ints (length, decimals)")]
    ExpectedOptionalLengthAndDecimals,

    #[error("parameter error, must be at least one entry")]
    ExpectedValues,
}
