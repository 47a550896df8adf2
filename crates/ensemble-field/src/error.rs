//! Error types for field access operations.

use thiserror::Error;

use crate::variable::VariableKind;

/// Result type for field access operations.
pub type Result<T> = std::result::Result<T, FieldError>;

/// Errors that can occur while resolving, reading or writing ensemble fields.
///
/// Every variant names the file it was raised for, so a message is diagnosable
/// without the surrounding call stack.
#[derive(Error, Debug)]
pub enum FieldError {
    /// A file committed to this convention lacks a required dimension or variable.
    #[error("'{file}' does not follow the ensemble convention: missing {missing}")]
    Schema { file: String, missing: String },

    /// A required dimension is absent.
    #[error("'{file}': missing dimension '{dimension}'")]
    MissingDimension { file: String, dimension: String },

    /// A required variable is absent.
    #[error("'{file}': missing variable '{variable}'")]
    MissingVariable { file: String, variable: String },

    /// The variable kind has no native name in this file's convention.
    #[error("'{file}': no variable name is mapped for kind '{kind}'")]
    UnresolvedVariable { file: String, kind: VariableKind },

    /// Requested time step is past the end of the time dimension.
    #[error("'{file}': time index {time} out of range for '{variable}' (time steps: {n_time})")]
    TimeOutOfRange {
        file: String,
        variable: String,
        time: usize,
        n_time: usize,
    },

    /// Stored element count disagrees with the geometry.
    #[error("'{file}': variable '{variable}' holds {actual} values, expected {expected}")]
    ShapeMismatch {
        file: String,
        variable: String,
        expected: usize,
        actual: usize,
    },

    /// A variable's axes are not `(time, ensemble, latitude, longitude)` in
    /// that order, ignoring singleton axes such as `surface`.
    #[error("'{file}': variable '{variable}' has dimensions {actual:?}, expected {expected:?} (singleton axes aside)")]
    Layout {
        file: String,
        variable: String,
        expected: Vec<String>,
        actual: Vec<String>,
    },

    /// A field handed in for writing does not match the file geometry.
    #[error("'{file}': field for '{variable}' has shape {actual:?}, expected {expected:?}")]
    FieldShape {
        file: String,
        variable: String,
        expected: [usize; 3],
        actual: [usize; 3],
    },

    /// Write attempted through a read-only session.
    #[error("'{file}' was opened read-only")]
    ReadOnly { file: String },

    /// Failure reported by the underlying storage engine.
    #[error("'{file}': storage error: {message}")]
    Storage { file: String, message: String },

    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Coarse classification of a [`FieldError`].
///
/// Lets callers decide whether to recover, log or abort without matching on
/// every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The caller asked for something the file cannot provide.
    InvalidInput,
    /// The file violates a structural invariant of the convention.
    Invariant,
    /// The storage engine failed.
    Storage,
    /// The configuration is unusable.
    Config,
}

impl FieldError {
    /// Create a Storage error.
    pub fn storage(file: impl Into<String>, message: impl ToString) -> Self {
        Self::Storage {
            file: file.into(),
            message: message.to_string(),
        }
    }

    /// Create a MissingVariable error.
    pub fn missing_variable(file: impl Into<String>, variable: impl Into<String>) -> Self {
        Self::MissingVariable {
            file: file.into(),
            variable: variable.into(),
        }
    }

    /// Create a MissingDimension error.
    pub fn missing_dimension(file: impl Into<String>, dimension: impl Into<String>) -> Self {
        Self::MissingDimension {
            file: file.into(),
            dimension: dimension.into(),
        }
    }

    /// Classify this error.
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::UnresolvedVariable { .. }
            | Self::TimeOutOfRange { .. }
            | Self::FieldShape { .. }
            | Self::ReadOnly { .. } => ErrorClass::InvalidInput,
            Self::Schema { .. }
            | Self::MissingDimension { .. }
            | Self::MissingVariable { .. }
            | Self::ShapeMismatch { .. }
            | Self::Layout { .. } => ErrorClass::Invariant,
            Self::Storage { .. } => ErrorClass::Storage,
            Self::Config(_) => ErrorClass::Config,
        }
    }
}

impl From<serde_yaml::Error> for FieldError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Config(err.to_string())
    }
}
