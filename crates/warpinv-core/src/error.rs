//! Error types for field inversion.
//!
//! Every variant describes a configuration problem detected before a run
//! starts. Sampling outside the input domain is not an error.

use thiserror::Error;

/// Main error type for geometry, field and filter operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FieldError {
    /// Spacing component is zero, negative or not finite.
    #[error("Invalid spacing on axis {axis}: {value} (must be finite and > 0)")]
    InvalidSpacing { axis: usize, value: f64 },

    /// Malformed geometry other than spacing.
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    /// Vector or coordinate dimensionality does not match the grid.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Sample buffer does not cover the grid.
    #[error("Buffer length mismatch: expected {expected} values, got {actual}")]
    BufferLength { expected: usize, actual: usize },

    /// The filter was run without an input field.
    #[error("No input displacement field has been set")]
    MissingInput,

    /// Discrete index outside the grid extent.
    #[error("Index {index:?} is outside grid of size {size:?}")]
    IndexOutOfBounds { index: Vec<usize>, size: Vec<usize> },

    /// Tensor data could not be read back.
    #[error("Tensor data error: {0}")]
    TensorData(String),
}

/// Result type for field operations.
pub type Result<T> = std::result::Result<T, FieldError>;

impl FieldError {
    /// Create an invalid geometry error.
    pub fn invalid_geometry(msg: impl Into<String>) -> Self {
        Self::InvalidGeometry(msg.into())
    }

    /// Create a dimension mismatch error.
    pub fn dimension_mismatch(expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch { expected, actual }
    }

    /// Create a buffer length error.
    pub fn buffer_length(expected: usize, actual: usize) -> Self {
        Self::BufferLength { expected, actual }
    }

    /// Create a tensor data error.
    pub fn tensor_data(msg: impl Into<String>) -> Self {
        Self::TensorData(msg.into())
    }
}
