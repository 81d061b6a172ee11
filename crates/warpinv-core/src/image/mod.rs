//! Grid geometry and sampled vector fields.
//!
//! This module provides the grid geometry shared by input and output
//! fields, the dense `VectorField` type and its tensor conversions.

pub mod grid;
pub mod vector_field;
pub mod tensor;

pub use grid::{GridGeometry, RasterIndices};
pub use vector_field::{FieldScalar, VectorField};
