//! Fixed-point inversion of sampled displacement fields.

pub mod error;
pub mod spatial;
pub mod image;
pub mod interpolation;
pub mod transform;
pub mod filter;
pub mod progress;

pub use error::{FieldError, Result};
pub use image::{GridGeometry, VectorField};
pub use filter::FixedPointInverseDisplacementFieldFilter;
