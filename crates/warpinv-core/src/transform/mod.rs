//! Transform types and operations.
//!
//! This module provides the point transform trait and the transform
//! induced by a sampled displacement field.

pub mod trait_;
pub mod displacement_field;

pub use trait_::Transform;
pub use displacement_field::DisplacementFieldTransform;
