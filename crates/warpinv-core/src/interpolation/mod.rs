//! Interpolation of sampled vector fields.
//!
//! This module provides the sampler trait and the multilinear
//! interpolator used by the inversion filter.

pub mod trait_;
pub mod linear;

pub use trait_::FieldSampler;
pub use linear::VectorLinearInterpolator;
