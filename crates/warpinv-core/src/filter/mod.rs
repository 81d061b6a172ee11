pub mod inverse_displacement;
pub mod residual;

pub use inverse_displacement::{
    FixedPointInverseDisplacementFieldFilter, InverseDisplacementConfig, DEFAULT_NUMBER_OF_ITERATIONS,
};
pub use residual::{inverse_consistency, ResidualStats};
