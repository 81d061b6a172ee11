//! Inverse-consistency diagnostics.
//!
//! For an inverse estimate `G` of a forward field `F`, the residual at an
//! output point `x` is `|y + F(y) - x|` with `y = x + G(x)`, i.e. how far
//! the round trip through both fields lands from where it started.

use crate::error::Result;
use crate::image::vector_field::{FieldScalar, VectorField};
use crate::interpolation::{FieldSampler, VectorLinearInterpolator};

/// Summary statistics of the inverse-consistency residual.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ResidualStats {
    /// Largest residual.
    pub max: f64,
    /// Mean residual.
    pub mean: f64,
    /// Root mean square residual.
    pub rms: f64,
    /// Points whose round trip stayed inside the forward domain.
    pub evaluated_points: usize,
    /// Points whose `x + G(x)` fell outside the forward domain.
    pub skipped_points: usize,
}

/// Residual of `inverse` as an inverse of `forward`.
///
/// All statistics are zero when no point could be evaluated.
///
/// # Errors
/// Any geometry validation error of either field.
pub fn inverse_consistency<T, U, const D: usize>(
    forward: &VectorField<T, D>,
    inverse: &VectorField<U, D>,
) -> Result<ResidualStats>
where
    T: FieldScalar,
    U: FieldScalar,
{
    forward.geometry().validate()?;
    inverse.geometry().validate()?;

    let sampler = VectorLinearInterpolator::new(forward);
    let geometry = inverse.geometry();
    let mut stats = ResidualStats::default();
    let mut sum = 0.0;
    let mut sum_sq = 0.0;

    for (offset, index) in geometry.indices().enumerate() {
        let x = geometry.index_to_physical_point(&index);
        let y = x + inverse.at_offset(offset);
        if !sampler.is_inside(&y) {
            stats.skipped_points += 1;
            continue;
        }
        let error = (y + sampler.evaluate(&y) - x).norm();
        stats.max = stats.max.max(error);
        sum += error;
        sum_sq += error * error;
        stats.evaluated_points += 1;
    }

    if stats.evaluated_points > 0 {
        let n = stats.evaluated_points as f64;
        stats.mean = sum / n;
        stats.rms = (sum_sq / n).sqrt();
    }
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::GridGeometry;
    use crate::spatial::Vector2;

    #[test]
    fn test_exact_inverse_of_translation() {
        let geometry = GridGeometry::<2>::with_size([6, 6]);
        let forward = VectorField::<f64, 2>::filled(geometry.clone(), Vector2::new(0.5, 0.0));
        let inverse = VectorField::<f64, 2>::filled(geometry, Vector2::new(-0.5, 0.0));

        let stats = inverse_consistency(&forward, &inverse).unwrap();
        assert_eq!(stats.max, 0.0);
        // x = 0 maps to -0.5, outside the forward domain.
        assert_eq!(stats.skipped_points, 6);
        assert_eq!(stats.evaluated_points, 30);
    }

    #[test]
    fn test_zero_inverse_measures_forward_magnitude() {
        let geometry = GridGeometry::<2>::with_size([4, 4]);
        let forward = VectorField::<f32, 2>::filled(geometry.clone(), Vector2::new(0.0, 0.25));
        let inverse = VectorField::<f64, 2>::zeros(geometry);

        let stats = inverse_consistency(&forward, &inverse).unwrap();
        assert!((stats.max - 0.25).abs() < 1e-12);
        assert!((stats.mean - 0.25).abs() < 1e-12);
        assert!((stats.rms - 0.25).abs() < 1e-12);
        assert_eq!(stats.evaluated_points, 16);
    }

    #[test]
    fn test_empty_inverse() {
        let forward = VectorField::<f64, 2>::zeros(GridGeometry::with_size([4, 4]));
        let inverse = VectorField::<f64, 2>::zeros(GridGeometry::with_size([0, 4]));
        assert_eq!(inverse_consistency(&forward, &inverse).unwrap(), ResidualStats::default());
    }
}
