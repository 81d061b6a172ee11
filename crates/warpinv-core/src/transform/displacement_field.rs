//! Dense displacement field transform.
//!
//! Maps `p` to `p + F(p)` where `F` is a sampled field evaluated by
//! multilinear interpolation. Points outside the sampled domain are left
//! where they are.

use crate::image::vector_field::{FieldScalar, VectorField};
use crate::interpolation::{FieldSampler, VectorLinearInterpolator};
use crate::spatial::Point;
use super::trait_::Transform;

/// Point transform backed by a sampled displacement field.
///
/// # Type Parameters
/// * `T` - Storage precision of the field
/// * `D` - The spatial dimensionality
#[derive(Debug, Clone, Copy)]
pub struct DisplacementFieldTransform<'a, T: FieldScalar, const D: usize> {
    interpolator: VectorLinearInterpolator<'a, T, D>,
}

impl<'a, T: FieldScalar, const D: usize> DisplacementFieldTransform<'a, T, D> {
    /// Create a transform over `field`.
    pub fn new(field: &'a VectorField<T, D>) -> Self {
        Self {
            interpolator: VectorLinearInterpolator::new(field),
        }
    }

    /// Get the displacement field.
    pub fn displacement(&self) -> &'a VectorField<T, D> {
        self.interpolator.field()
    }

    /// Map `point` if it lies inside the field domain, otherwise `None`.
    pub fn try_transform_point(&self, point: &Point<D>) -> Option<Point<D>> {
        self.interpolator
            .is_inside(point)
            .then(|| *point + self.interpolator.evaluate(point))
    }
}

impl<T: FieldScalar, const D: usize> Transform<D> for DisplacementFieldTransform<'_, T, D> {
    fn transform_point(&self, point: &Point<D>) -> Point<D> {
        self.try_transform_point(point).unwrap_or(*point)
    }
}
