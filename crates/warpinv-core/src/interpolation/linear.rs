//! Multilinear interpolation of vector fields.
//!
//! This module provides linear interpolation for fields of any
//! dimensionality (bilinear for 2D, trilinear for 3D).

use crate::image::vector_field::{FieldScalar, VectorField};
use crate::interpolation::trait_::FieldSampler;
use crate::spatial::{Point, Vector};

/// Linear vector interpolator bound to one field.
///
/// The sampled domain is the closed box spanned by the first and last
/// samples on every axis, `[origin, origin + (size - 1) * spacing]`.
/// Membership is decided on the continuous index `(p - origin) / spacing`
/// against `[0, size - 1]`, as ITK does, so a point exactly on the upper
/// physical bound may fall one ulp outside after rounding.
///
/// # Examples
/// ```rust
/// use warpinv_core::image::{GridGeometry, VectorField};
/// use warpinv_core::interpolation::{FieldSampler, VectorLinearInterpolator};
/// use warpinv_core::spatial::{Point2, Vector2};
///
/// let field = VectorField::<f64, 2>::from_fn(GridGeometry::with_size([2, 2]), |p| p.coords);
/// let sampler = VectorLinearInterpolator::new(&field);
/// let centre = Point2::new(0.5, 0.5);
/// assert!(sampler.is_inside(&centre));
/// assert_eq!(sampler.evaluate(&centre), Vector2::new(0.5, 0.5));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct VectorLinearInterpolator<'a, T: FieldScalar, const D: usize> {
    field: &'a VectorField<T, D>,
}

impl<'a, T: FieldScalar, const D: usize> VectorLinearInterpolator<'a, T, D> {
    /// Create an interpolator over `field`.
    pub fn new(field: &'a VectorField<T, D>) -> Self {
        Self { field }
    }

    /// The interpolated field.
    pub fn field(&self) -> &'a VectorField<T, D> {
        self.field
    }
}

impl<T: FieldScalar, const D: usize> FieldSampler<D> for VectorLinearInterpolator<'_, T, D> {
    /// Tested in continuous-index space, not against the physical bounds.
    fn is_inside(&self, point: &Point<D>) -> bool {
        let geometry = self.field.geometry();
        geometry.is_inside_continuous_index(&geometry.physical_point_to_continuous_index(point))
    }

    fn evaluate(&self, point: &Point<D>) -> Vector<D> {
        debug_assert!(self.is_inside(point), "evaluate called outside the sampled domain");

        let geometry = self.field.geometry();
        let size = geometry.size();
        let cindex = geometry.physical_point_to_continuous_index(point);

        let mut lower = [0usize; D];
        let mut upper = [0usize; D];
        let mut frac = [0.0f64; D];
        let mut stride = [0usize; D];
        let mut step = 1;
        for axis in 0..D {
            let base = cindex[axis].floor();
            lower[axis] = base as usize;
            // On the last sample the upper neighbour carries zero weight.
            upper[axis] = (lower[axis] + 1).min(size[axis] - 1);
            frac[axis] = cindex[axis] - base;
            stride[axis] = step;
            step *= size[axis];
        }

        let mut value = Vector::<D>::zeros();
        for corner in 0..(1usize << D) {
            let mut weight = 1.0;
            let mut offset = 0;
            for axis in 0..D {
                if corner & (1 << axis) != 0 {
                    weight *= frac[axis];
                    offset += upper[axis] * stride[axis];
                } else {
                    weight *= 1.0 - frac[axis];
                    offset += lower[axis] * stride[axis];
                }
            }
            if weight == 0.0 {
                continue;
            }
            value += self.field.at_offset(offset) * weight;
        }
        value
    }
}
