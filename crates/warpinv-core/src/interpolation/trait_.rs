//! Sampler trait for evaluating a field at continuous physical points.

use crate::spatial::{Point, Vector};

/// Continuous evaluation of a sampled vector field.
///
/// # Type Parameters
/// * `D` - The spatial dimensionality
pub trait FieldSampler<const D: usize> {
    /// Whether `point` lies within the sampled domain.
    fn is_inside(&self, point: &Point<D>) -> bool;

    /// Field value at `point`.
    ///
    /// Only defined when [`is_inside`](Self::is_inside) holds; callers must
    /// test first. Implementations apply no boundary policy of their own.
    fn evaluate(&self, point: &Point<D>) -> Vector<D>;
}

impl<const D: usize, S: FieldSampler<D> + ?Sized> FieldSampler<D> for &S {
    fn is_inside(&self, point: &Point<D>) -> bool {
        (**self).is_inside(point)
    }

    fn evaluate(&self, point: &Point<D>) -> Vector<D> {
        (**self).evaluate(point)
    }
}
