//! Transform trait for point mappings between physical spaces.

use crate::spatial::Point;

/// Maps points from one physical space to another.
///
/// # Type Parameters
/// * `D` - The spatial dimensionality
pub trait Transform<const D: usize> {
    /// Apply the transform to a single point.
    fn transform_point(&self, point: &Point<D>) -> Point<D>;

    /// Apply the transform to a batch of points.
    fn transform_points(&self, points: &[Point<D>]) -> Vec<Point<D>> {
        points.iter().map(|p| self.transform_point(p)).collect()
    }
}
