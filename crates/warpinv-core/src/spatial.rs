//! Spatial types shared by grids, fields and transforms.
//!
//! Physical coordinates are always `f64`, independent of the precision
//! used to store field samples.

use nalgebra::{Point as NaPoint, SVector};

pub type Point<const D: usize> = NaPoint<f64, D>;
pub type Vector<const D: usize> = SVector<f64, D>;
pub type Spacing<const D: usize> = SVector<f64, D>;

/// Discrete grid index, axis 0 first.
pub type Index<const D: usize> = [usize; D];

// Common aliases
pub type Point2 = Point<2>;
pub type Point3 = Point<3>;
pub type Vector2 = Vector<2>;
pub type Vector3 = Vector<3>;
pub type Spacing2 = Spacing<2>;
pub type Spacing3 = Spacing<3>;
