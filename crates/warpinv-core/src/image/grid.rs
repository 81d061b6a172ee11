//! Rectangular sampling grid geometry.
//!
//! A grid maps discrete indices to physical points with
//! `point = origin + index ⊙ spacing`. Samples are stored and visited in
//! raster order with axis 0 varying fastest.

use serde::{Deserialize, Serialize};
use crate::error::{FieldError, Result};
use crate::spatial::{Index, Point, Spacing};

/// Origin, spacing and extent of a D-dimensional sampling grid.
///
/// # Examples
/// ```rust
/// use warpinv_core::image::GridGeometry;
/// use warpinv_core::spatial::{Point2, Spacing2};
///
/// let grid = GridGeometry::new(Point2::new(1.0, 2.0), Spacing2::new(0.5, 2.0), [4, 3]).unwrap();
/// let point = grid.index_to_physical_point(&[2, 1]);
/// assert_eq!(point, Point2::new(2.0, 4.0));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridGeometry<const D: usize> {
    /// Physical coordinate of index zero.
    origin: Point<D>,
    /// Physical distance between samples along each axis.
    spacing: Spacing<D>,
    /// Number of samples along each axis.
    #[serde(with = "extent_serde")]
    size: Index<D>,
}

impl<const D: usize> GridGeometry<D> {
    /// Create a validated grid geometry.
    ///
    /// # Errors
    /// `InvalidSpacing` if any spacing component is not finite and strictly
    /// positive, `InvalidGeometry` if the origin is not finite.
    pub fn new(origin: Point<D>, spacing: Spacing<D>, size: Index<D>) -> Result<Self> {
        let geometry = Self { origin, spacing, size };
        geometry.validate()?;
        Ok(geometry)
    }

    /// Unit-spaced grid at the physical origin.
    pub fn with_size(size: Index<D>) -> Self {
        Self {
            origin: Point::origin(),
            spacing: Spacing::repeat(1.0),
            size,
        }
    }

    /// Check the spacing and origin invariants.
    pub fn validate(&self) -> Result<()> {
        for axis in 0..D {
            let value = self.spacing[axis];
            if !(value.is_finite() && value > 0.0) {
                return Err(FieldError::InvalidSpacing { axis, value });
            }
            if !self.origin[axis].is_finite() {
                return Err(FieldError::invalid_geometry(format!(
                    "origin component {} on axis {} is not finite",
                    self.origin[axis], axis
                )));
            }
        }
        Ok(())
    }

    pub fn origin(&self) -> &Point<D> {
        &self.origin
    }

    pub fn spacing(&self) -> &Spacing<D> {
        &self.spacing
    }

    pub fn size(&self) -> &Index<D> {
        &self.size
    }

    /// Total number of grid points (zero if any axis is empty).
    pub fn number_of_points(&self) -> usize {
        self.size.iter().product()
    }

    /// Map a discrete index to its physical point.
    ///
    /// Valid for any index, whether or not a sample exists there.
    pub fn index_to_physical_point(&self, index: &Index<D>) -> Point<D> {
        let mut point = self.origin;
        for axis in 0..D {
            point[axis] += index[axis] as f64 * self.spacing[axis];
        }
        point
    }

    /// Map a physical point to a continuous index.
    pub fn physical_point_to_continuous_index(&self, point: &Point<D>) -> Point<D> {
        let mut index = Point::<D>::origin();
        for axis in 0..D {
            index[axis] = (point[axis] - self.origin[axis]) / self.spacing[axis];
        }
        index
    }

    /// Whether a continuous index lies in `[0, size - 1]` on every axis.
    ///
    /// Always false when an axis has zero extent. NaN coordinates are outside.
    /// Physical points are tested through this after conversion, so the
    /// upper bound is exact in index space rather than in physical space.
    pub fn is_inside_continuous_index(&self, index: &Point<D>) -> bool {
        (0..D).all(|axis| {
            let upper = self.size[axis] as f64 - 1.0;
            index[axis] >= 0.0 && index[axis] <= upper
        })
    }

    /// Whether a discrete index addresses a stored sample.
    pub fn contains_index(&self, index: &Index<D>) -> bool {
        (0..D).all(|axis| index[axis] < self.size[axis])
    }

    /// Position of an index in the raster-ordered sample buffer.
    ///
    /// The index must satisfy [`contains_index`](Self::contains_index).
    pub fn linear_offset(&self, index: &Index<D>) -> usize {
        let mut offset = 0;
        let mut stride = 1;
        for axis in 0..D {
            offset += index[axis] * stride;
            stride *= self.size[axis];
        }
        offset
    }

    /// Inverse of [`linear_offset`](Self::linear_offset).
    pub fn index_from_offset(&self, mut offset: usize) -> Index<D> {
        let mut index = [0; D];
        for axis in 0..D {
            let extent = self.size[axis].max(1);
            index[axis] = offset % extent;
            offset /= extent;
        }
        index
    }

    /// Iterate over every grid index in raster order.
    pub fn indices(&self) -> RasterIndices<D> {
        RasterIndices::new(self.size)
    }
}

impl<const D: usize> Default for GridGeometry<D> {
    fn default() -> Self {
        Self::with_size([0; D])
    }
}

/// Raster-order iterator over the indices of a grid.
///
/// Axis 0 varies fastest, matching the sample buffer layout.
#[derive(Debug, Clone)]
pub struct RasterIndices<const D: usize> {
    size: Index<D>,
    next: Option<Index<D>>,
    remaining: usize,
}

impl<const D: usize> RasterIndices<D> {
    fn new(size: Index<D>) -> Self {
        let remaining: usize = size.iter().product();
        let next = if remaining == 0 { None } else { Some([0; D]) };
        Self { size, next, remaining }
    }
}

impl<const D: usize> Iterator for RasterIndices<D> {
    type Item = Index<D>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.remaining -= 1;

        let mut advanced = current;
        let mut carried = true;
        for axis in 0..D {
            advanced[axis] += 1;
            if advanced[axis] < self.size[axis] {
                carried = false;
                break;
            }
            advanced[axis] = 0;
        }
        self.next = if carried { None } else { Some(advanced) };

        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<const D: usize> ExactSizeIterator for RasterIndices<D> {}

pub(crate) mod extent_serde {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer, const D: usize>(
        size: &[usize; D],
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_seq(size.iter())
    }

    pub fn deserialize<'de, De: Deserializer<'de>, const D: usize>(
        deserializer: De,
    ) -> std::result::Result<[usize; D], De::Error> {
        let values = Vec::<usize>::deserialize(deserializer)?;
        let len = values.len();
        values
            .try_into()
            .map_err(|_| De::Error::invalid_length(len, &"one extent per axis"))
    }
}
