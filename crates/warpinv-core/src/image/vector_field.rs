//! Dense vector fields sampled on a grid.
//!
//! A `VectorField` stores one D-component vector per grid point in raster
//! order (axis 0 fastest) together with the grid geometry that places each
//! sample in physical space.

use std::fmt::Debug;
use burn::tensor::Element;
use nalgebra::SVector;
use crate::error::{FieldError, Result};
use crate::image::grid::GridGeometry;
use crate::spatial::{Index, Vector};

/// Scalar precision used to store field components.
///
/// Arithmetic on sampled values is carried out in `f64`; the storage type
/// only determines what is written back.
pub trait FieldScalar: nalgebra::Scalar + Element + Copy + Default + Debug + Send + Sync + 'static {
    fn from_f64(value: f64) -> Self;
    fn to_f64(self) -> f64;
}

impl FieldScalar for f32 {
    fn from_f64(value: f64) -> Self {
        value as f32
    }

    fn to_f64(self) -> f64 {
        self as f64
    }
}

impl FieldScalar for f64 {
    fn from_f64(value: f64) -> Self {
        value
    }

    fn to_f64(self) -> f64 {
        self
    }
}

/// Sampled displacement (or any vector) field.
///
/// # Type Parameters
/// * `T` - Storage precision (`f32` or `f64`)
/// * `D` - Spatial dimensionality; also the number of vector components
///
/// # Examples
/// ```rust
/// use warpinv_core::image::{GridGeometry, VectorField};
/// use warpinv_core::spatial::Vector2;
///
/// let geometry = GridGeometry::<2>::with_size([4, 4]);
/// let field = VectorField::<f32, 2>::filled(geometry, Vector2::new(0.5, 0.0));
/// assert_eq!(field.len(), 16);
/// assert_eq!(field.get(&[3, 3]).unwrap(), Vector2::new(0.5, 0.0));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct VectorField<T: FieldScalar, const D: usize> {
    geometry: GridGeometry<D>,
    data: Vec<SVector<T, D>>,
}

impl<T: FieldScalar, const D: usize> VectorField<T, D> {
    /// Field of zero vectors over `geometry`.
    pub fn zeros(geometry: GridGeometry<D>) -> Self {
        let data = vec![SVector::from_element(T::default()); geometry.number_of_points()];
        Self { geometry, data }
    }

    /// Field with the same vector at every sample.
    pub fn filled(geometry: GridGeometry<D>, value: Vector<D>) -> Self {
        let value = value.map(T::from_f64);
        Self {
            data: vec![value; geometry.number_of_points()],
            geometry,
        }
    }

    /// Field built by evaluating `f` at the physical point of every sample.
    pub fn from_fn<F>(geometry: GridGeometry<D>, mut f: F) -> Self
    where
        F: FnMut(&crate::spatial::Point<D>) -> Vector<D>,
    {
        let data = geometry
            .indices()
            .map(|index| f(&geometry.index_to_physical_point(&index)).map(T::from_f64))
            .collect();
        Self { geometry, data }
    }

    /// Wrap raster-ordered vectors.
    ///
    /// # Errors
    /// `BufferLength` when `data` does not hold exactly one vector per grid point.
    pub fn from_vectors(geometry: GridGeometry<D>, data: Vec<SVector<T, D>>) -> Result<Self> {
        let expected = geometry.number_of_points();
        if data.len() != expected {
            return Err(FieldError::buffer_length(expected, data.len()));
        }
        Ok(Self { geometry, data })
    }

    /// Build from an interleaved component buffer `[v0.x, v0.y, v1.x, ...]`.
    ///
    /// # Errors
    /// `DimensionMismatch` when `components` differs from `D`, `BufferLength`
    /// when the buffer does not cover the grid.
    pub fn from_interleaved(
        geometry: GridGeometry<D>,
        components: usize,
        values: &[T],
    ) -> Result<Self> {
        if components != D {
            return Err(FieldError::dimension_mismatch(D, components));
        }
        let expected = geometry.number_of_points() * D;
        if values.len() != expected {
            return Err(FieldError::buffer_length(expected, values.len()));
        }
        let data = values
            .chunks_exact(D)
            .map(SVector::<T, D>::from_column_slice)
            .collect();
        Ok(Self { geometry, data })
    }

    /// Interleaved copy of the components, the inverse of [`from_interleaved`](Self::from_interleaved).
    pub fn to_interleaved(&self) -> Vec<T> {
        self.data.iter().flat_map(|v| v.iter().copied()).collect()
    }

    pub fn geometry(&self) -> &GridGeometry<D> {
        &self.geometry
    }

    /// Number of stored vectors.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Raster-ordered samples.
    pub fn as_slice(&self) -> &[SVector<T, D>] {
        &self.data
    }

    /// Sample at a discrete index, widened to `f64`.
    pub fn get(&self, index: &Index<D>) -> Result<Vector<D>> {
        self.check_index(index)?;
        Ok(self.at_offset(self.geometry.linear_offset(index)))
    }

    /// Overwrite the sample at a discrete index.
    pub fn set(&mut self, index: &Index<D>, value: Vector<D>) -> Result<()> {
        self.check_index(index)?;
        let offset = self.geometry.linear_offset(index);
        self.set_offset(offset, value);
        Ok(())
    }

    /// Sample at a raster offset. Panics if `offset >= len()`.
    #[inline]
    pub fn at_offset(&self, offset: usize) -> Vector<D> {
        self.data[offset].map(FieldScalar::to_f64)
    }

    /// Overwrite the sample at a raster offset. Panics if `offset >= len()`.
    #[inline]
    pub fn set_offset(&mut self, offset: usize, value: Vector<D>) {
        self.data[offset] = value.map(T::from_f64);
    }

    /// Largest Euclidean norm over all samples (zero for an empty field).
    pub fn max_norm(&self) -> f64 {
        (0..self.len())
            .map(|offset| self.at_offset(offset).norm())
            .fold(0.0, f64::max)
    }

    /// Consume the field, returning its geometry and samples.
    pub fn into_parts(self) -> (GridGeometry<D>, Vec<SVector<T, D>>) {
        (self.geometry, self.data)
    }

    fn check_index(&self, index: &Index<D>) -> Result<()> {
        if self.geometry.contains_index(index) {
            Ok(())
        } else {
            Err(FieldError::IndexOutOfBounds {
                index: index.to_vec(),
                size: self.geometry.size().to_vec(),
            })
        }
    }
}
