//! Conversion between vector fields and burn tensors.
//!
//! Tensors use the component-major layout of the displacement-field
//! transforms: `[2, H, W]` in 2D and `[3, D, H, W]` in 3D, where the last
//! tensor axis is grid axis 0.

use burn::tensor::backend::Backend;
use burn::tensor::{Tensor, TensorData};
use nalgebra::SVector;
use crate::error::{FieldError, Result};
use crate::image::grid::GridGeometry;
use crate::image::vector_field::{FieldScalar, VectorField};
use crate::spatial::{Point, Spacing};

impl<T: FieldScalar> VectorField<T, 2> {
    /// Build a 2D field from a `[2, H, W]` tensor.
    ///
    /// # Errors
    /// `DimensionMismatch` if the leading dimension is not 2, plus any
    /// geometry validation error.
    pub fn from_tensor<B: Backend>(
        tensor: Tensor<B, 3>,
        origin: Point<2>,
        spacing: Spacing<2>,
    ) -> Result<Self> {
        let dims = tensor.dims();
        from_component_planes(&dims, tensor.into_data(), origin, spacing)
    }

    /// Copy the field into a `[2, H, W]` tensor on `device`.
    pub fn to_tensor<B: Backend>(&self, device: &B::Device) -> Tensor<B, 3> {
        let [w, h] = *self.geometry().size();
        Tensor::from_data(self.component_planes::<B>(vec![2, h, w]), device)
    }
}

impl<T: FieldScalar> VectorField<T, 3> {
    /// Build a 3D field from a `[3, D, H, W]` tensor.
    ///
    /// # Errors
    /// `DimensionMismatch` if the leading dimension is not 3, plus any
    /// geometry validation error.
    pub fn from_tensor<B: Backend>(
        tensor: Tensor<B, 4>,
        origin: Point<3>,
        spacing: Spacing<3>,
    ) -> Result<Self> {
        let dims = tensor.dims();
        from_component_planes(&dims, tensor.into_data(), origin, spacing)
    }

    /// Copy the field into a `[3, D, H, W]` tensor on `device`.
    pub fn to_tensor<B: Backend>(&self, device: &B::Device) -> Tensor<B, 4> {
        let [w, h, d] = *self.geometry().size();
        Tensor::from_data(self.component_planes::<B>(vec![3, d, h, w]), device)
    }
}

impl<T: FieldScalar, const D: usize> VectorField<T, D> {
    fn component_planes<B: Backend>(&self, dims: Vec<usize>) -> TensorData {
        let n = self.len();
        let mut values = vec![T::default(); n * D];
        for (offset, vector) in self.as_slice().iter().enumerate() {
            for c in 0..D {
                values[c * n + offset] = vector[c];
            }
        }
        TensorData::new(values, dims).convert::<B::FloatElem>()
    }
}

fn from_component_planes<T: FieldScalar, const D: usize>(
    dims: &[usize],
    data: TensorData,
    origin: Point<D>,
    spacing: Spacing<D>,
) -> Result<VectorField<T, D>> {
    if dims.len() != D + 1 {
        return Err(FieldError::dimension_mismatch(D + 1, dims.len()));
    }
    if dims[0] != D {
        return Err(FieldError::dimension_mismatch(D, dims[0]));
    }

    // Tensor axes after the component axis run from grid axis D-1 down to 0.
    let mut size = [0; D];
    for axis in 0..D {
        size[axis] = dims[D - axis];
    }
    let geometry = GridGeometry::new(origin, spacing, size)?;

    let values = data
        .convert::<T>()
        .to_vec::<T>()
        .map_err(|e| FieldError::tensor_data(format!("{:?}", e)))?;
    let n = geometry.number_of_points();
    if values.len() != n * D {
        return Err(FieldError::buffer_length(n * D, values.len()));
    }

    let vectors = (0..n)
        .map(|offset| SVector::<T, D>::from_fn(|c, _| values[c * n + offset]))
        .collect();
    VectorField::from_vectors(geometry, vectors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::tensor::Shape;
    use burn_ndarray::NdArray;
    use crate::spatial::{Point2, Spacing2, Vector2};

    type TestBackend = NdArray<f32>;

    #[test]
    fn test_2d_layout_matches_component_planes() {
        let device = Default::default();
        // W = 3 (grid axis 0), H = 2 (grid axis 1)
        let data = TensorData::new(
            vec![0.0f32, 1.0, 2.0, 3.0, 4.0, 5.0, 10.0, 11.0, 12.0, 13.0, 14.0, 15.0],
            Shape::new([2, 2, 3]),
        );
        let tensor = Tensor::<TestBackend, 3>::from_data(data, &device);
        let field = VectorField::<f64, 2>::from_tensor(tensor, Point2::origin(), Spacing2::repeat(1.0)).unwrap();

        assert_eq!(field.geometry().size(), &[3, 2]);
        assert_eq!(field.get(&[2, 0]).unwrap(), Vector2::new(2.0, 12.0));
        assert_eq!(field.get(&[0, 1]).unwrap(), Vector2::new(3.0, 13.0));
    }

    #[test]
    fn test_wrong_component_count() {
        let device = Default::default();
        let tensor = Tensor::<TestBackend, 3>::zeros([3, 4, 4], &device);
        let err = VectorField::<f32, 2>::from_tensor(tensor, Point2::origin(), Spacing2::repeat(1.0)).unwrap_err();
        assert_eq!(err, FieldError::dimension_mismatch(2, 3));
    }
}
