use proptest::prelude::*;
use warpinv_core::filter::FixedPointInverseDisplacementFieldFilter;
use warpinv_core::image::{GridGeometry, VectorField};
use warpinv_core::interpolation::{FieldSampler, VectorLinearInterpolator};
use warpinv_core::spatial::{Point2, Point3, Spacing2, Spacing3, Vector2, Vector3};

#[test]
fn test_bilinear_weights_off_centre() {
    // Single non-zero corner at index (1, 0); weight is fx * (1 - fy).
    let geometry = GridGeometry::<2>::with_size([2, 2]);
    let mut field = VectorField::<f64, 2>::zeros(geometry);
    field.set(&[1, 0], Vector2::new(1.0, 2.0)).unwrap();
    let sampler = VectorLinearInterpolator::new(&field);

    let value = sampler.evaluate(&Point2::new(0.25, 0.75));
    let weight = 0.25 * (1.0 - 0.75);
    assert!((value - Vector2::new(weight, 2.0 * weight)).norm() < 1e-12);
}

#[test]
fn test_trilinear_weights_with_spacing() {
    let geometry = GridGeometry::new(Point3::new(1.0, 2.0, 3.0), Spacing3::new(2.0, 4.0, 0.5), [2, 2, 2]).unwrap();
    let mut field = VectorField::<f32, 3>::zeros(geometry);
    field.set(&[0, 1, 1], Vector3::new(4.0, 0.0, 0.0)).unwrap();
    let sampler = VectorLinearInterpolator::new(&field);

    // Continuous index (0.5, 0.25, 0.5): weight (1 - 0.5) * 0.25 * 0.5
    let value = sampler.evaluate(&Point3::new(2.0, 3.0, 3.25));
    assert!((value[0] - 4.0 * 0.0625).abs() < 1e-12, "got {}", value[0]);
}

proptest! {
    #[test]
    fn test_interpolation_reproduces_affine_fields(
        ox in -10.0f64..10.0, oy in -10.0f64..10.0,
        sx in 0.1f64..3.0, sy in 0.1f64..3.0,
        a in -2.0f64..2.0, b in -2.0f64..2.0, c in -2.0f64..2.0,
        u in 0.0f64..=1.0, v in 0.0f64..=1.0
    ) {
        let geometry = GridGeometry::new(Point2::new(ox, oy), Spacing2::new(sx, sy), [5, 4]).unwrap();
        let affine = |p: &Point2| Vector2::new(a * p[0] + b * p[1] + c, c * p[0] - a * p[1]);
        let field = VectorField::<f64, 2>::from_fn(geometry, affine);
        let sampler = VectorLinearInterpolator::new(&field);

        let point = Point2::new(ox + u * 4.0 * sx, oy + v * 3.0 * sy);
        prop_assume!(sampler.is_inside(&point));

        let error = (sampler.evaluate(&point) - affine(&point)).norm();
        prop_assert!(error < 1e-9, "error {} at {:?}", error, point);
    }

    #[test]
    fn test_is_inside_matches_sample_box(
        ox in -5.0f64..5.0, sx in 0.1f64..2.0,
        nx in 0usize..6, ny in 1usize..6,
        px in -10.0f64..20.0, py in -10.0f64..20.0
    ) {
        let geometry = GridGeometry::new(Point2::new(ox, 0.0), Spacing2::new(sx, 1.0), [nx, ny]).unwrap();
        let field = VectorField::<f32, 2>::zeros(geometry);
        let sampler = VectorLinearInterpolator::new(&field);

        let xi = (px - ox) / sx;
        let expected = nx > 0
            && xi >= 0.0 && xi <= (nx as f64 - 1.0)
            && py >= 0.0 && py <= (ny as f64 - 1.0);
        prop_assert_eq!(sampler.is_inside(&Point2::new(px, py)), expected);
    }

    #[test]
    fn test_zero_field_invariant(
        nx in 0usize..6, ny in 0usize..6,
        iterations in 0usize..6,
        ox in -3.0f64..3.0, sx in 0.2f64..2.0
    ) {
        let geometry = GridGeometry::new(Point2::new(ox, ox), Spacing2::new(sx, sx), [nx, ny]).unwrap();
        let forward = VectorField::<f64, 2>::zeros(geometry.clone());
        let inverse = FixedPointInverseDisplacementFieldFilter::new()
            .with_reference_geometry(&geometry)
            .with_number_of_iterations(iterations)
            .apply(&forward)
            .unwrap();

        prop_assert_eq!(inverse.len(), nx * ny);
        prop_assert_eq!(inverse.max_norm(), 0.0);
    }

    #[test]
    fn test_inversion_is_deterministic(
        amplitude in 0.0f64..0.9,
        frequency in 0.05f64..1.0,
        iterations in 0usize..10
    ) {
        let geometry = GridGeometry::<2>::with_size([7, 6]);
        let forward = VectorField::<f32, 2>::from_fn(geometry.clone(), |p| {
            Vector2::new(amplitude * (frequency * p[1]).sin(), amplitude * (frequency * p[0]).cos())
        });
        let filter = FixedPointInverseDisplacementFieldFilter::new()
            .with_reference_geometry(&geometry)
            .with_number_of_iterations(iterations);

        prop_assert_eq!(filter.apply(&forward).unwrap(), filter.apply(&forward).unwrap());
    }
}
