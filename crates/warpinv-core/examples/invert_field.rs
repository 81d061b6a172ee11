//! Invert a smooth synthetic displacement field.
//!
//! Usage:
//!   RUST_LOG=info cargo run --example invert_field

use std::sync::Arc;
use warpinv_core::filter::{inverse_consistency, FixedPointInverseDisplacementFieldFilter};
use warpinv_core::image::{GridGeometry, VectorField};
use warpinv_core::progress::LoggingSweepCallback;
use warpinv_core::spatial::{Point3, Spacing3, Vector3};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let geometry = GridGeometry::new(Point3::new(-16.0, -16.0, -8.0), Spacing3::new(1.0, 1.0, 2.0), [32, 32, 8])?;
    let forward = VectorField::<f32, 3>::from_fn(geometry.clone(), |p| {
        Vector3::new(
            1.5 + 0.4 * (0.2 * p[1]).sin(),
            0.3 * (0.15 * p[0]).cos(),
            0.1 * (0.1 * p[2]).sin(),
        )
    });

    let mut filter = FixedPointInverseDisplacementFieldFilter::new()
        .with_reference_geometry(&geometry)
        .with_number_of_iterations(20)
        .with_input(&forward)
        .with_callback(Arc::new(LoggingSweepCallback::new(5)));
    println!("{}", filter);

    filter.update()?;
    let inverse = filter
        .take_output()
        .ok_or_else(|| anyhow::anyhow!("filter produced no output"))?;

    let stats = inverse_consistency(&forward, &inverse)?;
    println!(
        "Residual over {} points (skipped {}): max {:.3e}, mean {:.3e}, rms {:.3e}",
        stats.evaluated_points, stats.skipped_points, stats.max, stats.mean, stats.rms
    );
    Ok(())
}
