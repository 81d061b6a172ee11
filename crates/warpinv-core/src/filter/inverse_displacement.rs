//! Fixed-point inverse displacement field filter.
//!
//! Given a forward field `F` mapping domain A into B, the filter computes a
//! field `G` sampled on an output grid such that `G(x) ≈ -F(x + G(x))`.
//! Starting from `G = 0`, every sweep visits the output grid in raster order
//! and replaces `G(x)` with `-F(x + G(x))` wherever `x + G(x)` falls inside
//! the input domain. Points mapping outside keep their current value.
//!
//! The run always performs `number_of_iterations + 1` sweeps. There is no
//! convergence test.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use serde::{Deserialize, Serialize};
use crate::error::{FieldError, Result};
use crate::image::grid::{extent_serde, GridGeometry};
use crate::image::vector_field::{FieldScalar, VectorField};
use crate::interpolation::{FieldSampler, VectorLinearInterpolator};
use crate::progress::{SweepCallback, SweepInfo};
use crate::spatial::{Index, Point, Spacing};

/// Number of iterations used when none is configured.
pub const DEFAULT_NUMBER_OF_ITERATIONS: usize = 5;

/// Output geometry and iteration budget of an inversion.
///
/// Missing fields take the defaults: empty size, unit spacing, zero origin
/// and five iterations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InverseDisplacementConfig<const D: usize> {
    /// Output grid extent.
    #[serde(with = "extent_serde", default = "default_size")]
    pub size: Index<D>,
    /// Output grid spacing.
    #[serde(default = "default_spacing")]
    pub output_spacing: Spacing<D>,
    /// Output grid origin.
    #[serde(default = "Point::origin")]
    pub output_origin: Point<D>,
    /// Fixed-point iterations; the run performs one more sweep than this.
    #[serde(default = "default_iterations")]
    pub number_of_iterations: usize,
}

fn default_size<const D: usize>() -> Index<D> {
    [0; D]
}

fn default_spacing<const D: usize>() -> Spacing<D> {
    Spacing::repeat(1.0)
}

fn default_iterations() -> usize {
    DEFAULT_NUMBER_OF_ITERATIONS
}

impl<const D: usize> Default for InverseDisplacementConfig<D> {
    fn default() -> Self {
        Self {
            size: default_size(),
            output_spacing: default_spacing(),
            output_origin: Point::origin(),
            number_of_iterations: default_iterations(),
        }
    }
}

impl<const D: usize> InverseDisplacementConfig<D> {
    /// Validated output grid geometry.
    pub fn output_geometry(&self) -> Result<GridGeometry<D>> {
        GridGeometry::new(self.output_origin, self.output_spacing, self.size)
    }
}

/// Fixed-point inverse displacement field filter.
///
/// Input and output share the dimensionality `D` by construction; fields of
/// other dimensionality must be converted (and are checked) at the tensor or
/// buffer boundary.
///
/// # Type Parameters
/// * `T` - Storage precision of input and output fields
/// * `D` - The spatial dimensionality
///
/// # Examples
/// ```rust
/// use warpinv_core::filter::FixedPointInverseDisplacementFieldFilter;
/// use warpinv_core::image::{GridGeometry, VectorField};
/// use warpinv_core::spatial::Vector2;
///
/// let forward = VectorField::<f32, 2>::filled(GridGeometry::with_size([4, 4]), Vector2::new(0.5, 0.0));
/// let inverse = FixedPointInverseDisplacementFieldFilter::new()
///     .with_reference_geometry(forward.geometry())
///     .with_number_of_iterations(5)
///     .apply(&forward)
///     .unwrap();
/// assert_eq!(inverse.get(&[1, 1]).unwrap(), Vector2::new(-0.5, 0.0));
/// ```
pub struct FixedPointInverseDisplacementFieldFilter<'a, T: FieldScalar, const D: usize> {
    config: InverseDisplacementConfig<D>,
    input: Option<&'a VectorField<T, D>>,
    output: Option<VectorField<T, D>>,
    callbacks: Vec<Arc<dyn SweepCallback>>,
}

impl<'a, T: FieldScalar, const D: usize> FixedPointInverseDisplacementFieldFilter<'a, T, D> {
    /// Create a filter with the default configuration.
    pub fn new() -> Self {
        Self::from_config(InverseDisplacementConfig::default())
    }

    /// Create a filter from an existing configuration.
    pub fn from_config(config: InverseDisplacementConfig<D>) -> Self {
        Self {
            config,
            input: None,
            output: None,
            callbacks: Vec::new(),
        }
    }

    /// Current configuration.
    pub fn config(&self) -> &InverseDisplacementConfig<D> {
        &self.config
    }

    /// Set the output grid extent.
    pub fn with_size(mut self, size: Index<D>) -> Self {
        self.set_size(size);
        self
    }

    /// Set the output grid spacing.
    pub fn with_output_spacing(mut self, spacing: Spacing<D>) -> Self {
        self.set_output_spacing(spacing);
        self
    }

    /// Set the output grid origin.
    pub fn with_output_origin(mut self, origin: Point<D>) -> Self {
        self.set_output_origin(origin);
        self
    }

    /// Set the number of fixed-point iterations.
    pub fn with_number_of_iterations(mut self, iterations: usize) -> Self {
        self.set_number_of_iterations(iterations);
        self
    }

    /// Copy size, spacing and origin from a reference grid.
    ///
    /// Typically the input field's own geometry.
    pub fn with_reference_geometry(mut self, reference: &GridGeometry<D>) -> Self {
        self.set_reference_geometry(reference);
        self
    }

    /// Set the input field.
    pub fn with_input(mut self, input: &'a VectorField<T, D>) -> Self {
        self.set_input(input);
        self
    }

    /// Register a sweep observer.
    pub fn with_callback(mut self, callback: Arc<dyn SweepCallback>) -> Self {
        self.add_callback(callback);
        self
    }

    pub fn set_size(&mut self, size: Index<D>) {
        self.config.size = size;
        self.output = None;
    }

    pub fn size(&self) -> &Index<D> {
        &self.config.size
    }

    pub fn set_output_spacing(&mut self, spacing: Spacing<D>) {
        self.config.output_spacing = spacing;
        self.output = None;
    }

    /// Set the output spacing from a slice with one value per axis.
    pub fn set_output_spacing_from_slice(&mut self, values: &[f64]) -> Result<()> {
        let spacing = Spacing::from_column_slice(check_axes::<D>(values)?);
        self.set_output_spacing(spacing);
        Ok(())
    }

    pub fn output_spacing(&self) -> &Spacing<D> {
        &self.config.output_spacing
    }

    pub fn set_output_origin(&mut self, origin: Point<D>) {
        self.config.output_origin = origin;
        self.output = None;
    }

    /// Set the output origin from a slice with one value per axis.
    pub fn set_output_origin_from_slice(&mut self, values: &[f64]) -> Result<()> {
        let origin = Point::from(Spacing::from_column_slice(check_axes::<D>(values)?));
        self.set_output_origin(origin);
        Ok(())
    }

    pub fn output_origin(&self) -> &Point<D> {
        &self.config.output_origin
    }

    pub fn set_number_of_iterations(&mut self, iterations: usize) {
        self.config.number_of_iterations = iterations;
        self.output = None;
    }

    pub fn number_of_iterations(&self) -> usize {
        self.config.number_of_iterations
    }

    pub fn set_reference_geometry(&mut self, reference: &GridGeometry<D>) {
        self.config.size = *reference.size();
        self.config.output_spacing = *reference.spacing();
        self.config.output_origin = *reference.origin();
        self.output = None;
    }

    pub fn set_input(&mut self, input: &'a VectorField<T, D>) {
        self.input = Some(input);
        self.output = None;
    }

    pub fn input(&self) -> Option<&'a VectorField<T, D>> {
        self.input
    }

    pub fn add_callback(&mut self, callback: Arc<dyn SweepCallback>) {
        self.callbacks.push(callback);
    }

    /// Validated output grid geometry.
    pub fn output_geometry(&self) -> Result<GridGeometry<D>> {
        self.config.output_geometry()
    }

    /// Invert the configured input and keep the result as the filter output.
    ///
    /// # Errors
    /// `MissingInput` if no input was set, or any configuration error.
    pub fn update(&mut self) -> Result<&VectorField<T, D>> {
        let input = self.input.ok_or(FieldError::MissingInput)?;
        let result = self.apply(input)?;
        Ok(&*self.output.insert(result))
    }

    /// Result of the last [`update`](Self::update), if still current.
    pub fn output(&self) -> Option<&VectorField<T, D>> {
        self.output.as_ref()
    }

    /// Move the last result out of the filter.
    pub fn take_output(&mut self) -> Option<VectorField<T, D>> {
        self.output.take()
    }

    /// Invert `input` using multilinear interpolation.
    pub fn apply(&self, input: &VectorField<T, D>) -> Result<VectorField<T, D>> {
        input.geometry().validate()?;
        self.apply_with_sampler(&VectorLinearInterpolator::new(input))
    }

    /// Invert the field represented by `sampler`.
    ///
    /// The configuration is validated before the first sweep; a run that
    /// starts always completes every sweep.
    pub fn apply_with_sampler<S: FieldSampler<D>>(&self, sampler: &S) -> Result<VectorField<T, D>> {
        let geometry = self.output_geometry()?;
        let mut estimate = VectorField::<T, D>::zeros(geometry.clone());

        let points = estimate.len();
        let total_sweeps = self.config.number_of_iterations.saturating_add(1);
        if points == 0 {
            tracing::warn!("Output grid {:?} has no points; result is empty", geometry.size());
        }
        for callback in &self.callbacks {
            callback.on_start(total_sweeps, points);
        }

        let start = Instant::now();
        let mut last = None;
        for sweep in 0..=self.config.number_of_iterations {
            let mut updated_points = 0;
            let mut max_update = 0.0f64;

            // In place: offsets already visited in this sweep hold new values.
            for (offset, index) in geometry.indices().enumerate() {
                let point = geometry.index_to_physical_point(&index);
                let current = estimate.at_offset(offset);
                let mapped = point + current;

                if sampler.is_inside(&mapped) {
                    let next = -sampler.evaluate(&mapped);
                    estimate.set_offset(offset, next);
                    max_update = max_update.max((next - current).norm());
                    updated_points += 1;
                }
            }

            let info = SweepInfo {
                sweep,
                total_sweeps,
                updated_points,
                frozen_points: points - updated_points,
                max_update,
                elapsed: start.elapsed(),
            };
            tracing::debug!(
                "Sweep {}/{}: updated {}, frozen {}, max update {:.3e}",
                sweep + 1,
                total_sweeps,
                info.updated_points,
                info.frozen_points,
                info.max_update
            );
            for callback in &self.callbacks {
                callback.on_sweep(&info);
            }
            last = Some(info);
        }

        if let Some(info) = &last {
            for callback in &self.callbacks {
                callback.on_complete(info);
            }
        }
        tracing::info!(
            "Fixed-point inversion: {} sweeps over {} points in {:.3}s",
            total_sweeps,
            points,
            start.elapsed().as_secs_f64()
        );

        Ok(estimate)
    }
}

impl<T: FieldScalar, const D: usize> Default for FixedPointInverseDisplacementFieldFilter<'_, T, D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: FieldScalar, const D: usize> fmt::Debug for FixedPointInverseDisplacementFieldFilter<'_, T, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FixedPointInverseDisplacementFieldFilter")
            .field("config", &self.config)
            .field("has_input", &self.input.is_some())
            .field("has_output", &self.output.is_some())
            .field("callbacks", &self.callbacks.len())
            .finish()
    }
}

impl<T: FieldScalar, const D: usize> fmt::Display for FixedPointInverseDisplacementFieldFilter<'_, T, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "FixedPointInverseDisplacementFieldFilter ({}D)", D)?;
        writeln!(f, "  Size: {:?}", self.config.size)?;
        writeln!(f, "  Output spacing: {:?}", self.config.output_spacing.as_slice())?;
        writeln!(f, "  Output origin: {:?}", self.config.output_origin.coords.as_slice())?;
        write!(f, "  Number of iterations: {}", self.config.number_of_iterations)
    }
}

fn check_axes<const D: usize>(values: &[f64]) -> Result<&[f64]> {
    if values.len() == D {
        Ok(values)
    } else {
        Err(FieldError::dimension_mismatch(D, values.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spatial::{Point2, Spacing2, Vector2};

    #[test]
    fn test_default_configuration() {
        let filter = FixedPointInverseDisplacementFieldFilter::<f32, 3>::new();
        assert_eq!(filter.number_of_iterations(), 5);
        assert_eq!(filter.size(), &[0, 0, 0]);
        assert_eq!(filter.output_spacing(), &Spacing::<3>::repeat(1.0));
        assert_eq!(filter.output_origin(), &Point::<3>::origin());
        assert!(filter.input().is_none());
        assert!(filter.output().is_none());
    }

    #[test]
    fn test_slice_setters() {
        let mut filter = FixedPointInverseDisplacementFieldFilter::<f64, 2>::new();
        filter.set_output_spacing_from_slice(&[0.5, 2.0]).unwrap();
        filter.set_output_origin_from_slice(&[-1.0, 3.0]).unwrap();
        assert_eq!(filter.output_spacing(), &Spacing2::new(0.5, 2.0));
        assert_eq!(filter.output_origin(), &Point2::new(-1.0, 3.0));

        let err = filter.set_output_spacing_from_slice(&[1.0, 1.0, 1.0]).unwrap_err();
        assert_eq!(err, FieldError::dimension_mismatch(2, 3));
        assert_eq!(filter.output_spacing(), &Spacing2::new(0.5, 2.0));
    }

    #[test]
    fn test_update_without_input() {
        let mut filter = FixedPointInverseDisplacementFieldFilter::<f32, 2>::new().with_size([4, 4]);
        assert_eq!(filter.update().unwrap_err(), FieldError::MissingInput);
    }

    #[test]
    fn test_invalid_output_spacing_is_rejected() {
        let input = VectorField::<f32, 2>::zeros(GridGeometry::with_size([4, 4]));
        let filter = FixedPointInverseDisplacementFieldFilter::new()
            .with_size([4, 4])
            .with_output_spacing(Spacing2::new(1.0, -2.0));
        let err = filter.apply(&input).unwrap_err();
        assert_eq!(err, FieldError::InvalidSpacing { axis: 1, value: -2.0 });
    }

    #[test]
    fn test_update_stores_output_and_setters_invalidate() {
        let input = VectorField::<f64, 2>::filled(GridGeometry::with_size([4, 4]), Vector2::new(0.5, 0.0));
        let mut filter = FixedPointInverseDisplacementFieldFilter::new()
            .with_reference_geometry(input.geometry())
            .with_input(&input);

        let len = filter.update().unwrap().len();
        assert_eq!(len, 16);
        assert!(filter.output().is_some());

        filter.set_number_of_iterations(2);
        assert!(filter.output().is_none());

        filter.update().unwrap();
        let output = filter.take_output().unwrap();
        assert_eq!(output.geometry(), input.geometry());
        assert!(filter.output().is_none());
    }

    #[test]
    fn test_config_serde_defaults() {
        let config: InverseDisplacementConfig<2> = serde_json::from_str(r#"{"size":[8,4]}"#).unwrap();
        assert_eq!(config.size, [8, 4]);
        assert_eq!(config.number_of_iterations, DEFAULT_NUMBER_OF_ITERATIONS);
        assert_eq!(config.output_spacing, Spacing2::repeat(1.0));

        assert_eq!(config.output_origin, Point2::origin());

        let empty: InverseDisplacementConfig<3> = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, InverseDisplacementConfig::default());

        let json = serde_json::to_string(&config).unwrap();
        let back: InverseDisplacementConfig<2> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_display_lists_configuration() {
        let filter = FixedPointInverseDisplacementFieldFilter::<f32, 2>::new()
            .with_size([3, 2])
            .with_number_of_iterations(20);
        let text = filter.to_string();
        assert!(text.contains("Size: [3, 2]"));
        assert!(text.contains("Number of iterations: 20"));
    }
}
