//! Edge-preserving smoothing with the domain transform.
//!
//! Distance fields are built once per call. Each of the `N` iterations then
//! runs the transformed-domain box filter along rows, transposes the image,
//! filters again with the transposed vertical field, and transposes back.
//!
//! The box radius shrinks geometrically so that the variances of the `N`
//! passes add up to `sigma_s^2`:
//!
//! ```text
//! sigma_i = sigma_s * sqrt(3) * 2^(N - (i + 1)) / sqrt(4^N - 1)
//! r_i     = sqrt(3) * sigma_i
//! ```
//!
//! ## Supported Formats
//!
//! - **Grayscale**: (height, width, 1) - filters the single channel
//! - **RGB**: (height, width, 3) - filters all 3 channels
//! - **RGBA**: (height, width, 4) - filters RGB, preserves alpha
//!
//! ## Bit Depth Support
//!
//! - **u8 (8-bit)**: Values 0-255, mapped to 0.0-1.0 before filtering, so
//!   `sigma_r` is always expressed on the 0.0-1.0 scale
//! - **f32 (float)**: Any real values, filtered as given

use ndarray::{Array3, ArrayView3, ArrayViewMut3};

use super::box_filter::{box_filter_transformed_domain, RowInterleave};
use super::core::{f32_to_u8, transpose_image_into, u8_to_f32, validate_image_dim};
use super::domain_transform::DomainTransform;
use super::error::{FilterError, FilterResult};
use super::profiling::{FilterObserver, FilterPhase, NoopObserver};

/// Parameters of the domain transform filter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DomainTransformParams {
    /// Spatial standard deviation in pixels.
    pub sigma_s: f32,
    /// Range standard deviation in color units.
    pub sigma_r: f32,
    /// Number of horizontal + vertical iterations. Zero leaves the image as is.
    pub iterations: u32,
    /// Row scheduling of the box filter.
    pub interleave: RowInterleave,
}

impl Default for DomainTransformParams {
    fn default() -> Self {
        DomainTransformParams {
            sigma_s: 60.0,
            sigma_r: 0.4,
            iterations: 3,
            interleave: RowInterleave::default(),
        }
    }
}

impl DomainTransformParams {
    pub fn new(sigma_s: f32, sigma_r: f32, iterations: u32) -> Self {
        DomainTransformParams {
            sigma_s,
            sigma_r,
            iterations,
            ..Default::default()
        }
    }

    pub fn with_iterations(mut self, iterations: u32) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn with_interleave(mut self, interleave: RowInterleave) -> Self {
        self.interleave = interleave;
        self
    }

    /// Gradient scale `sigma_s / sigma_r` used by the distance fields.
    pub fn ratio(&self) -> f32 {
        self.sigma_s / self.sigma_r
    }

    /// Check that both sigmas are finite and positive.
    pub fn validate(&self) -> FilterResult<()> {
        for (name, value) in [("sigma_s", self.sigma_s), ("sigma_r", self.sigma_r)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(FilterError::InvalidSigma { name, value });
            }
        }
        if !self.ratio().is_finite() {
            return Err(FilterError::InvalidSigma {
                name: "sigma_r",
                value: self.sigma_r,
            });
        }
        Ok(())
    }
}

/// Radius below which a box filter pass cannot change the image.
pub const MIN_BOX_RADIUS: f32 = 0.5;

/// Standard deviation of iteration `iteration` (0-based) out of `iterations`.
pub fn iteration_sigma(sigma_s: f32, iteration: u32, iterations: u32) -> f32 {
    // 2^(N-i-1) / sqrt(4^N - 1) == 2^-(i+1) / sqrt(1 - 4^-N), finite for any N
    let num = 2f64.powf(-(iteration as f64 + 1.0));
    let den = (1.0 - 4f64.powf(-(iterations as f64))).sqrt();
    (sigma_s as f64 * 3f64.sqrt() * num / den) as f32
}

/// Box filter radius for iteration `iteration` out of `iterations`.
pub fn box_radius(sigma_s: f32, iteration: u32, iterations: u32) -> f32 {
    (3f64.sqrt() * iteration_sigma(sigma_s, iteration, iterations) as f64) as f32
}

/// Box filter radii of all iterations, largest first.
pub fn box_radius_schedule(sigma_s: f32, iterations: u32) -> Vec<f32> {
    (0..iterations)
        .map(|i| box_radius(sigma_s, i, iterations))
        .collect()
}

/// Scratch buffers for one filter invocation.
///
/// A workspace may be kept by the caller and reused across images; buffers
/// are reallocated only when the image dimensions change.
#[derive(Debug, Clone)]
pub struct DomainTransformWorkspace {
    transform: DomainTransform,
    /// Transposed image, (width, height, channels).
    transposed: Array3<f32>,
}

impl Default for DomainTransformWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

impl DomainTransformWorkspace {
    pub fn new() -> Self {
        DomainTransformWorkspace {
            transform: DomainTransform::new(),
            transposed: Array3::zeros((0, 0, 0)),
        }
    }

    /// Distance fields of the last filtered image.
    pub fn transform(&self) -> &DomainTransform {
        &self.transform
    }

    /// Free all scratch storage.
    pub fn release(&mut self) {
        self.transform.release();
        self.transposed = Array3::zeros((0, 0, 0));
    }

    fn prepare(&mut self, image: ArrayView3<f32>, ratio: f32) -> FilterResult<()> {
        let (height, width, channels) = image.dim();
        self.transform.rebuild(image, ratio)?;
        if self.transposed.dim() != (width, height, channels) {
            self.transposed = Array3::zeros((width, height, channels));
        }
        Ok(())
    }
}

/// Run the domain transform filter in place with an explicit workspace and
/// observer.
///
/// # Arguments
/// * `image` - Image with 1, 3, or 4 channels (height, width, channels)
/// * `params` - Filter parameters
/// * `workspace` - Scratch buffers, reused when shapes match
/// * `observer` - Receives phase start/end markers
///
/// Iterations whose box radius is below [`MIN_BOX_RADIUS`] are skipped, so
/// the observer may see fewer than `2 * iterations` box filter phases.
pub fn filter_with<O: FilterObserver + ?Sized>(
    mut image: ArrayViewMut3<f32>,
    params: &DomainTransformParams,
    workspace: &mut DomainTransformWorkspace,
    observer: &mut O,
) -> FilterResult<()> {
    params.validate()?;
    validate_image_dim(image.dim())?;

    observer.phase_start(FilterPhase::Filter);

    if params.iterations == 0 {
        log::debug!("domain transform with zero iterations, image left unchanged");
        observer.phase_end(FilterPhase::Filter);
        return Ok(());
    }

    observer.phase_start(FilterPhase::DomainTransform);
    workspace.prepare(image.view(), params.ratio())?;
    observer.phase_end(FilterPhase::DomainTransform);

    let DomainTransformWorkspace {
        transform,
        transposed,
    } = workspace;

    for i in 0..params.iterations {
        let radius = box_radius(params.sigma_s, i, params.iterations);
        log::trace!("iteration {}/{}: box radius {}", i + 1, params.iterations, radius);

        // Distance steps are at least 1, so a narrower window holds only its
        // center pixel and the pass leaves the image unchanged. Radii only
        // shrink, so the same holds for every later iteration.
        if radius < MIN_BOX_RADIUS {
            log::debug!("box radius {} below {} at iteration {}, stopping", radius, MIN_BOX_RADIUS, i + 1);
            break;
        }

        observer.phase_start(FilterPhase::BoxFilter);
        box_filter_transformed_domain(image.view_mut(), transform.horizontal(), radius, params.interleave)?;
        observer.phase_end(FilterPhase::BoxFilter);

        transpose_image_into(image.view(), transposed.view_mut())?;

        observer.phase_start(FilterPhase::BoxFilter);
        box_filter_transformed_domain(
            transposed.view_mut(),
            transform.vertical_transposed(),
            radius,
            params.interleave,
        )?;
        observer.phase_end(FilterPhase::BoxFilter);

        transpose_image_into(transposed.view(), image.view_mut())?;
    }

    observer.phase_end(FilterPhase::Filter);
    Ok(())
}

/// Run the domain transform filter in place.
///
/// Scratch buffers are allocated for this call and freed when it returns.
pub fn domain_transform_filter(image: ArrayViewMut3<f32>, params: &DomainTransformParams) -> FilterResult<()> {
    let mut workspace = DomainTransformWorkspace::new();
    filter_with(image, params, &mut workspace, &mut NoopObserver)
}

/// Domain transform filter - f32 version.
///
/// # Arguments
/// * `input` - Image with 1, 3, or 4 channels (height, width, channels)
/// * `sigma_s` - Spatial standard deviation in pixels
/// * `sigma_r` - Range standard deviation in color units
/// * `iterations` - Number of iterations (3 is usually enough)
///
/// # Returns
/// Filtered image with same shape
pub fn domain_transform_f32(
    input: ArrayView3<f32>,
    sigma_s: f32,
    sigma_r: f32,
    iterations: u32,
) -> FilterResult<Array3<f32>> {
    let mut output = input.to_owned();
    domain_transform_filter(output.view_mut(), &DomainTransformParams::new(sigma_s, sigma_r, iterations))?;
    Ok(output)
}

/// Domain transform filter - u8 version.
///
/// # Arguments
/// * `input` - Image with 1, 3, or 4 channels (height, width, channels)
/// * `sigma_s` - Spatial standard deviation in pixels
/// * `sigma_r` - Range standard deviation on the 0.0-1.0 scale
/// * `iterations` - Number of iterations
///
/// # Returns
/// Filtered image with same shape
pub fn domain_transform_u8(
    input: ArrayView3<u8>,
    sigma_s: f32,
    sigma_r: f32,
    iterations: u32,
) -> FilterResult<Array3<u8>> {
    let mut work = u8_to_f32(input);
    domain_transform_filter(work.view_mut(), &DomainTransformParams::new(sigma_s, sigma_r, iterations))?;
    Ok(f32_to_u8(work.view()))
}
