//! Domain transform distance fields.
//!
//! Each pixel gets a horizontal and a vertical "distance" to its predecessor:
//!
//! ```text
//! dIdx[y, x] = 1 + s * sum_c |I[y, x, c] - I[y, x-1, c]|     (x > 0)
//! dIdy[y, x] = 1 + s * sum_c |I[y, x, c] - I[y-1, x, c]|     (y > 0)
//! ```
//!
//! with `s = sigma_s / sigma_r`. The first column of `dIdx` and the first row
//! of `dIdy` are exactly `1`. Prefix-summing the fields along their axis turns
//! them into a monotonic coordinate remapping in which the box filter runs.
//!
//! The vertical field is stored transposed, `(width, height)`, so that the
//! same row-oriented box filter serves both axes.

use ndarray::{Array2, ArrayView2, ArrayView3, ArrayViewMut2};

use super::core::{cumulative_sum_rows, transpose_field_into, validate_image_dim};
use super::error::{FilterError, FilterResult};

/// Sum of absolute differences over the first `channels` channels.
#[inline]
fn l1_step(image: &ArrayView3<f32>, a: [usize; 2], b: [usize; 2], channels: usize) -> f32 {
    (0..channels)
        .map(|c| (image[[a[0], a[1], c]] - image[[b[0], b[1], c]]).abs())
        .sum()
}

fn check_field(image_dim: (usize, usize), out: &ArrayViewMut2<f32>) -> FilterResult<()> {
    if out.dim() != image_dim {
        return Err(FilterError::ShapeMismatch {
            expected: vec![image_dim.0, image_dim.1],
            actual: out.shape().to_vec(),
        });
    }
    Ok(())
}

/// Fill `out` with the raw horizontal distances of `image`.
///
/// # Arguments
/// * `image` - Image with 1, 3, or 4 channels (height, width, channels)
/// * `ratio` - `sigma_s / sigma_r`
/// * `out` - Field of shape (height, width)
pub fn horizontal_distance_into(
    image: ArrayView3<f32>,
    ratio: f32,
    mut out: ArrayViewMut2<f32>,
) -> FilterResult<()> {
    let color = validate_image_dim(image.dim())?;
    let (height, width, _) = image.dim();
    check_field((height, width), &out)?;

    for y in 0..height {
        out[[y, 0]] = 1.0;
        for x in 1..width {
            out[[y, x]] = 1.0 + ratio * l1_step(&image, [y, x], [y, x - 1], color);
        }
    }

    Ok(())
}

/// Fill `out` with the raw vertical distances of `image`.
///
/// # Arguments
/// * `image` - Image with 1, 3, or 4 channels (height, width, channels)
/// * `ratio` - `sigma_s / sigma_r`
/// * `out` - Field of shape (height, width), not transposed
pub fn vertical_distance_into(
    image: ArrayView3<f32>,
    ratio: f32,
    mut out: ArrayViewMut2<f32>,
) -> FilterResult<()> {
    let color = validate_image_dim(image.dim())?;
    let (height, width, _) = image.dim();
    check_field((height, width), &out)?;

    out.row_mut(0).fill(1.0);
    for y in 1..height {
        for x in 0..width {
            out[[y, x]] = 1.0 + ratio * l1_step(&image, [y, x], [y - 1, x], color);
        }
    }

    Ok(())
}

/// Cumulative distance fields for one image.
///
/// Buffers are kept between [`DomainTransform::rebuild`] calls and only
/// reallocated when the image dimensions change.
#[derive(Debug, Clone)]
pub struct DomainTransform {
    /// Cumulative horizontal distances, (height, width).
    horizontal: Array2<f32>,
    /// Raw vertical distances, (height, width). Scratch for the transpose.
    vertical: Array2<f32>,
    /// Cumulative vertical distances, transposed to (width, height).
    vertical_t: Array2<f32>,
}

impl Default for DomainTransform {
    fn default() -> Self {
        Self::new()
    }
}

impl DomainTransform {
    /// Create an empty transform with no backing storage.
    pub fn new() -> Self {
        DomainTransform {
            horizontal: Array2::zeros((0, 0)),
            vertical: Array2::zeros((0, 0)),
            vertical_t: Array2::zeros((0, 0)),
        }
    }

    /// Build the cumulative fields for `image`.
    pub fn build(image: ArrayView3<f32>, ratio: f32) -> FilterResult<Self> {
        let mut transform = Self::new();
        transform.rebuild(image, ratio)?;
        Ok(transform)
    }

    /// Recompute the cumulative fields for `image`, reusing storage when
    /// the dimensions match the previous build.
    pub fn rebuild(&mut self, image: ArrayView3<f32>, ratio: f32) -> FilterResult<()> {
        validate_image_dim(image.dim())?;
        let (height, width, _) = image.dim();

        if self.horizontal.dim() != (height, width) {
            self.horizontal = Array2::zeros((height, width));
            self.vertical = Array2::zeros((height, width));
            self.vertical_t = Array2::zeros((width, height));
        }

        horizontal_distance_into(image, ratio, self.horizontal.view_mut())?;
        vertical_distance_into(image, ratio, self.vertical.view_mut())?;

        cumulative_sum_rows(self.horizontal.view_mut());
        transpose_field_into(self.vertical.view(), self.vertical_t.view_mut())?;
        cumulative_sum_rows(self.vertical_t.view_mut());

        Ok(())
    }

    /// Cumulative horizontal field, (height, width).
    pub fn horizontal(&self) -> ArrayView2<'_, f32> {
        self.horizontal.view()
    }

    /// Cumulative vertical field in transposed layout, (width, height).
    pub fn vertical_transposed(&self) -> ArrayView2<'_, f32> {
        self.vertical_t.view()
    }

    /// Free all backing storage. The transform can be rebuilt afterwards.
    pub fn release(&mut self) {
        *self = Self::new();
    }
}
