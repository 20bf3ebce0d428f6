//! Core utilities shared by the domain transform filter.
//!
//! This module provides the buffer-level building blocks:
//! - Channel layout validation
//! - Row-wise prefix sums of scalar fields
//! - Transposition into preallocated buffers of swapped dimensions
//! - Bit depth conversion helpers

use ndarray::{Array3, ArrayView2, ArrayView3, ArrayViewMut2, ArrayViewMut3};

use super::error::{FilterError, FilterResult};

/// Largest channel count the filter accepts (RGBA).
pub const MAX_CHANNELS: usize = 4;

/// Number of color channels for a supported layout.
///
/// Grayscale and RGB images filter every channel. RGBA images filter RGB
/// and leave alpha untouched.
pub fn color_channels(channels: usize) -> FilterResult<usize> {
    match channels {
        1 | 3 => Ok(channels),
        4 => Ok(3),
        other => Err(FilterError::UnsupportedChannels(other)),
    }
}

/// Validate an image shape `(height, width, channels)`.
///
/// # Returns
/// Number of color channels taking part in the filter.
pub fn validate_image_dim((height, width, channels): (usize, usize, usize)) -> FilterResult<usize> {
    if width == 0 || height == 0 {
        return Err(FilterError::EmptyImage { width, height });
    }
    color_channels(channels)
}

/// Replace every row of `field` by its running sum, left to right.
pub fn cumulative_sum_rows(mut field: ArrayViewMut2<f32>) {
    for mut row in field.rows_mut() {
        let mut acc = 0.0f32;
        for v in row.iter_mut() {
            acc += *v;
            *v = acc;
        }
    }
}

/// Transpose an `(H, W)` field into a preallocated `(W, H)` field.
pub fn transpose_field_into(src: ArrayView2<f32>, mut dst: ArrayViewMut2<f32>) -> FilterResult<()> {
    let (h, w) = src.dim();
    if dst.dim() != (w, h) {
        return Err(FilterError::ShapeMismatch {
            expected: vec![w, h],
            actual: dst.shape().to_vec(),
        });
    }
    dst.assign(&src.t());
    Ok(())
}

/// Transpose an `(H, W, C)` image into a preallocated `(W, H, C)` image.
///
/// Channels stay interleaved per pixel, so a row of the destination is a
/// column of the source.
pub fn transpose_image_into(src: ArrayView3<f32>, mut dst: ArrayViewMut3<f32>) -> FilterResult<()> {
    let (h, w, c) = src.dim();
    if dst.dim() != (w, h, c) {
        return Err(FilterError::ShapeMismatch {
            expected: vec![w, h, c],
            actual: dst.shape().to_vec(),
        });
    }
    dst.assign(&src.permuted_axes([1, 0, 2]));
    Ok(())
}

/// Convert u8 image (0-255) to f32 (0.0-1.0)
pub fn u8_to_f32(input: ArrayView3<u8>) -> Array3<f32> {
    input.mapv(|v| v as f32 / 255.0)
}

/// Convert f32 image (0.0-1.0) to u8 (0-255), rounding to nearest.
pub fn f32_to_u8(input: ArrayView3<f32>) -> Array3<u8> {
    input.mapv(|v| (v.clamp(0.0, 1.0) * 255.0).round() as u8)
}
