//! WebAssembly exports for the domain transform filter.
//!
//! These functions are exposed to JavaScript via wasm-bindgen.
//!
//! ## Bit Depth Support
//!
//! The filter has two versions:
//! - **u8**: 8-bit per channel (0-255), standard for web/display
//! - **f32**: Float per channel, for HDR/linear workflows
//!
//! Both versions use identical Rust implementations.

use ndarray::Array3;
use wasm_bindgen::prelude::*;

use crate::filters::edge_preserving::{domain_transform_f32, domain_transform_u8};
use crate::filters::FilterError;

fn to_js_err(err: FilterError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

// ============================================================================
// Domain Transform - u8 (8-bit)
// ============================================================================

/// Edge-preserving smoothing of a u8 image.
///
/// # Arguments
/// * `data` - Flat array of pixel bytes (length = width * height * channels)
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
/// * `channels` - 1, 3 or 4
/// * `sigma_s` - Spatial standard deviation in pixels
/// * `sigma_r` - Range standard deviation on the 0.0-1.0 scale
/// * `iterations` - Number of iterations
///
/// # Returns
/// Flat array of filtered pixel bytes
#[wasm_bindgen]
pub fn domain_transform_wasm(
    data: &[u8],
    width: usize,
    height: usize,
    channels: usize,
    sigma_s: f32,
    sigma_r: f32,
    iterations: u32,
) -> Result<Vec<u8>, JsValue> {
    let input = Array3::from_shape_vec((height, width, channels), data.to_vec())
        .map_err(|e| to_js_err(e.into()))?;

    let result = domain_transform_u8(input.view(), sigma_s, sigma_r, iterations).map_err(to_js_err)?;
    Ok(result.into_raw_vec_and_offset().0)
}

// ============================================================================
// Domain Transform - f32 (float)
// ============================================================================

/// Edge-preserving smoothing of an f32 image.
///
/// # Arguments
/// * `data` - Flat array of pixel floats (length = width * height * channels)
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
/// * `channels` - 1, 3 or 4
/// * `sigma_s` - Spatial standard deviation in pixels
/// * `sigma_r` - Range standard deviation in color units
/// * `iterations` - Number of iterations
///
/// # Returns
/// Flat array of filtered pixel floats
#[wasm_bindgen]
pub fn domain_transform_f32_wasm(
    data: &[f32],
    width: usize,
    height: usize,
    channels: usize,
    sigma_s: f32,
    sigma_r: f32,
    iterations: u32,
) -> Result<Vec<f32>, JsValue> {
    let input = Array3::from_shape_vec((height, width, channels), data.to_vec())
        .map_err(|e| to_js_err(e.into()))?;

    let result = domain_transform_f32(input.view(), sigma_s, sigma_r, iterations).map_err(to_js_err)?;
    Ok(result.into_raw_vec_and_offset().0)
}
