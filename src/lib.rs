//! Domain Transform Rust Extensions
//!
//! Edge-preserving smoothing with the domain transform (normalized
//! convolution variant), with Python bindings via PyO3 and WASM bindings
//! for JavaScript.
//!
//! ## Image Format
//! Filters support multiple channel configurations:
//! - **Grayscale**: (height, width, 1) - single channel
//! - **RGB**: (height, width, 3) - 3 color channels
//! - **RGBA**: (height, width, 4) - 3 color channels + alpha
//!
//! Both bit depths are supported:
//! - `u8`: 8-bit per channel (0-255)
//! - `f32`: Float per channel (typically 0.0-1.0, not clamped)
//!
//! ## Algorithm
//! Color gradients define a per-pixel distance along every row and column.
//! Prefix sums of these distances remap each row onto a 1D domain in which a
//! plain box filter no longer averages across strong edges. Alternating
//! horizontal and vertical passes with a shrinking radius approximate a
//! recursive edge-aware blur.
//!
//! ```
//! use domain_transform_rust::filters::{domain_transform_filter, DomainTransformParams};
//! use ndarray::Array3;
//!
//! let mut image = Array3::<f32>::from_elem((32, 48, 3), 0.5);
//! let params = DomainTransformParams::new(20.0, 0.3, 3);
//! domain_transform_filter(image.view_mut(), &params).unwrap();
//! ```

pub mod filters;

#[cfg(feature = "wasm")]
pub mod wasm;

// Python bindings (only when python feature is enabled)
#[cfg(feature = "python")]
mod python {
    use numpy::{IntoPyArray, PyArray3, PyReadonlyArray3};
    use pyo3::exceptions::PyValueError;
    use pyo3::prelude::*;

    use crate::filters::edge_preserving::{domain_transform_f32 as dt_f32, domain_transform_u8 as dt_u8};
    use crate::filters::FilterError;

    fn to_py_err(err: FilterError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }

    // ========================================================================
    // Domain Transform Filter
    // ========================================================================

    /// Edge-preserving smoothing of a u8 image.
    ///
    /// # Arguments
    /// * `image` - Input image (1, 3, or 4 channels)
    /// * `sigma_s` - Spatial standard deviation in pixels (default: 60)
    /// * `sigma_r` - Range standard deviation on the 0.0-1.0 scale (default: 0.4)
    /// * `iterations` - Number of horizontal + vertical iterations (default: 3)
    #[pyfunction]
    #[pyo3(signature = (image, sigma_s=60.0, sigma_r=0.4, iterations=3))]
    pub fn domain_transform<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        sigma_s: f32,
        sigma_r: f32,
        iterations: u32,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        let result = dt_u8(image.as_array(), sigma_s, sigma_r, iterations).map_err(to_py_err)?;
        Ok(result.into_pyarray(py))
    }

    /// Edge-preserving smoothing of an f32 image.
    ///
    /// Values are not clamped.
    #[pyfunction]
    #[pyo3(signature = (image, sigma_s=60.0, sigma_r=0.4, iterations=3))]
    pub fn domain_transform_f32<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, f32>,
        sigma_s: f32,
        sigma_r: f32,
        iterations: u32,
    ) -> PyResult<Bound<'py, PyArray3<f32>>> {
        let result = dt_f32(image.as_array(), sigma_s, sigma_r, iterations).map_err(to_py_err)?;
        Ok(result.into_pyarray(py))
    }

    /// Domain transform Rust extension module
    #[pymodule]
    pub fn domain_transform_rust(m: &Bound<'_, PyModule>) -> PyResult<()> {
        m.add_function(wrap_pyfunction!(domain_transform, m)?)?;
        m.add_function(wrap_pyfunction!(domain_transform_f32, m)?)?;
        Ok(())
    }
}

#[cfg(feature = "python")]
pub use python::domain_transform_rust;
