//! Error type shared by the domain transform filter modules.

/// Precondition violations reported by the filter entry points.
#[derive(thiserror::Error, Debug)]
pub enum FilterError {
    /// The image has no pixels to filter.
    #[error("Image must be non-empty, got {width}x{height}")]
    EmptyImage { width: usize, height: usize },

    /// Only grayscale, RGB and RGBA layouts are supported.
    #[error("Unsupported channel count {0}, expected 1, 3 or 4")]
    UnsupportedChannels(usize),

    /// A sigma parameter is zero, negative or not finite.
    #[error("{name} must be finite and positive, got {value}")]
    InvalidSigma { name: &'static str, value: f32 },

    /// The box filter radius is zero, negative or not finite.
    #[error("Box filter radius must be finite and positive, got {0}")]
    InvalidRadius(f32),

    /// A buffer does not have the shape required by the operation.
    #[error("Shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    /// A flat buffer could not be reshaped into an image.
    #[error("Invalid shape: {0}")]
    Shape(#[from] ndarray::ShapeError),
}

/// Result alias used across the filter modules.
pub type FilterResult<T> = Result<T, FilterError>;
