//! Filter modules for domain transform edge-preserving smoothing.
//!
//! ## Supported Formats
//!
//! | Format | Shape | Type | Description |
//! |--------|-------|------|-------------|
//! | Grayscale8 | (H, W, 1) | u8 | Single luminance channel, 0-255 |
//! | Grayscale float | (H, W, 1) | f32 | Single luminance channel, any real value |
//! | RGB8 | (H, W, 3) | u8 | Red, green, blue, 0-255 |
//! | RGB float | (H, W, 3) | f32 | Red, green, blue, any real value |
//! | RGBA8 | (H, W, 4) | u8 | RGB + alpha, 0-255 |
//! | RGBA float | (H, W, 4) | f32 | RGB + alpha |
//!
//! Channel count is inferred from input array dimensions. Alpha never takes
//! part in the gradient and is always preserved.
//!
//! ## Pipeline
//!
//! - [`domain_transform`] - horizontal and vertical distance fields, prefix-summed
//! - [`box_filter`] - running box filter in the transformed domain, one row at a time
//! - [`edge_preserving`] - iteration schedule, transposes and entry points
//!
//! [`core`] holds the buffer utilities, [`profiling`] the phase observer.

pub mod core;
pub mod error;
pub mod profiling;
pub mod domain_transform;
pub mod box_filter;
pub mod edge_preserving;

pub use box_filter::RowInterleave;
pub use edge_preserving::{
    domain_transform_f32, domain_transform_filter, domain_transform_u8, filter_with,
    DomainTransformParams, DomainTransformWorkspace,
};
pub use error::{FilterError, FilterResult};
pub use profiling::{FilterObserver, FilterPhase, LogObserver, NoopObserver};
