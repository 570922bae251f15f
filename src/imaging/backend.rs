//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the two operations every backend must
//! support: identify (read dimensions) and render (draw a planned placement
//! onto a filled canvas and encode it).
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate.

use super::params::RenderParams;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Result of an identify operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// An encoded raster and its media type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedRaster {
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

/// Trait for image processing backends.
pub trait ImageBackend {
    /// Decode just enough of `source` to learn its dimensions.
    fn identify(&self, source: &[u8]) -> Result<Dimensions, BackendError>;

    /// Execute a planned render and encode the canvas.
    fn render(&self, source: &[u8], params: &RenderParams) -> Result<EncodedRaster, BackendError>;
}
