//! High-level image operations.
//!
//! These functions combine calculations with backend execution. They take a
//! [`TransformParams`], compute the canvas and placement, and call the
//! backend.
//!
//! ## Degradation
//!
//! [`transform_data_url`] never fails: a source that cannot be parsed,
//! identified or rendered comes back unchanged. Callers store whatever it
//! returns.
//!
//! ## Re-applying a transform
//!
//! Feeding an output back through with [`CropParams::IDENTITY`](super::CropParams::IDENTITY)
//! and the same aspect and width maps every output pixel onto itself, so the
//! visible region is stable. The bytes are not: JPEG is lossy and each pass
//! re-quantises.

use super::backend::{BackendError, EncodedRaster, ImageBackend};
use super::calculations::{canvas_dimensions, plan_placement};
use super::data_url::DataUrl;
use super::params::{RenderParams, TransformParams};

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Plan a transform for a source of known dimensions without executing it.
pub fn plan_render(source_dims: (u32, u32), params: &TransformParams) -> RenderParams {
    let canvas = canvas_dimensions(params.target_width.max(1), params.aspect);
    RenderParams {
        canvas_width: canvas.0,
        canvas_height: canvas.1,
        placement: plan_placement(source_dims, canvas, &params.crop),
        background: params.background,
        quality: params.quality,
    }
}

/// Transform encoded source bytes into an encoded raster.
pub fn transform_bytes(
    backend: &impl ImageBackend,
    source: &[u8],
    params: &TransformParams,
) -> Result<EncodedRaster> {
    if !params.aspect.is_valid() {
        return Err(BackendError::ProcessingFailed(format!(
            "invalid aspect ratio {}",
            params.aspect
        )));
    }
    let dims = backend.identify(source)?;
    let plan = plan_render((dims.width, dims.height), params);
    backend.render(source, &plan)
}

/// Transform a `data:` URL, returning the transformed `data:` URL.
///
/// Any failure yields `source` unchanged.
pub fn transform_data_url(
    backend: &impl ImageBackend,
    source: &str,
    params: &TransformParams,
) -> String {
    let result = DataUrl::parse(source).and_then(|url| transform_bytes(backend, &url.bytes, params));
    match result {
        Ok(raster) => DataUrl::new(raster.mime, raster.bytes).to_url(),
        Err(e) => {
            tracing::warn!(error = %e, "image transform failed, keeping original source");
            source.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::backend::Dimensions;
    use crate::imaging::backend::tests::{MockBackend, RecordedOp};
    use crate::imaging::params::{AspectRatio, Background, CropParams, Quality};

    fn params(aspect: AspectRatio, crop: CropParams) -> TransformParams {
        TransformParams {
            aspect,
            target_width: 1200,
            crop,
            quality: Quality::default(),
            background: Background::PAPER,
        }
    }

    #[test]
    fn plan_render_uses_floor_height() {
        let plan = plan_render((1000, 1000), &params(AspectRatio::COVER, CropParams::IDENTITY));
        assert_eq!((plan.canvas_width, plan.canvas_height), (1200, 675));
    }

    #[test]
    fn transform_bytes_identifies_then_renders() {
        let backend = MockBackend::with_dimensions(vec![Dimensions {
            width: 2400,
            height: 1350,
        }]);
        let raster = transform_bytes(
            &backend,
            b"src",
            &params(AspectRatio::COVER, CropParams::IDENTITY),
        )
        .unwrap();
        assert_eq!(raster.mime, "image/jpeg");

        let ops = backend.get_operations();
        assert_eq!(ops.len(), 2);
        assert_eq!(ops[0], RecordedOp::Identify(3));
        assert!(matches!(
            &ops[1],
            RecordedOp::Render {
                canvas: (1200, 675),
                quality: 85,
                placement: Some(p),
                ..
            } if p.source_x == 600 && p.source_width == 1200
        ));
    }

    #[test]
    fn transform_bytes_rejects_zero_aspect() {
        let backend = MockBackend::with_dimensions(vec![Dimensions {
            width: 10,
            height: 10,
        }]);
        let result = transform_bytes(
            &backend,
            b"src",
            &params(AspectRatio::new(0, 9), CropParams::IDENTITY),
        );
        assert!(result.is_err());
        assert!(backend.get_operations().is_empty());
    }

    #[test]
    fn data_url_transform_wraps_output() {
        let backend = MockBackend::with_dimensions(vec![Dimensions {
            width: 100,
            height: 100,
        }]);
        let source = DataUrl::new("image/png", b"pixels".to_vec()).to_url();
        let out = transform_data_url(
            &backend,
            &source,
            &params(AspectRatio::GALLERY, CropParams::IDENTITY),
        );
        assert_eq!(out, DataUrl::new("image/jpeg", b"rendered".to_vec()).to_url());
    }

    #[test]
    fn undecodable_source_passes_through() {
        // No mock dimensions: identify fails
        let backend = MockBackend::new();
        let source = DataUrl::new("image/png", b"broken".to_vec()).to_url();
        let out = transform_data_url(
            &backend,
            &source,
            &params(AspectRatio::GALLERY, CropParams::IDENTITY),
        );
        assert_eq!(out, source);
    }

    #[test]
    fn non_data_url_passes_through() {
        let backend = MockBackend::new();
        let out = transform_data_url(
            &backend,
            "https://example.com/photo.jpg",
            &params(AspectRatio::COVER, CropParams::IDENTITY),
        );
        assert_eq!(out, "https://example.com/photo.jpg");
        assert!(backend.get_operations().is_empty());
    }
}
