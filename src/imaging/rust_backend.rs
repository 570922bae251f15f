//! Pure Rust image processing backend.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, TIFF, WebP) | `image::load_from_memory` (format sniffed from bytes) |
//! | Identify | `image::ImageReader::into_dimensions` (header only) |
//! | Crop visible region | `image::DynamicImage::crop_imm` |
//! | Resample | `image::DynamicImage::resize_exact` with `Lanczos3` |
//! | Composite over background | `image::imageops::overlay` (alpha-blended) |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` at the requested quality |

use super::backend::{BackendError, Dimensions, EncodedRaster, ImageBackend};
use super::params::RenderParams;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ExtendedColorType, ImageEncoder, ImageReader, Rgba, RgbaImage};
use std::io::Cursor;

/// Media type of everything this backend encodes.
pub const OUTPUT_MIME: &str = "image/jpeg";

/// Pure Rust backend using the `image` crate.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn decode(source: &[u8]) -> Result<DynamicImage, BackendError> {
    image::load_from_memory(source)
        .map_err(|e| BackendError::ProcessingFailed(format!("Failed to decode source: {e}")))
}

/// Encode an opaque canvas as baseline JPEG.
fn encode_jpeg(canvas: RgbaImage, quality: u32) -> Result<Vec<u8>, BackendError> {
    let rgb = DynamicImage::ImageRgba8(canvas).to_rgb8();
    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut bytes, quality.clamp(1, 100) as u8)
        .write_image(rgb.as_raw(), rgb.width(), rgb.height(), ExtendedColorType::Rgb8)
        .map_err(|e| BackendError::ProcessingFailed(format!("JPEG encode failed: {e}")))?;
    Ok(bytes)
}

impl ImageBackend for RustBackend {
    fn identify(&self, source: &[u8]) -> Result<Dimensions, BackendError> {
        let (width, height) = ImageReader::new(Cursor::new(source))
            .with_guessed_format()?
            .into_dimensions()
            .map_err(|e| {
                BackendError::ProcessingFailed(format!("Failed to read dimensions: {e}"))
            })?;
        Ok(Dimensions { width, height })
    }

    fn render(&self, source: &[u8], params: &RenderParams) -> Result<EncodedRaster, BackendError> {
        let img = decode(source)?;
        let [r, g, b] = params.background.rgb();
        let mut canvas = RgbaImage::from_pixel(
            params.canvas_width,
            params.canvas_height,
            Rgba([r, g, b, 255]),
        );

        if let Some(p) = params.placement {
            let tile = img
                .crop_imm(p.source_x, p.source_y, p.source_width, p.source_height)
                .resize_exact(p.dest_width, p.dest_height, FilterType::Lanczos3)
                .to_rgba8();
            image::imageops::overlay(&mut canvas, &tile, p.dest_x as i64, p.dest_y as i64);
        }

        Ok(EncodedRaster {
            mime: OUTPUT_MIME,
            bytes: encode_jpeg(canvas, params.quality.value())?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::calculations::{canvas_dimensions, plan_placement};
    use crate::imaging::params::{AspectRatio, Background, CropParams, Quality};
    use image::codecs::png::PngEncoder;
    use image::{GenericImageView, RgbImage};

    /// Encode a solid-colour PNG in memory.
    fn solid_png(width: u32, height: u32, rgb: [u8; 3]) -> Vec<u8> {
        let img = RgbImage::from_pixel(width, height, image::Rgb(rgb));
        let mut bytes = Vec::new();
        PngEncoder::new(&mut bytes)
            .write_image(img.as_raw(), width, height, ExtendedColorType::Rgb8)
            .unwrap();
        bytes
    }

    fn plan(source: (u32, u32), width: u32, aspect: AspectRatio, crop: CropParams) -> RenderParams {
        let canvas = canvas_dimensions(width, aspect);
        RenderParams {
            canvas_width: canvas.0,
            canvas_height: canvas.1,
            placement: plan_placement(source, canvas, &crop),
            background: Background::PAPER,
            quality: Quality::default(),
        }
    }

    fn close_to(actual: [u8; 3], expected: [u8; 3]) -> bool {
        actual
            .iter()
            .zip(expected.iter())
            .all(|(a, e)| (*a as i32 - *e as i32).abs() <= 6)
    }

    fn pixel(bytes: &[u8], x: u32, y: u32) -> [u8; 3] {
        let img = image::load_from_memory(bytes).unwrap();
        let p = img.get_pixel(x, y).0;
        [p[0], p[1], p[2]]
    }

    #[test]
    fn identify_png_dimensions() {
        let backend = RustBackend::new();
        let dims = backend.identify(&solid_png(64, 48, [10, 20, 30])).unwrap();
        assert_eq!(dims, Dimensions { width: 64, height: 48 });
    }

    #[test]
    fn identify_garbage_errors() {
        let backend = RustBackend::new();
        assert!(backend.identify(b"definitely not an image").is_err());
    }

    #[test]
    fn render_produces_exact_canvas_as_jpeg() {
        let backend = RustBackend::new();
        let source = solid_png(300, 200, [200, 40, 40]);
        let params = plan((300, 200), 160, AspectRatio::COVER, CropParams::IDENTITY);
        let out = backend.render(&source, &params).unwrap();

        assert_eq!(out.mime, "image/jpeg");
        assert_eq!(image::guess_format(&out.bytes).unwrap(), image::ImageFormat::Jpeg);
        let decoded = image::load_from_memory(&out.bytes).unwrap();
        assert_eq!(decoded.dimensions(), (160, 90));
    }

    #[test]
    fn covered_canvas_shows_source_colour() {
        let backend = RustBackend::new();
        let source = solid_png(400, 300, [30, 90, 200]);
        let params = plan((400, 300), 160, AspectRatio::GALLERY, CropParams::IDENTITY);
        let out = backend.render(&source, &params).unwrap();
        assert!(close_to(pixel(&out.bytes, 80, 60), [30, 90, 200]));
        assert!(close_to(pixel(&out.bytes, 2, 2), [30, 90, 200]));
    }

    #[test]
    fn uncovered_area_shows_background() {
        let backend = RustBackend::new();
        let source = solid_png(160, 120, [20, 20, 20]);
        let crop = CropParams {
            scale: 0.5,
            ..CropParams::IDENTITY
        };
        let params = plan((160, 120), 160, AspectRatio::GALLERY, crop);
        let out = backend.render(&source, &params).unwrap();
        assert!(close_to(pixel(&out.bytes, 2, 2), Background::PAPER.rgb()));
        assert!(close_to(pixel(&out.bytes, 80, 60), [20, 20, 20]));
    }

    #[test]
    fn transparent_source_shows_background() {
        let backend = RustBackend::new();
        let img = RgbaImage::from_pixel(80, 60, Rgba([255, 0, 0, 0]));
        let mut source = Vec::new();
        PngEncoder::new(&mut source)
            .write_image(img.as_raw(), 80, 60, ExtendedColorType::Rgba8)
            .unwrap();
        let params = plan((80, 60), 80, AspectRatio::GALLERY, CropParams::IDENTITY);
        let out = backend.render(&source, &params).unwrap();
        assert!(close_to(pixel(&out.bytes, 40, 30), Background::PAPER.rgb()));
    }

    #[test]
    fn render_without_placement_is_background_only() {
        let backend = RustBackend::new();
        let source = solid_png(10, 10, [0, 0, 0]);
        let params = RenderParams {
            canvas_width: 40,
            canvas_height: 30,
            placement: None,
            background: Background([0, 200, 0]),
            quality: Quality::default(),
        };
        let out = backend.render(&source, &params).unwrap();
        assert!(close_to(pixel(&out.bytes, 20, 15), [0, 200, 0]));
    }

    #[test]
    fn render_undecodable_source_errors() {
        let backend = RustBackend::new();
        let params = plan((10, 10), 40, AspectRatio::GALLERY, CropParams::IDENTITY);
        assert!(backend.render(b"junk", &params).is_err());
    }
}
