//! Pure calculation functions for canvas geometry.
//!
//! All functions here are pure and testable without any I/O or images.

use super::params::{AspectRatio, CropParams};

/// Output canvas dimensions for a target width and aspect ratio.
///
/// Height is `floor(width * aspect.height / aspect.width)`, never below 1.
///
/// # Examples
/// ```
/// # use after_stories::imaging::{AspectRatio, canvas_dimensions};
/// assert_eq!(canvas_dimensions(1200, AspectRatio::new(16, 9)), (1200, 675));
/// assert_eq!(canvas_dimensions(1200, AspectRatio::new(4, 3)), (1200, 900));
/// // 1000 * 9 / 16 = 562.5 → 562
/// assert_eq!(canvas_dimensions(1000, AspectRatio::new(16, 9)), (1000, 562));
/// ```
pub fn canvas_dimensions(target_width: u32, aspect: AspectRatio) -> (u32, u32) {
    let height = (target_width as u64 * aspect.height as u64) / aspect.width.max(1) as u64;
    (target_width, (height as u32).max(1))
}

/// Where a part of the source lands on the canvas.
///
/// `source_*` is a rectangle in source pixels; `dest_*` is the rectangle in
/// canvas pixels it is resampled into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub source_x: u32,
    pub source_y: u32,
    pub source_width: u32,
    pub source_height: u32,
    pub dest_x: u32,
    pub dest_y: u32,
    pub dest_width: u32,
    pub dest_height: u32,
}

/// Span of one axis after clipping the drawn source against the canvas.
struct AxisSpan {
    source_start: u32,
    source_len: u32,
    dest_start: u32,
    dest_len: u32,
}

/// Clip one axis. `origin` is where the scaled source starts on the canvas.
fn clip_axis(source_len: u32, canvas_len: u32, origin: f64, scale: f64) -> Option<AxisSpan> {
    let drawn = source_len as f64 * scale;
    let visible_start = origin.max(0.0);
    let visible_end = (origin + drawn).min(canvas_len as f64);

    let dest_start = visible_start.round() as u32;
    let dest_end = (visible_end.round() as u32).min(canvas_len);
    if dest_end <= dest_start {
        return None;
    }

    // Map the visible canvas span back into source pixels
    let src_start = ((visible_start - origin) / scale).floor().max(0.0) as u32;
    let src_end = (((visible_end - origin) / scale).ceil() as u32).min(source_len);
    let src_start = src_start.min(source_len.saturating_sub(1));
    let src_len = src_end.saturating_sub(src_start).max(1);

    Some(AxisSpan {
        source_start: src_start,
        source_len: src_len,
        dest_start,
        dest_len: dest_end - dest_start,
    })
}

/// Compute the visible portion of a source drawn onto a canvas.
///
/// The source is scaled by `crop.scale`, centred on the canvas, then shifted
/// by the crop offsets. Only the part overlapping the canvas is returned, so a
/// backend never has to materialise pixels that would be clipped away.
/// Returns `None` when the source lies entirely off-canvas.
///
/// # Arguments
/// * `source` - Source dimensions (width, height)
/// * `canvas` - Canvas dimensions (width, height)
/// * `crop` - Offset and scale
pub fn plan_placement(
    source: (u32, u32),
    canvas: (u32, u32),
    crop: &CropParams,
) -> Option<Placement> {
    let (src_w, src_h) = source;
    let (canvas_w, canvas_h) = canvas;
    if src_w == 0 || src_h == 0 || canvas_w == 0 || canvas_h == 0 || crop.scale <= 0.0 {
        return None;
    }

    let origin_x = (canvas_w as f64 - src_w as f64 * crop.scale) / 2.0 + crop.offset_x;
    let origin_y = (canvas_h as f64 - src_h as f64 * crop.scale) / 2.0 + crop.offset_y;

    let x = clip_axis(src_w, canvas_w, origin_x, crop.scale)?;
    let y = clip_axis(src_h, canvas_h, origin_y, crop.scale)?;

    Some(Placement {
        source_x: x.source_start,
        source_y: y.source_start,
        source_width: x.source_len,
        source_height: y.source_len,
        dest_x: x.dest_start,
        dest_y: y.dest_start,
        dest_width: x.dest_len,
        dest_height: y.dest_len,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn crop(offset_x: f64, offset_y: f64, scale: f64) -> CropParams {
        CropParams {
            offset_x,
            offset_y,
            scale,
        }
    }

    // =========================================================================
    // canvas_dimensions tests
    // =========================================================================

    #[test]
    fn canvas_cover_at_1200() {
        assert_eq!(canvas_dimensions(1200, AspectRatio::COVER), (1200, 675));
    }

    #[test]
    fn canvas_gallery_at_1200() {
        assert_eq!(canvas_dimensions(1200, AspectRatio::GALLERY), (1200, 900));
    }

    #[test]
    fn canvas_floors_fractional_height() {
        // 100 * 2 / 3 = 66.67
        assert_eq!(canvas_dimensions(100, AspectRatio::new(3, 2)), (100, 66));
    }

    #[test]
    fn canvas_height_never_zero() {
        assert_eq!(canvas_dimensions(1, AspectRatio::new(16, 1)), (1, 1));
    }

    // =========================================================================
    // plan_placement tests
    // =========================================================================

    #[test]
    fn identity_on_same_size_covers_canvas() {
        let p = plan_placement((1200, 675), (1200, 675), &CropParams::IDENTITY).unwrap();
        assert_eq!(
            p,
            Placement {
                source_x: 0,
                source_y: 0,
                source_width: 1200,
                source_height: 675,
                dest_x: 0,
                dest_y: 0,
                dest_width: 1200,
                dest_height: 675,
            }
        );
    }

    #[test]
    fn larger_source_is_center_cropped() {
        // 2000x1000 at natural size on 1000x500: middle 1000x500 is visible
        let p = plan_placement((2000, 1000), (1000, 500), &CropParams::IDENTITY).unwrap();
        assert_eq!((p.source_x, p.source_y), (500, 250));
        assert_eq!((p.source_width, p.source_height), (1000, 500));
        assert_eq!((p.dest_width, p.dest_height), (1000, 500));
    }

    #[test]
    fn smaller_source_is_centered_with_margins() {
        let p = plan_placement((200, 100), (1000, 500), &CropParams::IDENTITY).unwrap();
        assert_eq!((p.dest_x, p.dest_y), (400, 200));
        assert_eq!((p.dest_width, p.dest_height), (200, 100));
        assert_eq!((p.source_width, p.source_height), (200, 100));
    }

    #[test]
    fn half_scale_shrinks_destination() {
        let p = plan_placement((1000, 500), (1000, 500), &crop(0.0, 0.0, 0.5)).unwrap();
        assert_eq!((p.dest_x, p.dest_y), (250, 125));
        assert_eq!((p.dest_width, p.dest_height), (500, 250));
        assert_eq!((p.source_width, p.source_height), (1000, 500));
    }

    #[test]
    fn double_scale_reads_center_quarter() {
        let p = plan_placement((1000, 500), (1000, 500), &crop(0.0, 0.0, 2.0)).unwrap();
        assert_eq!((p.source_x, p.source_y), (250, 125));
        assert_eq!((p.source_width, p.source_height), (500, 250));
        assert_eq!((p.dest_width, p.dest_height), (1000, 500));
    }

    #[test]
    fn offset_shifts_destination() {
        let p = plan_placement((200, 100), (1000, 500), &crop(100.0, -50.0, 1.0)).unwrap();
        assert_eq!((p.dest_x, p.dest_y), (500, 150));
    }

    #[test]
    fn offset_past_edge_clips_source() {
        // Same-size source pushed 300px right: left 700px of source visible
        let p = plan_placement((1000, 500), (1000, 500), &crop(300.0, 0.0, 1.0)).unwrap();
        assert_eq!(p.dest_x, 300);
        assert_eq!(p.dest_width, 700);
        assert_eq!(p.source_x, 0);
        assert_eq!(p.source_width, 700);
    }

    #[test]
    fn fully_off_canvas_is_none() {
        assert_eq!(
            plan_placement((100, 100), (1000, 500), &crop(2000.0, 0.0, 1.0)),
            None
        );
    }

    #[test]
    fn degenerate_inputs_are_none() {
        assert_eq!(plan_placement((0, 100), (10, 10), &CropParams::IDENTITY), None);
        assert_eq!(plan_placement((10, 10), (10, 10), &crop(0.0, 0.0, 0.0)), None);
    }
}
