//! Raster export: compose a placed image into a container-sized RGBA
//! image with `tiny-skia`.
//!
//! The source is drawn through the plan's source-to-container affine
//! with bicubic filtering, clipped to the frame rectangle by a mask.
//! Pixels outside the frame stay transparent.

use calframe_geometry::{Dimensions, RenderPlan};
use image::{Rgba, RgbaImage};
use tiny_skia::{
    Color, FillRule, FilterQuality, Mask, Paint, PathBuilder, Pixmap, PixmapPaint, Rect,
    Transform,
};

/// Largest output side accepted, in pixels.
pub const MAX_OUTPUT_SIDE: u32 = 16_384;

/// Errors that can occur during raster export.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// The source raster does not match the dimensions the plan was
    /// built for.
    #[error("source is {actual_width}x{actual_height}, plan expects {expected}")]
    SourceMismatch {
        /// Dimensions recorded in the plan.
        expected: Dimensions,
        /// Width of the supplied raster.
        actual_width: u32,
        /// Height of the supplied raster.
        actual_height: u32,
    },

    /// The container rounds to zero pixels or exceeds [`MAX_OUTPUT_SIDE`].
    #[error("unsupported output size {width}x{height}")]
    OutputSize {
        /// Container width in pixels.
        width: f64,
        /// Container height in pixels.
        height: f64,
    },

    /// The frame rectangle is empty or not finite.
    #[error("frame rectangle is degenerate")]
    DegenerateFrame,
}

/// Raster export options.
#[derive(Debug, Clone, Copy, Default)]
pub struct RasterOptions {
    /// Opaque RGBA fill for the frame area behind the image.
    pub background: Option<[u8; 4]>,
}

#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "checked to be finite and within 1..=MAX_OUTPUT_SIDE before casting"
)]
fn output_side(value: f64) -> Option<u32> {
    let rounded = value.round();
    (rounded.is_finite() && rounded >= 1.0 && rounded <= f64::from(MAX_OUTPUT_SIDE))
        .then_some(rounded as u32)
}

/// Premultiply a straight-alpha image into a pixmap.
fn to_pixmap(image: &RgbaImage) -> Option<Pixmap> {
    let mut pixmap = Pixmap::new(image.width(), image.height())?;
    for (dst, src) in pixmap.data_mut().chunks_exact_mut(4).zip(image.pixels()) {
        let [r, g, b, a] = src.0;
        let premul = |c: u8| {
            let v = (u16::from(c) * u16::from(a) + 127) / 255;
            u8::try_from(v).unwrap_or(u8::MAX)
        };
        dst.copy_from_slice(&[premul(r), premul(g), premul(b), a]);
    }
    Some(pixmap)
}

/// Un-premultiply a pixmap into a straight-alpha image.
fn to_image(pixmap: &Pixmap) -> RgbaImage {
    let mut img = RgbaImage::new(pixmap.width(), pixmap.height());
    for (pixel, src) in img.pixels_mut().zip(pixmap.data().chunks_exact(4)) {
        let a = src[3];
        if a == 0 {
            *pixel = Rgba([0, 0, 0, 0]);
        } else {
            let unpremul = |c: u8| {
                let v = u16::from(c) * 255 / u16::from(a);
                u8::try_from(v).unwrap_or(u8::MAX)
            };
            *pixel = Rgba([unpremul(src[0]), unpremul(src[1]), unpremul(src[2]), a]);
        }
    }
    img
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "tiny-skia works in f32; container coordinates are far below f32 precision limits"
)]
fn to_skia(m: [f64; 6]) -> Transform {
    Transform::from_row(
        m[0] as f32,
        m[1] as f32,
        m[2] as f32,
        m[3] as f32,
        m[4] as f32,
        m[5] as f32,
    )
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "tiny-skia works in f32; container coordinates are far below f32 precision limits"
)]
fn frame_rect(plan: &RenderPlan) -> Option<Rect> {
    let f = plan.frame_rect;
    Rect::from_xywh(f.x as f32, f.y as f32, f.width as f32, f.height as f32)
}

/// Compose `source` into a container-sized image following `plan`.
///
/// # Errors
///
/// Returns [`ExportError::SourceMismatch`] if `source` does not have the
/// plan's source dimensions, [`ExportError::OutputSize`] for unusable
/// container sizes, and [`ExportError::DegenerateFrame`] if the frame
/// rectangle cannot be rasterized.
pub fn render_raster(
    source: &RgbaImage,
    plan: &RenderPlan,
    options: &RasterOptions,
) -> Result<RgbaImage, ExportError> {
    if source.width() != plan.source.width || source.height() != plan.source.height {
        return Err(ExportError::SourceMismatch {
            expected: plan.source,
            actual_width: source.width(),
            actual_height: source.height(),
        });
    }

    let size_error = || ExportError::OutputSize {
        width: plan.container.width,
        height: plan.container.height,
    };
    let width = output_side(plan.container.width).ok_or_else(size_error)?;
    let height = output_side(plan.container.height).ok_or_else(size_error)?;
    let mut canvas = Pixmap::new(width, height).ok_or_else(size_error)?;

    let rect = frame_rect(plan).ok_or(ExportError::DegenerateFrame)?;
    let mut mask = Mask::new(width, height).ok_or_else(size_error)?;
    mask.fill_path(
        &PathBuilder::from_rect(rect),
        FillRule::Winding,
        true,
        Transform::identity(),
    );

    if let Some([r, g, b, a]) = options.background {
        let mut paint = Paint::default();
        paint.set_color(Color::from_rgba8(r, g, b, a));
        canvas.fill_rect(rect, &paint, Transform::identity(), None);
    }

    let image = to_pixmap(source).ok_or_else(size_error)?;
    let paint = PixmapPaint {
        quality: FilterQuality::Bicubic,
        ..PixmapPaint::default()
    };
    canvas.draw_pixmap(
        0,
        0,
        image.as_ref(),
        &paint,
        to_skia(plan.source_to_container().to_array()),
        Some(&mask),
    );
    log::debug!(
        "rendered {}x{} source into {width}x{height} ({:?})",
        source.width(),
        source.height(),
        plan.target
    );

    Ok(to_image(&canvas))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use calframe_geometry::{CropFrame, EditorConfig, Placement, RenderTarget, Size};

    /// Left half red, right half blue.
    fn halves(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, _| {
            if x < width / 2 {
                Rgba([255, 0, 0, 255])
            } else {
                Rgba([0, 0, 255, 255])
            }
        })
    }

    fn is_red(px: &Rgba<u8>) -> bool {
        px.0[0] > 250 && px.0[2] < 5 && px.0[3] == 255
    }

    fn is_blue(px: &Rgba<u8>) -> bool {
        px.0[2] > 250 && px.0[0] < 5 && px.0[3] == 255
    }

    fn placement() -> Placement {
        Placement::initialize(
            Dimensions::new(120, 80).unwrap(),
            CropFrame::new(100.0, 100.0).unwrap(),
        )
    }

    #[test]
    fn editor_fill_covers_whole_canvas() {
        let plan = RenderPlan::for_placement(
            &placement(),
            RenderTarget::EditorCanvas,
            Size::new(150.0, 100.0).unwrap(),
        )
        .unwrap();
        let out = render_raster(&halves(120, 80), &plan, &RasterOptions::default()).unwrap();
        assert_eq!(out.dimensions(), (150, 100));
        assert!(is_red(out.get_pixel(10, 50)));
        assert!(is_blue(out.get_pixel(140, 50)));
    }

    #[test]
    fn thumbnail_outside_frame_is_transparent() {
        let plan = RenderPlan::for_placement(
            &placement(),
            RenderTarget::GridThumbnail,
            Size::new(150.0, 100.0).unwrap(),
        )
        .unwrap();
        let out = render_raster(&halves(120, 80), &plan, &RasterOptions::default()).unwrap();
        // Frame is the centered 100x100 square.
        assert_eq!(out.get_pixel(5, 50).0[3], 0);
        assert_eq!(out.get_pixel(145, 50).0[3], 0);
        assert!(is_red(out.get_pixel(40, 50)));
        assert!(is_blue(out.get_pixel(110, 50)));
    }

    #[test]
    fn half_turn_swaps_sides() {
        let config = EditorConfig::default();
        let p = placement().rotate90(&config).rotate90(&config);
        let plan = RenderPlan::for_placement(
            &p,
            RenderTarget::EditorCanvas,
            Size::new(150.0, 100.0).unwrap(),
        )
        .unwrap();
        let out = render_raster(&halves(120, 80), &plan, &RasterOptions::default()).unwrap();
        assert!(is_blue(out.get_pixel(10, 50)));
        assert!(is_red(out.get_pixel(140, 50)));
    }

    #[test]
    fn fit_shows_background() {
        let p = Placement::initialize(
            Dimensions::new(80, 120).unwrap(),
            CropFrame::new(100.0, 100.0).unwrap(),
        )
        .fit();
        let plan = RenderPlan::for_placement(
            &p,
            RenderTarget::EditorCanvas,
            Size::new(150.0, 100.0).unwrap(),
        )
        .unwrap();
        let options = RasterOptions {
            background: Some([255, 255, 255, 255]),
        };
        let out = render_raster(&halves(80, 120), &plan, &options).unwrap();
        // The fitted portrait image is pillarboxed in the 3:2 frame.
        assert_eq!(out.get_pixel(5, 50).0, [255, 255, 255, 255]);
        assert!(is_red(out.get_pixel(60, 50)));
    }

    #[test]
    fn zoom_keeps_center_content() {
        let p = placement().set_scale(placement().transform().scale * 2.0, &EditorConfig::default());
        let plan = RenderPlan::for_placement(
            &p,
            RenderTarget::EditorCanvas,
            Size::new(150.0, 100.0).unwrap(),
        )
        .unwrap();
        let out = render_raster(&halves(120, 80), &plan, &RasterOptions::default()).unwrap();
        assert!(is_red(out.get_pixel(30, 50)));
        assert!(is_blue(out.get_pixel(120, 50)));
    }

    #[test]
    fn mismatched_source_rejected() {
        let plan = RenderPlan::for_placement(
            &placement(),
            RenderTarget::EditorCanvas,
            Size::new(150.0, 100.0).unwrap(),
        )
        .unwrap();
        let result = render_raster(&halves(10, 10), &plan, &RasterOptions::default());
        assert!(matches!(result, Err(ExportError::SourceMismatch { .. })));
    }

    #[test]
    fn oversized_container_rejected() {
        let plan = RenderPlan::for_placement(
            &placement(),
            RenderTarget::EditorCanvas,
            Size::new(1e6, 1e6).unwrap(),
        )
        .unwrap();
        let result = render_raster(&halves(120, 80), &plan, &RasterOptions::default());
        assert!(matches!(result, Err(ExportError::OutputSize { .. })));
    }

    #[test]
    fn output_side_bounds() {
        assert_eq!(output_side(0.4), None);
        assert_eq!(output_side(f64::NAN), None);
        assert_eq!(output_side(99.6), Some(100));
        assert_eq!(output_side(f64::from(MAX_OUTPUT_SIDE) + 1.0), None);
    }
}
