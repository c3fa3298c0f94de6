//! Render planning shared by every surface that draws a placement.
//!
//! The editor canvas, grid thumbnails, and the post-purchase order view
//! each measure their own container, yet must show exactly the same
//! crop. They all build a [`RenderPlan`] from the same persisted numbers
//! (`source dims, transform, crop dims`) and differ only in which
//! viewport they show and how many pixels one frame unit occupies:
//!
//! | target | viewport (frame units) |
//! |--------|------------------------|
//! | [`RenderTarget::EditorCanvas`] | effective (3:2) frame |
//! | [`RenderTarget::GridThumbnail`] | true crop frame, centered in the effective frame |
//! | [`RenderTarget::OrderReconstruction`] | true crop frame, centered in the effective frame |
//!
//! The viewport is contain-fitted into the container, so a container of
//! any aspect ratio shows the same visible region of the source.
//!
//! Drawing model (source pixel `(u, v)` to container pixel):
//! center the source on its own middle, scale by `transform.scale`,
//! rotate clockwise by `transform.rotation`, translate by the offset,
//! then map frame units to pixels around the viewport center.

use serde::{Deserialize, Serialize};

use crate::geometry;
use crate::placement::Placement;
use crate::types::{CropFrame, Dimensions, Size, Transform};

/// Which surface a plan is drawn for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderTarget {
    /// Interactive editor: shows the full 3:2 effective frame.
    EditorCanvas,
    /// Grid preview: shows the true crop frame.
    GridThumbnail,
    /// Order confirmation, rebuilt from a snapshot: shows the true crop
    /// frame.
    OrderReconstruction,
}

impl RenderTarget {
    /// Viewport size in frame units for `frame`.
    #[must_use]
    pub fn viewport(self, frame: CropFrame) -> Size {
        match self {
            Self::EditorCanvas => frame.effective(),
            Self::GridThumbnail | Self::OrderReconstruction => frame.size(),
        }
    }
}

/// Axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Horizontal extent.
    pub width: f64,
    /// Vertical extent.
    pub height: f64,
}

impl Rect {
    /// Horizontal center.
    #[must_use]
    pub fn center_x(&self) -> f64 {
        self.x + self.width / 2.0
    }

    /// Vertical center.
    #[must_use]
    pub fn center_y(&self) -> f64 {
        self.y + self.height / 2.0
    }

    /// The four corners, clockwise from top-left.
    #[must_use]
    pub fn corners(&self) -> [(f64, f64); 4] {
        [
            (self.x, self.y),
            (self.x + self.width, self.y),
            (self.x + self.width, self.y + self.height),
            (self.x, self.y + self.height),
        ]
    }

    fn bounding(points: &[(f64, f64)]) -> Self {
        let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
        let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
        for &(x, y) in points {
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
        Self {
            x: min_x,
            y: min_y,
            width: max_x - min_x,
            height: max_y - min_y,
        }
    }
}

/// 2D affine map `x' = a·x + c·y + e`, `y' = b·x + d·y + f`.
///
/// Same column layout as SVG `matrix(a b c d e f)` and the canvas
/// `setTransform` call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Affine {
    /// Row 1, column 1.
    pub a: f64,
    /// Row 2, column 1.
    pub b: f64,
    /// Row 1, column 2.
    pub c: f64,
    /// Row 2, column 2.
    pub d: f64,
    /// Horizontal translation.
    pub e: f64,
    /// Vertical translation.
    pub f: f64,
}

impl Affine {
    /// Map a point.
    #[must_use]
    pub fn apply(&self, (x, y): (f64, f64)) -> (f64, f64) {
        (
            self.a.mul_add(x, self.c.mul_add(y, self.e)),
            self.b.mul_add(x, self.d.mul_add(y, self.f)),
        )
    }

    /// Inverse map, or `None` for a singular matrix.
    #[must_use]
    pub fn inverse(&self) -> Option<Self> {
        let det = self.a.mul_add(self.d, -(self.b * self.c));
        if det.abs() <= f64::MIN_POSITIVE {
            return None;
        }
        let a = self.d / det;
        let b = -self.b / det;
        let c = -self.c / det;
        let d = self.a / det;
        Some(Self {
            a,
            b,
            c,
            d,
            e: -a.mul_add(self.e, c * self.f),
            f: -b.mul_add(self.e, d * self.f),
        })
    }

    /// The coefficients as `[a, b, c, d, e, f]`.
    #[must_use]
    pub const fn to_array(&self) -> [f64; 6] {
        [self.a, self.b, self.c, self.d, self.e, self.f]
    }
}

/// The part of the source image that shows through the frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SourceRegion {
    /// Frame corners mapped into source pixels, clockwise from the
    /// frame's top-left. Axis-aligned only for quarter-turn rotations.
    pub corners: [(f64, f64); 4],
    /// Axis-aligned bounds of `corners`, in source pixels.
    pub bounds: Rect,
    /// `bounds` divided by the source dimensions.
    pub fraction: Rect,
}

impl SourceRegion {
    /// Returns `true` when every corner lies inside the source image
    /// (within `tolerance` source pixels): the frame shows no gap.
    #[must_use]
    pub fn within_source(&self, source: Dimensions, tolerance: f64) -> bool {
        let size = source.to_size();
        self.corners.iter().all(|&(x, y)| {
            x >= -tolerance
                && y >= -tolerance
                && x <= size.width + tolerance
                && y <= size.height + tolerance
        })
    }
}

/// Everything a surface needs to draw one placement into its container.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RenderPlan {
    /// Surface the plan was built for.
    pub target: RenderTarget,
    /// Container size in pixels.
    pub container: Size,
    /// Viewport rectangle inside the container, in pixels. Content
    /// outside it is clipped.
    pub frame_rect: Rect,
    /// Container pixels per frame unit.
    pub pixels_per_unit: f64,
    /// Source dimensions the plan was built from.
    pub source: Dimensions,
    /// Transform the plan was built from.
    pub transform: Transform,
    /// Crop frame the plan was built from.
    pub frame: CropFrame,
}

impl RenderPlan {
    /// Build a plan, or `None` when the container has no area (not laid
    /// out yet).
    #[must_use]
    pub fn new(
        source: Dimensions,
        frame: CropFrame,
        transform: Transform,
        target: RenderTarget,
        container: Size,
    ) -> Option<Self> {
        if !container.is_positive() {
            return None;
        }
        let viewport = target.viewport(frame);
        let fitted = geometry::contain_size(viewport, container);
        let frame_rect = Rect {
            x: (container.width - fitted.width) / 2.0,
            y: (container.height - fitted.height) / 2.0,
            width: fitted.width,
            height: fitted.height,
        };
        Some(Self {
            target,
            container,
            frame_rect,
            pixels_per_unit: fitted.width / viewport.width,
            source,
            transform,
            frame,
        })
    }

    /// Build a plan for a live placement.
    #[must_use]
    pub fn for_placement(
        placement: &Placement,
        target: RenderTarget,
        container: Size,
    ) -> Option<Self> {
        Self::new(
            placement.source(),
            placement.frame(),
            placement.transform(),
            target,
            container,
        )
    }

    /// Scale relative to the covering minimum at the current rotation.
    #[must_use]
    pub fn normalized_scale(&self) -> f64 {
        self.transform.scale
            / geometry::covering_scale_for(
                self.source.to_size(),
                self.transform.rotation,
                self.frame.effective(),
            )
    }

    /// Unrotated size of the drawn image in container pixels
    /// (the CSS `width`/`height` before the rotate transform).
    #[must_use]
    pub fn image_size(&self) -> Size {
        self.source
            .to_size()
            .scaled(self.transform.scale * self.pixels_per_unit)
    }

    /// Center of the drawn image in container pixels.
    #[must_use]
    pub fn image_center(&self) -> (f64, f64) {
        (
            self.transform
                .offset_x
                .mul_add(self.pixels_per_unit, self.frame_rect.center_x()),
            self.transform
                .offset_y
                .mul_add(self.pixels_per_unit, self.frame_rect.center_y()),
        )
    }

    /// Map from source pixels to container pixels.
    #[must_use]
    pub fn source_to_container(&self) -> Affine {
        let k = self.transform.scale * self.pixels_per_unit;
        let theta = self.transform.rotation.to_radians();
        let (sin, cos) = theta.sin_cos();
        let a = k * cos;
        let b = k * sin;
        let c = -k * sin;
        let d = k * cos;
        let half_w = f64::from(self.source.width) / 2.0;
        let half_h = f64::from(self.source.height) / 2.0;
        let (cx, cy) = self.image_center();
        Affine {
            a,
            b,
            c,
            d,
            e: cx - a.mul_add(half_w, c * half_h),
            f: cy - b.mul_add(half_w, d * half_h),
        }
    }

    /// The region of the source visible through the frame rectangle.
    ///
    /// Independent of the container size by construction; only the
    /// target's viewport matters.
    #[must_use]
    pub fn visible_source_region(&self) -> Option<SourceRegion> {
        let inverse = self.source_to_container().inverse()?;
        let corners = self.frame_rect.corners().map(|p| inverse.apply(p));
        let bounds = Rect::bounding(&corners);
        let size = self.source.to_size();
        let fraction = Rect {
            x: bounds.x / size.width,
            y: bounds.y / size.height,
            width: bounds.width / size.width,
            height: bounds.height / size.height,
        };
        Some(SourceRegion {
            corners,
            bounds,
            fraction,
        })
    }
}
