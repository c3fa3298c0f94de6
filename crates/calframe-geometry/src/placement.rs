//! Transform state model: one image placed in one crop frame.
//!
//! A [`Placement`] bundles the persisted [`Transform`] with the source
//! dimensions and crop frame it was computed against, because every
//! constraint (covering scale, offset limits) depends on all three.
//!
//! Every mutator is pure: it takes `&self` and returns a new, fully
//! clamped placement. No transiently invalid state is observable from
//! outside a mutator. The one deliberate exception to the cover
//! invariant is [`Placement::fit`], which shrinks the image to contain
//! mode for preview.

use crate::config::EditorConfig;
use crate::geometry::{self, normalize_rotation};
use crate::types::{CropFrame, Dimensions, Offset, Size, Transform};

/// One source image positioned inside one crop frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    source: Dimensions,
    frame: CropFrame,
    transform: Transform,
}

impl Placement {
    /// Default covering placement: no rotation, centered, scaled to
    /// exactly cover the effective frame.
    #[must_use]
    pub fn initialize(source: Dimensions, frame: CropFrame) -> Self {
        let effective = frame.effective();
        let scale = geometry::covering_scale_for(source.to_size(), 0.0, effective);
        Self {
            source,
            frame,
            transform: Transform {
                scale,
                rotation: 0.0,
                offset_x: 0.0,
                offset_y: 0.0,
            },
        }
    }

    /// Adopt a persisted transform verbatim.
    ///
    /// No re-normalization happens on read: what was saved is what the
    /// renderers see. Use [`clamped`](Self::clamped) to re-apply the
    /// offset constraint if the stored data is untrusted.
    #[must_use]
    pub const fn restore(source: Dimensions, frame: CropFrame, transform: Transform) -> Self {
        Self {
            source,
            frame,
            transform,
        }
    }

    /// Natural pixel dimensions of the source image.
    #[must_use]
    pub const fn source(&self) -> Dimensions {
        self.source
    }

    /// The crop frame this placement targets.
    #[must_use]
    pub const fn frame(&self) -> CropFrame {
        self.frame
    }

    /// The current persisted transform.
    #[must_use]
    pub const fn transform(&self) -> Transform {
        self.transform
    }

    /// The crop frame extended to 3:2.
    #[must_use]
    pub fn effective_frame(&self) -> Size {
        self.frame.effective()
    }

    /// Covering scale at the current rotation.
    #[must_use]
    pub fn min_covering_scale(&self) -> f64 {
        self.covering_scale_at(self.transform.rotation)
    }

    /// Contain scale at the current rotation.
    #[must_use]
    pub fn min_fit_scale(&self) -> f64 {
        let rotated = geometry::rotated_bounds(self.source.to_size(), self.transform.rotation);
        geometry::min_fit_scale(rotated, self.effective_frame())
    }

    /// Zoom ceiling at the current rotation.
    #[must_use]
    pub fn max_scale(&self, config: &EditorConfig) -> f64 {
        self.min_covering_scale() * config.max_relative_scale
    }

    /// Current scale as a multiple of the covering scale.
    ///
    /// At least `1.0` whenever the cover invariant holds; below `1.0`
    /// only after [`fit`](Self::fit).
    #[must_use]
    pub fn relative_scale(&self) -> f64 {
        self.transform.scale / self.min_covering_scale()
    }

    /// Maximum absolute offsets at the current scale and rotation.
    #[must_use]
    pub fn offset_limits(&self) -> Offset {
        geometry::offset_limits(
            self.transform.scale,
            self.source.to_size(),
            self.transform.rotation,
            self.effective_frame(),
        )
    }

    /// Returns `true` when the image covers the effective frame.
    #[must_use]
    pub fn is_covering(&self) -> bool {
        self.transform.scale >= self.min_covering_scale() * (1.0 - geometry::COVER_EPSILON)
    }

    /// Re-apply the offset constraint without changing scale or rotation.
    #[must_use]
    pub fn clamped(&self) -> Self {
        self.with_transform_offset(self.transform.offset())
    }

    /// Set the scale, clamped into `[min covering, max scale]`, then
    /// re-clamp the offset.
    #[must_use]
    pub fn set_scale(&self, scale: f64, config: &EditorConfig) -> Self {
        let min = self.min_covering_scale();
        let max = self.max_scale(config);
        let scale = if scale.is_finite() {
            scale.clamp(min, max)
        } else {
            min
        };
        let next = Self {
            transform: Transform {
                scale,
                ..self.transform
            },
            ..*self
        };
        next.clamped()
    }

    /// Multiply the scale by `factor` (clamped as in
    /// [`set_scale`](Self::set_scale)).
    #[must_use]
    pub fn zoom_by(&self, factor: f64, config: &EditorConfig) -> Self {
        self.set_scale(self.transform.scale * factor, config)
    }

    /// Rotate a quarter turn clockwise.
    ///
    /// The scale is clamped into the zoom range of the new rotation, and
    /// the offset resets to center: the content at the edges changes, so
    /// the previous pan has no meaningful equivalent.
    #[must_use]
    pub fn rotate90(&self, config: &EditorConfig) -> Self {
        let rotation = normalize_rotation(self.transform.rotation + 90.0);
        Self {
            transform: Transform {
                scale: self.scale_within_range_at(rotation, config),
                rotation,
                offset_x: 0.0,
                offset_y: 0.0,
            },
            ..*self
        }
    }

    /// Rotate to an arbitrary angle (degrees, normalized into `[0, 360)`).
    ///
    /// Unlike [`rotate90`](Self::rotate90) the offset is kept and only
    /// re-clamped, so continuous rotation from a slider does not jump.
    #[must_use]
    pub fn set_rotation(&self, rotation_deg: f64, config: &EditorConfig) -> Self {
        let rotation = normalize_rotation(rotation_deg);
        let next = Self {
            transform: Transform {
                scale: self.scale_within_range_at(rotation, config),
                rotation,
                ..self.transform
            },
            ..*self
        };
        next.clamped()
    }

    /// Translate by `(dx, dy)` effective-frame units, then clamp.
    #[must_use]
    pub fn pan(&self, dx: f64, dy: f64) -> Self {
        let offset = self.transform.offset();
        self.with_transform_offset(Offset::new(offset.x + dx, offset.y + dy))
    }

    /// Move to an absolute offset, clamped.
    #[must_use]
    pub fn set_offset(&self, offset: Offset) -> Self {
        self.with_transform_offset(offset)
    }

    /// Scale to exactly cover the frame and center.
    #[must_use]
    pub fn fill(&self) -> Self {
        Self {
            transform: Transform {
                scale: self.min_covering_scale(),
                offset_x: 0.0,
                offset_y: 0.0,
                ..self.transform
            },
            ..*self
        }
    }

    /// Scale to fit entirely inside the frame (letterboxed) and center.
    ///
    /// The resulting scale is below the covering minimum; any later
    /// [`set_scale`](Self::set_scale) or gesture zoom snaps it back into
    /// the covering range.
    #[must_use]
    pub fn fit(&self) -> Self {
        Self {
            transform: Transform {
                scale: self.min_fit_scale(),
                offset_x: 0.0,
                offset_y: 0.0,
                ..self.transform
            },
            ..*self
        }
    }

    /// Move this placement into a different crop frame.
    ///
    /// The offset is re-clamped against the new frame. Only when the
    /// current scale no longer covers the new frame does the placement
    /// reset to the covering default (keeping the rotation).
    #[must_use]
    pub fn with_frame(&self, frame: CropFrame) -> Self {
        let moved = Self { frame, ..*self };
        if moved.is_covering() {
            moved.clamped()
        } else {
            log::debug!(
                "scale {} no longer covers frame {}, resetting to cover",
                self.transform.scale,
                frame.size()
            );
            moved.fill()
        }
    }

    /// Current scale clamped into `[cover, cover × max_relative_scale]`
    /// at `rotation_deg`.
    fn scale_within_range_at(&self, rotation_deg: f64, config: &EditorConfig) -> f64 {
        let min = self.covering_scale_at(rotation_deg);
        let max = min * config.max_relative_scale;
        if self.transform.scale.is_finite() {
            self.transform.scale.clamp(min, max)
        } else {
            min
        }
    }

    fn covering_scale_at(&self, rotation_deg: f64) -> f64 {
        geometry::covering_scale_for(self.source.to_size(), rotation_deg, self.effective_frame())
    }

    fn with_transform_offset(&self, offset: Offset) -> Self {
        let clamped = geometry::clamp_offset(
            offset,
            self.transform.scale,
            self.source.to_size(),
            self.transform.rotation,
            self.effective_frame(),
        );
        Self {
            transform: self.transform.with_offset(clamped),
            ..*self
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-9;

    fn scenario() -> Placement {
        Placement::initialize(
            Dimensions::new(1200, 800).unwrap(),
            CropFrame::new(100.0, 100.0).unwrap(),
        )
    }

    fn config() -> EditorConfig {
        EditorConfig::default()
    }

    // --- initialize / fill ---

    #[test]
    fn initialize_covers_with_zero_offset() {
        let p = scenario();
        let t = p.transform();
        assert!((t.scale - 0.125).abs() < TOL);
        assert!(t.rotation.abs() < TOL);
        assert_eq!(t.offset(), Offset::ZERO);
        assert!(p.is_covering());
        assert!((p.relative_scale() - 1.0).abs() < TOL);
    }

    #[test]
    fn fill_resets_zoom_and_offset() {
        let p = scenario().set_scale(0.25, &config()).pan(20.0, 10.0);
        assert!(p.transform().offset_x > 0.0);
        let filled = p.fill();
        assert!((filled.transform().scale - 0.125).abs() < TOL);
        assert_eq!(filled.transform().offset(), Offset::ZERO);
    }

    // --- set_scale ---

    #[test]
    fn set_scale_clamps_to_range() {
        let p = scenario();
        assert!((p.set_scale(0.01, &config()).transform().scale - 0.125).abs() < TOL);
        assert!((p.set_scale(10.0, &config()).transform().scale - 0.375).abs() < TOL);
        assert!((p.set_scale(0.2, &config()).transform().scale - 0.2).abs() < TOL);
    }

    #[test]
    fn set_scale_non_finite_falls_back_to_cover() {
        let p = scenario().set_scale(f64::NAN, &config());
        assert!((p.transform().scale - 0.125).abs() < TOL);
    }

    #[test]
    fn zooming_out_reclamps_offset() {
        let p = scenario().set_scale(0.25, &config()).pan(1000.0, 1000.0);
        let limits = p.offset_limits();
        assert!((p.transform().offset_x - limits.x).abs() < TOL);

        let zoomed_out = p.set_scale(0.1875, &config());
        assert!((zoomed_out.transform().offset_x - 37.5).abs() < TOL);
        assert!((zoomed_out.transform().offset_y - 25.0).abs() < TOL);
    }

    #[test]
    fn zoom_by_multiplies() {
        let p = scenario().zoom_by(1.5, &config());
        assert!((p.transform().scale - 0.1875).abs() < TOL);
    }

    // --- pan ---

    #[test]
    fn pan_at_cover_stays_centered() {
        let p = scenario().pan(30.0, -30.0);
        assert_eq!(p.transform().offset(), Offset::ZERO);
    }

    #[test]
    fn pan_accumulates_within_limits() {
        let p = scenario().set_scale(0.1875, &config());
        let p = p.pan(10.0, 5.0).pan(10.0, 5.0);
        assert!((p.transform().offset_x - 20.0).abs() < TOL);
        assert!((p.transform().offset_y - 10.0).abs() < TOL);
    }

    // --- rotate90 ---

    #[test]
    fn rotate90_resets_offset_and_raises_scale() {
        // 1200x800 in a 150x100 effective frame: after a quarter turn the
        // image is 800 wide, needing 150/800 = 0.1875 to cover.
        let p = scenario().rotate90(&config());
        let t = p.transform();
        assert!((t.rotation - 90.0).abs() < TOL);
        assert!((t.scale - 0.1875).abs() < 1e-9);
        assert_eq!(t.offset(), Offset::ZERO);
        assert!(p.is_covering());
    }

    #[test]
    fn rotate90_keeps_larger_scale() {
        let p = scenario().set_scale(0.3, &config()).pan(5.0, 5.0).rotate90(&config());
        assert!((p.transform().scale - 0.3).abs() < TOL);
        assert_eq!(p.transform().offset(), Offset::ZERO);
    }

    #[test]
    fn rotate90_wraps_at_full_turn() {
        let p = scenario().rotate90(&config()).rotate90(&config()).rotate90(&config()).rotate90(&config());
        assert!(p.transform().rotation.abs() < TOL);
        assert!(p.is_covering());
    }

    #[test]
    fn rotate90_at_zoom_ceiling_stays_within_ceiling() {
        let config = config();
        // Ceiling at 90 degrees is 3 x 0.1875 = 0.5625, at 0 it is 0.375.
        let at_ceiling = scenario().rotate90(&config).set_scale(10.0, &config);
        assert!((at_ceiling.transform().scale - 0.5625).abs() < 1e-9);

        let turned = at_ceiling.rotate90(&config);
        assert!((turned.transform().scale - 0.375).abs() < 1e-9);
        assert!(turned.relative_scale() <= config.max_relative_scale + 1e-9);

        let zoomed = turned.zoom_by(config.wheel_zoom_in, &config);
        assert!(zoomed.transform().scale >= turned.transform().scale - 1e-12);
    }

    // --- set_rotation ---

    #[test]
    fn set_rotation_normalizes_and_covers() {
        let p = scenario().set_rotation(-45.0, &config());
        assert!((p.transform().rotation - 315.0).abs() < TOL);
        assert!(p.is_covering());
    }

    #[test]
    fn set_rotation_caps_scale_at_new_ceiling() {
        let config = config();
        let p = scenario().rotate90(&config).set_scale(0.5625, &config);
        let turned = p.set_rotation(0.0, &config);
        assert!((turned.transform().scale - turned.max_scale(&config)).abs() < 1e-9);
    }

    #[test]
    fn set_rotation_keeps_offset_when_possible() {
        let p = scenario().set_scale(0.3, &config()).pan(10.0, 5.0);
        let rotated = p.set_rotation(180.0, &config());
        assert!((rotated.transform().offset_x - 10.0).abs() < TOL);
        assert!((rotated.transform().offset_y - 5.0).abs() < TOL);
    }

    // --- fit ---

    #[test]
    fn fit_is_below_cover_and_centered() {
        let p = Placement::initialize(
            Dimensions::new(2000, 1000).unwrap(),
            CropFrame::new(150.0, 100.0).unwrap(),
        );
        let fitted = p.fit();
        assert!((fitted.transform().scale - 0.075).abs() < TOL);
        assert!(fitted.transform().scale < p.min_covering_scale());
        assert!(!fitted.is_covering());
        assert_eq!(fitted.transform().offset(), Offset::ZERO);
    }

    #[test]
    fn zoom_after_fit_snaps_back_to_cover() {
        let p = Placement::initialize(
            Dimensions::new(2000, 1000).unwrap(),
            CropFrame::new(150.0, 100.0).unwrap(),
        )
        .fit()
        .zoom_by(1.05, &config());
        assert!(p.is_covering());
    }

    // --- with_frame ---

    #[test]
    fn with_frame_same_ratio_keeps_state() {
        // 200x200 extends to 300x200: covering needs 0.25, so a zoom of
        // 0.3 established on the smaller frame still covers.
        let p = scenario().set_scale(0.3, &config()).pan(10.0, 0.0);
        let moved = p.with_frame(CropFrame::new(200.0, 200.0).unwrap());
        assert!((moved.transform().scale - 0.3).abs() < TOL);
        assert!(moved.is_covering());
    }

    #[test]
    fn with_frame_resets_when_scale_too_small() {
        let p = scenario().set_scale(0.2, &config()).pan(10.0, 0.0);
        let moved = p.with_frame(CropFrame::new(400.0, 400.0).unwrap());
        assert!((moved.transform().scale - 0.5).abs() < TOL);
        assert!((moved.transform().scale - moved.min_covering_scale()).abs() < TOL);
        assert_eq!(moved.transform().offset(), Offset::ZERO);
    }

    // --- restore ---

    #[test]
    fn restore_is_verbatim() {
        let t = Transform {
            scale: 0.2,
            rotation: 90.0,
            offset_x: 1e6,
            offset_y: 0.0,
        };
        let p = Placement::restore(
            Dimensions::new(1200, 800).unwrap(),
            CropFrame::new(100.0, 100.0).unwrap(),
            t,
        );
        assert_eq!(p.transform(), t);
        assert!(p.clamped().transform().offset_x < 1e6);
    }
}
