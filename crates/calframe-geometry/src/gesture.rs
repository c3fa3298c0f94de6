//! Interactive canvas controller: pointer, touch, and wheel gestures as
//! an explicit finite state machine.
//!
//! The controller owns the [`Placement`] being edited and converts screen
//! pixel deltas into effective-frame units through
//! `scale_factor = display_width / effective_frame.width`.
//!
//! ```text
//!            pointer-down / 1-touch start           2-touch start
//!   Idle ─────────────────────────────────► Panning ────────────────► Pinching
//!    ▲  ◄─────────────────────────────────     │                          │
//!    │        pointer-up / touch-end           │ move: start offset +     │ move: start scale ×
//!    │        (final clamp + commit)           │       delta / factor     │       dist / start dist
//!    │                                         ▼                          │
//!    └──────────────────────────────────────────────────────────── touch-end (< 2 points)
//!   Idle ── wheel ──► Idle   (scale × 0.95 or × 1.05, clamped)
//! ```
//!
//! Every handler runs synchronously and leaves a fully clamped
//! placement behind. Gesture-start values are captured on entry to
//! `Panning`/`Pinching`, so intermediate renders cannot make the
//! gesture drift.
//!
//! Handlers return `Some(transform)` only when the transform moved by
//! more than [`TRANSFORM_EPSILON`] since the last reported value (or
//! when a pan is committed). Sub-epsilon jitter is absorbed here so a
//! "measure container, re-clamp, re-render" loop settles instead of
//! oscillating.

use crate::config::EditorConfig;
use crate::placement::Placement;
use crate::types::{CropFrame, Offset, Point, Size, Transform};

/// Smallest per-field transform change worth reporting to the caller.
pub const TRANSFORM_EPSILON: f64 = 1e-3;

/// Transient gesture state. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureState {
    /// No gesture in progress.
    Idle,
    /// A single pointer is dragging the image.
    Panning {
        /// Pointer position when the drag started.
        start_pointer: Point,
        /// Offset when the drag started.
        start_offset: Offset,
    },
    /// Two touch points are pinching to zoom.
    Pinching {
        /// Distance between the touch points when the pinch started.
        start_distance: f64,
        /// Scale when the pinch started.
        start_scale: f64,
    },
}

/// Raw input delivered by the rendering surface.
#[derive(Debug, Clone, PartialEq)]
pub enum CanvasEvent {
    /// Mouse/pen pressed at a position.
    PointerDown(Point),
    /// Mouse/pen moved to a position.
    PointerMove(Point),
    /// Mouse/pen released (or the pointer left the surface).
    PointerUp,
    /// Touches began; carries every active touch point.
    TouchStart(Vec<Point>),
    /// Touches moved; carries every active touch point.
    TouchMove(Vec<Point>),
    /// Touches ended; carries the touch points still down.
    TouchEnd(Vec<Point>),
    /// Wheel scrolled; positive `delta_y` zooms out.
    Wheel {
        /// Vertical wheel delta.
        delta_y: f64,
    },
    /// The surface was laid out at a new pixel size.
    Resize {
        /// New width in pixels.
        width: f64,
        /// New height in pixels.
        height: f64,
    },
}

/// Gesture-driven editor for one placement.
#[derive(Debug, Clone)]
pub struct CanvasController {
    placement: Placement,
    config: EditorConfig,
    display: Option<Size>,
    state: GestureState,
    last_reported: Transform,
}

impl CanvasController {
    /// Create a controller for `placement`.
    ///
    /// The display size is unknown until the first
    /// [`resize`](Self::resize); gestures before that are ignored.
    #[must_use]
    pub fn new(placement: Placement, config: EditorConfig) -> Self {
        Self {
            last_reported: placement.transform(),
            placement,
            config,
            display: None,
            state: GestureState::Idle,
        }
    }

    /// The placement as of the last handled event.
    #[must_use]
    pub const fn placement(&self) -> &Placement {
        &self.placement
    }

    /// Shortcut for `placement().transform()`.
    #[must_use]
    pub const fn transform(&self) -> Transform {
        self.placement.transform()
    }

    /// Current gesture state.
    #[must_use]
    pub const fn state(&self) -> GestureState {
        self.state
    }

    /// Last measured display size, if it was positive.
    #[must_use]
    pub const fn display_size(&self) -> Option<Size> {
        self.display
    }

    /// The configuration in use.
    #[must_use]
    pub const fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Screen pixels per effective-frame unit, or `None` before a valid
    /// resize.
    #[must_use]
    pub fn scale_factor(&self) -> Option<f64> {
        self.display
            .map(|display| display.width / self.placement.effective_frame().width)
    }

    /// Dispatch a raw event to its handler.
    pub fn handle(&mut self, event: CanvasEvent) -> Option<Transform> {
        match event {
            CanvasEvent::PointerDown(p) => self.pointer_down(p),
            CanvasEvent::PointerMove(p) => self.pointer_move(p),
            CanvasEvent::PointerUp => self.pointer_up(),
            CanvasEvent::TouchStart(points) => self.touch_start(&points),
            CanvasEvent::TouchMove(points) => self.touch_move(&points),
            CanvasEvent::TouchEnd(remaining) => self.touch_end(&remaining),
            CanvasEvent::Wheel { delta_y } => self.wheel(delta_y),
            CanvasEvent::Resize { width, height } => self.resize(width, height),
        }
    }

    /// Begin a pan at `pointer`.
    pub fn pointer_down(&mut self, pointer: Point) -> Option<Transform> {
        if self.display.is_none() {
            log::debug!("pointer-down before the first valid resize, ignoring");
            return None;
        }
        self.state = GestureState::Panning {
            start_pointer: pointer,
            start_offset: self.placement.transform().offset(),
        };
        log::trace!("idle -> panning at ({}, {})", pointer.x, pointer.y);
        None
    }

    /// Continue a pan. Ignored unless panning.
    pub fn pointer_move(&mut self, pointer: Point) -> Option<Transform> {
        let GestureState::Panning {
            start_pointer,
            start_offset,
        } = self.state
        else {
            return None;
        };
        let factor = self.scale_factor()?;
        let target = Offset::new(
            start_offset.x + (pointer.x - start_pointer.x) / factor,
            start_offset.y + (pointer.y - start_pointer.y) / factor,
        );
        self.placement = self.placement.set_offset(target);
        self.report()
    }

    /// Finish a pan with a final clamp, returning the committed transform.
    pub fn pointer_up(&mut self) -> Option<Transform> {
        if !matches!(self.state, GestureState::Panning { .. }) {
            return None;
        }
        self.state = GestureState::Idle;
        self.placement = self.placement.clamped();
        log::trace!("panning -> idle, committing");
        self.commit()
    }

    /// Touch points went down.
    ///
    /// One point starts a pan; two or more start a pinch using the
    /// first two points.
    pub fn touch_start(&mut self, points: &[Point]) -> Option<Transform> {
        match points {
            [] => None,
            [single] => self.pointer_down(*single),
            [a, b, ..] => {
                if self.display.is_none() {
                    log::debug!("pinch before the first valid resize, ignoring");
                    return None;
                }
                let start_distance = a.distance(*b);
                if start_distance <= f64::EPSILON {
                    return None;
                }
                self.state = GestureState::Pinching {
                    start_distance,
                    start_scale: self.placement.transform().scale,
                };
                log::trace!("-> pinching, start distance {start_distance}");
                None
            }
        }
    }

    /// Touch points moved.
    pub fn touch_move(&mut self, points: &[Point]) -> Option<Transform> {
        match (self.state, points) {
            (
                GestureState::Pinching {
                    start_distance,
                    start_scale,
                },
                [a, b, ..],
            ) => {
                let ratio = a.distance(*b) / start_distance;
                self.placement = self
                    .placement
                    .set_scale(start_scale * ratio, &self.config);
                self.report()
            }
            (GestureState::Panning { .. }, [single]) => self.pointer_move(*single),
            _ => None,
        }
    }

    /// Touch points lifted; `remaining` are still down.
    pub fn touch_end(&mut self, remaining: &[Point]) -> Option<Transform> {
        match self.state {
            GestureState::Pinching { .. } if remaining.len() < 2 => {
                self.state = GestureState::Idle;
                log::trace!("pinching -> idle");
                self.commit()
            }
            GestureState::Panning { .. } if remaining.is_empty() => self.pointer_up(),
            _ => None,
        }
    }

    /// One wheel step: zoom out for positive `delta_y`, in otherwise.
    ///
    /// Ignored while a drag or pinch is active.
    pub fn wheel(&mut self, delta_y: f64) -> Option<Transform> {
        if self.state != GestureState::Idle || self.display.is_none() {
            return None;
        }
        let factor = if delta_y > 0.0 {
            self.config.wheel_zoom_out
        } else {
            self.config.wheel_zoom_in
        };
        self.placement = self.placement.zoom_by(factor, &self.config);
        self.report()
    }

    /// The surface has a new pixel size.
    ///
    /// Non-positive sizes (a surface not laid out yet) clear the display
    /// size so later gestures no-op. The offset is re-clamped either way.
    pub fn resize(&mut self, width: f64, height: f64) -> Option<Transform> {
        let size = Size { width, height };
        self.display = (size.is_positive() && size.width.is_finite() && size.height.is_finite())
            .then_some(size);
        if self.display.is_none() {
            log::debug!("ignoring non-positive display size {width}x{height}");
        }
        self.placement = self.placement.clamped();
        self.report()
    }

    /// Apply a toolbar action (fill, fit, rotate, ...) to the placement.
    ///
    /// Any gesture in progress is abandoned so its start values cannot
    /// overwrite the action.
    pub fn apply(&mut self, action: impl FnOnce(&Placement) -> Placement) -> Option<Transform> {
        self.state = GestureState::Idle;
        self.placement = action(&self.placement);
        self.report()
    }

    /// Replace the crop frame (template change or slot switch).
    pub fn set_frame(&mut self, frame: CropFrame) -> Option<Transform> {
        self.apply(|p| p.with_frame(frame))
    }

    fn report(&mut self) -> Option<Transform> {
        let current = self.placement.transform();
        if current.approx_eq(&self.last_reported, TRANSFORM_EPSILON) {
            return None;
        }
        self.last_reported = current;
        Some(current)
    }

    fn commit(&mut self) -> Option<Transform> {
        let current = self.placement.transform();
        self.last_reported = current;
        Some(current)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::Dimensions;

    const TOL: f64 = 1e-9;

    /// 1200x800 image in a 100x100 slot (150x100 effective), displayed
    /// at 300x200 pixels: 2 px per frame unit.
    fn controller() -> CanvasController {
        let placement = Placement::initialize(
            Dimensions::new(1200, 800).unwrap(),
            CropFrame::new(100.0, 100.0).unwrap(),
        );
        let mut c = CanvasController::new(placement, EditorConfig::default());
        c.resize(300.0, 200.0);
        c
    }

    fn zoomed_controller() -> CanvasController {
        let mut c = controller();
        c.apply(|p| p.set_scale(0.1875, &EditorConfig::default()));
        c
    }

    #[test]
    fn scale_factor_from_display() {
        let c = controller();
        assert!((c.scale_factor().unwrap() - 2.0).abs() < TOL);
    }

    #[test]
    fn gestures_before_resize_are_ignored() {
        let placement = Placement::initialize(
            Dimensions::new(1200, 800).unwrap(),
            CropFrame::new(100.0, 100.0).unwrap(),
        );
        let mut c = CanvasController::new(placement, EditorConfig::default());
        assert!(c.pointer_down(Point::new(10.0, 10.0)).is_none());
        assert_eq!(c.state(), GestureState::Idle);
        assert!(c.wheel(-1.0).is_none());
        assert!((c.transform().scale - 0.125).abs() < TOL);
    }

    #[test]
    fn zero_resize_disables_gestures() {
        let mut c = zoomed_controller();
        c.resize(0.0, 0.0);
        assert!(c.scale_factor().is_none());
        c.pointer_down(Point::new(0.0, 0.0));
        assert_eq!(c.state(), GestureState::Idle);
    }

    #[test]
    fn pan_converts_pixels_to_frame_units() {
        let mut c = zoomed_controller();
        c.pointer_down(Point::new(100.0, 100.0));
        let update = c.pointer_move(Point::new(120.0, 110.0)).unwrap();
        assert!((update.offset_x - 10.0).abs() < TOL);
        assert!((update.offset_y - 5.0).abs() < TOL);
    }

    #[test]
    fn pan_is_relative_to_gesture_start() {
        let mut c = zoomed_controller();
        c.pointer_down(Point::new(0.0, 0.0));
        c.pointer_move(Point::new(40.0, 0.0));
        c.pointer_move(Point::new(10.0, 0.0));
        assert!((c.transform().offset_x - 5.0).abs() < TOL);
    }

    #[test]
    fn pan_clamps_to_limits() {
        let mut c = zoomed_controller();
        c.pointer_down(Point::new(0.0, 0.0));
        c.pointer_move(Point::new(1000.0, -1000.0));
        let t = c.transform();
        assert!((t.offset_x - 37.5).abs() < TOL);
        assert!((t.offset_y + 25.0).abs() < TOL);
    }

    #[test]
    fn pointer_up_commits_and_returns_to_idle() {
        let mut c = zoomed_controller();
        c.pointer_down(Point::new(0.0, 0.0));
        c.pointer_move(Point::new(20.0, 0.0));
        let committed = c.pointer_up().unwrap();
        assert_eq!(c.state(), GestureState::Idle);
        assert!((committed.offset_x - 10.0).abs() < TOL);
        assert!(c.pointer_up().is_none());
    }

    #[test]
    fn move_without_down_is_ignored() {
        let mut c = zoomed_controller();
        assert!(c.pointer_move(Point::new(50.0, 50.0)).is_none());
        assert_eq!(c.transform().offset(), Offset::ZERO);
    }

    #[test]
    fn sub_epsilon_moves_are_not_reported() {
        let mut c = zoomed_controller();
        c.pointer_down(Point::new(0.0, 0.0));
        assert!(c.pointer_move(Point::new(0.001, 0.0)).is_none());
        assert!(c.pointer_move(Point::new(4.0, 0.0)).is_some());
    }

    #[test]
    fn pinch_scales_from_start() {
        let mut c = controller();
        c.touch_start(&[Point::new(0.0, 0.0), Point::new(100.0, 0.0)]);
        assert!(matches!(c.state(), GestureState::Pinching { .. }));
        let update = c
            .touch_move(&[Point::new(0.0, 0.0), Point::new(150.0, 0.0)])
            .unwrap();
        assert!((update.scale - 0.1875).abs() < TOL);
    }

    #[test]
    fn pinch_clamps_to_ceiling_and_floor() {
        let mut c = controller();
        c.touch_start(&[Point::new(0.0, 0.0), Point::new(10.0, 0.0)]);
        c.touch_move(&[Point::new(0.0, 0.0), Point::new(1000.0, 0.0)]);
        assert!((c.transform().scale - 0.375).abs() < TOL);
        c.touch_move(&[Point::new(0.0, 0.0), Point::new(1.0, 0.0)]);
        assert!((c.transform().scale - 0.125).abs() < TOL);
    }

    #[test]
    fn pinch_ends_when_fewer_than_two_points_remain() {
        let mut c = controller();
        c.touch_start(&[Point::new(0.0, 0.0), Point::new(10.0, 0.0)]);
        c.touch_end(&[Point::new(0.0, 0.0)]);
        assert_eq!(c.state(), GestureState::Idle);
    }

    #[test]
    fn second_finger_switches_pan_to_pinch() {
        let mut c = zoomed_controller();
        c.touch_start(&[Point::new(0.0, 0.0)]);
        assert!(matches!(c.state(), GestureState::Panning { .. }));
        c.touch_start(&[Point::new(0.0, 0.0), Point::new(50.0, 0.0)]);
        assert!(matches!(c.state(), GestureState::Pinching { .. }));
    }

    #[test]
    fn single_touch_pans() {
        let mut c = zoomed_controller();
        c.touch_start(&[Point::new(0.0, 0.0)]);
        c.touch_move(&[Point::new(0.0, 20.0)]);
        assert!((c.transform().offset_y - 10.0).abs() < TOL);
        c.touch_end(&[]);
        assert_eq!(c.state(), GestureState::Idle);
    }

    #[test]
    fn wheel_zooms_in_and_out() {
        let mut c = controller();
        let zoomed_in = c.wheel(-120.0).unwrap();
        assert!((zoomed_in.scale - 0.125 * 1.05).abs() < TOL);
        c.wheel(-120.0);
        c.wheel(120.0);
        assert!((c.transform().scale - 0.125 * 1.05 * 1.05 * 0.95).abs() < TOL);
        // Cannot zoom below cover.
        c.wheel(120.0);
        c.wheel(120.0);
        c.wheel(120.0);
        assert!((c.transform().scale - 0.125).abs() < TOL);
    }

    #[test]
    fn wheel_ignored_during_pan() {
        let mut c = zoomed_controller();
        c.pointer_down(Point::new(0.0, 0.0));
        assert!(c.wheel(-1.0).is_none());
        assert!((c.transform().scale - 0.1875).abs() < TOL);
    }

    #[test]
    fn resize_changes_factor_not_transform() {
        let mut c = zoomed_controller();
        c.pointer_down(Point::new(0.0, 0.0));
        c.pointer_move(Point::new(20.0, 0.0));
        c.pointer_up();
        let before = c.transform();
        assert!(c.resize(600.0, 400.0).is_none());
        assert_eq!(c.transform(), before);
        assert!((c.scale_factor().unwrap() - 4.0).abs() < TOL);
    }

    #[test]
    fn handle_dispatches_events() {
        let mut c = zoomed_controller();
        c.handle(CanvasEvent::PointerDown(Point::new(0.0, 0.0)));
        c.handle(CanvasEvent::PointerMove(Point::new(-20.0, 0.0)));
        let committed = c.handle(CanvasEvent::PointerUp).unwrap();
        assert!((committed.offset_x + 10.0).abs() < TOL);
        c.handle(CanvasEvent::Wheel { delta_y: -1.0 });
        assert!(c.transform().scale > 0.1875);
    }

    #[test]
    fn apply_abandons_gesture() {
        let mut c = zoomed_controller();
        c.pointer_down(Point::new(0.0, 0.0));
        let update = c.apply(|p| p.rotate90(&EditorConfig::default())).unwrap();
        assert_eq!(c.state(), GestureState::Idle);
        assert!((update.rotation - 90.0).abs() < TOL);
    }

    #[test]
    fn wheel_after_rotating_at_ceiling_never_shrinks() {
        let config = EditorConfig::default();
        let mut c = controller();
        c.apply(|p| p.rotate90(&config).set_scale(f64::MAX, &config));
        c.apply(|p| p.rotate90(&config));
        let before = c.transform().scale;
        assert!(c.placement().relative_scale() <= config.max_relative_scale + TOL);

        c.wheel(-1.0);
        assert!(c.transform().scale >= before - TOL);
    }

    #[test]
    fn set_frame_reclamps() {
        let mut c = zoomed_controller();
        c.set_frame(CropFrame::new(400.0, 400.0).unwrap());
        assert!(c.placement().is_covering());
        assert_eq!(c.transform().offset(), Offset::ZERO);
    }
}
