//! Geometry kernel: rotated bounds, covering/fitting scales, the
//! canonical 3:2 effective frame, and offset clamping.
//!
//! Every consumer (editor canvas, gesture handling, fill/fit actions,
//! quality estimation, thumbnail and order rendering) goes through these
//! functions. Re-deriving any of them elsewhere is how the editor and the
//! final render drift apart.
//!
//! All angles are degrees; radians only appear inside trig calls.
//!
//! Inputs must have strictly positive extents. Callers validate through
//! [`Size::new`] / [`Dimensions::new`](crate::Dimensions::new) before
//! reaching the kernel; behavior on degenerate input is unspecified.

use crate::types::{Offset, Size};

/// Canonical aspect ratio (width / height) of the editor viewport.
pub const EDITOR_ASPECT: f64 = 3.0 / 2.0;

/// Relative tolerance when deciding that a scale sits at the covering
/// minimum, absorbing floating-point jitter from repeated multiply/divide.
pub const COVER_EPSILON: f64 = 1e-4;

/// Below this half-slack (effective-frame units) an axis is treated as
/// having no room to move, and its offset is pinned to exactly zero.
pub const AXIS_SLACK_EPSILON: f64 = 1e-6;

/// Axis-aligned bounding box of a `size` rectangle rotated about its
/// center by `rotation_deg`.
#[must_use]
pub fn rotated_bounds(size: Size, rotation_deg: f64) -> Size {
    let theta = rotation_deg.to_radians();
    let cos = theta.cos().abs();
    let sin = theta.sin().abs();
    Size {
        width: size.width.mul_add(cos, size.height * sin),
        height: size.width.mul_add(sin, size.height * cos),
    }
}

/// Extend a crop frame to the canonical 3:2 aspect.
///
/// Frames already wider than 3:2 keep their width and grow in height;
/// all others keep their height and grow in width. The result always
/// contains `crop`.
#[must_use]
pub fn effective_frame(crop: Size) -> Size {
    if crop.width / crop.height > EDITOR_ASPECT {
        Size {
            width: crop.width,
            height: crop.width / EDITOR_ASPECT,
        }
    } else {
        Size {
            width: crop.height * EDITOR_ASPECT,
            height: crop.height,
        }
    }
}

/// Smallest scale at which `rotated` covers `frame` with no gap
/// (`background-size: cover`).
#[must_use]
pub fn min_covering_scale(rotated: Size, frame: Size) -> f64 {
    if rotated.aspect() > frame.aspect() {
        frame.height / rotated.height
    } else {
        frame.width / rotated.width
    }
}

/// Largest scale at which `rotated` fits entirely inside `frame`
/// (`background-size: contain`).
///
/// Only the "Fit" action uses this; it deliberately lets the frame
/// background show.
#[must_use]
pub fn min_fit_scale(rotated: Size, frame: Size) -> f64 {
    if rotated.aspect() > frame.aspect() {
        frame.width / rotated.width
    } else {
        frame.height / rotated.height
    }
}

/// `content` resized (aspect preserved) to exactly cover `frame`.
#[must_use]
pub fn cover_size(content: Size, frame: Size) -> Size {
    if content.aspect() > frame.aspect() {
        Size {
            width: frame.height * content.aspect(),
            height: frame.height,
        }
    } else {
        Size {
            width: frame.width,
            height: frame.width / content.aspect(),
        }
    }
}

/// `content` resized (aspect preserved) to fit entirely inside `frame`.
#[must_use]
pub fn contain_size(content: Size, frame: Size) -> Size {
    if content.aspect() > frame.aspect() {
        Size {
            width: frame.width,
            height: frame.width / content.aspect(),
        }
    } else {
        Size {
            width: frame.height * content.aspect(),
            height: frame.height,
        }
    }
}

/// Minimum covering scale for a source image at a rotation against an
/// already-effective frame.
#[must_use]
pub fn covering_scale_for(source: Size, rotation_deg: f64, frame: Size) -> f64 {
    min_covering_scale(rotated_bounds(source, rotation_deg), frame)
}

/// Maximum absolute offset on each axis that keeps the image covering
/// `frame`.
///
/// The displayed size is the rotated source's cover size against the
/// frame, multiplied by `scale / min_covering_scale`. Each component of
/// the result is half the slack on that axis, or exactly `0.0` when the
/// slack is negligible. At (or within [`COVER_EPSILON`] of) the covering
/// minimum both components are zero.
///
/// Never decreases as `scale` grows.
#[must_use]
pub fn offset_limits(scale: f64, source: Size, rotation_deg: f64, frame: Size) -> Offset {
    let rotated = rotated_bounds(source, rotation_deg);
    let min_scale = min_covering_scale(rotated, frame);
    if scale <= min_scale * (1.0 + COVER_EPSILON) {
        return Offset::ZERO;
    }

    let normalized = scale / min_scale;
    let scaled = cover_size(rotated, frame).scaled(normalized);

    let half_slack = |extent: f64, bound: f64| {
        let slack = (extent - bound) / 2.0;
        if slack < AXIS_SLACK_EPSILON { 0.0 } else { slack }
    };

    Offset {
        x: half_slack(scaled.width, frame.width),
        y: half_slack(scaled.height, frame.height),
    }
}

/// Clamp `offset` so the rotated, scaled image still covers `frame`.
///
/// Idempotent: clamping an already-clamped offset returns it unchanged.
/// Axes without slack are forced to exactly `0.0`.
#[must_use]
pub fn clamp_offset(
    offset: Offset,
    scale: f64,
    source: Size,
    rotation_deg: f64,
    frame: Size,
) -> Offset {
    let limits = offset_limits(scale, source, rotation_deg, frame);
    let clamp_axis = |value: f64, max: f64| {
        if max <= 0.0 {
            0.0
        } else {
            value.clamp(-max, max)
        }
    };
    Offset {
        x: clamp_axis(offset.x, limits.x),
        y: clamp_axis(offset.y, limits.y),
    }
}

/// Normalize an angle into `[0, 360)` degrees.
#[must_use]
pub fn normalize_rotation(rotation_deg: f64) -> f64 {
    let r = rotation_deg.rem_euclid(360.0);
    // rem_euclid can return exactly 360.0 for tiny negative inputs.
    if r >= 360.0 { 0.0 } else { r }
}
