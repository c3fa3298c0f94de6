//! Editor configuration: zoom limits, wheel step, and print reference.

use serde::{Deserialize, Serialize};

use crate::types::GeometryError;

/// Tunable parameters of the transform engine.
///
/// All parameters have defaults matching the storefront editor. The
/// configuration is plain data so it can be loaded from JSON (for
/// example via the CLI's `--config-json`) and checked with
/// [`validate`](Self::validate).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Zoom ceiling as a multiple of the minimum covering scale.
    pub max_relative_scale: f64,

    /// Scale multiplier for one wheel notch towards the user
    /// (`deltaY < 0`, zoom in).
    pub wheel_zoom_in: f64,

    /// Scale multiplier for one wheel notch away from the user
    /// (`deltaY > 0`, zoom out).
    pub wheel_zoom_out: f64,

    /// Target print resolution in dots per inch.
    pub print_dpi: f64,

    /// Long side of the reference print rectangle, in inches.
    pub reference_print_long_in: f64,

    /// Short side of the reference print rectangle, in inches.
    pub reference_print_short_in: f64,
}

impl EditorConfig {
    /// Default zoom ceiling relative to the covering scale.
    pub const DEFAULT_MAX_RELATIVE_SCALE: f64 = 3.0;
    /// Default wheel zoom-in step.
    pub const DEFAULT_WHEEL_ZOOM_IN: f64 = 1.05;
    /// Default wheel zoom-out step.
    pub const DEFAULT_WHEEL_ZOOM_OUT: f64 = 0.95;
    /// Default print resolution.
    pub const DEFAULT_PRINT_DPI: f64 = 300.0;
    /// Default reference print long side (9 inches).
    pub const DEFAULT_REFERENCE_PRINT_LONG_IN: f64 = 9.0;
    /// Default reference print short side (6 inches).
    pub const DEFAULT_REFERENCE_PRINT_SHORT_IN: f64 = 6.0;

    /// Check every invariant the engine relies on.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::InvalidConfig`] describing the first
    /// violated invariant.
    pub fn validate(&self) -> Result<(), GeometryError> {
        let finite_positive = |name: &str, value: f64| {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(GeometryError::InvalidConfig(format!(
                    "{name} must be positive and finite, got {value}"
                )))
            }
        };

        finite_positive("max_relative_scale", self.max_relative_scale)?;
        finite_positive("wheel_zoom_in", self.wheel_zoom_in)?;
        finite_positive("wheel_zoom_out", self.wheel_zoom_out)?;
        finite_positive("print_dpi", self.print_dpi)?;
        finite_positive("reference_print_long_in", self.reference_print_long_in)?;
        finite_positive("reference_print_short_in", self.reference_print_short_in)?;

        if self.max_relative_scale < 1.0 {
            return Err(GeometryError::InvalidConfig(format!(
                "max_relative_scale must be at least 1.0, got {}",
                self.max_relative_scale
            )));
        }
        if self.wheel_zoom_in <= 1.0 {
            return Err(GeometryError::InvalidConfig(format!(
                "wheel_zoom_in must be greater than 1.0, got {}",
                self.wheel_zoom_in
            )));
        }
        if self.wheel_zoom_out >= 1.0 {
            return Err(GeometryError::InvalidConfig(format!(
                "wheel_zoom_out must be less than 1.0, got {}",
                self.wheel_zoom_out
            )));
        }
        if self.reference_print_short_in > self.reference_print_long_in {
            return Err(GeometryError::InvalidConfig(format!(
                "reference print short side ({}) exceeds long side ({})",
                self.reference_print_short_in, self.reference_print_long_in
            )));
        }
        Ok(())
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            max_relative_scale: Self::DEFAULT_MAX_RELATIVE_SCALE,
            wheel_zoom_in: Self::DEFAULT_WHEEL_ZOOM_IN,
            wheel_zoom_out: Self::DEFAULT_WHEEL_ZOOM_OUT,
            print_dpi: Self::DEFAULT_PRINT_DPI,
            reference_print_long_in: Self::DEFAULT_REFERENCE_PRINT_LONG_IN,
            reference_print_short_in: Self::DEFAULT_REFERENCE_PRINT_SHORT_IN,
        }
    }
}
