//! Print quality estimation from source resolution and zoom.
//!
//! The covering scale already spends "enough" source pixels on the
//! frame by definition; every step of zoom past it discards source
//! pixels. Effective DPI therefore falls as `1 / relative_scale`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::EditorConfig;
use crate::geometry;
use crate::types::{CropFrame, Dimensions, Size, Transform};

/// Coarse print-quality verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityStatus {
    /// At least 90% of the target DPI.
    Good,
    /// At least 60% of the target DPI.
    Acceptable,
    /// Below 60% of the target DPI; the print may look soft.
    Low,
}

impl QualityStatus {
    /// Short user-facing label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Good => "Good quality",
            Self::Acceptable => "Acceptable quality",
            Self::Low => "Low quality",
        }
    }
}

impl fmt::Display for QualityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Result of [`estimate_quality`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualityEstimate {
    /// Source pixels per printed inch at the current zoom.
    pub effective_dpi: f64,
    /// `0..=10`, proportional to `effective_dpi / print_dpi`.
    pub quality_score: u8,
    /// Threshold verdict.
    pub status: QualityStatus,
}

/// Reference print size for a source aspect: the source contain-fitted
/// into the configured 6"×9" reference rectangle, turned so its long side
/// runs along the long side of the source.
///
/// A photo and its quarter-turned twin therefore get the same print size
/// and the same effective DPI.
#[must_use]
pub fn reference_print_size(source: Dimensions, config: &EditorConfig) -> Size {
    let long = config.reference_print_long_in;
    let short = config.reference_print_short_in;
    let reference = if source.height > source.width {
        Size {
            width: short,
            height: long,
        }
    } else {
        Size {
            width: long,
            height: short,
        }
    };
    geometry::contain_size(source.to_size(), reference)
}

/// Estimate print quality for `source` placed with `transform` in `frame`.
#[must_use]
pub fn estimate_quality(
    source: Dimensions,
    transform: &Transform,
    frame: CropFrame,
    config: &EditorConfig,
) -> QualityEstimate {
    let min_scale = geometry::covering_scale_for(
        source.to_size(),
        transform.rotation,
        frame.effective(),
    );
    let relative_scale = transform.scale / min_scale;

    let print = reference_print_size(source, config);
    let base_dpi =
        (f64::from(source.width) / print.width).min(f64::from(source.height) / print.height);
    let effective_dpi = base_dpi / relative_scale;

    let ratio = (effective_dpi / config.print_dpi).clamp(0.0, 1.0);
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "ratio is clamped to [0, 1], so the rounded score is in 0..=10"
    )]
    let quality_score = (ratio * 10.0).round() as u8;

    let status = if effective_dpi >= 0.9 * config.print_dpi {
        QualityStatus::Good
    } else if effective_dpi >= 0.6 * config.print_dpi {
        QualityStatus::Acceptable
    } else {
        QualityStatus::Low
    };

    QualityEstimate {
        effective_dpi,
        quality_score,
        status,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::placement::Placement;

    fn estimate(w: u32, h: u32, relative: f64) -> QualityEstimate {
        let source = Dimensions::new(w, h).unwrap();
        let frame = CropFrame::new(100.0, 100.0).unwrap();
        let p = Placement::initialize(source, frame);
        let t = Transform {
            scale: p.transform().scale * relative,
            ..p.transform()
        };
        estimate_quality(source, &t, frame, &EditorConfig::default())
    }

    #[test]
    fn reference_print_for_three_two_source_is_nine_by_six() {
        let print = reference_print_size(
            Dimensions::new(1200, 800).unwrap(),
            &EditorConfig::default(),
        );
        assert!((print.width - 9.0).abs() < 1e-12);
        assert!((print.height - 6.0).abs() < 1e-12);
    }

    #[test]
    fn reference_print_for_portrait_source_is_six_by_nine() {
        let print = reference_print_size(
            Dimensions::new(800, 1200).unwrap(),
            &EditorConfig::default(),
        );
        assert!((print.width - 6.0).abs() < 1e-12);
        assert!((print.height - 9.0).abs() < 1e-12);
    }

    #[test]
    fn reference_print_for_tall_source_is_height_bound() {
        let print = reference_print_size(
            Dimensions::new(1000, 2000).unwrap(),
            &EditorConfig::default(),
        );
        assert!((print.height - 9.0).abs() < 1e-12);
        assert!((print.width - 4.5).abs() < 1e-12);
    }

    #[test]
    fn orientation_does_not_change_effective_dpi() {
        let landscape = estimate(3600, 2400, 1.0);
        let portrait = estimate(2400, 3600, 1.0);
        assert!((landscape.effective_dpi - 400.0).abs() < 1e-9);
        assert!((portrait.effective_dpi - landscape.effective_dpi).abs() < 1e-9);
        assert_eq!(portrait.quality_score, landscape.quality_score);

        let zoomed_landscape = estimate(3600, 2400, 1.5);
        let zoomed_portrait = estimate(2400, 3600, 1.5);
        assert!((zoomed_portrait.effective_dpi - zoomed_landscape.effective_dpi).abs() < 1e-9);
    }

    #[test]
    fn high_resolution_source_is_good() {
        let q = estimate(5400, 3600, 1.0);
        assert!((q.effective_dpi - 600.0).abs() < 1e-9);
        assert_eq!(q.quality_score, 10);
        assert_eq!(q.status, QualityStatus::Good);
    }

    #[test]
    fn zoom_halves_effective_dpi() {
        let q = estimate(5400, 3600, 2.0);
        assert!((q.effective_dpi - 300.0).abs() < 1e-9);
        assert_eq!(q.status, QualityStatus::Good);
    }

    #[test]
    fn thresholds() {
        // 2700x1800 at 9x6 in = 300 dpi at cover.
        assert_eq!(estimate(2700, 1800, 1.0).status, QualityStatus::Good);
        // 300 / 1.2 = 250 dpi (>= 270? no; >= 180 yes).
        assert_eq!(estimate(2700, 1800, 1.2).status, QualityStatus::Acceptable);
        // 300 / 2 = 150 dpi.
        let low = estimate(2700, 1800, 2.0);
        assert_eq!(low.status, QualityStatus::Low);
        assert_eq!(low.quality_score, 5);
    }

    #[test]
    fn small_source_scenario() {
        // 1200x800 at 9x6 in is 133.3 dpi.
        let q = estimate(1200, 800, 1.0);
        assert!((q.effective_dpi - 1200.0 / 9.0).abs() < 1e-9);
        assert_eq!(q.quality_score, 4);
        assert_eq!(q.status, QualityStatus::Low);
    }

    #[test]
    fn quality_never_increases_with_zoom() {
        let mut prev = u8::MAX;
        for step in 0..=20 {
            let q = estimate(3000, 2000, 1.0 + f64::from(step) * 0.1);
            assert!(q.quality_score <= prev);
            prev = q.quality_score;
        }
    }

    #[test]
    fn status_labels() {
        assert_eq!(QualityStatus::Good.to_string(), "Good quality");
        assert_eq!(QualityStatus::Low.label(), "Low quality");
    }

    #[test]
    fn estimate_serializes_status_snake_case() {
        let q = estimate(2700, 1800, 1.2);
        let json = serde_json::to_string(&q).unwrap();
        assert!(json.contains(r#""status":"acceptable""#));
    }
}
