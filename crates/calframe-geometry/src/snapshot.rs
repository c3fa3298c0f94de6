//! Write-once order snapshot.
//!
//! At checkout every placed image is frozen into a [`SnapshotEntry`]
//! carrying everything needed to redraw it later: the transform plus
//! the source and crop dimensions it was computed against. The order
//! view never consults the live draft or re-reads the image header.

use serde::{Deserialize, Serialize};

use crate::placement::Placement;
use crate::render::{RenderPlan, RenderTarget};
use crate::types::{CropFrame, Dimensions, GeometryError, ImageId, Size, Transform};

/// Snapshot format version written by this crate.
pub const SNAPSHOT_VERSION: u32 = 1;

/// One placed image as frozen at order time.
///
/// Serialized as
/// `{slotId, imageId, transform, sourceWidth, sourceHeight, cropWidth, cropHeight}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotEntry {
    /// Template slot the image was placed in.
    pub slot_id: String,
    /// Identifier of the source image.
    pub image_id: ImageId,
    /// Transform exactly as persisted.
    pub transform: Transform,
    /// Source width in pixels.
    pub source_width: u32,
    /// Source height in pixels.
    pub source_height: u32,
    /// Crop frame width in design units.
    pub crop_width: f64,
    /// Crop frame height in design units.
    pub crop_height: f64,
}

impl SnapshotEntry {
    /// Freeze a live placement.
    #[must_use]
    pub fn from_placement(
        slot_id: impl Into<String>,
        image_id: ImageId,
        placement: &Placement,
    ) -> Self {
        let source = placement.source();
        let frame = placement.frame();
        Self {
            slot_id: slot_id.into(),
            image_id,
            transform: placement.transform(),
            source_width: source.width,
            source_height: source.height,
            crop_width: frame.width(),
            crop_height: frame.height(),
        }
    }

    /// Source dimensions recorded in the entry.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::InvalidDimensions`] if a side is zero.
    pub fn source(&self) -> Result<Dimensions, GeometryError> {
        Dimensions::new(self.source_width, self.source_height)
    }

    /// Crop frame recorded in the entry.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::InvalidDimensions`] for a degenerate frame.
    pub fn frame(&self) -> Result<CropFrame, GeometryError> {
        CropFrame::new(self.crop_width, self.crop_height)
    }

    /// Rebuild the placement verbatim (no re-clamping).
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::InvalidDimensions`] when the recorded
    /// source or crop dimensions are invalid.
    pub fn placement(&self) -> Result<Placement, GeometryError> {
        Ok(Placement::restore(self.source()?, self.frame()?, self.transform))
    }

    /// Render plan for the order view inside `container`.
    ///
    /// `Ok(None)` when the container has no area yet.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::InvalidDimensions`] when the recorded
    /// source or crop dimensions are invalid.
    pub fn plan(&self, container: Size) -> Result<Option<RenderPlan>, GeometryError> {
        Ok(RenderPlan::new(
            self.source()?,
            self.frame()?,
            self.transform,
            RenderTarget::OrderReconstruction,
            container,
        ))
    }
}

/// All placed images of one order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSnapshot {
    /// Format version, [`SNAPSHOT_VERSION`] when written by this crate.
    pub version: u32,
    /// Template the draft was built from.
    pub template_id: String,
    /// One entry per filled slot, in slot order.
    pub entries: Vec<SnapshotEntry>,
}

impl OrderSnapshot {
    /// Create a snapshot at the current format version.
    #[must_use]
    pub fn new(template_id: impl Into<String>, entries: Vec<SnapshotEntry>) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            template_id: template_id.into(),
            entries,
        }
    }

    /// Entry for `slot_id`, if that slot was filled.
    #[must_use]
    pub fn entry(&self, slot_id: &str) -> Option<&SnapshotEntry> {
        self.entries.iter().find(|e| e.slot_id == slot_id)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::EditorConfig;

    fn placement() -> Placement {
        Placement::initialize(
            Dimensions::new(1200, 800).unwrap(),
            CropFrame::new(100.0, 100.0).unwrap(),
        )
        .set_scale(0.1875, &EditorConfig::default())
        .pan(10.0, -5.0)
    }

    #[test]
    fn entry_serializes_camel_case() {
        let entry = SnapshotEntry::from_placement("jan", ImageId::new("img-1"), &placement());
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["slotId"], "jan");
        assert_eq!(value["imageId"], "img-1");
        assert_eq!(value["sourceWidth"], 1200);
        assert_eq!(value["sourceHeight"], 800);
        assert_eq!(value["cropWidth"], 100.0);
        assert_eq!(value["cropHeight"], 100.0);
        assert_eq!(value["transform"]["offsetX"], 10.0);
        assert_eq!(value["transform"]["offsetY"], -5.0);
    }

    #[test]
    fn entry_round_trips_exactly() {
        let p = placement().set_rotation(33.3, &EditorConfig::default());
        let entry = SnapshotEntry::from_placement("feb", ImageId::new("x"), &p);
        let json = serde_json::to_string(&entry).unwrap();
        let back: SnapshotEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(back, entry);
        assert_eq!(back.placement().unwrap(), p);
    }

    #[test]
    fn reconstruction_matches_live_thumbnail() {
        let p = placement();
        let entry = SnapshotEntry::from_placement("mar", ImageId::new("x"), &p);
        let container = Size::new(240.0, 240.0).unwrap();

        let live = RenderPlan::for_placement(&p, RenderTarget::GridThumbnail, container)
            .unwrap()
            .visible_source_region()
            .unwrap();
        let rebuilt = entry
            .plan(container)
            .unwrap()
            .unwrap()
            .visible_source_region()
            .unwrap();
        assert_eq!(live, rebuilt);
    }

    #[test]
    fn degenerate_entry_is_rejected() {
        let mut entry = SnapshotEntry::from_placement("apr", ImageId::new("x"), &placement());
        entry.source_width = 0;
        assert!(entry.placement().is_err());
        entry.source_width = 1200;
        entry.crop_height = -1.0;
        assert!(entry.plan(Size::new(10.0, 10.0).unwrap()).is_err());
    }

    #[test]
    fn empty_container_is_not_an_error() {
        let entry = SnapshotEntry::from_placement("may", ImageId::new("x"), &placement());
        let plan = entry
            .plan(Size {
                width: 0.0,
                height: 0.0,
            })
            .unwrap();
        assert!(plan.is_none());
    }

    #[test]
    fn order_lookup_by_slot() {
        let p = placement();
        let snapshot = OrderSnapshot::new(
            "classic-12",
            vec![
                SnapshotEntry::from_placement("jan", ImageId::new("a"), &p),
                SnapshotEntry::from_placement("feb", ImageId::new("b"), &p),
            ],
        );
        assert_eq!(snapshot.version, SNAPSHOT_VERSION);
        assert_eq!(snapshot.entry("feb").unwrap().image_id.as_str(), "b");
        assert!(snapshot.entry("dec").is_none());
    }
}
