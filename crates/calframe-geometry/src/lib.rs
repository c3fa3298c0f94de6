//! calframe-geometry: Crop-frame transform and constraint engine (sans-IO).
//!
//! Maps an arbitrarily sized source image into a fixed-aspect crop frame
//! under pan, zoom, and rotation while keeping the frame fully covered:
//!
//! - [`geometry`]: effective frame, covering scale, offset limits, clamp.
//! - [`placement`]: the transform state model and its mutators.
//! - [`gesture`]: pointer/touch/wheel state machine driving a placement.
//! - [`quality`]: print-quality estimate from resolution and zoom.
//! - [`render`]: per-surface render plans that agree on the visible crop.
//! - [`snapshot`]: write-once order snapshot format.
//!
//! This crate has **no I/O dependencies** -- image decoding, draft
//! persistence, and file output live in `calframe-io` and
//! `calframe-export`.

pub mod config;
pub mod geometry;
pub mod gesture;
pub mod placement;
pub mod quality;
pub mod render;
pub mod snapshot;
pub mod types;

pub use config::EditorConfig;
pub use gesture::{CanvasController, CanvasEvent, GestureState};
pub use placement::Placement;
pub use quality::{QualityEstimate, QualityStatus, estimate_quality};
pub use render::{Affine, Rect, RenderPlan, RenderTarget, SourceRegion};
pub use snapshot::{OrderSnapshot, SnapshotEntry};
pub use types::{
    CropFrame, Dimensions, GeometryError, ImageId, Offset, Point, Size, SourceImage, Transform,
};
