//! calframe-export: Pure serializers for render plans (sans-IO)
//!
//! Turns a [`RenderPlan`](calframe_geometry::RenderPlan) into output
//! files that show exactly the crop the editor showed. Supports SVG
//! (image reference plus transform matrix) and raster composition.

pub mod raster;
pub mod svg;

pub use raster::{ExportError, RasterOptions, render_raster};
pub use svg::{SvgMetadata, to_svg};
