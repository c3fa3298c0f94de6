//! Argument types shared by the subcommands, and turning them into
//! engine values.

use std::path::PathBuf;
use std::str::FromStr;

use calframe_geometry::{
    CropFrame, Dimensions, EditorConfig, Offset, Placement, RenderTarget, Size, Transform,
};
use clap::{Args, ValueEnum};

/// A `WxH` pair of positive numbers, e.g. `100x150` or `12.5x9`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub width: f64,
    pub height: f64,
}

impl FromStr for Extent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (w, h) = s
            .split_once(['x', 'X'])
            .ok_or_else(|| format!("expected WxH, got: '{s}'"))?;
        let width: f64 = w
            .trim()
            .parse()
            .map_err(|e| format!("invalid width '{w}': {e}"))?;
        let height: f64 = h
            .trim()
            .parse()
            .map_err(|e| format!("invalid height '{h}': {e}"))?;
        Size::new(width, height).map_err(|e| e.to_string())?;
        Ok(Self { width, height })
    }
}

impl Extent {
    pub fn size(self) -> Result<Size, String> {
        Size::new(self.width, self.height).map_err(|e| e.to_string())
    }

    pub fn crop_frame(self) -> Result<CropFrame, String> {
        CropFrame::new(self.width, self.height).map_err(|e| e.to_string())
    }

    /// Whole-pixel dimensions; fractional sizes are rejected.
    pub fn dimensions(self) -> Result<Dimensions, String> {
        Dimensions::new(whole_pixels(self.width)?, whole_pixels(self.height)?)
            .map_err(|e| e.to_string())
    }
}

#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "checked to be a whole number within u32 range before casting"
)]
fn whole_pixels(value: f64) -> Result<u32, String> {
    if value.fract().abs() > 0.0 || !(1.0..=f64::from(u32::MAX)).contains(&value) {
        return Err(format!("pixel size must be a positive whole number, got {value}"));
    }
    Ok(value as u32)
}

/// Render surface selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Target {
    /// Interactive editor canvas (full 3:2 effective frame).
    Editor,
    /// Grid thumbnail (true crop frame).
    Thumbnail,
    /// Order confirmation view (true crop frame).
    Order,
}

impl From<Target> for RenderTarget {
    fn from(target: Target) -> Self {
        match target {
            Target::Editor => Self::EditorCanvas,
            Target::Thumbnail => Self::GridThumbnail,
            Target::Order => Self::OrderReconstruction,
        }
    }
}

/// Editor configuration flags, global to every subcommand.
#[derive(Debug, Args)]
pub struct EditorArgs {
    /// Zoom ceiling as a multiple of the covering scale.
    #[arg(long, global = true, default_value_t = EditorConfig::DEFAULT_MAX_RELATIVE_SCALE)]
    pub max_relative_scale: f64,

    /// Target print resolution in DPI.
    #[arg(long, global = true, default_value_t = EditorConfig::DEFAULT_PRINT_DPI)]
    pub print_dpi: f64,

    /// Full editor config as a JSON string.
    ///
    /// When provided, the individual config flags are ignored. Missing
    /// fields take their defaults.
    #[arg(long, global = true)]
    pub config_json: Option<String>,
}

impl EditorArgs {
    /// Build and validate the editor configuration.
    pub fn config(&self) -> Result<EditorConfig, String> {
        let config = if let Some(ref json) = self.config_json {
            serde_json::from_str(json).map_err(|e| format!("Error parsing --config-json: {e}"))?
        } else {
            EditorConfig {
                max_relative_scale: self.max_relative_scale,
                print_dpi: self.print_dpi,
                ..EditorConfig::default()
            }
        };
        config.validate().map_err(|e| e.to_string())?;
        Ok(config)
    }
}

/// How an image is positioned in its frame.
#[derive(Debug, Args)]
pub struct TransformArgs {
    /// Zoom relative to the covering scale (1.0 = exactly covering).
    #[arg(long, default_value_t = 1.0)]
    pub relative_scale: f64,

    /// Rotation in degrees, clockwise.
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    pub rotation: f64,

    /// Horizontal offset from the frame center, in frame units.
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    pub offset_x: f64,

    /// Vertical offset from the frame center, in frame units.
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    pub offset_y: f64,

    /// Fit the whole image inside the frame instead of covering it.
    #[arg(long)]
    pub fit: bool,

    /// Persisted transform JSON (`{scale, rotation, offsetX, offsetY}`),
    /// adopted verbatim. Overrides the other placement flags.
    #[arg(long)]
    pub transform_json: Option<String>,
}

/// Where the source image comes from, the frame it goes into, and how it
/// is placed.
#[derive(Debug, Args)]
pub struct PlacementArgs {
    /// Source image file; its dimensions are read from the header.
    #[arg(long, conflicts_with = "source")]
    pub image: Option<PathBuf>,

    /// Source pixel size as WxH, instead of reading an image.
    #[arg(long, required_unless_present = "image")]
    pub source: Option<Extent>,

    /// Crop frame size as WxH in design units.
    #[arg(long)]
    pub crop: Extent,

    #[command(flatten)]
    pub transform: TransformArgs,
}

impl PlacementArgs {
    /// Source dimensions from `--source` or the image header.
    pub fn source_dimensions(&self) -> Result<Dimensions, String> {
        if let Some(ref path) = self.image {
            let bytes = std::fs::read(path)
                .map_err(|e| format!("Error reading {}: {e}", path.display()))?;
            return calframe_io::read_dimensions(&bytes)
                .map_err(|e| format!("Error loading {}: {e}", path.display()));
        }
        self.source
            .ok_or_else(|| "either --image or --source is required".to_owned())?
            .dimensions()
    }

    /// Build the placement described by the flags.
    pub fn placement(&self, config: &EditorConfig) -> Result<Placement, String> {
        let source = self.source_dimensions()?;
        let frame = self.crop.crop_frame()?;
        build_placement(source, frame, &self.transform, config)
    }
}

/// Apply transform flags to a fresh covering placement.
pub fn build_placement(
    source: Dimensions,
    frame: CropFrame,
    args: &TransformArgs,
    config: &EditorConfig,
) -> Result<Placement, String> {
    if let Some(ref json) = args.transform_json {
        let transform: Transform = serde_json::from_str(json)
            .map_err(|e| format!("Error parsing --transform-json: {e}"))?;
        let placement = Placement::restore(source, frame, transform);
        if !placement.is_covering() {
            log::warn!("stored transform does not cover the frame");
        }
        return Ok(placement);
    }

    let placement = Placement::initialize(source, frame).set_rotation(args.rotation, config);
    if args.fit {
        return Ok(placement.fit());
    }
    let scale = placement.min_covering_scale() * args.relative_scale;
    let placement = placement.set_scale(scale, config);
    if (placement.relative_scale() - args.relative_scale).abs() > 1e-9 {
        log::warn!(
            "relative scale {} clamped to {:.4}",
            args.relative_scale,
            placement.relative_scale()
        );
    }
    let placement = placement.set_offset(Offset::new(args.offset_x, args.offset_y));
    let t = placement.transform();
    if (t.offset_x - args.offset_x).abs() > 1e-9 || (t.offset_y - args.offset_y).abs() > 1e-9 {
        log::warn!(
            "offset ({}, {}) clamped to ({:.4}, {:.4})",
            args.offset_x,
            args.offset_y,
            t.offset_x,
            t.offset_y
        );
    }
    Ok(placement)
}

/// Parse `#rrggbb` or `#rrggbbaa` into RGBA bytes.
pub fn parse_hex_color(s: &str) -> Result<[u8; 4], String> {
    let hex = s.strip_prefix('#').unwrap_or(s);
    if !(hex.len() == 6 || hex.len() == 8) || !hex.is_ascii() {
        return Err(format!("expected #rrggbb or #rrggbbaa, got: '{s}'"));
    }
    let byte = |i: usize| {
        u8::from_str_radix(&hex[i..i + 2], 16).map_err(|e| format!("invalid color '{s}': {e}"))
    };
    let alpha = if hex.len() == 8 { byte(6)? } else { 255 };
    Ok([byte(0)?, byte(2)?, byte(4)?, alpha])
}
