//! Shared types for the calframe geometry engine.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A width/height pair in continuous units.
///
/// Depending on context the units are effective-frame units (crop frames,
/// offsets, scaled image sizes), source pixels, or container pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    /// Horizontal extent.
    pub width: f64,
    /// Vertical extent.
    pub height: f64,
}

impl Size {
    /// Create a validated size.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::InvalidDimensions`] unless both extents
    /// are finite and strictly positive.
    pub fn new(width: f64, height: f64) -> Result<Self, GeometryError> {
        if width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0 {
            Ok(Self { width, height })
        } else {
            Err(GeometryError::InvalidDimensions { width, height })
        }
    }

    /// Width divided by height.
    #[must_use]
    pub fn aspect(self) -> f64 {
        self.width / self.height
    }

    /// Both extents multiplied by `factor`.
    #[must_use]
    pub fn scaled(self, factor: f64) -> Self {
        Self {
            width: self.width * factor,
            height: self.height * factor,
        }
    }

    /// Returns `true` when both extents are strictly positive.
    ///
    /// Used to guard against zero-sized containers reported before the
    /// first layout pass.
    #[must_use]
    pub fn is_positive(self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// A translation from the frame center, in effective-frame units.
///
/// Positive `x` moves the image right, positive `y` moves it down.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Offset {
    /// Horizontal translation.
    pub x: f64,
    /// Vertical translation.
    pub y: f64,
}

impl Offset {
    /// No translation: the image is centered in the frame.
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    /// Create a new offset.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A pointer position in screen (container) pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal position (pixels from left edge).
    pub x: f64,
    /// Vertical position (pixels from top edge).
    pub y: f64,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx.hypot(dy)
    }
}

/// Natural pixel dimensions of a decoded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Dimensions {
    /// Create validated dimensions.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::InvalidDimensions`] if either side is zero.
    pub fn new(width: u32, height: u32) -> Result<Self, GeometryError> {
        if width == 0 || height == 0 {
            return Err(GeometryError::InvalidDimensions {
                width: f64::from(width),
                height: f64::from(height),
            });
        }
        Ok(Self { width, height })
    }

    /// The dimensions as a continuous [`Size`] in source pixels.
    #[must_use]
    pub fn to_size(self) -> Size {
        Size {
            width: f64::from(self.width),
            height: f64::from(self.height),
        }
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Opaque identifier of an uploaded image.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageId(String);

impl ImageId {
    /// Wrap an identifier string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An uploaded photograph: identifier plus natural pixel dimensions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceImage {
    /// Identifier assigned by the upload collaborator.
    pub id: ImageId,
    /// Natural pixel dimensions, always non-zero.
    pub dimensions: Dimensions,
}

impl SourceImage {
    /// Create a source image record.
    #[must_use]
    pub const fn new(id: ImageId, dimensions: Dimensions) -> Self {
        Self { id, dimensions }
    }
}

/// The target placement region of one layout slot, in design units.
///
/// Frames are fixed by the product template and never mutate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Size", into = "Size")]
pub struct CropFrame(Size);

impl CropFrame {
    /// Create a validated crop frame.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::InvalidDimensions`] unless both extents
    /// are finite and strictly positive.
    pub fn new(width: f64, height: f64) -> Result<Self, GeometryError> {
        Size::new(width, height).map(Self)
    }

    /// Nominal width in design units.
    #[must_use]
    pub const fn width(self) -> f64 {
        self.0.width
    }

    /// Nominal height in design units.
    #[must_use]
    pub const fn height(self) -> f64 {
        self.0.height
    }

    /// Nominal size in design units.
    #[must_use]
    pub const fn size(self) -> Size {
        self.0
    }

    /// The frame extended to the canonical 3:2 editor aspect.
    ///
    /// See [`crate::geometry::effective_frame`].
    #[must_use]
    pub fn effective(self) -> Size {
        crate::geometry::effective_frame(self.0)
    }
}

impl TryFrom<Size> for CropFrame {
    type Error = GeometryError;

    fn try_from(size: Size) -> Result<Self, Self::Error> {
        Self::new(size.width, size.height)
    }
}

impl From<CropFrame> for Size {
    fn from(frame: CropFrame) -> Self {
        frame.0
    }
}

/// Persisted placement of one image within one crop frame.
///
/// `scale` is **absolute**: effective-frame units per source pixel. A
/// scale equal to [`min_covering_scale`](crate::geometry::min_covering_scale)
/// means the rotated image exactly covers the effective frame with no
/// slack. Offsets are in effective-frame units with the origin at the
/// frame center.
///
/// Serialized as `{scale, rotation, offsetX, offsetY}`; values are
/// stored and read back verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transform {
    /// Absolute scale (effective-frame units per source pixel).
    pub scale: f64,
    /// Rotation in degrees, clockwise.
    pub rotation: f64,
    /// Horizontal translation from the frame center.
    pub offset_x: f64,
    /// Vertical translation from the frame center.
    pub offset_y: f64,
}

impl Transform {
    /// The translation as an [`Offset`].
    #[must_use]
    pub const fn offset(&self) -> Offset {
        Offset::new(self.offset_x, self.offset_y)
    }

    /// Copy of this transform with a different translation.
    #[must_use]
    pub const fn with_offset(self, offset: Offset) -> Self {
        Self {
            offset_x: offset.x,
            offset_y: offset.y,
            ..self
        }
    }

    /// Returns `true` when every field differs from `other` by at most
    /// `epsilon`.
    #[must_use]
    pub fn approx_eq(&self, other: &Self, epsilon: f64) -> bool {
        (self.scale - other.scale).abs() <= epsilon
            && (self.rotation - other.rotation).abs() <= epsilon
            && (self.offset_x - other.offset_x).abs() <= epsilon
            && (self.offset_y - other.offset_y).abs() <= epsilon
    }
}

/// Errors raised by the geometry crate's validated constructors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeometryError {
    /// A width or height was zero, negative, or not finite.
    #[error("invalid dimensions {width}x{height}: both sides must be positive and finite")]
    InvalidDimensions {
        /// The rejected width.
        width: f64,
        /// The rejected height.
        height: f64,
    },

    /// Editor configuration is invalid.
    #[error("invalid editor configuration: {0}")]
    InvalidConfig(String),
}
