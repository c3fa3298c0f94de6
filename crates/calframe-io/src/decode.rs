//! Reading image dimensions and deriving content identifiers.
//!
//! Only the header is parsed: layout needs the natural pixel size, not
//! the pixels. Supports whatever formats the `image` crate is built
//! with (PNG, JPEG, BMP, WebP).

use std::hash::Hasher;
use std::io::Cursor;

use calframe_geometry::{Dimensions, ImageId, SourceImage};
use siphasher::sip128::{Hasher128, SipHasher13};

/// Errors that can occur while loading an image.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The input bytes were empty.
    #[error("input image data is empty")]
    EmptyInput,

    /// The format was not recognized or the header is corrupt.
    #[error("failed to decode image: {0}")]
    ImageDecode(#[from] image::ImageError),

    /// Reading the header failed.
    #[error("failed to read image: {0}")]
    Io(#[from] std::io::Error),

    /// The header reports a zero width or height.
    #[error("image has zero size ({width}x{height})")]
    ZeroSize {
        /// Reported width.
        width: u32,
        /// Reported height.
        height: u32,
    },
}

/// Read natural pixel dimensions from encoded image bytes.
///
/// # Errors
///
/// Returns [`LoadError::EmptyInput`] if `bytes` is empty.
/// Returns [`LoadError::ImageDecode`] if the format is unrecognized or
/// the header is corrupt.
/// Returns [`LoadError::ZeroSize`] if either side is zero.
pub fn read_dimensions(bytes: &[u8]) -> Result<Dimensions, LoadError> {
    if bytes.is_empty() {
        return Err(LoadError::EmptyInput);
    }

    let (width, height) = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()?
        .into_dimensions()?;

    Dimensions::new(width, height).map_err(|_| LoadError::ZeroSize { width, height })
}

/// Content-derived identifier: 128-bit `SipHash` of the bytes, as hex.
///
/// The same file uploaded twice maps to the same identifier, so its
/// dimensions are read once per session.
#[must_use]
pub fn content_id(bytes: &[u8]) -> ImageId {
    let mut hasher = SipHasher13::new();
    hasher.write(bytes);
    ImageId::new(format!("{:032x}", hasher.finish128().as_u128()))
}

/// Identify and measure an uploaded image.
///
/// # Errors
///
/// Propagates [`read_dimensions`] errors.
pub fn load(bytes: &[u8]) -> Result<SourceImage, LoadError> {
    let dimensions = read_dimensions(bytes)?;
    let id = content_id(bytes);
    log::debug!("loaded image {id} ({dimensions})");
    Ok(SourceImage::new(id, dimensions))
}
