//! Per-session memo of image dimensions.
//!
//! Every thumbnail and the editor need the natural size of the same few
//! images; reading headers once per identifier is enough. Entries are
//! never evicted: a draft holds at most
//! [`MAX_IMAGES`](crate::draft::MAX_IMAGES) images, so the cache stays
//! small for the life of the session.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use calframe_geometry::{Dimensions, ImageId};

use crate::decode::{self, LoadError};

/// Append-only map from image identifier to dimensions.
///
/// Shared by reference between readers; lookups take a read lock and
/// only a miss takes the write lock.
#[derive(Debug, Default)]
pub struct DimensionCache {
    entries: RwLock<HashMap<ImageId, Dimensions>>,
}

impl DimensionCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached dimensions for `id`, if any.
    #[must_use]
    pub fn get(&self, id: &ImageId) -> Option<Dimensions> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .copied()
    }

    /// Record dimensions for `id`. The first value recorded wins.
    pub fn insert(&self, id: ImageId, dimensions: Dimensions) -> Dimensions {
        *self
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(id)
            .or_insert(dimensions)
    }

    /// Cached dimensions for `id`, reading them from `bytes` on a miss.
    ///
    /// # Errors
    ///
    /// Propagates [`decode::read_dimensions`] errors; nothing is cached
    /// on failure.
    pub fn get_or_read(&self, id: &ImageId, bytes: &[u8]) -> Result<Dimensions, LoadError> {
        if let Some(dimensions) = self.get(id) {
            log::trace!("dimension cache hit for {id}");
            return Ok(dimensions);
        }
        log::debug!("dimension cache miss for {id}, reading header");
        let dimensions = decode::read_dimensions(bytes)?;
        Ok(self.insert(id.clone(), dimensions))
    }

    /// Number of cached entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns `true` when nothing has been cached yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
