//! Draft session: a template's slots, the uploaded images, and the
//! placement of each image in its slot.
//!
//! The session owns all mutable draft state, including whether the
//! image set has finished loading. Geometry decisions are delegated to
//! [`Placement`]; the session only binds slots to images and stores the
//! transforms the editor commits.

use calframe_geometry::{
    CropFrame, Dimensions, GeometryError, ImageId, OrderSnapshot, Placement, SnapshotEntry,
    SourceImage, Transform,
};
use serde::{Deserialize, Serialize};

/// Most images a single draft may hold.
pub const MAX_IMAGES: usize = 20;

/// Persisted draft format version written by this crate.
pub const DRAFT_VERSION: u32 = 1;

/// Errors from draft operations.
#[derive(Debug, thiserror::Error)]
pub enum DraftError {
    /// The draft already holds [`MAX_IMAGES`] images.
    #[error("draft is full ({} images)", MAX_IMAGES)]
    TooManyImages,

    /// No slot with this identifier exists in the template.
    #[error("unknown slot: {0}")]
    UnknownSlot(String),

    /// No uploaded image with this identifier exists in the draft.
    #[error("unknown image: {0}")]
    UnknownImage(ImageId),

    /// The slot has no image assigned.
    #[error("slot {0} is empty")]
    EmptySlot(String),

    /// Two slots in a template share an identifier.
    #[error("duplicate slot id: {0}")]
    DuplicateSlot(String),

    /// An order snapshot was requested but no slot is filled.
    #[error("no slot has an image")]
    NothingPlaced,

    /// Persisted data carried invalid geometry.
    #[error("invalid geometry: {0}")]
    Geometry(#[from] GeometryError),

    /// Persisted data was written by an unknown format version.
    #[error("unsupported draft version {0}")]
    UnsupportedVersion(u32),
}

/// One slot of a product template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    /// Slot identifier, unique within the template.
    pub id: String,
    /// Crop frame of the slot, in design units.
    pub frame: CropFrame,
}

/// Fixed slot layout of a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    /// Template identifier.
    pub id: String,
    /// Slots in display order.
    pub slots: Vec<Slot>,
}

impl Template {
    /// Create a template, rejecting duplicate slot identifiers.
    ///
    /// # Errors
    ///
    /// Returns [`DraftError::DuplicateSlot`] if two slots share an id.
    pub fn new(id: impl Into<String>, slots: Vec<Slot>) -> Result<Self, DraftError> {
        for (i, slot) in slots.iter().enumerate() {
            if slots[..i].iter().any(|s| s.id == slot.id) {
                return Err(DraftError::DuplicateSlot(slot.id.clone()));
            }
        }
        Ok(Self {
            id: id.into(),
            slots,
        })
    }

    fn slot(&self, slot_id: &str) -> Result<&Slot, DraftError> {
        self.slots
            .iter()
            .find(|s| s.id == slot_id)
            .ok_or_else(|| DraftError::UnknownSlot(slot_id.to_owned()))
    }
}

/// An image placed in a slot, with its transform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedImage {
    /// Identifier of the placed image.
    pub image_id: ImageId,
    /// Committed transform.
    pub transform: Transform,
}

/// Binds one slot to zero or one image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutItem {
    /// Slot this item fills.
    pub slot_id: String,
    /// Placed image, `None` for an empty slot.
    pub placed: Option<PlacedImage>,
}

/// Serializable form of a draft session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedDraft {
    /// Format version, [`DRAFT_VERSION`] when written by this crate.
    pub version: u32,
    /// Template the draft is built on.
    pub template: Template,
    /// Uploaded images in upload order.
    pub images: Vec<SourceImage>,
    /// One item per template slot.
    pub items: Vec<LayoutItem>,
}

/// In-memory editing state of one draft.
#[derive(Debug, Clone)]
pub struct DraftSession {
    template: Template,
    images: Vec<SourceImage>,
    items: Vec<LayoutItem>,
    images_loaded: bool,
}

impl DraftSession {
    /// Start an empty draft on `template`.
    #[must_use]
    pub fn new(template: Template) -> Self {
        let items = template
            .slots
            .iter()
            .map(|slot| LayoutItem {
                slot_id: slot.id.clone(),
                placed: None,
            })
            .collect();
        Self {
            template,
            images: Vec::new(),
            items,
            images_loaded: false,
        }
    }

    /// The template this draft is built on.
    #[must_use]
    pub const fn template(&self) -> &Template {
        &self.template
    }

    /// Uploaded images in upload order.
    #[must_use]
    pub fn images(&self) -> &[SourceImage] {
        &self.images
    }

    /// Layout items in slot order.
    #[must_use]
    pub fn items(&self) -> &[LayoutItem] {
        &self.items
    }

    /// Whether every uploaded image has finished loading.
    #[must_use]
    pub const fn images_loaded(&self) -> bool {
        self.images_loaded
    }

    /// Record that image loading finished (or restarted).
    pub const fn set_images_loaded(&mut self, loaded: bool) {
        self.images_loaded = loaded;
    }

    /// Add an uploaded image. Re-adding a known identifier is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`DraftError::TooManyImages`] when the draft is full.
    pub fn add_image(&mut self, image: SourceImage) -> Result<(), DraftError> {
        if self.image(&image.id).is_some() {
            log::debug!("image {} already in draft", image.id);
            return Ok(());
        }
        if self.images.len() >= MAX_IMAGES {
            return Err(DraftError::TooManyImages);
        }
        self.images.push(image);
        Ok(())
    }

    /// Remove an uploaded image and clear every slot that used it.
    ///
    /// # Errors
    ///
    /// Returns [`DraftError::UnknownImage`] if `id` was never added.
    pub fn remove_image(&mut self, id: &ImageId) -> Result<(), DraftError> {
        let index = self
            .images
            .iter()
            .position(|img| &img.id == id)
            .ok_or_else(|| DraftError::UnknownImage(id.clone()))?;
        self.images.remove(index);
        for item in &mut self.items {
            if item.placed.as_ref().is_some_and(|p| &p.image_id == id) {
                log::debug!("clearing slot {} after removing {id}", item.slot_id);
                item.placed = None;
            }
        }
        Ok(())
    }

    /// Uploaded image by identifier.
    #[must_use]
    pub fn image(&self, id: &ImageId) -> Option<&SourceImage> {
        self.images.iter().find(|img| &img.id == id)
    }

    /// Layout item for `slot_id`.
    ///
    /// # Errors
    ///
    /// Returns [`DraftError::UnknownSlot`] for an unknown slot.
    pub fn item(&self, slot_id: &str) -> Result<&LayoutItem, DraftError> {
        self.items
            .iter()
            .find(|i| i.slot_id == slot_id)
            .ok_or_else(|| DraftError::UnknownSlot(slot_id.to_owned()))
    }

    fn item_mut(&mut self, slot_id: &str) -> Result<&mut LayoutItem, DraftError> {
        self.items
            .iter_mut()
            .find(|i| i.slot_id == slot_id)
            .ok_or_else(|| DraftError::UnknownSlot(slot_id.to_owned()))
    }

    /// Place `image_id` in `slot_id` with the default covering transform,
    /// replacing whatever was there.
    ///
    /// # Errors
    ///
    /// Returns [`DraftError::UnknownSlot`] or [`DraftError::UnknownImage`].
    pub fn assign(&mut self, slot_id: &str, image_id: &ImageId) -> Result<Placement, DraftError> {
        let frame = self.template.slot(slot_id)?.frame;
        let dimensions = self
            .image(image_id)
            .ok_or_else(|| DraftError::UnknownImage(image_id.clone()))?
            .dimensions;
        let placement = Placement::initialize(dimensions, frame);
        self.item_mut(slot_id)?.placed = Some(PlacedImage {
            image_id: image_id.clone(),
            transform: placement.transform(),
        });
        log::debug!("assigned {image_id} to slot {slot_id}");
        Ok(placement)
    }

    /// Empty a slot, discarding its transform.
    ///
    /// # Errors
    ///
    /// Returns [`DraftError::UnknownSlot`] for an unknown slot.
    pub fn clear(&mut self, slot_id: &str) -> Result<(), DraftError> {
        self.item_mut(slot_id)?.placed = None;
        Ok(())
    }

    /// Current placement of the image in `slot_id`, `None` if empty.
    ///
    /// # Errors
    ///
    /// Returns [`DraftError::UnknownSlot`], or
    /// [`DraftError::UnknownImage`] if the placed image is missing from
    /// the image list.
    pub fn placement(&self, slot_id: &str) -> Result<Option<Placement>, DraftError> {
        let frame = self.template.slot(slot_id)?.frame;
        let Some(placed) = &self.item(slot_id)?.placed else {
            return Ok(None);
        };
        let dimensions = self
            .image(&placed.image_id)
            .ok_or_else(|| DraftError::UnknownImage(placed.image_id.clone()))?
            .dimensions;
        Ok(Some(Placement::restore(dimensions, frame, placed.transform)))
    }

    /// Store a transform committed by the editor for `slot_id`.
    ///
    /// # Errors
    ///
    /// Returns [`DraftError::UnknownSlot`] or [`DraftError::EmptySlot`].
    pub fn set_transform(&mut self, slot_id: &str, transform: Transform) -> Result<(), DraftError> {
        let item = self.item_mut(slot_id)?;
        let placed = item
            .placed
            .as_mut()
            .ok_or_else(|| DraftError::EmptySlot(slot_id.to_owned()))?;
        log::trace!("slot {slot_id} transform {transform:?}");
        placed.transform = transform;
        Ok(())
    }

    /// Serializable copy of the draft.
    #[must_use]
    pub fn persist(&self) -> PersistedDraft {
        PersistedDraft {
            version: DRAFT_VERSION,
            template: self.template.clone(),
            images: self.images.clone(),
            items: self.items.clone(),
        }
    }

    /// Rebuild a session from persisted data.
    ///
    /// Transforms are adopted verbatim. Items for slots that no longer
    /// exist are dropped; slots missing from the data start empty.
    /// Images still need loading, so `images_loaded` starts `false`.
    ///
    /// # Errors
    ///
    /// Returns [`DraftError::UnsupportedVersion`] for unknown versions,
    /// [`DraftError::Geometry`] for zero image dimensions,
    /// [`DraftError::TooManyImages`] for an oversized image list, and
    /// [`DraftError::UnknownImage`] when an item references an image
    /// that is not in the list.
    pub fn restore(persisted: PersistedDraft) -> Result<Self, DraftError> {
        if persisted.version != DRAFT_VERSION {
            return Err(DraftError::UnsupportedVersion(persisted.version));
        }
        let template = Template::new(persisted.template.id, persisted.template.slots)?;
        let mut session = Self::new(template);
        for image in persisted.images {
            Dimensions::new(image.dimensions.width, image.dimensions.height)?;
            session.add_image(image)?;
        }
        for item in persisted.items {
            let Some(placed) = item.placed else {
                continue;
            };
            if session.image(&placed.image_id).is_none() {
                return Err(DraftError::UnknownImage(placed.image_id));
            }
            match session.item_mut(&item.slot_id) {
                Ok(target) => target.placed = Some(placed),
                Err(_) => log::warn!("dropping item for removed slot {}", item.slot_id),
            }
        }
        Ok(session)
    }

    /// Freeze every filled slot into an order snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`DraftError::NothingPlaced`] when no slot is filled, or
    /// [`DraftError::UnknownImage`] for a dangling image reference.
    pub fn snapshot(&self) -> Result<OrderSnapshot, DraftError> {
        let mut entries = Vec::new();
        for item in &self.items {
            let Some(placed) = &item.placed else {
                continue;
            };
            if let Some(placement) = self.placement(&item.slot_id)? {
                entries.push(SnapshotEntry::from_placement(
                    item.slot_id.clone(),
                    placed.image_id.clone(),
                    &placement,
                ));
            }
        }
        if entries.is_empty() {
            return Err(DraftError::NothingPlaced);
        }
        Ok(OrderSnapshot::new(self.template.id.clone(), entries))
    }
}
