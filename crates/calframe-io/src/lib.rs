//! calframe-io: Image loading, draft sessions, and draft storage.
//!
//! Everything around the pure geometry engine that touches bytes,
//! files, or shared state:
//!
//! - [`decode`]: header-only dimension reads and content identifiers.
//! - [`cache`]: per-session dimension memo, safe for concurrent reads.
//! - [`draft`]: slot/image bindings, persistence, and order snapshots.
//! - [`store`]: the draft storage seam plus memory and directory stores.

pub mod cache;
pub mod decode;
pub mod draft;
pub mod store;

pub use cache::DimensionCache;
pub use decode::{LoadError, content_id, load, read_dimensions};
pub use draft::{
    DraftError, DraftSession, LayoutItem, MAX_IMAGES, PersistedDraft, PlacedImage, Slot, Template,
};
pub use store::{DraftStore, JsonDirStore, MemoryStore, StoreError};
