//! Draft storage: opaque read/write of persisted drafts by identifier.
//!
//! The storefront backend is an external collaborator; this module only
//! fixes the seam ([`DraftStore`]) and provides two local stores used by
//! the CLI and tests.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use crate::draft::PersistedDraft;

/// Errors from draft stores.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The draft identifier is empty or contains characters that are
    /// unsafe in a file name.
    #[error("invalid draft id: {0:?}")]
    InvalidId(String),

    /// Reading or writing the backing storage failed.
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Stored data could not be (de)serialized.
    #[error("malformed draft data: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Opaque read/write-by-id storage of drafts.
pub trait DraftStore {
    /// Load a draft, `Ok(None)` if nothing is stored under `id`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on invalid ids, I/O, or malformed data.
    fn load(&self, id: &str) -> Result<Option<PersistedDraft>, StoreError>;

    /// Store a draft, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on invalid ids, I/O, or serialization.
    fn save(&self, id: &str, draft: &PersistedDraft) -> Result<(), StoreError>;

    /// Remove a draft. Removing a missing draft is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on invalid ids or I/O.
    fn delete(&self, id: &str) -> Result<(), StoreError>;
}

/// Accept ids made of ASCII alphanumerics, `-` and `_`.
fn validate_id(id: &str) -> Result<(), StoreError> {
    let valid = !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidId(id.to_owned()))
    }
}

/// Process-local store keeping serialized JSON in memory.
///
/// Stores the JSON text rather than the struct so a load goes through
/// the same parse path as the file store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    drafts: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl DraftStore for MemoryStore {
    fn load(&self, id: &str) -> Result<Option<PersistedDraft>, StoreError> {
        validate_id(id)?;
        let drafts = self.drafts.read().unwrap_or_else(PoisonError::into_inner);
        drafts
            .get(id)
            .map(|json| serde_json::from_str(json))
            .transpose()
            .map_err(StoreError::from)
    }

    fn save(&self, id: &str, draft: &PersistedDraft) -> Result<(), StoreError> {
        validate_id(id)?;
        let json = serde_json::to_string(draft)?;
        self.drafts
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id.to_owned(), json);
        Ok(())
    }

    fn delete(&self, id: &str) -> Result<(), StoreError> {
        validate_id(id)?;
        self.drafts
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id);
        Ok(())
    }
}

/// Store writing one pretty-printed `<id>.json` file per draft.
#[derive(Debug, Clone)]
pub struct JsonDirStore {
    root: PathBuf,
}

impl JsonDirStore {
    /// Use `root` as the storage directory, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the directory cannot be created.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// The storage directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path(&self, id: &str) -> Result<PathBuf, StoreError> {
        validate_id(id)?;
        Ok(self.root.join(format!("{id}.json")))
    }
}

impl DraftStore for JsonDirStore {
    fn load(&self, id: &str) -> Result<Option<PersistedDraft>, StoreError> {
        let path = self.path(id)?;
        match fs::read_to_string(&path) {
            Ok(json) => Ok(Some(serde_json::from_str(&json)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, id: &str, draft: &PersistedDraft) -> Result<(), StoreError> {
        let path = self.path(id)?;
        let json = serde_json::to_string_pretty(draft)?;
        // Write then rename so a crash never leaves a truncated draft.
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &path)?;
        log::debug!("saved draft {id} to {}", path.display());
        Ok(())
    }

    fn delete(&self, id: &str) -> Result<(), StoreError> {
        let path = self.path(id)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
