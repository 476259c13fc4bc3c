#![warn(missing_docs)]
//! # actrando-store
//!
//! ## Purpose
//! Persists the staged ROM image across sessions through a text-only,
//! quota-bounded key/value store.
//!
//! ## Responsibilities
//! - Define a backend-agnostic [`StorageBackend`] trait with quota semantics.
//! - Provide an in-memory backend for tests and ephemeral runs.
//! - Provide a file-backed backend that survives restarts.
//! - Namespace keys and run bytes through the base64 codec in [`RomStore`].
//!
//! ## Data flow
//! Controller stages ROM bytes -> [`RomStore::put`] encodes and writes under
//! the namespaced key -> later reads decode the entry back into bytes.
//!
//! ## Ownership and lifetimes
//! The store owns its backend; callers receive owned byte buffers on read so
//! no storage internals leak across the pipeline.
//!
//! ## Error model
//! Capacity exhaustion surfaces as [`StoreError::QuotaExceeded`] after the
//! partially staged entry has been removed; backend IO and corrupt-entry
//! decode failures propagate as their own variants.

use std::collections::BTreeMap;
use std::path::PathBuf;

use actrando_codec::CodecError;
use thiserror::Error;

/// Namespace prefix applied to every key, preventing collisions with
/// unrelated data sharing the same backend.
pub const KEY_NAMESPACE: &str = "actraiser_randomizer";

/// Key under which the staged ROM is persisted.
pub const ROM_KEY: &str = "rom_base64";

const KEY_SEPARATOR: &str = "___";

/// Trait implemented by concrete text key/value backends.
pub trait StorageBackend {
    /// Reads the value stored under `key`, if any.
    ///
    /// # Errors
    /// Returns [`StorageError::Io`] when the backing medium cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Writes `value` under `key`, replacing any previous entry.
    ///
    /// # Errors
    /// Returns [`StorageError::QuotaExceeded`] when the write would push the
    /// backend past its capacity; the previous entry, if any, is retained.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removes the entry under `key`; removing a missing key is a no-op.
    ///
    /// # Errors
    /// Returns [`StorageError::Io`] when the backing medium cannot be
    /// updated.
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// In-memory backend with an optional byte quota.
///
/// Used by tests to simulate capacity exhaustion and by ephemeral runs that
/// do not need persistence.
#[derive(Debug, Default)]
pub struct MemoryStorageBackend {
    entries: BTreeMap<String, String>,
    quota_bytes: Option<usize>,
}

impl MemoryStorageBackend {
    /// Creates an unbounded in-memory backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a backend that rejects writes past `quota_bytes` of total
    /// key plus value length.
    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            entries: BTreeMap::new(),
            quota_bytes: Some(quota_bytes),
        }
    }

    fn stored_bytes_excluding(&self, key: &str) -> usize {
        self.entries
            .iter()
            .filter(|(stored_key, _)| stored_key.as_str() != key)
            .map(|(stored_key, value)| stored_key.len() + value.len())
            .sum()
    }
}

impl StorageBackend for MemoryStorageBackend {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        if let Some(quota) = self.quota_bytes {
            let projected = self.stored_bytes_excluding(key) + key.len() + value.len();
            if projected > quota {
                return Err(StorageError::QuotaExceeded);
            }
        }

        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// File-backed backend persisting all entries as one JSON object.
///
/// Every operation reads the file fresh so concurrent pipeline restarts see
/// the latest staged state; the single-writer model makes this safe.
#[derive(Debug)]
pub struct FileStorageBackend {
    path: PathBuf,
    quota_bytes: Option<usize>,
}

impl FileStorageBackend {
    /// Creates a backend persisting to `path` with no quota.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            quota_bytes: None,
        }
    }

    /// Creates a backend persisting to `path` that rejects writes once the
    /// serialized store would exceed `quota_bytes`.
    pub fn with_quota(path: impl Into<PathBuf>, quota_bytes: usize) -> Self {
        Self {
            path: path.into(),
            quota_bytes: Some(quota_bytes),
        }
    }

    fn load(&self) -> Result<BTreeMap<String, String>, StorageError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                return Ok(BTreeMap::new());
            }
            Err(error) => return Err(StorageError::Io(error.to_string())),
        };

        serde_json::from_str(&raw).map_err(|error| StorageError::Io(error.to_string()))
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let serialized = serde_json::to_string(entries)
            .map_err(|error| StorageError::Io(error.to_string()))?;
        std::fs::write(&self.path, serialized).map_err(|error| StorageError::Io(error.to_string()))
    }
}

impl StorageBackend for FileStorageBackend {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.load()?.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.load()?;
        let previous = entries.insert(key.to_string(), value.to_string());

        if let Some(quota) = self.quota_bytes {
            let projected: usize = entries
                .iter()
                .map(|(stored_key, stored_value)| stored_key.len() + stored_value.len())
                .sum();
            if projected > quota {
                // Leave the backend exactly as it was before the write.
                match previous {
                    Some(previous) => entries.insert(key.to_string(), previous),
                    None => entries.remove(key),
                };
                return Err(StorageError::QuotaExceeded);
            }
        }

        self.persist(&entries)
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.load()?;
        if entries.remove(key).is_some() {
            self.persist(&entries)?;
        }
        Ok(())
    }
}

/// Namespaced ROM store wrapping a backend and the base64 codec.
#[derive(Debug)]
pub struct RomStore<B: StorageBackend> {
    backend: B,
}

impl<B: StorageBackend> RomStore<B> {
    /// Creates a store over `backend`.
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Encodes and persists ROM bytes.
    ///
    /// # Errors
    /// Returns [`StoreError::QuotaExceeded`] when the backend rejects the
    /// write for capacity; the store guarantees no entry survives the failed
    /// put, so callers must treat "no image staged" as the resulting state.
    pub fn put(&mut self, bytes: &[u8]) -> Result<(), StoreError> {
        let encoded = actrando_codec::encode(bytes);
        match self.backend.set(&rom_storage_key(), &encoded) {
            Ok(()) => Ok(()),
            Err(StorageError::QuotaExceeded) => {
                self.backend.remove(&rom_storage_key())?;
                Err(StoreError::QuotaExceeded)
            }
            Err(error) => Err(StoreError::Backend(error)),
        }
    }

    /// Reads and decodes the staged ROM, if one is present.
    ///
    /// # Errors
    /// Returns [`StoreError::Codec`] when the persisted entry no longer
    /// decodes, which indicates a corrupted store.
    pub fn get(&self) -> Result<Option<Vec<u8>>, StoreError> {
        match self.backend.get(&rom_storage_key())? {
            Some(encoded) => Ok(Some(actrando_codec::decode(&encoded)?)),
            None => Ok(None),
        }
    }

    /// Removes the staged ROM.
    ///
    /// # Errors
    /// Returns [`StoreError::Backend`] when the backend cannot be updated.
    pub fn clear(&mut self) -> Result<(), StoreError> {
        self.backend.remove(&rom_storage_key())?;
        Ok(())
    }
}

fn rom_storage_key() -> String {
    format!("{KEY_NAMESPACE}{KEY_SEPARATOR}{ROM_KEY}")
}

/// Error type for backend-level failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StorageError {
    /// Write would exceed the backend's capacity.
    #[error("storage quota exceeded")]
    QuotaExceeded,
    /// Backing medium could not be read or written.
    #[error("storage backend io failure: {0}")]
    Io(String),
}

/// Error type for store-level failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    /// Write rejected for capacity; the staged entry has been removed.
    #[error("storage quota exceeded while staging image")]
    QuotaExceeded,
    /// Backend failure unrelated to capacity.
    #[error(transparent)]
    Backend(#[from] StorageError),
    /// Persisted entry no longer decodes.
    #[error("stored image is corrupted: {0}")]
    Codec(#[from] CodecError),
}
