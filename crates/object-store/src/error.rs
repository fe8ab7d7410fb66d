//! Error types for the object store.

use std::path::PathBuf;

use crate::types::ObjectId;

/// Errors that can occur when working with a store file.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Image encode/decode error
    #[error("codec error: {0}")]
    Codec(#[from] bincode::Error),

    /// Atomic rename of a freshly written image failed
    #[error("failed to persist image: {0}")]
    Persist(#[from] tempfile::PersistError),

    /// The file does not start with the store magic
    #[error("not a store file: {0}")]
    NotAStoreFile(PathBuf),

    /// The image was written by an incompatible format revision
    #[error("unsupported store format version {0}")]
    UnsupportedVersion(u32),

    /// The payload checksum did not verify
    #[error("checksum mismatch in {0}")]
    ChecksumMismatch(PathBuf),

    /// The store was opened read-only
    #[error("store is read-only: {0}")]
    ReadOnly(PathBuf),

    /// No group with this id lives in the store
    #[error("group not found: {0}")]
    GroupNotFound(ObjectId),

    /// No entry with this name under the group
    #[error("entry not found: {0}")]
    EntryNotFound(String),

    /// An entry with this name already exists under the group
    #[error("entry already exists: {0}")]
    EntryExists(String),

    /// The entry exists but is not a group
    #[error("entry is not a group: {0}")]
    NotAGroup(String),

    /// The entry exists but is not a dataset
    #[error("entry is not a dataset: {0}")]
    NotADataset(String),

    /// Attribute lookup failed
    #[error("attribute not found: {0}")]
    AttributeNotFound(String),

    /// Attribute already exists
    #[error("attribute already exists: {0}")]
    AttributeExists(String),

    /// Reshape or write with a mismatched element count
    #[error("shape mismatch: expected {expected} elements, got {actual}")]
    ShapeMismatch { expected: u64, actual: u64 },

    /// Dataset extents overflow the address space
    #[error("dataset of {0:?} elements is too large")]
    TooLarge(Vec<u64>),

    /// A group cannot be moved below itself
    #[error("cannot move '{0}' into its own subtree")]
    MoveIntoSelf(String),
}

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
