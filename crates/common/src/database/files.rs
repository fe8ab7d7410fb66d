//! Opening, closing and querying database files.

use std::fmt;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use object_store::{Access, Store, StoreError};

use super::handle::{NodeId, StoreKey};
use super::migrate;
use super::state::SessionState;
use crate::error::{Error, Result};
use crate::tree::attributes::{self, D_FORMAT, D_LEGACY_VERSION, D_VERSION, ROOT_LABEL, ROOT_NAME};
use crate::tree::DataType;
use crate::version::{library_version, native_format};

/// How [`Session::open`](super::Session::open) treats the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    /// Create; the file must not exist
    New,
    /// Open for update; the file must exist
    Old,
    ReadOnly,
    /// `New` if absent, `ReadOnly` if not writable, `Old` otherwise
    Unknown,
}

impl FromStr for OpenMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "NEW" => Ok(OpenMode::New),
            "OLD" => Ok(OpenMode::Old),
            "READ_ONLY" => Ok(OpenMode::ReadOnly),
            "UNKNOWN" => Ok(OpenMode::Unknown),
            _ => Err(Error::FileStatusNotRecognized(s.to_string())),
        }
    }
}

impl fmt::Display for OpenMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OpenMode::New => "NEW",
            OpenMode::Old => "OLD",
            OpenMode::ReadOnly => "READ_ONLY",
            OpenMode::Unknown => "UNKNOWN",
        })
    }
}

impl OpenMode {
    fn detect(path: &Path) -> Self {
        if !path.exists() {
            OpenMode::New
        } else if OpenOptions::new().write(true).open(path).is_err() {
            OpenMode::ReadOnly
        } else {
            OpenMode::Old
        }
    }
}

/// Version marker and timestamps of a database file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseVersion {
    pub version: String,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

fn open_error(path: &Path, e: StoreError) -> Error {
    match e {
        StoreError::NotAStoreFile(_) => Error::NotAStoreFile(path.to_path_buf()),
        StoreError::UnsupportedVersion(_) | StoreError::ChecksumMismatch(_) => {
            Error::FileFormatNotRecognized(path.to_path_buf())
        }
        source => Error::FileOpen {
            path: path.to_path_buf(),
            source,
        },
    }
}

fn canonical(path: &Path) -> Result<PathBuf> {
    path.canonicalize().map_err(|e| Error::FileOpen {
        path: path.to_path_buf(),
        source: StoreError::Io(e),
    })
}

/// Root attributes, format descriptor and current version marker.
fn stamp_root(store: &mut Store) -> Result<()> {
    let root = store.root();
    attributes::stamp(store, root, ROOT_NAME, ROOT_LABEL, DataType::Empty)?;
    attributes::write_text(store, root, D_FORMAT, native_format())?;
    attributes::write_text(store, root, D_VERSION, &library_version())?;
    store.flush().map_err(Error::Flush)
}

impl SessionState {
    pub(crate) fn open_database(&mut self, path: &Path, mode: OpenMode, format: &str) -> Result<NodeId> {
        let mode = match mode {
            OpenMode::Unknown => OpenMode::detect(path),
            mode => mode,
        };
        if !format.trim().is_empty() {
            tracing::debug!(format, "format hint ignored, files use the native format");
        }

        match mode {
            OpenMode::New if path.exists() => {
                return Err(Error::RequestedNewFileExists(path.to_path_buf()))
            }
            OpenMode::Old | OpenMode::ReadOnly if !path.exists() => {
                return Err(Error::RequestedOldFileNotFound(path.to_path_buf()))
            }
            OpenMode::Old | OpenMode::ReadOnly if !Store::is_store_file(path) => {
                return Err(Error::NotAStoreFile(path.to_path_buf()))
            }
            _ => {}
        }
        if !self.has_free_slot() {
            return Err(Error::TooManyFilesOpened);
        }

        let key = if mode == OpenMode::New {
            let mut store = Store::create(path).map_err(|e| open_error(path, e))?;
            stamp_root(&mut store)?;
            let path = canonical(path)?;
            self.attach(store, path, false)
        } else {
            let path = canonical(path)?;
            match self.store_by_path(&path) {
                Some(key) => {
                    if mode == OpenMode::Old && !self.store(key)?.is_writable() {
                        return Err(Error::FileOpen {
                            source: StoreError::ReadOnly(path.clone()),
                            path,
                        });
                    }
                    key
                }
                None => {
                    let access = if mode == OpenMode::Old {
                        Access::ReadWrite
                    } else {
                        Access::ReadOnly
                    };
                    let store = Store::open(&path, access).map_err(|e| open_error(&path, e))?;
                    self.attach_store(store, path)?
                }
            }
        };

        let slot = self.claim_slot(key)?;
        let root = self.root_of(key)?;
        tracing::info!(path = %path.display(), %mode, slot, "opened database");
        Ok(self.lend(root))
    }

    /// Register an opened store, migrating it first when it is legacy
    /// and writable.
    pub(crate) fn attach_store(&mut self, mut store: Store, path: PathBuf) -> Result<StoreKey> {
        let mut legacy = migrate::is_legacy(&store)?;
        if legacy && store.is_writable() {
            migrate::migrate(&mut store)?;
            legacy = false;
        } else if legacy {
            tracing::warn!(path = %path.display(), "legacy file opened read-only; multi-dimensional I/O disabled");
        }
        Ok(self.attach(store, path, legacy))
    }

    pub(crate) fn close_database(&mut self, root: NodeId) -> Result<()> {
        let r = self.node(root).map_err(|_| Error::FileIndexNotFound)?;
        let remaining = self.free_slot(r.store)?;
        let path = self.open_store(r.store)?.path.clone();
        if remaining == 0 {
            self.detach(r.store)?;
        }
        self.sweep()?;
        tracing::info!(path = %path.display(), "closed database");
        Ok(())
    }

    pub(crate) fn flush_node(&mut self, node: NodeId) -> Result<()> {
        let r = self.node(node)?;
        let store = self.store_mut(r.store)?;
        if !store.is_writable() {
            return Ok(());
        }
        store.flush().map_err(Error::Flush)
    }

    pub(crate) fn format_of(&self, node: NodeId) -> Result<String> {
        let r = self.node(node)?;
        let store = self.store(r.store)?;
        attributes::read_text(store, store.root(), D_FORMAT).map_err(|_| Error::NoData)
    }

    pub(crate) fn version_of(&self, node: NodeId) -> Result<DatabaseVersion> {
        let r = self.node(node)?;
        let store = self.store(r.store)?;
        let root = store.root();
        let version = attributes::read_text(store, root, D_VERSION)
            .or_else(|_| attributes::read_text(store, root, D_LEGACY_VERSION))
            .map_err(|_| Error::NoData)?;
        Ok(DatabaseVersion {
            version,
            created: store.created_at(),
            modified: store.modified_at(),
        })
    }
}

/// Remove a database file from disk.
pub(crate) fn delete_database(path: &Path) -> Result<()> {
    if !Store::is_store_file(path) {
        return Err(Error::NotAStoreFile(path.to_path_buf()));
    }
    std::fs::remove_file(path).map_err(|source| Error::FileDelete {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!(path = %path.display(), "deleted database");
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_mode_parse_is_case_insensitive() {
        assert_eq!("new".parse::<OpenMode>().unwrap(), OpenMode::New);
        assert_eq!("Read_Only".parse::<OpenMode>().unwrap(), OpenMode::ReadOnly);
        assert_eq!("UNKNOWN".parse::<OpenMode>().unwrap(), OpenMode::Unknown);
        assert!(matches!(
            "SCRATCH".parse::<OpenMode>(),
            Err(Error::FileStatusNotRecognized(_))
        ));
    }
}
