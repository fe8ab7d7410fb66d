//! The [`Store`] handle: one open store file.

use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::{Result, StoreError};
use crate::file::{self, Header, Image};
use crate::tree::{Dataset, Entry, Tree};
use crate::types::{Access, Attribute, ByteOrder, Datatype, ObjectId};

/// An open store file.
///
/// The whole image is held in memory. Mutations mark the store dirty and
/// [`Store::flush`] writes the image back atomically. A writable store
/// that is dropped while dirty makes a best-effort flush.
#[derive(Debug)]
pub struct Store {
    path: PathBuf,
    access: Access,
    header: Header,
    tree: Tree,
    dirty: bool,
}

impl Store {
    /// Create a new, empty store file. Fails if `path` already exists.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if path.exists() {
            return Err(StoreError::Io(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("{} already exists", path.display()),
            )));
        }

        let now = Utc::now().timestamp();
        let header = Header {
            file_id: Uuid::new_v4(),
            byte_order: ByteOrder::native(),
            created_at: now,
            modified_at: now,
        };
        let mut store = Store {
            path,
            access: Access::ReadWrite,
            header,
            tree: Tree::new(),
            dirty: true,
        };
        store.write()?;

        tracing::debug!(path = %store.path.display(), file_id = %store.header.file_id, "created store");
        Ok(store)
    }

    /// Open an existing store file.
    pub fn open(path: impl AsRef<Path>, access: Access) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if access == Access::ReadWrite {
            // surface permission problems now rather than at flush time
            OpenOptions::new().write(true).open(&path)?;
        }

        let Image { mut header, mut tree } = file::read_image(&path)?;
        let mut dirty = false;
        if header.byte_order != ByteOrder::native() {
            tracing::debug!(
                path = %path.display(),
                stored = ?header.byte_order,
                "converting dataset payloads to native byte order"
            );
            for ds in tree.datasets_mut() {
                ds.swap_byte_order();
            }
            header.byte_order = ByteOrder::native();
            dirty = access == Access::ReadWrite;
        }

        tracing::debug!(path = %path.display(), ?access, "opened store");
        Ok(Store {
            path,
            access,
            header,
            tree,
            dirty,
        })
    }

    /// Whether `path` names a readable store file.
    pub fn is_store_file(path: impl AsRef<Path>) -> bool {
        file::has_magic(path.as_ref())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn access(&self) -> Access {
        self.access
    }

    pub fn is_writable(&self) -> bool {
        self.access == Access::ReadWrite
    }

    pub fn file_id(&self) -> Uuid {
        self.header.file_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.header.created_at, 0).unwrap_or_default()
    }

    pub fn modified_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.header.modified_at, 0).unwrap_or_default()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn root(&self) -> ObjectId {
        self.tree.root()
    }

    /// Write pending changes back to disk. A clean store is left alone.
    pub fn flush(&mut self) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }
        self.check_writable()?;
        self.header.modified_at = Utc::now().timestamp();
        self.write()
    }

    /// Flush and release the file.
    pub fn close(mut self) -> Result<()> {
        if self.is_writable() {
            self.flush()?;
        }
        self.dirty = false;
        tracing::debug!(path = %self.path.display(), "closed store");
        Ok(())
    }

    fn write(&mut self) -> Result<()> {
        let image = Image {
            header: self.header.clone(),
            tree: self.tree.clone(),
        };
        file::write_image(&self.path, &image)?;
        self.dirty = false;
        Ok(())
    }

    fn check_writable(&self) -> Result<()> {
        if self.is_writable() {
            Ok(())
        } else {
            Err(StoreError::ReadOnly(self.path.clone()))
        }
    }

    /// Gate every mutation: refuse on read-only stores, otherwise mark dirty.
    fn touch(&mut self) -> Result<&mut Tree> {
        self.check_writable()?;
        self.dirty = true;
        Ok(&mut self.tree)
    }

    // Groups and entries

    pub fn contains_group(&self, id: ObjectId) -> bool {
        self.tree.contains(id)
    }

    pub fn entry(&self, group: ObjectId, name: &str) -> Result<&Entry> {
        self.tree
            .group(group)?
            .entries
            .get(name)
            .ok_or_else(|| StoreError::EntryNotFound(name.to_string()))
    }

    pub fn has_entry(&self, group: ObjectId, name: &str) -> Result<bool> {
        Ok(self.tree.group(group)?.entries.contains_key(name))
    }

    /// Resolve a direct child entry that must be a group.
    pub fn open_group(&self, group: ObjectId, name: &str) -> Result<ObjectId> {
        self.entry(group, name)?
            .as_group()
            .ok_or_else(|| StoreError::NotAGroup(name.to_string()))
    }

    /// All entries under a group, in name order.
    pub fn entries(&self, group: ObjectId) -> Result<impl Iterator<Item = (&str, &Entry)>> {
        Ok(self
            .tree
            .group(group)?
            .entries
            .iter()
            .map(|(name, entry)| (name.as_str(), entry)))
    }

    pub fn create_group(&mut self, parent: ObjectId, name: &str) -> Result<ObjectId> {
        self.touch()?.insert_group(parent, name)
    }

    /// Move (and possibly rename) an entry. Groups keep their id.
    pub fn move_entry(
        &mut self,
        parent: ObjectId,
        name: &str,
        new_parent: ObjectId,
        new_name: &str,
    ) -> Result<()> {
        self.touch()?.move_entry(parent, name, new_parent, new_name)
    }

    /// Remove an entry. A group entry takes its whole subtree with it;
    /// link entries are removed without touching their targets.
    pub fn unlink(&mut self, parent: ObjectId, name: &str) -> Result<()> {
        self.touch()?.unlink(parent, name)
    }

    pub fn create_soft_link(&mut self, parent: ObjectId, name: &str, target: &str) -> Result<()> {
        let entry = Entry::SoftLink {
            target: target.to_string(),
        };
        self.touch()?.insert_entry(parent, name, entry)
    }

    pub fn create_external_link(
        &mut self,
        parent: ObjectId,
        name: &str,
        file: &str,
        path: &str,
    ) -> Result<()> {
        let entry = Entry::ExternalLink {
            file: file.to_string(),
            path: path.to_string(),
        };
        self.touch()?.insert_entry(parent, name, entry)
    }

    // Attributes

    pub fn attribute(&self, group: ObjectId, name: &str) -> Result<&Attribute> {
        self.tree
            .group(group)?
            .attributes
            .get(name)
            .ok_or_else(|| StoreError::AttributeNotFound(name.to_string()))
    }

    pub fn has_attribute(&self, group: ObjectId, name: &str) -> Result<bool> {
        Ok(self.tree.group(group)?.attributes.contains_key(name))
    }

    pub fn create_attribute(&mut self, group: ObjectId, name: &str, value: Attribute) -> Result<()> {
        let attributes = &mut self.touch()?.group_mut(group)?.attributes;
        if attributes.contains_key(name) {
            return Err(StoreError::AttributeExists(name.to_string()));
        }
        attributes.insert(name.to_string(), value);
        Ok(())
    }

    /// Overwrite an existing attribute.
    pub fn write_attribute(&mut self, group: ObjectId, name: &str, value: Attribute) -> Result<()> {
        let slot = self
            .touch()?
            .group_mut(group)?
            .attributes
            .get_mut(name)
            .ok_or_else(|| StoreError::AttributeNotFound(name.to_string()))?;
        *slot = value;
        Ok(())
    }

    // Datasets

    /// Create a zero-filled dataset under `group`.
    pub fn create_dataset(
        &mut self,
        group: ObjectId,
        name: &str,
        datatype: Datatype,
        dims: &[u64],
    ) -> Result<&mut Dataset> {
        let dataset = Dataset::zeroed(datatype, dims)?;
        let tree = self.touch()?;
        tree.insert_entry(group, name, Entry::Dataset(dataset))?;
        match tree.group_mut(group)?.entries.get_mut(name) {
            Some(Entry::Dataset(ds)) => Ok(ds),
            _ => Err(StoreError::NotADataset(name.to_string())),
        }
    }

    /// Create a dataset from existing bytes in storage order.
    pub fn create_dataset_from_bytes(
        &mut self,
        group: ObjectId,
        name: &str,
        datatype: Datatype,
        dims: &[u64],
        data: Vec<u8>,
    ) -> Result<()> {
        let dataset = Dataset::from_bytes(datatype, dims, data)?;
        self.touch()?
            .insert_entry(group, name, Entry::Dataset(dataset))
    }

    pub fn dataset(&self, group: ObjectId, name: &str) -> Result<&Dataset> {
        self.entry(group, name)?
            .as_dataset()
            .ok_or_else(|| StoreError::NotADataset(name.to_string()))
    }

    pub fn dataset_mut(&mut self, group: ObjectId, name: &str) -> Result<&mut Dataset> {
        let entry = self
            .touch()?
            .group_mut(group)?
            .entries
            .get_mut(name)
            .ok_or_else(|| StoreError::EntryNotFound(name.to_string()))?;
        match entry {
            Entry::Dataset(ds) => Ok(ds),
            _ => Err(StoreError::NotADataset(name.to_string())),
        }
    }
}

impl Drop for Store {
    fn drop(&mut self) {
        if self.dirty && self.is_writable() {
            if let Err(e) = self.flush() {
                tracing::warn!(path = %self.path.display(), error = %e, "failed to flush store on drop");
            }
        }
    }
}
