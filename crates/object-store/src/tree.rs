//! In-memory arena of groups that makes up a store image.
//!
//! Groups live in a flat map keyed by [`ObjectId`]; a group refers to its
//! child groups by id. Every group is reachable from exactly one parent
//! entry, so unlinking an entry frees the whole subtree below it.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};
use crate::types::{Attribute, Datatype, ObjectId};

/// A dense, typed, multi-dimensional array stored under a group.
///
/// Extents are kept in storage order: the last extent varies fastest in
/// the flat byte buffer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    datatype: Datatype,
    dims: Vec<u64>,
    data: Vec<u8>,
}

impl Dataset {
    pub(crate) fn zeroed(datatype: Datatype, dims: &[u64]) -> Result<Self> {
        let bytes = byte_len(datatype, dims)?;
        Ok(Self {
            datatype,
            dims: dims.to_vec(),
            data: vec![0; bytes],
        })
    }

    pub(crate) fn from_bytes(datatype: Datatype, dims: &[u64], data: Vec<u8>) -> Result<Self> {
        let bytes = byte_len(datatype, dims)?;
        if bytes != data.len() {
            return Err(StoreError::ShapeMismatch {
                expected: bytes as u64,
                actual: data.len() as u64,
            });
        }
        Ok(Self {
            datatype,
            dims: dims.to_vec(),
            data,
        })
    }

    pub fn datatype(&self) -> Datatype {
        self.datatype
    }

    pub fn dims(&self) -> &[u64] {
        &self.dims
    }

    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    /// Number of elements
    pub fn len(&self) -> u64 {
        element_count(&self.dims).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Relabel the extents without touching the bytes.
    ///
    /// The new extents must describe the same number of elements.
    pub fn set_extent(&mut self, dims: &[u64]) -> Result<()> {
        let actual = element_count(dims).ok_or_else(|| StoreError::TooLarge(dims.to_vec()))?;
        if actual != self.len() {
            return Err(StoreError::ShapeMismatch {
                expected: self.len(),
                actual,
            });
        }
        self.dims = dims.to_vec();
        Ok(())
    }

    pub(crate) fn swap_byte_order(&mut self) {
        let size = self.datatype.size();
        if size > 1 {
            for element in self.data.chunks_exact_mut(size) {
                element.reverse();
            }
        }
    }
}

fn element_count(dims: &[u64]) -> Option<u64> {
    dims.iter().try_fold(1u64, |acc, d| acc.checked_mul(*d))
}

fn byte_len(datatype: Datatype, dims: &[u64]) -> Result<usize> {
    element_count(dims)
        .and_then(|n| n.checked_mul(datatype.size() as u64))
        .and_then(|n| usize::try_from(n).ok())
        .ok_or_else(|| StoreError::TooLarge(dims.to_vec()))
}

/// A named entry inside a group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Entry {
    Group(ObjectId),
    Dataset(Dataset),
    /// Same-file indirection to an absolute path
    SoftLink { target: String },
    /// Indirection to a path inside another store file
    ExternalLink { file: String, path: String },
}

impl Entry {
    pub fn as_group(&self) -> Option<ObjectId> {
        match self {
            Entry::Group(id) => Some(*id),
            _ => None,
        }
    }

    pub fn as_dataset(&self) -> Option<&Dataset> {
        match self {
            Entry::Dataset(ds) => Some(ds),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub(crate) struct Group {
    pub(crate) attributes: BTreeMap<String, Attribute>,
    pub(crate) entries: BTreeMap<String, Entry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct Tree {
    root: ObjectId,
    next_id: u64,
    groups: HashMap<ObjectId, Group>,
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl Tree {
    pub fn new() -> Self {
        let root = ObjectId(0);
        let mut groups = HashMap::new();
        groups.insert(root, Group::default());
        Tree {
            root,
            next_id: 1,
            groups,
        }
    }

    pub fn root(&self) -> ObjectId {
        self.root
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.groups.contains_key(&id)
    }

    pub fn group(&self, id: ObjectId) -> Result<&Group> {
        self.groups.get(&id).ok_or(StoreError::GroupNotFound(id))
    }

    pub fn group_mut(&mut self, id: ObjectId) -> Result<&mut Group> {
        self.groups.get_mut(&id).ok_or(StoreError::GroupNotFound(id))
    }

    pub fn insert_entry(&mut self, parent: ObjectId, name: &str, entry: Entry) -> Result<()> {
        let group = self.group_mut(parent)?;
        if group.entries.contains_key(name) {
            return Err(StoreError::EntryExists(name.to_string()));
        }
        group.entries.insert(name.to_string(), entry);
        Ok(())
    }

    pub fn insert_group(&mut self, parent: ObjectId, name: &str) -> Result<ObjectId> {
        let id = ObjectId(self.next_id);
        self.insert_entry(parent, name, Entry::Group(id))?;
        self.next_id += 1;
        self.groups.insert(id, Group::default());
        Ok(id)
    }

    /// Remove an entry and free any group subtree hanging off it.
    pub fn unlink(&mut self, parent: ObjectId, name: &str) -> Result<()> {
        let entry = self
            .group_mut(parent)?
            .entries
            .remove(name)
            .ok_or_else(|| StoreError::EntryNotFound(name.to_string()))?;

        if let Entry::Group(id) = entry {
            let mut stack = vec![id];
            while let Some(id) = stack.pop() {
                if let Some(group) = self.groups.remove(&id) {
                    stack.extend(group.entries.values().filter_map(Entry::as_group));
                }
            }
        }
        Ok(())
    }

    /// Whether `id` is `ancestor` or lives somewhere below it.
    pub fn is_within(&self, ancestor: ObjectId, id: ObjectId) -> bool {
        let mut stack = vec![ancestor];
        while let Some(current) = stack.pop() {
            if current == id {
                return true;
            }
            if let Some(group) = self.groups.get(&current) {
                stack.extend(group.entries.values().filter_map(Entry::as_group));
            }
        }
        false
    }

    pub fn move_entry(
        &mut self,
        parent: ObjectId,
        name: &str,
        new_parent: ObjectId,
        new_name: &str,
    ) -> Result<()> {
        let moved = self
            .group(parent)?
            .entries
            .get(name)
            .ok_or_else(|| StoreError::EntryNotFound(name.to_string()))?
            .as_group();
        if self.group(new_parent)?.entries.contains_key(new_name) {
            return Err(StoreError::EntryExists(new_name.to_string()));
        }
        if let Some(id) = moved {
            if self.is_within(id, new_parent) {
                return Err(StoreError::MoveIntoSelf(name.to_string()));
            }
        }

        let entry = self
            .group_mut(parent)?
            .entries
            .remove(name)
            .ok_or_else(|| StoreError::EntryNotFound(name.to_string()))?;
        self.group_mut(new_parent)?
            .entries
            .insert(new_name.to_string(), entry);
        Ok(())
    }

    pub fn datasets_mut(&mut self) -> impl Iterator<Item = &mut Dataset> {
        self.groups
            .values_mut()
            .flat_map(|group| group.entries.values_mut())
            .filter_map(|entry| match entry {
                Entry::Dataset(ds) => Some(ds),
                _ => None,
            })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_unlink_frees_subtree() {
        let mut tree = Tree::new();
        let root = tree.root();
        let a = tree.insert_group(root, "a").unwrap();
        let b = tree.insert_group(a, "b").unwrap();
        let c = tree.insert_group(b, "c").unwrap();

        tree.unlink(root, "a").unwrap();

        assert!(!tree.contains(a));
        assert!(!tree.contains(b));
        assert!(!tree.contains(c));
        assert!(tree.group(root).unwrap().entries.is_empty());
    }

    #[test]
    fn test_move_into_own_subtree_rejected() {
        let mut tree = Tree::new();
        let root = tree.root();
        let a = tree.insert_group(root, "a").unwrap();
        let b = tree.insert_group(a, "b").unwrap();

        let result = tree.move_entry(root, "a", b, "a");
        assert!(matches!(result, Err(StoreError::MoveIntoSelf(_))));

        let result = tree.move_entry(root, "a", a, "again");
        assert!(matches!(result, Err(StoreError::MoveIntoSelf(_))));

        // sibling move is fine
        tree.insert_group(root, "z").unwrap();
        tree.move_entry(a, "b", root, "b").unwrap();
        assert!(tree.group(root).unwrap().entries.contains_key("b"));
    }

    #[test]
    fn test_set_extent_keeps_bytes() {
        let data: Vec<u8> = (0u8..24).collect();
        let mut ds = Dataset::from_bytes(Datatype::Int32, &[2, 3], data.clone()).unwrap();

        ds.set_extent(&[3, 2]).unwrap();
        assert_eq!(ds.dims(), &[3, 2]);
        assert_eq!(ds.as_bytes(), &data[..]);

        let result = ds.set_extent(&[4, 2]);
        assert!(matches!(result, Err(StoreError::ShapeMismatch { .. })));
    }

    #[test]
    fn test_swap_byte_order() {
        let mut ds =
            Dataset::from_bytes(Datatype::UInt32, &[1], 0x0102_0304u32.to_le_bytes().to_vec())
                .unwrap();
        ds.swap_byte_order();
        assert_eq!(ds.as_bytes(), &0x0102_0304u32.to_be_bytes());
    }
}
