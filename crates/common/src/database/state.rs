//! Per-session tables: open stores, file slots, lent handles.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use object_store::{ObjectId, Store};

use super::handle::{NodeId, NodeRef, StoreKey};
use crate::config::{EngineConfig, ErrorState};
use crate::error::{Error, Result};

#[derive(Debug)]
pub(crate) struct OpenStore {
    pub store: Store,
    /// Canonical path, used to share a store between opens
    pub path: PathBuf,
    /// Slots that refer to this store; zero for stores only reached
    /// through external links
    pub slot_refs: usize,
    /// Root still carries the legacy version marker
    pub legacy: bool,
}

#[derive(Debug)]
pub(crate) struct SessionState {
    pub config: EngineConfig,
    pub error_state: ErrorState,
    slots: Vec<Option<StoreKey>>,
    stores: HashMap<StoreKey, OpenStore>,
    handles: HashMap<NodeId, NodeRef>,
    next_handle: u64,
    next_store: u64,
}

impl SessionState {
    pub fn new(config: EngineConfig) -> Self {
        SessionState {
            error_state: config.error_state,
            slots: vec![None; config.max_open_files],
            stores: HashMap::new(),
            handles: HashMap::new(),
            next_handle: 1,
            next_store: 0,
            config,
        }
    }

    // Handles

    /// Look up a live handle. Handles into closed stores or deleted
    /// subtrees are rejected.
    pub fn node(&self, id: NodeId) -> Result<NodeRef> {
        let r = *self.handles.get(&id).ok_or(Error::InvalidNodeId(id))?;
        match self.stores.get(&r.store) {
            Some(open) if open.store.contains_group(r.object) => Ok(r),
            _ => Err(Error::InvalidNodeId(id)),
        }
    }

    pub fn lend(&mut self, r: NodeRef) -> NodeId {
        let id = NodeId::from(self.next_handle);
        self.next_handle += 1;
        self.handles.insert(id, r);
        id
    }

    pub fn release(&mut self, id: NodeId) -> Result<()> {
        self.handles
            .remove(&id)
            .map(|_| ())
            .ok_or(Error::InvalidNodeId(id))
    }

    pub fn live_handles(&self) -> usize {
        self.handles.len()
    }

    // Stores

    pub fn open_store(&self, key: StoreKey) -> Result<&OpenStore> {
        self.stores.get(&key).ok_or(Error::FileIndexNotFound)
    }

    pub fn store(&self, key: StoreKey) -> Result<&Store> {
        Ok(&self.open_store(key)?.store)
    }

    pub fn store_mut(&mut self, key: StoreKey) -> Result<&mut Store> {
        self.stores
            .get_mut(&key)
            .map(|open| &mut open.store)
            .ok_or(Error::FileIndexNotFound)
    }

    pub fn is_legacy(&self, key: StoreKey) -> bool {
        self.stores.get(&key).map(|o| o.legacy).unwrap_or(false)
    }

    pub fn root_of(&self, key: StoreKey) -> Result<NodeRef> {
        Ok(NodeRef {
            store: key,
            object: self.store(key)?.root(),
        })
    }

    pub fn store_by_path(&self, path: &Path) -> Option<StoreKey> {
        self.stores
            .iter()
            .find(|(_, open)| open.path == path)
            .map(|(key, _)| *key)
    }

    pub fn attach(&mut self, store: Store, path: PathBuf, legacy: bool) -> StoreKey {
        let key = StoreKey(self.next_store);
        self.next_store += 1;
        self.stores.insert(
            key,
            OpenStore {
                store,
                path,
                slot_refs: 0,
                legacy,
            },
        );
        key
    }

    /// Close a store and invalidate every handle into it.
    pub fn detach(&mut self, key: StoreKey) -> Result<()> {
        self.handles.retain(|_, r| r.store != key);
        let open = self.stores.remove(&key).ok_or(Error::FileIndexNotFound)?;
        tracing::debug!(path = %open.path.display(), "closing store");
        open.store.close().map_err(Error::FileClose)
    }

    /// Close stores that no slot refers to and no handle points into.
    pub fn sweep(&mut self) -> Result<()> {
        let idle: Vec<StoreKey> = self
            .stores
            .iter()
            .filter(|(key, open)| {
                open.slot_refs == 0 && !self.handles.values().any(|r| r.store == **key)
            })
            .map(|(key, _)| *key)
            .collect();

        let mut result = Ok(());
        for key in idle {
            if let Err(e) = self.detach(key) {
                tracing::warn!(error = %e, "failed to close linked store");
                result = Err(e);
            }
        }
        result
    }

    // Slots

    pub fn claim_slot(&mut self, key: StoreKey) -> Result<usize> {
        let slot = self
            .slots
            .iter()
            .position(Option::is_none)
            .ok_or(Error::TooManyFilesOpened)?;
        self.slots[slot] = Some(key);
        if let Some(open) = self.stores.get_mut(&key) {
            open.slot_refs += 1;
        }
        Ok(slot)
    }

    pub fn has_free_slot(&self) -> bool {
        self.slots.iter().any(Option::is_none)
    }

    /// Free one slot held by `key`, returning how many remain.
    pub fn free_slot(&mut self, key: StoreKey) -> Result<usize> {
        let slot = self
            .slots
            .iter()
            .position(|s| *s == Some(key))
            .ok_or(Error::FileIndexNotFound)?;
        self.slots[slot] = None;
        let open = self.stores.get_mut(&key).ok_or(Error::FileIndexNotFound)?;
        open.slot_refs = open.slot_refs.saturating_sub(1);
        Ok(open.slot_refs)
    }

    pub fn slots_in_use(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Close everything still open.
    pub fn shutdown(mut self) -> Result<()> {
        let keys: Vec<StoreKey> = self.stores.keys().copied().collect();
        let mut result = Ok(());
        for key in keys {
            if let Err(e) = self.detach(key) {
                tracing::warn!(error = %e, "failed to close store during shutdown");
                result = Err(e);
            }
        }
        result
    }
}

pub(crate) fn child_ref(parent: NodeRef, object: ObjectId) -> NodeRef {
    NodeRef {
        store: parent.store,
        object,
    }
}
