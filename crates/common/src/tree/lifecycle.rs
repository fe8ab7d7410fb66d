//! Node create/delete/move/rename, dimensions and the fixed attributes.

use object_store::StoreError;

use super::attributes::{self, check_label, check_name, A_LABEL, A_NAME, A_ORDER, A_TYPE, D_DATA};
use super::children;
use super::data_type::{from_storage_order, to_storage_order, DataType, MAX_DIMENSIONS};
use crate::config::ChildOrdering;
use crate::database::{child_ref, NodeId, Session, SessionState};
use crate::error::{Error, Result};

impl SessionState {
    pub(crate) fn create_node(&mut self, parent: NodeId, name: &str) -> Result<NodeId> {
        let name = check_name(name)?;
        let p = self.node(parent)?;
        let ordering = self.config.child_ordering;
        let store = self.store_mut(p.store)?;

        if store.has_entry(p.object, name)? {
            return Err(Error::DuplicateChildName(name.to_string()));
        }
        if attributes::is_link(store, p.object) {
            return Err(Error::ParentIsLink);
        }

        let position = children::count(store, p.object)?;
        let obj = store.create_group(p.object, name)?;
        attributes::stamp(store, obj, name, "", DataType::Empty)?;
        if ordering == ChildOrdering::Creation {
            attributes::write_int(store, obj, A_ORDER, position as i32)?;
        }

        let id = self.lend(child_ref(p, obj));
        tracing::debug!(parent = %parent, node = %id, name, "created node");
        Ok(id)
    }

    pub(crate) fn delete_node(&mut self, parent: NodeId, node: NodeId) -> Result<()> {
        let p = self.node(parent)?;
        let n = self.node(node)?;
        let ordering = self.config.child_ordering;
        let store = self.store_mut(p.store)?;

        if attributes::is_link(store, p.object) {
            return Err(Error::LinkDeleteNotAllowed);
        }
        if n.store != p.store {
            return Err(Error::ChildNotOfGivenParent);
        }
        let name = children::name_of(store, p.object, n.object)?
            .ok_or(Error::ChildNotOfGivenParent)?;

        let position = attributes::order(store, n.object);
        // the store frees the whole subtree; link entries go without
        // touching their targets
        store.unlink(p.object, &name)?;
        if let (ChildOrdering::Creation, Some(position)) = (ordering, position) {
            children::close_gap(store, p.object, position)?;
        }

        self.release(node)?;
        tracing::debug!(parent = %parent, name = %name, "deleted node");
        Ok(())
    }

    pub(crate) fn move_node(&mut self, parent: NodeId, node: NodeId, new_parent: NodeId) -> Result<()> {
        let p = self.node(parent)?;
        let n = self.node(node)?;
        let np = self.node(new_parent)?;
        let ordering = self.config.child_ordering;

        if attributes::is_link(self.store(p.store)?, p.object)
            || attributes::is_link(self.store(np.store)?, np.object)
        {
            return Err(Error::LinkMoveNotAllowed);
        }
        if n.store != p.store {
            return Err(Error::ChildNotOfGivenParent);
        }
        let store = self.store_mut(p.store)?;
        let name = children::name_of(store, p.object, n.object)?
            .ok_or(Error::ChildNotOfGivenParent)?;
        if np.store != p.store {
            return Err(Error::NodesNotInSameFile);
        }
        if store.has_entry(np.object, &name)? {
            return Err(Error::DuplicateChildName(name));
        }

        let new_position = children::count(store, np.object)?;
        let old_position = attributes::order(store, n.object);
        store
            .move_entry(p.object, &name, np.object, &name)
            .map_err(|e| match e {
                StoreError::MoveIntoSelf(_) => Error::MoveIntoSelf,
                e => Error::Store(e),
            })?;

        if ordering == ChildOrdering::Creation {
            attributes::write_int(store, n.object, A_ORDER, new_position as i32)?;
            if let Some(old) = old_position {
                children::close_gap(store, p.object, old)?;
            }
        }

        tracing::debug!(node = %node, from = %parent, to = %new_parent, "moved node");
        Ok(())
    }

    /// Relocate the entry, then rewrite the name attribute. If the
    /// rewrite fails the entry is moved back.
    pub(crate) fn rename_node(&mut self, parent: NodeId, node: NodeId, new_name: &str) -> Result<()> {
        let new_name = check_name(new_name)?;
        let p = self.node(parent)?;
        if attributes::is_link(self.store(p.store)?, p.object) {
            return Err(Error::LinkDataNotAllowed);
        }
        let n = self.node(node)?;
        if n.store != p.store {
            return Err(Error::ChildNotOfGivenParent);
        }

        let store = self.store_mut(p.store)?;
        let old_name = children::name_of(store, p.object, n.object)?
            .ok_or(Error::ChildNotOfGivenParent)?;
        if store.has_entry(p.object, new_name)? {
            return Err(Error::DuplicateChildName(new_name.to_string()));
        }

        store.move_entry(p.object, &old_name, p.object, new_name)?;
        if let Err(e) = attributes::write_str(store, n.object, A_NAME, new_name) {
            if let Err(undo) = store.move_entry(p.object, new_name, p.object, &old_name) {
                tracing::warn!(error = %undo, "failed to roll back rename of '{}'", old_name);
            }
            return Err(e);
        }

        tracing::debug!(node = %node, from = %old_name, to = new_name, "renamed node");
        Ok(())
    }

    pub(crate) fn set_dimensions(&mut self, node: NodeId, tag: &str, dims: &[usize]) -> Result<()> {
        let n = self.node(node)?;
        let legacy = self.is_legacy(n.store);
        let preserve = self.config.preserve_data_on_resize;
        let store = self.store_mut(n.store)?;

        if attributes::is_link(store, n.object) {
            return Err(Error::LinkDataNotAllowed);
        }

        let data_type: DataType = tag.parse()?;
        if data_type == DataType::Empty {
            if store.has_entry(n.object, D_DATA)? {
                store.unlink(n.object, D_DATA)?;
            }
            return attributes::write_str(store, n.object, A_TYPE, DataType::Empty.tag());
        }
        let datatype = data_type
            .datatype()
            .ok_or_else(|| Error::InvalidDataType(tag.to_string()))?;
        if dims.is_empty() || dims.len() > MAX_DIMENSIONS {
            return Err(Error::BadNumberOfDimensions(dims.len()));
        }
        if dims.contains(&0) {
            return Err(Error::BadDimensionValue);
        }

        let kept = match store.dataset(n.object, D_DATA) {
            Ok(old) if preserve && old.datatype() == datatype && old.rank() == dims.len() => {
                Some(old.as_bytes().to_vec())
            }
            _ => None,
        };
        if store.has_entry(n.object, D_DATA)? {
            store.unlink(n.object, D_DATA)?;
        }

        let stored = to_storage_order(dims, legacy);
        let payload = store.create_dataset(n.object, D_DATA, datatype, &stored)?;
        if let Some(old) = kept {
            let len = old.len().min(payload.as_bytes().len());
            payload.as_bytes_mut()[..len].copy_from_slice(&old[..len]);
        }
        attributes::write_str(store, n.object, A_TYPE, data_type.tag())?;

        tracing::debug!(node = %node, tag = data_type.tag(), ?dims, "set dimensions");
        Ok(())
    }
}

impl Session {
    /// Create an empty (`MT`) child named `name` under `parent`.
    pub fn create(&mut self, parent: NodeId, name: &str) -> Result<NodeId> {
        self.run(|st| st.create_node(parent, name))
    }

    /// Delete `node` and everything below it. Links below it are removed
    /// without touching what they point at. Consumes the `node` handle.
    pub fn delete(&mut self, parent: NodeId, node: NodeId) -> Result<()> {
        self.run(|st| st.delete_node(parent, node))
    }

    /// Move `node` from `parent` to `new_parent`, keeping its name.
    pub fn move_child(&mut self, parent: NodeId, node: NodeId, new_parent: NodeId) -> Result<()> {
        self.run(|st| st.move_node(parent, node, new_parent))
    }

    pub fn rename(&mut self, parent: NodeId, node: NodeId, new_name: &str) -> Result<()> {
        self.run(|st| st.rename_node(parent, node, new_name))
    }

    /// Give the node a type and a fresh zero-filled payload, or drop the
    /// payload when `tag` is `MT`.
    pub fn set_dimensions(&mut self, node: NodeId, tag: &str, dims: &[usize]) -> Result<()> {
        self.run(|st| st.set_dimensions(node, tag, dims))
    }

    pub fn set_label(&mut self, node: NodeId, label: &str) -> Result<()> {
        self.run(|st| {
            check_label(label)?;
            let n = st.node(node)?;
            let store = st.store_mut(n.store)?;
            if attributes::is_link(store, n.object) {
                return Err(Error::LinkDataNotAllowed);
            }
            attributes::write_str(store, n.object, A_LABEL, label)
        })
    }

    /// The node's own name. Links are not followed.
    pub fn get_name(&mut self, node: NodeId) -> Result<String> {
        self.run(|st| {
            let n = st.node(node)?;
            attributes::read_str(st.store(n.store)?, n.object, A_NAME)
        })
    }

    pub fn get_label(&mut self, node: NodeId) -> Result<String> {
        self.run(|st| {
            let n = st.node(node)?;
            let n = st.resolve_ref(n)?;
            attributes::read_str(st.store(n.store)?, n.object, A_LABEL)
        })
    }

    pub fn get_root_id(&mut self, node: NodeId) -> Result<NodeId> {
        self.run(|st| {
            let n = st.node(node)?;
            let root = st.root_of(n.store)?;
            Ok(st.lend(root))
        })
    }

    /// Whether two handles name the same node. Links are not followed.
    pub fn same_node(&mut self, a: NodeId, b: NodeId) -> Result<bool> {
        self.run(|st| Ok(st.node(a)? == st.node(b)?))
    }

    /// Give a handle back.
    pub fn release(&mut self, node: NodeId) -> Result<()> {
        self.run(|st| st.release(node))
    }

    pub fn get_data_type(&mut self, node: NodeId) -> Result<DataType> {
        self.run(|st| {
            let n = st.node(node)?;
            let n = st.resolve_ref(n)?;
            attributes::data_type(st.store(n.store)?, n.object)
        })
    }

    /// Rank of the payload; 0 for `MT` and `LK` nodes.
    pub fn number_of_dimensions(&mut self, node: NodeId) -> Result<usize> {
        self.run(|st| {
            let n = st.node(node)?;
            let n = st.resolve_ref(n)?;
            let store = st.store(n.store)?;
            if !attributes::data_type(store, n.object)?.has_payload() {
                return Ok(0);
            }
            store
                .dataset(n.object, D_DATA)
                .map(|ds| ds.rank())
                .map_err(|_| Error::NoData)
        })
    }

    /// Extents of the payload in caller axis order.
    pub fn dimension_values(&mut self, node: NodeId) -> Result<Vec<usize>> {
        self.run(|st| {
            let n = st.node(node)?;
            let n = st.resolve_ref(n)?;
            let legacy = st.is_legacy(n.store);
            let ds = st
                .store(n.store)?
                .dataset(n.object, D_DATA)
                .map_err(|_| Error::ZeroDimensions)?;
            Ok(from_storage_order(ds.dims(), legacy))
        })
    }
}
