//! Link nodes and path resolution.
//!
//! Path resolution is an explicit loop over a deque of pending segments.
//! When the walk lands on a link node that still has segments to apply
//! (or that must itself be resolved), the link's target segments are
//! pushed onto the front of the deque and the walk restarts from the
//! target file's root. Each such hop counts toward
//! [`EngineConfig::max_link_depth`](crate::config::EngineConfig), so
//! cyclic links end in [`Error::LinksTooDeep`] instead of recursing.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use object_store::{Access, Entry, Store};

use super::attributes::{self, D_FILE, D_LINK, D_PATH};
use super::data_type::DataType;
use crate::database::{NodeId, NodeRef, Session, SessionState, StoreKey};
use crate::error::{Error, Result};

/// Where a pending segment came from; decides the error when it is missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Origin {
    Caller,
    Link,
}

fn segments(path: &str, origin: Origin) -> VecDeque<(String, Origin)> {
    path.split('/')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| (s.to_string(), origin))
        .collect()
}

impl SessionState {
    /// Follow a chain of links until a plain node.
    pub(crate) fn resolve_ref(&mut self, r: NodeRef) -> Result<NodeRef> {
        self.walk(r, VecDeque::new(), true)
    }

    /// Walk `path` from `start`. Absolute paths start at the root of
    /// `start`'s file. The last segment is returned as-is unless
    /// `resolve_last` is set.
    pub(crate) fn walk_path(
        &mut self,
        start: NodeRef,
        path: &str,
        resolve_last: bool,
    ) -> Result<NodeRef> {
        let start = if path.trim_start().starts_with('/') {
            self.root_of(start.store)?
        } else {
            start
        };
        self.walk(start, segments(path, Origin::Caller), resolve_last)
    }

    fn walk(
        &mut self,
        mut current: NodeRef,
        mut pending: VecDeque<(String, Origin)>,
        resolve_last: bool,
    ) -> Result<NodeRef> {
        let max_depth = self.config.max_link_depth;
        let mut hops = 0;

        loop {
            let on_link = attributes::is_link(self.store(current.store)?, current.object);
            if on_link && (resolve_last || !pending.is_empty()) {
                hops += 1;
                if hops > max_depth {
                    tracing::warn!(max_depth, "link chain too deep");
                    return Err(Error::LinksTooDeep(max_depth));
                }
                let (store, target) = self.link_target(current)?;
                current = self.root_of(store)?;
                for segment in segments(&target, Origin::Link).into_iter().rev() {
                    pending.push_front(segment);
                }
                continue;
            }

            let Some((name, origin)) = pending.pop_front() else {
                return Ok(current);
            };
            let store = self.store(current.store)?;
            match store.entry(current.object, &name) {
                Ok(Entry::Group(id)) => current.object = *id,
                _ => {
                    return Err(match origin {
                        Origin::Caller => Error::NodeNotFound(name),
                        Origin::Link => Error::LinkTargetNotThere(name),
                    })
                }
            }
        }
    }

    /// The file and in-file path a link node points at.
    fn link_target(&mut self, link: NodeRef) -> Result<(StoreKey, String)> {
        let entry = self
            .store(link.store)?
            .entry(link.object, D_LINK)
            .ok()
            .cloned();
        match entry {
            Some(Entry::SoftLink { target }) => Ok((link.store, target)),
            Some(Entry::ExternalLink { file, path }) => {
                let key = self.open_linked_file(link.store, &file)?;
                Ok((key, path))
            }
            _ => {
                let store = self.store(link.store)?;
                let path = attributes::read_text(store, link.object, D_PATH).unwrap_or_default();
                Err(Error::LinkTargetNotThere(path))
            }
        }
    }

    /// Find and open the file named by an external link.
    ///
    /// Relative names are tried against the linking file's directory
    /// first, then the working directory.
    fn open_linked_file(&mut self, from: StoreKey, file: &str) -> Result<StoreKey> {
        let linking = self.open_store(from)?;
        let access = linking.store.access();
        let requested = Path::new(file);
        let mut candidates: Vec<PathBuf> = Vec::new();
        if requested.is_absolute() {
            candidates.push(requested.to_path_buf());
        } else {
            if let Some(dir) = linking.path.parent() {
                candidates.push(dir.join(requested));
            }
            candidates.push(requested.to_path_buf());
        }

        let found = candidates
            .into_iter()
            .find(|p| p.is_file())
            .ok_or_else(|| Error::LinkedToFileNotThere(file.to_string()))?;
        let path = found
            .canonicalize()
            .map_err(|_| Error::LinkedToFileNotThere(file.to_string()))?;

        if let Some(key) = self.store_by_path(&path) {
            return Ok(key);
        }
        if !Store::is_store_file(&path) {
            return Err(Error::NotAStoreFile(path));
        }

        let opened = match access {
            Access::ReadWrite => Store::open(&path, Access::ReadWrite).or_else(|e| {
                tracing::debug!(path = %path.display(), error = %e, "linked file not writable, opening read-only");
                Store::open(&path, Access::ReadOnly)
            }),
            Access::ReadOnly => Store::open(&path, Access::ReadOnly),
        };
        let store = opened.map_err(|source| Error::FileOpen {
            path: path.clone(),
            source,
        })?;

        tracing::debug!(path = %path.display(), "opened linked file");
        self.attach_store(store, path)
    }

    pub(crate) fn is_link_node(&self, id: NodeId) -> Result<bool> {
        let r = self.node(id)?;
        Ok(attributes::is_link(self.store(r.store)?, r.object))
    }

    pub(crate) fn create_link(
        &mut self,
        parent: NodeId,
        name: &str,
        file: &str,
        target: &str,
    ) -> Result<NodeId> {
        let file = file.trim();
        let target = target.trim();
        if target.is_empty() {
            return Err(Error::StringLengthZero);
        }
        let target = if file.is_empty() && !target.starts_with('/') {
            format!("/{}", target)
        } else {
            target.to_string()
        };

        let id = self.create_node(parent, name)?;
        let r = self.node(id)?;
        let store = self.store_mut(r.store)?;
        let stamped = (|| -> Result<()> {
            attributes::write_str(store, r.object, attributes::A_TYPE, DataType::Link.tag())?;
            if file.is_empty() {
                store.create_soft_link(r.object, D_LINK, &target)?;
            } else {
                store.create_external_link(r.object, D_LINK, file, &target)?;
                attributes::write_text(store, r.object, D_FILE, file)?;
            }
            attributes::write_text(store, r.object, D_PATH, &target)
        })();

        if let Err(e) = stamped {
            // leave no half-made link behind
            if let Err(undo) = self.delete_node(parent, id) {
                tracing::warn!(error = %undo, "failed to remove incomplete link node");
            }
            return Err(e);
        }

        tracing::debug!(node = %id, file, target = %target, "created link");
        Ok(id)
    }

    pub(crate) fn link_path(&self, id: NodeId) -> Result<(String, String)> {
        let r = self.node(id)?;
        let store = self.store(r.store)?;
        if !attributes::is_link(store, r.object) {
            return Err(Error::NodeIsNotALink);
        }
        let file = if store.has_entry(r.object, D_FILE)? {
            attributes::read_text(store, r.object, D_FILE)?
        } else {
            String::new()
        };
        let path = attributes::read_text(store, r.object, D_PATH)?;
        Ok((file, path))
    }
}

impl Session {
    /// Whether the node itself is a link. Does not resolve.
    pub fn is_link(&mut self, node: NodeId) -> Result<bool> {
        self.run(|st| st.is_link_node(node))
    }

    /// Create a link node `name` under `parent`.
    ///
    /// An empty `file` makes a same-file link; a relative `target` then
    /// gets a leading `/`.
    pub fn link(&mut self, parent: NodeId, name: &str, file: &str, target: &str) -> Result<NodeId> {
        self.run(|st| st.create_link(parent, name, file, target))
    }

    /// Lengths of the link's file name and target path, `(0, 0)` for a
    /// plain node.
    pub fn link_path_length(&mut self, node: NodeId) -> Result<(usize, usize)> {
        self.run(|st| match st.link_path(node) {
            Ok((file, path)) => Ok((file.len(), path.len())),
            Err(Error::NodeIsNotALink) => Ok((0, 0)),
            Err(e) => Err(e),
        })
    }

    /// `(file, path)` of a link node. `file` is empty for same-file links.
    pub fn get_link_path(&mut self, node: NodeId) -> Result<(String, String)> {
        self.run(|st| st.link_path(node))
    }

    /// Follow a link (and any links it leads to) to a plain node.
    pub fn resolve(&mut self, node: NodeId) -> Result<NodeId> {
        self.run(|st| {
            let r = st.node(node)?;
            if !attributes::is_link(st.store(r.store)?, r.object) {
                return Err(Error::NodeIsNotALink);
            }
            let target = st.resolve_ref(r)?;
            Ok(st.lend(target))
        })
    }

    /// Handle for the node at `path`, relative to `parent` or absolute.
    ///
    /// Links along the way are followed; the final node is returned
    /// unresolved so a link can be addressed directly.
    pub fn get_node_id(&mut self, parent: NodeId, path: &str) -> Result<NodeId> {
        self.run(|st| {
            if path.trim().is_empty() {
                return Err(Error::StringLengthZero);
            }
            let start = st.node(parent)?;
            let found = st.walk_path(start, path, false)?;
            Ok(st.lend(found))
        })
    }
}
