//! Child listing, paging and ordering.

use object_store::{ObjectId, Store};

use super::attributes::{self, is_reserved, A_ORDER};
use crate::config::ChildOrdering;
use crate::database::{child_ref, NodeId, NodeRef, Session, SessionState};
use crate::error::Result;

/// Children of a group in presentation order.
pub(crate) fn ordered(
    store: &Store,
    parent: ObjectId,
    ordering: ChildOrdering,
) -> Result<Vec<(&str, ObjectId)>> {
    let mut kids: Vec<(&str, ObjectId)> = store
        .entries(parent)?
        .filter(|(name, _)| !is_reserved(name))
        .filter_map(|(name, entry)| entry.as_group().map(|id| (name, id)))
        .collect();

    if ordering == ChildOrdering::Creation {
        // unordered children (e.g. written by name-ordered sessions) go last
        kids.sort_by_key(|(name, id)| (attributes::order(store, *id).unwrap_or(i32::MAX), *name));
    }
    Ok(kids)
}

pub(crate) fn count(store: &Store, parent: ObjectId) -> Result<usize> {
    Ok(store
        .entries(parent)?
        .filter(|(name, entry)| !is_reserved(name) && entry.as_group().is_some())
        .count())
}

/// Name under which `parent` holds exactly this group, if it does.
pub(crate) fn name_of(store: &Store, parent: ObjectId, child: ObjectId) -> Result<Option<String>> {
    Ok(store
        .entries(parent)?
        .find(|(name, entry)| !is_reserved(name) && entry.as_group() == Some(child))
        .map(|(name, _)| name.to_string()))
}

/// Close the gap left by a child that held position `removed`.
pub(crate) fn close_gap(store: &mut Store, parent: ObjectId, removed: i32) -> Result<()> {
    let later: Vec<(ObjectId, i32)> = ordered(store, parent, ChildOrdering::Creation)?
        .into_iter()
        .filter_map(|(_, id)| attributes::order(store, id).map(|o| (id, o)))
        .filter(|(_, o)| *o > removed)
        .collect();
    for (id, o) in later {
        attributes::write_int(store, id, A_ORDER, o - 1)?;
    }
    Ok(())
}

/// A child seen during iteration. Turn it into a handle with
/// [`Session::open_child`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Child {
    name: String,
    node: NodeRef,
}

impl Child {
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Iterator over a snapshot of a node's children.
///
/// It holds no borrow of the session, so children can be opened while
/// iterating. Changes made meanwhile are not seen; ask the session again
/// to start over.
#[derive(Debug)]
pub struct Children {
    parent: NodeRef,
    inner: std::vec::IntoIter<(String, ObjectId)>,
}

impl Iterator for Children {
    type Item = Child;

    fn next(&mut self) -> Option<Child> {
        self.inner.next().map(|(name, id)| Child {
            name,
            node: child_ref(self.parent, id),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl SessionState {
    fn resolved_children(&mut self, node: NodeId) -> Result<(NodeRef, Vec<(String, ObjectId)>)> {
        let r = self.node(node)?;
        let r = self.resolve_ref(r)?;
        let kids = ordered(self.store(r.store)?, r.object, self.config.child_ordering)?
            .into_iter()
            .map(|(name, id)| (name.to_string(), id))
            .collect();
        Ok((r, kids))
    }
}

impl Session {
    /// Number of children, following links.
    pub fn number_of_children(&mut self, node: NodeId) -> Result<usize> {
        self.run(|st| {
            let r = st.node(node)?;
            let r = st.resolve_ref(r)?;
            count(st.store(r.store)?, r.object)
        })
    }

    /// Names of up to `count` children starting at 0-based `start`.
    pub fn children_names(&mut self, node: NodeId, start: usize, count: usize) -> Result<Vec<String>> {
        self.run(|st| {
            let (_, kids) = st.resolved_children(node)?;
            Ok(kids
                .into_iter()
                .skip(start)
                .take(count)
                .map(|(name, _)| name)
                .collect())
        })
    }

    /// Handles of up to `count` children starting at 0-based `start`.
    /// Each handle must be released.
    pub fn children_ids(&mut self, node: NodeId, start: usize, count: usize) -> Result<Vec<NodeId>> {
        self.run(|st| {
            let (parent, kids) = st.resolved_children(node)?;
            Ok(kids
                .into_iter()
                .skip(start)
                .take(count)
                .map(|(_, id)| st.lend(child_ref(parent, id)))
                .collect())
        })
    }

    /// Whether a plain child called `name` exists, following links.
    pub fn has_child(&mut self, node: NodeId, name: &str) -> Result<bool> {
        self.run(|st| {
            let r = st.node(node)?;
            let r = st.resolve_ref(r)?;
            let name = name.trim();
            if name.is_empty() || is_reserved(name) {
                return Ok(false);
            }
            Ok(st
                .store(r.store)?
                .entry(r.object, name)
                .map(|e| e.as_group().is_some())
                .unwrap_or(false))
        })
    }

    /// Iterate the children of a node, following links.
    pub fn children(&mut self, node: NodeId) -> Result<Children> {
        self.run(|st| {
            let (parent, kids) = st.resolved_children(node)?;
            Ok(Children {
                parent,
                inner: kids.into_iter(),
            })
        })
    }

    /// Lend a handle for a child produced by [`Session::children`].
    pub fn open_child(&mut self, child: &Child) -> Result<NodeId> {
        self.run(|st| {
            st.store(child.node.store)?;
            Ok(st.lend(child.node))
        })
    }
}
