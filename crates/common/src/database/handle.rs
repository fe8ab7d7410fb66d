use std::fmt;

use object_store::ObjectId;

/// Opaque handle to a node, lent out by a [`Session`](super::Session).
///
/// The numeric value is stable for the life of the session only. Every
/// handle a call returns must eventually be given back with
/// [`Session::release`](super::Session::release).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl From<u64> for NodeId {
    fn from(raw: u64) -> Self {
        NodeId(raw)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Key of an open store within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct StoreKey(pub(crate) u64);

/// What a handle points at: a group inside one open store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct NodeRef {
    pub store: StoreKey,
    pub object: ObjectId,
}
