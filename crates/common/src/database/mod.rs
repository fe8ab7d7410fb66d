//! Sessions, open files and node handles.
//!
//! A [`Session`] owns a fixed table of open-file slots. Opening the same
//! path twice shares one underlying store between two slots, and files
//! reached only through external links are opened on demand without a
//! slot. Node handles ([`NodeId`]) are lent out per session and stay
//! valid until released, until their node is deleted, or until the file
//! they point into is closed.

mod files;
mod handle;
mod migrate;
mod session;
mod state;

pub use files::{DatabaseVersion, OpenMode};
pub use handle::NodeId;
pub use session::Session;

pub(crate) use handle::{NodeRef, StoreKey};
pub(crate) use state::{child_ref, SessionState};
