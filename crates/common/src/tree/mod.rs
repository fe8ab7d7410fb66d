//! Node tree operations
//!
//! Every node is a group in the underlying store. Its fixed attributes
//! (`name`, `label`, `type`, and `order` under creation ordering) are
//! scalar attributes on that group, and its payload is a dataset stored
//! under a reserved entry name:
//!
//! ```text
//! group "Zone"                      attributes: name="Zone" label="Zone_t" type="I4"
//!  |-- " data"    dataset           payload, extents reversed on disk
//!  |-- "GridCoordinates"  group     child node
//!  `-- "Elements"         group     link node, type="LK"
//!       |-- " link"   soft/external link in the store
//!       |-- " path"   C1 dataset: target path
//!       `-- " file"   C1 dataset: target file (external links only)
//! ```
//!
//! Entries whose names start with a space are never reported as
//! children, and node names can never start with one.
//!
//! The operations are methods on [`Session`](crate::database::Session),
//! grouped here by concern:
//!
//! - [`attributes`]: name and label rules
//! - [`data_type`]: type tags and element types
//! - `link`: link nodes and path resolution
//! - `children`: listing, paging and ordering
//! - `lifecycle`: create, delete, move, rename, dimensions
//! - `hyperslab`: strided sub-range I/O
//! - `block`: linear range I/O

pub mod attributes;
mod block;
mod children;
pub mod data_type;
mod hyperslab;
mod lifecycle;
mod link;

pub use attributes::{check_label, check_name, MAX_LABEL_LEN, MAX_NAME_LEN};
pub use children::{Child, Children};
pub use data_type::{DataType, Element, MAX_DIMENSIONS};
pub use hyperslab::Hyperslab;
