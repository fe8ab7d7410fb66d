//! Single-File Hierarchical Object Store
//!
//! This crate provides the storage layer underneath the ADF node tree: a
//! file holding a hierarchy of groups, each carrying scalar attributes and
//! named entries. An entry is a child group, a typed n-dimensional
//! dataset, a soft link to an absolute path in the same file, or an
//! external link to a path in another file.
//!
//! # Features
//!
//! - Whole-image reads and atomic whole-image writes (temp file + rename)
//! - BLAKE3 checksum over the encoded image
//! - Stable group ids for the lifetime of a file
//! - Dataset payloads converted to native byte order on open
//!
//! # Example
//!
//! ```rust,no_run
//! use adf_object_store::{Access, Attribute, Datatype, Store};
//!
//! # fn example() -> Result<(), adf_object_store::StoreError> {
//! let mut store = Store::create("/tmp/mesh.adf")?;
//! let root = store.root();
//! let zone = store.create_group(root, "Zone")?;
//! store.create_attribute(zone, "label", Attribute::Str("Zone_t".into()))?;
//! store.create_dataset(zone, "data", Datatype::Float64, &[3, 4])?;
//! store.close()?;
//!
//! let store = Store::open("/tmp/mesh.adf", Access::ReadOnly)?;
//! assert_eq!(store.dataset(zone, "data")?.dims(), &[3, 4]);
//! # Ok(())
//! # }
//! ```

mod error;
mod file;
mod store;
mod tree;
mod types;

pub use error::{Result, StoreError};
pub use store::Store;
pub use tree::{Dataset, Entry};
pub use types::{Access, Attribute, ByteOrder, Datatype, ObjectId};
