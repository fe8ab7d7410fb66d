/**
 * Engine configuration.
 *  Slot table size, link depth, child ordering
 *  and the error state, loadable from TOML.
 */
pub mod config;
/**
 * Sessions and open database files.
 *  Opening, sharing, closing and migrating files,
 *  and the handles lent out for their nodes.
 */
pub mod database;
/**
 * Error type and the stable numeric codes
 *  reported to callers.
 */
pub mod error;
/**
 * The node tree itself: naming rules, data types,
 *  links, children, hyperslab and block I/O.
 */
pub mod tree;
/**
 * Library version and native format strings.
 */
pub mod version;

pub mod prelude {
    pub use crate::config::{ChildOrdering, EngineConfig, ErrorState};
    pub use crate::database::{DatabaseVersion, NodeId, OpenMode, Session};
    pub use crate::error::{Error, ErrorCode, Result};
    pub use crate::tree::{Child, Children, DataType, Element, Hyperslab};
}
