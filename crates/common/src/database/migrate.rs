//! One-time axis-order migration of legacy files.
//!
//! Legacy files store payload extents in caller order. Current files
//! store them reversed for rank two and up. The element bytes are laid
//! out the same way in both, so migrating only relabels extents. The
//! legacy root marker is renamed once every payload has been relabelled,
//! which makes a second pass a no-op.

use object_store::Store;

use crate::error::Result;
use crate::tree::attributes::{self, is_reserved, D_DATA, D_LEGACY_VERSION, D_VERSION};

/// Whether the root still carries the legacy marker.
pub(crate) fn is_legacy(store: &Store) -> Result<bool> {
    Ok(store.has_entry(store.root(), D_LEGACY_VERSION)?)
}

/// Migrate a writable store in place. Returns how many payloads were
/// relabelled.
pub(crate) fn migrate(store: &mut Store) -> Result<usize> {
    let root = store.root();
    if !is_legacy(store)? {
        return Ok(0);
    }

    let mut relabelled = 0;
    let mut stack = vec![root];
    while let Some(obj) = stack.pop() {
        // link nodes carry no payload, and what they point at is
        // migrated when its own file is opened for writing
        if attributes::is_link(store, obj) {
            continue;
        }

        let reversed = match store.dataset(obj, D_DATA) {
            Ok(ds) if ds.rank() > 1 => Some(ds.dims().iter().rev().copied().collect::<Vec<u64>>()),
            _ => None,
        };
        if let Some(dims) = reversed {
            store.dataset_mut(obj, D_DATA)?.set_extent(&dims)?;
            relabelled += 1;
        }

        stack.extend(
            store
                .entries(obj)?
                .filter(|(name, _)| !is_reserved(name))
                .filter_map(|(_, entry)| entry.as_group()),
        );
    }

    if store.has_entry(root, D_VERSION)? {
        store.unlink(root, D_LEGACY_VERSION)?;
    } else {
        store.move_entry(root, D_LEGACY_VERSION, root, D_VERSION)?;
    }
    store.flush()?;

    tracing::info!(path = %store.path().display(), relabelled, "migrated legacy axis order");
    Ok(relabelled)
}
