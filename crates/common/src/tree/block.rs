//! Linear element ranges over the flattened payload.

use super::attributes::{self, D_DATA};
use super::hyperslab::payload;
use crate::database::{NodeId, Session, SessionState};
use crate::error::{Error, Result};

/// Copy the payload into a freshly reserved scratch buffer.
fn scratch(bytes: &[u8]) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(bytes.len())
        .map_err(|_| Error::MemoryAllocationFailed(bytes.len()))?;
    buf.extend_from_slice(bytes);
    Ok(buf)
}

fn check_range(start: usize, end: usize) -> Result<()> {
    if start > end {
        return Err(Error::MinimumGreaterThanMaximum);
    }
    if start < 1 {
        return Err(Error::StartOutOfRange);
    }
    Ok(())
}

impl SessionState {
    pub(crate) fn read_block(&mut self, node: NodeId, start: usize, end: usize, buf: &mut [u8]) -> Result<()> {
        check_range(start, end)?;
        let n = self.node(node)?;
        let n = self.resolve_ref(n)?;
        let ds = payload(self.store(n.store)?, n.object)?;
        if end as u64 > ds.len() {
            return Err(Error::EndOutOfRange);
        }

        let size = ds.datatype().size();
        let (from, to) = ((start - 1) * size, end * size);
        if buf.len() < to - from {
            return Err(Error::BufferTooSmall {
                expected: to - from,
                actual: buf.len(),
            });
        }
        let whole = scratch(ds.as_bytes())?;
        buf[..to - from].copy_from_slice(&whole[from..to]);
        Ok(())
    }

    /// Read-modify-write of the whole payload with `start..=end` replaced.
    pub(crate) fn write_block(&mut self, node: NodeId, start: usize, end: usize, buf: &[u8]) -> Result<()> {
        check_range(start, end)?;
        let n = self.node(node)?;
        let store = self.store_mut(n.store)?;
        if attributes::is_link(store, n.object) {
            return Err(Error::LinkDataNotAllowed);
        }
        let ds = payload(store, n.object)?;
        if end as u64 > ds.len() {
            return Err(Error::EndOutOfRange);
        }

        let size = ds.datatype().size();
        let (from, to) = ((start - 1) * size, end * size);
        if buf.len() < to - from {
            return Err(Error::BufferTooSmall {
                expected: to - from,
                actual: buf.len(),
            });
        }
        let mut whole = scratch(ds.as_bytes())?;
        whole[from..to].copy_from_slice(&buf[..to - from]);
        store
            .dataset_mut(n.object, D_DATA)?
            .as_bytes_mut()
            .copy_from_slice(&whole);
        Ok(())
    }
}

impl Session {
    /// Read elements `start..=end` (1-based) of the flattened payload.
    pub fn read_block(&mut self, node: NodeId, start: usize, end: usize, buf: &mut [u8]) -> Result<()> {
        self.run(|st| st.read_block(node, start, end, buf))
    }

    pub fn write_block(&mut self, node: NodeId, start: usize, end: usize, buf: &[u8]) -> Result<()> {
        self.run(|st| st.write_block(node, start, end, buf))
    }
}
