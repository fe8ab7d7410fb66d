//! Strided sub-range transfer between a payload and a caller buffer.
//!
//! Both sides are addressed in caller axis order, 1-based and inclusive,
//! with axis 0 varying fastest. Elements move pairwise in selection
//! order, so the disk and memory selections may have different shapes
//! as long as they select the same number of elements.

use object_store::{Dataset, ObjectId, Store};

use super::attributes::{self, D_DATA};
use super::data_type::{from_bytes, from_storage_order, to_bytes, Element, MAX_DIMENSIONS};
use crate::database::{NodeId, NodeRef, Session, SessionState};
use crate::error::{Error, Result};

/// A strided selection: per axis, `start..=end` every `stride` elements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hyperslab {
    pub start: Vec<usize>,
    pub end: Vec<usize>,
    pub stride: Vec<usize>,
}

impl Hyperslab {
    pub fn new(start: impl Into<Vec<usize>>, end: impl Into<Vec<usize>>, stride: impl Into<Vec<usize>>) -> Self {
        Hyperslab {
            start: start.into(),
            end: end.into(),
            stride: stride.into(),
        }
    }

    /// Every element of an array of extent `dims`.
    pub fn full(dims: &[usize]) -> Self {
        Hyperslab {
            start: vec![1; dims.len()],
            end: dims.to_vec(),
            stride: vec![1; dims.len()],
        }
    }

    pub fn rank(&self) -> usize {
        self.start.len()
    }

    /// Validate against `extent`, axis by axis.
    fn select(&self, extent: &[usize]) -> Result<Selection> {
        let rank = extent.len();
        if self.start.len() != rank || self.end.len() != rank || self.stride.len() != rank {
            return Err(Error::BadNumberOfDimensions(self.start.len()));
        }

        let mut origin = Vec::with_capacity(rank);
        let mut counts = Vec::with_capacity(rank);
        for n in 0..rank {
            let (start, end, stride) = (self.start[n], self.end[n], self.stride[n]);
            if start < 1 {
                return Err(Error::StartOutOfRange);
            }
            if end > extent[n] {
                return Err(Error::EndOutOfRange);
            }
            if start > end {
                return Err(Error::MinimumGreaterThanMaximum);
            }
            if stride < 1 || stride > end - start + 1 {
                return Err(Error::BadStrideValue);
            }
            origin.push(start - 1);
            // floor: a partial trailing stride does not count
            counts.push((end - start + 1) / stride);
        }

        let len = checked_product(&counts).ok_or(Error::BadDimensionValue)?;
        let mut pitch = Vec::with_capacity(rank);
        let mut acc = 1usize;
        for d in extent {
            pitch.push(acc);
            acc = acc.saturating_mul(*d);
        }

        Ok(Selection {
            origin,
            step: self.stride.clone(),
            counts,
            pitch,
            len,
        })
    }
}

#[derive(Debug)]
struct Selection {
    origin: Vec<usize>,
    step: Vec<usize>,
    counts: Vec<usize>,
    pitch: Vec<usize>,
    len: usize,
}

impl Selection {
    fn len(&self) -> usize {
        self.len
    }

    /// Linear element offsets in selection order.
    fn offsets(&self) -> Offsets<'_> {
        Offsets {
            sel: self,
            index: vec![0; self.counts.len()],
            remaining: self.len(),
        }
    }
}

struct Offsets<'a> {
    sel: &'a Selection,
    index: Vec<usize>,
    remaining: usize,
}

impl Iterator for Offsets<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.remaining == 0 {
            return None;
        }
        let sel = self.sel;
        let offset = (0..self.index.len())
            .map(|n| (sel.origin[n] + self.index[n] * sel.step[n]) * sel.pitch[n])
            .sum();

        self.remaining -= 1;
        for n in 0..self.index.len() {
            self.index[n] += 1;
            if self.index[n] < sel.counts[n] {
                break;
            }
            self.index[n] = 0;
        }
        Some(offset)
    }
}

fn checked_product(values: &[usize]) -> Option<usize> {
    values.iter().try_fold(1usize, |acc, v| acc.checked_mul(*v))
}

/// Bytes needed for an array of extent `dims`, or `BadDimensionValue`
/// when that does not fit in memory.
fn byte_len(dims: &[usize], element_size: usize) -> Result<usize> {
    checked_product(dims)
        .and_then(|n| n.checked_mul(element_size))
        .filter(|n| *n <= isize::MAX as usize)
        .ok_or(Error::BadDimensionValue)
}

/// The node's payload, or `NoData`.
pub(crate) fn payload(store: &Store, obj: ObjectId) -> Result<&Dataset> {
    store.dataset(obj, D_DATA).map_err(|_| Error::NoData)
}

fn check_element<T: Element>(store: &Store, obj: ObjectId) -> Result<()> {
    let actual = attributes::data_type(store, obj)?;
    if actual != T::DATA_TYPE {
        return Err(Error::InvalidDataType(actual.tag().to_string()));
    }
    Ok(())
}

/// Validate both sides of a transfer.
fn plan(
    extent: &[usize],
    disk: &Hyperslab,
    mem_dims: &[usize],
    mem: &Hyperslab,
    element_size: usize,
    buf_len: usize,
) -> Result<(Selection, Selection)> {
    if disk.rank() != extent.len() {
        return Err(Error::BadNumberOfDimensions(disk.rank()));
    }
    let on_disk = disk.select(extent)?;

    if mem_dims.is_empty() || mem_dims.len() > MAX_DIMENSIONS || mem.rank() != mem_dims.len() {
        return Err(Error::BadNumberOfDimensions(mem_dims.len()));
    }
    if mem_dims.contains(&0) {
        return Err(Error::BadDimensionValue);
    }
    let in_memory = mem.select(mem_dims)?;

    if on_disk.len() != in_memory.len() {
        return Err(Error::UnequalMemoryAndDiskDims {
            disk: on_disk.len(),
            memory: in_memory.len(),
        });
    }

    let needed = byte_len(mem_dims, element_size)?;
    if buf_len < needed {
        return Err(Error::BufferTooSmall {
            expected: needed,
            actual: buf_len,
        });
    }
    Ok((on_disk, in_memory))
}

impl SessionState {
    /// Resolve `node` and check a read of it into `buf_len` bytes.
    fn plan_read(
        &mut self,
        node: NodeId,
        disk: &Hyperslab,
        mem_dims: &[usize],
        mem: &Hyperslab,
        buf_len: usize,
    ) -> Result<(NodeRef, Selection, Selection, usize)> {
        let n = self.node(node)?;
        let n = self.resolve_ref(n)?;
        let legacy = self.is_legacy(n.store);
        let ds = payload(self.store(n.store)?, n.object)?;
        if legacy && ds.rank() > 1 {
            return Err(Error::NeedsTranspose);
        }

        let extent = from_storage_order(ds.dims(), legacy);
        let size = ds.datatype().size();
        let (on_disk, in_memory) = plan(&extent, disk, mem_dims, mem, size, buf_len)?;
        Ok((n, on_disk, in_memory, size))
    }

    pub(crate) fn read_data(
        &mut self,
        node: NodeId,
        disk: &Hyperslab,
        mem_dims: &[usize],
        mem: &Hyperslab,
        buf: &mut [u8],
    ) -> Result<()> {
        let (n, on_disk, in_memory, size) = self.plan_read(node, disk, mem_dims, mem, buf.len())?;
        let src = payload(self.store(n.store)?, n.object)?.as_bytes();
        for (d, m) in on_disk.offsets().zip(in_memory.offsets()) {
            buf[m * size..(m + 1) * size].copy_from_slice(&src[d * size..(d + 1) * size]);
        }
        Ok(())
    }

    pub(crate) fn write_data(
        &mut self,
        node: NodeId,
        disk: &Hyperslab,
        mem_dims: &[usize],
        mem: &Hyperslab,
        buf: &[u8],
    ) -> Result<()> {
        let n = self.node(node)?;
        let legacy = self.is_legacy(n.store);
        let store = self.store_mut(n.store)?;
        if attributes::is_link(store, n.object) {
            return Err(Error::LinkDataNotAllowed);
        }
        let ds = payload(store, n.object)?;
        if legacy && ds.rank() > 1 {
            return Err(Error::NeedsTranspose);
        }

        let extent = from_storage_order(ds.dims(), legacy);
        let size = ds.datatype().size();
        let (on_disk, in_memory) = plan(&extent, disk, mem_dims, mem, size, buf.len())?;

        let dst = store.dataset_mut(n.object, D_DATA)?.as_bytes_mut();
        for (d, m) in on_disk.offsets().zip(in_memory.offsets()) {
            dst[d * size..(d + 1) * size].copy_from_slice(&buf[m * size..(m + 1) * size]);
        }
        Ok(())
    }

    pub(crate) fn read_all(&mut self, node: NodeId, buf: &mut [u8]) -> Result<()> {
        let n = self.node(node)?;
        let n = self.resolve_ref(n)?;
        let src = payload(self.store(n.store)?, n.object)?.as_bytes();
        if buf.len() < src.len() {
            return Err(Error::BufferTooSmall {
                expected: src.len(),
                actual: buf.len(),
            });
        }
        buf[..src.len()].copy_from_slice(src);
        Ok(())
    }

    pub(crate) fn write_all(&mut self, node: NodeId, buf: &[u8]) -> Result<()> {
        let n = self.node(node)?;
        let store = self.store_mut(n.store)?;
        if attributes::is_link(store, n.object) {
            return Err(Error::LinkDataNotAllowed);
        }
        let len = payload(store, n.object)?.as_bytes().len();
        if buf.len() < len {
            return Err(Error::BufferTooSmall {
                expected: len,
                actual: buf.len(),
            });
        }
        store
            .dataset_mut(n.object, D_DATA)?
            .as_bytes_mut()
            .copy_from_slice(&buf[..len]);
        Ok(())
    }

    /// Element type check against the node the handle leads to.
    fn expect_element<T: Element>(&mut self, node: NodeId) -> Result<()> {
        let n = self.node(node)?;
        let n = self.resolve_ref(n)?;
        check_element::<T>(self.store(n.store)?, n.object)
    }
}

impl Session {
    /// Copy the `disk` selection of the payload into the `mem` selection
    /// of `buf`, an array of extent `mem_dims`.
    pub fn read_data(
        &mut self,
        node: NodeId,
        disk: &Hyperslab,
        mem_dims: &[usize],
        mem: &Hyperslab,
        buf: &mut [u8],
    ) -> Result<()> {
        self.run(|st| st.read_data(node, disk, mem_dims, mem, buf))
    }

    /// Copy the `mem` selection of `buf` into the `disk` selection of the
    /// payload. Link nodes are refused; resolve them first.
    pub fn write_data(
        &mut self,
        node: NodeId,
        disk: &Hyperslab,
        mem_dims: &[usize],
        mem: &Hyperslab,
        buf: &[u8],
    ) -> Result<()> {
        self.run(|st| st.write_data(node, disk, mem_dims, mem, buf))
    }

    pub fn read_data_as<T: Element>(
        &mut self,
        node: NodeId,
        disk: &Hyperslab,
        mem_dims: &[usize],
        mem: &Hyperslab,
    ) -> Result<Vec<T>> {
        self.run(|st| {
            st.expect_element::<T>(node)?;
            let len = byte_len(mem_dims, T::SIZE)?;
            st.plan_read(node, disk, mem_dims, mem, len)?;
            let mut buf = Vec::new();
            buf.try_reserve_exact(len)
                .map_err(|_| Error::MemoryAllocationFailed(len))?;
            buf.resize(len, 0u8);
            st.read_data(node, disk, mem_dims, mem, &mut buf)?;
            Ok(from_bytes(&buf))
        })
    }

    pub fn write_data_from<T: Element>(
        &mut self,
        node: NodeId,
        disk: &Hyperslab,
        mem_dims: &[usize],
        mem: &Hyperslab,
        values: &[T],
    ) -> Result<()> {
        self.run(|st| {
            st.expect_element::<T>(node)?;
            st.write_data(node, disk, mem_dims, mem, &to_bytes(values))
        })
    }

    /// Copy the whole payload into `buf`.
    pub fn read_all(&mut self, node: NodeId, buf: &mut [u8]) -> Result<()> {
        self.run(|st| st.read_all(node, buf))
    }

    /// Overwrite the whole payload from the front of `buf`.
    pub fn write_all(&mut self, node: NodeId, buf: &[u8]) -> Result<()> {
        self.run(|st| st.write_all(node, buf))
    }

    /// The whole payload as typed elements, in storage order.
    pub fn read_all_as<T: Element>(&mut self, node: NodeId) -> Result<Vec<T>> {
        self.run(|st| {
            st.expect_element::<T>(node)?;
            let n = st.node(node)?;
            let n = st.resolve_ref(n)?;
            Ok(from_bytes(payload(st.store(n.store)?, n.object)?.as_bytes()))
        })
    }

    pub fn write_all_from<T: Element>(&mut self, node: NodeId, values: &[T]) -> Result<()> {
        self.run(|st| {
            st.expect_element::<T>(node)?;
            st.write_all(node, &to_bytes(values))
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_check_order_per_axis() {
        let extent = [4, 4];
        let slab = Hyperslab::new([0, 1], [9, 1], [0, 1]);
        assert!(matches!(slab.select(&extent), Err(Error::StartOutOfRange)));

        let slab = Hyperslab::new([3, 1], [9, 1], [0, 1]);
        assert!(matches!(slab.select(&extent), Err(Error::EndOutOfRange)));

        let slab = Hyperslab::new([3, 1], [2, 1], [0, 1]);
        assert!(matches!(
            slab.select(&extent),
            Err(Error::MinimumGreaterThanMaximum)
        ));

        let slab = Hyperslab::new([1, 1], [2, 1], [3, 1]);
        assert!(matches!(slab.select(&extent), Err(Error::BadStrideValue)));

        let slab = Hyperslab::new([1, 1], [2, 1], [0, 1]);
        assert!(matches!(slab.select(&extent), Err(Error::BadStrideValue)));
    }

    #[test]
    fn test_count_floors_partial_stride() {
        let sel = Hyperslab::new([1], [3], [2]).select(&[5]).unwrap();
        assert_eq!(sel.len(), 1);
        let sel = Hyperslab::new([1], [4], [2]).select(&[5]).unwrap();
        assert_eq!(sel.len(), 2);
    }

    #[test]
    fn test_offsets_axis_zero_fastest() {
        // 3x2 array, select rows 2..=3 of both columns
        let sel = Hyperslab::new([2, 1], [3, 2], [1, 1]).select(&[3, 2]).unwrap();
        let offsets: Vec<usize> = sel.offsets().collect();
        assert_eq!(offsets, vec![1, 2, 4, 5]);
    }

    #[test]
    fn test_strided_offsets() {
        let sel = Hyperslab::new([1, 1], [4, 3], [2, 2]).select(&[4, 3]).unwrap();
        let offsets: Vec<usize> = sel.offsets().collect();
        // rows 1,3 and column 1 (count floors 3/2 to 1)
        assert_eq!(offsets, vec![0, 2]);
    }

    #[test]
    fn test_plan_mismatch() {
        let disk = Hyperslab::new([1], [6], [1]);
        let mem = Hyperslab::new([1], [5], [1]);
        let result = plan(&[6], &disk, &[5], &mem, 4, 20);
        assert!(matches!(
            result,
            Err(Error::UnequalMemoryAndDiskDims { disk: 6, memory: 5 })
        ));
    }

    #[test]
    fn test_byte_len_overflow() {
        assert_eq!(byte_len(&[3, 2], 8).unwrap(), 48);
        assert!(matches!(
            byte_len(&[usize::MAX / 2, 4], 1),
            Err(Error::BadDimensionValue)
        ));
        assert!(matches!(
            byte_len(&[usize::MAX / 4], 8),
            Err(Error::BadDimensionValue)
        ));
    }

    #[test]
    fn test_select_count_overflow() {
        let extent = [usize::MAX, usize::MAX];
        let slab = Hyperslab::new([1, 1], [usize::MAX, usize::MAX], [1, 1]);
        assert!(matches!(slab.select(&extent), Err(Error::BadDimensionValue)));
    }

    #[test]
    fn test_plan_buffer_too_small() {
        let slab = Hyperslab::full(&[4]);
        let result = plan(&[4], &slab, &[4], &slab, 8, 31);
        assert!(matches!(
            result,
            Err(Error::BufferTooSmall {
                expected: 32,
                actual: 31
            })
        ));
    }
}
