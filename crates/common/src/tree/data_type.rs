//! Node type tags and the element types behind them.

use std::fmt;
use std::str::FromStr;

use object_store::Datatype;

use crate::error::Error;

/// Type tag of a node.
///
/// `Empty` and `Link` carry no payload; the rest name an element type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    Empty,
    Link,
    Byte,
    Char,
    Int32,
    Int64,
    UInt32,
    UInt64,
    Float32,
    Float64,
}

const TAGS: &[(DataType, &str)] = &[
    (DataType::Empty, "MT"),
    (DataType::Link, "LK"),
    (DataType::Byte, "B1"),
    (DataType::Char, "C1"),
    (DataType::Int32, "I4"),
    (DataType::Int64, "I8"),
    (DataType::UInt32, "U4"),
    (DataType::UInt64, "U8"),
    (DataType::Float32, "R4"),
    (DataType::Float64, "R8"),
];

impl DataType {
    pub fn tag(self) -> &'static str {
        TAGS.iter()
            .find(|(dt, _)| *dt == self)
            .map(|(_, tag)| *tag)
            .unwrap_or("MT")
    }

    /// Whether nodes of this type hold a payload.
    pub fn has_payload(self) -> bool {
        !matches!(self, DataType::Empty | DataType::Link)
    }

    /// Element size in bytes, `None` for payload-less types.
    pub fn element_size(self) -> Option<usize> {
        self.datatype().map(|dt| dt.size())
    }

    pub(crate) fn datatype(self) -> Option<Datatype> {
        Some(match self {
            DataType::Empty | DataType::Link => return None,
            DataType::Byte => Datatype::UInt8,
            DataType::Char => Datatype::Int8,
            DataType::Int32 => Datatype::Int32,
            DataType::Int64 => Datatype::Int64,
            DataType::UInt32 => Datatype::UInt32,
            DataType::UInt64 => Datatype::UInt64,
            DataType::Float32 => Datatype::Float32,
            DataType::Float64 => Datatype::Float64,
        })
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for DataType {
    type Err = Error;

    /// Only the first two characters count, compared case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let head: String = s.chars().take(2).collect::<String>().to_ascii_uppercase();
        TAGS.iter()
            .find(|(_, tag)| *tag == head)
            .map(|(dt, _)| *dt)
            .ok_or_else(|| Error::InvalidDataType(s.to_string()))
    }
}

/// Largest payload rank.
pub const MAX_DIMENSIONS: usize = 12;

/// Extents as the store keeps them.
///
/// Files carrying the current version marker store the extents of rank
/// two and up reversed, so that axis 0 varies fastest in the flat buffer.
/// Legacy files store them as given.
pub(crate) fn to_storage_order(dims: &[usize], legacy: bool) -> Vec<u64> {
    let mut stored: Vec<u64> = dims.iter().map(|d| *d as u64).collect();
    if !legacy && stored.len() > 1 {
        stored.reverse();
    }
    stored
}

/// Inverse of [`to_storage_order`].
pub(crate) fn from_storage_order(stored: &[u64], legacy: bool) -> Vec<usize> {
    let mut dims: Vec<usize> = stored.iter().map(|d| *d as usize).collect();
    if !legacy && dims.len() > 1 {
        dims.reverse();
    }
    dims
}

/// A Rust scalar that can live in a node payload.
pub trait Element: Copy + Default {
    const DATA_TYPE: DataType;
    const SIZE: usize;

    fn read_ne(bytes: &[u8]) -> Self;
    fn write_ne(self, out: &mut [u8]);
}

macro_rules! element {
    ($t:ty, $dt:expr) => {
        impl Element for $t {
            const DATA_TYPE: DataType = $dt;
            const SIZE: usize = std::mem::size_of::<$t>();

            fn read_ne(bytes: &[u8]) -> Self {
                let mut raw = [0u8; std::mem::size_of::<$t>()];
                raw.copy_from_slice(&bytes[..Self::SIZE]);
                <$t>::from_ne_bytes(raw)
            }

            fn write_ne(self, out: &mut [u8]) {
                out[..Self::SIZE].copy_from_slice(&self.to_ne_bytes());
            }
        }
    };
}

element!(u8, DataType::Byte);
element!(i8, DataType::Char);
element!(i32, DataType::Int32);
element!(i64, DataType::Int64);
element!(u32, DataType::UInt32);
element!(u64, DataType::UInt64);
element!(f32, DataType::Float32);
element!(f64, DataType::Float64);

/// Encode a slice of elements as native-endian bytes.
pub fn to_bytes<T: Element>(values: &[T]) -> Vec<u8> {
    let mut out = vec![0u8; values.len() * T::SIZE];
    for (v, chunk) in values.iter().zip(out.chunks_exact_mut(T::SIZE)) {
        v.write_ne(chunk);
    }
    out
}

/// Decode native-endian bytes; a trailing partial element is ignored.
pub fn from_bytes<T: Element>(bytes: &[u8]) -> Vec<T> {
    bytes.chunks_exact(T::SIZE).map(T::read_ne).collect()
}
