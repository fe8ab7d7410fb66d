//! Plain value types shared by the store surface.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity of a group inside one store file.
///
/// Ids are never reused within a file, so two ids compare equal only
/// when they name the same group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(pub(crate) u64);

impl ObjectId {
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Element class of a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Datatype {
    UInt8,
    Int8,
    Int32,
    Int64,
    UInt32,
    UInt64,
    Float32,
    Float64,
}

impl Datatype {
    /// Size of one element in bytes
    pub fn size(&self) -> usize {
        match self {
            Datatype::UInt8 | Datatype::Int8 => 1,
            Datatype::Int32 | Datatype::UInt32 | Datatype::Float32 => 4,
            Datatype::Int64 | Datatype::UInt64 | Datatype::Float64 => 8,
        }
    }
}

/// Scalar attribute value attached to a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Attribute {
    Str(String),
    Int(i32),
}

impl Attribute {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Attribute::Str(s) => Some(s),
            Attribute::Int(_) => None,
        }
    }

    pub fn as_int(&self) -> Option<i32> {
        match self {
            Attribute::Int(v) => Some(*v),
            Attribute::Str(_) => None,
        }
    }
}

/// How a store file is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    ReadOnly,
    ReadWrite,
}

/// Byte order the dataset payloads of an image were written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ByteOrder {
    Little,
    Big,
}

impl ByteOrder {
    pub fn native() -> Self {
        if cfg!(target_endian = "big") {
            ByteOrder::Big
        } else {
            ByteOrder::Little
        }
    }
}
