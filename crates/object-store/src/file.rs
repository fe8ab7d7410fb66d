//! On-disk image layout.
//!
//! ```text
//! +---------+-----------+-------------+-----------------+-------------+
//! | magic 8 | version 4 | payload len | bincode payload | blake3 (32) |
//! +---------+-----------+-------------+-----------------+-------------+
//! ```
//!
//! Integers in the frame are little-endian. The payload is an [`Image`]
//! and the checksum covers the payload bytes only. Images are always
//! rewritten whole, through a temp file in the same directory that is
//! renamed over the target.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use uuid::Uuid;

use crate::error::{Result, StoreError};
use crate::tree::Tree;
use crate::types::ByteOrder;

pub(crate) const MAGIC: [u8; 8] = [0x89, b'A', b'D', b'F', b'T', b'\r', b'\n', 0x1a];
pub(crate) const FORMAT_VERSION: u32 = 1;

const FRAME_LEN: usize = MAGIC.len() + 4 + 8;
const CHECKSUM_LEN: usize = 32;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct Header {
    pub file_id: Uuid,
    pub byte_order: ByteOrder,
    /// Unix seconds
    pub created_at: i64,
    pub modified_at: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct Image {
    pub header: Header,
    pub tree: Tree,
}

/// Cheap sniff: does the file start with the store magic?
pub(crate) fn has_magic(path: &Path) -> bool {
    let mut buf = [0u8; 8];
    match File::open(path) {
        Ok(mut f) => f.read_exact(&mut buf).is_ok() && buf == MAGIC,
        Err(_) => false,
    }
}

pub(crate) fn read_image(path: &Path) -> Result<Image> {
    let bytes = std::fs::read(path)?;
    decode(path, &bytes)
}

fn decode(path: &Path, bytes: &[u8]) -> Result<Image> {
    if bytes.len() < FRAME_LEN || bytes[..MAGIC.len()] != MAGIC {
        return Err(StoreError::NotAStoreFile(path.to_path_buf()));
    }

    let mut word = [0u8; 4];
    word.copy_from_slice(&bytes[8..12]);
    let version = u32::from_le_bytes(word);
    if version != FORMAT_VERSION {
        return Err(StoreError::UnsupportedVersion(version));
    }

    let mut dword = [0u8; 8];
    dword.copy_from_slice(&bytes[12..FRAME_LEN]);
    let payload_len = usize::try_from(u64::from_le_bytes(dword))
        .map_err(|_| StoreError::NotAStoreFile(path.to_path_buf()))?;

    let payload_end = FRAME_LEN
        .checked_add(payload_len)
        .filter(|end| end + CHECKSUM_LEN <= bytes.len())
        .ok_or_else(|| StoreError::NotAStoreFile(path.to_path_buf()))?;

    let payload = &bytes[FRAME_LEN..payload_end];
    let stored = &bytes[payload_end..payload_end + CHECKSUM_LEN];
    if blake3::hash(payload).as_bytes() != stored {
        return Err(StoreError::ChecksumMismatch(path.to_path_buf()));
    }

    Ok(bincode::deserialize(payload)?)
}

pub(crate) fn write_image(path: &Path, image: &Image) -> Result<()> {
    let payload = bincode::serialize(image)?;

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(&MAGIC)?;
    tmp.write_all(&FORMAT_VERSION.to_le_bytes())?;
    tmp.write_all(&(payload.len() as u64).to_le_bytes())?;
    tmp.write_all(&payload)?;
    tmp.write_all(blake3::hash(&payload).as_bytes())?;
    tmp.as_file().sync_all()?;
    tmp.persist(path)?;

    tracing::trace!(path = %path.display(), bytes = payload.len(), "wrote store image");
    Ok(())
}
