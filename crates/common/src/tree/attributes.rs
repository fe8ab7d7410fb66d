//! Fixed node attributes and name rules.

use object_store::{Attribute, Datatype, ObjectId, Store, StoreError};

use super::data_type::DataType;
use crate::error::{Error, Result};

pub const MAX_NAME_LEN: usize = 32;
pub const MAX_LABEL_LEN: usize = 32;

pub(crate) const A_NAME: &str = "name";
pub(crate) const A_LABEL: &str = "label";
pub(crate) const A_TYPE: &str = "type";
pub(crate) const A_ORDER: &str = "order";

// Entries starting with a space never collide with node names.
pub(crate) const D_DATA: &str = " data";
pub(crate) const D_FORMAT: &str = " format";
pub(crate) const D_VERSION: &str = " version2";
pub(crate) const D_LEGACY_VERSION: &str = " version";
pub(crate) const D_LINK: &str = " link";
pub(crate) const D_PATH: &str = " path";
pub(crate) const D_FILE: &str = " file";

pub(crate) const ROOT_NAME: &str = "ADF MotherNode";
pub(crate) const ROOT_LABEL: &str = "Root Node of ADF File";

pub(crate) fn is_reserved(entry: &str) -> bool {
    entry.starts_with(' ')
}

/// Validate a node name and return it with surrounding whitespace removed.
pub fn check_name(name: &str) -> Result<&str> {
    let name = name.trim_start();
    if name.is_empty() {
        return Err(Error::StringLengthZero);
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(Error::StringLengthTooBig(name.to_string()));
    }
    let name = name.trim_end();
    if name.contains('/') || name == "." {
        return Err(Error::InvalidNodeName(name.to_string()));
    }
    Ok(name)
}

pub fn check_label(label: &str) -> Result<()> {
    if label.chars().count() > MAX_LABEL_LEN {
        return Err(Error::StringLengthTooBig(label.to_string()));
    }
    Ok(())
}

fn missing(attr: &str, e: StoreError) -> Error {
    match e {
        StoreError::AttributeNotFound(_) => Error::AttributeMissing(attr.to_string()),
        e => Error::Store(e),
    }
}

pub(crate) fn read_str(store: &Store, obj: ObjectId, attr: &str) -> Result<String> {
    match store.attribute(obj, attr).map_err(|e| missing(attr, e))? {
        Attribute::Str(s) => Ok(s.clone()),
        Attribute::Int(v) => Ok(v.to_string()),
    }
}

pub(crate) fn read_int(store: &Store, obj: ObjectId, attr: &str) -> Result<i32> {
    store
        .attribute(obj, attr)
        .map_err(|e| missing(attr, e))?
        .as_int()
        .ok_or_else(|| Error::AttributeMissing(attr.to_string()))
}

/// Create-or-overwrite.
pub(crate) fn write_attr(store: &mut Store, obj: ObjectId, attr: &str, value: Attribute) -> Result<()> {
    if store.has_attribute(obj, attr)? {
        store.write_attribute(obj, attr, value)?;
    } else {
        store.create_attribute(obj, attr, value)?;
    }
    Ok(())
}

pub(crate) fn write_str(store: &mut Store, obj: ObjectId, attr: &str, value: &str) -> Result<()> {
    write_attr(store, obj, attr, Attribute::Str(value.to_string()))
}

pub(crate) fn write_int(store: &mut Store, obj: ObjectId, attr: &str, value: i32) -> Result<()> {
    write_attr(store, obj, attr, Attribute::Int(value))
}

/// Stamp the fixed attributes on a freshly created group.
pub(crate) fn stamp(
    store: &mut Store,
    obj: ObjectId,
    name: &str,
    label: &str,
    data_type: DataType,
) -> Result<()> {
    write_str(store, obj, A_NAME, name)?;
    write_str(store, obj, A_LABEL, label)?;
    write_str(store, obj, A_TYPE, data_type.tag())
}

pub(crate) fn data_type(store: &Store, obj: ObjectId) -> Result<DataType> {
    read_str(store, obj, A_TYPE)?.parse()
}

pub(crate) fn is_link(store: &Store, obj: ObjectId) -> bool {
    matches!(data_type(store, obj), Ok(DataType::Link))
}

/// Position counter of a node, when creation ordering wrote one.
pub(crate) fn order(store: &Store, obj: ObjectId) -> Option<i32> {
    store.attribute(obj, A_ORDER).ok().and_then(Attribute::as_int)
}

/// Replace a reserved entry with a C1 dataset holding `text`.
pub(crate) fn write_text(store: &mut Store, obj: ObjectId, entry: &str, text: &str) -> Result<()> {
    if store.has_entry(obj, entry)? {
        store.unlink(obj, entry)?;
    }
    let bytes = text.as_bytes().to_vec();
    let dims = [bytes.len() as u64];
    store.create_dataset_from_bytes(obj, entry, Datatype::Int8, &dims, bytes)?;
    Ok(())
}

pub(crate) fn read_text(store: &Store, obj: ObjectId, entry: &str) -> Result<String> {
    let ds = store.dataset(obj, entry)?;
    let text = String::from_utf8_lossy(ds.as_bytes());
    Ok(text.trim_end_matches('\0').to_string())
}
