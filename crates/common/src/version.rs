/// Library version string reported to callers and stamped into new files.
pub fn library_version() -> String {
    format!("ADF Tree Version {}", env!("CARGO_PKG_VERSION"))
}

/// Numeric format descriptor of the running machine.
pub fn native_format() -> &'static str {
    if cfg!(target_endian = "big") {
        "IEEE_BIG_32"
    } else {
        "IEEE_LITTLE_32"
    }
}
