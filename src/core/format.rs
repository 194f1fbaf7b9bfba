//! Purpose: Centralize script file identity constants and version policy.
//! Exports: `SCRIPT_MAGIC`, `SCRIPT_VERSION`, `SUPPORTED_SCRIPT_VERSIONS`, `SCRIPT_EXTENSION`,
//!   `script_version_error`.
//! Role: Shared policy for the assembler (write) and header decoder (read).
//! Invariants: The version tag is written once per file and never mutated afterwards.
//! Invariants: Version list is additive; bump only for incompatible on-disk changes.

use bstr::ByteSlice;

use crate::core::error::{Error, ErrorKind};

/// `"FDS\0"`
pub const SCRIPT_MAGIC: [u8; 4] = [0x46, 0x44, 0x53, 0x00];
pub const SCRIPT_VERSION: &str = "v0.9.0";
pub const SUPPORTED_SCRIPT_VERSIONS: &[&str] = &[SCRIPT_VERSION];
pub const SCRIPT_EXTENSION: &str = "sdf";

/// Sub-argument delimiter the engine applies to the `arguments` field.
pub const ARGUMENT_DELIMITER: char = ';';

pub fn script_version_error(detected: &[u8]) -> Error {
    let supported = SUPPORTED_SCRIPT_VERSIONS.join(", ");
    Error::new(ErrorKind::Corrupt)
        .with_message(format!(
            "unsupported script version {:?} (supported: {supported})",
            detected.as_bstr()
        ))
        .with_hint("Rebuild the script with this version of mkscript.")
}
