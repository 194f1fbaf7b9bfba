//! Purpose: Define the public Rust API boundary for the script compiler.
//! Exports: Pipeline entry points (`compile`, `compile_bytes`, `inspect_file`) and core types.
//! Role: Used by the `mkscript` binary and integration tests; hides module layout.
//! Invariants: All configuration arrives through explicit arguments; there is no global state.
//! Invariants: A run either writes one complete script file or writes nothing.

mod compile;
mod inspect;

#[doc(hidden)]
pub use crate::core::error::to_exit_code;
pub use crate::core::error::{Error, ErrorKind};
pub use crate::core::format::{ARGUMENT_DELIMITER, SCRIPT_EXTENSION, SCRIPT_MAGIC, SCRIPT_VERSION};
pub use crate::core::row::{FIELD_NAMES, ScriptRow};
pub use crate::core::script::{HEADER_LEN, ScriptFile, ScriptHeader};
pub use crate::core::source::InputFormat;
pub use crate::core::writer::WriteReport;
pub use compile::{CompileConfig, CompileReport, compile, compile_bytes, default_output_path};
pub use inspect::inspect_file;
