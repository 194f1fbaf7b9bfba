//! Purpose: Run the full compile pipeline (parse, validate, encode, assemble, write).
//! Exports: `CompileConfig`, `CompileReport`, `compile`, `compile_bytes`, `default_output_path`.
//! Role: Single entry point the CLI calls once the input/output paths are settled.
//! Invariants: Format detection runs before the input is read.
//! Invariants: Every row is validated before anything touches the destination path.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::core::error::Error;
use crate::core::format::SCRIPT_EXTENSION;
use crate::core::row::validate_row;
use crate::core::script::ScriptBuilder;
use crate::core::source::{self, InputFormat, RawRow};
use crate::core::writer::write_script;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CompileConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Overrides extension-based detection when set.
    pub format: Option<InputFormat>,
}

impl CompileConfig {
    /// Config with the output path derived from the input path.
    pub fn new(input: impl Into<PathBuf>) -> Self {
        let input = input.into();
        let output = default_output_path(&input);
        Self {
            input,
            output,
            format: None,
        }
    }

    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = output.into();
        self
    }

    pub fn with_format(mut self, format: InputFormat) -> Self {
        self.format = Some(format);
        self
    }

    pub fn resolve_format(&self) -> Result<InputFormat, Error> {
        match self.format {
            Some(format) => Ok(format),
            None => InputFormat::from_path(&self.input),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CompileReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub format: InputFormat,
    pub records: u64,
    pub bytes: u64,
}

/// `level1.csv` becomes `level1.sdf`, next to the input.
pub fn default_output_path(input: &Path) -> PathBuf {
    input.with_extension(SCRIPT_EXTENSION)
}

pub fn compile(config: &CompileConfig) -> Result<CompileReport, Error> {
    let format = config.resolve_format()?;
    let rows = source::read_rows(&config.input, format)?;
    let (buf, records) = encode_rows(&rows).map_err(|err| err.with_path(&config.input))?;
    let written = write_script(&config.output, &buf, records)?;
    Ok(CompileReport {
        input: config.input.clone(),
        output: written.path,
        format,
        records: written.records,
        bytes: written.bytes,
    })
}

/// Compile in memory; returns the script bytes and the record count.
pub fn compile_bytes(input: &[u8], format: InputFormat) -> Result<(Vec<u8>, u64), Error> {
    let rows = source::parse_rows(input, format)?;
    encode_rows(&rows)
}

fn encode_rows(rows: &[RawRow]) -> Result<(Vec<u8>, u64), Error> {
    let mut builder = ScriptBuilder::new();
    for raw in rows {
        let row = validate_row(raw)?;
        builder.push(&row);
    }
    let records = builder.record_count();
    debug!(records, "encoded rows");
    Ok((builder.finish()?, records))
}
