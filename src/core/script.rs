//! Purpose: Assemble and decode complete script files (header + records).
//! Exports: `ScriptHeader`, `ScriptBuilder`, `ScriptFile`, `HEADER_LEN`.
//! Role: File Assembler stage for writes; header/file decoder for inspection and tests.
//! Invariants: The header record count is derived from the records actually appended.
//! Invariants: An empty script (zero records) is never produced.
//! Invariants: The record count is written as a full 4-byte little-endian integer.
use tracing::debug;

use crate::core::error::{Error, ErrorKind};
use crate::core::format::{
    SCRIPT_MAGIC, SCRIPT_VERSION, SUPPORTED_SCRIPT_VERSIONS, script_version_error,
};
use crate::core::record;
use crate::core::row::ScriptRow;

const MAGIC_LEN: usize = SCRIPT_MAGIC.len();
const COUNT_LEN: usize = 4;
pub const HEADER_LEN: usize = MAGIC_LEN + SCRIPT_VERSION.len() + COUNT_LEN;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ScriptHeader {
    pub version: String,
    pub record_count: u32,
}

impl ScriptHeader {
    pub fn new(record_count: u32) -> Self {
        Self {
            version: SCRIPT_VERSION.to_string(),
            record_count,
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(MAGIC_LEN + self.version.len() + COUNT_LEN);
        buf.extend_from_slice(&SCRIPT_MAGIC);
        buf.extend_from_slice(self.version.as_bytes());
        buf.extend_from_slice(&self.record_count.to_le_bytes());
        buf
    }

    /// Decode a header from the front of `buf`, returning it with its encoded length.
    pub fn decode(buf: &[u8]) -> Result<(Self, usize), Error> {
        if buf.len() < MAGIC_LEN {
            return Err(Error::new(ErrorKind::Corrupt).with_message("script header too small"));
        }
        if buf[0..MAGIC_LEN] != SCRIPT_MAGIC {
            return Err(Error::new(ErrorKind::Corrupt)
                .with_message("bad script magic")
                .with_offset(0));
        }
        let rest = &buf[MAGIC_LEN..];
        let Some(version) = SUPPORTED_SCRIPT_VERSIONS
            .iter()
            .find(|version| rest.starts_with(version.as_bytes()))
        else {
            let probe = &rest[..rest.len().min(SCRIPT_VERSION.len())];
            return Err(script_version_error(probe).with_offset(MAGIC_LEN as u64));
        };
        let count_at = MAGIC_LEN + version.len();
        if buf.len() < count_at + COUNT_LEN {
            return Err(Error::new(ErrorKind::Corrupt)
                .with_message("script header truncated before record count")
                .with_offset(count_at as u64));
        }
        let record_count = read_u32(buf, count_at);
        let header = Self {
            version: (*version).to_string(),
            record_count,
        };
        Ok((header, count_at + COUNT_LEN))
    }
}

/// Accumulates encoded records behind a header that is only emitted on `finish`.
#[derive(Debug, Default)]
pub struct ScriptBuilder {
    records: Vec<u8>,
    count: u64,
}

impl ScriptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, row: &ScriptRow) {
        record::encode_into(row, &mut self.records);
        self.count += 1;
    }

    pub fn record_count(&self) -> u64 {
        self.count
    }

    pub fn finish(self) -> Result<Vec<u8>, Error> {
        if self.count == 0 || self.records.is_empty() {
            return Err(Error::new(ErrorKind::NoData)
                .with_message("no data generated")
                .with_hint("The input contained no rows."));
        }
        let record_count = u32::try_from(self.count).map_err(|_| {
            Error::new(ErrorKind::Usage)
                .with_message(format!(
                    "too many records for one script ({} > {})",
                    self.count,
                    u32::MAX
                ))
                .with_hint("Split the input into several scripts.")
        })?;
        let header = ScriptHeader::new(record_count).encode();
        let mut out = Vec::with_capacity(header.len() + self.records.len());
        out.extend_from_slice(&header);
        out.extend_from_slice(&self.records);
        debug!(records = record_count, bytes = out.len(), "assembled script");
        Ok(out)
    }
}

/// Assemble a complete script buffer from validated rows.
pub fn assemble(rows: &[ScriptRow]) -> Result<Vec<u8>, Error> {
    let mut builder = ScriptBuilder::new();
    for row in rows {
        builder.push(row);
    }
    builder.finish()
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ScriptFile {
    pub header: ScriptHeader,
    pub rows: Vec<ScriptRow>,
}

impl ScriptFile {
    /// Decode a full script, requiring exactly `record_count` records and no trailing bytes.
    pub fn decode(buf: &[u8]) -> Result<Self, Error> {
        let (header, mut offset) = ScriptHeader::decode(buf)?;
        let mut rows = Vec::with_capacity(header.record_count.min(4096) as usize);
        for index in 0..header.record_count {
            if offset == buf.len() {
                return Err(Error::new(ErrorKind::Corrupt)
                    .with_message(format!(
                        "header declares {} records but only {index} present",
                        header.record_count
                    ))
                    .with_offset(offset as u64));
            }
            let (row, used) = record::decode(&buf[offset..]).map_err(|err| {
                let at = offset as u64 + err.offset().unwrap_or(0);
                err.with_row(u64::from(index) + 1).with_offset(at)
            })?;
            rows.push(row);
            offset += used;
        }
        if offset != buf.len() {
            return Err(Error::new(ErrorKind::Corrupt)
                .with_message(format!(
                    "{} trailing bytes after {} records",
                    buf.len() - offset,
                    header.record_count
                ))
                .with_offset(offset as u64));
        }
        Ok(Self { header, rows })
    }
}

fn read_u32(buf: &[u8], offset: usize) -> u32 {
    let mut out = [0u8; COUNT_LEN];
    out.copy_from_slice(&buf[offset..offset + COUNT_LEN]);
    u32::from_le_bytes(out)
}
