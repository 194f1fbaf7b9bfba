//! Purpose: Read CSV or JSON event tables into one ordered sequence of raw rows.
//! Exports: `InputFormat`, `RawValue`, `RawRow`, `read_rows`, `parse_rows`.
//! Role: Row Parser stage; every input format is normalized here so later stages never branch
//!   on the source format.
//! Invariants: Format detection happens before the input file is opened.
//! Invariants: Row order is input order; row indexes are 1-based and dense.
//! Invariants: No typing or arity checks happen here; that is the validator's job.
use std::fs;
use std::io;
use std::path::Path;

use serde_json::Value;
use tracing::debug;

use crate::core::error::{Error, ErrorKind};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum InputFormat {
    Csv,
    Json,
}

impl InputFormat {
    /// Detect the format from the path extension (case-insensitive).
    pub fn from_path(path: &Path) -> Result<Self, Error> {
        let Some(ext) = path.extension() else {
            return Err(Error::new(ErrorKind::Format)
                .with_message("input file has no extension")
                .with_path(path)
                .with_hint("Use a .csv or .json input file, or pass --in csv|json."));
        };
        let ext = ext.to_string_lossy();
        match ext.to_ascii_lowercase().as_str() {
            "csv" => Ok(InputFormat::Csv),
            "json" => Ok(InputFormat::Json),
            "yml" | "yaml" => Err(Error::new(ErrorKind::Format)
                .with_message(format!("file format '{ext}' not yet supported"))
                .with_path(path)
                .with_hint("Convert the table to .csv or .json.")),
            _ => Err(Error::new(ErrorKind::Format)
                .with_message(format!("file format '{ext}' not supported"))
                .with_path(path)
                .with_hint("Use a .csv or .json input file, or pass --in csv|json.")),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            InputFormat::Csv => "csv",
            InputFormat::Json => "json",
        }
    }
}

/// One untyped input cell.
#[derive(Clone, Debug, PartialEq)]
pub enum RawValue {
    Text(Vec<u8>),
    Number(serde_json::Number),
    Bool(bool),
    Null,
    /// JSON array or object where a scalar was expected.
    Nested,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RawRow {
    pub index: u64,
    /// Source line of the row start, when the format tracks it.
    pub line: Option<u64>,
    /// `None` when the row value was not a list of fields at all.
    pub fields: Option<Vec<RawValue>>,
}

pub fn read_rows(path: &Path, format: InputFormat) -> Result<Vec<RawRow>, Error> {
    let bytes = fs::read(path).map_err(|err| read_error(err, path))?;
    debug!(path = %path.display(), format = format.label(), bytes = bytes.len(), "read input");
    parse_rows(&bytes, format).map_err(|err| {
        if err.path().is_some() {
            err
        } else {
            err.with_path(path)
        }
    })
}

pub fn parse_rows(input: &[u8], format: InputFormat) -> Result<Vec<RawRow>, Error> {
    let rows = match format {
        InputFormat::Csv => parse_csv(input)?,
        InputFormat::Json => parse_json(input)?,
    };
    debug!(format = format.label(), rows = rows.len(), "parsed rows");
    Ok(rows)
}

fn read_error(err: io::Error, path: &Path) -> Error {
    let kind = if err.kind() == io::ErrorKind::NotFound {
        ErrorKind::NotFound
    } else {
        ErrorKind::Io
    };
    Error::new(kind)
        .with_message("failed to read input file")
        .with_path(path)
        .with_source(err)
}

fn parse_csv(input: &[u8]) -> Result<Vec<RawRow>, Error> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(input);

    let mut rows = Vec::new();
    for result in reader.byte_records() {
        let record = result.map_err(|err| {
            let line = err.position().map(|pos| pos.line());
            let mut out = Error::new(ErrorKind::Parse)
                .with_message(format!("malformed csv: {err}"))
                .with_row(rows.len() as u64 + 1);
            if let Some(line) = line {
                out = out.with_hint(format!("Check the quoting near line {line}."));
            }
            out.with_source(err)
        })?;
        if record.len() == 1 && record.as_slice().is_empty() {
            continue;
        }
        let fields = record
            .iter()
            .map(|field| RawValue::Text(field.to_vec()))
            .collect();
        rows.push(RawRow {
            index: rows.len() as u64 + 1,
            line: record.position().map(|pos| pos.line()),
            fields: Some(fields),
        });
    }
    Ok(rows)
}

fn parse_json(input: &[u8]) -> Result<Vec<RawRow>, Error> {
    let document: Value = serde_json::from_slice(input).map_err(|err| {
        Error::new(ErrorKind::Parse)
            .with_message(format!("malformed json: {err}"))
            .with_source(err)
    })?;

    let values: Vec<Value> = match document {
        Value::Object(map) => map.into_iter().map(|(_, value)| value).collect(),
        Value::Array(items) => items,
        _ => {
            return Err(Error::new(ErrorKind::Parse)
                .with_message("json input must be a mapping of rows")
                .with_hint("Use an object whose values are 6-element arrays."));
        }
    };

    let rows = values
        .into_iter()
        .enumerate()
        .map(|(pos, value)| RawRow {
            index: pos as u64 + 1,
            line: None,
            fields: match value {
                Value::Array(items) => Some(items.into_iter().map(json_scalar).collect()),
                _ => None,
            },
        })
        .collect();
    Ok(rows)
}

fn json_scalar(value: Value) -> RawValue {
    match value {
        Value::String(text) => RawValue::Text(text.into_bytes()),
        Value::Number(number) => RawValue::Number(number),
        Value::Bool(flag) => RawValue::Bool(flag),
        Value::Null => RawValue::Null,
        Value::Array(_) | Value::Object(_) => RawValue::Nested,
    }
}

#[cfg(test)]
mod tests {
    use super::{InputFormat, RawValue, parse_rows};
    use crate::core::error::ErrorKind;
    use std::path::Path;

    fn text(value: &str) -> RawValue {
        RawValue::Text(value.as_bytes().to_vec())
    }

    #[test]
    fn format_detection_is_case_insensitive() {
        assert_eq!(
            InputFormat::from_path(Path::new("level1.CSV")).unwrap(),
            InputFormat::Csv
        );
        assert_eq!(
            InputFormat::from_path(Path::new("dir.v2/level1.json")).unwrap(),
            InputFormat::Json
        );
    }

    #[test]
    fn unsupported_extensions_name_the_extension() {
        let err = InputFormat::from_path(Path::new("level1.yml")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);
        assert!(err.message().unwrap().contains("'yml'"));

        let err = InputFormat::from_path(Path::new("level1.txt")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);
        assert!(err.message().unwrap().contains("'txt'"));

        let err = InputFormat::from_path(Path::new("level1")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);
    }

    #[test]
    fn csv_rows_skip_empty_lines_and_keep_order() {
        let input = b"10,sys,a,b,cmd,hello\n\n-5,spawner,,,new,ship;1\n";
        let rows = parse_rows(input, InputFormat::Csv).expect("parse");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].index, 1);
        assert_eq!(rows[1].index, 2);
        let fields = rows[1].fields.as_ref().expect("fields");
        assert_eq!(fields[0], text("-5"));
        assert_eq!(fields[2], text(""));
        assert_eq!(fields[5], text("ship;1"));
    }

    #[test]
    fn csv_has_no_header_row_and_honors_quotes() {
        let input = b"0,sys,a,b,cmd,\"x,y\"\n";
        let rows = parse_rows(input, InputFormat::Csv).expect("parse");
        assert_eq!(rows.len(), 1);
        let fields = rows[0].fields.as_ref().expect("fields");
        assert_eq!(fields.len(), 6);
        assert_eq!(fields[5], text("x,y"));
    }

    #[test]
    fn csv_keeps_ragged_rows_for_the_validator() {
        let input = b"0,a,b,c,d\n0,a,b,c,d,e,f\n";
        let rows = parse_rows(input, InputFormat::Csv).expect("parse");
        assert_eq!(rows[0].fields.as_ref().unwrap().len(), 5);
        assert_eq!(rows[1].fields.as_ref().unwrap().len(), 7);
    }

    #[test]
    fn json_mapping_values_keep_document_order() {
        let input = br#"{"z": [2, "s", "", "", "b", ""], "a": [1, "s", "", "", "a", ""]}"#;
        let rows = parse_rows(input, InputFormat::Json).expect("parse");
        assert_eq!(rows.len(), 2);
        let first = rows[0].fields.as_ref().unwrap();
        assert_eq!(first[4], text("b"));
        let second = rows[1].fields.as_ref().unwrap();
        assert_eq!(second[4], text("a"));
    }

    #[test]
    fn json_top_level_array_is_accepted() {
        let input = br#"[[0, "a", "b", "c", "d", null]]"#;
        let rows = parse_rows(input, InputFormat::Json).expect("parse");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].fields.as_ref().unwrap()[5], RawValue::Null);
    }

    #[test]
    fn json_non_list_rows_are_flagged_not_dropped() {
        let input = br#"{"one": {"timer": 0}, "two": [[1]]}"#;
        let rows = parse_rows(input, InputFormat::Json).expect("parse");
        assert_eq!(rows[0].fields, None);
        assert_eq!(rows[1].fields, Some(vec![RawValue::Nested]));
    }

    #[test]
    fn json_scalar_document_is_a_parse_error() {
        let err = parse_rows(b"42", InputFormat::Json).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
        let err = parse_rows(b"{\"a\":", InputFormat::Json).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
    }
}
