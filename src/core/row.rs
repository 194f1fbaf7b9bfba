// Typed script rows and the validation that turns raw input rows into them.
use bstr::ByteSlice;

use crate::core::error::{Error, ErrorKind};
use crate::core::source::{RawRow, RawValue};

pub const ROW_ARITY: usize = 6;
pub const FIELD_NAMES: [&str; ROW_ARITY] =
    ["timer", "system", "to", "from", "command", "arguments"];

/// One validated event row. String fields never contain a NUL byte.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ScriptRow {
    pub timer: i64,
    pub system: Vec<u8>,
    pub to: Vec<u8>,
    pub from: Vec<u8>,
    pub command: Vec<u8>,
    pub arguments: Vec<u8>,
}

impl ScriptRow {
    /// Build a row from string parts, rejecting embedded NUL bytes.
    pub fn new(
        timer: i64,
        system: impl Into<Vec<u8>>,
        to: impl Into<Vec<u8>>,
        from: impl Into<Vec<u8>>,
        command: impl Into<Vec<u8>>,
        arguments: impl Into<Vec<u8>>,
    ) -> Result<Self, Error> {
        let row = Self {
            timer,
            system: system.into(),
            to: to.into(),
            from: from.into(),
            command: command.into(),
            arguments: arguments.into(),
        };
        for (name, value) in FIELD_NAMES[1..].iter().zip(row.string_fields()) {
            check_terminator(value, *name)?;
        }
        Ok(row)
    }

    /// String fields in wire order.
    pub fn string_fields(&self) -> [&[u8]; 5] {
        [
            &self.system,
            &self.to,
            &self.from,
            &self.command,
            &self.arguments,
        ]
    }

    /// `arguments` split on the engine's sub-argument delimiter.
    /// An empty field yields a single empty argument.
    pub fn argument_list(&self) -> Vec<&[u8]> {
        self.arguments
            .split_str(&[crate::core::format::ARGUMENT_DELIMITER as u8])
            .collect()
    }
}

pub fn validate_row(raw: &RawRow) -> Result<ScriptRow, Error> {
    let Some(fields) = raw.fields.as_ref() else {
        return Err(Error::new(ErrorKind::RowArity)
            .with_message("row is not a list of fields")
            .with_row(raw.index));
    };
    if fields.len() != ROW_ARITY {
        let mut err = Error::new(ErrorKind::RowArity)
            .with_message(format!(
                "incorrect length: expected {ROW_ARITY} fields, found {}",
                fields.len()
            ))
            .with_row(raw.index);
        if let Some(line) = raw.line {
            err = err.with_hint(format!("See input line {line}."));
        }
        return Err(err);
    }

    let timer = parse_timer(&fields[0]).map_err(|message| {
        Error::new(ErrorKind::FieldType)
            .with_message(message)
            .with_row(raw.index)
            .with_field(FIELD_NAMES[0])
    })?;

    let mut strings: [Vec<u8>; 5] = Default::default();
    for (slot, (value, name)) in strings
        .iter_mut()
        .zip(fields[1..].iter().zip(&FIELD_NAMES[1..]))
    {
        let bytes = string_field(value).ok_or_else(|| {
            Error::new(ErrorKind::FieldType)
                .with_message("expected a scalar value, found a nested list or object")
                .with_row(raw.index)
                .with_field(*name)
        })?;
        check_terminator(&bytes, *name).map_err(|err| err.with_row(raw.index))?;
        *slot = bytes;
    }

    let [system, to, from, command, arguments] = strings;
    Ok(ScriptRow {
        timer,
        system,
        to,
        from,
        command,
        arguments,
    })
}

pub fn validate_rows(raw: &[RawRow]) -> Result<Vec<ScriptRow>, Error> {
    raw.iter().map(validate_row).collect()
}

fn parse_timer(value: &RawValue) -> Result<i64, String> {
    match value {
        RawValue::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().and_then(integral_f64))
            .ok_or_else(|| format!("timer {number} is not a 64-bit signed integer")),
        RawValue::Text(bytes) => {
            let text = bytes
                .to_str()
                .map_err(|_| "timer is not valid utf-8".to_string())?
                .trim();
            text.parse::<i64>()
                .map_err(|_| format!("timer {text:?} is not a 64-bit signed integer"))
        }
        RawValue::Bool(_) | RawValue::Null | RawValue::Nested => {
            Err("timer is not a 64-bit signed integer".to_string())
        }
    }
}

/// Exponent-form JSON numbers (`1e3`) arrive as floats; keep them when they are whole and in range.
fn integral_f64(value: f64) -> Option<i64> {
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    if value.fract() != 0.0 || !(-LIMIT..LIMIT).contains(&value) {
        return None;
    }
    Some(value as i64)
}

fn string_field(value: &RawValue) -> Option<Vec<u8>> {
    match value {
        RawValue::Text(bytes) => Some(bytes.clone()),
        RawValue::Number(number) => Some(number.to_string().into_bytes()),
        RawValue::Bool(flag) => Some(flag.to_string().into_bytes()),
        RawValue::Null => Some(b"null".to_vec()),
        RawValue::Nested => None,
    }
}

fn check_terminator(value: &[u8], field: &'static str) -> Result<(), Error> {
    match value.find_byte(0) {
        Some(pos) => Err(Error::new(ErrorKind::EmbeddedTerminator)
            .with_message(format!("field contains a NUL byte at position {pos}"))
            .with_field(field)),
        None => Ok(()),
    }
}
