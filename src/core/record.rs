// Script record wire encoding: 8-byte LE timer, then five NUL-terminated strings.
use crate::core::error::{Error, ErrorKind};
use crate::core::row::{FIELD_NAMES, ScriptRow};

pub const TIMER_LEN: usize = 8;
pub const TERMINATOR: u8 = 0x00;

/// Exact encoded size of `row`.
pub fn encoded_len(row: &ScriptRow) -> usize {
    TIMER_LEN
        + row
            .string_fields()
            .iter()
            .map(|field| field.len() + 1)
            .sum::<usize>()
}

/// Append the record bytes for `row` to `out`.
pub fn encode_into(row: &ScriptRow, out: &mut Vec<u8>) {
    out.reserve(encoded_len(row));
    out.extend_from_slice(&row.timer.to_le_bytes());
    for field in row.string_fields() {
        out.extend_from_slice(field);
        out.push(TERMINATOR);
    }
}

pub fn encode(row: &ScriptRow) -> Vec<u8> {
    let mut out = Vec::with_capacity(encoded_len(row));
    encode_into(row, &mut out);
    out
}

/// Decode one record from the front of `buf`, returning the row and bytes consumed.
pub fn decode(buf: &[u8]) -> Result<(ScriptRow, usize), Error> {
    if buf.len() < TIMER_LEN {
        return Err(Error::new(ErrorKind::Corrupt)
            .with_message("record truncated before timer")
            .with_offset(0));
    }
    let timer = read_i64(buf, 0);
    let mut offset = TIMER_LEN;
    let mut strings: [Vec<u8>; 5] = Default::default();
    for (slot, name) in strings.iter_mut().zip(&FIELD_NAMES[1..]) {
        let rest = &buf[offset..];
        let Some(end) = rest.iter().position(|byte| *byte == TERMINATOR) else {
            return Err(Error::new(ErrorKind::Corrupt)
                .with_message(format!("record truncated in field {name}"))
                .with_field(*name)
                .with_offset(offset as u64));
        };
        *slot = rest[..end].to_vec();
        offset += end + 1;
    }

    let [system, to, from, command, arguments] = strings;
    let row = ScriptRow {
        timer,
        system,
        to,
        from,
        command,
        arguments,
    };
    Ok((row, offset))
}

fn read_i64(buf: &[u8], offset: usize) -> i64 {
    let mut out = [0u8; TIMER_LEN];
    out.copy_from_slice(&buf[offset..offset + TIMER_LEN]);
    i64::from_le_bytes(out)
}
