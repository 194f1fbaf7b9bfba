//! Purpose: Interactive overwrite confirmation for the CLI layer.
//! Exports: `confirm_overwrite`, `parse_answer`.
//! Role: The compiler core overwrites unconditionally; asking first is the CLI's job.
//! Invariants: Non-interactive stdin never counts as consent.
//! Invariants: Only an explicit yes (`y`/`yes`, any case) confirms.
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::Path;

use mkscript::api::{Error, ErrorKind};

pub(crate) fn confirm_overwrite(path: &Path) -> Result<bool, Error> {
    let stdin = io::stdin();
    if !stdin.is_terminal() {
        return Ok(false);
    }
    let mut stderr = io::stderr();
    write!(
        stderr,
        "Output file '{}' exists, overwrite? [y/N] ",
        path.display()
    )
    .and_then(|_| stderr.flush())
    .map_err(|err| {
        Error::new(ErrorKind::Io)
            .with_message("failed to write prompt")
            .with_source(err)
    })?;

    let mut answer = String::new();
    stdin.lock().read_line(&mut answer).map_err(|err| {
        Error::new(ErrorKind::Io)
            .with_message("failed to read confirmation")
            .with_source(err)
    })?;
    Ok(parse_answer(&answer))
}

pub(crate) fn parse_answer(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
