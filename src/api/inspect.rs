// Read a compiled script back from disk for inspection.
use std::fs;
use std::io;
use std::path::Path;

use tracing::debug;

use crate::core::error::{Error, ErrorKind};
use crate::core::script::ScriptFile;

pub fn inspect_file(path: &Path) -> Result<ScriptFile, Error> {
    let bytes = fs::read(path).map_err(|err| {
        let kind = if err.kind() == io::ErrorKind::NotFound {
            ErrorKind::NotFound
        } else {
            ErrorKind::Io
        };
        Error::new(kind)
            .with_message("failed to read script file")
            .with_path(path)
            .with_source(err)
    })?;
    let file = ScriptFile::decode(&bytes).map_err(|err| err.with_path(path))?;
    debug!(path = %path.display(), records = file.rows.len(), "decoded script");
    Ok(file)
}
