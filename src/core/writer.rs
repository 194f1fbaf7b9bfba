// Persist an assembled script buffer with replace-on-write semantics.
// The buffer lands in a temp file beside the destination and is renamed over it,
// so a failed write never leaves a partial script behind. The replacement keeps the
// destination's permissions; a new file gets the usual umask-filtered mode.
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::{Builder, NamedTempFile};
use tracing::{debug, info};

use crate::core::error::{Error, ErrorKind};

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WriteReport {
    pub path: PathBuf,
    pub records: u64,
    pub bytes: u64,
}

/// Write `buf` to `path`, overwriting any existing file.
pub fn write_script(path: &Path, buf: &[u8], records: u64) -> Result<WriteReport, Error> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut temp = create_temp(dir).map_err(|err| write_error(err, path))?;
    if let Ok(existing) = fs::metadata(path) {
        debug!(path = %path.display(), "keeping permissions of replaced script");
        temp.as_file()
            .set_permissions(existing.permissions())
            .map_err(|err| write_error(err, path))?;
    }
    temp.write_all(buf).map_err(|err| write_error(err, path))?;
    temp.as_file().sync_all().map_err(|err| write_error(err, path))?;
    temp.persist(path)
        .map_err(|err| write_error(err.error, path))?;

    info!(path = %path.display(), records, bytes = buf.len(), "wrote script file");
    Ok(WriteReport {
        path: path.to_path_buf(),
        records,
        bytes: buf.len() as u64,
    })
}

fn create_temp(dir: &Path) -> std::io::Result<NamedTempFile> {
    let mut builder = Builder::new();
    builder.prefix(".mkscript-");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(fs::Permissions::from_mode(0o666));
    }
    builder.tempfile_in(dir)
}

fn write_error(err: std::io::Error, path: &Path) -> Error {
    Error::new(ErrorKind::Write)
        .with_message("failed to write script file")
        .with_path(path)
        .with_source(err)
}
