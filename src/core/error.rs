use std::error::Error as StdError;
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    Internal,
    Usage,
    NotFound,
    AlreadyExists,
    Format,
    Parse,
    RowArity,
    FieldType,
    EmbeddedTerminator,
    NoData,
    Write,
    Io,
    Corrupt,
}

impl ErrorKind {
    /// Stable label used in JSON error output.
    pub fn label(self) -> &'static str {
        match self {
            ErrorKind::Internal => "Internal",
            ErrorKind::Usage => "Usage",
            ErrorKind::NotFound => "NotFound",
            ErrorKind::AlreadyExists => "AlreadyExists",
            ErrorKind::Format => "Format",
            ErrorKind::Parse => "Parse",
            ErrorKind::RowArity => "RowArity",
            ErrorKind::FieldType => "FieldType",
            ErrorKind::EmbeddedTerminator => "EmbeddedTerminator",
            ErrorKind::NoData => "NoData",
            ErrorKind::Write => "Write",
            ErrorKind::Io => "Io",
            ErrorKind::Corrupt => "Corrupt",
        }
    }
}

#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    message: Option<String>,
    path: Option<PathBuf>,
    row: Option<u64>,
    field: Option<&'static str>,
    offset: Option<u64>,
    hint: Option<String>,
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl Error {
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            path: None,
            row: None,
            field: None,
            offset: None,
            hint: None,
            source: None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// 1-based index of the offending input row, counted in read order.
    pub fn row(&self) -> Option<u64> {
        self.row
    }

    pub fn field(&self) -> Option<&'static str> {
        self.field
    }

    pub fn offset(&self) -> Option<u64> {
        self.offset
    }

    pub fn hint(&self) -> Option<&str> {
        self.hint.as_deref()
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_row(mut self, row: u64) -> Self {
        self.row = Some(row);
        self
    }

    pub fn with_field(mut self, field: &'static str) -> Self {
        self.field = Some(field);
        self
    }

    pub fn with_offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.kind)?;
        if let Some(message) = &self.message {
            write!(f, ": {message}")?;
        }
        if let Some(row) = self.row {
            write!(f, " (row: {row})")?;
        }
        if let Some(field) = self.field {
            write!(f, " (field: {field})")?;
        }
        if let Some(path) = &self.path {
            write!(f, " (path: {})", path.display())?;
        }
        if let Some(offset) = self.offset {
            write!(f, " (offset: {offset})")?;
        }
        Ok(())
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|source| source.as_ref() as &(dyn StdError + 'static))
    }
}

pub fn to_exit_code(kind: ErrorKind) -> i32 {
    match kind {
        ErrorKind::Internal => 1,
        ErrorKind::Usage => 2,
        ErrorKind::NotFound => 3,
        ErrorKind::AlreadyExists => 4,
        ErrorKind::Format => 5,
        ErrorKind::Parse => 6,
        ErrorKind::RowArity => 7,
        ErrorKind::FieldType => 8,
        ErrorKind::EmbeddedTerminator => 9,
        ErrorKind::NoData => 10,
        ErrorKind::Write => 11,
        ErrorKind::Io => 12,
        ErrorKind::Corrupt => 13,
    }
}

#[cfg(test)]
mod tests {
    use super::{Error, ErrorKind, to_exit_code};
    use std::error::Error as StdError;
    use std::io;

    #[test]
    fn exit_code_mapping_is_stable() {
        let cases = [
            (ErrorKind::Internal, 1),
            (ErrorKind::Usage, 2),
            (ErrorKind::NotFound, 3),
            (ErrorKind::AlreadyExists, 4),
            (ErrorKind::Format, 5),
            (ErrorKind::Parse, 6),
            (ErrorKind::RowArity, 7),
            (ErrorKind::FieldType, 8),
            (ErrorKind::EmbeddedTerminator, 9),
            (ErrorKind::NoData, 10),
            (ErrorKind::Write, 11),
            (ErrorKind::Io, 12),
            (ErrorKind::Corrupt, 13),
        ];

        for (kind, code) in cases {
            assert_eq!(to_exit_code(kind), code);
        }
    }

    #[test]
    fn display_includes_row_and_field_context() {
        let err = Error::new(ErrorKind::FieldType)
            .with_message("timer is not a 64-bit integer")
            .with_row(3)
            .with_field("timer");
        assert_eq!(
            err.to_string(),
            "FieldType: timer is not a 64-bit integer (row: 3) (field: timer)"
        );
    }

    #[test]
    fn source_is_chained() {
        let err = Error::new(ErrorKind::Write)
            .with_message("failed to write script file")
            .with_source(io::Error::new(io::ErrorKind::PermissionDenied, "denied"));
        let source = err.source().expect("source");
        assert_eq!(source.to_string(), "denied");
    }
}
