// Core modules: row parsing and validation, record/file encoding, persistence, errors.
pub mod error;
pub mod format;
pub mod record;
pub mod row;
pub mod script;
pub mod source;
pub mod writer;
