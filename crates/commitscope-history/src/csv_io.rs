//! Reading and writing the extracted history CSV.

use std::io::{Read, Write};
use std::path::Path;

use commitscope_core::{CommitRecord, ScopeError, HISTORY_COLUMNS};

/// Write `records` as a 7-column CSV to `path`, header first.
///
/// The header is written even when `records` is empty.
///
/// # Errors
///
/// Returns [`ScopeError::Csv`] or [`ScopeError::Io`] on write failure.
pub fn write_history(path: &Path, records: &[CommitRecord]) -> Result<(), ScopeError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::File::create(path)?;
    write_history_to(file, records)
}

/// Write `records` as a 7-column CSV to any writer.
///
/// # Examples
///
/// ```
/// use commitscope_history::csv_io::write_history_to;
///
/// let mut out = Vec::new();
/// write_history_to(&mut out, &[]).unwrap();
/// assert_eq!(
///     String::from_utf8(out).unwrap(),
///     "Hash,Author,Email,Date,Message,Branches,Code Changes\n"
/// );
/// ```
pub fn write_history_to<W: Write>(writer: W, records: &[CommitRecord]) -> Result<(), ScopeError> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    csv_writer.write_record(HISTORY_COLUMNS)?;
    for record in records {
        csv_writer.serialize(record)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Read commit records from a history (or classified) CSV at `path`.
///
/// # Errors
///
/// Returns [`ScopeError::FileNotFound`] if `path` does not exist, or
/// [`ScopeError::Csv`] if a row is malformed.
pub fn read_history(path: &Path) -> Result<Vec<CommitRecord>, ScopeError> {
    if !path.exists() {
        return Err(ScopeError::FileNotFound(path.to_path_buf()));
    }
    let file = std::fs::File::open(path)?;
    read_history_from(file)
}

/// Read commit records from any reader. Extra columns are ignored.
pub fn read_history_from<R: Read>(reader: R) -> Result<Vec<CommitRecord>, ScopeError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(reader);
    let mut records = Vec::new();
    for row in csv_reader.deserialize() {
        let record: CommitRecord = row?;
        records.push(record);
    }
    Ok(records)
}
