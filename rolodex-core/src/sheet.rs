//! Spreadsheet codec adapters.
//!
//! The file format itself is the csv crate's business; this module
//! only translates "bytes to rows" for import and "rows to bytes"
//! for export and the error report. The first line of every sheet is
//! a header row.

use thiserror::Error;

use crate::contact::{NewContact, RawRow};
use crate::import::RowError;

/// A decoded row, or the codec's reason for rejecting it.
pub type RowRead = Result<RawRow, String>;

#[derive(Debug, Error)]
pub enum SheetError {
    /// Nothing to export. A distinct outcome, not a failure.
    #[error("no records to export")]
    NoRecords,

    #[error("sheet encode error: {0}")]
    Encode(#[from] csv::Error),

    #[error("sheet buffer error: {0}")]
    Buffer(String),
}

/// Decode an uploaded sheet into raw rows, one `RowRead` per input
/// row. Cells are matched to fields by header name; a row the codec
/// cannot decode is carried as an error at its position.
pub fn read_rows(bytes: &[u8]) -> Vec<RowRead> {
    csv::Reader::from_reader(bytes)
        .into_deserialize::<RawRow>()
        .map(|row| row.map_err(|err| err.to_string()))
        .collect()
}

/// Serialize the full record set for download.
///
/// An empty set is `NoRecords`, which callers surface as "nothing to
/// export" rather than a technical failure.
pub fn write_contacts(contacts: &[NewContact]) -> Result<Vec<u8>, SheetError> {
    if contacts.is_empty() {
        return Err(SheetError::NoRecords);
    }
    write_records(contacts)
}

/// Serialize the rejected rows of an import into a companion sheet
/// the user can correct and re-upload.
pub fn write_error_report(errors: &[RowError]) -> Result<Vec<u8>, SheetError> {
    write_records(errors)
}

fn write_records<T: serde::Serialize>(records: &[T]) -> Result<Vec<u8>, SheetError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for record in records {
        writer.serialize(record)?;
    }
    writer
        .into_inner()
        .map_err(|err| SheetError::Buffer(err.to_string()))
}
