//! Bulk import screening.
//!
//! Rows are validated in memory before any write happens. The
//! store-facing half of the pipeline (one insert-or-ignore statement
//! for the whole valid set) lives with the repository; a statement
//! failure there is a pipeline-level failure, distinct from the
//! row-level errors collected here.

use serde::Serialize;

use crate::contact::{validate_row, NewContact};
use crate::sheet::RowRead;

/// Rows in the source sheet are numbered past a header row, so the
/// first data row is row 2.
const HEADER_ROW_OFFSET: usize = 2;

/// One rejected row with its 1-based position in the source sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowError {
    pub row: usize,
    pub error: String,
}

/// Outcome of screening an uploaded sheet: insert candidates on one
/// side, row errors on the other. Every input row lands in exactly
/// one of the two.
#[derive(Debug, Default)]
pub struct ImportBatch {
    pub valid: Vec<NewContact>,
    pub errors: Vec<RowError>,
}

/// Partition decoded rows into valid records and row errors.
///
/// Rows the codec itself could not decode become row errors at the
/// same position they would otherwise have occupied.
pub fn screen_rows<I>(rows: I) -> ImportBatch
where
    I: IntoIterator<Item = RowRead>,
{
    let mut batch = ImportBatch::default();

    for (index, row) in rows.into_iter().enumerate() {
        let row_number = index + HEADER_ROW_OFFSET;
        match row {
            Ok(raw) => match validate_row(&raw) {
                Ok(contact) => batch.valid.push(contact),
                Err(err) => batch.errors.push(RowError {
                    row: row_number,
                    error: err.to_string(),
                }),
            },
            Err(reason) => batch.errors.push(RowError {
                row: row_number,
                error: reason,
            }),
        }
    }

    batch
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contact::RawRow;

    fn ok_row(name: &str, email: &str, phone: &str) -> RowRead {
        Ok(RawRow {
            name: name.into(),
            email: email.into(),
            phone: phone.into(),
        })
    }

    #[test]
    fn partitions_valid_and_invalid() {
        let batch = screen_rows(vec![
            ok_row("Ada", "ada@example.com", "1234567890"),
            ok_row("Bob", "not-an-email", "1234567890"),
            ok_row("Cleo", "cleo@example.com", "0987654321"),
        ]);

        assert_eq!(batch.valid.len(), 2);
        assert_eq!(batch.errors.len(), 1);
        // 0-based index 1, plus the header offset.
        assert_eq!(batch.errors[0].row, 3);
        assert_eq!(batch.errors[0].error, "invalid email format");
    }

    #[test]
    fn undecodable_row_still_yields_an_outcome() {
        let batch = screen_rows(vec![
            Err("unreadable row".to_string()),
            ok_row("Ada", "ada@example.com", "1234567890"),
        ]);

        assert_eq!(batch.valid.len(), 1);
        assert_eq!(batch.errors, vec![RowError {
            row: 2,
            error: "unreadable row".into(),
        }]);
    }

    #[test]
    fn empty_input_yields_empty_batch() {
        let batch = screen_rows(Vec::<RowRead>::new());
        assert!(batch.valid.is_empty());
        assert!(batch.errors.is_empty());
    }
}
