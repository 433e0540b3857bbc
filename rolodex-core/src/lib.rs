pub mod contact;
pub mod import;
pub mod query;
pub mod sheet;

pub use contact::{validate_row, NewContact, RawRow, ValidationError};
pub use import::{screen_rows, ImportBatch, RowError};
pub use query::{
    parse_page, BuiltQuery, Dialect, QueryBuilder, QuerySpec, SortOrder, SqlParam, PAGE_SIZE,
};
pub use sheet::{read_rows, write_contacts, write_error_report, RowRead, SheetError};
