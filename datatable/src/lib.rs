//! FILENAME: datatable/src/lib.rs
//! PURPOSE: Core data-engine crate: the typed value model, the mutable
//! `Table`, the shared read-only `DataSource` interface, and the query,
//! formatting and CSV-conversion utilities that operate on it.
//! CONTEXT: Views live in `dataview`; the relational operators live in
//! `group-engine` and `join-engine`. Everything downstream consumes data
//! through the `DataSource` trait re-exported here.

pub mod cell;
pub mod csv;
pub mod error;
pub mod format;
pub mod query;
pub mod source;
pub mod spec;
pub mod table;
pub mod value;

// Re-export commonly used types at the crate root
pub use cell::{Cell, Column, PropertyMap, Row};
pub use csv::{parse_boolean, parse_column_types, parse_csv_row, parse_date, parse_number, table_from_csv_rows};
pub use error::{Axis, DataError, DataResult};
pub use format::{default_formatted_value, FormatterRegistry, ValueFormatter};
pub use query::{
    column_range, distinct_values, filtered_rows, sorted_rows, validate_column_index,
    validate_row_index, validate_type_match, ColumnRange, FilterSpec, SortSpec,
};
pub use source::DataSource;
pub use spec::{CellSpec, RowSpec, TableSpec};
pub use table::Table;
pub use value::{compare_values, ColumnType, OrderedFloat, TimeOfDay, Value, ValueKey};
