//! FILENAME: datatable/src/source.rs
//! PURPOSE: The shared read-only interface over tables and views.
//! CONTEXT: Query utilities and the group/join engines consume any readable
//! table-like source through this trait, so they work identically over a
//! `Table` or a view chain. All access is by index and all values are
//! returned by value; no references into internal storage escape.

use serde_json::Value as JsonValue;

use crate::error::DataResult;
use crate::value::{ColumnType, Value};

/// A readable table-like source: an ordered set of typed columns over an
/// ordered set of rows. Implemented by `Table` and by `DataView`.
pub trait DataSource {
    fn num_rows(&self) -> usize;

    fn num_columns(&self) -> usize;

    fn column_type(&self, col: usize) -> DataResult<ColumnType>;

    fn column_label(&self, col: usize) -> DataResult<String>;

    fn column_id(&self, col: usize) -> DataResult<String>;

    fn column_pattern(&self, col: usize) -> DataResult<Option<String>>;

    fn column_role(&self, col: usize) -> DataResult<Option<String>>;

    /// The cell value at (row, col). Never null-pads: out-of-range indices
    /// fail with `IndexOutOfRange`.
    fn value(&self, row: usize, col: usize) -> DataResult<Value>;

    /// The display string for a cell: the cached formatted value when one
    /// was set, otherwise the type-specific default rendering. Computed per
    /// read; reads never write the cache.
    fn formatted_value(&self, row: usize, col: usize) -> DataResult<String>;

    /// A cell-level metadata entry, or None when absent.
    fn cell_property(&self, row: usize, col: usize, name: &str) -> DataResult<Option<JsonValue>>;
}
