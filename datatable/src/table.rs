//! FILENAME: datatable/src/table.rs
//! PURPOSE: The mutable owner of columns, rows and properties.
//! CONTEXT: `Table` is the only entity in the engine that allows structural
//! mutation. Every mutation keeps the central invariants intact: each row is
//! exactly as wide as the column list, every non-null cell value conforms to
//! its column's declared type, and non-empty column ids are unique. Batch
//! operations validate their whole input before touching storage, so a
//! failed batch leaves the table unchanged.

use serde_json::Value as JsonValue;

use crate::cell::{Cell, Column, PropertyMap, Row};
use crate::error::{DataError, DataResult};
use crate::format::{default_formatted_value, ValueFormatter};
use crate::query::{self, SortSpec};
use crate::source::DataSource;
use crate::value::{ColumnType, Value};

/// An in-memory table of typed columns and ordered rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
    rows: Vec<Row>,
    properties: PropertyMap,
}

impl Table {
    /// Creates an empty table with no columns and no rows.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table from a column-type list and rows of typed values.
    /// The whole input is validated before the table is assembled.
    pub fn from_values(types: &[ColumnType], rows: Vec<Vec<Value>>) -> DataResult<Self> {
        let mut table = Table::new();
        for &column_type in types {
            table.add_column(column_type);
        }
        table.add_rows_from(rows)?;
        Ok(table)
    }

    /// Builds a table from a plain array-of-arrays. When `first_row_is_labels`
    /// is set, the first row supplies column labels (rendered with the
    /// default formatter when not strings). Column types are inferred from
    /// the first non-null value of each column; an all-null column becomes a
    /// string column.
    pub fn from_array(mut rows: Vec<Vec<Value>>, first_row_is_labels: bool) -> DataResult<Self> {
        let labels: Option<Vec<Value>> = if first_row_is_labels && !rows.is_empty() {
            Some(rows.remove(0))
        } else {
            None
        };

        let width = labels
            .as_ref()
            .map(|l| l.len())
            .or_else(|| rows.first().map(|r| r.len()))
            .unwrap_or(0);

        let mut types = Vec::with_capacity(width);
        for col in 0..width {
            types.push(infer_column_type(&rows, col));
        }

        let mut table = Table::new();
        for (col, &column_type) in types.iter().enumerate() {
            let mut column = Column::new(column_type);
            if let Some(labels) = &labels {
                if let Some(label) = labels.get(col) {
                    column.label = match label {
                        Value::String(s) => s.clone(),
                        other => default_formatted_value(column_type, other),
                    };
                }
            }
            table.add_column_with(column)?;
        }
        table.add_rows_from(rows)?;
        Ok(table)
    }

    // ========================================================================
    // COLUMN OPERATIONS
    // ========================================================================

    /// Appends a column of the given type with empty label and id. Every
    /// existing row gains a null cell in the new position. Returns the new
    /// column's index.
    pub fn add_column(&mut self, column_type: ColumnType) -> usize {
        for row in &mut self.rows {
            row.cells.push(Cell::null());
        }
        self.columns.push(Column::new(column_type));
        self.columns.len() - 1
    }

    /// Appends a fully described column. Fails with `DuplicateColumnId` when
    /// the column carries a non-empty id already present in the table.
    pub fn add_column_with(&mut self, column: Column) -> DataResult<usize> {
        self.check_new_column_id(&column.id)?;
        for row in &mut self.rows {
            row.cells.push(Cell::null());
        }
        self.columns.push(column);
        Ok(self.columns.len() - 1)
    }

    /// Inserts a column at `index`, shifting subsequent columns right.
    /// `index` may equal the current column count (append position).
    pub fn insert_column(&mut self, index: usize, column_type: ColumnType) -> DataResult<()> {
        self.insert_column_with(index, Column::new(column_type))
    }

    /// Inserts a fully described column at `index`.
    pub fn insert_column_with(&mut self, index: usize, column: Column) -> DataResult<()> {
        if index > self.columns.len() {
            return Err(DataError::column_out_of_range(index, self.columns.len()));
        }
        self.check_new_column_id(&column.id)?;
        for row in &mut self.rows {
            row.cells.insert(index, Cell::null());
        }
        self.columns.insert(index, column);
        Ok(())
    }

    /// Removes the column at `index` and the corresponding cell from every
    /// row, shifting subsequent columns left.
    pub fn remove_column(&mut self, index: usize) -> DataResult<()> {
        self.check_column(index)?;
        for row in &mut self.rows {
            row.cells.remove(index);
        }
        self.columns.remove(index);
        Ok(())
    }

    /// Read access to a column descriptor.
    pub fn column(&self, index: usize) -> DataResult<&Column> {
        self.check_column(index)?;
        Ok(&self.columns[index])
    }

    pub fn set_column_label(&mut self, index: usize, label: impl Into<String>) -> DataResult<()> {
        self.check_column(index)?;
        self.columns[index].label = label.into();
        Ok(())
    }

    /// Changes a column's id. Non-empty ids must stay unique.
    pub fn set_column_id(&mut self, index: usize, id: impl Into<String>) -> DataResult<()> {
        self.check_column(index)?;
        let id = id.into();
        if !id.is_empty() {
            let clash = self
                .columns
                .iter()
                .enumerate()
                .any(|(i, c)| i != index && c.id == id);
            if clash {
                return Err(DataError::DuplicateColumnId(id));
            }
        }
        self.columns[index].id = id;
        Ok(())
    }

    /// The index of the column with the given non-empty id, if any.
    pub fn column_index_by_id(&self, id: &str) -> Option<usize> {
        if id.is_empty() {
            return None;
        }
        self.columns.iter().position(|c| c.id == id)
    }

    pub fn column_property(&self, index: usize, name: &str) -> DataResult<Option<JsonValue>> {
        self.check_column(index)?;
        Ok(self.columns[index].properties.get(name).cloned())
    }

    pub fn set_column_property(
        &mut self,
        index: usize,
        name: impl Into<String>,
        value: JsonValue,
    ) -> DataResult<()> {
        self.check_column(index)?;
        self.columns[index].properties.insert(name.into(), value);
        Ok(())
    }

    // ========================================================================
    // ROW OPERATIONS
    // ========================================================================

    /// Appends `n` rows of null cells. Returns the index of the first new
    /// row (equal to the new row count when `n` is zero).
    pub fn add_rows(&mut self, n: usize) -> usize {
        let first = self.rows.len();
        let width = self.columns.len();
        self.rows.extend((0..n).map(|_| Row::nulls(width)));
        first
    }

    /// Appends one row of typed values. The value list may be shorter than
    /// the column list (missing cells become null) but never longer. Returns
    /// the new row's index.
    pub fn add_row(&mut self, values: Vec<Value>) -> DataResult<usize> {
        let row = self.build_row(values)?;
        self.rows.push(row);
        Ok(self.rows.len() - 1)
    }

    /// Appends a batch of typed rows. The whole batch is validated before
    /// any row is adopted, so a failure leaves the table untouched. Returns
    /// the index of the first appended row.
    pub fn add_rows_from(&mut self, rows: Vec<Vec<Value>>) -> DataResult<usize> {
        let built = self.build_rows(rows)?;
        let first = self.rows.len();
        self.rows.extend(built);
        Ok(first)
    }

    /// Inserts a batch of typed rows at `index`, shifting subsequent rows
    /// down. `index` may equal the current row count (append position).
    pub fn insert_rows(&mut self, index: usize, rows: Vec<Vec<Value>>) -> DataResult<()> {
        if index > self.rows.len() {
            return Err(DataError::row_out_of_range(index, self.rows.len()));
        }
        let built = self.build_rows(rows)?;
        self.rows.splice(index..index, built);
        Ok(())
    }

    /// Removes `count` contiguous rows starting at `index`, shifting later
    /// rows up. The whole run must be in range; nothing is clamped.
    pub fn remove_rows(&mut self, index: usize, count: usize) -> DataResult<()> {
        self.check_row(index)?;
        if index + count > self.rows.len() {
            return Err(DataError::row_out_of_range(index + count, self.rows.len()));
        }
        self.rows.drain(index..index + count);
        Ok(())
    }

    pub fn row_property(&self, row: usize, name: &str) -> DataResult<Option<JsonValue>> {
        self.check_row(row)?;
        Ok(self.rows[row].properties.get(name).cloned())
    }

    pub fn set_row_property(
        &mut self,
        row: usize,
        name: impl Into<String>,
        value: JsonValue,
    ) -> DataResult<()> {
        self.check_row(row)?;
        self.rows[row].properties.insert(name.into(), value);
        Ok(())
    }

    // ========================================================================
    // CELL OPERATIONS
    // ========================================================================

    /// Sets a cell's value, validating it against the column type. Clears
    /// the cell's cached formatted value; properties are kept.
    pub fn set_value(&mut self, row: usize, col: usize, value: Value) -> DataResult<()> {
        self.check_cell(row, col)?;
        query::validate_type_match(self.columns[col].column_type, &value)?;
        let cell = &mut self.rows[row].cells[col];
        cell.value = value;
        cell.formatted = None;
        Ok(())
    }

    /// Sets a cell's value together with an explicit formatted string.
    pub fn set_cell(
        &mut self,
        row: usize,
        col: usize,
        value: Value,
        formatted: Option<String>,
    ) -> DataResult<()> {
        self.check_cell(row, col)?;
        query::validate_type_match(self.columns[col].column_type, &value)?;
        let cell = &mut self.rows[row].cells[col];
        cell.value = value;
        cell.formatted = formatted;
        Ok(())
    }

    pub fn set_formatted_value(
        &mut self,
        row: usize,
        col: usize,
        formatted: Option<String>,
    ) -> DataResult<()> {
        self.check_cell(row, col)?;
        self.rows[row].cells[col].formatted = formatted;
        Ok(())
    }

    pub fn set_cell_property(
        &mut self,
        row: usize,
        col: usize,
        name: impl Into<String>,
        value: JsonValue,
    ) -> DataResult<()> {
        self.check_cell(row, col)?;
        self.rows[row].cells[col].properties.insert(name.into(), value);
        Ok(())
    }

    /// Read access to a whole cell.
    pub fn cell(&self, row: usize, col: usize) -> DataResult<&Cell> {
        self.check_cell(row, col)?;
        Ok(&self.rows[row].cells[col])
    }

    // ========================================================================
    // TABLE-LEVEL PROPERTIES
    // ========================================================================

    pub fn table_property(&self, name: &str) -> Option<&JsonValue> {
        self.properties.get(name)
    }

    pub fn set_table_property(&mut self, name: impl Into<String>, value: JsonValue) {
        self.properties.insert(name.into(), value);
    }

    pub fn table_properties(&self) -> &PropertyMap {
        &self.properties
    }

    pub(crate) fn set_table_properties(&mut self, properties: PropertyMap) {
        self.properties = properties;
    }

    // ========================================================================
    // WHOLE-TABLE OPERATIONS
    // ========================================================================

    /// Reorders rows in place by the given sort keys (stable, nulls first).
    pub fn sort(&mut self, specs: &[SortSpec]) -> DataResult<()> {
        let permutation = query::sorted_rows(self, specs)?;
        self.rows = permutation.iter().map(|&i| self.rows[i].clone()).collect();
        Ok(())
    }

    /// Writes a cached formatted string for every cell of a column through
    /// the given formatter, passing the column's pattern hint along.
    pub fn format_column(&mut self, col: usize, formatter: &dyn ValueFormatter) -> DataResult<()> {
        self.check_column(col)?;
        let pattern = self.columns[col].pattern.clone();
        for row in &mut self.rows {
            let cell = &mut row.cells[col];
            cell.formatted = Some(formatter.format(&cell.value, pattern.as_deref()));
        }
        Ok(())
    }

    // ========================================================================
    // INTERNALS
    // ========================================================================

    fn check_row(&self, row: usize) -> DataResult<()> {
        if row >= self.rows.len() {
            return Err(DataError::row_out_of_range(row, self.rows.len()));
        }
        Ok(())
    }

    fn check_column(&self, col: usize) -> DataResult<()> {
        if col >= self.columns.len() {
            return Err(DataError::column_out_of_range(col, self.columns.len()));
        }
        Ok(())
    }

    fn check_cell(&self, row: usize, col: usize) -> DataResult<()> {
        self.check_row(row)?;
        self.check_column(col)
    }

    fn check_new_column_id(&self, id: &str) -> DataResult<()> {
        if !id.is_empty() && self.columns.iter().any(|c| c.id == id) {
            return Err(DataError::DuplicateColumnId(id.to_string()));
        }
        Ok(())
    }

    /// Validates one value row and turns it into a cell row. The value list
    /// may be shorter than the column list; extra values are an error on the
    /// column axis.
    fn build_row(&self, values: Vec<Value>) -> DataResult<Row> {
        if values.len() > self.columns.len() {
            return Err(DataError::column_out_of_range(
                values.len() - 1,
                self.columns.len(),
            ));
        }
        for (col, value) in values.iter().enumerate() {
            query::validate_type_match(self.columns[col].column_type, value)?;
        }
        let mut cells: Vec<Cell> = values.into_iter().map(Cell::new).collect();
        cells.resize(self.columns.len(), Cell::null());
        Ok(Row::from_cells(cells))
    }

    fn build_rows(&self, rows: Vec<Vec<Value>>) -> DataResult<Vec<Row>> {
        rows.into_iter().map(|values| self.build_row(values)).collect()
    }

    pub(crate) fn push_built_row(&mut self, row: Row) {
        debug_assert_eq!(row.cells.len(), self.columns.len());
        self.rows.push(row);
    }

    pub(crate) fn columns_ref(&self) -> &[Column] {
        &self.columns
    }

    pub(crate) fn rows_ref(&self) -> &[Row] {
        &self.rows
    }
}

fn infer_column_type(rows: &[Vec<Value>], col: usize) -> ColumnType {
    for row in rows {
        match row.get(col) {
            Some(Value::Null) | None => continue,
            Some(Value::String(_)) => return ColumnType::String,
            Some(Value::Number(_)) => return ColumnType::Number,
            Some(Value::Boolean(_)) => return ColumnType::Boolean,
            Some(Value::Date(_)) => return ColumnType::Date,
            Some(Value::TimeOfDay(_)) => return ColumnType::TimeOfDay,
        }
    }
    ColumnType::String
}

impl DataSource for Table {
    fn num_rows(&self) -> usize {
        self.rows.len()
    }

    fn num_columns(&self) -> usize {
        self.columns.len()
    }

    fn column_type(&self, col: usize) -> DataResult<ColumnType> {
        Ok(self.column(col)?.column_type)
    }

    fn column_label(&self, col: usize) -> DataResult<String> {
        Ok(self.column(col)?.label.clone())
    }

    fn column_id(&self, col: usize) -> DataResult<String> {
        Ok(self.column(col)?.id.clone())
    }

    fn column_pattern(&self, col: usize) -> DataResult<Option<String>> {
        Ok(self.column(col)?.pattern.clone())
    }

    fn column_role(&self, col: usize) -> DataResult<Option<String>> {
        Ok(self.column(col)?.role.clone())
    }

    fn value(&self, row: usize, col: usize) -> DataResult<Value> {
        Ok(self.cell(row, col)?.value.clone())
    }

    fn formatted_value(&self, row: usize, col: usize) -> DataResult<String> {
        let cell = self.cell(row, col)?;
        match &cell.formatted {
            Some(formatted) => Ok(formatted.clone()),
            None => Ok(default_formatted_value(
                self.columns[col].column_type,
                &cell.value,
            )),
        }
    }

    fn cell_property(&self, row: usize, col: usize, name: &str) -> DataResult<Option<JsonValue>> {
        Ok(self.cell(row, col)?.properties.get(name).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Axis;

    fn name_score_table() -> Table {
        Table::from_values(
            &[ColumnType::String, ColumnType::Number],
            vec![
                vec![Value::String("A".into()), Value::Number(1.0)],
                vec![Value::String("B".into()), Value::Number(2.0)],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_add_column_pads_existing_rows_with_null() {
        let mut table = name_score_table();
        let index = table.add_column(ColumnType::Boolean);
        assert_eq!(index, 2);
        assert_eq!(table.num_columns(), 3);
        for row in 0..table.num_rows() {
            assert_eq!(table.value(row, 2).unwrap(), Value::Null);
        }
        // Old columns untouched.
        assert_eq!(table.value(0, 0).unwrap(), Value::String("A".into()));
    }

    #[test]
    fn test_insert_column_shifts_cells() {
        let mut table = name_score_table();
        table.insert_column(0, ColumnType::Number).unwrap();
        assert_eq!(table.value(0, 0).unwrap(), Value::Null);
        assert_eq!(table.value(0, 1).unwrap(), Value::String("A".into()));
        assert_eq!(
            table.insert_column(9, ColumnType::Number),
            Err(DataError::column_out_of_range(9, 3))
        );
    }

    #[test]
    fn test_remove_column_removes_cells() {
        let mut table = name_score_table();
        table.remove_column(0).unwrap();
        assert_eq!(table.num_columns(), 1);
        assert_eq!(table.value(0, 0).unwrap(), Value::Number(1.0));
        assert_eq!(
            table.remove_column(5),
            Err(DataError::column_out_of_range(5, 1))
        );
    }

    #[test]
    fn test_duplicate_column_id_rejected() {
        let mut table = Table::new();
        table
            .add_column_with(Column::new(ColumnType::String).with_id("a"))
            .unwrap();
        assert_eq!(
            table.add_column_with(Column::new(ColumnType::Number).with_id("a")),
            Err(DataError::DuplicateColumnId("a".to_string()))
        );
        // Empty ids never clash.
        table.add_column_with(Column::new(ColumnType::Number)).unwrap();
        table.add_column_with(Column::new(ColumnType::Number)).unwrap();
        assert_eq!(table.num_columns(), 3);
    }

    #[test]
    fn test_set_value_validates_and_clears_formatted() {
        let mut table = name_score_table();
        table.set_formatted_value(0, 1, Some("one".into())).unwrap();
        assert_eq!(table.formatted_value(0, 1).unwrap(), "one");

        table.set_value(0, 1, Value::Number(7.0)).unwrap();
        assert_eq!(table.value(0, 1).unwrap(), Value::Number(7.0));
        // Cached display string no longer applies.
        assert_eq!(table.formatted_value(0, 1).unwrap(), "7");

        assert_eq!(
            table.set_value(0, 1, Value::String("x".into())),
            Err(DataError::TypeMismatch {
                expected: ColumnType::Number,
                found: "string".to_string(),
            })
        );
        assert_eq!(
            table.set_value(9, 0, Value::Null),
            Err(DataError::IndexOutOfRange { axis: Axis::Row, index: 9, len: 2 })
        );
    }

    #[test]
    fn test_null_always_allowed() {
        let mut table = name_score_table();
        table.set_value(0, 1, Value::Null).unwrap();
        assert_eq!(table.value(0, 1).unwrap(), Value::Null);
    }

    #[test]
    fn test_add_rows_null_form() {
        let mut table = name_score_table();
        let first = table.add_rows(2);
        assert_eq!(first, 2);
        assert_eq!(table.num_rows(), 4);
        assert_eq!(table.value(3, 0).unwrap(), Value::Null);
    }

    #[test]
    fn test_short_row_padded_long_row_rejected() {
        let mut table = name_score_table();
        table.add_row(vec![Value::String("C".into())]).unwrap();
        assert_eq!(table.value(2, 1).unwrap(), Value::Null);

        let err = table
            .add_row(vec![Value::String("D".into()), Value::Number(1.0), Value::Null])
            .unwrap_err();
        assert_eq!(err, DataError::column_out_of_range(2, 2));
    }

    #[test]
    fn test_failed_batch_leaves_table_unchanged() {
        let mut table = name_score_table();
        let result = table.add_rows_from(vec![
            vec![Value::String("C".into()), Value::Number(3.0)],
            vec![Value::String("D".into()), Value::Boolean(true)],
        ]);
        assert!(matches!(result, Err(DataError::TypeMismatch { .. })));
        assert_eq!(table.num_rows(), 2);
    }

    #[test]
    fn test_insert_and_remove_rows() {
        let mut table = name_score_table();
        table
            .insert_rows(1, vec![vec![Value::String("M".into()), Value::Number(9.0)]])
            .unwrap();
        assert_eq!(table.num_rows(), 3);
        assert_eq!(table.value(1, 0).unwrap(), Value::String("M".into()));
        assert_eq!(table.value(2, 0).unwrap(), Value::String("B".into()));

        table.remove_rows(0, 2).unwrap();
        assert_eq!(table.num_rows(), 1);
        assert_eq!(table.value(0, 0).unwrap(), Value::String("B".into()));

        assert_eq!(
            table.remove_rows(0, 2),
            Err(DataError::row_out_of_range(2, 1))
        );
    }

    #[test]
    fn test_clone_shares_no_state() {
        let original = name_score_table();
        let mut copy = original.clone();
        copy.set_value(0, 1, Value::Number(99.0)).unwrap();
        copy.set_table_property("k", serde_json::json!(1));
        assert_eq!(original.value(0, 1).unwrap(), Value::Number(1.0));
        assert!(original.table_property("k").is_none());
    }

    #[test]
    fn test_sort_in_place() {
        let mut table = Table::from_values(
            &[ColumnType::Number],
            vec![
                vec![Value::Number(3.0)],
                vec![Value::Number(1.0)],
                vec![Value::Number(2.0)],
            ],
        )
        .unwrap();
        table.sort(&[SortSpec::ascending(0)]).unwrap();
        assert_eq!(table.value(0, 0).unwrap(), Value::Number(1.0));
        assert_eq!(table.value(2, 0).unwrap(), Value::Number(3.0));
    }

    #[test]
    fn test_from_array_with_header_and_inference() {
        let table = Table::from_array(
            vec![
                vec![Value::String("name".into()), Value::String("score".into())],
                vec![Value::String("A".into()), Value::Null],
                vec![Value::String("B".into()), Value::Number(2.0)],
            ],
            true,
        )
        .unwrap();
        assert_eq!(table.num_rows(), 2);
        assert_eq!(table.column_label(0).unwrap(), "name");
        assert_eq!(table.column_type(0).unwrap(), ColumnType::String);
        // Inference skips the null and lands on number.
        assert_eq!(table.column_type(1).unwrap(), ColumnType::Number);
    }

    #[test]
    fn test_property_channels_are_independent() {
        let mut table = name_score_table();
        table
            .set_cell_property(0, 0, "style", serde_json::json!("bold"))
            .unwrap();
        table.set_row_property(0, "origin", serde_json::json!("csv")).unwrap();
        table
            .set_column_property(0, "hidden", serde_json::json!(false))
            .unwrap();

        assert_eq!(table.value(0, 0).unwrap(), Value::String("A".into()));
        assert_eq!(
            table.cell_property(0, 0, "style").unwrap(),
            Some(serde_json::json!("bold"))
        );
        assert_eq!(
            table.row_property(0, "origin").unwrap(),
            Some(serde_json::json!("csv"))
        );
        assert_eq!(
            table.column_property(0, "hidden").unwrap(),
            Some(serde_json::json!(false))
        );
        assert_eq!(table.cell_property(0, 0, "missing").unwrap(), None);
    }

    #[test]
    fn test_format_column_writes_cache() {
        struct Currency;
        impl ValueFormatter for Currency {
            fn format(&self, value: &Value, _pattern: Option<&str>) -> String {
                match value {
                    Value::Number(n) => format!("${:.2}", n),
                    other => default_formatted_value(ColumnType::Number, other),
                }
            }
        }

        let mut table = name_score_table();
        table.format_column(1, &Currency).unwrap();
        assert_eq!(table.formatted_value(0, 1).unwrap(), "$1.00");
        assert_eq!(table.formatted_value(1, 1).unwrap(), "$2.00");
    }
}
