//! FILENAME: dataview/src/view.rs
//! PURPOSE: Read-only projections over a table or another view.
//! CONTEXT: A `DataView` borrows its backing source and exposes a remapped
//! window onto it: columns may be reordered, duplicated, hidden or computed
//! by a stored function; rows may be reordered, duplicated or hidden. Both
//! mappings are captured when set and never observe later changes to the
//! backing source (the borrow rules out backing mutation while the view is
//! alive; rebuilding is the caller's job). A view never mutates its backing
//! source: formatted-value and property writes land in a per-view side
//! table keyed by view coordinates.

use std::collections::HashMap;

use serde_json::Value as JsonValue;

use datatable::{
    default_formatted_value, query, Cell, Column, ColumnType, DataError, DataResult, DataSource,
    PropertyMap, Table, Value,
};

/// Projection function of a calculated column: receives the backing source
/// and a backing-row index, returns the computed value. Invoked on every
/// read (no memoization).
pub type CalcFn<'a> = Box<dyn Fn(&dyn DataSource, usize) -> Value + 'a>;

/// A view column computed from backing-row data rather than stored.
pub struct CalculatedColumn<'a> {
    column: Column,
    calc: CalcFn<'a>,
}

impl<'a> CalculatedColumn<'a> {
    pub fn new(
        column_type: ColumnType,
        label: impl Into<String>,
        calc: impl Fn(&dyn DataSource, usize) -> Value + 'a,
    ) -> Self {
        CalculatedColumn {
            column: Column::new(column_type).with_label(label),
            calc: Box::new(calc),
        }
    }
}

impl std::fmt::Debug for CalculatedColumn<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CalculatedColumn").field("column", &self.column).finish()
    }
}

/// One entry of a view's column mapping: either a backing column by index or
/// a calculated column.
#[derive(Debug)]
pub enum ViewColumn<'a> {
    Source(usize),
    Calculated(CalculatedColumn<'a>),
}

impl<'a> ViewColumn<'a> {
    pub fn calculated(
        column_type: ColumnType,
        label: impl Into<String>,
        calc: impl Fn(&dyn DataSource, usize) -> Value + 'a,
    ) -> Self {
        ViewColumn::Calculated(CalculatedColumn::new(column_type, label, calc))
    }
}

/// Per-view cell metadata written through the view's setters.
#[derive(Debug, Clone, Default)]
struct CellOverride {
    formatted: Option<String>,
    properties: PropertyMap,
}

/// A read-only window over a backing `DataSource`.
pub struct DataView<'a> {
    source: &'a dyn DataSource,
    columns: Vec<ViewColumn<'a>>,
    rows: Vec<usize>,
    overrides: HashMap<(usize, usize), CellOverride>,
}

impl<'a> DataView<'a> {
    /// A view exposing all backing columns and rows in original order.
    pub fn new(source: &'a dyn DataSource) -> Self {
        DataView {
            columns: (0..source.num_columns()).map(ViewColumn::Source).collect(),
            rows: (0..source.num_rows()).collect(),
            source,
            overrides: HashMap::new(),
        }
    }

    // ========================================================================
    // MAPPING MUTATION
    // ========================================================================

    /// Replaces the exposed column list. Backing indices may repeat, reorder
    /// or omit columns (omission hides them); indices are validated eagerly.
    /// Replacing the mapping drops the view's cell overrides.
    pub fn set_columns(&mut self, columns: Vec<ViewColumn<'a>>) -> DataResult<()> {
        for column in &columns {
            if let ViewColumn::Source(index) = column {
                if *index >= self.source.num_columns() {
                    return Err(DataError::column_out_of_range(
                        *index,
                        self.source.num_columns(),
                    ));
                }
            }
        }
        self.columns = columns;
        self.overrides.clear();
        Ok(())
    }

    /// Replaces the exposed row list with backing-row indices (reorder,
    /// duplicate or hide). Indices are validated eagerly. Replacing the
    /// mapping drops the view's cell overrides.
    pub fn set_rows(&mut self, rows: Vec<usize>) -> DataResult<()> {
        for &index in &rows {
            if index >= self.source.num_rows() {
                return Err(DataError::row_out_of_range(index, self.source.num_rows()));
            }
        }
        self.rows = rows;
        self.overrides.clear();
        Ok(())
    }

    /// Removes every view column that maps to one of the given backing
    /// column indices. Calculated columns are unaffected.
    pub fn hide_columns(&mut self, source_indices: &[usize]) {
        self.columns.retain(|column| match column {
            ViewColumn::Source(index) => !source_indices.contains(index),
            ViewColumn::Calculated(_) => true,
        });
        self.overrides.clear();
    }

    /// Removes every view row that maps to one of the given backing row
    /// indices.
    pub fn hide_rows(&mut self, source_indices: &[usize]) {
        self.rows.retain(|index| !source_indices.contains(index));
        self.overrides.clear();
    }

    // ========================================================================
    // MAPPING INTROSPECTION
    // ========================================================================

    /// The backing row index behind each view row, in view order.
    pub fn view_rows(&self) -> &[usize] {
        &self.rows
    }

    /// The backing column index behind each view column, in view order;
    /// None marks a calculated column.
    pub fn view_columns(&self) -> Vec<Option<usize>> {
        self.columns
            .iter()
            .map(|c| match c {
                ViewColumn::Source(index) => Some(*index),
                ViewColumn::Calculated(_) => None,
            })
            .collect()
    }

    /// The backing column index behind a view column; None for calculated.
    pub fn source_column_index(&self, view_col: usize) -> DataResult<Option<usize>> {
        match self.columns.get(view_col) {
            Some(ViewColumn::Source(index)) => Ok(Some(*index)),
            Some(ViewColumn::Calculated(_)) => Ok(None),
            None => Err(DataError::column_out_of_range(view_col, self.columns.len())),
        }
    }

    /// The first view column exposing the given backing column, if any.
    pub fn view_column_index(&self, source_col: usize) -> Option<usize> {
        self.columns.iter().position(|c| matches!(c, ViewColumn::Source(i) if *i == source_col))
    }

    // ========================================================================
    // SIDE-TABLE WRITES
    // ========================================================================

    /// Sets a display string for a view cell. The backing source is never
    /// touched; the override lives in the view.
    pub fn set_formatted_value(
        &mut self,
        row: usize,
        col: usize,
        formatted: Option<String>,
    ) -> DataResult<()> {
        self.check_cell(row, col)?;
        self.overrides.entry((row, col)).or_default().formatted = formatted;
        Ok(())
    }

    /// Sets a cell property in the view's side table.
    pub fn set_cell_property(
        &mut self,
        row: usize,
        col: usize,
        name: impl Into<String>,
        value: JsonValue,
    ) -> DataResult<()> {
        self.check_cell(row, col)?;
        self.overrides
            .entry((row, col))
            .or_default()
            .properties
            .insert(name.into(), value);
        Ok(())
    }

    // ========================================================================
    // MATERIALIZATION
    // ========================================================================

    /// Copies the view's visible window into an owned table: column
    /// metadata, values (calculated columns evaluated once per cell) and any
    /// side-table formatted strings.
    pub fn to_table(&self) -> DataResult<Table> {
        let mut table = Table::new();
        for col in 0..self.columns.len() {
            let mut column = self.column_descriptor(col)?;
            // A backing column may be exposed twice; only the first keeps
            // its non-empty id.
            if !column.id.is_empty() && table.column_index_by_id(&column.id).is_some() {
                column.id = String::new();
            }
            table.add_column_with(column)?;
        }
        for row in 0..self.rows.len() {
            let mut cells = Vec::with_capacity(self.columns.len());
            for col in 0..self.columns.len() {
                let value = self.value(row, col)?;
                query::validate_type_match(self.column_type(col)?, &value)?;
                let mut cell = Cell::new(value);
                if let Some(over) = self.overrides.get(&(row, col)) {
                    cell.formatted = over.formatted.clone();
                    cell.properties = over.properties.clone();
                }
                cells.push(cell);
            }
            table.add_row(Vec::new())?;
            let index = table.num_rows() - 1;
            for (col, cell) in cells.into_iter().enumerate() {
                table.set_cell(index, col, cell.value, cell.formatted)?;
                for (name, value) in cell.properties {
                    table.set_cell_property(index, col, name, value)?;
                }
            }
        }
        Ok(table)
    }

    // ========================================================================
    // INTERNALS
    // ========================================================================

    fn check_row(&self, row: usize) -> DataResult<usize> {
        match self.rows.get(row) {
            Some(&backing) => Ok(backing),
            None => Err(DataError::row_out_of_range(row, self.rows.len())),
        }
    }

    fn check_cell(&self, row: usize, col: usize) -> DataResult<()> {
        self.check_row(row)?;
        if col >= self.columns.len() {
            return Err(DataError::column_out_of_range(col, self.columns.len()));
        }
        Ok(())
    }

    fn view_column(&self, col: usize) -> DataResult<&ViewColumn<'a>> {
        self.columns
            .get(col)
            .ok_or_else(|| DataError::column_out_of_range(col, self.columns.len()))
    }

    /// The effective column descriptor of a view column (cloned from the
    /// backing source, or the calculated column's own descriptor).
    fn column_descriptor(&self, col: usize) -> DataResult<Column> {
        match self.view_column(col)? {
            ViewColumn::Source(index) => {
                let mut column = Column::new(self.source.column_type(*index)?);
                column.id = self.source.column_id(*index)?;
                column.label = self.source.column_label(*index)?;
                column.pattern = self.source.column_pattern(*index)?;
                column.role = self.source.column_role(*index)?;
                Ok(column)
            }
            ViewColumn::Calculated(calc) => Ok(calc.column.clone()),
        }
    }
}

impl std::fmt::Debug for DataView<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataView")
            .field("columns", &self.columns)
            .field("rows", &self.rows)
            .finish()
    }
}

impl DataSource for DataView<'_> {
    fn num_rows(&self) -> usize {
        self.rows.len()
    }

    fn num_columns(&self) -> usize {
        self.columns.len()
    }

    fn column_type(&self, col: usize) -> DataResult<ColumnType> {
        match self.view_column(col)? {
            ViewColumn::Source(index) => self.source.column_type(*index),
            ViewColumn::Calculated(calc) => Ok(calc.column.column_type),
        }
    }

    fn column_label(&self, col: usize) -> DataResult<String> {
        match self.view_column(col)? {
            ViewColumn::Source(index) => self.source.column_label(*index),
            ViewColumn::Calculated(calc) => Ok(calc.column.label.clone()),
        }
    }

    fn column_id(&self, col: usize) -> DataResult<String> {
        match self.view_column(col)? {
            ViewColumn::Source(index) => self.source.column_id(*index),
            ViewColumn::Calculated(calc) => Ok(calc.column.id.clone()),
        }
    }

    fn column_pattern(&self, col: usize) -> DataResult<Option<String>> {
        match self.view_column(col)? {
            ViewColumn::Source(index) => self.source.column_pattern(*index),
            ViewColumn::Calculated(calc) => Ok(calc.column.pattern.clone()),
        }
    }

    fn column_role(&self, col: usize) -> DataResult<Option<String>> {
        match self.view_column(col)? {
            ViewColumn::Source(index) => self.source.column_role(*index),
            ViewColumn::Calculated(calc) => Ok(calc.column.role.clone()),
        }
    }

    /// Resolves through the row and column mappings. Calculated columns
    /// re-invoke their stored function and check the produced value against
    /// the declared type, so a misbehaving projection surfaces as the same
    /// `TypeMismatch` a table write would raise.
    fn value(&self, row: usize, col: usize) -> DataResult<Value> {
        let backing_row = self.check_row(row)?;
        match self.view_column(col)? {
            ViewColumn::Source(index) => self.source.value(backing_row, *index),
            ViewColumn::Calculated(calc) => {
                let value = (calc.calc)(self.source, backing_row);
                query::validate_type_match(calc.column.column_type, &value)?;
                Ok(value)
            }
        }
    }

    fn formatted_value(&self, row: usize, col: usize) -> DataResult<String> {
        if let Some(over) = self.overrides.get(&(row, col)) {
            if let Some(formatted) = &over.formatted {
                self.check_cell(row, col)?;
                return Ok(formatted.clone());
            }
        }
        let backing_row = self.check_row(row)?;
        match self.view_column(col)? {
            ViewColumn::Source(index) => self.source.formatted_value(backing_row, *index),
            ViewColumn::Calculated(calc) => {
                let value = self.value(row, col)?;
                Ok(default_formatted_value(calc.column.column_type, &value))
            }
        }
    }

    fn cell_property(&self, row: usize, col: usize, name: &str) -> DataResult<Option<JsonValue>> {
        if let Some(over) = self.overrides.get(&(row, col)) {
            if let Some(value) = over.properties.get(name) {
                self.check_cell(row, col)?;
                return Ok(Some(value.clone()));
            }
        }
        let backing_row = self.check_row(row)?;
        match self.view_column(col)? {
            ViewColumn::Source(index) => self.source.cell_property(backing_row, *index, name),
            ViewColumn::Calculated(_) => Ok(None),
        }
    }
}
