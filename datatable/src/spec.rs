//! FILENAME: datatable/src/spec.rs
//! PURPOSE: The structured table specification (construction/serialization boundary).
//! CONTEXT: A `TableSpec` is the serializable description of a table: an
//! ordered column-descriptor list and an ordered row list, each row an
//! ordered cell list `{v, f?, p?}`. Absent `v` means null. Reconstruction
//! validates eagerly and builds into a fresh table, so a bad spec never
//! yields a half-populated table.

use serde::{Deserialize, Serialize};

use crate::cell::{Cell, Column, PropertyMap, Row};
use crate::error::{DataError, DataResult};
use crate::query::validate_type_match;
use crate::source::DataSource;
use crate::table::Table;
use crate::value::Value;

/// One cell descriptor: value, optional cached display string, properties.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CellSpec {
    /// The typed value; absent means null.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub v: Option<Value>,

    /// Explicitly set formatted value, when one exists.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub f: Option<String>,

    #[serde(default, skip_serializing_if = "PropertyMap::is_empty")]
    pub p: PropertyMap,
}

/// One row descriptor: parallel cell descriptors plus row metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RowSpec {
    #[serde(default)]
    pub c: Vec<CellSpec>,

    #[serde(default, skip_serializing_if = "PropertyMap::is_empty")]
    pub p: PropertyMap,
}

/// The full structured specification of a table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableSpec {
    #[serde(default)]
    pub cols: Vec<Column>,

    #[serde(default)]
    pub rows: Vec<RowSpec>,

    #[serde(default, skip_serializing_if = "PropertyMap::is_empty")]
    pub p: PropertyMap,
}

impl Table {
    /// Reconstructs a table from a structured specification. Column ids and
    /// every cell value are validated before any storage is adopted. Rows
    /// shorter than the column list are padded with null cells; longer rows
    /// are an error on the column axis.
    pub fn from_spec(spec: &TableSpec) -> DataResult<Self> {
        let mut table = Table::new();
        for column in &spec.cols {
            table.add_column_with(column.clone())?;
        }

        let width = spec.cols.len();
        for row_spec in &spec.rows {
            if row_spec.c.len() > width {
                return Err(DataError::column_out_of_range(row_spec.c.len() - 1, width));
            }
            let mut cells = Vec::with_capacity(width);
            for (col, cell_spec) in row_spec.c.iter().enumerate() {
                let value = cell_spec.v.clone().unwrap_or(Value::Null);
                validate_type_match(spec.cols[col].column_type, &value)?;
                cells.push(Cell {
                    value,
                    formatted: cell_spec.f.clone(),
                    properties: cell_spec.p.clone(),
                });
            }
            cells.resize(width, Cell::null());
            table.push_built_row(Row {
                cells,
                properties: row_spec.p.clone(),
            });
        }

        table.set_table_properties(spec.p.clone());
        Ok(table)
    }

    /// Serializes this table to an equivalent structured specification.
    /// Only explicitly set formatted values are carried; lazily computed
    /// display strings are recomputed on the other side.
    pub fn to_spec(&self) -> TableSpec {
        let cols = self.columns_ref().to_vec();

        let mut rows = Vec::with_capacity(self.num_rows());
        for source_row in self.rows_ref() {
            let c = source_row
                .cells
                .iter()
                .map(|cell| CellSpec {
                    v: if cell.value.is_null() { None } else { Some(cell.value.clone()) },
                    f: cell.formatted.clone(),
                    p: cell.properties.clone(),
                })
                .collect();
            rows.push(RowSpec {
                c,
                p: source_row.properties.clone(),
            });
        }

        TableSpec {
            cols,
            rows,
            p: self.table_properties().clone(),
        }
    }
}
