//! FILENAME: datatable/src/cell.rs
//! PURPOSE: Column descriptors, cells and rows.
//! CONTEXT: A `Column` declares the type and metadata of one table column.
//! A `Cell` couples a typed value with an optional cached display string and
//! an open property map. A `Row` is an ordered cell list whose length always
//! equals the owning table's column count.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::value::{ColumnType, Value};

/// Open string-keyed metadata attached to cells, rows, columns and tables.
/// The engine never interprets these values.
pub type PropertyMap = HashMap<String, serde_json::Value>;

// ============================================================================
// COLUMNS
// ============================================================================

/// Descriptor of a single table column. The type is fixed at creation;
/// label and id stay mutable through the owning table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Identifier, possibly empty. Non-empty ids are unique within a table.
    #[serde(default)]
    pub id: String,

    /// Display label, defaults to empty.
    #[serde(default)]
    pub label: String,

    /// Declared value type of every cell in this column.
    #[serde(rename = "type")]
    pub column_type: ColumnType,

    /// Formatting hint, opaque to the engine.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    /// Semantic tag (e.g. "annotation"), opaque to the engine.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    /// Column-level metadata.
    #[serde(default, rename = "p", skip_serializing_if = "PropertyMap::is_empty")]
    pub properties: PropertyMap,
}

impl Column {
    pub fn new(column_type: ColumnType) -> Self {
        Column {
            id: String::new(),
            label: String::new(),
            column_type,
            pattern: None,
            role: None,
            properties: PropertyMap::new(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }
}

// ============================================================================
// CELLS AND ROWS
// ============================================================================

/// The atomic unit of a table: a typed value, an optional cached display
/// string (None means "not yet computed") and an open property map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub value: Value,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatted: Option<String>,

    #[serde(default, skip_serializing_if = "PropertyMap::is_empty")]
    pub properties: PropertyMap,
}

impl Cell {
    /// A cell holding null with no metadata.
    pub fn null() -> Self {
        Cell {
            value: Value::Null,
            formatted: None,
            properties: PropertyMap::new(),
        }
    }

    pub fn new(value: Value) -> Self {
        Cell {
            value,
            formatted: None,
            properties: PropertyMap::new(),
        }
    }

    pub fn with_formatted(mut self, formatted: impl Into<String>) -> Self {
        self.formatted = Some(formatted.into());
        self
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::null()
    }
}

/// An ordered cell list plus row-level metadata. Length is maintained by the
/// owning table to always match the column count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub cells: Vec<Cell>,

    #[serde(default, skip_serializing_if = "PropertyMap::is_empty")]
    pub properties: PropertyMap,
}

impl Row {
    /// A row of `width` null cells.
    pub fn nulls(width: usize) -> Self {
        Row {
            cells: vec![Cell::null(); width],
            properties: PropertyMap::new(),
        }
    }

    pub fn from_cells(cells: Vec<Cell>) -> Self {
        Row { cells, properties: PropertyMap::new() }
    }
}
