//! FILENAME: dataview/src/lib.rs
//! Read-only view layer for the data engine.
//!
//! A `DataView` is a non-owning projection over a `Table` or another view:
//! it selects, reorders, duplicates or hides columns and rows, and can add
//! calculated columns computed from backing-row data. Views implement the
//! same `DataSource` interface as tables, so query utilities and the
//! group/join engines consume either interchangeably.

pub mod view;

pub use view::{CalcFn, CalculatedColumn, DataView, ViewColumn};
