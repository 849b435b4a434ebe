//! FILENAME: group-engine/src/lib.rs
//! Group-by subsystem for the data engine.
//!
//! This crate buckets the rows of any `DataSource` on one or more key
//! columns (optionally transformed by modifier functions) and reduces the
//! remaining columns through registered aggregation kinds, producing a new
//! `Table`.
//!
//! Layers:
//! - `definition`: Group descriptors (what the grouping IS)
//! - `registry`: Aggregation kinds (HOW values reduce)
//! - `modifiers`: Built-in key transforms
//! - `engine`: The bucketing pass (HOW we calculate)

pub mod definition;
pub mod engine;
pub mod modifiers;
pub mod registry;

pub use definition::{AggregationColumn, GroupKeyColumn, KeyModifier};
pub use engine::{group, group_with};
pub use registry::{AggregationRegistry, Aggregator, OutputType};
