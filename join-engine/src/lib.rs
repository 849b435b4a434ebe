//! FILENAME: join-engine/src/lib.rs
//! Join subsystem for the data engine.
//!
//! Merges the rows of two `DataSource`s on paired key columns under
//! inner/left/right/full semantics, producing a new `Table` whose columns
//! are the left columns followed by the right non-key columns.

pub mod engine;

pub use engine::{join, JoinMode};
