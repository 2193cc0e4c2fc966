//! Transformation module.
//!
//! Turns stored survey payloads into flat CSV rows:
//! - Flatten: one record → one row per canvas entry

pub mod flatten;

pub use flatten::{flatten, ExportRow, PersonalCells, COLUMN_COUNT, HEADERS};
