//! Synthetic CSV generation for csvforge.
//!
//! Takes a validated schema, resolves the column layout, and streams a header
//! plus `rowCount` generated rows through a delimited-text serializer.

pub mod engine;
pub mod errors;
pub mod faker;
pub mod generators;
pub mod model;
pub mod output;
pub mod row;

pub use engine::GenerationEngine;
pub use errors::GenerationError;
pub use faker::{FakerRegistry, ValueFaker};
pub use generators::{INVALID_STRING_CONSTRAINT, UNSUPPORTED_FIELD_TYPE, ValueGenerator};
pub use model::{CellStats, GenerateOptions, GenerationReport};
pub use output::CsvSerializer;
pub use row::{Row, RowBuilder};
