//! Core contracts for csvforge.
//!
//! This crate defines the schema document model, constraint and schema
//! validation, and the column order resolution shared by the generator and
//! the CLI.

pub mod constraints;
pub mod error;
pub mod load;
pub mod ordering;
pub mod schema;
pub mod validation;

pub use constraints::{
    GeneralConstraint, NumericConstraint, StringConstraint, TimestampConstraint, ValueConstraint,
};
pub use error::{Error, Result};
pub use load::{load_schema, save_schema, schema_from_yaml, schema_to_yaml};
pub use ordering::{ResolvedOrdering, resolve_order};
pub use schema::{Column, ColumnSpec, DEFAULT_DELIMITER, Metadata, MultipleFiles, Schema, Source};
pub use validation::{validate_column, validate_columns, validate_metadata, validate_schema};
