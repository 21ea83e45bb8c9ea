use std::collections::HashMap;

use rand::RngCore;

use csvforge_core::{Column, Error as SchemaError, GeneralConstraint, Source, ValueConstraint};

use crate::errors::GenerationError;
use crate::generators::ValueGenerator;

/// One generated record, keyed by column label.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    values: HashMap<String, String>,
}

impl Row {
    pub fn get(&self, label: &str) -> Option<&str> {
        self.values.get(label).map(String::as_str)
    }

    pub fn insert(&mut self, label: impl Into<String>, value: impl Into<String>) {
        self.values.insert(label.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

struct ColumnPlan<'a> {
    label: &'a str,
    source: Source,
    constraint: Option<&'a ValueConstraint>,
    general: Option<&'a GeneralConstraint>,
}

/// Builds rows for a fixed set of columns.
pub struct RowBuilder<'a> {
    columns: Vec<ColumnPlan<'a>>,
}

impl<'a> RowBuilder<'a> {
    /// Fails when a column carries a source tag the generator does not know.
    pub fn new(columns: &'a [Column]) -> Result<Self, GenerationError> {
        let columns = columns
            .iter()
            .map(|column| -> Result<ColumnPlan<'a>, GenerationError> {
                let source = column.source_kind().ok_or_else(|| {
                    SchemaError::InvalidSchema(format!(
                        "column {}: unsupported source: {}",
                        column.label, column.source
                    ))
                })?;
                Ok(ColumnPlan {
                    label: column.label.as_str(),
                    source,
                    constraint: column.constraint.as_ref(),
                    general: column.general.as_ref(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { columns })
    }

    /// One value per column; nothing is shared between cells or rows.
    pub fn build_row(&self, generator: &mut ValueGenerator, rng: &mut dyn RngCore) -> Row {
        let mut row = Row::default();
        for column in &self.columns {
            let value = generator.generate(column.source, column.constraint, column.general, rng);
            row.insert(column.label, value);
        }
        row
    }
}
