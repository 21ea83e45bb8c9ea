use crate::error::{Error, Result};
use crate::schema::{Column, Metadata, Schema, Source};

/// Validate a schema document, normalizing constraints in place.
///
/// Validation is fail-fast: the first violation aborts with a single error.
/// This checks:
/// - explicit column orders are in range and unique
/// - every column has a label, a recognized source and valid constraints
/// - metadata row count and delimiter
pub fn validate_schema(schema: &mut Schema) -> Result<()> {
    validate_columns(&mut schema.columns)?;
    validate_metadata(&schema.metadata)?;
    Ok(())
}

/// Validate the column collection, including the explicit-order rules.
pub fn validate_columns(columns: &mut [Column]) -> Result<()> {
    let count = columns.len();
    let max_order = count as i64 - 1;
    let mut specified = vec![false; count];

    for (idx, column) in columns.iter_mut().enumerate() {
        if let Some(order) = column.order {
            if order < 0 || order > max_order {
                return Err(Error::InvalidSchema(format!(
                    "column {} order out of range ({order}); must be between 0 and {max_order}",
                    column.label
                )));
            }
            let slot = order as usize;
            if specified[slot] {
                return Err(Error::InvalidSchema(format!(
                    "column {} order duplicated ({order}); each order value must be unique",
                    column.label
                )));
            }
            specified[slot] = true;
        }

        let label = column.label.clone();
        validate_column(column).map_err(|err| err.context(format!("column {idx} - {label}")))?;
    }

    Ok(())
}

/// Validate a single column and normalize its constraints.
pub fn validate_column(column: &mut Column) -> Result<()> {
    if column.label.is_empty() {
        return Err(Error::InvalidSchema("label must be non-empty".to_string()));
    }

    if column.source_kind().is_none() {
        let supported: Vec<&str> = Source::ALL.iter().map(Source::as_str).collect();
        return Err(Error::InvalidSchema(format!(
            "unsupported source: {}; require one of [{}]",
            column.source,
            supported.join(", ")
        )));
    }

    if let Some(constraint) = column.constraint.as_mut() {
        constraint.validate()?;
    }

    if let Some(general) = column.general.as_mut() {
        general.validate()?;
    }

    Ok(())
}

/// Validate file-level metadata.
pub fn validate_metadata(metadata: &Metadata) -> Result<()> {
    if metadata.row_count <= 0 {
        return Err(Error::InvalidSchema(format!(
            "metadata rowCount invalid ({}): must be > 0",
            metadata.row_count
        )));
    }

    metadata.delimiter_byte()?;

    if metadata.multiple_files.enabled && metadata.multiple_files.file_count < 1 {
        return Err(Error::InvalidSchema(format!(
            "metadata multipleFiles fileCount invalid ({}): must be >= 1",
            metadata.multiple_files.file_count
        )));
    }

    Ok(())
}

impl Metadata {
    /// Resolve the configured delimiter to a single byte, defaulting to comma.
    pub fn delimiter_byte(&self) -> Result<u8> {
        match self.delimiter.as_bytes() {
            [] => Ok(b','),
            [byte] => Ok(*byte),
            _ => Err(Error::InvalidSchema(format!(
                "metadata delimiter ({}) must be a string of length 1",
                self.delimiter
            ))),
        }
    }

    /// Row count as an unsigned value; zero when the count is not positive.
    pub fn rows(&self) -> u64 {
        u64::try_from(self.row_count).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::{GeneralConstraint, NumericConstraint, StringConstraint, ValueConstraint};

    fn schema(columns: Vec<Column>) -> Schema {
        let mut schema = Schema::example();
        schema.columns = columns;
        schema
    }

    fn message(err: Error) -> String {
        match err {
            Error::InvalidSchema(message) => message,
            other => panic!("expected invalid schema, got {other:?}"),
        }
    }

    #[test]
    fn example_schema_is_valid() {
        let mut schema = Schema::example();
        validate_schema(&mut schema).expect("example validates");
    }

    #[test]
    fn validation_normalizes_numeric_constraints() {
        let mut schema = schema(vec![Column::new("n", Source::Integer).with_constraint(
            ValueConstraint::Numeric(NumericConstraint { min: 1.0, max: 5.0 }),
        )]);
        validate_schema(&mut schema).unwrap();
        assert_eq!(
            schema.columns[0].constraint,
            Some(ValueConstraint::Numeric(NumericConstraint { min: 5.0, max: 1.0 }))
        );
    }

    #[test]
    fn rejects_empty_label_with_context() {
        let mut schema = schema(vec![
            Column::new("ok", Source::Email),
            Column::new("", Source::Email),
        ]);
        let err = message(validate_schema(&mut schema).unwrap_err());
        assert_eq!(err, "column 1 - : label must be non-empty");
    }

    #[test]
    fn rejects_unknown_source() {
        let mut column = Column::new("beer", Source::BeerName);
        column.source = "BEER_ABV".to_string();
        let mut schema = schema(vec![column]);
        let err = message(validate_schema(&mut schema).unwrap_err());
        assert!(err.starts_with("column 0 - beer: unsupported source: BEER_ABV"), "{err}");
    }

    #[test]
    fn rejects_order_out_of_range() {
        let mut schema = schema(vec![
            Column::new("a", Source::Email).with_order(2),
            Column::new("b", Source::Email),
        ]);
        let err = message(validate_schema(&mut schema).unwrap_err());
        assert_eq!(err, "column a order out of range (2); must be between 0 and 1");

        let mut schema = self::schema(vec![Column::new("a", Source::Email).with_order(-1)]);
        assert!(validate_schema(&mut schema).is_err());
    }

    #[test]
    fn rejects_duplicate_order() {
        let mut schema = schema(vec![
            Column::new("a", Source::Email).with_order(0),
            Column::new("b", Source::Email).with_order(0),
        ]);
        let err = message(validate_schema(&mut schema).unwrap_err());
        assert_eq!(err, "column b order duplicated (0); each order value must be unique");
    }

    #[test]
    fn propagates_constraint_failures() {
        let mut schema = schema(vec![
            Column::new("s", Source::String)
                .with_constraint(ValueConstraint::String(StringConstraint::default())),
        ]);
        let err = message(validate_schema(&mut schema).unwrap_err());
        assert!(err.starts_with("column 0 - s: stringConstraint"), "{err}");

        let mut column = Column::new("g", Source::Uuid);
        column.general = Some(GeneralConstraint { skip_chance: -1.0 });
        let mut schema = self::schema(vec![column]);
        assert!(validate_schema(&mut schema).is_err());
    }

    #[test]
    fn constraint_on_other_source_is_still_validated() {
        let mut schema = schema(vec![
            Column::new("e", Source::Email)
                .with_constraint(ValueConstraint::String(StringConstraint::default())),
        ]);
        assert!(validate_schema(&mut schema).is_err());
    }

    #[test]
    fn rejects_non_positive_row_count() {
        for row_count in [0, -3] {
            let mut schema = Schema::example();
            schema.metadata.row_count = row_count;
            let err = validate_schema(&mut schema).unwrap_err();
            assert!(err.is_invalid_schema());
        }
    }

    #[test]
    fn resolves_delimiter() {
        let mut metadata = Schema::example().metadata;
        metadata.delimiter = String::new();
        assert_eq!(metadata.delimiter_byte().unwrap(), b',');
        metadata.delimiter = "|".to_string();
        assert_eq!(metadata.delimiter_byte().unwrap(), b'|');
        metadata.delimiter = "||".to_string();
        assert!(metadata.delimiter_byte().is_err());
        metadata.delimiter = "§".to_string();
        assert!(metadata.delimiter_byte().is_err());
    }

    #[test]
    fn multiple_files_requires_positive_count_when_enabled() {
        let mut schema = Schema::example();
        schema.metadata.multiple_files.file_count = 0;
        assert!(validate_schema(&mut schema).is_ok());
        schema.metadata.multiple_files.enabled = true;
        assert!(validate_schema(&mut schema).is_err());
    }
}
