use std::fmt;
use std::str::FromStr;

use chrono::{TimeZone, Utc};
use schemars::JsonSchema;
use schemars::r#gen::SchemaGenerator;
use schemars::schema::Schema as JsonSchemaObject;
use serde::{Deserialize, Serialize};

use crate::constraints::{
    GeneralConstraint, NumericConstraint, StringConstraint, TimestampConstraint, ValueConstraint,
};

/// Top-level schema document describing one generated CSV file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Schema {
    /// Columns in document order.
    pub columns: Vec<Column>,
    /// Delimiter, row count and file settings.
    #[serde(default)]
    pub metadata: Metadata,
}

/// Kind of synthetic value a column produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Source {
    FirstName,
    LastName,
    Email,
    Uuid,
    Timestamp,
    Integer,
    String,
    Bool,
    Company,
    Phone,
    Street,
    City,
    State,
    Zip,
    Country,
    Month,
    BeerName,
    BeerStyle,
    YesNo,
}

impl Source {
    pub const ALL: &'static [Source] = &[
        Source::FirstName,
        Source::LastName,
        Source::Email,
        Source::Uuid,
        Source::Timestamp,
        Source::Integer,
        Source::String,
        Source::Bool,
        Source::Company,
        Source::Phone,
        Source::Street,
        Source::City,
        Source::State,
        Source::Zip,
        Source::Country,
        Source::Month,
        Source::BeerName,
        Source::BeerStyle,
        Source::YesNo,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Source::FirstName => "FIRST_NAME",
            Source::LastName => "LAST_NAME",
            Source::Email => "EMAIL",
            Source::Uuid => "UUID",
            Source::Timestamp => "TIMESTAMP",
            Source::Integer => "INTEGER",
            Source::String => "STRING",
            Source::Bool => "BOOL",
            Source::Company => "COMPANY",
            Source::Phone => "PHONE",
            Source::Street => "STREET",
            Source::City => "CITY",
            Source::State => "STATE",
            Source::Zip => "ZIP",
            Source::Country => "COUNTRY",
            Source::Month => "MONTH",
            Source::BeerName => "BEER_NAME",
            Source::BeerStyle => "BEER_STYLE",
            Source::YesNo => "YES_NO",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Source {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Source::ALL
            .iter()
            .copied()
            .find(|source| source.as_str() == value)
            .ok_or_else(|| format!("unsupported source: {value}"))
    }
}

/// A single output column.
///
/// `source` keeps the raw tag from the document so an unknown tag surfaces as
/// a validation failure rather than a decoding failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ColumnSpec", into = "ColumnSpec")]
pub struct Column {
    pub label: String,
    pub source: String,
    /// Explicit 0-based position; filled in for every column by order resolution.
    pub order: Option<i64>,
    pub constraint: Option<ValueConstraint>,
    pub general: Option<GeneralConstraint>,
}

impl Column {
    pub fn new(label: impl Into<String>, source: Source) -> Self {
        Self {
            label: label.into(),
            source: source.as_str().to_string(),
            order: None,
            constraint: None,
            general: None,
        }
    }

    pub fn with_order(mut self, order: i64) -> Self {
        self.order = Some(order);
        self
    }

    pub fn with_constraint(mut self, constraint: ValueConstraint) -> Self {
        self.constraint = Some(constraint);
        self
    }

    pub fn with_skip_chance(mut self, skip_chance: f64) -> Self {
        self.general = Some(GeneralConstraint { skip_chance });
        self
    }

    /// Parsed source kind, `None` for an unrecognized tag.
    pub fn source_kind(&self) -> Option<Source> {
        self.source.parse().ok()
    }
}

/// Document form of a [`Column`], one optional key per constraint kind.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ColumnSpec {
    pub label: String,
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub numeric_constraint: Option<NumericConstraint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub string_constraint: Option<StringConstraint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp_constraint: Option<TimestampConstraint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub general_constraint: Option<GeneralConstraint>,
}

impl TryFrom<ColumnSpec> for Column {
    type Error = String;

    fn try_from(spec: ColumnSpec) -> Result<Self, Self::Error> {
        let mut constraints = Vec::with_capacity(1);
        if let Some(constraint) = spec.numeric_constraint {
            constraints.push(ValueConstraint::Numeric(constraint));
        }
        if let Some(constraint) = spec.string_constraint {
            constraints.push(ValueConstraint::String(constraint));
        }
        if let Some(constraint) = spec.timestamp_constraint {
            constraints.push(ValueConstraint::Timestamp(constraint));
        }
        if constraints.len() > 1 {
            let keys: Vec<&str> = constraints.iter().map(ValueConstraint::key).collect();
            return Err(format!(
                "column '{}' defines more than one value constraint ({})",
                spec.label,
                keys.join(", ")
            ));
        }

        Ok(Column {
            label: spec.label,
            source: spec.source,
            order: spec.order,
            constraint: constraints.pop(),
            general: spec.general_constraint,
        })
    }
}

impl From<Column> for ColumnSpec {
    fn from(column: Column) -> Self {
        let mut spec = ColumnSpec {
            label: column.label,
            source: column.source,
            order: column.order,
            general_constraint: column.general,
            ..ColumnSpec::default()
        };
        match column.constraint {
            Some(ValueConstraint::Numeric(constraint)) => spec.numeric_constraint = Some(constraint),
            Some(ValueConstraint::String(constraint)) => spec.string_constraint = Some(constraint),
            Some(ValueConstraint::Timestamp(constraint)) => {
                spec.timestamp_constraint = Some(constraint)
            }
            None => {}
        }
        spec
    }
}

impl JsonSchema for Column {
    fn schema_name() -> String {
        "Column".to_string()
    }

    fn json_schema(generator: &mut SchemaGenerator) -> JsonSchemaObject {
        ColumnSpec::json_schema(generator)
    }
}

/// File-level settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    /// Single-byte field delimiter; empty means comma.
    #[serde(default)]
    pub delimiter: String,
    /// Number of data rows to generate.
    #[serde(default)]
    pub row_count: i64,
    #[serde(default)]
    pub multiple_files: MultipleFiles,
}

impl Default for Metadata {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER.to_string(),
            row_count: 0,
            multiple_files: MultipleFiles::default(),
        }
    }
}

pub const DEFAULT_DELIMITER: &str = ",";

/// Split output settings. Parsed and validated; generation writes one stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MultipleFiles {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_file_count")]
    pub file_count: i64,
}

impl Default for MultipleFiles {
    fn default() -> Self {
        Self {
            enabled: false,
            file_count: default_file_count(),
        }
    }
}

fn default_file_count() -> i64 {
    1
}

impl Schema {
    /// Built-in example covering every constraint kind.
    pub fn example() -> Self {
        let min_dob = Utc.with_ymd_and_hms(1930, 1, 1, 0, 0, 0).single();
        let max_dob = Utc.with_ymd_and_hms(2005, 12, 31, 0, 0, 0).single();

        Schema {
            columns: vec![
                Column::new("First Name", Source::FirstName).with_order(1),
                Column::new("Last Name", Source::LastName).with_order(2),
                Column::new("Group", Source::Integer)
                    .with_order(0)
                    .with_constraint(ValueConstraint::Numeric(NumericConstraint {
                        min: 1.0,
                        max: 9.0,
                    })),
                Column::new("Relationship", Source::String).with_constraint(
                    ValueConstraint::String(StringConstraint {
                        regex: None,
                        one_of: vec![
                            "EMPLOYEE".to_string(),
                            "SPOUSE".to_string(),
                            "DEPENDENT".to_string(),
                        ],
                    }),
                ),
                Column::new("Date of Birth", Source::Timestamp).with_constraint(
                    ValueConstraint::Timestamp(TimestampConstraint {
                        start: min_dob,
                        end: max_dob,
                        format: "%Y-%m-%d".to_string(),
                    }),
                ),
                Column::new("Potentially Empty Field", Source::Uuid).with_skip_chance(0.5),
            ],
            metadata: Metadata {
                delimiter: DEFAULT_DELIMITER.to_string(),
                row_count: 10,
                multiple_files: MultipleFiles::default(),
            },
        }
    }
}
