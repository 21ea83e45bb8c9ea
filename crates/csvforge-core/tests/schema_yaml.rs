use std::path::Path;

use chrono::{TimeZone, Utc};
use csvforge_core::{
    Schema, Source, ValueConstraint, load_schema, resolve_order, schema_from_yaml,
    schema_to_yaml, validate_schema,
};

#[test]
fn example_file_matches_builtin_example() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../schemas/schema.example.yaml");
    let schema = load_schema(&path).expect("load example schema");
    assert_eq!(schema, Schema::example());
}

#[test]
fn example_round_trips_through_yaml() {
    let schema = Schema::example();
    let yaml = schema_to_yaml(&schema).expect("encode yaml");
    let decoded = schema_from_yaml(&yaml).expect("decode yaml");
    assert_eq!(decoded, schema);
}

#[test]
fn decodes_columns_and_constraints() {
    let yaml = r#"
columns:
  - label: Born
    source: TIMESTAMP
    timestampConstraint:
      after: 2000-01-01T00:00:00Z
      before: 2001-01-01T00:00:00Z
      format: "%d/%m/%Y"
  - label: Code
    source: STRING
    order: 0
    stringConstraint:
      regex: "[A-Z]{3}-[0-9]{2}"
    generalConstraint:
      skipChance: 0.1
metadata:
  delimiter: ";"
  rowCount: 25
"#;
    let schema = schema_from_yaml(yaml).expect("decode");
    assert_eq!(schema.columns.len(), 2);

    let born = &schema.columns[0];
    assert_eq!(born.source_kind(), Some(Source::Timestamp));
    let Some(ValueConstraint::Timestamp(ts)) = &born.constraint else {
        panic!("expected timestamp constraint");
    };
    assert_eq!(ts.start, Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).single());
    assert_eq!(ts.format, "%d/%m/%Y");

    let code = &schema.columns[1];
    assert_eq!(code.order, Some(0));
    assert_eq!(code.general.map(|g| g.skip_chance), Some(0.1));

    assert_eq!(schema.metadata.delimiter_byte().unwrap(), b';');
    assert_eq!(schema.metadata.row_count, 25);
    assert!(!schema.metadata.multiple_files.enabled);
}

#[test]
fn unknown_source_decodes_but_fails_validation() {
    let yaml = r#"
columns:
  - label: Mystery
    source: NOT_A_SOURCE
metadata:
  rowCount: 1
"#;
    let mut schema = schema_from_yaml(yaml).expect("decode");
    let err = validate_schema(&mut schema).unwrap_err();
    assert!(err.is_invalid_schema());
    assert!(err.to_string().contains("NOT_A_SOURCE"), "{err}");
}

#[test]
fn two_value_constraints_fail_to_decode() {
    let yaml = r#"
columns:
  - label: Both
    source: INTEGER
    numericConstraint: { min: 1, max: 2 }
    stringConstraint: { oneOf: [a] }
metadata:
  rowCount: 1
"#;
    let err = schema_from_yaml(yaml).unwrap_err();
    assert!(!err.is_invalid_schema());
    assert!(err.to_string().contains("more than one value constraint"), "{err}");
}

#[test]
fn missing_row_count_fails_validation() {
    let yaml = r#"
columns:
  - label: Email
    source: EMAIL
"#;
    let mut schema = schema_from_yaml(yaml).expect("decode");
    assert_eq!(schema.metadata.row_count, 0);
    assert!(validate_schema(&mut schema).is_err());
}

#[test]
fn validated_example_resolves_header() {
    let mut schema = Schema::example();
    validate_schema(&mut schema).expect("valid");
    let ordering = resolve_order(&schema.columns).expect("resolve");
    assert_eq!(
        ordering.labels(),
        vec![
            "Group",
            "First Name",
            "Last Name",
            "Relationship",
            "Date of Birth",
            "Potentially Empty Field",
        ]
    );
}
