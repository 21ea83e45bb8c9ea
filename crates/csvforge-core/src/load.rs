use std::fs;
use std::path::Path;

use crate::error::Result;
use crate::schema::Schema;

/// Decode a schema document from YAML text.
pub fn schema_from_yaml(contents: &str) -> Result<Schema> {
    Ok(serde_yaml::from_str(contents)?)
}

/// Read and decode a schema file. The schema is not validated.
pub fn load_schema(path: &Path) -> Result<Schema> {
    let contents = fs::read_to_string(path)?;
    schema_from_yaml(&contents)
}

/// Encode a schema as YAML text.
pub fn schema_to_yaml(schema: &Schema) -> Result<String> {
    Ok(serde_yaml::to_string(schema)?)
}

/// Write a schema file, creating parent directories as needed.
pub fn save_schema(path: &Path, schema: &Schema) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, schema_to_yaml(schema)?)?;
    Ok(())
}
