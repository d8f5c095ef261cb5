//! Input and output contracts for payroll documents.
//!
//! Both schemas are JSON Schema 2020-12. The defaults ship inside the binary;
//! [`SchemaSet::load`] swaps either one for a file on disk.
use jsonschema::{Draft, Validator};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const INPUT_SCHEMA_NAME: &str = "PayrollInputSchema";
pub const OUTPUT_SCHEMA_NAME: &str = "PayrollResultSchema";

const DEFAULT_INPUT_SCHEMA: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/schemas/payroll_input.schema.json"
));
const DEFAULT_OUTPUT_SCHEMA: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/schemas/payroll_result.schema.json"
));

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("read schema {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse schema {name}")]
    Parse {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("compile schema {name}: {message}")]
    Compile { name: String, message: String },

    #[error("validation against {schema} failed: {message} (path: {path})")]
    Invalid {
        schema: String,
        path: String,
        message: String,
    },
}

/// A compiled schema plus the name used in error messages.
pub struct NamedSchema {
    name: &'static str,
    document: Value,
    validator: Validator,
}

impl NamedSchema {
    fn compile(name: &'static str, document: Value) -> Result<Self, SchemaError> {
        let validator = jsonschema::options()
            .with_draft(Draft::Draft202012)
            .build(&document)
            .map_err(|err| SchemaError::Compile {
                name: name.to_string(),
                message: err.to_string(),
            })?;
        Ok(Self {
            name,
            document,
            validator,
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Raw schema document, as sent to the model for structured output.
    pub fn document(&self) -> &Value {
        &self.document
    }

    /// Check `instance`, reporting the first violation with the JSON pointer
    /// of the offending node.
    pub fn validate(&self, instance: &Value) -> Result<(), SchemaError> {
        let Some(err) = self.validator.iter_errors(instance).next() else {
            return Ok(());
        };
        let pointer = err.instance_path.to_string();
        Err(SchemaError::Invalid {
            schema: self.name.to_string(),
            path: if pointer.is_empty() {
                "/".to_string()
            } else {
                pointer
            },
            message: err.to_string(),
        })
    }
}

/// Input and output schemas for one client.
pub struct SchemaSet {
    pub input: NamedSchema,
    pub output: NamedSchema,
}

impl SchemaSet {
    /// Compile the embedded default schemas.
    pub fn embedded() -> Result<Self, SchemaError> {
        Self::load(None, None)
    }

    /// Compile schemas from the given files, falling back to the embedded
    /// defaults for any path not provided.
    pub fn load(input: Option<&Path>, output: Option<&Path>) -> Result<Self, SchemaError> {
        let input_doc = schema_document(INPUT_SCHEMA_NAME, input, DEFAULT_INPUT_SCHEMA)?;
        let output_doc = schema_document(OUTPUT_SCHEMA_NAME, output, DEFAULT_OUTPUT_SCHEMA)?;
        Ok(Self {
            input: NamedSchema::compile(INPUT_SCHEMA_NAME, input_doc)?,
            output: NamedSchema::compile(OUTPUT_SCHEMA_NAME, output_doc)?,
        })
    }
}

fn schema_document(
    name: &str,
    path: Option<&Path>,
    embedded: &str,
) -> Result<Value, SchemaError> {
    let text = match path {
        Some(path) => fs::read_to_string(path).map_err(|source| SchemaError::Read {
            path: path.to_path_buf(),
            source,
        })?,
        None => embedded.to_string(),
    };
    serde_json::from_str(&text).map_err(|source| SchemaError::Parse {
        name: name.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn embedded_schemas_compile() {
        let schemas = SchemaSet::embedded().expect("embedded schemas compile");
        assert_eq!(schemas.input.name(), INPUT_SCHEMA_NAME);
        assert_eq!(
            schemas.output.document()["additionalProperties"],
            json!(false)
        );
    }

    #[test]
    fn invalid_input_reports_path_and_message() {
        let schemas = SchemaSet::embedded().expect("embedded schemas compile");
        let err = schemas
            .input
            .validate(&json!({"period": {"year": "dos mil"}, "region_config": {}}))
            .expect_err("year must be numeric");
        match err {
            SchemaError::Invalid {
                schema,
                path,
                message,
            } => {
                assert_eq!(schema, INPUT_SCHEMA_NAME);
                assert_eq!(path, "/period/year");
                assert!(message.contains("dos mil"), "{message}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn root_violation_uses_slash_path() {
        let schemas = SchemaSet::embedded().expect("embedded schemas compile");
        let err = schemas
            .input
            .validate(&json!([1, 2]))
            .expect_err("root must be an object");
        assert!(err.to_string().contains("(path: /)"), "{err}");
    }

    #[test]
    fn schema_file_overrides_embedded_default() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("input.json");
        fs::write(&path, r#"{"type": "object", "required": ["x"]}"#).expect("write schema");
        let schemas = SchemaSet::load(Some(&path), None).expect("schemas compile");
        assert!(schemas.input.validate(&json!({"x": 1})).is_ok());
        assert!(schemas.input.validate(&json!({})).is_err());
    }

    #[test]
    fn unreadable_schema_file_is_reported() {
        let err = SchemaSet::load(Some(Path::new("/nonexistent/schema.json")), None)
            .err()
            .expect("missing file");
        assert!(matches!(err, SchemaError::Read { .. }));
    }
}
