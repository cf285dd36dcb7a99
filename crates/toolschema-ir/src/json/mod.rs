//! JSON (Schema / OpenAPI style) input and output for the IR.

mod read;
mod write;

use crate::{Components, Document, Reason, Schema};
use serde_json::Value;

pub use read::reference_name;

/// Keyword writers shared with dialect emitters.
pub mod keywords {
    pub use super::write::{bounds, counts, meta};
}

/// Prefix for references into [`Components`] in the canonical JSON form.
pub const COMPONENTS_PREFIX: &str = "#/components/schemas/";

#[derive(Debug, thiserror::Error)]
#[error("{}", summarize(.reasons))]
pub struct ReadError {
    pub reasons: Vec<Reason>,
}

fn summarize(reasons: &[Reason]) -> String {
    match reasons {
        [] => "malformed schema".to_string(),
        [only] => only.to_string(),
        [first, rest @ ..] => format!("{first} (and {} more)", rest.len()),
    }
}

impl Schema {
    /// Reads a single schema; references are kept by name without resolution.
    pub fn from_json(value: &Value) -> Result<Schema, ReadError> {
        let mut reader = read::Reader::new();
        let schema = reader.schema(value, &crate::Accessor::input());
        reader.finish(schema)
    }

    pub fn to_json(&self) -> Value {
        write::schema(self, COMPONENTS_PREFIX)
    }

    /// JSON form with references under a caller-chosen prefix.
    pub fn to_json_with_prefix(&self, prefix: &str) -> Value {
        write::schema(self, prefix)
    }
}

impl Components {
    /// Reads a `{ "Name": schema, ... }` map.
    pub fn from_json(value: &Value) -> Result<Components, ReadError> {
        let mut reader = read::Reader::new();
        let components = reader.components(value);
        reader.finish(components)
    }

    pub fn to_json(&self) -> Value {
        Value::Object(
            self.iter()
                .map(|(name, schema)| (name.to_string(), schema.to_json()))
                .collect(),
        )
    }
}

impl Document {
    /// Reads either `{components: {schemas}, schema}` or a bare schema whose
    /// root `$defs` / `definitions` become the components.
    pub fn from_json(value: &Value) -> Result<Document, ReadError> {
        let mut reader = read::Reader::new();
        let document = reader.document(value);
        reader.finish(document)
    }

    pub fn to_json(&self) -> Value {
        serde_json::json!({
            "components": { "schemas": self.components.to_json() },
            "schema": self.schema.to_json(),
        })
    }
}

/// JSON-pointer reference for `name` under `prefix`.
pub fn reference_path(prefix: &str, name: &str) -> String {
    format!("{prefix}{}", name.replace('~', "~0").replace('/', "~1"))
}

/// Numbers with no fractional part are written as integers.
pub fn number_value(value: f64) -> Value {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 9.0e15 {
        Value::from(value as i64)
    } else {
        serde_json::Number::from_f64(value)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }
}
