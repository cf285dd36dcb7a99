//! Dialect schema to JSON.

use super::{DefsLocation, Dialect, DialectDocument, DialectKind, DialectSchema};
use serde_json::{Map, Value, json};
use toolschema_ir::json::keywords;
use toolschema_ir::{AdditionalProperties, reference_path};

impl DialectSchema {
    pub fn to_json(&self, dialect: &Dialect) -> Value {
        let mut out = Map::new();
        self.write(dialect, &mut out);
        Value::Object(out)
    }

    fn write(&self, dialect: &Dialect, out: &mut Map<String, Value>) {
        let child = |schema: &DialectSchema| schema.to_json(dialect);

        match &self.kind {
            DialectKind::Unknown => {}
            DialectKind::Null => {
                out.insert("type".into(), json!("null"));
            }
            DialectKind::Boolean => {
                out.insert("type".into(), json!("boolean"));
            }
            DialectKind::Integer(number) => {
                out.insert("type".into(), json!("integer"));
                keywords::bounds(number, out);
            }
            DialectKind::Number(number) => {
                out.insert("type".into(), json!("number"));
                keywords::bounds(number, out);
            }
            DialectKind::String(string) => {
                out.insert("type".into(), json!("string"));
                if let Some(format) = &string.format {
                    out.insert("format".into(), json!(format));
                }
                if let Some(pattern) = &string.pattern {
                    out.insert("pattern".into(), json!(pattern));
                }
                if let Some(min) = string.min_length {
                    out.insert("minLength".into(), json!(min));
                }
                if let Some(max) = string.max_length {
                    out.insert("maxLength".into(), json!(max));
                }
                if let Some(media_type) = &string.content_media_type {
                    out.insert("contentMediaType".into(), json!(media_type));
                }
            }
            DialectKind::Enum(e) => {
                out.insert("type".into(), json!(e.primitive.type_name()));
                out.insert("enum".into(), Value::Array(e.values.clone()));
            }
            DialectKind::Constant(value) => {
                out.insert("const".into(), value.clone());
            }
            DialectKind::Array(array) => {
                out.insert("type".into(), json!("array"));
                out.insert("items".into(), child(&array.items));
                keywords::counts(array.min_items, array.max_items, out);
                if array.unique_items {
                    out.insert("uniqueItems".into(), json!(true));
                }
            }
            DialectKind::Tuple(tuple) => {
                out.insert("type".into(), json!("array"));
                out.insert(
                    "prefixItems".into(),
                    Value::Array(tuple.prefix_items.iter().map(child).collect()),
                );
                let rest = match &tuple.rest {
                    Some(rest) => child(rest),
                    None => json!(false),
                };
                out.insert("items".into(), rest);
                keywords::counts(tuple.min_items, tuple.max_items, out);
            }
            DialectKind::Object(object) => {
                out.insert("type".into(), json!("object"));
                let properties: Map<String, Value> = object
                    .properties
                    .iter()
                    .map(|(name, property)| (name.clone(), child(property)))
                    .collect();
                out.insert("properties".into(), Value::Object(properties));
                out.insert("required".into(), json!(object.required));
                match &object.additional_properties {
                    AdditionalProperties::Absent => {}
                    AdditionalProperties::Forbidden => {
                        out.insert("additionalProperties".into(), json!(false));
                    }
                    AdditionalProperties::Allowed => {
                        out.insert("additionalProperties".into(), json!(true));
                    }
                    AdditionalProperties::Schema(additional) => {
                        out.insert("additionalProperties".into(), child(additional));
                    }
                }
            }
            DialectKind::Reference(name) => {
                let prefix = dialect.defs_location.ref_prefix();
                out.insert("$ref".into(), json!(reference_path(prefix, name)));
            }
            DialectKind::Union(union) => {
                out.insert(
                    dialect.unions.keyword().into(),
                    Value::Array(union.branches.iter().map(child).collect()),
                );
                if let Some(discriminator) = &union.discriminator {
                    let prefix = dialect.defs_location.ref_prefix();
                    let mut value = json!({ "propertyName": discriminator.property_name });
                    if !discriminator.mapping.is_empty() {
                        let mapping: Map<String, Value> = discriminator
                            .mapping
                            .iter()
                            .map(|(tag, name)| (tag.clone(), json!(reference_path(prefix, name))))
                            .collect();
                        value["mapping"] = Value::Object(mapping);
                    }
                    out.insert("discriminator".into(), value);
                }
            }
        }

        if self.nullable {
            out.insert("nullable".into(), json!(true));
        }
        keywords::meta(&self.meta, out);
    }
}

impl DialectDocument {
    /// The document in the dialect's own layout.
    ///
    /// LLM dialects put definitions in `$defs` beside the root schema; OpenAPI
    /// dialects produce `{components: {schemas}, schema}`.
    pub fn to_json(&self, dialect: &Dialect) -> Value {
        let defs: Map<String, Value> = self
            .defs
            .iter()
            .map(|(name, schema)| (name.clone(), schema.to_json(dialect)))
            .collect();
        let mut schema = self.schema.to_json(dialect);

        match dialect.defs_location {
            DefsLocation::Defs => {
                if !defs.is_empty() {
                    if let Value::Object(root) = &mut schema {
                        root.insert("$defs".into(), Value::Object(defs));
                    }
                }
                schema
            }
            DefsLocation::Components => json!({
                "components": { "schemas": defs },
                "schema": schema,
            }),
        }
    }
}
