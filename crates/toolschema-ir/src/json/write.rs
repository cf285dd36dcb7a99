//! IR to JSON writer (2020-12 / OpenAPI 3.1 vocabulary).

use super::{number_value, reference_path};
use crate::{AdditionalProperties, Bound, Meta, NumberSchema, Schema, SchemaKind};
use serde_json::{Map, Value, json};

pub(super) fn schema(schema: &Schema, prefix: &str) -> Value {
    let mut out = Map::new();
    body(&schema.kind, prefix, &mut out);
    meta(&schema.meta, &mut out);
    Value::Object(out)
}

pub fn meta(meta: &Meta, out: &mut Map<String, Value>) {
    if let Some(title) = &meta.title {
        out.insert("title".into(), json!(title));
    }
    if let Some(description) = &meta.description {
        out.insert("description".into(), json!(description));
    }
    if let Some(example) = &meta.example {
        out.insert("example".into(), example.clone());
    }
    if let Some(default) = &meta.default {
        out.insert("default".into(), default.clone());
    }
    if meta.deprecated {
        out.insert("deprecated".into(), json!(true));
    }
}

fn body(kind: &SchemaKind, prefix: &str, out: &mut Map<String, Value>) {
    match kind {
        SchemaKind::Unknown => {}
        SchemaKind::Null => {
            out.insert("type".into(), json!("null"));
        }
        SchemaKind::Boolean => {
            out.insert("type".into(), json!("boolean"));
        }
        SchemaKind::Integer(number) => {
            out.insert("type".into(), json!("integer"));
            bounds(number, out);
        }
        SchemaKind::Number(number) => {
            out.insert("type".into(), json!("number"));
            bounds(number, out);
        }
        SchemaKind::String(string) => {
            out.insert("type".into(), json!("string"));
            let fields = [
                ("format", &string.format),
                ("pattern", &string.pattern),
                ("contentMediaType", &string.content_media_type),
            ];
            for (key, value) in fields {
                if let Some(value) = value {
                    out.insert(key.into(), json!(value));
                }
            }
            if let Some(min) = string.min_length {
                out.insert("minLength".into(), json!(min));
            }
            if let Some(max) = string.max_length {
                out.insert("maxLength".into(), json!(max));
            }
        }
        SchemaKind::Array(array) => {
            out.insert("type".into(), json!("array"));
            out.insert("items".into(), schema(&array.items, prefix));
            counts(array.min_items, array.max_items, out);
            if array.unique_items {
                out.insert("uniqueItems".into(), json!(true));
            }
        }
        SchemaKind::Tuple(tuple) => {
            out.insert("type".into(), json!("array"));
            out.insert(
                "prefixItems".into(),
                Value::Array(
                    tuple
                        .prefix_items
                        .iter()
                        .map(|item| schema(item, prefix))
                        .collect(),
                ),
            );
            let rest = match &tuple.rest {
                Some(rest) => schema(rest, prefix),
                None => json!(false),
            };
            out.insert("items".into(), rest);
            counts(tuple.min_items, tuple.max_items, out);
        }
        SchemaKind::Object(object) => {
            out.insert("type".into(), json!("object"));
            if !object.properties.is_empty() {
                let properties = object
                    .properties
                    .iter()
                    .map(|(name, property)| (name.clone(), schema(property, prefix)))
                    .collect();
                out.insert("properties".into(), Value::Object(properties));
            }
            if !object.required.is_empty() {
                out.insert("required".into(), json!(object.required));
            }
            match &object.additional_properties {
                AdditionalProperties::Absent => {}
                AdditionalProperties::Forbidden => {
                    out.insert("additionalProperties".into(), json!(false));
                }
                AdditionalProperties::Allowed => {
                    out.insert("additionalProperties".into(), json!(true));
                }
                AdditionalProperties::Schema(additional) => {
                    out.insert("additionalProperties".into(), schema(additional, prefix));
                }
            }
        }
        SchemaKind::Reference(name) => {
            out.insert("$ref".into(), json!(reference_path(prefix, name)));
        }
        SchemaKind::OneOf(one_of) => {
            out.insert(
                "oneOf".into(),
                Value::Array(
                    one_of
                        .branches
                        .iter()
                        .map(|branch| schema(branch, prefix))
                        .collect(),
                ),
            );
            if let Some(discriminator) = &one_of.discriminator {
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
        SchemaKind::Constant(value) => {
            out.insert("const".into(), value.clone());
        }
    }
}

pub fn bounds(number: &NumberSchema, out: &mut Map<String, Value>) {
    let mut write = |bound: &Option<Bound>, inclusive: &str, exclusive: &str| {
        if let Some(bound) = bound {
            let key = if bound.exclusive { exclusive } else { inclusive };
            out.insert(key.into(), number_value(bound.value));
        }
    };
    write(&number.minimum, "minimum", "exclusiveMinimum");
    write(&number.maximum, "maximum", "exclusiveMaximum");
    if let Some(multiple_of) = number.multiple_of {
        out.insert("multipleOf".into(), number_value(multiple_of));
    }
}

pub fn counts(min: Option<u64>, max: Option<u64>, out: &mut Map<String, Value>) {
    if let Some(min) = min {
        out.insert("minItems".into(), json!(min));
    }
    if let Some(max) = max {
        out.insert("maxItems".into(), json!(max));
    }
}
