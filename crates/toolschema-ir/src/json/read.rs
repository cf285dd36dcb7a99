//! JSON to IR reader.
//!
//! Every problem is recorded and reading continues, so one pass reports all
//! malformed locations.

use super::ReadError;
use crate::{
    Accessor, AdditionalProperties, ArraySchema, Bound, Components, Diagnostics, Discriminator,
    Document, Meta, NumberSchema, ObjectSchema, OneOfSchema, Schema, SchemaKind, StringSchema,
    TupleSchema,
};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};

const REFERENCE_PREFIXES: &[&str] = &["#/components/schemas/", "#/$defs/", "#/definitions/"];

/// Name a local reference points at, if it is one this reader understands.
pub fn reference_name(reference: &str) -> Option<String> {
    let raw = REFERENCE_PREFIXES
        .iter()
        .find_map(|prefix| reference.strip_prefix(prefix))?;
    if raw.is_empty() || raw.contains('/') {
        return None;
    }
    Some(raw.replace("~1", "/").replace("~0", "~"))
}

pub(super) struct Reader {
    diagnostics: Diagnostics,
}

impl Reader {
    pub(super) fn new() -> Self {
        Self {
            diagnostics: Diagnostics::new(),
        }
    }

    pub(super) fn finish<T>(self, value: T) -> Result<T, ReadError> {
        if self.diagnostics.is_empty() {
            Ok(value)
        } else {
            Err(ReadError {
                reasons: self.diagnostics.into_reasons(),
            })
        }
    }

    pub(super) fn document(&mut self, value: &Value) -> Document {
        let Some(object) = value.as_object() else {
            self.diagnostics
                .malformed(&Accessor::input(), "document must be a JSON object");
            return Document::new(Schema::unknown(), Components::new());
        };

        if object.contains_key("schema") || object.contains_key("components") {
            let components = match object.get("components") {
                Some(components) => match components.get("schemas") {
                    Some(schemas) => self.components(schemas),
                    None => Components::new(),
                },
                None => Components::new(),
            };
            let schema = match object.get("schema") {
                Some(schema) => self.schema(schema, &Accessor::input()),
                None => {
                    self.diagnostics
                        .malformed(&Accessor::input(), "document has no \"schema\"");
                    Schema::unknown()
                }
            };
            return Document::new(schema, components);
        }

        let mut components = Components::new();
        for key in ["$defs", "definitions"] {
            if let Some(defs) = object.get(key) {
                let read = self.components(defs);
                components.schemas.extend(read.schemas);
            }
        }
        let schema = self.schema(value, &Accessor::input());
        Document::new(schema, components)
    }

    pub(super) fn components(&mut self, value: &Value) -> Components {
        let mut components = Components::new();
        let Some(object) = value.as_object() else {
            self.diagnostics
                .malformed(&Accessor::input(), "component schemas must be a JSON object");
            return components;
        };
        for (name, schema) in object {
            let schema = self.schema(schema, &Accessor::definition(name));
            components.insert(name.clone(), schema);
        }
        components
    }

    pub(super) fn schema(&mut self, value: &Value, at: &Accessor) -> Schema {
        let object = match value {
            Value::Object(object) => object,
            Value::Bool(true) => return Schema::unknown(),
            Value::Bool(false) => {
                self.diagnostics
                    .malformed(at, "the false schema accepts no value");
                return Schema::unknown();
            }
            other => {
                self.diagnostics.malformed(
                    at,
                    format!("expected a schema object, found {}", json_type(other)),
                );
                return Schema::unknown();
            }
        };

        let meta = self.meta(object, at);
        let schema = self.body(object, at);

        let schema = Schema {
            meta: meta.or(&schema.meta),
            kind: schema.kind,
        };

        if object.get("nullable").and_then(Value::as_bool) == Some(true) && !schema.is_null() {
            schema.nullable()
        } else {
            schema
        }
    }

    fn meta(&mut self, object: &Map<String, Value>, at: &Accessor) -> Meta {
        Meta {
            title: self.string_field(object, "title", at),
            description: self.string_field(object, "description", at),
            example: object.get("example").cloned().or_else(|| {
                object
                    .get("examples")
                    .and_then(Value::as_array)
                    .and_then(|examples| examples.first().cloned())
            }),
            default: object.get("default").cloned(),
            deprecated: object
                .get("deprecated")
                .and_then(Value::as_bool)
                .unwrap_or(false),
        }
    }

    /// The node without its own annotations.
    fn body(&mut self, object: &Map<String, Value>, at: &Accessor) -> Schema {
        if let Some(reference) = object.get("$ref") {
            return match reference.as_str().and_then(reference_name) {
                Some(name) => Schema::reference(name),
                None => {
                    self.diagnostics
                        .malformed(at, format!("unsupported reference {reference}"));
                    Schema::unknown()
                }
            };
        }

        if let Some(value) = object.get("const") {
            return Schema::constant(value.clone());
        }

        if let Some(values) = object.get("enum") {
            return match values.as_array().map(Vec::as_slice) {
                Some([only]) => Schema::constant(only.clone()),
                Some([]) | None => {
                    self.diagnostics
                        .malformed(at, "enum must be a non-empty array");
                    Schema::unknown()
                }
                Some(values) => {
                    Schema::one_of(values.iter().cloned().map(Schema::constant).collect())
                }
            };
        }

        if let Some(branches) = object.get("oneOf").or_else(|| object.get("anyOf")) {
            return self.one_of(object, branches, at);
        }

        if let Some(all_of) = object.get("allOf") {
            return match all_of.as_array().map(Vec::as_slice) {
                Some([only]) => self.schema(only, at),
                _ => {
                    self.diagnostics
                        .malformed(at, "allOf is only supported with a single schema");
                    Schema::unknown()
                }
            };
        }

        match object.get("type") {
            Some(Value::String(name)) => self.typed(object, name, at),
            Some(Value::Array(names)) => {
                let mut branches = Vec::new();
                let mut nullable = false;
                for name in names {
                    match name.as_str() {
                        Some("null") => nullable = true,
                        Some(name) => branches.push(self.typed(object, name, at)),
                        None => self
                            .diagnostics
                            .malformed(at, format!("invalid type name {name}")),
                    }
                }
                if nullable {
                    branches.push(Schema::null());
                }
                match branches.len() {
                    0 => {
                        self.diagnostics.malformed(at, "type array is empty");
                        Schema::unknown()
                    }
                    1 => branches.remove(0),
                    _ => Schema::one_of(branches),
                }
            }
            Some(other) => {
                self.diagnostics
                    .malformed(at, format!("invalid type {other}"));
                Schema::unknown()
            }
            None => {
                if ["properties", "additionalProperties", "required"]
                    .iter()
                    .any(|key| object.contains_key(*key))
                {
                    self.typed(object, "object", at)
                } else if ["items", "prefixItems"]
                    .iter()
                    .any(|key| object.contains_key(*key))
                {
                    self.typed(object, "array", at)
                } else {
                    Schema::unknown()
                }
            }
        }
    }

    fn typed(&mut self, object: &Map<String, Value>, name: &str, at: &Accessor) -> Schema {
        let kind = match name {
            "null" => SchemaKind::Null,
            "boolean" => SchemaKind::Boolean,
            "integer" => SchemaKind::Integer(self.number(object, at)),
            "number" => SchemaKind::Number(self.number(object, at)),
            "string" => SchemaKind::String(StringSchema {
                format: self.string_field(object, "format", at),
                pattern: self.string_field(object, "pattern", at),
                min_length: self.count(object, "minLength", at),
                max_length: self.count(object, "maxLength", at),
                content_media_type: self.string_field(object, "contentMediaType", at),
            }),
            "array" => self.array(object, at),
            "object" => SchemaKind::Object(self.object(object, at)),
            other => {
                self.diagnostics
                    .malformed(at, format!("unknown type \"{other}\""));
                SchemaKind::Unknown
            }
        };
        Schema::new(kind)
    }

    fn number(&mut self, object: &Map<String, Value>, at: &Accessor) -> NumberSchema {
        let mut minimum = self.float(object, "minimum", at).map(Bound::inclusive);
        let mut maximum = self.float(object, "maximum", at).map(Bound::inclusive);

        match object.get("exclusiveMinimum") {
            Some(Value::Bool(true)) => match minimum.as_mut() {
                Some(bound) => bound.exclusive = true,
                None => self
                    .diagnostics
                    .malformed(at, "exclusiveMinimum: true without minimum"),
            },
            Some(Value::Number(n)) => minimum = n.as_f64().map(Bound::exclusive),
            Some(Value::Bool(false)) | None => {}
            Some(other) => self
                .diagnostics
                .malformed(at, format!("invalid exclusiveMinimum {other}")),
        }
        match object.get("exclusiveMaximum") {
            Some(Value::Bool(true)) => match maximum.as_mut() {
                Some(bound) => bound.exclusive = true,
                None => self
                    .diagnostics
                    .malformed(at, "exclusiveMaximum: true without maximum"),
            },
            Some(Value::Number(n)) => maximum = n.as_f64().map(Bound::exclusive),
            Some(Value::Bool(false)) | None => {}
            Some(other) => self
                .diagnostics
                .malformed(at, format!("invalid exclusiveMaximum {other}")),
        }

        NumberSchema {
            minimum,
            maximum,
            multiple_of: self.float(object, "multipleOf", at),
        }
    }

    fn array(&mut self, object: &Map<String, Value>, at: &Accessor) -> SchemaKind {
        let min_items = self.count(object, "minItems", at);
        let max_items = self.count(object, "maxItems", at);

        let prefix = match object.get("prefixItems") {
            Some(Value::Array(prefix)) => Some((prefix, object.get("items"))),
            Some(other) => {
                self.diagnostics
                    .malformed(at, format!("prefixItems must be an array, found {other}"));
                None
            }
            None => match object.get("items") {
                Some(Value::Array(prefix)) => Some((prefix, object.get("additionalItems"))),
                _ => None,
            },
        };

        if let Some((prefix, rest)) = prefix {
            let prefix_items = prefix
                .iter()
                .enumerate()
                .map(|(index, item)| self.schema(item, &at.prefix_item(index)))
                .collect();
            let rest = match rest {
                None | Some(Value::Bool(false)) => None,
                Some(rest) => Some(Box::new(self.schema(rest, &at.items()))),
            };
            return SchemaKind::Tuple(TupleSchema {
                prefix_items,
                rest,
                min_items,
                max_items,
            });
        }

        let items = match object.get("items") {
            Some(items) => self.schema(items, &at.items()),
            None => Schema::unknown(),
        };
        SchemaKind::Array(ArraySchema {
            items: Box::new(items),
            min_items,
            max_items,
            unique_items: object
                .get("uniqueItems")
                .and_then(Value::as_bool)
                .unwrap_or(false),
        })
    }

    fn object(&mut self, object: &Map<String, Value>, at: &Accessor) -> ObjectSchema {
        let mut properties = BTreeMap::new();
        match object.get("properties") {
            Some(Value::Object(props)) => {
                for (name, schema) in props {
                    properties.insert(name.clone(), self.schema(schema, &at.property(name)));
                }
            }
            Some(other) => self
                .diagnostics
                .malformed(at, format!("properties must be an object, found {other}")),
            None => {}
        }

        let mut required = BTreeSet::new();
        match object.get("required") {
            Some(Value::Array(names)) => {
                for name in names {
                    match name.as_str() {
                        Some(name) => {
                            required.insert(name.to_string());
                        }
                        None => self
                            .diagnostics
                            .malformed(at, format!("invalid required entry {name}")),
                    }
                }
            }
            // OpenAPI 3.0 readers sometimes see `required: true` on a property.
            Some(Value::Bool(_)) | None => {}
            Some(other) => self
                .diagnostics
                .malformed(at, format!("required must be an array, found {other}")),
        }

        let additional_properties = match object.get("additionalProperties") {
            None => AdditionalProperties::Absent,
            Some(Value::Bool(false)) => AdditionalProperties::Forbidden,
            Some(Value::Bool(true)) => AdditionalProperties::Allowed,
            Some(schema) => AdditionalProperties::Schema(Box::new(
                self.schema(schema, &at.additional_properties()),
            )),
        };

        ObjectSchema {
            properties,
            required,
            additional_properties,
        }
    }

    fn one_of(&mut self, object: &Map<String, Value>, branches: &Value, at: &Accessor) -> Schema {
        let Some(branches) = branches.as_array() else {
            self.diagnostics
                .malformed(at, "oneOf / anyOf must be an array");
            return Schema::unknown();
        };
        let branches = branches
            .iter()
            .enumerate()
            .map(|(index, branch)| self.schema(branch, &at.branch(index)))
            .collect();

        let discriminator = object
            .get("discriminator")
            .and_then(|value| self.discriminator(value, at));

        Schema::new(SchemaKind::OneOf(OneOfSchema {
            branches,
            discriminator,
        }))
    }

    fn discriminator(&mut self, value: &Value, at: &Accessor) -> Option<Discriminator> {
        let Some(property_name) = value.get("propertyName").and_then(Value::as_str) else {
            self.diagnostics
                .malformed(at, "discriminator has no propertyName");
            return None;
        };
        let mut mapping = BTreeMap::new();
        if let Some(entries) = value.get("mapping").and_then(Value::as_object) {
            for (tag, target) in entries {
                match target.as_str().and_then(reference_name) {
                    Some(name) => {
                        mapping.insert(tag.clone(), name);
                    }
                    None => self.diagnostics.malformed(
                        &at.mapping(tag),
                        format!("unsupported discriminator target {target}"),
                    ),
                }
            }
        }
        Some(Discriminator {
            property_name: property_name.to_string(),
            mapping,
        })
    }

    fn string_field(&mut self, object: &Map<String, Value>, key: &str, at: &Accessor) -> Option<String> {
        match object.get(key)? {
            Value::String(s) => Some(s.clone()),
            other => {
                self.diagnostics
                    .malformed(at, format!("{key} must be a string, found {other}"));
                None
            }
        }
    }

    fn float(&mut self, object: &Map<String, Value>, key: &str, at: &Accessor) -> Option<f64> {
        let value = object.get(key)?;
        let number = value.as_f64();
        if number.is_none() {
            self.diagnostics
                .malformed(at, format!("{key} must be a number, found {value}"));
        }
        number
    }

    fn count(&mut self, object: &Map<String, Value>, key: &str, at: &Accessor) -> Option<u64> {
        let value = object.get(key)?;
        let count = value
            .as_u64()
            .or_else(|| value.as_f64().filter(|f| *f >= 0.0 && f.fract() == 0.0).map(|f| f as u64));
        if count.is_none() {
            self.diagnostics.malformed(
                at,
                format!("{key} must be a non-negative integer, found {value}"),
            );
        }
        count
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use crate::*;
    use serde_json::json;

    #[test]
    fn type_array_with_null_becomes_union() {
        let schema = Schema::from_json(&json!({
            "type": ["string", "null"],
            "description": "nickname",
            "maxLength": 10
        }))
        .unwrap();

        assert_eq!(schema.meta.description.as_deref(), Some("nickname"));
        let SchemaKind::OneOf(union) = &schema.kind else {
            panic!("expected union, got {:?}", schema.kind);
        };
        assert_eq!(union.branches.len(), 2);
        assert!(matches!(
            &union.branches[0].kind,
            SchemaKind::String(s) if s.max_length == Some(10)
        ));
        assert!(union.branches[1].is_null());
    }

    #[test]
    fn nullable_flag_wraps_with_outer_annotations() {
        let schema = Schema::from_json(&json!({
            "type": "number",
            "nullable": true,
            "title": "radius"
        }))
        .unwrap();
        assert_eq!(schema.meta.title.as_deref(), Some("radius"));
        let SchemaKind::OneOf(union) = &schema.kind else {
            panic!("expected union");
        };
        assert!(union.branches[0].meta.is_empty());
        assert!(matches!(union.branches[0].kind, SchemaKind::Number(_)));
    }

    #[test]
    fn exclusive_bounds_in_both_forms() {
        let modern = Schema::from_json(&json!({"type": "integer", "exclusiveMinimum": 0})).unwrap();
        let legacy = Schema::from_json(&json!({
            "type": "integer",
            "minimum": 0,
            "exclusiveMinimum": true
        }))
        .unwrap();
        assert_eq!(modern, legacy);
        let SchemaKind::Integer(n) = &modern.kind else {
            panic!("expected integer");
        };
        assert_eq!(n.minimum, Some(Bound::exclusive(0.0)));
    }

    #[test]
    fn prefix_items_read_as_closed_tuple() {
        let schema = Schema::from_json(&json!({
            "type": "array",
            "prefixItems": [{"type": "string"}, {"type": "number"}]
        }))
        .unwrap();
        let SchemaKind::Tuple(tuple) = &schema.kind else {
            panic!("expected tuple");
        };
        assert_eq!(tuple.prefix_items.len(), 2);
        assert!(tuple.rest.is_none());

        let legacy = Schema::from_json(&json!({
            "type": "array",
            "items": [{"type": "string"}],
            "additionalItems": {"type": "boolean"}
        }))
        .unwrap();
        let SchemaKind::Tuple(tuple) = &legacy.kind else {
            panic!("expected tuple");
        };
        assert_eq!(tuple.rest.as_deref(), Some(&Schema::boolean()));
    }

    #[test]
    fn enum_and_discriminator() {
        let schema = Schema::from_json(&json!({
            "oneOf": [
                {"$ref": "#/components/schemas/Circle"},
                {"$ref": "#/$defs/Square"}
            ],
            "discriminator": {
                "propertyName": "kind",
                "mapping": {"circle": "#/components/schemas/Circle"}
            }
        }))
        .unwrap();
        let SchemaKind::OneOf(union) = &schema.kind else {
            panic!("expected union");
        };
        assert_eq!(union.branches[1], Schema::reference("Square"));
        let discriminator = union.discriminator.as_ref().unwrap();
        assert_eq!(discriminator.property_name, "kind");
        assert_eq!(discriminator.mapping["circle"], "Circle");

        let single = Schema::from_json(&json!({"enum": ["only"]})).unwrap();
        assert_eq!(single.kind, SchemaKind::Constant(json!("only")));
    }

    #[test]
    fn all_problems_are_reported() {
        let error = Schema::from_json(&json!({
            "type": "object",
            "properties": {
                "a": {"type": "strin"},
                "b": {"$ref": "https://example.com/remote.json"},
                "c": false
            }
        }))
        .unwrap_err();

        let accessors: Vec<&str> = error.reasons.iter().map(|r| r.accessor.as_str()).collect();
        assert_eq!(
            accessors,
            [
                r#"$input.properties["a"]"#,
                r#"$input.properties["b"]"#,
                r#"$input.properties["c"]"#,
            ]
        );
        assert!(error.reasons.iter().all(|r| r.kind == ReasonKind::Malformed));
    }

    #[test]
    fn bare_schema_defs_become_components() {
        let document = Document::from_json(&json!({
            "type": "object",
            "properties": {"tag": {"$ref": "#/$defs/Tag"}},
            "$defs": {"Tag": {"type": "string"}}
        }))
        .unwrap();
        assert_eq!(document.components.get("Tag"), Some(&Schema::string()));
    }
}
