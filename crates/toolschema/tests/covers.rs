//! Covering relation over canonical documents.

use serde_json::{Value, json};
use toolschema::covers;
use toolschema_ir::{Components, Document, Schema};

fn document(value: Value) -> Document {
    Document::from_json(&value).expect("valid document")
}

fn schema(value: Value) -> Schema {
    Schema::from_json(&value).expect("valid schema")
}

fn samples() -> Vec<Schema> {
    [
        json!({"type": "string", "format": "email", "maxLength": 64}),
        json!({"type": "integer", "minimum": 0, "exclusiveMaximum": 10}),
        json!({"type": "number", "multipleOf": 0.25}),
        json!({"enum": ["red", "green", "blue"]}),
        json!({"type": "array", "items": {"type": "boolean"}, "uniqueItems": true}),
        json!({"type": "array", "prefixItems": [{"type": "string"}, {"type": "integer"}]}),
        json!({
            "type": "object",
            "properties": {"id": {"type": "string"}, "tags": {"type": "array", "items": {"type": "string"}}},
            "required": ["id"],
            "additionalProperties": false
        }),
        json!({"anyOf": [{"type": "string"}, {"type": "number"}, {"type": "null"}]}),
        json!({}),
    ]
    .into_iter()
    .map(schema)
    .collect()
}

#[test]
fn every_schema_covers_itself() {
    let components = Components::new();
    for sample in samples() {
        assert!(covers(&sample, &sample, &components), "{}", sample.to_json());
    }
}

#[test]
fn nullable_covers_its_base_only_one_way() {
    let components = Components::new();
    for sample in samples() {
        if sample.kind == toolschema_ir::SchemaKind::Unknown {
            continue;
        }
        let nullable = sample.clone().nullable();
        assert!(covers(&nullable, &sample, &components), "{}", sample.to_json());
        if !covers(&sample, &Schema::null(), &components) {
            assert!(!covers(&sample, &nullable, &components), "{}", sample.to_json());
        }
    }
}

#[test]
fn widened_version_covers_original() {
    let input = document(json!({
        "components": {"schemas": {
            "IUserV1": {
                "type": "object",
                "properties": {
                    "id": {"type": "string", "format": "uri"},
                    "age": {"type": "integer", "minimum": 18}
                },
                "required": ["id", "age"],
                "additionalProperties": false
            },
            "IUserV2": {
                "type": "object",
                "properties": {
                    "id": {"type": "string", "format": "iri"},
                    "age": {"type": "number", "minimum": 0},
                    "nickname": {"type": "string"}
                },
                "required": ["id"]
            }
        }},
        "schema": {}
    }));
    let v1 = Schema::reference("IUserV1");
    let v2 = Schema::reference("IUserV2");
    assert!(covers(&v2, &v1, &input.components));
    assert!(!covers(&v1, &v2, &input.components));
}

#[test]
fn constants_against_constrained_types() {
    let components = Components::new();
    let small = schema(json!({"type": "integer", "maximum": 5}));
    assert!(covers(&small, &schema(json!({"const": 3})), &components));
    assert!(!covers(&small, &schema(json!({"const": 7})), &components));
    assert!(!covers(&small, &schema(json!({"const": 2.5})), &components));
    // Patterns are not evaluated.
    let patterned = schema(json!({"type": "string", "pattern": "^a"}));
    assert!(!covers(&patterned, &schema(json!({"const": "abc"})), &components));
}
