//! Dialect JSON back to dialect nodes.
//!
//! The canonical reader already understands every dialect's vocabulary; this
//! lifts its output into the dialect's own node shapes (enums, the nullable
//! flag) so the result can be handed to the inverter.

use super::{Dialect, DialectDocument, DialectKind, DialectSchema, EnumSchema, Primitive};
use serde_json::Value;
use toolschema_ir::{
    AdditionalProperties, Document, ObjectSchema, OneOfSchema, ReadError, Schema, SchemaKind,
    TupleSchema,
};

impl DialectDocument {
    /// Reads a document in the layout [`DialectDocument::to_json`] writes.
    pub fn from_json(value: &Value, dialect: &Dialect) -> Result<DialectDocument, ReadError> {
        let document = Document::from_json(value)?;
        let defs = document
            .components
            .iter()
            .map(|(name, schema)| (name.to_string(), lift(schema, dialect)))
            .collect();
        Ok(DialectDocument::new(lift(&document.schema, dialect), defs))
    }
}

fn lift(schema: &Schema, dialect: &Dialect) -> DialectSchema {
    let kind = match &schema.kind {
        SchemaKind::Unknown => DialectKind::Unknown,
        SchemaKind::Null => DialectKind::Null,
        SchemaKind::Boolean => DialectKind::Boolean,
        SchemaKind::Integer(number) => DialectKind::Integer(number.clone()),
        SchemaKind::Number(number) => DialectKind::Number(number.clone()),
        SchemaKind::String(string) => DialectKind::String(string.clone()),
        SchemaKind::Constant(value) => DialectKind::Constant(value.clone()),
        SchemaKind::Reference(name) => DialectKind::Reference(name.clone()),
        SchemaKind::Array(array) => DialectKind::Array(array.with_items(lift(&array.items, dialect))),
        SchemaKind::Tuple(tuple) => DialectKind::Tuple(TupleSchema {
            prefix_items: tuple
                .prefix_items
                .iter()
                .map(|item| lift(item, dialect))
                .collect(),
            rest: tuple
                .rest
                .as_deref()
                .map(|rest| Box::new(lift(rest, dialect))),
            min_items: tuple.min_items,
            max_items: tuple.max_items,
        }),
        SchemaKind::Object(object) => DialectKind::Object(ObjectSchema {
            properties: object
                .properties
                .iter()
                .map(|(name, property)| (name.clone(), lift(property, dialect)))
                .collect(),
            required: object.required.clone(),
            additional_properties: match &object.additional_properties {
                AdditionalProperties::Absent => AdditionalProperties::Absent,
                AdditionalProperties::Forbidden => AdditionalProperties::Forbidden,
                AdditionalProperties::Allowed => AdditionalProperties::Allowed,
                AdditionalProperties::Schema(additional) => {
                    AdditionalProperties::Schema(Box::new(lift(additional, dialect)))
                }
            },
        }),
        SchemaKind::OneOf(union) => return lift_union(schema, union, dialect),
    };
    DialectSchema::new(kind).with_meta(schema.meta.clone())
}

fn lift_union(schema: &Schema, union: &OneOfSchema, dialect: &Dialect) -> DialectSchema {
    if union.discriminator.is_none() {
        let values: Option<Vec<Value>> = union
            .branches
            .iter()
            .map(|branch| match &branch.kind {
                SchemaKind::Constant(value) => Some(value.clone()),
                _ => None,
            })
            .collect();
        if let Some(primitive) = values.as_ref().and_then(|values| Primitive::common(values)) {
            let values = values.unwrap_or_default();
            return DialectSchema::new(DialectKind::Enum(EnumSchema { primitive, values }))
                .with_meta(schema.meta.clone());
        }

        // `nullable: true` reads as a trailing null branch.
        if dialect.nullable_flag() && union.branches.iter().any(Schema::is_null) {
            let rest: Vec<&Schema> = union.branches.iter().filter(|b| !b.is_null()).collect();
            let mut lifted = match rest.as_slice() {
                [only] => {
                    let inner = lift(only, dialect);
                    let meta = schema.meta.clone().or(&inner.meta);
                    inner.with_meta(meta)
                }
                _ => DialectSchema::new(DialectKind::Union(OneOfSchema::new(
                    rest.iter().map(|branch| lift(branch, dialect)).collect(),
                )))
                .with_meta(schema.meta.clone()),
            };
            lifted.nullable = true;
            return lifted;
        }
    }

    DialectSchema::new(DialectKind::Union(OneOfSchema {
        branches: union
            .branches
            .iter()
            .map(|branch| lift(branch, dialect))
            .collect(),
        discriminator: union.discriminator.clone(),
    }))
    .with_meta(schema.meta.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::convert;
    use crate::dialect::{GEMINI, OPENAI, OPENAPI_3_0};
    use crate::options::ConvertOptions;
    use toolschema_ir::{Components, ObjectSchema};

    fn sample() -> (Schema, Components) {
        let components = Components::new().with(
            "IPoint",
            Schema::object(
                ObjectSchema::new()
                    .property("x", Schema::number(), true)
                    .property("y", Schema::number(), true),
            ),
        );
        let schema = Schema::object(
            ObjectSchema::new()
                .property("at", Schema::reference("IPoint").nullable(), true)
                .property(
                    "mode",
                    Schema::one_of(vec![Schema::constant("fast"), Schema::constant("slow")]),
                    true,
                )
                .property("scale", Schema::number().nullable(), false),
        );
        (schema, components)
    }

    #[test]
    fn emitted_documents_read_back() {
        let (schema, components) = sample();
        for dialect in [&OPENAI, &OPENAPI_3_0] {
            let converted =
                convert(&schema, &components, dialect, &ConvertOptions::default()).unwrap();
            let read = DialectDocument::from_json(&converted.to_json(dialect), dialect).unwrap();
            assert_eq!(read, converted, "{}", dialect.name);
        }
    }

    #[test]
    fn flag_dialect_restores_nullable_flag() {
        let read = DialectDocument::from_json(
            &serde_json::json!({"type": "number", "nullable": true}),
            &GEMINI,
        )
        .unwrap();
        assert!(read.schema.nullable);
        assert!(matches!(read.schema.kind, DialectKind::Number(_)));
    }
}
