//! Scalars, arrays, tuples and objects.

use super::Converter;
use crate::dialect::{DialectKind, DialectSchema, EnumSchema, Primitive};
use serde_json::Value;
use toolschema_ir::{
    Accessor, AdditionalProperties, ArraySchema, NumberSchema, ObjectSchema, StringSchema,
    TupleSchema,
};

impl Converter<'_> {
    pub(super) fn number(&mut self, number: &NumberSchema, at: &Accessor) -> NumberSchema {
        if let (Some(min), Some(max)) = (number.minimum, number.maximum) {
            let empty = min.value > max.value
                || (min.value == max.value && (min.exclusive || max.exclusive));
            if empty {
                self.diagnostics
                    .malformed(at, format!("minimum {} exceeds maximum {}", min.value, max.value));
            }
        }
        if let Some(multiple_of) = number.multiple_of {
            if multiple_of <= 0.0 {
                self.diagnostics
                    .malformed(at, format!("multipleOf must be positive, found {multiple_of}"));
            }
        }
        number.clone()
    }

    pub(super) fn string(&mut self, string: &StringSchema, at: &Accessor) -> StringSchema {
        if let (Some(min), Some(max)) = (string.min_length, string.max_length) {
            if min > max {
                self.diagnostics
                    .malformed(at, format!("minLength {min} exceeds maxLength {max}"));
            }
        }
        string.clone()
    }

    pub(super) fn constant(&mut self, value: &Value, at: &Accessor) -> DialectKind {
        if value.is_null() {
            return self.null(at);
        }
        if self.dialect.constants {
            return DialectKind::Constant(value.clone());
        }
        match Primitive::of(value) {
            Some(primitive) => DialectKind::Enum(EnumSchema {
                primitive,
                values: vec![value.clone()],
            }),
            None => {
                self.diagnostics.unconvertible(
                    at,
                    format!(
                        "{} cannot express a constant {value}",
                        self.dialect.name
                    ),
                );
                DialectKind::Unknown
            }
        }
    }

    fn item_counts(&mut self, min: Option<u64>, max: Option<u64>, at: &Accessor) {
        if let (Some(min), Some(max)) = (min, max) {
            if min > max {
                self.diagnostics
                    .malformed(at, format!("minItems {min} exceeds maxItems {max}"));
            }
        }
    }

    pub(super) fn array(&mut self, array: &ArraySchema, at: &Accessor) -> DialectKind {
        self.item_counts(array.min_items, array.max_items, at);
        let items = self.schema(&array.items, &at.items());
        DialectKind::Array(array.with_items(items))
    }

    pub(super) fn tuple(&mut self, tuple: &TupleSchema, at: &Accessor) -> DialectKind {
        if !self.dialect.tuples {
            self.diagnostics.unconvertible(
                at,
                format!("{} does not support tuple types", self.dialect.name),
            );
            return DialectKind::Unknown;
        }
        self.item_counts(tuple.min_items, tuple.max_items, at);
        let prefix_items = tuple
            .prefix_items
            .iter()
            .enumerate()
            .map(|(index, item)| self.schema(item, &at.prefix_item(index)))
            .collect();
        let rest = tuple
            .rest
            .as_deref()
            .map(|rest| Box::new(self.schema(rest, &at.items())));
        DialectKind::Tuple(TupleSchema {
            prefix_items,
            rest,
            min_items: tuple.min_items,
            max_items: tuple.max_items,
        })
    }

    pub(super) fn object(&mut self, object: &ObjectSchema, at: &Accessor) -> DialectKind {
        let strict = self.options.strict;

        for name in &object.required {
            if !object.properties.contains_key(name) {
                self.diagnostics.malformed(
                    at,
                    format!("required property \"{name}\" is not declared in properties"),
                );
            }
        }

        let mut converted = ObjectSchema::<DialectSchema>::new();
        converted.required = object.required.clone();
        for (name, property) in &object.properties {
            let mut schema = self.schema(property, &at.property(name));
            if strict && !object.is_required(name) {
                schema = self.make_nullable(schema);
                converted.required.insert(name.clone());
            }
            converted.properties.insert(name.clone(), schema);
        }

        converted.additional_properties = match &object.additional_properties {
            AdditionalProperties::Absent if strict => AdditionalProperties::Forbidden,
            AdditionalProperties::Absent => AdditionalProperties::Absent,
            AdditionalProperties::Forbidden => AdditionalProperties::Forbidden,
            AdditionalProperties::Allowed => {
                if self.reject_open_object(at) {
                    AdditionalProperties::Forbidden
                } else {
                    AdditionalProperties::Allowed
                }
            }
            AdditionalProperties::Schema(additional) => {
                let schema = self.schema(additional, &at.additional_properties());
                if self.reject_open_object(at) {
                    AdditionalProperties::Forbidden
                } else {
                    AdditionalProperties::Schema(Box::new(schema))
                }
            }
        };

        DialectKind::Object(converted)
    }

    /// Records an error when the object may not accept undeclared keys here.
    fn reject_open_object(&mut self, at: &Accessor) -> bool {
        if self.options.strict {
            self.diagnostics
                .unconvertible(at, "open objects (additionalProperties) are not allowed in strict mode");
            true
        } else if !self.dialect.open_objects {
            self.diagnostics.unconvertible(
                at,
                format!(
                    "{} does not support open objects (additionalProperties)",
                    self.dialect.name
                ),
            );
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::convert::convert;
    use crate::dialect::{CLAUDE, GEMINI, OPENAI, OPENAPI_3_1};
    use crate::options::ConvertOptions;
    use serde_json::json;
    use toolschema_ir::{
        AdditionalProperties, Bound, Components, NumberSchema, ObjectSchema, ReasonKind, Schema,
        SchemaKind,
    };

    fn strict() -> ConvertOptions {
        ConvertOptions {
            strict: Some(true),
            ..Default::default()
        }
    }

    #[test]
    fn tuple_is_rejected_once_without_descending() {
        let schema = Schema::object(ObjectSchema::new().property(
            "first",
            Schema::tuple(vec![Schema::string(), Schema::reference("IMissing")]),
            true,
        ));
        let error = convert(&schema, &Components::new(), &OPENAI, &ConvertOptions::default())
            .unwrap_err();
        assert_eq!(error.reasons.len(), 1);
        assert_eq!(error.reasons[0].accessor, r#"$input.properties["first"]"#);
        assert_eq!(error.reasons[0].kind, ReasonKind::UnconvertibleConstruct);
    }

    #[test]
    fn tuple_is_kept_where_supported() {
        let schema = Schema::tuple(vec![Schema::string(), Schema::boolean()]);
        let document =
            convert(&schema, &Components::new(), &OPENAPI_3_1, &ConvertOptions::default()).unwrap();
        assert_eq!(
            document.schema.to_json(&OPENAPI_3_1),
            json!({
                "type": "array",
                "prefixItems": [{"type": "string"}, {"type": "boolean"}],
                "items": false
            })
        );
    }

    #[test]
    fn open_object_rejected_on_closed_dialect_but_children_visited() {
        let mut object = ObjectSchema::new()
            .property("tags", Schema::reference("IMissing"), true);
        object.additional_properties = AdditionalProperties::Allowed;
        let error = convert(
            &Schema::object(object),
            &Components::new(),
            &GEMINI,
            &ConvertOptions::default(),
        )
        .unwrap_err();

        let kinds: Vec<_> = error.reasons.iter().map(|r| (r.accessor.as_str(), r.kind)).collect();
        assert_eq!(
            kinds,
            [
                (r#"$input.properties["tags"]"#, ReasonKind::DanglingReference),
                ("$input", ReasonKind::UnconvertibleConstruct),
            ]
        );
    }

    #[test]
    fn open_object_allowed_on_open_dialect() {
        let mut object = ObjectSchema::new();
        object.additional_properties =
            AdditionalProperties::Schema(Box::new(Schema::integer()));
        let document = convert(
            &Schema::object(object),
            &Components::new(),
            &CLAUDE,
            &ConvertOptions::default(),
        )
        .unwrap();
        assert_eq!(
            document.schema.to_json(&CLAUDE),
            json!({
                "type": "object",
                "properties": {},
                "required": [],
                "additionalProperties": {"type": "integer"}
            })
        );
    }

    #[test]
    fn strict_closes_objects_and_widens_optionals() {
        let schema = Schema::object(
            ObjectSchema::new()
                .property("name", Schema::string(), true)
                .property("age", Schema::integer(), false),
        );
        let document = convert(&schema, &Components::new(), &OPENAI, &strict()).unwrap();
        assert_eq!(
            document.schema.to_json(&OPENAI),
            json!({
                "type": "object",
                "properties": {
                    "age": {"anyOf": [{"type": "integer"}, {"type": "null"}]},
                    "name": {"type": "string"}
                },
                "required": ["age", "name"],
                "additionalProperties": false
            })
        );
    }

    #[test]
    fn strict_rejects_open_objects() {
        let mut object = ObjectSchema::new();
        object.additional_properties = AdditionalProperties::Allowed;
        let error =
            convert(&Schema::object(object), &Components::new(), &CLAUDE, &strict()).unwrap_err();
        assert_eq!(error.reasons.len(), 1);
        assert!(error.reasons[0].reason.contains("strict"));
    }

    #[test]
    fn malformed_constraints_are_all_reported() {
        let mut object = ObjectSchema::new().property(
            "count",
            Schema::new(SchemaKind::Integer(NumberSchema {
                minimum: Some(Bound::inclusive(10.0)),
                maximum: Some(Bound::inclusive(1.0)),
                multiple_of: Some(0.0),
            })),
            true,
        );
        object.required.insert("ghost".to_string());

        let error = convert(
            &Schema::object(object),
            &Components::new(),
            &CLAUDE,
            &ConvertOptions::default(),
        )
        .unwrap_err();
        assert_eq!(error.reasons.len(), 3);
        assert!(error.reasons.iter().all(|r| r.kind == ReasonKind::Malformed));
        assert_eq!(error.reasons[0].accessor, "$input");
    }

    #[test]
    fn constants_without_const_keyword_become_single_value_enums() {
        let document = convert(
            &Schema::constant("circle"),
            &Components::new(),
            &GEMINI,
            &ConvertOptions::default(),
        )
        .unwrap();
        assert_eq!(
            document.schema.to_json(&GEMINI),
            json!({"type": "string", "enum": ["circle"]})
        );
    }
}
