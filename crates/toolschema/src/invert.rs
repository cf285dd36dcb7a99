//! Dialect schema to IR.
//!
//! Inversion is total: every dialect node has a canonical counterpart.

use crate::dialect::{Defs, DialectDocument, DialectKind, DialectSchema};
use toolschema_ir::{
    AdditionalProperties, ArraySchema, Components, Document, ObjectSchema, OneOfSchema, Schema,
    SchemaKind, TupleSchema,
};

/// Rebuilds the canonical schema for one dialect node.
///
/// References to `components` stay references. References to names that only
/// exist in `defs` are inlined; a recursive one is left as a reference.
pub fn invert(schema: &DialectSchema, defs: &Defs, components: &Components) -> Schema {
    let mut inverter = Inverter {
        defs,
        components,
        keep_defs: false,
        inlining: Vec::new(),
    };
    inverter.schema(schema)
}

/// Rebuilds a component table from dialect definitions.
///
/// Synthesized `Name.Nullable` variants are dropped when `Name` itself is
/// present; they invert to `oneOf[Name, null]` at their use sites.
pub fn invert_components(defs: &Defs, components: &Components) -> Components {
    let mut inverter = Inverter {
        defs,
        components,
        keep_defs: true,
        inlining: Vec::new(),
    };
    let mut inverted = Components::new();
    for (name, schema) in defs {
        if synthetic_base(name, defs).is_some() && !components.contains(name) {
            continue;
        }
        inverted.insert(name.clone(), inverter.schema(schema));
    }
    inverted
}

/// Inverts a whole converted document, keeping its definitions as components.
pub fn invert_document(document: &DialectDocument, components: &Components) -> Document {
    let mut inverter = Inverter {
        defs: &document.defs,
        components,
        keep_defs: true,
        inlining: Vec::new(),
    };
    let schema = inverter.schema(&document.schema);
    Document::new(schema, invert_components(&document.defs, components))
}

struct Inverter<'a> {
    defs: &'a Defs,
    components: &'a Components,
    /// Keep references into `defs` instead of inlining them.
    keep_defs: bool,
    inlining: Vec<String>,
}

impl Inverter<'_> {
    fn schema(&mut self, schema: &DialectSchema) -> Schema {
        let kind = match &schema.kind {
            DialectKind::Unknown => SchemaKind::Unknown,
            DialectKind::Null => SchemaKind::Null,
            DialectKind::Boolean => SchemaKind::Boolean,
            DialectKind::Integer(number) => SchemaKind::Integer(number.clone()),
            DialectKind::Number(number) => SchemaKind::Number(number.clone()),
            DialectKind::String(string) => SchemaKind::String(string.clone()),
            DialectKind::Constant(value) => SchemaKind::Constant(value.clone()),
            DialectKind::Enum(e) => match e.values.as_slice() {
                [only] => SchemaKind::Constant(only.clone()),
                values => SchemaKind::OneOf(OneOfSchema::new(
                    values.iter().cloned().map(Schema::constant).collect(),
                )),
            },
            DialectKind::Array(array) => {
                let items = self.schema(&array.items);
                SchemaKind::Array(ArraySchema {
                    items: Box::new(items),
                    min_items: array.min_items,
                    max_items: array.max_items,
                    unique_items: array.unique_items,
                })
            }
            DialectKind::Tuple(tuple) => SchemaKind::Tuple(TupleSchema {
                prefix_items: tuple.prefix_items.iter().map(|s| self.schema(s)).collect(),
                rest: tuple.rest.as_deref().map(|rest| Box::new(self.schema(rest))),
                min_items: tuple.min_items,
                max_items: tuple.max_items,
            }),
            DialectKind::Object(object) => SchemaKind::Object(self.object(object)),
            DialectKind::Reference(name) => {
                let inverted = self.reference(name);
                return self.finish(schema, inverted);
            }
            DialectKind::Union(union) => SchemaKind::OneOf(OneOfSchema {
                branches: union.branches.iter().map(|b| self.schema(b)).collect(),
                discriminator: union.discriminator.clone(),
            }),
        };
        self.finish(
            schema,
            Schema {
                meta: Default::default(),
                kind,
            },
        )
    }

    /// Attaches annotations and turns the `nullable` flag into a null branch.
    fn finish(&self, source: &DialectSchema, mut inverted: Schema) -> Schema {
        inverted.meta = source.meta.clone().or(&inverted.meta);
        if !source.nullable {
            return inverted;
        }
        match &mut inverted.kind {
            SchemaKind::OneOf(union) if union.discriminator.is_none() => {
                union.branches.push(Schema::null());
                inverted
            }
            _ => inverted.nullable(),
        }
    }

    fn object(&mut self, object: &ObjectSchema<DialectSchema>) -> ObjectSchema {
        ObjectSchema {
            properties: object
                .properties
                .iter()
                .map(|(name, property)| (name.clone(), self.schema(property)))
                .collect(),
            required: object.required.clone(),
            additional_properties: match &object.additional_properties {
                AdditionalProperties::Absent => AdditionalProperties::Absent,
                AdditionalProperties::Forbidden => AdditionalProperties::Forbidden,
                AdditionalProperties::Allowed => AdditionalProperties::Allowed,
                AdditionalProperties::Schema(schema) => {
                    AdditionalProperties::Schema(Box::new(self.schema(schema)))
                }
            },
        }
    }

    fn reference(&mut self, name: &str) -> Schema {
        if self.components.contains(name) {
            return Schema::reference(name);
        }
        if let Some(base) = synthetic_base(name, self.defs)
            .or_else(|| self.synthetic_component_base(name))
        {
            let base = self.reference(base);
            return Schema::one_of(vec![base, Schema::null()]);
        }
        if self.keep_defs && self.defs.contains_key(name) {
            return Schema::reference(name);
        }
        let Some(definition) = self.defs.get(name) else {
            return Schema::reference(name);
        };
        if self.inlining.iter().any(|n| n == name) {
            return Schema::reference(name);
        }
        self.inlining.push(name.to_string());
        let inlined = self.schema(definition);
        self.inlining.pop();
        inlined
    }

    /// `Name.Nullable` with `Name` in the components but no definitions.
    fn synthetic_component_base<'n>(&self, name: &'n str) -> Option<&'n str> {
        let base = name.strip_suffix(".Nullable")?;
        (self.components.contains(base) && !self.components.contains(name)).then_some(base)
    }
}

/// `Name` when `name` is the synthesized nullable variant of a present `Name`.
fn synthetic_base<'n>(name: &'n str, defs: &Defs) -> Option<&'n str> {
    let base = name.strip_suffix(".Nullable")?;
    defs.contains_key(base).then_some(base)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{EnumSchema, Primitive};
    use serde_json::json;
    use toolschema_ir::{NumberSchema, StructureEq};

    #[test]
    fn enums_become_constants() {
        let single = DialectSchema::new(DialectKind::Enum(EnumSchema {
            primitive: Primitive::String,
            values: vec![json!("only")],
        }));
        assert_eq!(
            invert(&single, &Defs::new(), &Components::new()),
            Schema::constant("only")
        );

        let many = DialectSchema::new(DialectKind::Enum(EnumSchema {
            primitive: Primitive::Integer,
            values: vec![json!(1), json!(2)],
        }));
        assert_eq!(
            invert(&many, &Defs::new(), &Components::new()),
            Schema::one_of(vec![Schema::constant(1), Schema::constant(2)])
        );
    }

    #[test]
    fn nullable_flag_becomes_null_branch() {
        let mut number = DialectSchema::new(DialectKind::Number(NumberSchema::default()));
        number.nullable = true;
        number.meta.description = Some("radius".into());

        let inverted = invert(&number, &Defs::new(), &Components::new());
        assert!(inverted.structure_eq(&Schema::one_of(vec![Schema::number(), Schema::null()])));
        assert_eq!(inverted.meta.description.as_deref(), Some("radius"));
    }

    #[test]
    fn synthesized_nullable_reference_points_back_at_base() {
        let mut defs = Defs::new();
        defs.insert(
            "IPoint".to_string(),
            DialectSchema::new(DialectKind::Object(ObjectSchema::new())),
        );
        let mut nullable = defs["IPoint"].clone();
        nullable.nullable = true;
        defs.insert("IPoint.Nullable".to_string(), nullable);

        let components = Components::new().with("IPoint", Schema::object(ObjectSchema::new()));
        let reference = DialectSchema::new(DialectKind::Reference("IPoint.Nullable".into()));
        assert_eq!(
            invert(&reference, &defs, &components),
            Schema::one_of(vec![Schema::reference("IPoint"), Schema::null()])
        );

        let rebuilt = invert_components(&defs, &components);
        assert_eq!(rebuilt.names().collect::<Vec<_>>(), ["IPoint"]);
    }

    #[test]
    fn definitions_unknown_to_components_are_inlined() {
        let mut defs = Defs::new();
        defs.insert(
            "IFlag".to_string(),
            DialectSchema::new(DialectKind::Boolean),
        );
        let reference = DialectSchema::new(DialectKind::Reference("IFlag".into()));
        assert_eq!(
            invert(&reference, &defs, &Components::new()),
            Schema::boolean()
        );
    }
}
