//! Unions: null handling, constant coalescing and discriminators.

use super::Converter;
use crate::dialect::{DialectKind, DialectSchema, EnumSchema, Primitive};
use serde_json::Value;
use std::collections::BTreeMap;
use toolschema_ir::{Accessor, Discriminator, Meta, ObjectSchema, OneOfSchema, Schema, SchemaKind};

impl Converter<'_> {
    pub(super) fn one_of(&mut self, union: &OneOfSchema, meta: &Meta, at: &Accessor) -> DialectSchema {
        if union.branches.is_empty() {
            self.diagnostics.malformed(at, "oneOf has no branches");
            return DialectSchema::new(DialectKind::Unknown).with_meta(meta.clone());
        }

        if union.discriminator.is_none() {
            if let Some(values) = self.enum_values(union) {
                return self.enumeration(values, meta, at);
            }
        }

        let mut members = Vec::new();
        let mut has_null = false;
        self.flatten(union, at, &mut members, &mut has_null);

        let schema = match members.as_slice() {
            [] => DialectSchema::new(self.null(at)).with_meta(meta.clone()),
            [(accessor, member)] => {
                if let Some(discriminator) = &union.discriminator {
                    self.check_discriminator(discriminator, &members, at);
                }
                let merged = Schema {
                    meta: meta.clone().or(&member.meta),
                    kind: member.kind.clone(),
                };
                let accessor = accessor.clone();
                self.schema(&merged, &accessor)
            }
            _ => {
                let discriminator = self.discriminator(union, &members, at);
                let branches = members
                    .iter()
                    .map(|(accessor, member)| self.schema(member, accessor))
                    .collect();
                DialectSchema::new(DialectKind::Union(OneOfSchema {
                    branches,
                    discriminator,
                }))
                .with_meta(meta.clone())
            }
        };

        if has_null && !members.is_empty() {
            self.make_nullable(schema)
        } else {
            schema
        }
    }

    /// Splices nested plain unions into one member list and pulls out nulls.
    fn flatten<'s>(
        &mut self,
        union: &'s OneOfSchema,
        at: &Accessor,
        members: &mut Vec<(Accessor, &'s Schema)>,
        has_null: &mut bool,
    ) {
        for (index, branch) in union.branches.iter().enumerate() {
            let accessor = at.branch(index);
            match &branch.kind {
                _ if branch.is_null() => *has_null = true,
                SchemaKind::OneOf(inner) if inner.discriminator.is_none() => {
                    if inner.branches.is_empty() {
                        self.diagnostics.malformed(&accessor, "oneOf has no branches");
                    }
                    self.flatten(inner, &accessor, members, has_null);
                }
                _ => members.push((accessor, branch)),
            }
        }
    }

    /// Every value the union admits, if it only admits constants.
    ///
    /// Looks through references and nested unions.
    fn enum_values(&self, union: &OneOfSchema) -> Option<Vec<Value>> {
        let mut values = Vec::new();
        let mut seen = Vec::new();
        for branch in &union.branches {
            self.constant_leaves(branch, &mut seen, &mut values)?;
        }
        let mut unique: Vec<Value> = Vec::with_capacity(values.len());
        for value in values {
            if !unique.contains(&value) {
                unique.push(value);
            }
        }
        Some(unique)
    }

    fn constant_leaves<'s>(
        &'s self,
        schema: &'s Schema,
        seen: &mut Vec<&'s str>,
        out: &mut Vec<Value>,
    ) -> Option<()> {
        match &schema.kind {
            SchemaKind::Constant(value) => out.push(value.clone()),
            SchemaKind::Null => out.push(Value::Null),
            SchemaKind::OneOf(union) if union.discriminator.is_none() && !union.branches.is_empty() => {
                for branch in &union.branches {
                    self.constant_leaves(branch, seen, out)?;
                }
            }
            SchemaKind::Reference(name) => {
                if seen.contains(&name.as_str()) {
                    return None;
                }
                seen.push(name);
                let definition = self.components.get(name)?;
                self.constant_leaves(definition, seen, out)?;
                seen.pop();
            }
            _ => return None,
        }
        Some(())
    }

    /// A union of constants, coalesced into one enum where the values share a
    /// primitive type.
    fn enumeration(&mut self, values: Vec<Value>, meta: &Meta, at: &Accessor) -> DialectSchema {
        let has_null = values.iter().any(Value::is_null);
        let values: Vec<Value> = values.into_iter().filter(|v| !v.is_null()).collect();

        let kind = match values.len() {
            0 => self.null(at),
            1 => self.constant(&values[0], at),
            _ => match Primitive::common(&values) {
                Some(primitive) => DialectKind::Enum(EnumSchema { primitive, values }),
                None if self.dialect.constants => DialectKind::Union(OneOfSchema::new(
                    values
                        .into_iter()
                        .map(|value| DialectSchema::new(DialectKind::Constant(value)))
                        .collect(),
                )),
                None => {
                    let branches = values
                        .iter()
                        .map(|value| DialectSchema::new(self.constant(value, at)))
                        .collect();
                    DialectKind::Union(OneOfSchema::new(branches))
                }
            },
        };

        let schema = DialectSchema::new(kind).with_meta(meta.clone());
        if has_null && !matches!(schema.kind, DialectKind::Null | DialectKind::Unknown) {
            self.make_nullable(schema)
        } else {
            schema
        }
    }

    fn discriminator(
        &mut self,
        union: &OneOfSchema,
        members: &[(Accessor, &Schema)],
        at: &Accessor,
    ) -> Option<Discriminator> {
        if let Some(explicit) = &union.discriminator {
            self.check_discriminator(explicit, members, at);
            if !self.dialect.discriminator {
                return None;
            }
            let mapping = if self.dialect.inline_references() {
                BTreeMap::new()
            } else {
                explicit.mapping.clone()
            };
            return Some(Discriminator {
                property_name: explicit.property_name.clone(),
                mapping,
            });
        }

        if self.dialect.discriminator
            && self.options.infer_discriminator
            && !self.dialect.inline_references()
        {
            self.infer_discriminator(members)
        } else {
            None
        }
    }

    /// Mapping targets must exist and every branch must be an object.
    fn check_discriminator(
        &mut self,
        discriminator: &Discriminator,
        members: &[(Accessor, &Schema)],
        at: &Accessor,
    ) {
        for (tag, target) in &discriminator.mapping {
            if !self.components.contains(target) {
                self.diagnostics.dangling(&at.mapping(tag), target);
            }
        }
        for (accessor, member) in members {
            if let Some(resolved) = self.components.resolve(member) {
                if !matches!(resolved.kind, SchemaKind::Object(_)) {
                    self.diagnostics.malformed(
                        accessor,
                        format!(
                            "discriminated union branch must be an object, found {}",
                            resolved.kind.name()
                        ),
                    );
                }
            }
        }
    }

    /// A tag property shared by every branch, when every branch is a
    /// reference to an object.
    ///
    /// The candidate is the alphabetically first property that every branch
    /// requires as a string constant; colliding tag values mean no
    /// discriminator.
    fn infer_discriminator(&self, members: &[(Accessor, &Schema)]) -> Option<Discriminator> {
        let mut objects: Vec<(&str, &ObjectSchema)> = Vec::new();
        for (_, member) in members {
            let SchemaKind::Reference(name) = &member.kind else {
                return None;
            };
            let Some(SchemaKind::Object(object)) =
                self.components.resolve(member).map(|schema| &schema.kind)
            else {
                return None;
            };
            objects.push((name, object));
        }

        let (_, first) = objects.first()?;
        let property = first.properties.keys().find(|property| {
            objects
                .iter()
                .all(|(_, object)| self.tag_value(object, property).is_some())
        })?;

        let mut mapping = BTreeMap::new();
        for (name, object) in &objects {
            let value = self.tag_value(object, property)?;
            if mapping.insert(value, name.to_string()).is_some() {
                tracing::trace!(property = %property, "tag values collide, no discriminator");
                return None;
            }
        }
        tracing::trace!(property = %property, branches = objects.len(), "inferred discriminator");
        Some(Discriminator {
            property_name: property.clone(),
            mapping,
        })
    }

    fn tag_value(&self, object: &ObjectSchema, property: &str) -> Option<String> {
        if !object.is_required(property) {
            return None;
        }
        let schema = self.components.resolve(object.properties.get(property)?)?;
        match &schema.kind {
            SchemaKind::Constant(Value::String(tag)) => Some(tag.clone()),
            _ => None,
        }
    }
}
