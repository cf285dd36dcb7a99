//! Structural equality for IR types.
//!
//! `structure_eq` compares schemas by the values they accept, ignoring fields
//! that dialect round trips are allowed to rewrite.
//!
//! # Ignored / normalized during comparison
//!
//! - `Meta` (title, description, example, default, deprecated)
//! - `OneOfSchema::discriminator`
//! - union nesting and branch order: `oneOf[a, oneOf[b, c]]` equals `oneOf[c, b, a]`
//! - single-branch unions: `oneOf[a]` equals `a`
//! - `const null` equals `null`
//! - `AdditionalProperties::Absent` equals `AdditionalProperties::Allowed`
//!
//! # Core fields (must match exactly)
//!
//! - kinds, constraints, reference names, constant values
//! - property names and the required set
//!
//! [`structure_eq_in`] additionally resolves references through each side's
//! components instead of comparing their names.

use crate::{AdditionalProperties, Components, Document, Schema, SchemaKind};

/// Trait for structural equality comparison.
///
/// Unlike `PartialEq`, this ignores annotation fields and union layout that
/// may differ between dialect renditions of the same schema.
pub trait StructureEq {
    fn structure_eq(&self, other: &Self) -> bool;
}

impl StructureEq for Schema {
    fn structure_eq(&self, other: &Self) -> bool {
        Comparer::new(None).schema(self, other)
    }
}

impl StructureEq for Components {
    fn structure_eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self.iter().all(|(name, schema)| {
                other
                    .get(name)
                    .is_some_and(|theirs| schema.structure_eq(theirs))
            })
    }
}

impl StructureEq for Document {
    fn structure_eq(&self, other: &Self) -> bool {
        self.schema.structure_eq(&other.schema) && self.components.structure_eq(&other.components)
    }
}

/// [`StructureEq`] that sees through references.
///
/// Each side resolves references through its own components, so a definition
/// inlined on one side equals a reference to it on the other, and a union
/// reached through a reference flattens into the enclosing union. Recursive
/// definitions compare coinductively. Dangling references equal only a
/// dangling reference of the same name.
pub fn structure_eq_in(
    left: &Schema,
    left_components: &Components,
    right: &Schema,
    right_components: &Components,
) -> bool {
    Comparer::new(Some((left_components, right_components))).schema(left, right)
}

/// A node on the comparison path: references by name, inline nodes by address.
#[derive(PartialEq, Eq)]
enum Node<'a> {
    Named(&'a str),
    Inline(*const Schema),
}

impl<'a> Node<'a> {
    fn of(schema: &'a Schema) -> Self {
        match &schema.kind {
            SchemaKind::Reference(name) => Node::Named(name),
            _ => Node::Inline(schema),
        }
    }
}

struct Comparer<'a> {
    /// Left and right components; `None` compares reference names literally.
    components: Option<(&'a Components, &'a Components)>,
    /// Pairs under comparison; meeting one again is taken as equal.
    path: Vec<(Node<'a>, Node<'a>)>,
}

impl<'a> Comparer<'a> {
    fn new(components: Option<(&'a Components, &'a Components)>) -> Self {
        Self {
            components,
            path: Vec::new(),
        }
    }

    fn schema(&mut self, a: &'a Schema, b: &'a Schema) -> bool {
        let key = (Node::of(a), Node::of(b));
        if self.path.contains(&key) {
            return true;
        }
        self.path.push(key);

        let (left, right) = match self.components {
            Some((l, r)) => (members(a, Some(l)), members(b, Some(r))),
            None => (members(a, None), members(b, None)),
        };
        let equal = match (left.as_slice(), right.as_slice()) {
            ([a], [b]) => self.kind(&a.kind, &b.kind),
            _ => self.multiset(&left, &right),
        };

        self.path.pop();
        equal
    }

    fn kind(&mut self, a: &'a SchemaKind, b: &'a SchemaKind) -> bool {
        match (a, b) {
            (SchemaKind::Unknown, SchemaKind::Unknown)
            | (SchemaKind::Boolean, SchemaKind::Boolean) => true,

            (
                SchemaKind::Null | SchemaKind::Constant(serde_json::Value::Null),
                SchemaKind::Null | SchemaKind::Constant(serde_json::Value::Null),
            ) => true,

            (SchemaKind::Integer(a), SchemaKind::Integer(b))
            | (SchemaKind::Number(a), SchemaKind::Number(b)) => a == b,
            (SchemaKind::String(a), SchemaKind::String(b)) => a == b,

            (SchemaKind::Array(a), SchemaKind::Array(b)) => {
                a.min_items == b.min_items
                    && a.max_items == b.max_items
                    && a.unique_items == b.unique_items
                    && self.schema(&a.items, &b.items)
            }

            (SchemaKind::Tuple(a), SchemaKind::Tuple(b)) => {
                a.min_items == b.min_items
                    && a.max_items == b.max_items
                    && a.prefix_items.len() == b.prefix_items.len()
                    && a
                        .prefix_items
                        .iter()
                        .zip(&b.prefix_items)
                        .all(|(a, b)| self.schema(a, b))
                    && match (a.rest.as_deref(), b.rest.as_deref()) {
                        (None, None) => true,
                        (Some(a), Some(b)) => self.schema(a, b),
                        _ => false,
                    }
            }

            (SchemaKind::Object(a), SchemaKind::Object(b)) => {
                a.required == b.required
                    && a.properties.len() == b.properties.len()
                    && a.properties.iter().all(|(name, schema)| {
                        b.properties
                            .get(name)
                            .is_some_and(|theirs| self.schema(schema, theirs))
                    })
                    && self.additional(&a.additional_properties, &b.additional_properties)
            }

            (SchemaKind::Reference(a), SchemaKind::Reference(b)) => a == b,
            (SchemaKind::Constant(a), SchemaKind::Constant(b)) => a == b,

            _ => false,
        }
    }

    fn additional(&mut self, a: &'a AdditionalProperties, b: &'a AdditionalProperties) -> bool {
        match (a, b) {
            (
                AdditionalProperties::Absent | AdditionalProperties::Allowed,
                AdditionalProperties::Absent | AdditionalProperties::Allowed,
            )
            | (AdditionalProperties::Forbidden, AdditionalProperties::Forbidden) => true,
            (AdditionalProperties::Schema(a), AdditionalProperties::Schema(b)) => {
                self.schema(a, b)
            }
            _ => false,
        }
    }

    /// Order-insensitive matching of union members.
    fn multiset(&mut self, a: &[&'a Schema], b: &[&'a Schema]) -> bool {
        if a.len() != b.len() {
            return false;
        }
        let mut used = vec![false; b.len()];
        for left in a {
            let mut found = None;
            for (index, right) in b.iter().enumerate() {
                if !used[index] && self.kind(&left.kind, &right.kind) {
                    found = Some(index);
                    break;
                }
            }
            match found {
                Some(index) => used[index] = true,
                None => return false,
            }
        }
        true
    }
}

/// Leaves of a (possibly nested) union; a non-union is its own single member.
/// With components, references are resolved first.
fn members<'a>(schema: &'a Schema, components: Option<&'a Components>) -> Vec<&'a Schema> {
    let mut out = Vec::new();
    collect_members(schema, components, &mut Vec::new(), &mut out);
    out
}

fn collect_members<'a>(
    schema: &'a Schema,
    components: Option<&'a Components>,
    expanding: &mut Vec<&'a str>,
    out: &mut Vec<&'a Schema>,
) {
    match (&schema.kind, components) {
        (SchemaKind::Reference(name), Some(table)) if !expanding.contains(&name.as_str()) => {
            match table.get(name) {
                Some(target) => {
                    expanding.push(name);
                    collect_members(target, components, expanding, out);
                    expanding.pop();
                }
                None => out.push(schema),
            }
        }
        (SchemaKind::OneOf(union), _) => {
            for branch in &union.branches {
                collect_members(branch, components, expanding, out);
            }
        }
        _ => out.push(schema),
    }
}
