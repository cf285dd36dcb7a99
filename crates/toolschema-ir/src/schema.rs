//! Canonical schema nodes.
//!
//! The container types ([`ArraySchema`], [`TupleSchema`], [`ObjectSchema`],
//! [`OneOfSchema`]) are generic over their child node so dialect schemas can
//! reuse them with their own node type.

use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

/// Documentation and sample values any node may carry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Meta {
    pub title: Option<String>,
    pub description: Option<String>,
    pub example: Option<Value>,
    pub default: Option<Value>,
    pub deprecated: bool,
}

impl Meta {
    pub fn is_empty(&self) -> bool {
        *self == Meta::default()
    }

    /// Title and description as one block of text.
    pub fn documentation(&self) -> Option<String> {
        join_documentation([self.title.as_deref(), self.description.as_deref()])
    }

    /// Fields of `self` win; missing ones are taken from `fallback`.
    pub fn or(self, fallback: &Meta) -> Meta {
        Meta {
            title: self.title.or_else(|| fallback.title.clone()),
            description: self.description.or_else(|| fallback.description.clone()),
            example: self.example.or_else(|| fallback.example.clone()),
            default: self.default.or_else(|| fallback.default.clone()),
            deprecated: self.deprecated || fallback.deprecated,
        }
    }
}

/// Joins documentation fragments outer to inner, separated by a blank line.
///
/// Empty fragments and a fragment repeating its predecessor are skipped.
pub fn join_documentation<'a>(parts: impl IntoIterator<Item = Option<&'a str>>) -> Option<String> {
    let mut kept: Vec<&str> = Vec::new();
    for part in parts.into_iter().flatten() {
        let part = part.trim();
        if part.is_empty() || kept.last() == Some(&part) {
            continue;
        }
        kept.push(part);
    }
    if kept.is_empty() {
        None
    } else {
        Some(kept.join("\n\n"))
    }
}

/// A canonical schema node.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    pub meta: Meta,
    pub kind: SchemaKind,
}

/// The shape of a canonical schema node.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaKind {
    /// Accepts any value.
    Unknown,
    Null,
    Boolean,
    Integer(NumberSchema),
    Number(NumberSchema),
    String(StringSchema),
    Array(ArraySchema),
    Tuple(TupleSchema),
    Object(ObjectSchema),
    /// Name of a schema in [`Components`](crate::Components).
    Reference(String),
    OneOf(OneOfSchema),
    Constant(Value),
}

impl SchemaKind {
    /// Short name used in diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            SchemaKind::Unknown => "any",
            SchemaKind::Null => "null",
            SchemaKind::Boolean => "boolean",
            SchemaKind::Integer(_) => "integer",
            SchemaKind::Number(_) => "number",
            SchemaKind::String(_) => "string",
            SchemaKind::Array(_) => "array",
            SchemaKind::Tuple(_) => "tuple",
            SchemaKind::Object(_) => "object",
            SchemaKind::Reference(_) => "reference",
            SchemaKind::OneOf(_) => "oneOf",
            SchemaKind::Constant(_) => "constant",
        }
    }
}

/// A numeric bound.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bound {
    pub value: f64,
    pub exclusive: bool,
}

impl Bound {
    pub fn inclusive(value: f64) -> Self {
        Self {
            value,
            exclusive: false,
        }
    }

    pub fn exclusive(value: f64) -> Self {
        Self {
            value,
            exclusive: true,
        }
    }
}

/// Constraints shared by `integer` and `number`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NumberSchema {
    pub minimum: Option<Bound>,
    pub maximum: Option<Bound>,
    pub multiple_of: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StringSchema {
    pub format: Option<String>,
    pub pattern: Option<String>,
    pub min_length: Option<u64>,
    pub max_length: Option<u64>,
    pub content_media_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArraySchema<S = Schema> {
    pub items: Box<S>,
    pub min_items: Option<u64>,
    pub max_items: Option<u64>,
    pub unique_items: bool,
}

impl<S> ArraySchema<S> {
    pub fn new(items: S) -> Self {
        Self {
            items: Box::new(items),
            min_items: None,
            max_items: None,
            unique_items: false,
        }
    }

    /// Same constraints around a different item node.
    pub fn with_items<T>(&self, items: T) -> ArraySchema<T> {
        ArraySchema {
            items: Box::new(items),
            min_items: self.min_items,
            max_items: self.max_items,
            unique_items: self.unique_items,
        }
    }
}

/// Fixed positions followed by an optional rest element.
///
/// Without a rest element the tuple holds exactly `prefix_items.len()` values.
#[derive(Debug, Clone, PartialEq)]
pub struct TupleSchema<S = Schema> {
    pub prefix_items: Vec<S>,
    pub rest: Option<Box<S>>,
    pub min_items: Option<u64>,
    pub max_items: Option<u64>,
}

impl<S> TupleSchema<S> {
    pub fn new(prefix_items: Vec<S>) -> Self {
        Self {
            prefix_items,
            rest: None,
            min_items: None,
            max_items: None,
        }
    }

    /// Schema describing position `index`, if the tuple can have one there.
    pub fn position(&self, index: usize) -> Option<&S> {
        self.prefix_items
            .get(index)
            .or_else(|| self.rest.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AdditionalProperties<S = Schema> {
    /// Keyword not present.
    Absent,
    /// `additionalProperties: false`
    Forbidden,
    /// `additionalProperties: true`
    Allowed,
    /// Map-valued object.
    Schema(Box<S>),
}

impl<S> AdditionalProperties<S> {
    /// `true` or a schema: the object explicitly accepts undeclared keys.
    pub fn is_open(&self) -> bool {
        matches!(
            self,
            AdditionalProperties::Allowed | AdditionalProperties::Schema(_)
        )
    }

    /// Whether undeclared keys may appear in a conforming value at all.
    pub fn admits_extra_keys(&self) -> bool {
        !matches!(self, AdditionalProperties::Forbidden)
    }

    pub fn schema(&self) -> Option<&S> {
        match self {
            AdditionalProperties::Schema(schema) => Some(schema),
            _ => None,
        }
    }
}

impl<S> Default for AdditionalProperties<S> {
    fn default() -> Self {
        AdditionalProperties::Absent
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectSchema<S = Schema> {
    pub properties: BTreeMap<String, S>,
    pub required: BTreeSet<String>,
    pub additional_properties: AdditionalProperties<S>,
}

impl<S> ObjectSchema<S> {
    pub fn new() -> Self {
        Self {
            properties: BTreeMap::new(),
            required: BTreeSet::new(),
            additional_properties: AdditionalProperties::Absent,
        }
    }

    pub fn property(mut self, name: impl Into<String>, schema: S, required: bool) -> Self {
        let name = name.into();
        if required {
            self.required.insert(name.clone());
        }
        self.properties.insert(name, schema);
        self
    }

    pub fn is_required(&self, name: &str) -> bool {
        self.required.contains(name)
    }
}

impl<S> Default for ObjectSchema<S> {
    fn default() -> Self {
        Self::new()
    }
}

/// Tag property plus tag value to reference-name map.
#[derive(Debug, Clone, PartialEq)]
pub struct Discriminator {
    pub property_name: String,
    pub mapping: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OneOfSchema<S = Schema> {
    pub branches: Vec<S>,
    pub discriminator: Option<Discriminator>,
}

impl<S> OneOfSchema<S> {
    pub fn new(branches: Vec<S>) -> Self {
        Self {
            branches,
            discriminator: None,
        }
    }
}

impl Schema {
    pub fn new(kind: SchemaKind) -> Self {
        Self {
            meta: Meta::default(),
            kind,
        }
    }

    pub fn unknown() -> Self {
        Self::new(SchemaKind::Unknown)
    }

    pub fn null() -> Self {
        Self::new(SchemaKind::Null)
    }

    pub fn boolean() -> Self {
        Self::new(SchemaKind::Boolean)
    }

    pub fn integer() -> Self {
        Self::new(SchemaKind::Integer(NumberSchema::default()))
    }

    pub fn number() -> Self {
        Self::new(SchemaKind::Number(NumberSchema::default()))
    }

    pub fn string() -> Self {
        Self::new(SchemaKind::String(StringSchema::default()))
    }

    pub fn array(items: Schema) -> Self {
        Self::new(SchemaKind::Array(ArraySchema::new(items)))
    }

    pub fn tuple(prefix_items: Vec<Schema>) -> Self {
        Self::new(SchemaKind::Tuple(TupleSchema::new(prefix_items)))
    }

    pub fn object(object: ObjectSchema) -> Self {
        Self::new(SchemaKind::Object(object))
    }

    pub fn reference(name: impl Into<String>) -> Self {
        Self::new(SchemaKind::Reference(name.into()))
    }

    pub fn one_of(branches: Vec<Schema>) -> Self {
        Self::new(SchemaKind::OneOf(OneOfSchema::new(branches)))
    }

    pub fn constant(value: impl Into<Value>) -> Self {
        Self::new(SchemaKind::Constant(value.into()))
    }

    /// `self | null`, with the annotations moved to the union.
    pub fn nullable(mut self) -> Self {
        let meta = std::mem::take(&mut self.meta);
        Schema {
            meta,
            kind: SchemaKind::OneOf(OneOfSchema::new(vec![self, Schema::null()])),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.meta.title = Some(title.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.meta.description = Some(description.into());
        self
    }

    /// `null` or `const null`.
    pub fn is_null(&self) -> bool {
        matches!(
            self.kind,
            SchemaKind::Null | SchemaKind::Constant(Value::Null)
        )
    }
}
