//! Dialect schema nodes.

use serde_json::Value;
use std::collections::BTreeMap;
use toolschema_ir::{
    ArraySchema, Meta, NumberSchema, ObjectSchema, OneOfSchema, StringSchema, TupleSchema,
};

/// Scalar type of an `enum` node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    Boolean,
    Integer,
    Number,
    String,
}

impl Primitive {
    pub fn type_name(self) -> &'static str {
        match self {
            Primitive::Boolean => "boolean",
            Primitive::Integer => "integer",
            Primitive::Number => "number",
            Primitive::String => "string",
        }
    }

    /// Primitive of a single JSON value; `None` for null, arrays and objects.
    pub fn of(value: &Value) -> Option<Primitive> {
        match value {
            Value::Bool(_) => Some(Primitive::Boolean),
            Value::Number(n) if n.is_i64() || n.is_u64() => Some(Primitive::Integer),
            Value::Number(n) if n.as_f64().is_some_and(|f| f.fract() == 0.0) => {
                Some(Primitive::Integer)
            }
            Value::Number(_) => Some(Primitive::Number),
            Value::String(_) => Some(Primitive::String),
            _ => None,
        }
    }

    /// Common primitive of a set of values. Integers widen to numbers.
    pub fn common<'a>(values: impl IntoIterator<Item = &'a Value>) -> Option<Primitive> {
        let mut common: Option<Primitive> = None;
        for value in values {
            let primitive = Primitive::of(value)?;
            common = Some(match (common, primitive) {
                (None, p) => p,
                (Some(a), b) if a == b => a,
                (Some(Primitive::Integer | Primitive::Number), Primitive::Integer | Primitive::Number) => {
                    Primitive::Number
                }
                _ => return None,
            });
        }
        common
    }
}

/// `{type, enum: [...]}`
#[derive(Debug, Clone, PartialEq)]
pub struct EnumSchema {
    pub primitive: Primitive,
    pub values: Vec<Value>,
}

/// A schema node as one dialect spells it.
#[derive(Debug, Clone, PartialEq)]
pub struct DialectSchema {
    pub meta: Meta,
    /// `nullable: true`; only set on dialects using the flag style.
    pub nullable: bool,
    pub kind: DialectKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DialectKind {
    Unknown,
    Null,
    Boolean,
    Integer(NumberSchema),
    Number(NumberSchema),
    String(StringSchema),
    Enum(EnumSchema),
    Constant(Value),
    Array(ArraySchema<DialectSchema>),
    Tuple(TupleSchema<DialectSchema>),
    Object(ObjectSchema<DialectSchema>),
    /// Name in the document's definitions.
    Reference(String),
    Union(OneOfSchema<DialectSchema>),
}

/// Named definitions emitted alongside a root schema.
pub type Defs = BTreeMap<String, DialectSchema>;

impl DialectSchema {
    pub fn new(kind: DialectKind) -> Self {
        Self {
            meta: Meta::default(),
            nullable: false,
            kind,
        }
    }

    pub fn with_meta(mut self, meta: Meta) -> Self {
        self.meta = meta;
        self
    }

    pub fn is_null(&self) -> bool {
        matches!(
            self.kind,
            DialectKind::Null | DialectKind::Constant(Value::Null)
        )
    }

    /// Whether `null` conforms without following references.
    pub fn accepts_null(&self) -> bool {
        self.nullable
            || match &self.kind {
                DialectKind::Unknown | DialectKind::Null => true,
                DialectKind::Constant(value) => value.is_null(),
                DialectKind::Enum(e) => e.values.iter().any(Value::is_null),
                DialectKind::Union(union) => union.branches.iter().any(DialectSchema::accepts_null),
                _ => false,
            }
    }

    pub fn as_object(&self) -> Option<&ObjectSchema<DialectSchema>> {
        match &self.kind {
            DialectKind::Object(object) => Some(object),
            _ => None,
        }
    }
}

/// A converted root schema plus the definitions it references.
#[derive(Debug, Clone, PartialEq)]
pub struct DialectDocument {
    pub schema: DialectSchema,
    pub defs: Defs,
}

impl DialectDocument {
    pub fn new(schema: DialectSchema, defs: Defs) -> Self {
        Self { schema, defs }
    }

    /// Follows references through `defs` to a non-reference node.
    pub fn resolve<'a>(&'a self, schema: &'a DialectSchema) -> Option<&'a DialectSchema> {
        resolve(&self.defs, schema)
    }
}

pub(crate) fn resolve<'a>(defs: &'a Defs, mut schema: &'a DialectSchema) -> Option<&'a DialectSchema> {
    let mut seen: Vec<&str> = Vec::new();
    while let DialectKind::Reference(name) = &schema.kind {
        if seen.contains(&name.as_str()) {
            return None;
        }
        seen.push(name);
        schema = defs.get(name)?;
    }
    Some(schema)
}
