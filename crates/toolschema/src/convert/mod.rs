//! IR to dialect schema conversion.
//!
//! One recursive traversal serves every dialect; all dialect differences come
//! from the [`Dialect`] record. Problems are collected per subtree and the
//! traversal always continues into siblings, so a failed conversion lists
//! every independent offending location.

mod object;
mod reference;
mod union;

use crate::dialect::{
    Defs, Dialect, DialectDocument, DialectKind, DialectSchema, NullPosition, NullableStyle,
};
use crate::error::ConvertError;
use crate::options::{ConvertOptions, Resolved};
use std::collections::{BTreeSet, HashSet};
use toolschema_ir::{
    Accessor, Components, Diagnostics, Document, OneOfSchema, Schema, SchemaKind,
};

/// Converts an arbitrary schema.
pub fn convert(
    schema: &Schema,
    components: &Components,
    dialect: &Dialect,
    options: &ConvertOptions,
) -> Result<DialectDocument, ConvertError> {
    let mut converter = Converter::new(components, dialect, options);
    let root = converter.schema(schema, &Accessor::input());
    converter.finish(root)
}

/// Converts a tool parameter schema.
///
/// The root must be an object, directly or through references; a root
/// reference is inlined so the result is always an object schema.
pub fn convert_parameters(
    schema: &Schema,
    components: &Components,
    dialect: &Dialect,
    options: &ConvertOptions,
) -> Result<DialectDocument, ConvertError> {
    let mut converter = Converter::new(components, dialect, options);
    let at = Accessor::input();

    let root = match &schema.kind {
        SchemaKind::Object(_) => converter.schema(schema, &at),
        SchemaKind::Reference(name) if !components.contains(name) => {
            converter.diagnostics.dangling(&at, name);
            DialectSchema::new(DialectKind::Unknown)
        }
        _ => match components.resolve(schema) {
            Some(resolved) if matches!(resolved.kind, SchemaKind::Object(_)) => {
                let inlined = Schema {
                    meta: schema.meta.clone().or(&resolved.meta),
                    kind: resolved.kind.clone(),
                };
                converter.schema(&inlined, &at)
            }
            Some(other) => {
                converter.diagnostics.unconvertible(
                    &at,
                    format!("parameters must be an object, found {}", other.kind.name()),
                );
                DialectSchema::new(DialectKind::Unknown)
            }
            None => {
                converter
                    .diagnostics
                    .malformed(&at, "parameter schema is a cycle of references");
                DialectSchema::new(DialectKind::Unknown)
            }
        },
    };
    converter.finish(root)
}

/// [`convert`] over a whole document.
pub fn convert_document(
    document: &Document,
    dialect: &Dialect,
    options: &ConvertOptions,
) -> Result<DialectDocument, ConvertError> {
    convert(&document.schema, &document.components, dialect, options)
}

/// State of one traversal.
pub(crate) struct Converter<'a> {
    pub(crate) components: &'a Components,
    pub(crate) dialect: &'a Dialect,
    pub(crate) options: Resolved,
    pub(crate) defs: Defs,
    /// Definitions already materialized or being materialized.
    pub(crate) materialized: HashSet<String>,
    /// Inline dialects: reference names on the current expansion path.
    pub(crate) expanding: Vec<String>,
    /// Flag dialects: definitions that need a `Name.Nullable` variant.
    pub(crate) nullable_defs: BTreeSet<String>,
    pub(crate) diagnostics: Diagnostics,
}

impl<'a> Converter<'a> {
    pub(crate) fn new(
        components: &'a Components,
        dialect: &'a Dialect,
        options: &ConvertOptions,
    ) -> Self {
        Self {
            components,
            dialect,
            options: Resolved::new(options, dialect),
            defs: Defs::new(),
            materialized: HashSet::new(),
            expanding: Vec::new(),
            nullable_defs: BTreeSet::new(),
            diagnostics: Diagnostics::new(),
        }
    }

    pub(crate) fn finish(mut self, root: DialectSchema) -> Result<DialectDocument, ConvertError> {
        if !self.diagnostics.is_empty() {
            tracing::debug!(
                dialect = self.dialect.name,
                errors = self.diagnostics.len(),
                "conversion failed"
            );
            return Err(ConvertError::new(
                self.dialect.name,
                self.diagnostics.into_reasons(),
            ));
        }
        self.synthesize_nullable_defs();
        tracing::debug!(
            dialect = self.dialect.name,
            defs = self.defs.len(),
            strict = self.options.strict,
            "converted schema"
        );
        Ok(DialectDocument::new(root, self.defs))
    }

    /// Converts one node. Always yields a node; failures are recorded in
    /// the diagnostics and leave a placeholder.
    pub(crate) fn schema(&mut self, schema: &Schema, at: &Accessor) -> DialectSchema {
        let kind = match &schema.kind {
            SchemaKind::Reference(name) => return self.reference(name, &schema.meta, at),
            SchemaKind::OneOf(union) => return self.one_of(union, &schema.meta, at),
            SchemaKind::Unknown => DialectKind::Unknown,
            SchemaKind::Boolean => DialectKind::Boolean,
            SchemaKind::Null => self.null(at),
            SchemaKind::Integer(number) => DialectKind::Integer(self.number(number, at)),
            SchemaKind::Number(number) => DialectKind::Number(self.number(number, at)),
            SchemaKind::String(string) => DialectKind::String(self.string(string, at)),
            SchemaKind::Constant(value) => self.constant(value, at),
            SchemaKind::Array(array) => self.array(array, at),
            SchemaKind::Tuple(tuple) => self.tuple(tuple, at),
            SchemaKind::Object(object) => self.object(object, at),
        };
        DialectSchema::new(kind).with_meta(schema.meta.clone())
    }

    /// `null` on its own.
    pub(crate) fn null(&mut self, at: &Accessor) -> DialectKind {
        if self.dialect.nullable_flag() {
            self.diagnostics.unconvertible(
                at,
                format!("{} cannot express a standalone null", self.dialect.name),
            );
            DialectKind::Unknown
        } else {
            DialectKind::Null
        }
    }

    /// Widens a converted node to also accept `null`, in the dialect's style.
    pub(crate) fn make_nullable(&mut self, mut schema: DialectSchema) -> DialectSchema {
        if schema.accepts_null() {
            return schema;
        }
        match self.dialect.nullable {
            NullableStyle::Flag => {
                if let DialectKind::Reference(name) = &schema.kind {
                    let name = name.clone();
                    schema.kind = DialectKind::Reference(nullable_name(&name));
                    self.nullable_defs.insert(name);
                } else {
                    schema.nullable = true;
                }
                schema
            }
            NullableStyle::Union(position) => {
                let null = DialectSchema::new(DialectKind::Null);
                match &mut schema.kind {
                    DialectKind::Union(union) if union.discriminator.is_none() => {
                        match position {
                            NullPosition::First => union.branches.insert(0, null),
                            NullPosition::Last => union.branches.push(null),
                        }
                        schema
                    }
                    _ => {
                        let meta = std::mem::take(&mut schema.meta);
                        let branches = match position {
                            NullPosition::First => vec![null, schema],
                            NullPosition::Last => vec![schema, null],
                        };
                        DialectSchema::new(DialectKind::Union(OneOfSchema::new(branches)))
                            .with_meta(meta)
                    }
                }
            }
        }
    }

    /// Adds `Name.Nullable` for every name a flag dialect referenced as nullable.
    fn synthesize_nullable_defs(&mut self) {
        while let Some(name) = self.nullable_defs.pop_first() {
            let synthetic = nullable_name(&name);
            if self.defs.contains_key(&synthetic) {
                continue;
            }
            let Some(base) = self.defs.get(&name).cloned() else {
                continue;
            };
            let nullable = self.make_nullable(base);
            tracing::trace!(name = %synthetic, "synthesized nullable definition");
            self.defs.insert(synthetic, nullable);
        }
    }
}

/// Name of the synthesized nullable variant of a definition.
pub fn nullable_name(name: &str) -> String {
    format!("{name}.Nullable")
}
