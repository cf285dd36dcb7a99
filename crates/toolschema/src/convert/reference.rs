//! References: definition materialization and inline expansion.

use super::Converter;
use crate::dialect::{DescriptionMode, DialectKind, DialectSchema};
use crate::options::RecursionOverflow;
use toolschema_ir::schema::join_documentation;
use toolschema_ir::{AdditionalProperties, Accessor, ArraySchema, Meta, ObjectSchema, SchemaKind};

impl Converter<'_> {
    pub(super) fn reference(&mut self, name: &str, meta: &Meta, at: &Accessor) -> DialectSchema {
        if !self.components.contains(name) {
            self.diagnostics.dangling(at, name);
            return DialectSchema::new(DialectKind::Unknown).with_meta(meta.clone());
        }
        if self.dialect.inline_references() {
            return self.expand(name, meta, at);
        }

        self.materialize(name, at);
        let meta = match self.options.descriptions {
            DescriptionMode::Compact => meta.clone(),
            DescriptionMode::Expand => self.expanded_meta(name, meta),
        };
        DialectSchema::new(DialectKind::Reference(name.to_string())).with_meta(meta)
    }

    /// Converts a component into the definitions once.
    ///
    /// Problems inside a definition are reported under the accessor of its
    /// first use, once however often it is referenced.
    fn materialize(&mut self, name: &str, at: &Accessor) {
        if !self.materialized.insert(name.to_string()) {
            return;
        }
        let Some(definition) = self.components.get(name) else {
            return;
        };
        tracing::trace!(name, "materializing definition");
        let converted = self.schema(definition, at);
        self.defs.insert(name.to_string(), converted);
    }

    /// Use-site annotations followed by the docs of every definition the
    /// reference passes through.
    fn expanded_meta(&self, name: &str, meta: &Meta) -> Meta {
        let mut chain: Vec<&str> = Vec::new();
        let mut docs: Vec<Option<&str>> = vec![meta.description.as_deref()];
        let mut current = name;
        while let Some(definition) = self.components.get(current) {
            if chain.contains(&current) {
                break;
            }
            chain.push(current);
            docs.push(definition.meta.title.as_deref());
            docs.push(definition.meta.description.as_deref());
            match &definition.kind {
                SchemaKind::Reference(next) => current = next.as_str(),
                _ => break,
            }
        }
        Meta {
            description: join_documentation(docs),
            ..meta.clone()
        }
    }

    /// Inline dialects: replaces the reference with its converted definition.
    fn expand(&mut self, name: &str, meta: &Meta, at: &Accessor) -> DialectSchema {
        let depth = self.expanding.iter().filter(|n| *n == name).count();
        if depth >= self.options.recursion_depth {
            return self.overflow(name, meta, at);
        }
        let Some(definition) = self.components.get(name) else {
            return DialectSchema::new(DialectKind::Unknown);
        };

        self.expanding.push(name.to_string());
        let body = self.schema(definition, at);
        self.expanding.pop();

        let meta = match self.options.descriptions {
            DescriptionMode::Compact => meta.clone().or(&body.meta),
            DescriptionMode::Expand => Meta {
                description: join_documentation([
                    meta.description.as_deref(),
                    body.meta.title.as_deref(),
                    body.meta.description.as_deref(),
                ]),
                title: meta.title.clone(),
                ..meta.clone().or(&body.meta)
            },
        };
        body.with_meta(meta)
    }

    /// Past the unroll limit of a recursive reference.
    fn overflow(&mut self, name: &str, meta: &Meta, at: &Accessor) -> DialectSchema {
        let limit = self.options.recursion_depth;
        match self.options.recursion_overflow {
            RecursionOverflow::Error => {
                self.diagnostics.unconvertible(
                    at,
                    format!(
                        "recursive reference \"{name}\" exceeds the unroll limit of {limit} for {}",
                        self.dialect.name
                    ),
                );
                DialectSchema::new(DialectKind::Unknown)
            }
            RecursionOverflow::Stub => {
                tracing::trace!(name, limit, "substituting stub for recursive reference");
                let target = self
                    .components
                    .get(name)
                    .and_then(|definition| self.components.resolve(definition));
                let kind = match target.map(|schema| &schema.kind) {
                    Some(SchemaKind::Array(_)) => {
                        let mut array = ArraySchema::new(closed_object());
                        array.max_items = Some(0);
                        DialectKind::Array(array)
                    }
                    _ => closed_object().kind,
                };
                DialectSchema::new(kind).with_meta(meta.clone())
            }
        }
    }
}

fn closed_object() -> DialectSchema {
    let mut object = ObjectSchema::<DialectSchema>::new();
    object.additional_properties = AdditionalProperties::Forbidden;
    DialectSchema::new(DialectKind::Object(object))
}
