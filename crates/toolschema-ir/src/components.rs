//! Named schemas and the documents that carry them.

use crate::{Schema, SchemaKind};
use std::collections::BTreeMap;

/// Table of named schemas that [`SchemaKind::Reference`] points into.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Components {
    pub schemas: BTreeMap<String, Schema>,
}

impl Components {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, schema: Schema) -> Self {
        self.insert(name, schema);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, schema: Schema) -> Option<Schema> {
        self.schemas.insert(name.into(), schema)
    }

    pub fn get(&self, name: &str) -> Option<&Schema> {
        self.schemas.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.schemas.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Schema)> {
        self.schemas.iter().map(|(name, schema)| (name.as_str(), schema))
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Follows references until a non-reference node.
    ///
    /// Returns `None` for a dangling name or a cycle made only of references.
    pub fn resolve<'a>(&'a self, mut schema: &'a Schema) -> Option<&'a Schema> {
        let mut seen: Vec<&str> = Vec::new();
        while let SchemaKind::Reference(name) = &schema.kind {
            if seen.contains(&name.as_str()) {
                return None;
            }
            seen.push(name);
            schema = self.get(name)?;
        }
        Some(schema)
    }
}

/// A root schema plus the components its references resolve through.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub components: Components,
    pub schema: Schema,
}

impl Document {
    pub fn new(schema: Schema, components: Components) -> Self {
        Self { components, schema }
    }
}
