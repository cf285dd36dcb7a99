//! Dialect capability profiles.
//!
//! A [`Dialect`] is a static record of what one target vocabulary can express.
//! The converter, inverter and emitter all read the same record; there is no
//! per-dialect code path.

mod emit;
mod read;
mod registry;
mod schema;

pub use registry::{dialect, dialect_names, dialects, register_dialect};
pub use schema::{Defs, DialectDocument, DialectKind, DialectSchema, EnumSchema, Primitive};

use serde::Serialize;

/// How named schemas are carried in the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum References {
    /// Named definitions plus `$ref` nodes.
    Defs,
    /// No references at all; every use site is expanded.
    Inline,
}

/// Where named definitions live and how `$ref` spells them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DefsLocation {
    /// `$defs` beside the root schema.
    Defs,
    /// `{components: {schemas}}` beside the root schema.
    Components,
}

impl DefsLocation {
    pub fn ref_prefix(self) -> &'static str {
        match self {
            DefsLocation::Defs => "#/$defs/",
            DefsLocation::Components => "#/components/schemas/",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum UnionKeyword {
    OneOf,
    AnyOf,
}

impl UnionKeyword {
    pub fn keyword(self) -> &'static str {
        match self {
            UnionKeyword::OneOf => "oneOf",
            UnionKeyword::AnyOf => "anyOf",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum NullPosition {
    First,
    Last,
}

/// How `T | null` is spelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum NullableStyle {
    /// `nullable: true` beside `T`.
    Flag,
    /// A union with an explicit `{type: null}` branch.
    Union(NullPosition),
}

/// Where documentation of a referenced definition ends up.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, serde::Deserialize, schemars::JsonSchema,
)]
#[serde(rename_all = "kebab-case")]
pub enum DescriptionMode {
    /// Definition docs are repeated at every use site.
    Expand,
    /// Definition docs stay on the definition only.
    Compact,
}

/// Capability record for one target vocabulary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dialect {
    pub name: &'static str,
    pub description: &'static str,
    pub references: References,
    pub defs_location: DefsLocation,
    pub tuples: bool,
    pub open_objects: bool,
    pub unions: UnionKeyword,
    pub nullable: NullableStyle,
    pub discriminator: bool,
    pub constants: bool,
    /// Strict mode when the caller does not choose.
    pub strict: bool,
    pub descriptions: DescriptionMode,
}

impl Dialect {
    pub fn inline_references(&self) -> bool {
        self.references == References::Inline
    }

    pub fn nullable_flag(&self) -> bool {
        self.nullable == NullableStyle::Flag
    }
}

pub static OPENAI: Dialect = Dialect {
    name: "openai",
    description: "OpenAI function calling (structured outputs subset)",
    references: References::Defs,
    defs_location: DefsLocation::Defs,
    tuples: false,
    open_objects: false,
    unions: UnionKeyword::AnyOf,
    nullable: NullableStyle::Union(NullPosition::Last),
    discriminator: false,
    constants: true,
    strict: false,
    descriptions: DescriptionMode::Expand,
};

pub static CLAUDE: Dialect = Dialect {
    name: "claude",
    description: "Anthropic tool use input_schema",
    references: References::Defs,
    defs_location: DefsLocation::Defs,
    tuples: false,
    open_objects: true,
    unions: UnionKeyword::OneOf,
    nullable: NullableStyle::Union(NullPosition::First),
    discriminator: false,
    constants: true,
    strict: false,
    descriptions: DescriptionMode::Compact,
};

pub static GEMINI: Dialect = Dialect {
    name: "gemini",
    description: "Google Gemini function declarations (OpenAPI 3.0 subset, no references)",
    references: References::Inline,
    defs_location: DefsLocation::Defs,
    tuples: false,
    open_objects: false,
    unions: UnionKeyword::AnyOf,
    nullable: NullableStyle::Flag,
    discriminator: false,
    constants: false,
    strict: false,
    descriptions: DescriptionMode::Expand,
};

pub static LLAMA: Dialect = Dialect {
    name: "llama",
    description: "Llama-family tool calling (JSON Schema subset)",
    references: References::Defs,
    defs_location: DefsLocation::Defs,
    tuples: false,
    open_objects: true,
    unions: UnionKeyword::OneOf,
    nullable: NullableStyle::Union(NullPosition::First),
    discriminator: false,
    constants: true,
    strict: false,
    descriptions: DescriptionMode::Expand,
};

pub static OPENAPI_3_0: Dialect = Dialect {
    name: "openapi-3.0",
    description: "OpenAPI 3.0 schema object",
    references: References::Defs,
    defs_location: DefsLocation::Components,
    tuples: false,
    open_objects: true,
    unions: UnionKeyword::OneOf,
    nullable: NullableStyle::Flag,
    discriminator: true,
    constants: false,
    strict: false,
    descriptions: DescriptionMode::Compact,
};

pub static OPENAPI_3_1: Dialect = Dialect {
    name: "openapi-3.1",
    description: "OpenAPI 3.1 schema object (JSON Schema 2020-12)",
    references: References::Defs,
    defs_location: DefsLocation::Components,
    tuples: true,
    open_objects: true,
    unions: UnionKeyword::OneOf,
    nullable: NullableStyle::Union(NullPosition::First),
    discriminator: true,
    constants: true,
    strict: false,
    descriptions: DescriptionMode::Compact,
};
