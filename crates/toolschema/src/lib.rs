//! Tool-calling schemas across LLM providers and OpenAPI.
//!
//! `toolschema` converts a dialect-neutral schema (see [`toolschema_ir`]) into
//! the restricted JSON Schema dialect each provider accepts, and back.
//!
//! # Architecture
//!
//! ```text
//! Canonical IR           Engine                 Dialects
//! ─────────────     ─────────────────     ─────────────────
//!                    convert ──────────┐   openai, claude,
//! Schema ───────────┤                  ├─> gemini, llama,
//! + Components       invert <──────────┘   openapi-3.0/3.1
//!                    covers, separate
//! ```
//!
//! Every dialect is a static [`Dialect`] record; one traversal handles all of
//! them.
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use toolschema::{ConvertOptions, OPENAI, convert};
//! use toolschema_ir::{Components, ObjectSchema, Schema};
//!
//! let schema = Schema::object(
//!     ObjectSchema::new()
//!         .property("city", Schema::string(), true)
//!         .property("days", Schema::integer().nullable(), true),
//! );
//! let document = convert(&schema, &Components::new(), &OPENAI, &ConvertOptions::default()).unwrap();
//! assert_eq!(
//!     document.to_json(&OPENAI)["properties"]["days"],
//!     json!({"anyOf": [{"type": "integer"}, {"type": "null"}]})
//! );
//! ```
//!
//! # Using the Dialect Registry
//!
//! ```
//! for name in toolschema::dialect_names() {
//!     assert!(toolschema::dialect(name).is_some());
//! }
//! ```

mod convert;
mod covers;
mod dialect;
mod error;
mod invert;
mod options;
mod separate;

pub use convert::{convert, convert_document, convert_parameters, nullable_name};
pub use covers::covers;
pub use dialect::{
    CLAUDE, DefsLocation, DescriptionMode, Defs, Dialect, DialectDocument, DialectKind,
    DialectSchema, EnumSchema, GEMINI, LLAMA, NullPosition, NullableStyle, OPENAI, OPENAPI_3_0,
    OPENAPI_3_1, Primitive, References, UnionKeyword, dialect, dialect_names, dialects,
    register_dialect,
};
pub use error::{ConversionReport, ConvertError, MergeError};
pub use invert::{invert, invert_components, invert_document};
pub use options::{ConvertOptions, RecursionOverflow};
pub use separate::{
    Separated, content_media_type_in, has_content_media_type, merge_positional, merge_values,
    separate, separate_positional,
};
