//! Dialect-neutral schema IR.
//!
//! `toolschema-ir` holds the canonical description of structured data that every
//! dialect conversion starts from or ends at, plus the named-schema table
//! ([`Components`]) references resolve through.
//!
//! # Architecture
//!
//! ```text
//! JSON document            IR                    Consumers
//! ─────────────      ──────────────────      ─────────────────────
//! {components,  ─┐                        ┌─> dialect converter
//!  schema}       ├─> Document ────────────┼─> inverter
//! $defs / refs  ─┘   (Schema + Components)├─> covering checker
//!                                         └─> separator / merger
//! ```
//!
//! # Example
//!
//! ```
//! use toolschema_ir::{Document, SchemaKind};
//!
//! let document = Document::from_json(&serde_json::json!({
//!     "components": { "schemas": {
//!         "IPoint": {
//!             "type": "object",
//!             "properties": { "x": { "type": "number" }, "y": { "type": "number" } },
//!             "required": ["x", "y"]
//!         }
//!     }},
//!     "schema": { "$ref": "#/components/schemas/IPoint" }
//! }))
//! .unwrap();
//!
//! assert!(matches!(&document.schema.kind, SchemaKind::Reference(name) if name == "IPoint"));
//! assert!(document.components.get("IPoint").is_some());
//! ```

pub mod accessor;
pub mod components;
pub mod diagnostics;
pub mod json;
pub mod schema;
pub mod structure_eq;

pub use accessor::Accessor;
pub use components::{Components, Document};
pub use diagnostics::{Diagnostics, Reason, ReasonKind};
pub use json::{ReadError, number_value, reference_name, reference_path};
pub use schema::{
    AdditionalProperties, ArraySchema, Bound, Discriminator, Meta, NumberSchema, ObjectSchema,
    OneOfSchema, Schema, SchemaKind, StringSchema, TupleSchema,
};
pub use structure_eq::{StructureEq, structure_eq_in};
