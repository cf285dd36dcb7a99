//! Conversion options.

use crate::dialect::{DescriptionMode, Dialect};
use serde::{Deserialize, Serialize};

/// What to do when an inline-only dialect hits the unroll limit of a
/// recursive reference.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, schemars::JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum RecursionOverflow {
    /// Substitute an empty closed object (or an empty array).
    #[default]
    Stub,
    /// Report an unconvertible construct.
    Error,
}

/// Options for one conversion.
///
/// Unset fields fall back to the dialect's defaults.
///
/// Example config.toml:
/// ```toml
/// [convert]
/// strict = true                 # close every object, require every property
/// recursion_depth = 3           # inline dialects: unroll limit per reference
/// recursion_overflow = "stub"   # "stub" or "error"
/// descriptions = "expand"       # "expand" or "compact"
/// infer_discriminator = true
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize, schemars::JsonSchema)]
#[serde(default)]
pub struct ConvertOptions {
    /// Strict mode. Default: the dialect's choice
    pub strict: Option<bool>,
    /// Unroll limit for recursive references on inline dialects. Default: 3
    pub recursion_depth: Option<usize>,
    /// Behaviour past the unroll limit. Default: stub
    pub recursion_overflow: Option<RecursionOverflow>,
    /// Placement of definition docs. Default: the dialect's choice
    pub descriptions: Option<DescriptionMode>,
    /// Infer discriminators for unions of tagged objects. Default: true
    pub infer_discriminator: Option<bool>,
}

impl ConvertOptions {
    pub fn strict(&self, dialect: &Dialect) -> bool {
        self.strict.unwrap_or(dialect.strict)
    }

    pub fn recursion_depth(&self) -> usize {
        self.recursion_depth.unwrap_or(3)
    }

    pub fn recursion_overflow(&self) -> RecursionOverflow {
        self.recursion_overflow.unwrap_or_default()
    }

    pub fn descriptions(&self, dialect: &Dialect) -> DescriptionMode {
        self.descriptions.unwrap_or(dialect.descriptions)
    }

    pub fn infer_discriminator(&self) -> bool {
        self.infer_discriminator.unwrap_or(true)
    }

    /// Fields set in `other` win.
    pub fn merge(self, other: Self) -> Self {
        Self {
            strict: other.strict.or(self.strict),
            recursion_depth: other.recursion_depth.or(self.recursion_depth),
            recursion_overflow: other.recursion_overflow.or(self.recursion_overflow),
            descriptions: other.descriptions.or(self.descriptions),
            infer_discriminator: other.infer_discriminator.or(self.infer_discriminator),
        }
    }
}

/// Fully resolved options for one dialect.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Resolved {
    pub strict: bool,
    pub recursion_depth: usize,
    pub recursion_overflow: RecursionOverflow,
    pub descriptions: DescriptionMode,
    pub infer_discriminator: bool,
}

impl Resolved {
    pub fn new(options: &ConvertOptions, dialect: &Dialect) -> Self {
        Self {
            strict: options.strict(dialect),
            recursion_depth: options.recursion_depth(),
            recursion_overflow: options.recursion_overflow(),
            descriptions: options.descriptions(dialect),
            infer_discriminator: options.infer_discriminator(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{CLAUDE, OPENAI};

    #[test]
    fn unset_fields_use_dialect_defaults() {
        let options = ConvertOptions::default();
        assert!(!options.strict(&OPENAI));
        assert_eq!(options.descriptions(&OPENAI), DescriptionMode::Expand);
        assert_eq!(options.descriptions(&CLAUDE), DescriptionMode::Compact);
        assert_eq!(options.recursion_depth(), 3);
        assert!(options.infer_discriminator());
    }

    #[test]
    fn merge_later_wins() {
        let global = ConvertOptions {
            strict: Some(true),
            recursion_depth: Some(5),
            ..Default::default()
        };
        let project = ConvertOptions {
            recursion_depth: Some(2),
            descriptions: Some(DescriptionMode::Compact),
            ..Default::default()
        };
        let merged = global.merge(project);
        assert_eq!(merged.strict, Some(true));
        assert_eq!(merged.recursion_depth, Some(2));
        assert_eq!(merged.descriptions, Some(DescriptionMode::Compact));
        assert_eq!(merged.recursion_overflow, None);
    }

    #[test]
    fn deserializes_from_toml_style_json() {
        let options: ConvertOptions = serde_json::from_value(serde_json::json!({
            "recursion_overflow": "error",
            "descriptions": "compact"
        }))
        .unwrap();
        assert_eq!(options.recursion_overflow(), RecursionOverflow::Error);
        assert_eq!(options.descriptions, Some(DescriptionMode::Compact));
    }
}
