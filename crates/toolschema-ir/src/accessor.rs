//! Location strings for diagnostics.
//!
//! An accessor names a node by the path taken from the root parameter
//! (`$input`) or from a named definition (`$defs["Name"]`).

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Accessor(String);

impl Accessor {
    /// The root of the schema being converted.
    pub fn input() -> Self {
        Accessor("$input".to_string())
    }

    /// The root of a named definition.
    pub fn definition(name: &str) -> Self {
        Accessor(format!("$defs[{}]", quote(name)))
    }

    pub fn property(&self, name: &str) -> Self {
        self.push(format_args!(".properties[{}]", quote(name)))
    }

    pub fn items(&self) -> Self {
        self.push(format_args!(".items"))
    }

    pub fn prefix_item(&self, index: usize) -> Self {
        self.push(format_args!(".prefixItems[{index}]"))
    }

    pub fn additional_properties(&self) -> Self {
        self.push(format_args!(".additionalProperties"))
    }

    pub fn branch(&self, index: usize) -> Self {
        self.push(format_args!(".oneOf[{index}]"))
    }

    pub fn mapping(&self, value: &str) -> Self {
        self.push(format_args!(".discriminator.mapping[{}]", quote(value)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn push(&self, segment: fmt::Arguments<'_>) -> Self {
        Accessor(format!("{}{}", self.0, segment))
    }
}

impl fmt::Display for Accessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Accessor> for String {
    fn from(accessor: Accessor) -> Self {
        accessor.0
    }
}

/// JSON string literal, so keys with quotes or brackets stay unambiguous.
fn quote(key: &str) -> String {
    serde_json::Value::String(key.to_string()).to_string()
}
