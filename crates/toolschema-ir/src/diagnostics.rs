//! Located failure reasons.

use crate::Accessor;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasonKind {
    /// Valid schema the target dialect cannot express.
    UnconvertibleConstruct,
    /// Reference to a name missing from the components table.
    DanglingReference,
    /// Internally inconsistent or unreadable schema.
    Malformed,
}

/// One problem, with where it was found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reason {
    pub accessor: String,
    pub kind: ReasonKind,
    pub reason: String,
}

impl std::fmt::Display for Reason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.accessor, self.reason)
    }
}

/// Accumulates reasons across a whole traversal.
///
/// The same reason reported twice at the same location is kept once.
#[derive(Debug, Default)]
pub struct Diagnostics {
    reasons: Vec<Reason>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&mut self, accessor: &Accessor, kind: ReasonKind, reason: impl Into<String>) {
        let reason = Reason {
            accessor: accessor.to_string(),
            kind,
            reason: reason.into(),
        };
        if !self.reasons.contains(&reason) {
            self.reasons.push(reason);
        }
    }

    pub fn unconvertible(&mut self, accessor: &Accessor, reason: impl Into<String>) {
        self.report(accessor, ReasonKind::UnconvertibleConstruct, reason);
    }

    pub fn dangling(&mut self, accessor: &Accessor, name: &str) {
        self.report(
            accessor,
            ReasonKind::DanglingReference,
            format!("unable to find reference type \"{name}\""),
        );
    }

    pub fn malformed(&mut self, accessor: &Accessor, reason: impl Into<String>) {
        self.report(accessor, ReasonKind::Malformed, reason);
    }

    pub fn is_empty(&self) -> bool {
        self.reasons.is_empty()
    }

    pub fn len(&self) -> usize {
        self.reasons.len()
    }

    pub fn reasons(&self) -> &[Reason] {
        &self.reasons
    }

    pub fn into_reasons(self) -> Vec<Reason> {
        self.reasons
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicates_are_collapsed() {
        let mut diagnostics = Diagnostics::new();
        let at = Accessor::input().property("a");
        diagnostics.dangling(&at, "Missing");
        diagnostics.dangling(&at, "Missing");
        diagnostics.dangling(&Accessor::input(), "Missing");
        assert_eq!(diagnostics.len(), 2);
        assert_eq!(
            diagnostics.reasons()[0].reason,
            "unable to find reference type \"Missing\""
        );
    }

    #[test]
    fn reason_serializes_with_snake_case_kind() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.unconvertible(&Accessor::input(), "tuple is not supported");
        let json = serde_json::to_value(&diagnostics.reasons()[0]).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "accessor": "$input",
                "kind": "unconvertible_construct",
                "reason": "tuple is not supported"
            })
        );
    }
}
