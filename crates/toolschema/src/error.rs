//! Error and report types.

use serde::Serialize;
use serde_json::Value;
use toolschema_ir::Reason;

/// A failed conversion with every independent reason found.
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
#[error("{message}")]
pub struct ConvertError {
    pub message: String,
    pub reasons: Vec<Reason>,
}

impl ConvertError {
    pub(crate) fn new(dialect: &str, reasons: Vec<Reason>) -> Self {
        let message = match reasons.len() {
            1 => format!("failed to convert schema to {dialect}: {}", reasons[0]),
            n => format!("failed to convert schema to {dialect}: {n} errors"),
        };
        Self { message, reasons }
    }
}

/// Serializable success/failure envelope for a conversion.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ConversionReport {
    Success { success: bool, value: Value },
    Failure { success: bool, error: ConvertError },
}

impl ConversionReport {
    pub fn success(value: Value) -> Self {
        ConversionReport::Success {
            success: true,
            value,
        }
    }

    pub fn failure(error: ConvertError) -> Self {
        ConversionReport::Failure {
            success: false,
            error,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ConversionReport::Success { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MergeError {
    #[error(
        "argument count mismatch: expected {expected}, got {llm} from the model and {human} from the caller"
    )]
    LengthMismatch {
        expected: usize,
        llm: usize,
        human: usize,
    },
}
