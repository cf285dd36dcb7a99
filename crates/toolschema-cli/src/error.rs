//! Errors surfaced by commands.

use toolschema_ir::ReadError;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{path} is not valid JSON: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("{path} is not a valid schema: {source}")]
    Schema {
        path: String,
        #[source]
        source: ReadError,
    },
    #[error("unknown dialect \"{name}\" (available: {available})")]
    UnknownDialect { name: String, available: String },
    #[error("failed to serialize output: {0}")]
    Serialize(#[from] serde_json::Error),
}
