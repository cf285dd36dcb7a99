//! Subcommands. Each exposes an `Args` struct and `run(...) -> i32`.

pub mod convert;
pub mod covers;
pub mod dialects;
pub mod invert;
pub mod separate;

use crate::error::CliError;
use serde_json::Value;
use std::io::{Read, Write};
use std::path::Path;
use toolschema::Dialect;
use toolschema_ir::Document;

/// Reads JSON from a file, or stdin for `-`.
pub(crate) fn read_json(path: &Path) -> Result<Value, CliError> {
    let name = path.display().to_string();
    let io_error = |source| CliError::Io {
        path: name.clone(),
        source,
    };
    let content = if name == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .map_err(io_error)?;
        buffer
    } else {
        std::fs::read_to_string(path).map_err(io_error)?
    };
    serde_json::from_str(&content).map_err(|source| CliError::Json { path: name, source })
}

/// Reads a canonical document (or a bare schema).
pub(crate) fn read_document(path: &Path) -> Result<Document, CliError> {
    let value = read_json(path)?;
    Document::from_json(&value).map_err(|source| CliError::Schema {
        path: path.display().to_string(),
        source,
    })
}

pub(crate) fn find_dialect(name: &str) -> Result<&'static Dialect, CliError> {
    toolschema::dialect(name).ok_or_else(|| CliError::UnknownDialect {
        name: name.to_string(),
        available: toolschema::dialect_names().join(", "),
    })
}

/// Writes pretty JSON to `output`, or stdout if not given.
pub(crate) fn write_json(value: &Value, output: Option<&Path>) -> Result<(), CliError> {
    let text = serde_json::to_string_pretty(value)?;
    match output {
        Some(path) => std::fs::write(path, format!("{text}\n")).map_err(|source| CliError::Write {
            path: path.display().to_string(),
            source,
        }),
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{text}").map_err(|source| CliError::Write {
                path: "stdout".to_string(),
                source,
            })
        }
    }
}

/// Prints the error and maps it to exit code 1.
pub(crate) fn exit_code(result: Result<i32, CliError>) -> i32 {
    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e}");
            1
        }
    }
}
