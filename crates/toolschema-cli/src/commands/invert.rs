//! Invert command - dialect document back to canonical form.

use super::{exit_code, find_dialect, read_document, read_json, write_json};
use crate::config::ToolschemaConfig;
use crate::error::CliError;
use clap::Args;
use std::path::PathBuf;
use toolschema::{DialectDocument, invert_document};
use toolschema_ir::Components;

#[derive(Args)]
pub struct InvertArgs {
    /// Document in the dialect's layout, use - for stdin
    pub input: PathBuf,

    /// Dialect the input is written in
    #[arg(short, long)]
    pub dialect: Option<String>,

    /// Canonical document whose components references may still name
    #[arg(long)]
    pub components: Option<PathBuf>,

    /// Output file (stdout if not specified)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn run(args: InvertArgs, config: &ToolschemaConfig) -> i32 {
    exit_code(invert(&args, config))
}

fn invert(args: &InvertArgs, config: &ToolschemaConfig) -> Result<i32, CliError> {
    let dialect = find_dialect(config.dialect_name(args.dialect.as_deref()))?;
    let value = read_json(&args.input)?;
    let document =
        DialectDocument::from_json(&value, dialect).map_err(|source| CliError::Schema {
            path: args.input.display().to_string(),
            source,
        })?;
    let components = match &args.components {
        Some(path) => read_document(path)?.components,
        None => Components::new(),
    };

    let inverted = invert_document(&document, &components);
    write_json(&inverted.to_json(), args.output.as_deref())?;
    Ok(0)
}
