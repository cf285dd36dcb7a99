//! Separate command - split a tool's parameters between the model and the caller.

use super::{exit_code, find_dialect, read_document, write_json};
use crate::config::ToolschemaConfig;
use crate::error::CliError;
use clap::Args;
use serde_json::{Value, json};
use std::path::PathBuf;
use toolschema::{
    Dialect, DialectDocument, content_media_type_in, convert_parameters,
    has_content_media_type, separate,
};

#[derive(Args)]
pub struct SeparateArgs {
    /// Canonical parameter document, use - for stdin
    pub input: PathBuf,

    /// Target dialect (see `toolschema dialects`)
    #[arg(short, long)]
    pub dialect: Option<String>,

    /// Media type the caller supplies; repeatable. Default: any `contentMediaType`
    #[arg(long = "media-type", value_name = "TYPE")]
    pub media_types: Vec<String>,

    /// Output file (stdout if not specified)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn run(args: SeparateArgs, config: &ToolschemaConfig) -> i32 {
    exit_code(split(&args, config))
}

fn split(args: &SeparateArgs, config: &ToolschemaConfig) -> Result<i32, CliError> {
    let dialect = find_dialect(config.dialect_name(args.dialect.as_deref()))?;
    let document = read_document(&args.input)?;
    let converted = match convert_parameters(
        &document.schema,
        &document.components,
        dialect,
        &config.convert,
    ) {
        Ok(converted) => converted,
        Err(error) => {
            eprintln!("error: {error}");
            return Ok(1);
        }
    };

    let media_types = if args.media_types.is_empty() {
        config.separate.media_types.clone().unwrap_or_default()
    } else {
        args.media_types.clone()
    };
    let separated = if media_types.is_empty() {
        separate(&converted, has_content_media_type)
    } else {
        separate(&converted, content_media_type_in(&media_types))
    };

    let side = |document: &Option<DialectDocument>, dialect: &Dialect| {
        document
            .as_ref()
            .map_or(Value::Null, |document| document.to_json(dialect))
    };
    let output = json!({
        "llm": side(&separated.llm, dialect),
        "human": side(&separated.human, dialect),
    });
    write_json(&output, args.output.as_deref())?;
    Ok(0)
}
