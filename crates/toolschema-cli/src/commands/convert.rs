//! Convert command - canonical document to a dialect.

use super::{exit_code, find_dialect, read_document, write_json};
use crate::config::ToolschemaConfig;
use crate::error::CliError;
use clap::{Args, ValueEnum};
use std::path::PathBuf;
use toolschema::{
    ConversionReport, ConvertOptions, DescriptionMode, RecursionOverflow, convert_document,
    convert_parameters,
};

#[derive(Args)]
pub struct ConvertArgs {
    /// Canonical document or bare JSON Schema, use - for stdin
    pub input: PathBuf,

    /// Target dialect (see `toolschema dialects`)
    #[arg(short, long)]
    pub dialect: Option<String>,

    /// Treat the root as a tool's parameter object
    #[arg(short, long)]
    pub parameters: bool,

    /// Close every object and require every property
    #[arg(long, conflicts_with = "no_strict")]
    pub strict: bool,

    /// Keep optional properties and open objects
    #[arg(long)]
    pub no_strict: bool,

    /// Unroll limit for recursive references on inline dialects
    #[arg(long)]
    pub recursion_depth: Option<usize>,

    /// Behaviour past the unroll limit
    #[arg(long, value_enum)]
    pub recursion_overflow: Option<OverflowArg>,

    /// Placement of definition docs
    #[arg(long, value_enum)]
    pub descriptions: Option<DescriptionsArg>,

    /// Never emit inferred discriminators
    #[arg(long)]
    pub no_infer_discriminator: bool,

    /// Print a `{success, value | error}` envelope instead of the bare schema
    #[arg(long)]
    pub report: bool,

    /// Output file (stdout if not specified)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OverflowArg {
    Stub,
    Error,
}

impl From<OverflowArg> for RecursionOverflow {
    fn from(arg: OverflowArg) -> Self {
        match arg {
            OverflowArg::Stub => RecursionOverflow::Stub,
            OverflowArg::Error => RecursionOverflow::Error,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum DescriptionsArg {
    Expand,
    Compact,
}

impl From<DescriptionsArg> for DescriptionMode {
    fn from(arg: DescriptionsArg) -> Self {
        match arg {
            DescriptionsArg::Expand => DescriptionMode::Expand,
            DescriptionsArg::Compact => DescriptionMode::Compact,
        }
    }
}

impl ConvertArgs {
    /// Options given on the command line; unset flags leave fields unset.
    fn options(&self) -> ConvertOptions {
        ConvertOptions {
            strict: match (self.strict, self.no_strict) {
                (true, _) => Some(true),
                (_, true) => Some(false),
                _ => None,
            },
            recursion_depth: self.recursion_depth,
            recursion_overflow: self.recursion_overflow.map(Into::into),
            descriptions: self.descriptions.map(Into::into),
            infer_discriminator: self.no_infer_discriminator.then_some(false),
        }
    }
}

pub fn run(args: ConvertArgs, config: &ToolschemaConfig) -> i32 {
    exit_code(convert(&args, config))
}

fn convert(args: &ConvertArgs, config: &ToolschemaConfig) -> Result<i32, CliError> {
    let dialect = find_dialect(config.dialect_name(args.dialect.as_deref()))?;
    let document = read_document(&args.input)?;
    let options = config.convert.clone().merge(args.options());
    tracing::debug!(dialect = dialect.name, ?options, "converting");

    let result = if args.parameters {
        convert_parameters(&document.schema, &document.components, dialect, &options)
    } else {
        convert_document(&document, dialect, &options)
    };

    match (result, args.report) {
        (Ok(converted), false) => {
            write_json(&converted.to_json(dialect), args.output.as_deref())?;
            Ok(0)
        }
        (Ok(converted), true) => {
            let report = ConversionReport::success(converted.to_json(dialect));
            write_json(&serde_json::to_value(report)?, args.output.as_deref())?;
            Ok(0)
        }
        (Err(error), true) => {
            let report = ConversionReport::failure(error);
            write_json(&serde_json::to_value(report)?, args.output.as_deref())?;
            Ok(1)
        }
        (Err(error), false) => {
            eprintln!("error: {error}");
            if error.reasons.len() > 1 {
                for reason in &error.reasons {
                    eprintln!("  {reason}");
                }
            }
            Ok(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Wrapper {
        #[command(flatten)]
        args: ConvertArgs,
    }

    fn parse(argv: &[&str]) -> ConvertArgs {
        Wrapper::parse_from(std::iter::once("convert").chain(argv.iter().copied())).args
    }

    #[test]
    fn unset_flags_leave_options_unset() {
        assert_eq!(parse(&["tool.json"]).options(), ConvertOptions::default());
    }

    #[test]
    fn flags_map_to_options() {
        let options = parse(&[
            "tool.json",
            "--no-strict",
            "--recursion-depth",
            "1",
            "--recursion-overflow",
            "error",
            "--descriptions",
            "compact",
            "--no-infer-discriminator",
        ])
        .options();
        assert_eq!(
            options,
            ConvertOptions {
                strict: Some(false),
                recursion_depth: Some(1),
                recursion_overflow: Some(RecursionOverflow::Error),
                descriptions: Some(DescriptionMode::Compact),
                infer_discriminator: Some(false),
            }
        );
    }

    #[test]
    fn command_line_overrides_config() {
        let config = ToolschemaConfig {
            convert: ConvertOptions {
                strict: Some(true),
                recursion_depth: Some(4),
                ..ConvertOptions::default()
            },
            ..ToolschemaConfig::default()
        };
        let options = config
            .convert
            .clone()
            .merge(parse(&["tool.json", "--no-strict"]).options());
        assert_eq!(options.strict, Some(false));
        assert_eq!(options.recursion_depth, Some(4));
    }
}
