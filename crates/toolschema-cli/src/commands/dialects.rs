//! Dialects command - list registered dialects.

use super::{exit_code, write_json};
use crate::error::CliError;
use clap::Args;

#[derive(Args)]
pub struct DialectsArgs {
    /// Print full capability records as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: DialectsArgs) -> i32 {
    let dialects = toolschema::dialects();
    if !args.json {
        for dialect in &dialects {
            println!("{:<12} {}", dialect.name, dialect.description);
        }
        return 0;
    }
    exit_code(
        serde_json::to_value(&dialects)
            .map_err(CliError::from)
            .and_then(|value| write_json(&value, None))
            .map(|()| 0),
    )
}
