//! `toolschema` command-line interface.

mod commands;
mod config;
mod error;

use clap::{Parser, Subcommand};
use config::ToolschemaConfig;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "toolschema",
    version,
    about = "Convert tool-calling schemas between LLM and OpenAPI dialects"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Convert a canonical document into a dialect
    Convert(commands::convert::ConvertArgs),
    /// Read a dialect document back into canonical form
    Invert(commands::invert::InvertArgs),
    /// Check whether one schema accepts every value another accepts
    Covers(commands::covers::CoversArgs),
    /// Split a tool's parameters into model and caller halves
    Separate(commands::separate::SeparateArgs),
    /// List registered dialects
    Dialects(commands::dialects::DialectsArgs),
}

/// Prints the config schema when invoked as `toolschema --schema`.
fn handle_schema_flag() -> bool {
    let args: Vec<String> = std::env::args().collect();
    if args.get(1).map(|s| s.as_str()) != Some("--schema") {
        return false;
    }
    let response = serde_json::json!({
        "config_path": ".toolschema/config.toml",
        "format": "toml",
        "schema": schemars::schema_for!(ToolschemaConfig)
    });
    match serde_json::to_string_pretty(&response) {
        Ok(text) => println!("{text}"),
        Err(e) => eprintln!("{e}"),
    }
    true
}

/// Reset SIGPIPE to default behavior so piping to `head` etc. doesn't panic.
#[cfg(unix)]
fn reset_sigpipe() {
    // SAFETY: restores the default disposition of one signal; no memory is touched.
    unsafe {
        libc::signal(libc::SIGPIPE, libc::SIG_DFL);
    }
}

#[cfg(not(unix))]
fn reset_sigpipe() {}

/// Logs go to stderr, filtered by `TOOLSCHEMA_LOG` (default `warn`).
fn init_tracing() {
    let filter =
        EnvFilter::try_from_env("TOOLSCHEMA_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    reset_sigpipe();

    if handle_schema_flag() {
        return;
    }

    init_tracing();
    let cli = Cli::parse();
    let root = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let config = ToolschemaConfig::load(&root);

    let code = match cli.command {
        Command::Convert(args) => commands::convert::run(args, &config),
        Command::Invert(args) => commands::invert::run(args, &config),
        Command::Covers(args) => commands::covers::run(args),
        Command::Separate(args) => commands::separate::run(args, &config),
        Command::Dialects(args) => commands::dialects::run(args),
    };
    std::process::exit(code);
}
