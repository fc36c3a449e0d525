//! record-generator: keep C# `[Record]` companions in sync
//!
//! ## Commands
//!
//! - **check**: report missing, invalid or stale companions
//! - **fix**: insert `partial`, (re)generate companions, bootstrap `RecordAttribute`
//! - **generate**: print the companion of one declaration
//! - **attribute**: print the `RecordAttribute` declaration
//!
//! ## Example Usage
//!
//! ```bash
//! # Report problems under src/, failing the build if there are any
//! record-generator check src/
//!
//! # Fix everything, printing what would change first
//! record-generator fix src/ --dry-run
//! record-generator fix src/
//!
//! # Show the companion for one type
//! record-generator generate src/Person.cs --type Person
//! ```

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use record_generator::config::{env_bool, GeneratorConfig, JSON_ENV};

mod cli;

use cli::{
    attribute::AttributeCmd, check::CheckCmd, fix::FixCmd, generate::GenerateCmd, logging,
    output,
};

#[derive(Parser)]
#[command(
    name = "record-generator",
    author,
    version,
    about = "Generate and verify immutable-record partials for C# types",
    long_about = "Finds [Record] classes and structs, generates their companion partial \
                  (constructor plus With mutators) and reports companions that are missing, \
                  hand-edited or produced by another generator version."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output as JSON instead of human-readable format
    #[arg(long, global = true)]
    json: bool,

    /// Verbose output (debug logging on stderr)
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Generator version to stamp and compare against
    /// (default: RECORD_GENERATOR_VERSION or the crate version)
    #[arg(long, global = true)]
    generator_version: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Report records whose companion is missing, invalid or stale
    Check(CheckCmd),

    /// Apply fixes: add `partial`, write companions and the attribute declaration
    Fix(FixCmd),

    /// Print or write the companion of a single declaration
    Generate(GenerateCmd),

    /// Print or write the RecordAttribute declaration
    Attribute(AttributeCmd),
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::Check(_) => "check",
            Commands::Fix(_) => "fix",
            Commands::Generate(_) => "generate",
            Commands::Attribute(_) => "attribute",
        }
    }
}

fn main() -> ExitCode {
    let Cli {
        command,
        json,
        verbose,
        generator_version,
    } = Cli::parse();
    logging::init(verbose);
    let json = json || env_bool(JSON_ENV);

    let mut config = GeneratorConfig::from_env();
    if let Some(version) = generator_version {
        config = config.with_version(version);
    }
    tracing::debug!(command = command.name(), version = %config.version, "starting");

    let result: Result<bool> = match command {
        Commands::Check(cmd) => cmd.execute(&config, json),
        Commands::Fix(cmd) => cmd.execute(&config, json),
        Commands::Generate(cmd) => cmd.execute(&config, json).map(|_| true),
        Commands::Attribute(cmd) => cmd.execute(&config, json).map(|_| true),
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(err) => {
            eprint!("{}", output::format_error(&err, json));
            ExitCode::from(2)
        }
    }
}
