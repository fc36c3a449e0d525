//! Check command - report records whose companion needs attention

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use record_generator::analysis::analyze;
use record_generator::config::GeneratorConfig;

use super::output::format_report;
use super::sources::collect_sources;

#[derive(Parser, Debug)]
pub struct CheckCmd {
    /// Files or directories to analyze (directories are searched for .cs files)
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,
}

impl CheckCmd {
    /// Returns `false` when any finding was reported or a file could not be parsed.
    pub fn execute(&self, config: &GeneratorConfig, json_output: bool) -> Result<bool> {
        let files = collect_sources(&self.paths)?;
        let report = analyze(&files, config);
        print!("{}", format_report(&report, json_output));
        if json_output {
            println!();
        }
        Ok(report.is_clean() && report.parse_failures.is_empty())
    }
}
