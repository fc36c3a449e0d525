//! Fix command - apply the planned edits to disk

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use record_generator::analysis::analyze;
use record_generator::config::GeneratorConfig;
use record_generator::fix::plan_fixes;
use tracing::info;

use super::output::format_plan;
use super::sources::collect_sources;

#[derive(Parser, Debug)]
pub struct FixCmd {
    /// Files or directories to fix (directories are searched for .cs files)
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Print the planned edits without writing anything
    #[arg(long)]
    pub dry_run: bool,
}

impl FixCmd {
    /// Returns `false` when some finding could not be fixed.
    pub fn execute(&self, config: &GeneratorConfig, json_output: bool) -> Result<bool> {
        let files = collect_sources(&self.paths)?;
        let report = analyze(&files, config);
        let plan = plan_fixes(&files, &report, config);

        if !self.dry_run {
            for edit in &plan.edits {
                if let Some(dir) = edit.path.parent().filter(|d| !d.as_os_str().is_empty()) {
                    fs::create_dir_all(dir)
                        .with_context(|| format!("Failed to create {}", dir.display()))?;
                }
                fs::write(&edit.path, &edit.contents)
                    .with_context(|| format!("Failed to write {}", edit.path.display()))?;
                info!(path = %edit.path.display(), kind = ?edit.kind, "wrote");
            }
        }

        print!("{}", format_plan(&plan, self.dry_run, json_output));
        if json_output {
            println!();
        }

        let unfixable = report.findings.iter().any(|f| !f.kind.is_fixable());
        Ok(plan.skipped.is_empty() && !unfixable)
    }
}
