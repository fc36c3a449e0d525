//! Attribute command - emit the RecordAttribute declaration

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use record_generator::attribute::record_attribute_source;
use record_generator::config::GeneratorConfig;

#[derive(Parser, Debug)]
pub struct AttributeCmd {
    /// Namespace to declare the attribute in (global namespace when omitted)
    #[arg(long, default_value = "")]
    pub namespace: String,

    /// Write the declaration here instead of printing it
    #[arg(long)]
    pub out: Option<PathBuf>,
}

impl AttributeCmd {
    pub fn execute(&self, config: &GeneratorConfig, json_output: bool) -> Result<()> {
        let text = record_attribute_source(&self.namespace, &config.version);

        match &self.out {
            Some(out) => {
                fs::write(out, &text)
                    .with_context(|| format!("Failed to write {}", out.display()))?;
                if json_output {
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&serde_json::json!({
                            "success": true,
                            "out": out,
                        }))?
                    );
                } else {
                    println!("Wrote {}", out.display());
                }
            }
            None if json_output => println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "namespace": self.namespace,
                    "source": text,
                }))?
            ),
            None => print!("{}", text),
        }
        Ok(())
    }
}
