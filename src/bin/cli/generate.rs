//! Generate command - emit the companion of one declaration

use std::fs;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use record_generator::analysis::SourceFile;
use record_generator::config::GeneratorConfig;
use record_generator::shape::extract_shape;
use record_generator::synth::synthesize;
use record_syntax::parse;
use serde::Serialize;

#[derive(Parser, Debug)]
pub struct GenerateCmd {
    /// Source file declaring the type
    pub file: PathBuf,

    /// Name of the type to generate for
    #[arg(long = "type", value_name = "NAME")]
    pub type_name: String,

    /// Write the companion here instead of printing it
    #[arg(long)]
    pub out: Option<PathBuf>,
}

impl GenerateCmd {
    pub fn execute(&self, config: &GeneratorConfig, json_output: bool) -> Result<()> {
        let source = SourceFile::read(&self.file)?;
        let tree = parse(&source.text)
            .with_context(|| format!("Failed to parse {}", self.file.display()))?;
        let decls = tree.declarations();
        let ctx = decls
            .iter()
            .find(|ctx| ctx.declaration.name == self.type_name)
            .ok_or_else(|| {
                anyhow!(
                    "Type {} not declared in {}",
                    self.type_name,
                    self.file.display()
                )
            })?;
        let shape = extract_shape(ctx)?;
        let text = synthesize(&shape, &config.version);

        if let Some(out) = &self.out {
            fs::write(out, &text).with_context(|| format!("Failed to write {}", out.display()))?;
        }

        if json_output {
            #[derive(Serialize)]
            struct GenerateJson<'a> {
                record: String,
                version: &'a str,
                #[serde(skip_serializing_if = "Option::is_none")]
                out: Option<&'a PathBuf>,
                source: &'a str,
            }
            let json = GenerateJson {
                record: shape.display_name(),
                version: &config.version,
                out: self.out.as_ref(),
                source: &text,
            };
            println!("{}", serde_json::to_string_pretty(&json)?);
        } else if let Some(out) = &self.out {
            println!("Wrote {}", out.display());
        } else {
            print!("{}", text);
        }
        Ok(())
    }
}
