//! CLI subcommand implementations for record-generator

pub mod attribute;
pub mod check;
pub mod fix;
pub mod generate;
pub mod logging;
pub mod output;
pub mod sources;
