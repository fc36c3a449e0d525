//! Analysis driver: extractor, locator and classifier over a set of files.
//!
//! Files are parsed up front. Every `[Record]` declaration is then analyzed
//! on the rayon pool against the shared, immutable trees, and findings are
//! sorted by file and position so reports are stable across runs.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use rayon::prelude::*;
use record_syntax::{parse, DeclarationContext, Span, SyntaxTree};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::classify::{classify, ClassificationResult};
use crate::config::GeneratorConfig;
use crate::error::ShapeError;
use crate::locator::locate_companion;
use crate::shape::{extract_shape, record_attribute, TypeShape};

/// Simple name of the attribute declaration that `[Record]` binds to.
pub const RECORD_ATTRIBUTE_TYPE: &str = "RecordAttribute";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub text: String,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            text: text.into(),
        }
    }

    pub fn read(path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Ok(Self::new(path, text))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum FindingKind {
    RecordPartialMissing,
    RecordPartialInvalid,
    GeneratorVersionDifferent,
    RecordShapeUnsupported,
    RecordAttributeDeclarationMissing,
}

impl FindingKind {
    /// Whether `fix` has an edit for this kind of finding.
    pub fn is_fixable(self) -> bool {
        !matches!(self, FindingKind::RecordShapeUnsupported)
    }
}

impl fmt::Display for FindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FindingKind::RecordPartialMissing => "RecordPartialMissing",
            FindingKind::RecordPartialInvalid => "RecordPartialInvalid",
            FindingKind::GeneratorVersionDifferent => "GeneratorVersionDifferent",
            FindingKind::RecordShapeUnsupported => "RecordShapeUnsupported",
            FindingKind::RecordAttributeDeclarationMissing => "RecordAttributeDeclarationMissing",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub kind: FindingKind,
    pub file: PathBuf,
    pub line: u32,
    pub column: u32,
    pub record: String,
    pub message: String,
}

/// A file that could not be parsed. Its declarations take no part in analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseFailure {
    pub file: PathBuf,
    pub line: u32,
    pub column: u32,
    pub message: String,
}

/// A located companion, in file terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompanionLocation {
    pub file_index: usize,
    pub span: Span,
}

/// Everything learned about one `[Record]` declaration.
#[derive(Debug, Clone)]
pub struct RecordAnalysis {
    pub file_index: usize,
    pub name: String,
    pub name_span: Span,
    /// Span of the `class`/`struct` keyword.
    pub keyword_span: Span,
    pub shape: Result<TypeShape, ShapeError>,
    pub companion: Option<CompanionLocation>,
    /// `None` when the shape was refused.
    pub classification: Option<ClassificationResult>,
}

impl RecordAnalysis {
    /// Companion needs (re)generation or the declaration lacks `partial`.
    pub fn needs_fix(&self) -> bool {
        match (&self.shape, &self.classification) {
            (Ok(shape), Some(result)) => !shape.has_partial || !result.is_up_to_date(),
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AnalysisReport {
    pub findings: Vec<Finding>,
    pub parse_failures: Vec<ParseFailure>,
    #[serde(skip)]
    pub records: Vec<RecordAnalysis>,
    /// Namespace for a bootstrap attribute declaration, set when none exists.
    #[serde(skip)]
    pub missing_attribute_namespace: Option<String>,
}

impl AnalysisReport {
    pub fn is_clean(&self) -> bool {
        self.findings.is_empty()
    }
}

/// Analyze every `[Record]` declaration in `files`.
pub fn analyze(files: &[SourceFile], config: &GeneratorConfig) -> AnalysisReport {
    let parsed: Vec<_> = files
        .par_iter()
        .enumerate()
        .map(|(index, file)| (index, parse(&file.text)))
        .collect();

    let mut trees = Vec::new();
    let mut tree_files = Vec::new();
    let mut parse_failures = Vec::new();
    for (index, result) in parsed {
        match result {
            Ok(tree) => {
                trees.push(tree);
                tree_files.push(index);
            }
            Err(err) => {
                let (line, column) = err
                    .span()
                    .map(|span| (span.line, span.column))
                    .unwrap_or_else(|| end_position(&files[index].text));
                warn!(file = %files[index].path.display(), error = %err, "skipping unparseable file");
                parse_failures.push(ParseFailure {
                    file: files[index].path.clone(),
                    line,
                    column,
                    message: err.to_string(),
                });
            }
        }
    }

    let jobs: Vec<(usize, DeclarationContext<'_>)> = trees
        .iter()
        .enumerate()
        .flat_map(|(tree_index, tree)| {
            tree.declarations()
                .into_iter()
                .filter(|ctx| record_attribute(ctx).is_some())
                .map(move |ctx| (tree_index, ctx))
        })
        .collect();
    debug!(files = files.len(), records = jobs.len(), "analyzing records");

    let records: Vec<RecordAnalysis> = jobs
        .par_iter()
        .map(|(tree_index, ctx)| {
            analyze_record(tree_files[*tree_index], ctx, &trees, &tree_files, config)
        })
        .collect();

    let mut findings: Vec<Finding> = records
        .iter()
        .filter_map(|record| record_finding(record, files))
        .collect();

    let declares_attribute = trees
        .iter()
        .any(|tree| tree.any_type(|ty| ty.name == RECORD_ATTRIBUTE_TYPE));
    let mut missing_attribute_namespace = None;
    if !declares_attribute {
        for (tree_index, ctx) in &jobs {
            let Some(attribute) = record_attribute(ctx) else {
                continue;
            };
            if missing_attribute_namespace.is_none() {
                missing_attribute_namespace = Some(ctx.namespace());
            }
            findings.push(Finding {
                kind: FindingKind::RecordAttributeDeclarationMissing,
                file: files[tree_files[*tree_index]].path.clone(),
                line: attribute.span.line,
                column: attribute.span.column,
                record: ctx.declaration.name.clone(),
                message: format!(
                    "{} declaration is missing; [{}] does not bind to anything",
                    RECORD_ATTRIBUTE_TYPE, attribute.name
                ),
            });
        }
    }

    findings.sort_by(|a, b| {
        (&a.file, a.line, a.column, a.kind).cmp(&(&b.file, b.line, b.column, b.kind))
    });
    info!(
        records = records.len(),
        findings = findings.len(),
        parse_failures = parse_failures.len(),
        "analysis complete"
    );

    AnalysisReport {
        findings,
        parse_failures,
        records,
        missing_attribute_namespace,
    }
}

fn analyze_record(
    file_index: usize,
    ctx: &DeclarationContext<'_>,
    trees: &[SyntaxTree],
    tree_files: &[usize],
    config: &GeneratorConfig,
) -> RecordAnalysis {
    let decl = ctx.declaration;
    let shape = extract_shape(ctx);

    let (companion, classification) = match &shape {
        Ok(shape) => {
            let artifact = locate_companion(shape, trees);
            let result = classify(shape, artifact.as_ref(), &config.version);
            debug!(record = %shape.display_name(), ?result, "classified");
            let companion = artifact.and_then(|a| a.origin).map(|origin| CompanionLocation {
                file_index: tree_files[origin.tree_index],
                span: origin.span,
            });
            (companion, Some(result))
        }
        Err(err) => {
            debug!(record = %decl.name, error = %err, "shape refused");
            (None, None)
        }
    };

    RecordAnalysis {
        file_index,
        name: decl.name.clone(),
        name_span: decl.name_span,
        keyword_span: decl.keyword_span,
        shape,
        companion,
        classification,
    }
}

/// 1-based line and column just past the end of `text`.
fn end_position(text: &str) -> (u32, u32) {
    let line = text.matches('\n').count() + 1;
    let column = text.rsplit('\n').next().map_or(0, |last| last.chars().count()) + 1;
    (line as u32, column as u32)
}

fn record_finding(record: &RecordAnalysis, files: &[SourceFile]) -> Option<Finding> {
    let (kind, message) = match (&record.shape, &record.classification) {
        (Err(err), _) => (FindingKind::RecordShapeUnsupported, err.to_string()),
        (Ok(shape), Some(result)) => {
            let name = shape.display_name();
            match result {
                ClassificationResult::Missing => (
                    FindingKind::RecordPartialMissing,
                    format!("Record {} has no generated partial", name),
                ),
                ClassificationResult::Invalid { reason } => (
                    FindingKind::RecordPartialInvalid,
                    format!("Generated partial of record {} is invalid: {}", name, reason),
                ),
                ClassificationResult::VersionMismatch { found, current } => (
                    FindingKind::GeneratorVersionDifferent,
                    format!(
                        "Record {} partial was generated by RecordGenerator {}, current version is {}",
                        name,
                        found.as_deref().unwrap_or("(unknown)"),
                        current
                    ),
                ),
                ClassificationResult::UpToDate if !shape.has_partial => (
                    FindingKind::RecordPartialMissing,
                    format!("Record {} is not declared partial", name),
                ),
                ClassificationResult::UpToDate => return None,
            }
        }
        (Ok(_), None) => return None,
    };

    Some(Finding {
        kind,
        file: files[record.file_index].path.clone(),
        line: record.name_span.line,
        column: record.name_span.column,
        record: record.name.clone(),
        message,
    })
}
