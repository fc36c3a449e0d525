//! Turn an analysis report into text edits.
//!
//! Planning is pure: it reads the analyzed sources and returns whole-file
//! contents. Writing them is the caller's job.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use record_syntax::TypeDecl;
use serde::Serialize;
use tracing::{debug, warn};

use crate::analysis::{AnalysisReport, FindingKind, SourceFile};
use crate::attribute::{self, record_attribute_source};
use crate::config::GeneratorConfig;
use crate::shape::TypeShape;
use crate::synth::{synthesize, BANNER};

/// Suffix of generated companion files.
pub const COMPANION_SUFFIX: &str = ".RecordPartial.cs";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EditKind {
    /// `partial` inserted into a source declaration.
    AddPartial,
    WriteCompanion,
    WriteAttribute,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileEdit {
    pub path: PathBuf,
    pub kind: EditKind,
    #[serde(skip)]
    pub contents: String,
    /// Records this edit was planned for.
    pub records: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedFix {
    pub record: String,
    pub file: PathBuf,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FixPlan {
    pub edits: Vec<FileEdit>,
    pub skipped: Vec<SkippedFix>,
}

impl FixPlan {
    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }
}

/// `source` with `partial` inserted before the declaration's type keyword.
pub fn insert_partial_modifier(source: &str, decl: &TypeDecl) -> String {
    if decl.has_modifier("partial") {
        return source.to_string();
    }
    insert_at(source, &[decl.keyword_span.start])
}

/// `Person.RecordPartial.cs`, or `Person_1.RecordPartial.cs` for one type parameter.
pub fn companion_file_name(shape: &TypeShape) -> String {
    if shape.arity() == 0 {
        format!("{}{}", shape.name, COMPANION_SUFFIX)
    } else {
        format!("{}_{}{}", shape.name, shape.arity(), COMPANION_SUFFIX)
    }
}

/// A file the generator owns: it starts with the generated banner.
pub fn is_generated_file(text: &str) -> bool {
    text.trim_start_matches('\u{feff}')
        .trim_start()
        .starts_with(BANNER[0])
}

/// Plan the edits that resolve every fixable finding in `report`.
pub fn plan_fixes(files: &[SourceFile], report: &AnalysisReport, config: &GeneratorConfig) -> FixPlan {
    let mut plan = FixPlan::default();
    let mut insertions: BTreeMap<usize, Vec<(usize, String)>> = BTreeMap::new();
    let mut companions: BTreeMap<PathBuf, (String, String)> = BTreeMap::new();
    let input_paths: BTreeMap<&Path, usize> = files
        .iter()
        .enumerate()
        .map(|(index, file)| (file.path.as_path(), index))
        .collect();

    for record in report.records.iter().filter(|r| r.needs_fix()) {
        let Ok(shape) = &record.shape else {
            continue;
        };
        let source = &files[record.file_index];
        let name = shape.display_name();

        if !shape.has_partial {
            insertions
                .entry(record.file_index)
                .or_default()
                .push((record.keyword_span.start, name.clone()));
        }

        if record
            .classification
            .as_ref()
            .map_or(true, |result| result.is_up_to_date())
        {
            continue;
        }

        let target = match record.companion {
            Some(location) => {
                let companion = &files[location.file_index];
                if !is_generated_file(&companion.text) {
                    skip(
                        &mut plan,
                        &name,
                        &companion.path,
                        "generated partial shares its file with hand-written code",
                    );
                    continue;
                }
                companion.path.clone()
            }
            None => sibling(&source.path, &companion_file_name(shape)),
        };

        if let Some(&index) = input_paths.get(target.as_path()) {
            if !is_generated_file(&files[index].text) {
                skip(
                    &mut plan,
                    &name,
                    &target,
                    "target file exists and was not generated",
                );
                continue;
            }
        }
        if let Some((owner, _)) = companions.get(&target) {
            let reason = format!("{} already targets this file", owner);
            skip(&mut plan, &name, &target, &reason);
            continue;
        }

        let (shape, _) = shape.with_partial_modifier();
        companions.insert(target, (name, synthesize(&shape, &config.version)));
    }

    for (file_index, mut points) in insertions {
        points.sort();
        let offsets: Vec<usize> = points.iter().map(|(offset, _)| *offset).collect();
        plan.edits.push(FileEdit {
            path: files[file_index].path.clone(),
            kind: EditKind::AddPartial,
            contents: insert_at(&files[file_index].text, &offsets),
            records: points.into_iter().map(|(_, name)| name).collect(),
        });
    }

    for (path, (name, contents)) in companions {
        plan.edits.push(FileEdit {
            path,
            kind: EditKind::WriteCompanion,
            contents,
            records: vec![name],
        });
    }

    if let Some(edit) = attribute_edit(report, config) {
        plan.edits.push(edit);
    }

    plan.edits.sort_by(|a, b| a.path.cmp(&b.path));
    debug!(
        edits = plan.edits.len(),
        skipped = plan.skipped.len(),
        "planned fixes"
    );
    plan
}

fn attribute_edit(report: &AnalysisReport, config: &GeneratorConfig) -> Option<FileEdit> {
    let namespace = report.missing_attribute_namespace.as_ref()?;
    let first = report
        .findings
        .iter()
        .find(|f| f.kind == FindingKind::RecordAttributeDeclarationMissing)?;
    let records: BTreeSet<String> = report
        .findings
        .iter()
        .filter(|f| f.kind == FindingKind::RecordAttributeDeclarationMissing)
        .map(|f| f.record.clone())
        .collect();
    Some(FileEdit {
        path: sibling(&first.file, &format!("{}.cs", attribute::FILENAME)),
        kind: EditKind::WriteAttribute,
        contents: record_attribute_source(namespace, &config.version),
        records: records.into_iter().collect(),
    })
}

fn skip(plan: &mut FixPlan, record: &str, file: &Path, reason: &str) {
    warn!(record, file = %file.display(), reason, "skipping fix");
    plan.skipped.push(SkippedFix {
        record: record.to_string(),
        file: file.to_path_buf(),
        reason: reason.to_string(),
    });
}

fn sibling(path: &Path, file_name: &str) -> PathBuf {
    match path.parent() {
        Some(dir) => dir.join(file_name),
        None => PathBuf::from(file_name),
    }
}

/// Insert `partial ` at each byte offset; offsets index the original text.
fn insert_at(source: &str, offsets: &[usize]) -> String {
    let mut sorted: Vec<usize> = offsets.to_vec();
    sorted.sort_unstable();
    sorted.dedup();

    let mut out = source.to_string();
    for &offset in sorted.iter().rev() {
        if out.is_char_boundary(offset) {
            out.insert_str(offset, "partial ");
        }
    }
    out
}
