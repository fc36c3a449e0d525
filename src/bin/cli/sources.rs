//! Source discovery: expand CLI paths into `.cs` files.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use record_generator::analysis::SourceFile;
use tracing::debug;
use walkdir::WalkDir;

/// Read every `.cs` file named by `paths`, walking directories recursively.
///
/// Files are returned sorted by path; a path given twice is read once.
/// Symbolic links are not followed.
pub fn collect_sources(paths: &[PathBuf]) -> Result<Vec<SourceFile>> {
    let mut found = Vec::new();
    for path in paths {
        if path.is_dir() {
            walk(path, &mut found)?;
        } else if path.is_file() {
            found.push(path.clone());
        } else {
            bail!("No such file or directory: {}", path.display());
        }
    }
    found.sort();
    found.dedup();
    debug!(files = found.len(), "collected sources");

    found.iter().map(|path| SourceFile::read(path)).collect()
}

fn walk(root: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
    for entry in WalkDir::new(root)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_skipped_dir(e.path()))
    {
        let entry = entry.with_context(|| format!("Failed to list {}", root.display()))?;
        if entry.file_type().is_file() && entry.path().extension().map_or(false, |ext| ext == "cs")
        {
            out.push(entry.into_path());
        }
    }
    Ok(())
}

/// Build output and VCS directories.
fn is_skipped_dir(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map_or(false, |name| matches!(name, "bin" | "obj" | ".git" | ".vs"))
}
