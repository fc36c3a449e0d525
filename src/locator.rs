//! Find the generated companion partial of a record.

use record_syntax::{Span, SyntaxTree};
use serde::Serialize;
use tracing::{debug, warn};

use crate::shape::TypeShape;
use crate::stamp;

/// Where a located companion lives in the searched scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ArtifactOrigin {
    /// Index into the slice of trees that was searched.
    pub tree_index: usize,
    /// The whole companion declaration, attributes included.
    pub span: Span,
}

/// A generated companion as found in source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedArtifact {
    pub version: Option<String>,
    /// Source text between the companion declaration's braces.
    pub body: String,
    pub origin: Option<ArtifactOrigin>,
}

impl GeneratedArtifact {
    /// Wrap a body that did not come from a searched tree.
    pub fn detached(version: Option<String>, body: impl Into<String>) -> Self {
        Self {
            version,
            body: body.into(),
            origin: None,
        }
    }
}

/// Search `scope` for the stamped companion of `shape`.
///
/// A candidate must match the shape's dotted namespace, name and generic
/// arity, and carry the generator stamp. Unstamped partials (including the
/// user's own declaration) are never returned.
pub fn locate_companion(shape: &TypeShape, scope: &[SyntaxTree]) -> Option<GeneratedArtifact> {
    let namespace = shape.namespace();
    let mut found: Vec<GeneratedArtifact> = Vec::new();

    for (tree_index, tree) in scope.iter().enumerate() {
        for ctx in tree.declarations() {
            let decl = ctx.declaration;
            if decl.name != shape.name
                || decl.arity() != shape.arity()
                || !ctx.enclosing_types().is_empty()
                || ctx.namespace() != namespace
            {
                continue;
            }
            let Some(version) = decl.all_attributes().find_map(stamp::decode_attribute) else {
                continue;
            };
            let body = decl.body_text(&tree.source).unwrap_or_default().to_string();
            found.push(GeneratedArtifact {
                version: Some(version),
                body,
                origin: Some(ArtifactOrigin {
                    tree_index,
                    span: decl.span,
                }),
            });
        }
    }

    if found.len() > 1 {
        warn!(
            record = %shape.display_name(),
            count = found.len(),
            "multiple generated companions found, using the first"
        );
    }
    let artifact = found.into_iter().next();
    debug!(
        record = %shape.display_name(),
        found = artifact.is_some(),
        "companion lookup"
    );
    artifact
}
