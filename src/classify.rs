//! Classify a located companion against what the synthesizer would emit.
//!
//! The synthesizer is the oracle: the expected members are parsed from
//! [`synthesize_body`] and compared with the artifact's members token by
//! token, so whitespace, comments and member order never matter. Structure is
//! checked before the stamp, so an edited companion is `Invalid` even when its
//! version is stale.

use std::collections::BTreeSet;
use std::fmt;

use record_syntax::{parse_members, Member, MethodDecl};
use serde::Serialize;
use tracing::debug;

use crate::locator::GeneratedArtifact;
use crate::shape::TypeShape;
use crate::synth::{mutator_name, synthesize_body};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ClassificationResult {
    Missing,
    Invalid { reason: InvalidReason },
    VersionMismatch {
        found: Option<String>,
        current: String,
    },
    UpToDate,
}

impl ClassificationResult {
    pub fn is_up_to_date(&self) -> bool {
        matches!(self, ClassificationResult::UpToDate)
    }
}

/// First structural difference between a companion and the expected output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum InvalidReason {
    MissingConstructor,
    ConstructorParameterMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },
    MissingMutator(String),
    ExtraMutator(String),
    MutatorSignatureMismatch(String),
    UnexpectedMember(String),
    MemberBodyMismatch(String),
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidReason::MissingConstructor => write!(f, "constructor is missing"),
            InvalidReason::ConstructorParameterMismatch { expected, found } => write!(
                f,
                "constructor parameters are ({}), expected ({})",
                found.join(", "),
                expected.join(", ")
            ),
            InvalidReason::MissingMutator(name) => write!(f, "mutator {} is missing", name),
            InvalidReason::ExtraMutator(name) => write!(f, "unexpected mutator {}", name),
            InvalidReason::MutatorSignatureMismatch(name) => {
                write!(f, "mutator {} has the wrong signature", name)
            }
            InvalidReason::UnexpectedMember(name) => write!(f, "unexpected member {}", name),
            InvalidReason::MemberBodyMismatch(name) => {
                write!(f, "member {} differs from generated code", name)
            }
        }
    }
}

/// Classify `artifact` (or its absence) for `shape` at `current_version`.
pub fn classify(
    shape: &TypeShape,
    artifact: Option<&GeneratedArtifact>,
    current_version: &str,
) -> ClassificationResult {
    let Some(artifact) = artifact else {
        return ClassificationResult::Missing;
    };

    let found = match parse_members(&artifact.body) {
        Ok(members) => members,
        Err(err) => {
            debug!(record = %shape.display_name(), error = %err, "companion body does not parse");
            return ClassificationResult::Missing;
        }
    };

    if let Err(reason) = check_structure(shape, &found) {
        return ClassificationResult::Invalid { reason };
    }

    match artifact.version.as_deref() {
        Some(version) if version == current_version => ClassificationResult::UpToDate,
        found => ClassificationResult::VersionMismatch {
            found: found.map(str::to_string),
            current: current_version.to_string(),
        },
    }
}

fn check_structure(shape: &TypeShape, found: &[Member]) -> Result<(), InvalidReason> {
    // The synthesizer's own output always parses.
    let expected = parse_members(&synthesize_body(shape)).unwrap_or_default();

    let expected_ctor = expected.iter().find_map(constructor_of);
    let ctor = found
        .iter()
        .filter_map(constructor_of)
        .find(|m| m.name == shape.name)
        .ok_or(InvalidReason::MissingConstructor)?;

    if let Some(expected_ctor) = expected_ctor {
        let expected_params = param_list(expected_ctor);
        let found_params = param_list(ctor);
        if expected_params != found_params {
            return Err(InvalidReason::ConstructorParameterMismatch {
                expected: expected_params,
                found: found_params,
            });
        }
    }

    let expected_mutators: Vec<&MethodDecl> = expected.iter().filter_map(method_of).collect();
    let found_methods: Vec<&MethodDecl> = found.iter().filter_map(method_of).collect();

    for mutator in &expected_mutators {
        if !found_methods.iter().any(|m| m.name == mutator.name) {
            return Err(InvalidReason::MissingMutator(mutator.name.clone()));
        }
    }

    let expected_names: BTreeSet<String> = if shape.options.generate_mutators {
        shape
            .properties
            .iter()
            .map(|p| mutator_name(&p.name))
            .collect()
    } else {
        BTreeSet::new()
    };
    if let Some(extra) = found_methods
        .iter()
        .find(|m| is_mutator_name(&m.name) && !expected_names.contains(&m.name))
    {
        return Err(InvalidReason::ExtraMutator(extra.name.clone()));
    }

    for mutator in &expected_mutators {
        let candidates: Vec<&&MethodDecl> = found_methods
            .iter()
            .filter(|m| m.name == mutator.name)
            .collect();
        let matching = candidates.iter().any(|m| {
            m.return_type == mutator.return_type
                && m.type_params == mutator.type_params
                && param_list(m) == param_list(mutator)
        });
        if !matching || candidates.len() > 1 {
            return Err(InvalidReason::MutatorSignatureMismatch(mutator.name.clone()));
        }
    }

    let mut seen_ctor = false;
    for member in found {
        let expected_member = match member {
            Member::Constructor(m) if m.name == shape.name && !seen_ctor => {
                seen_ctor = true;
                expected.iter().find(|e| matches!(e, Member::Constructor(_)))
            }
            Member::Method(m) if expected_names.contains(&m.name) => expected
                .iter()
                .find(|e| matches!(e, Member::Method(em) if em.name == m.name)),
            _ => None,
        };
        let Some(expected_member) = expected_member else {
            return Err(InvalidReason::UnexpectedMember(member_label(member)));
        };
        if expected_member.tokens() != member.tokens() {
            return Err(InvalidReason::MemberBodyMismatch(member_label(member)));
        }
    }

    Ok(())
}

fn constructor_of(member: &Member) -> Option<&MethodDecl> {
    match member {
        Member::Constructor(m) => Some(m),
        _ => None,
    }
}

fn method_of(member: &Member) -> Option<&MethodDecl> {
    match member {
        Member::Method(m) => Some(m),
        _ => None,
    }
}

fn param_list(method: &MethodDecl) -> Vec<String> {
    method
        .params
        .iter()
        .map(|p| {
            let mut parts = p.modifiers.clone();
            parts.push(p.type_text.clone());
            parts.push(p.name.clone());
            parts.join(" ")
        })
        .collect()
}

/// `With` followed by an uppercase letter or underscore.
fn is_mutator_name(name: &str) -> bool {
    name.strip_prefix("With")
        .and_then(|rest| rest.chars().next())
        .map_or(false, |c| c.is_uppercase() || c == '_')
}

fn member_label(member: &Member) -> String {
    if member.name().is_empty() {
        member.kind_label().to_string()
    } else {
        member.name().to_string()
    }
}
