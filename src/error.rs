//! Shape extraction refusals.
//!
//! A refusal is surfaced to the caller and reported as a finding. It is never
//! a panic and never produces partial output.

use std::fmt;

use serde::Serialize;

/// A type enclosing a record declaration: name plus generic arity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct EnclosingType {
    pub name: String,
    pub arity: usize,
}

impl fmt::Display for EnclosingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.arity == 0 {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}`{}", self.name, self.arity)
        }
    }
}

/// Why a `[Record]` declaration cannot be turned into a shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShapeError {
    /// The declaration is nested inside other types (outermost first).
    UnsupportedShape {
        type_name: String,
        enclosing: Vec<EnclosingType>,
    },

    /// `[Record]` on something other than a class or struct.
    UnsupportedKind { type_name: String, kind: String },

    /// A `[Record(...)]` named argument with a value of the wrong form.
    InvalidOption {
        type_name: String,
        option: String,
        value: String,
    },
}

impl ShapeError {
    pub fn type_name(&self) -> &str {
        match self {
            ShapeError::UnsupportedShape { type_name, .. }
            | ShapeError::UnsupportedKind { type_name, .. }
            | ShapeError::InvalidOption { type_name, .. } => type_name,
        }
    }
}

impl fmt::Display for ShapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShapeError::UnsupportedShape {
                type_name,
                enclosing,
            } => {
                let chain: Vec<String> = enclosing.iter().map(|t| t.to_string()).collect();
                write!(
                    f,
                    "record {} is nested inside {}; records declared inside other types are not supported",
                    type_name,
                    chain.join(".")
                )
            }
            ShapeError::UnsupportedKind { type_name, kind } => write!(
                f,
                "record {} is declared as {}; only classes and structs are supported",
                type_name, kind
            ),
            ShapeError::InvalidOption {
                type_name,
                option,
                value,
            } => write!(
                f,
                "record {} has an invalid {} value `{}`",
                type_name, option, value
            ),
        }
    }
}

impl std::error::Error for ShapeError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_shape_names_chain() {
        let err = ShapeError::UnsupportedShape {
            type_name: "Person".to_string(),
            enclosing: vec![
                EnclosingType {
                    name: "Outer".to_string(),
                    arity: 0,
                },
                EnclosingType {
                    name: "Inner".to_string(),
                    arity: 1,
                },
            ],
        };
        assert_eq!(err.type_name(), "Person");
        assert!(err.to_string().contains("Outer.Inner`1"));
    }
}
