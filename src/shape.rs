//! Type shapes: the closed model both engines work from.
//!
//! A [`TypeShape`] is extracted once from a `[Record]` declaration and then
//! drives synthesis, classification and companion lookup. It never refers back
//! to the syntax tree.

use record_syntax::{Attribute, AttributeValue, DeclarationContext, Member, Scope, TypeKind};
use serde::Serialize;

use crate::error::{EnclosingType, ShapeError};

pub const PRIMARY_CTOR_ACCESS: &str = "PrimaryCtorAccess";
pub const GENERATE_MUTATORS: &str = "GenerateMutators";

const ACCESS_MODIFIERS: &[&str] = &[
    "public",
    "internal",
    "protected",
    "private",
    "protected internal",
    "private protected",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    Class,
    Struct,
}

impl ShapeKind {
    pub fn keyword(self) -> &'static str {
        match self {
            ShapeKind::Class => "class",
            ShapeKind::Struct => "struct",
        }
    }
}

/// One enclosing namespace scope as written (`Inner.InnerMost` stays dotted).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct NamespaceShape {
    pub name: String,
    /// `using` directives declared directly inside this namespace.
    pub usings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PropertyShape {
    pub name: String,
    /// Opaque type text, copied as written.
    pub type_text: String,
}

/// Options read from the named arguments of `[Record(...)]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RecordOptions {
    pub primary_ctor_access: String,
    pub generate_mutators: bool,
}

impl Default for RecordOptions {
    fn default() -> Self {
        Self {
            primary_ctor_access: "public".to_string(),
            generate_mutators: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TypeShape {
    /// Enclosing namespace scopes, outermost first.
    pub namespaces: Vec<NamespaceShape>,
    /// Compilation-unit level `using` directives.
    pub usings: Vec<String>,
    pub name: String,
    pub type_params: Vec<String>,
    pub kind: ShapeKind,
    /// Qualifying properties in declaration order.
    pub properties: Vec<PropertyShape>,
    pub has_partial: bool,
    pub options: RecordOptions,
}

impl TypeShape {
    /// A global-namespace class with no properties.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            namespaces: Vec::new(),
            usings: Vec::new(),
            name: name.into(),
            type_params: Vec::new(),
            kind: ShapeKind::Class,
            properties: Vec::new(),
            has_partial: true,
            options: RecordOptions::default(),
        }
    }

    pub fn in_namespace(mut self, name: impl Into<String>) -> Self {
        self.namespaces.push(NamespaceShape {
            name: name.into(),
            usings: Vec::new(),
        });
        self
    }

    pub fn with_type_params<I, S>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.type_params = params.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_property(mut self, type_text: impl Into<String>, name: impl Into<String>) -> Self {
        self.properties.push(PropertyShape {
            name: name.into(),
            type_text: type_text.into(),
        });
        self
    }

    /// Dotted namespace path, empty for the global namespace.
    pub fn namespace(&self) -> String {
        self.namespaces
            .iter()
            .map(|ns| ns.name.as_str())
            .collect::<Vec<_>>()
            .join(".")
    }

    pub fn arity(&self) -> usize {
        self.type_params.len()
    }

    /// `Name` or `Name<T, U>`.
    pub fn type_name_with_params(&self) -> String {
        if self.type_params.is_empty() {
            self.name.clone()
        } else {
            format!("{}<{}>", self.name, self.type_params.join(", "))
        }
    }

    /// `Namespace.Name` for messages.
    pub fn display_name(&self) -> String {
        let ns = self.namespace();
        if ns.is_empty() {
            self.type_name_with_params()
        } else {
            format!("{}.{}", ns, self.type_name_with_params())
        }
    }

    /// The same shape with `partial` set, and whether that changed anything.
    pub fn with_partial_modifier(&self) -> (TypeShape, bool) {
        let mut shape = self.clone();
        let changed = !shape.has_partial;
        shape.has_partial = true;
        (shape, changed)
    }
}

/// True for `[Record]`, `[RecordAttribute]` and qualified forms of either.
pub fn is_record_attribute(attribute: &Attribute) -> bool {
    matches!(attribute.simple_name(), "Record" | "RecordAttribute")
}

/// The first `[Record]` attribute of a declaration, if any.
pub fn record_attribute<'a>(ctx: &DeclarationContext<'a>) -> Option<&'a Attribute> {
    ctx.declaration.all_attributes().find(|a| is_record_attribute(a))
}

/// Build the shape of a `[Record]` declaration.
pub fn extract_shape(ctx: &DeclarationContext<'_>) -> Result<TypeShape, ShapeError> {
    let decl = ctx.declaration;

    let enclosing: Vec<EnclosingType> = ctx
        .enclosing_types()
        .into_iter()
        .map(|ty| EnclosingType {
            name: ty.name.clone(),
            arity: ty.arity(),
        })
        .collect();
    if !enclosing.is_empty() {
        return Err(ShapeError::UnsupportedShape {
            type_name: decl.name.clone(),
            enclosing,
        });
    }

    let kind = match decl.kind {
        TypeKind::Class => ShapeKind::Class,
        TypeKind::Struct => ShapeKind::Struct,
        other => {
            return Err(ShapeError::UnsupportedKind {
                type_name: decl.name.clone(),
                kind: other.keyword().to_string(),
            })
        }
    };

    let namespaces = ctx
        .scopes
        .iter()
        .filter_map(|scope| match scope {
            Scope::Namespace(ns) => Some(NamespaceShape {
                name: ns.name.clone(),
                usings: local_usings(&ns.usings),
            }),
            Scope::Type(_) => None,
        })
        .collect();

    let properties = decl
        .members
        .iter()
        .filter_map(|member| match member {
            Member::Property(p)
                if p.is_auto() && !p.has_modifier("static") && !p.has_modifier("abstract") =>
            {
                Some(PropertyShape {
                    name: p.name.clone(),
                    type_text: p.type_text.clone(),
                })
            }
            _ => None,
        })
        .collect();

    let options = match record_attribute(ctx) {
        Some(attribute) => read_options(&decl.name, attribute)?,
        None => RecordOptions::default(),
    };

    Ok(TypeShape {
        namespaces,
        usings: local_usings(&ctx.tree.usings),
        name: decl.name.clone(),
        type_params: decl.type_params.clone(),
        kind,
        properties,
        has_partial: decl.has_modifier("partial"),
        options,
    })
}

/// Global usings apply project-wide and are not repeated in the companion.
fn local_usings(usings: &[record_syntax::UsingDirective]) -> Vec<String> {
    usings
        .iter()
        .filter(|u| !u.text.starts_with("global "))
        .map(|u| u.text.clone())
        .collect()
}

fn read_options(type_name: &str, attribute: &Attribute) -> Result<RecordOptions, ShapeError> {
    let mut options = RecordOptions::default();

    if let Some(value) = attribute.named_arg(PRIMARY_CTOR_ACCESS) {
        match value {
            AttributeValue::Str(access) if ACCESS_MODIFIERS.contains(&access.trim()) => {
                options.primary_ctor_access = access.trim().to_string();
            }
            other => return Err(invalid_option(type_name, PRIMARY_CTOR_ACCESS, other)),
        }
    }

    if let Some(value) = attribute.named_arg(GENERATE_MUTATORS) {
        match value {
            AttributeValue::Bool(flag) => options.generate_mutators = *flag,
            other => return Err(invalid_option(type_name, GENERATE_MUTATORS, other)),
        }
    }

    Ok(options)
}

fn invalid_option(type_name: &str, option: &str, value: &AttributeValue) -> ShapeError {
    let value = match value {
        AttributeValue::Str(s) => format!("\"{}\"", s),
        AttributeValue::Bool(b) => b.to_string(),
        AttributeValue::Other(text) => text.clone(),
    };
    ShapeError::InvalidOption {
        type_name: type_name.to_string(),
        option: option.to_string(),
        value,
    }
}
