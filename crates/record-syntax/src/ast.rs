//! Declaration-level syntax tree.
//!
//! Only declarations are modelled. Method bodies, initializers and expression
//! bodies are skipped as balanced token runs; each member still keeps the text of
//! every token it spans so two members can be compared token by token.

use serde::Serialize;
use std::fmt;

/// Byte range plus the 1-based line/column of its first character.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: u32,
    pub column: u32,
}

impl Span {
    /// Span covering `self` through `other`, keeping `self`'s position.
    pub fn to(self, other: Span) -> Span {
        Span {
            start: self.start,
            end: other.end.max(self.end),
            line: self.line,
            column: self.column,
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A parsed source file.
#[derive(Debug, Clone, Default)]
pub struct SyntaxTree {
    /// The text the tree was parsed from; spans index into it.
    pub source: String,
    /// Compilation-unit level `using` directives.
    pub usings: Vec<UsingDirective>,
    pub items: Vec<Item>,
}

/// A `using` directive, kept verbatim (`using System.Linq;`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsingDirective {
    pub text: String,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum Item {
    Namespace(NamespaceDecl),
    Type(TypeDecl),
    /// Top-level statements and anything else that is not a declaration.
    Other(Span),
}

#[derive(Debug, Clone)]
pub struct NamespaceDecl {
    /// Name as written, possibly dotted (`Inner.InnerMost`).
    pub name: String,
    /// `namespace A.B;` rather than a braced block.
    pub file_scoped: bool,
    pub usings: Vec<UsingDirective>,
    pub items: Vec<Item>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    Class,
    Struct,
    Interface,
    Enum,
    Record,
    RecordStruct,
    Delegate,
}

impl TypeKind {
    pub fn keyword(self) -> &'static str {
        match self {
            TypeKind::Class => "class",
            TypeKind::Struct => "struct",
            TypeKind::Interface => "interface",
            TypeKind::Enum => "enum",
            TypeKind::Record => "record",
            TypeKind::RecordStruct => "record struct",
            TypeKind::Delegate => "delegate",
        }
    }
}

#[derive(Debug, Clone)]
pub struct TypeDecl {
    pub attributes: Vec<AttributeList>,
    pub modifiers: Vec<String>,
    pub kind: TypeKind,
    pub name: String,
    pub name_span: Span,
    /// Span of the `class`/`struct`/... keyword; modifiers are inserted before it.
    pub keyword_span: Span,
    pub type_params: Vec<String>,
    pub members: Vec<Member>,
    /// Text range strictly between the body braces, if the type has a body.
    pub body_span: Option<Span>,
    /// Whole declaration, attributes included.
    pub span: Span,
}

impl TypeDecl {
    pub fn has_modifier(&self, modifier: &str) -> bool {
        self.modifiers.iter().any(|m| m == modifier)
    }

    pub fn arity(&self) -> usize {
        self.type_params.len()
    }

    /// All attributes across every attribute list, in source order.
    pub fn all_attributes(&self) -> impl Iterator<Item = &Attribute> {
        self.attributes.iter().flat_map(|list| list.attributes.iter())
    }

    /// Source text of the body (between the braces).
    pub fn body_text<'s>(&self, source: &'s str) -> Option<&'s str> {
        self.body_span.and_then(|span| source.get(span.start..span.end))
    }
}

#[derive(Debug, Clone)]
pub struct AttributeList {
    /// `assembly`, `return`, ... when written as `[target: ...]`.
    pub target: Option<String>,
    pub attributes: Vec<Attribute>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct Attribute {
    /// Name as written, with `.`/`::` separators preserved (`System.CodeDom.Compiler.GeneratedCode`).
    pub name: String,
    pub args: Vec<AttributeArg>,
    pub span: Span,
}

impl Attribute {
    /// Last segment of the name, without any `global::` or namespace qualification.
    pub fn simple_name(&self) -> &str {
        self.name
            .rsplit(|c| c == '.' || c == ':')
            .next()
            .unwrap_or(&self.name)
    }

    pub fn positional_args(&self) -> impl Iterator<Item = &AttributeValue> {
        self.args
            .iter()
            .filter(|arg| arg.name.is_none())
            .map(|arg| &arg.value)
    }

    pub fn named_arg(&self, name: &str) -> Option<&AttributeValue> {
        self.args
            .iter()
            .find(|arg| arg.name.as_deref() == Some(name))
            .map(|arg| &arg.value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeArg {
    /// `Name = value` or `name: value`; `None` for positional arguments.
    pub name: Option<String>,
    pub value: AttributeValue,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeValue {
    /// A single string literal, decoded.
    Str(String),
    Bool(bool),
    /// Any other expression, rendered from its tokens.
    Other(String),
}

#[derive(Debug, Clone)]
pub enum Member {
    Property(PropertyDecl),
    Constructor(MethodDecl),
    Method(MethodDecl),
    Field(OtherMember),
    Type(TypeDecl),
    /// Indexers, events, operators, destructors, stray tokens.
    Other(OtherMember),
}

impl Member {
    pub fn name(&self) -> &str {
        match self {
            Member::Property(p) => &p.name,
            Member::Constructor(m) | Member::Method(m) => &m.name,
            Member::Field(o) | Member::Other(o) => &o.name,
            Member::Type(t) => &t.name,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Member::Property(p) => p.span,
            Member::Constructor(m) | Member::Method(m) => m.span,
            Member::Field(o) | Member::Other(o) => o.span,
            Member::Type(t) => t.span,
        }
    }

    /// Token texts of the member, or empty for nested types.
    pub fn tokens(&self) -> &[String] {
        match self {
            Member::Property(p) => &p.tokens,
            Member::Constructor(m) | Member::Method(m) => &m.tokens,
            Member::Field(o) | Member::Other(o) => &o.tokens,
            Member::Type(_) => &[],
        }
    }

    pub fn kind_label(&self) -> &'static str {
        match self {
            Member::Property(_) => "property",
            Member::Constructor(_) => "constructor",
            Member::Method(_) => "method",
            Member::Field(_) => "field",
            Member::Type(_) => "nested type",
            Member::Other(_) => "member",
        }
    }
}

#[derive(Debug, Clone)]
pub struct PropertyDecl {
    pub attributes: Vec<AttributeList>,
    pub modifiers: Vec<String>,
    pub type_text: String,
    pub name: String,
    pub name_span: Span,
    pub accessors: Vec<Accessor>,
    /// `T Name => expr;`
    pub expression_bodied: bool,
    /// `{ get; } = value;`
    pub has_initializer: bool,
    pub span: Span,
    pub tokens: Vec<String>,
}

impl PropertyDecl {
    pub fn has_modifier(&self, modifier: &str) -> bool {
        self.modifiers.iter().any(|m| m == modifier)
    }

    /// An auto-property: accessor list present and no accessor has a body.
    pub fn is_auto(&self) -> bool {
        !self.expression_bodied
            && !self.accessors.is_empty()
            && self.accessors.iter().all(|a| !a.has_body)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Accessor {
    /// `get`, `set`, `init`, ...
    pub keyword: String,
    pub has_body: bool,
}

#[derive(Debug, Clone)]
pub struct MethodDecl {
    pub attributes: Vec<AttributeList>,
    pub modifiers: Vec<String>,
    /// `None` for constructors.
    pub return_type: Option<String>,
    pub name: String,
    pub name_span: Span,
    pub type_params: Vec<String>,
    pub params: Vec<Parameter>,
    pub span: Span,
    pub tokens: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    /// `ref`, `out`, `in`, `params`, `this`, ...
    pub modifiers: Vec<String>,
    pub type_text: String,
    pub name: String,
    pub default: Option<String>,
}

#[derive(Debug, Clone)]
pub struct OtherMember {
    pub name: String,
    pub span: Span,
    pub tokens: Vec<String>,
}

/// An enclosing scope of a type declaration.
#[derive(Debug, Clone, Copy)]
pub enum Scope<'a> {
    Namespace(&'a NamespaceDecl),
    Type(&'a TypeDecl),
}

/// A type declaration together with every scope that encloses it, outermost first.
#[derive(Debug, Clone)]
pub struct DeclarationContext<'a> {
    pub tree: &'a SyntaxTree,
    pub scopes: Vec<Scope<'a>>,
    pub declaration: &'a TypeDecl,
}

impl<'a> DeclarationContext<'a> {
    /// Names of the enclosing namespace scopes, outermost first, as written.
    pub fn namespace_names(&self) -> Vec<&'a str> {
        self.scopes
            .iter()
            .filter_map(|scope| match scope {
                Scope::Namespace(ns) => Some(ns.name.as_str()),
                Scope::Type(_) => None,
            })
            .collect()
    }

    /// Full dotted namespace (`A.B.C`), empty for the global namespace.
    pub fn namespace(&self) -> String {
        self.namespace_names().join(".")
    }

    pub fn enclosing_types(&self) -> Vec<&'a TypeDecl> {
        self.scopes
            .iter()
            .filter_map(|scope| match scope {
                Scope::Type(ty) => Some(*ty),
                Scope::Namespace(_) => None,
            })
            .collect()
    }
}

impl SyntaxTree {
    /// Every type declaration in the tree, nested ones included, in source order.
    pub fn declarations(&self) -> Vec<DeclarationContext<'_>> {
        let mut out = Vec::new();
        let mut scopes = Vec::new();
        collect_items(self, &self.items, &mut scopes, &mut out);
        out
    }

    /// True when any type in the tree (at any depth) satisfies `pred`.
    pub fn any_type(&self, pred: impl Fn(&TypeDecl) -> bool) -> bool {
        self.declarations().iter().any(|ctx| pred(ctx.declaration))
    }
}

fn collect_items<'a>(
    tree: &'a SyntaxTree,
    items: &'a [Item],
    scopes: &mut Vec<Scope<'a>>,
    out: &mut Vec<DeclarationContext<'a>>,
) {
    for item in items {
        match item {
            Item::Namespace(ns) => {
                scopes.push(Scope::Namespace(ns));
                collect_items(tree, &ns.items, scopes, out);
                scopes.pop();
            }
            Item::Type(ty) => collect_type(tree, ty, scopes, out),
            Item::Other(_) => {}
        }
    }
}

fn collect_type<'a>(
    tree: &'a SyntaxTree,
    ty: &'a TypeDecl,
    scopes: &mut Vec<Scope<'a>>,
    out: &mut Vec<DeclarationContext<'a>>,
) {
    out.push(DeclarationContext {
        tree,
        scopes: scopes.clone(),
        declaration: ty,
    });
    scopes.push(Scope::Type(ty));
    for member in &ty.members {
        if let Member::Type(nested) = member {
            collect_type(tree, nested, scopes, out);
        }
    }
    scopes.pop();
}
