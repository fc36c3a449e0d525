//! Record Syntax
//!
//! Declaration-level C# parsing for the record generator.
//!
//! This crate turns C# source text into a syntax tree that is just detailed
//! enough to reason about type declarations:
//!
//! - **Scopes**: `using` directives, block and file-scoped namespaces
//! - **Types**: attributes (with arguments), modifiers, kind, name, type parameters
//! - **Members**: properties with accessors, constructors and methods with
//!   parameters, fields, nested types
//!
//! Statement and expression bodies are skipped as balanced token runs, but every
//! member keeps its token texts so two members can be compared token by token.
//!
//! # Example
//!
//! ```
//! use record_syntax::parse;
//!
//! let tree = parse("namespace Shop { partial class Order { public int Id { get; } } }").unwrap();
//! let decls = tree.declarations();
//! assert_eq!(decls[0].namespace(), "Shop");
//! assert_eq!(decls[0].declaration.name, "Order");
//! ```

pub mod ast;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod text;

// Re-export main types
pub use ast::{
    Accessor, Attribute, AttributeArg, AttributeList, AttributeValue, DeclarationContext, Item,
    Member, MethodDecl, NamespaceDecl, OtherMember, Parameter, PropertyDecl, Scope, Span,
    SyntaxTree, TypeDecl, TypeKind, UsingDirective,
};
pub use error::ParseError;
pub use parser::{parse, parse_members};
