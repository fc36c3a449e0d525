//! Generate companion partial source from a type shape.
//!
//! Output layout:
//! - Banner comment, then the source's `using` directives
//! - One namespace block per source namespace scope, each repeating that
//!   scope's own `using` directives
//! - The stamped partial declaration with a constructor taking every property
//!   in declaration order, and one `With<Property>` mutator per property
//!
//! The output is a pure function of the shape and version: same input, same bytes.

use crate::shape::TypeShape;
use crate::stamp;

pub const BANNER: &[&str] = &[
    "// Record partial generated by RecordGenerator",
    "// WARNING any changes made to this file will be lost when generator is run again",
];

const INDENT: &str = "    ";

/// Full companion source for `shape`, stamped with `version`.
pub fn synthesize(shape: &TypeShape, version: &str) -> String {
    let mut lines: Vec<String> = BANNER.iter().map(|l| l.to_string()).collect();
    lines.push(String::new());

    if !shape.usings.is_empty() {
        lines.extend(shape.usings.iter().cloned());
        lines.push(String::new());
    }

    let mut depth = 0;
    for ns in &shape.namespaces {
        lines.push(indented(depth, &format!("namespace {}", ns.name)));
        lines.push(indented(depth, "{"));
        depth += 1;
        if !ns.usings.is_empty() {
            for using in &ns.usings {
                lines.push(indented(depth, using));
            }
            lines.push(String::new());
        }
    }

    lines.push(indented(depth, &stamp::encode(version)));
    lines.push(indented(
        depth,
        &format!(
            "partial {} {}",
            shape.kind.keyword(),
            shape.type_name_with_params()
        ),
    ));
    lines.push(indented(depth, "{"));
    for line in member_lines(shape) {
        if line.is_empty() {
            lines.push(line);
        } else {
            lines.push(indented(depth + 1, &line));
        }
    }
    lines.push(indented(depth, "}"));

    while depth > 0 {
        depth -= 1;
        lines.push(indented(depth, "}"));
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// Members of the companion body, unindented.
pub fn synthesize_body(shape: &TypeShape) -> String {
    member_lines(shape).join("\n")
}

fn member_lines(shape: &TypeShape) -> Vec<String> {
    let mut lines = Vec::new();
    let args = shape
        .properties
        .iter()
        .map(|p| p.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    let params = shape
        .properties
        .iter()
        .map(|p| format!("{} {}", p.type_text, p.name))
        .collect::<Vec<_>>()
        .join(", ");
    lines.push(format!(
        "{} {}({})",
        shape.options.primary_ctor_access, shape.name, params
    ));
    lines.push("{".to_string());
    for p in &shape.properties {
        lines.push(format!("{}this.{} = {};", INDENT, p.name, p.name));
    }
    lines.push("}".to_string());

    if shape.options.generate_mutators {
        let self_type = shape.type_name_with_params();
        for p in &shape.properties {
            lines.push(String::new());
            lines.push(format!(
                "public {} {}({} {})",
                self_type,
                mutator_name(&p.name),
                p.type_text,
                p.name
            ));
            lines.push("{".to_string());
            lines.push(format!("{}return new {}({});", INDENT, self_type, args));
            lines.push("}".to_string());
        }
    }

    lines
}

/// `With` + property name. A verbatim `@` prefix belongs to the identifier
/// token, not its value: `@class` gives `Withclass`.
pub fn mutator_name(property: &str) -> String {
    format!("With{}", property.strip_prefix('@').unwrap_or(property))
}

fn indented(depth: usize, line: &str) -> String {
    format!("{}{}", INDENT.repeat(depth), line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::{NamespaceShape, ShapeKind};

    #[test]
    fn test_basic_companion_layout() {
        let shape = TypeShape::new("Person")
            .in_namespace("RecordGeneratorTests")
            .with_property("string", "FirstName")
            .with_property("string", "LastName");

        let expected = r#"// Record partial generated by RecordGenerator
// WARNING any changes made to this file will be lost when generator is run again

namespace RecordGeneratorTests
{
    [System.CodeDom.Compiler.GeneratedCode("RecordGenerator", "1.0.0")]
    partial class Person
    {
        public Person(string FirstName, string LastName)
        {
            this.FirstName = FirstName;
            this.LastName = LastName;
        }

        public Person WithFirstName(string FirstName)
        {
            return new Person(FirstName, LastName);
        }

        public Person WithLastName(string LastName)
        {
            return new Person(FirstName, LastName);
        }
    }
}
"#;
        assert_eq!(synthesize(&shape, "1.0.0"), expected);
    }

    #[test]
    fn test_generic_parameters_propagate() {
        let shape = TypeShape::new("Person")
            .with_type_params(["T"])
            .with_property("T", "OtherProperty");
        let out = synthesize(&shape, "1.0.0");

        assert!(out.contains("partial class Person<T>\n"));
        assert!(out.contains("public Person(T OtherProperty)\n"));
        assert!(out.contains("public Person<T> WithOtherProperty(T OtherProperty)\n"));
        assert!(out.contains("return new Person<T>(OtherProperty);\n"));
    }

    #[test]
    fn test_empty_namespace_has_no_wrapper() {
        let shape = TypeShape::new("Point").with_property("int", "X");
        let out = synthesize(&shape, "1.0.0");
        assert!(!out.contains("namespace"));
        assert!(out.contains("\n[System.CodeDom.Compiler.GeneratedCode(\"RecordGenerator\", \"1.0.0\")]\npartial class Point\n{\n"));
        assert!(out.ends_with("}\n"));
    }

    #[test]
    fn test_nested_namespace_usings() {
        let mut shape = TypeShape::new("Person").with_property("string", "Name");
        shape.usings = vec!["using System;".to_string()];
        shape.namespaces = vec![
            NamespaceShape {
                name: "Outer".to_string(),
                usings: vec!["using System.Linq;".to_string()],
            },
            NamespaceShape {
                name: "Inner.InnerMost".to_string(),
                usings: Vec::new(),
            },
        ];
        let out = synthesize(&shape, "1.0.0");

        let expected_head = "\n\nusing System;\n\nnamespace Outer\n{\n    using System.Linq;\n\n    namespace Inner.InnerMost\n    {\n        [System";
        assert!(out.contains(expected_head), "{}", out);
        assert!(out.ends_with("        }\n    }\n}\n"));
    }

    #[test]
    fn test_struct_options_and_empty_record() {
        let mut shape = TypeShape::new("Empty");
        shape.kind = ShapeKind::Struct;
        shape.options.primary_ctor_access = "internal".to_string();
        assert_eq!(synthesize_body(&shape), "internal Empty()\n{\n}");
        assert!(synthesize(&shape, "1").contains("partial struct Empty\n"));

        shape = shape.with_property("int", "A");
        shape.options.generate_mutators = false;
        assert!(!synthesize_body(&shape).contains("WithA"));
    }

    #[test]
    fn test_verbatim_property_mutator() {
        let shape = TypeShape::new("P").with_property("string", "@class");
        let body = synthesize_body(&shape);
        assert!(body.contains("public P(string @class)\n"));
        assert!(body.contains("this.@class = @class;"));
        assert!(body.contains("public P Withclass(string @class)\n"));
        assert_eq!(mutator_name("Name"), "WithName");
    }

    #[test]
    fn test_synthesize_is_deterministic() {
        let shape = TypeShape::new("Person")
            .in_namespace("N")
            .with_type_params(["TKey", "TValue"])
            .with_property("IDictionary<TKey, TValue>", "Items")
            .with_property("DateTime", "Birthday");
        assert_eq!(synthesize(&shape, "3.1"), synthesize(&shape, "3.1"));
    }
}
