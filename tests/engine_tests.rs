//! End-to-end scenarios through the library API: parse, extract, locate,
//! classify, synthesize and fix.

use record_generator::analysis::{analyze, FindingKind, SourceFile};
use record_generator::attribute::record_attribute_source;
use record_generator::config::GeneratorConfig;
use record_generator::fix::plan_fixes;
use record_generator::{
    classify, extract_shape, locate_companion, synthesize, ClassificationResult, InvalidReason,
    ShapeError, TypeShape,
};
use record_syntax::parse;

const NAMESPACE: &str = "RecordGeneratorTests";
const OLD_VERSION: &str = "0.0.123.456";
const VERSION: &str = "1.2.0";

fn config() -> GeneratorConfig {
    GeneratorConfig::default().with_version(VERSION)
}

fn attribute_file() -> SourceFile {
    SourceFile::new("RecordAttribute.cs", record_attribute_source(NAMESPACE, VERSION))
}

fn shape_of(source: &str, name: &str) -> Result<TypeShape, ShapeError> {
    let tree = parse(source).unwrap();
    let decls = tree.declarations();
    let ctx = decls
        .iter()
        .find(|ctx| ctx.declaration.name == name)
        .unwrap();
    extract_shape(ctx)
}

const BASIC: &str = r#"
namespace RecordGeneratorTests
{
    [Record]
    partial class Person
    {
        public string FirstName { get; }

        public string LastName { get; }
    }
}"#;

const GENERIC: &str = r#"
namespace RecordGeneratorTests
{
    [Record]
    partial class Person<T>
    {
        public T OtherProperty { get; }

        public string FirstName { get; }

        public string LastName { get; }

        public string Address { get; }

        public DateTime Birthday { get; }
    }
}"#;

const NESTED_NAMESPACES: &str = r#"
using System;
using System.Linq;

namespace RecordGeneratorTests
{
    namespace Outer
    {
        using SomethingInner;

        namespace Inner.InnerMost
        {
            [Record]
            partial class Person
            {
                public string FirstName { get; }
            }
        }
    }
}"#;

const NESTED_TYPES: &str = r#"
namespace RecordGeneratorTests
{
    class Outer
    {
        class Inner<T>
        {
            [Record]
            class Person
            {
                public string FirstName { get; }
            }
        }
    }
}"#;

#[test]
fn test_basic_properties_missing_then_generated() {
    let files = vec![SourceFile::new("Test0.cs", BASIC), attribute_file()];
    let report = analyze(&files, &config());
    assert_eq!(report.findings.len(), 1);
    assert_eq!(report.findings[0].kind, FindingKind::RecordPartialMissing);
    assert_eq!((report.findings[0].line, report.findings[0].column), (5, 19));

    let shape = shape_of(BASIC, "Person").unwrap();
    let expected = r#"// Record partial generated by RecordGenerator
// WARNING any changes made to this file will be lost when generator is run again

namespace RecordGeneratorTests
{
    [System.CodeDom.Compiler.GeneratedCode("RecordGenerator", "1.2.0")]
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
    assert_eq!(synthesize(&shape, VERSION), expected);
}

#[test]
fn test_declaration_without_partial() {
    let source = BASIC.replace("partial class Person", "class Person");
    let files = vec![SourceFile::new("Test0.cs", source.as_str()), attribute_file()];
    let report = analyze(&files, &config());
    assert_eq!(report.findings.len(), 1);
    assert_eq!(report.findings[0].kind, FindingKind::RecordPartialMissing);
    assert_eq!((report.findings[0].line, report.findings[0].column), (5, 11));

    let plan = plan_fixes(&files, &report, &config());
    let fixed_source = plan
        .edits
        .iter()
        .find(|e| e.path.to_str() == Some("Test0.cs"))
        .unwrap();
    assert_eq!(fixed_source.contents, BASIC);
}

#[test]
fn test_generic_multi_property_record() {
    let shape = shape_of(GENERIC, "Person").unwrap();
    let out = synthesize(&shape, VERSION);

    assert!(out.contains(
        "        public Person(T OtherProperty, string FirstName, string LastName, string Address, DateTime Birthday)\n"
    ));
    for property in ["OtherProperty", "FirstName", "LastName", "Address", "Birthday"] {
        assert!(out.contains(&format!("            this.{0} = {0};\n", property)));
    }
    assert!(out.contains("        public Person<T> WithBirthday(DateTime Birthday)\n"));
    assert_eq!(
        out.matches("return new Person<T>(OtherProperty, FirstName, LastName, Address, Birthday);")
            .count(),
        5
    );

    let with_positions: Vec<usize> = ["WithOtherProperty", "WithFirstName", "WithLastName", "WithAddress", "WithBirthday"]
        .iter()
        .map(|name| out.find(name).unwrap())
        .collect();
    assert!(with_positions.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_nested_namespaces_with_usings() {
    let shape = shape_of(NESTED_NAMESPACES, "Person").unwrap();
    let expected = r#"// Record partial generated by RecordGenerator
// WARNING any changes made to this file will be lost when generator is run again

using System;
using System.Linq;

namespace RecordGeneratorTests
{
    namespace Outer
    {
        using SomethingInner;

        namespace Inner.InnerMost
        {
            [System.CodeDom.Compiler.GeneratedCode("RecordGenerator", "1.2.0")]
            partial class Person
            {
                public Person(string FirstName)
                {
                    this.FirstName = FirstName;
                }

                public Person WithFirstName(string FirstName)
                {
                    return new Person(FirstName);
                }
            }
        }
    }
}
"#;
    assert_eq!(synthesize(&shape, VERSION), expected);

    let files = vec![SourceFile::new("Test0.cs", NESTED_NAMESPACES), attribute_file()];
    let report = analyze(&files, &config());
    assert_eq!((report.findings[0].line, report.findings[0].column), (14, 27));
}

#[test]
fn test_nested_types_are_refused() {
    let err = shape_of(NESTED_TYPES, "Person").unwrap_err();
    match &err {
        ShapeError::UnsupportedShape { type_name, enclosing } => {
            assert_eq!(type_name, "Person");
            let chain: Vec<(&str, usize)> = enclosing
                .iter()
                .map(|t| (t.name.as_str(), t.arity))
                .collect();
            assert_eq!(chain, vec![("Outer", 0), ("Inner", 1)]);
        }
        other => panic!("unexpected {:?}", other),
    }

    let files = vec![SourceFile::new("Test0.cs", NESTED_TYPES), attribute_file()];
    let report = analyze(&files, &config());
    assert_eq!(report.findings.len(), 1);
    assert_eq!(report.findings[0].kind, FindingKind::RecordShapeUnsupported);
    let plan = plan_fixes(&files, &report, &config());
    assert!(plan.is_empty());
}

#[test]
fn test_same_and_different_generator_version() {
    let shape = shape_of(BASIC, "Person").unwrap();
    for (companion_version, expected) in [
        (VERSION, ClassificationResult::UpToDate),
        (
            OLD_VERSION,
            ClassificationResult::VersionMismatch {
                found: Some(OLD_VERSION.to_string()),
                current: VERSION.to_string(),
            },
        ),
    ] {
        let trees = vec![
            parse(BASIC).unwrap(),
            parse(&synthesize(&shape, companion_version)).unwrap(),
        ];
        let artifact = locate_companion(&shape, &trees);
        assert_eq!(classify(&shape, artifact.as_ref(), VERSION), expected);
    }

    let files = vec![
        SourceFile::new("Test0.cs", BASIC),
        attribute_file(),
        SourceFile::new("Person.RecordPartial.cs", synthesize(&shape, OLD_VERSION)),
    ];
    let report = analyze(&files, &config());
    assert_eq!(report.findings.len(), 1);
    assert_eq!(report.findings[0].kind, FindingKind::GeneratorVersionDifferent);
    assert_eq!((report.findings[0].line, report.findings[0].column), (5, 19));

    let plan = plan_fixes(&files, &report, &config());
    assert_eq!(plan.edits.len(), 1);
    assert_eq!(plan.edits[0].contents, synthesize(&shape, VERSION));
}

#[test]
fn test_companion_missing_a_mutator_is_invalid() {
    let shape = shape_of(BASIC, "Person").unwrap();
    let generated = synthesize(&shape, OLD_VERSION);
    let start = generated.find("        public Person WithLastName").unwrap();
    let end = generated[start..].find("        }\n").unwrap() + start + "        }\n".len();
    let mut edited = generated.clone();
    edited.replace_range(start..end, "");

    let trees = vec![parse(&edited).unwrap()];
    let artifact = locate_companion(&shape, &trees);
    assert_eq!(
        classify(&shape, artifact.as_ref(), VERSION),
        ClassificationResult::Invalid {
            reason: InvalidReason::MissingMutator("WithLastName".to_string())
        }
    );
}

#[test]
fn test_empty_namespace_round_trip() {
    let source = "[Record]\npartial struct Point\n{\n    public int X { get; }\n    public int Y { get; }\n}\n";
    let shape = shape_of(source, "Point").unwrap();
    let generated = synthesize(&shape, VERSION);
    assert!(!generated.contains("namespace"));
    assert!(generated.contains("partial struct Point\n"));

    let trees = vec![parse(source).unwrap(), parse(&generated).unwrap()];
    let artifact = locate_companion(&shape, &trees);
    assert!(classify(&shape, artifact.as_ref(), VERSION).is_up_to_date());
}

const PROPERTY_TYPES: &str = r#"
using System.Collections.Generic;

namespace RecordGeneratorTests
{
    [Record]
    public partial class Bag
    {
        public (int a, string b) Pair { get; }
        public new (int, int) Hidden { get; }
        public string? Nickname { get; }
        public int?[] Scores { get; }
        public Dictionary<string, List<int>> Groups { get; }
        public global::System.Uri Home { get; }
        public string @class { get; }
    }
}
"#;

const STRUCT_WITHOUT_MUTATORS: &str = r#"
namespace RecordGeneratorTests
{
    [Record(GenerateMutators = false, PrimaryCtorAccess = "internal")]
    readonly partial struct Money
    {
        public decimal Amount { get; }
        public string Currency { get; }
    }
}
"#;

const FILE_SCOPED: &str = r#"using System;

namespace RecordGeneratorTests.Orders;

[Record]
public sealed partial class Order
{
    public Guid Id { get; }
    public DateTime Placed { get; }
}
"#;

#[test]
fn test_property_types_survive_extraction() {
    let shape = shape_of(PROPERTY_TYPES, "Bag").unwrap();
    let props: Vec<(&str, &str)> = shape
        .properties
        .iter()
        .map(|p| (p.name.as_str(), p.type_text.as_str()))
        .collect();
    assert_eq!(
        props,
        vec![
            ("Pair", "(int a, string b)"),
            ("Hidden", "(int, int)"),
            ("Nickname", "string?"),
            ("Scores", "int?[]"),
            ("Groups", "Dictionary<string, List<int>>"),
            ("Home", "global::System.Uri"),
            ("@class", "string"),
        ]
    );

    let generated = synthesize(&shape, VERSION);
    assert!(generated.contains(
        "public Bag((int a, string b) Pair, (int, int) Hidden, string? Nickname, int?[] Scores, Dictionary<string, List<int>> Groups, global::System.Uri Home, string @class)\n"
    ));
    assert!(generated.contains("this.@class = @class;"));
    assert!(generated.contains("public Bag Withclass(string @class)\n"));
    assert!(generated.contains("public Bag WithPair((int a, string b) Pair)\n"));
}

#[test]
fn test_synthesis_is_idempotent_and_deterministic() {
    for (source, name) in [
        (BASIC, "Person"),
        (GENERIC, "Person"),
        (NESTED_NAMESPACES, "Person"),
        (PROPERTY_TYPES, "Bag"),
        (STRUCT_WITHOUT_MUTATORS, "Money"),
        (FILE_SCOPED, "Order"),
    ] {
        let shape = shape_of(source, name).unwrap();
        let first = synthesize(&shape, VERSION);
        assert_eq!(first, synthesize(&shape, VERSION));

        let trees = vec![parse(&first).unwrap()];
        let artifact = locate_companion(&shape, &trees);
        assert_eq!(
            classify(&shape, artifact.as_ref(), VERSION),
            ClassificationResult::UpToDate
        );
    }
}

#[test]
fn test_round_trip_through_analysis() {
    for (source, name) in [
        (PROPERTY_TYPES, "Bag"),
        (STRUCT_WITHOUT_MUTATORS, "Money"),
        (FILE_SCOPED, "Order"),
    ] {
        let shape = shape_of(source, name).unwrap();
        let files = vec![
            SourceFile::new(format!("{}.cs", name), source),
            SourceFile::new(format!("{}.RecordPartial.cs", name), synthesize(&shape, VERSION)),
            attribute_file(),
        ];
        let report = analyze(&files, &config());
        assert!(report.is_clean(), "{}: {:?}", name, report.findings);
        assert!(report.parse_failures.is_empty());
    }
}
