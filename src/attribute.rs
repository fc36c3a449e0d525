//! Bootstrap source for the `RecordAttribute` declaration.
//!
//! `[Record]` only binds when the project declares the attribute type. The
//! declaration is emitted once per project, stamped like a companion, and is
//! marked `Conditional("NEVER")` so it never reaches compiled metadata.

use crate::stamp;

/// File stem of the bootstrap declaration.
pub const FILENAME: &str = "RecordAttribute";

/// Source of the `RecordAttribute` declaration, inside `namespace` unless it is empty.
pub fn record_attribute_source(namespace: &str, version: &str) -> String {
    let body = [
        "/// <summary>",
        "/// Identifies class or struct that is supposed to have a partial with ctor and mutators generated by source generator.",
        "/// </summary>",
        stamp::encode(version).as_str(),
        "[System.Diagnostics.Conditional(\"NEVER\")]",
        "[System.AttributeUsage(System.AttributeTargets.Class | System.AttributeTargets.Struct, Inherited = false, AllowMultiple = false)]",
        "internal sealed class RecordAttribute : System.Attribute",
        "{",
        "    public RecordAttribute()",
        "    {",
        "    }",
        "",
        "    /// <summary>",
        "    /// Gets or sets the access modifier of the generated constructor. Default is \"public\".",
        "    /// </summary>",
        "    public string PrimaryCtorAccess { get; set; } = \"public\";",
        "",
        "    /// <summary>",
        "    /// Gets or sets whether mutator methods should be generated (e.g. WithSurname). Default is true.",
        "    /// </summary>",
        "    public bool GenerateMutators { get; set; } = true;",
        "}",
    ]
    .iter()
    .map(|line| line.to_string())
    .collect::<Vec<_>>();

    let mut lines = Vec::new();
    if namespace.is_empty() {
        lines.extend(body);
    } else {
        lines.push(format!("namespace {}", namespace));
        lines.push("{".to_string());
        lines.extend(body.into_iter().map(|line| {
            if line.is_empty() {
                line
            } else {
                format!("    {}", line)
            }
        }));
        lines.push("}".to_string());
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}
