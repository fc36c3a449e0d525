//! Generator version stamp.
//!
//! Every generated companion carries exactly one marker attribute:
//!
//! ```text
//! [System.CodeDom.Compiler.GeneratedCode("RecordGenerator", "<version>")]
//! ```
//!
//! Decoding is structural: the marker must be a real attribute on a type
//! declaration. A mention inside a comment or string literal is never a stamp.

use record_syntax::{parse, Attribute, AttributeValue};

/// Product name written as the first marker argument.
pub const PRODUCT_NAME: &str = "RecordGenerator";

const MARKER_NAMESPACE: &str = "System.CodeDom.Compiler.";

/// Render the marker attribute for `version`.
pub fn encode(version: &str) -> String {
    format!(
        "[System.CodeDom.Compiler.GeneratedCode(\"{}\", \"{}\")]",
        PRODUCT_NAME,
        escape(version)
    )
}

/// Version of the first stamped type declaration in `source`.
pub fn decode(source: &str) -> Option<String> {
    let tree = parse(source).ok()?;
    tree.declarations()
        .into_iter()
        .find_map(|ctx| ctx.declaration.all_attributes().find_map(decode_attribute))
}

/// Version carried by `attribute`, if it is a generator stamp.
pub fn decode_attribute(attribute: &Attribute) -> Option<String> {
    if !is_marker_name(&attribute.name) {
        return None;
    }
    if attribute.args.len() != 2 || attribute.args.iter().any(|arg| arg.name.is_some()) {
        return None;
    }
    let mut positional = attribute.positional_args();
    match (positional.next(), positional.next()) {
        (Some(AttributeValue::Str(product)), Some(AttributeValue::Str(version)))
            if product == PRODUCT_NAME =>
        {
            Some(version.clone())
        }
        _ => None,
    }
}

fn is_marker_name(name: &str) -> bool {
    let name = name.strip_prefix("global::").unwrap_or(name);
    let name = name.strip_prefix(MARKER_NAMESPACE).unwrap_or(name);
    matches!(name, "GeneratedCode" | "GeneratedCodeAttribute")
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out
}
