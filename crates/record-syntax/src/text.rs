//! Rendering token runs back to canonical text.
//!
//! Type names and attribute expressions are stored as rendered text, so the
//! spacing rules here decide what "identical type text" means.

use crate::lexer::{Token, TokenKind};

/// Render tokens with canonical C# spacing: `Dictionary<string, int>`,
/// `int[,]`, `string?`, `global::System.Uri`.
pub fn render_tokens(tokens: &[Token]) -> String {
    let mut out = String::new();
    let mut prev: Option<&Token> = None;
    for token in tokens {
        if let Some(prev) = prev {
            if needs_space(prev, token) {
                out.push(' ');
            }
        }
        out.push_str(&token.text);
        prev = Some(token);
    }
    out
}

fn needs_space(prev: &Token, next: &Token) -> bool {
    let tight_after = prev.kind == TokenKind::Punct
        && matches!(prev.text.as_str(), "(" | "[" | "<" | "." | "::" | "?." | "!" | "~");
    let tight_before = next.kind == TokenKind::Punct
        && matches!(
            next.text.as_str(),
            "," | ";" | ")" | "]" | ">" | "." | "?" | "[" | "::" | "?." | "(" | "<"
        );
    !(tight_after || tight_before)
}

/// Split a comma separated list at depth zero, respecting `()`, `[]`, `{}` and `<>`.
///
/// Given the tokens of `A, B<C, D>, E`, returns three runs.
pub fn split_top_level_commas(tokens: &[Token]) -> Vec<&[Token]> {
    let mut out = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (i, token) in tokens.iter().enumerate() {
        if token.kind != TokenKind::Punct {
            continue;
        }
        match token.text.as_str() {
            "(" | "[" | "{" | "<" => depth += 1,
            ")" | "]" | "}" | ">" => depth = (depth - 1).max(0),
            "," if depth == 0 => {
                out.push(&tokens[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if start < tokens.len() {
        out.push(&tokens[start..]);
    }
    out
}

/// Index of the delimiter closing the group opened at `open`.
///
/// Handles `(`, `[` and `{`, nesting across all three kinds.
pub fn matching_close(tokens: &[Token], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, token) in tokens.iter().enumerate().skip(open) {
        if token.kind != TokenKind::Punct {
            continue;
        }
        match token.text.as_str() {
            "(" | "[" | "{" => depth += 1,
            ")" | "]" | "}" => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Index of the `<` matching the `>` at `close`, scanning backwards.
pub fn matching_angle_open(tokens: &[Token], close: usize) -> Option<usize> {
    let mut depth = 0usize;
    for i in (0..=close).rev() {
        let token = &tokens[i];
        if token.is_punct(">") {
            depth += 1;
        } else if token.is_punct("<") {
            depth = depth.checked_sub(1)?;
            if depth == 0 {
                return Some(i);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::lex;

    fn render(src: &str) -> String {
        render_tokens(&lex(src).unwrap())
    }

    #[test]
    fn test_render_canonical_spacing() {
        assert_eq!(render("Dictionary < string,int >"), "Dictionary<string, int>");
        assert_eq!(render("int [ , ]"), "int[,]");
        assert_eq!(render("string ?"), "string?");
        assert_eq!(render("global :: System . Uri"), "global::System.Uri");
        assert_eq!(render("(int a, string b)"), "(int a, string b)");
        assert_eq!(render("List<List<int>>"), "List<List<int>>");
    }

    #[test]
    fn test_render_is_stable() {
        let once = render("IReadOnlyList< ( int,string ) >?");
        assert_eq!(render(&once), once);
    }

    #[test]
    fn test_split_top_level_commas() {
        let tokens = lex("u64, Map<K, V>, Func<int, (a, b)>").unwrap();
        let parts: Vec<String> = split_top_level_commas(&tokens)
            .into_iter()
            .map(render_tokens)
            .collect();
        assert_eq!(parts, vec!["u64", "Map<K, V>", "Func<int, (a, b)>"]);
    }

    #[test]
    fn test_matching_close_nests() {
        let tokens = lex("( a [ b ] { c } ) d").unwrap();
        assert_eq!(matching_close(&tokens, 0), Some(8));
        assert_eq!(matching_close(&lex("( a").unwrap(), 0), None);
    }
}
