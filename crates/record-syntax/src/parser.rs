//! Declaration-level recursive descent parser.

use crate::ast::{
    Accessor, Attribute, AttributeArg, AttributeList, AttributeValue, Item, Member, MethodDecl,
    NamespaceDecl, OtherMember, Parameter, PropertyDecl, Span, SyntaxTree, TypeDecl, TypeKind,
    UsingDirective,
};
use crate::error::ParseError;
use crate::lexer::{lex, Token, TokenKind};
use crate::text::{matching_angle_open, matching_close, render_tokens, split_top_level_commas};
use tracing::trace;

const MODIFIERS: &[&str] = &[
    "public",
    "private",
    "protected",
    "internal",
    "static",
    "sealed",
    "abstract",
    "partial",
    "readonly",
    "unsafe",
    "new",
    "ref",
    "virtual",
    "override",
    "extern",
    "async",
    "volatile",
    "const",
    "required",
    "file",
    "fixed",
];

/// Modifiers that are also valid identifiers.
const CONTEXTUAL_MODIFIERS: &[&str] = &["partial", "async", "required", "file"];

const PARAMETER_MODIFIERS: &[&str] = &["ref", "out", "in", "params", "this", "scoped", "readonly"];

const ACCESSOR_MODIFIERS: &[&str] = &["public", "private", "protected", "internal", "readonly"];

/// Parse a complete source file.
pub fn parse(source: &str) -> Result<SyntaxTree, ParseError> {
    let tokens = lex(source)?;
    trace!(tokens = tokens.len(), bytes = source.len(), "lexed source");
    let mut parser = Parser::new(source, tokens);
    let (usings, items) = parser.parse_scope_items(false)?;
    Ok(SyntaxTree {
        source: source.to_string(),
        usings,
        items,
    })
}

/// Parse a bare member list, such as the text between a type's braces.
pub fn parse_members(source: &str) -> Result<Vec<Member>, ParseError> {
    let tokens = lex(source)?;
    let mut parser = Parser::new(source, tokens);
    parser.parse_member_list(true)
}

struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str, tokens: Vec<Token>) -> Self {
        Self {
            source,
            tokens,
            pos: 0,
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_at(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.pos + offset)
    }

    fn at_punct(&self, punct: &str) -> bool {
        self.peek().map_or(false, |t| t.is_punct(punct))
    }

    fn at_word(&self, word: &str) -> bool {
        self.peek().map_or(false, |t| t.is_word(word))
    }

    fn unexpected(&self, expected: &'static str) -> ParseError {
        match self.peek() {
            Some(token) => ParseError::UnexpectedToken {
                found: token.text.clone(),
                expected,
                span: token.span,
            },
            None => ParseError::UnexpectedEof { expected },
        }
    }

    fn expect_punct(&mut self, punct: &str, expected: &'static str) -> Result<Span, ParseError> {
        if self.at_punct(punct) {
            let span = self.tokens[self.pos].span;
            self.pos += 1;
            Ok(span)
        } else {
            Err(self.unexpected(expected))
        }
    }

    fn expect_ident(&mut self, expected: &'static str) -> Result<Token, ParseError> {
        match self.peek() {
            Some(token) if token.is_ident() => {
                let token = token.clone();
                self.pos += 1;
                Ok(token)
            }
            _ => Err(self.unexpected(expected)),
        }
    }

    /// Span from the token at `start` through the last consumed token.
    fn span_from(&self, start: usize) -> Span {
        let first = self.tokens[start].span;
        let last = self.tokens[self.pos.saturating_sub(1).max(start)].span;
        first.to(last)
    }

    fn token_texts(&self, start: usize) -> Vec<String> {
        self.tokens[start..self.pos]
            .iter()
            .map(|t| t.text.clone())
            .collect()
    }

    /// Skip the group opened at the current token and return the closing span.
    fn skip_group(&mut self) -> Result<Span, ParseError> {
        let open = &self.tokens[self.pos];
        let close = matching_close(&self.tokens, self.pos).ok_or(ParseError::UnbalancedDelimiter {
            open: open.text.chars().next().unwrap_or('('),
            span: open.span,
        })?;
        self.pos = close + 1;
        Ok(self.tokens[close].span)
    }

    /// Skip through the next `;` at depth zero, stepping over nested groups.
    fn skip_to_semicolon(&mut self) -> Result<(), ParseError> {
        loop {
            let token = self.peek().ok_or(ParseError::UnexpectedEof { expected: "`;`" })?;
            if token.kind == TokenKind::Punct {
                match token.text.as_str() {
                    ";" => {
                        self.pos += 1;
                        return Ok(());
                    }
                    "(" | "[" | "{" => {
                        self.skip_group()?;
                        continue;
                    }
                    ")" | "]" | "}" => return Err(self.unexpected("`;`")),
                    _ => {}
                }
            }
            self.pos += 1;
        }
    }

    /// Skip one statement: through `;`, or through a braced block and an optional `;`.
    fn skip_statement(&mut self) -> Result<(), ParseError> {
        loop {
            let token = self
                .peek()
                .ok_or(ParseError::UnexpectedEof { expected: "`;`" })?;
            if token.kind == TokenKind::Punct {
                match token.text.as_str() {
                    ";" => {
                        self.pos += 1;
                        return Ok(());
                    }
                    "{" => {
                        self.skip_group()?;
                        if self.at_punct(";") {
                            self.pos += 1;
                        }
                        return Ok(());
                    }
                    "(" | "[" => {
                        self.skip_group()?;
                        continue;
                    }
                    ")" | "]" | "}" => return Err(self.unexpected("statement")),
                    _ => {}
                }
            }
            self.pos += 1;
        }
    }

    fn parse_scope_items(
        &mut self,
        in_block: bool,
    ) -> Result<(Vec<UsingDirective>, Vec<Item>), ParseError> {
        let mut usings = Vec::new();
        let mut items = Vec::new();
        loop {
            let token = match self.peek() {
                Some(token) => token,
                None if in_block => return Err(ParseError::UnexpectedEof { expected: "`}`" }),
                None => break,
            };
            if token.is_punct("}") {
                if in_block {
                    break;
                }
                return Err(self.unexpected("declaration"));
            }
            if token.is_punct(";") {
                self.pos += 1;
                continue;
            }
            if self.at_using_directive() {
                usings.push(self.parse_using()?);
                continue;
            }
            if token.is_word("extern") && self.peek_at(1).map_or(false, |t| t.is_word("alias")) {
                self.skip_to_semicolon()?;
                continue;
            }
            if token.is_word("namespace") {
                items.push(Item::Namespace(self.parse_namespace()?));
                continue;
            }
            items.push(self.parse_item()?);
        }
        Ok((usings, items))
    }

    fn at_using_directive(&self) -> bool {
        let offset = if self.at_word("global") { 1 } else { 0 };
        let is_using = self.peek_at(offset).map_or(false, |t| t.is_word("using"));
        let statement = self
            .peek_at(offset + 1)
            .map_or(false, |t| t.is_punct("(") || t.is_word("var"));
        is_using && !statement
    }

    fn parse_using(&mut self) -> Result<UsingDirective, ParseError> {
        let start = self.pos;
        self.skip_to_semicolon()?;
        let span = self.span_from(start);
        Ok(UsingDirective {
            text: self.source[span.start..span.end].to_string(),
            span,
        })
    }

    fn parse_qualified_name(&mut self, expected: &'static str) -> Result<String, ParseError> {
        let mut name = self.expect_ident(expected)?.text;
        while self.at_punct(".") || self.at_punct("::") {
            name.push_str(&self.tokens[self.pos].text);
            self.pos += 1;
            name.push_str(&self.expect_ident(expected)?.text);
        }
        Ok(name)
    }

    fn parse_namespace(&mut self) -> Result<NamespaceDecl, ParseError> {
        let start = self.pos;
        self.pos += 1;
        let name = self.parse_qualified_name("namespace name")?;

        let file_scoped = self.at_punct(";");
        let (usings, items) = if file_scoped {
            self.pos += 1;
            self.parse_scope_items(false)?
        } else {
            self.expect_punct("{", "`{` or `;` after namespace name")?;
            let scope = self.parse_scope_items(true)?;
            self.expect_punct("}", "`}`")?;
            if self.at_punct(";") {
                self.pos += 1;
            }
            scope
        };

        Ok(NamespaceDecl {
            name,
            file_scoped,
            usings,
            items,
            span: self.span_from(start),
        })
    }

    fn parse_item(&mut self) -> Result<Item, ParseError> {
        let start = self.pos;
        let attributes = self.parse_attribute_lists()?;
        let modifiers = self.parse_modifiers(false);
        if let Some((kind, len)) = self.peek_type_keyword() {
            let decl = self.parse_type_decl(start, attributes, modifiers, kind, len)?;
            return Ok(Item::Type(decl));
        }
        // Assembly attributes, top-level statements, stray tokens.
        let stops_here = match self.peek() {
            None => true,
            Some(t) => t.is_punct("}") || t.is_word("namespace") || t.is_word("using"),
        };
        if self.pos == start || !stops_here {
            self.skip_statement()?;
        }
        Ok(Item::Other(self.span_from(start)))
    }

    /// Leading modifiers. Inside a member list a modifier may precede a tuple
    /// type, so `(` only ends the run for a top-level `new(`, which is an expression.
    fn parse_modifiers(&mut self, in_members: bool) -> Vec<String> {
        let mut modifiers = Vec::new();
        while let Some(token) = self.peek() {
            let new_expression = !in_members
                && token.is_word("new")
                && self.peek_at(1).map_or(false, |t| t.is_punct("("));
            let is_modifier =
                token.is_ident() && MODIFIERS.contains(&token.text.as_str()) && !new_expression;
            if !is_modifier {
                break;
            }
            modifiers.push(token.text.clone());
            self.pos += 1;
        }
        modifiers
    }

    fn peek_type_keyword(&self) -> Option<(TypeKind, usize)> {
        let token = self.peek()?;
        if !token.is_ident() {
            return None;
        }
        let next_is_ident = |offset: usize| self.peek_at(offset).map_or(false, |t| t.is_ident());
        match token.text.as_str() {
            "class" => Some((TypeKind::Class, 1)),
            "struct" => Some((TypeKind::Struct, 1)),
            "interface" => Some((TypeKind::Interface, 1)),
            "enum" => Some((TypeKind::Enum, 1)),
            "delegate" if next_is_ident(1) => Some((TypeKind::Delegate, 1)),
            "record" => match self.peek_at(1) {
                Some(t) if t.is_word("class") => Some((TypeKind::Record, 2)),
                Some(t) if t.is_word("struct") => Some((TypeKind::RecordStruct, 2)),
                Some(t) if t.is_ident() => Some((TypeKind::Record, 1)),
                _ => None,
            },
            _ => None,
        }
    }

    fn parse_type_decl(
        &mut self,
        start: usize,
        attributes: Vec<AttributeList>,
        modifiers: Vec<String>,
        kind: TypeKind,
        keyword_len: usize,
    ) -> Result<TypeDecl, ParseError> {
        let keyword_span = self.tokens[self.pos].span;
        self.pos += keyword_len;

        if kind == TypeKind::Delegate {
            return self.parse_delegate(start, attributes, modifiers, keyword_span);
        }

        let name = self.expect_ident("type name")?;
        let type_params = if self.at_punct("<") {
            self.parse_type_params()?
        } else {
            Vec::new()
        };
        if self.at_punct("(") {
            // Primary constructor parameters.
            self.skip_group()?;
        }

        // Base list and constraint clauses.
        loop {
            match self.peek() {
                None => return Err(ParseError::UnexpectedEof { expected: "type body" }),
                Some(t) if t.is_punct("{") || t.is_punct(";") => break,
                Some(t) if t.is_punct("(") || t.is_punct("[") => {
                    self.skip_group()?;
                }
                Some(t) if t.is_punct("}") => return Err(self.unexpected("type body")),
                Some(_) => self.pos += 1,
            }
        }

        let (members, body_span) = if self.at_punct(";") {
            self.pos += 1;
            (Vec::new(), None)
        } else {
            let open = self.tokens[self.pos].span;
            let (members, close) = if kind == TypeKind::Enum {
                (Vec::new(), self.skip_group()?)
            } else {
                self.pos += 1;
                let members = self.parse_member_list(false)?;
                (members, self.expect_punct("}", "`}`")?)
            };
            if self.at_punct(";") {
                self.pos += 1;
            }
            let body = Span {
                start: open.end,
                end: close.start,
                line: open.line,
                column: open.column + 1,
            };
            (members, Some(body))
        };

        Ok(TypeDecl {
            attributes,
            modifiers,
            kind,
            name: name.text,
            name_span: name.span,
            keyword_span,
            type_params,
            members,
            body_span,
            span: self.span_from(start),
        })
    }

    fn parse_delegate(
        &mut self,
        start: usize,
        attributes: Vec<AttributeList>,
        modifiers: Vec<String>,
        keyword_span: Span,
    ) -> Result<TypeDecl, ParseError> {
        let header_start = self.pos;
        self.skip_to_semicolon()?;
        let header = &self.tokens[header_start..self.pos];
        let paren = header
            .iter()
            .position(|t| t.is_punct("("))
            .ok_or(ParseError::UnexpectedToken {
                found: ";".to_string(),
                expected: "delegate parameter list",
                span: keyword_span,
            })?;
        let (name_idx, type_params) = name_before(header, paren);
        let name = name_idx
            .and_then(|i| header.get(i))
            .filter(|t| t.is_ident())
            .ok_or(ParseError::UnexpectedToken {
                found: "(".to_string(),
                expected: "delegate name",
                span: header[paren].span,
            })?;

        Ok(TypeDecl {
            attributes,
            modifiers,
            kind: TypeKind::Delegate,
            name: name.text.clone(),
            name_span: name.span,
            keyword_span,
            type_params,
            members: Vec::new(),
            body_span: None,
            span: self.span_from(start),
        })
    }

    fn parse_type_params(&mut self) -> Result<Vec<String>, ParseError> {
        let open = self.pos;
        let close = (open..self.tokens.len())
            .find(|&i| self.tokens[i].is_punct(">"))
            .ok_or(ParseError::UnbalancedDelimiter {
                open: '<',
                span: self.tokens[open].span,
            })?;
        let params = split_top_level_commas(&self.tokens[open + 1..close])
            .into_iter()
            .filter_map(|segment| {
                // `[attr] in T` / `out T`: the name is the last identifier.
                segment.iter().rev().find(|t| t.is_ident()).map(|t| t.text.clone())
            })
            .collect();
        self.pos = close + 1;
        Ok(params)
    }

    fn parse_attribute_lists(&mut self) -> Result<Vec<AttributeList>, ParseError> {
        let mut lists = Vec::new();
        while self.at_punct("[") {
            let open = self.pos;
            let close_span = self.skip_group()?;
            let close = self.pos - 1;
            let mut inner = &self.tokens[open + 1..close];

            let mut target = None;
            if inner.len() >= 2 && inner[0].is_ident() && inner[1].is_punct(":") {
                target = Some(inner[0].text.clone());
                inner = &inner[2..];
            }

            let attributes = split_top_level_commas(inner)
                .into_iter()
                .filter(|segment| !segment.is_empty())
                .map(parse_attribute)
                .collect();

            lists.push(AttributeList {
                target,
                attributes,
                span: self.tokens[open].span.to(close_span),
            });
        }
        Ok(lists)
    }

    fn parse_member_list(&mut self, until_eof: bool) -> Result<Vec<Member>, ParseError> {
        let mut members = Vec::new();
        loop {
            match self.peek() {
                None if until_eof => break,
                None => return Err(ParseError::UnexpectedEof { expected: "`}`" }),
                Some(t) if t.is_punct("}") => {
                    if until_eof {
                        return Err(self.unexpected("member"));
                    }
                    break;
                }
                Some(t) if t.is_punct(";") => {
                    self.pos += 1;
                }
                Some(_) => members.push(self.parse_member()?),
            }
        }
        Ok(members)
    }

    fn parse_member(&mut self) -> Result<Member, ParseError> {
        let start = self.pos;
        let attributes = self.parse_attribute_lists()?;
        let modifiers = self.parse_modifiers(true);

        if let Some((kind, len)) = self.peek_type_keyword() {
            let decl = self.parse_type_decl(start, attributes, modifiers, kind, len)?;
            return Ok(Member::Type(decl));
        }

        let first = self
            .peek()
            .ok_or(ParseError::UnexpectedEof { expected: "member" })?;
        if first.is_punct("~") || first.is_word("event") {
            let name = if first.is_punct("~") { "~" } else { "event" }.to_string();
            let stop = self.scan_header()?;
            self.pos = stop;
            self.skip_member_body()?;
            return Ok(Member::Other(self.other_member(start, name)));
        }

        let header_start = self.pos;
        let stop = self.scan_header()?;
        let header: Vec<Token> = self.tokens[header_start..stop].to_vec();
        let stop_token = self.tokens[stop].text.clone();
        self.pos = stop;

        if header.iter().any(|t| t.is_word("operator")) {
            self.skip_member_body()?;
            return Ok(Member::Other(self.other_member(start, "operator".to_string())));
        }

        if let Some(paren) = top_level_paren(&header) {
            return self.finish_method(start, attributes, modifiers, &header, paren);
        }

        let name_token = header.last().filter(|t| t.is_ident()).cloned();
        let indexer_like = header.iter().any(|t| t.is_punct("["))
            && header.last().map_or(false, |t| t.is_punct("]"));

        match (stop_token.as_str(), name_token) {
            ("{", Some(name)) if !indexer_like && header.len() >= 2 => {
                let accessors = self.parse_accessors()?;
                let has_initializer = self.at_punct("=");
                if has_initializer {
                    self.skip_to_semicolon()?;
                }
                Ok(Member::Property(PropertyDecl {
                    attributes,
                    modifiers,
                    type_text: render_tokens(&header[..header.len() - 1]),
                    name: name.text,
                    name_span: name.span,
                    accessors,
                    expression_bodied: false,
                    has_initializer,
                    span: self.span_from(start),
                    tokens: self.token_texts(start),
                }))
            }
            ("=>", Some(name)) if header.len() >= 2 => {
                self.skip_member_body()?;
                Ok(Member::Property(PropertyDecl {
                    attributes,
                    modifiers,
                    type_text: render_tokens(&header[..header.len() - 1]),
                    name: name.text,
                    name_span: name.span,
                    accessors: Vec::new(),
                    expression_bodied: true,
                    has_initializer: false,
                    span: self.span_from(start),
                    tokens: self.token_texts(start),
                }))
            }
            ("=", Some(name)) | (";", Some(name)) => {
                self.skip_member_body()?;
                Ok(Member::Field(self.other_member(start, name.text)))
            }
            _ => {
                self.skip_member_body()?;
                let name = if indexer_like {
                    "this".to_string()
                } else {
                    header
                        .iter()
                        .rev()
                        .find(|t| t.is_ident())
                        .map(|t| t.text.clone())
                        .unwrap_or_default()
                };
                Ok(Member::Other(self.other_member(start, name)))
            }
        }
    }

    fn finish_method(
        &mut self,
        start: usize,
        attributes: Vec<AttributeList>,
        modifiers: Vec<String>,
        header: &[Token],
        paren: usize,
    ) -> Result<Member, ParseError> {
        let (name_idx, type_params) = name_before(header, paren);
        let name = match name_idx.and_then(|i| header.get(i)).filter(|t| t.is_ident()) {
            Some(name) => name.clone(),
            None => {
                self.skip_member_body()?;
                return Ok(Member::Other(self.other_member(start, String::new())));
            }
        };
        let name_idx = name_idx.unwrap_or(0);

        let close = matching_close(header, paren).ok_or(ParseError::UnbalancedDelimiter {
            open: '(',
            span: header[paren].span,
        })?;
        let params = parse_parameters(&header[paren + 1..close]);
        let return_tokens = &header[..name_idx];

        self.skip_member_body()?;
        let decl = MethodDecl {
            attributes,
            modifiers,
            return_type: if return_tokens.is_empty() {
                None
            } else {
                Some(render_tokens(return_tokens))
            },
            name: name.text,
            name_span: name.span,
            type_params,
            params,
            span: self.span_from(start),
            tokens: self.token_texts(start),
        };
        Ok(if decl.return_type.is_none() {
            Member::Constructor(decl)
        } else {
            Member::Method(decl)
        })
    }

    fn other_member(&self, start: usize, name: String) -> OtherMember {
        OtherMember {
            name,
            span: self.span_from(start),
            tokens: self.token_texts(start),
        }
    }

    /// Index of the first header terminator at depth zero: `{`, `;`, `=>` or `=`.
    fn scan_header(&self) -> Result<usize, ParseError> {
        let mut depth = 0i32;
        let mut prev_operator = false;
        for i in self.pos..self.tokens.len() {
            let token = &self.tokens[i];
            let after_operator = prev_operator;
            prev_operator = token.is_word("operator");
            if token.kind != TokenKind::Punct {
                continue;
            }
            match token.text.as_str() {
                "(" | "[" => depth += 1,
                ")" | "]" => depth -= 1,
                "<" if !after_operator => depth += 1,
                ">" if !after_operator => depth = (depth - 1).max(0),
                "{" | ";" | "=>" | "=" if depth <= 0 => return Ok(i),
                "}" if depth <= 0 => {
                    return Err(ParseError::UnexpectedToken {
                        found: "}".to_string(),
                        expected: "member declaration",
                        span: token.span,
                    })
                }
                _ => {}
            }
        }
        Err(ParseError::UnexpectedEof {
            expected: "member body",
        })
    }

    /// Skip whatever follows a member header: a block, `=> expr;`, `= value;` or `;`.
    fn skip_member_body(&mut self) -> Result<(), ParseError> {
        match self.peek() {
            Some(t) if t.is_punct("{") => {
                self.skip_group()?;
                // Property initializer after an accessor block.
                if self.at_punct("=") {
                    self.skip_to_semicolon()?;
                }
                Ok(())
            }
            Some(t) if t.is_punct(";") => {
                self.pos += 1;
                Ok(())
            }
            Some(_) => self.skip_to_semicolon(),
            None => Err(ParseError::UnexpectedEof {
                expected: "member body",
            }),
        }
    }

    fn parse_accessors(&mut self) -> Result<Vec<Accessor>, ParseError> {
        self.expect_punct("{", "`{`")?;
        let mut accessors = Vec::new();
        loop {
            if self.at_punct("}") {
                self.pos += 1;
                break;
            }
            self.parse_attribute_lists()?;
            while self
                .peek()
                .map_or(false, |t| t.is_ident() && ACCESSOR_MODIFIERS.contains(&t.text.as_str()))
            {
                self.pos += 1;
            }
            let keyword = self.expect_ident("accessor")?.text;
            let has_body = match self.peek() {
                Some(t) if t.is_punct(";") => {
                    self.pos += 1;
                    false
                }
                Some(t) if t.is_punct("{") => {
                    self.skip_group()?;
                    true
                }
                Some(t) if t.is_punct("=>") => {
                    self.skip_to_semicolon()?;
                    true
                }
                _ => return Err(self.unexpected("accessor body")),
            };
            accessors.push(Accessor { keyword, has_body });
        }
        Ok(accessors)
    }
}

/// The parameter-list `(` of a method header: at depth zero and directly after a
/// name or a generic parameter list. Tuple types do not qualify, even after a
/// modifier keyword.
fn top_level_paren(header: &[Token]) -> Option<usize> {
    let mut depth = 0i32;
    for (i, token) in header.iter().enumerate() {
        if token.kind != TokenKind::Punct {
            continue;
        }
        let after_name = i > 0 && (is_name(&header[i - 1]) || header[i - 1].is_punct(">"));
        match token.text.as_str() {
            "(" if depth == 0 && after_name => return Some(i),
            "(" | "[" | "<" => depth += 1,
            ")" | "]" | ">" => depth = (depth - 1).max(0),
            _ => {}
        }
    }
    None
}

fn is_name(token: &Token) -> bool {
    let text = token.text.as_str();
    token.is_ident() && (!MODIFIERS.contains(&text) || CONTEXTUAL_MODIFIERS.contains(&text))
}

/// Name token index and type parameters for `Name(` or `Name<T, U>(`.
fn name_before(header: &[Token], paren: usize) -> (Option<usize>, Vec<String>) {
    if paren == 0 {
        return (None, Vec::new());
    }
    let before = paren - 1;
    if header[before].is_punct(">") {
        if let Some(open) = matching_angle_open(header, before) {
            let type_params = split_top_level_commas(&header[open + 1..before])
                .into_iter()
                .filter_map(|segment| segment.iter().rev().find(|t| t.is_ident()))
                .map(|t| t.text.clone())
                .collect();
            return (open.checked_sub(1), type_params);
        }
        return (None, Vec::new());
    }
    (Some(before), Vec::new())
}

fn parse_parameters(tokens: &[Token]) -> Vec<Parameter> {
    split_top_level_commas(tokens)
        .into_iter()
        .filter(|segment| !segment.is_empty())
        .map(parse_parameter)
        .collect()
}

fn parse_parameter(mut segment: &[Token]) -> Parameter {
    // Leading attribute lists.
    while segment.first().map_or(false, |t| t.is_punct("[")) {
        match matching_close(segment, 0) {
            Some(close) => segment = &segment[close + 1..],
            None => break,
        }
    }

    let mut modifiers = Vec::new();
    while let Some(token) = segment.first() {
        if segment.len() > 2 && token.is_ident() && PARAMETER_MODIFIERS.contains(&token.text.as_str())
        {
            modifiers.push(token.text.clone());
            segment = &segment[1..];
        } else {
            break;
        }
    }

    let (decl, default) = match segment.iter().position(|t| t.is_punct("=")) {
        Some(eq) => (&segment[..eq], Some(render_tokens(&segment[eq + 1..]))),
        None => (segment, None),
    };
    let (type_tokens, name) = match decl.split_last() {
        Some((name, type_tokens)) => (type_tokens, name.text.clone()),
        None => (decl, String::new()),
    };

    Parameter {
        modifiers,
        type_text: render_tokens(type_tokens),
        name,
        default,
    }
}

fn parse_attribute(segment: &[Token]) -> Attribute {
    let paren = segment.iter().position(|t| t.is_punct("("));
    let name_tokens = &segment[..paren.unwrap_or(segment.len())];
    let name: String = name_tokens
        .iter()
        .take_while(|t| !t.is_punct("<"))
        .map(|t| t.text.as_str())
        .collect();

    let args = match paren.and_then(|p| matching_close(segment, p).map(|c| (p, c))) {
        Some((open, close)) => split_top_level_commas(&segment[open + 1..close])
            .into_iter()
            .filter(|arg| !arg.is_empty())
            .map(parse_attribute_arg)
            .collect(),
        None => Vec::new(),
    };

    let first = segment[0].span;
    let last = segment[segment.len() - 1].span;
    Attribute {
        name,
        args,
        span: first.to(last),
    }
}

fn parse_attribute_arg(tokens: &[Token]) -> AttributeArg {
    let named = tokens.len() >= 3
        && tokens[0].is_ident()
        && (tokens[1].is_punct("=") || tokens[1].is_punct(":"));
    let (name, value_tokens) = if named {
        (Some(tokens[0].text.clone()), &tokens[2..])
    } else {
        (None, tokens)
    };

    let value = match value_tokens {
        [single] => match (&single.kind, single.text.as_str()) {
            (TokenKind::Str { value }, _) => AttributeValue::Str(value.clone()),
            (TokenKind::Ident, "true") => AttributeValue::Bool(true),
            (TokenKind::Ident, "false") => AttributeValue::Bool(false),
            _ => AttributeValue::Other(render_tokens(value_tokens)),
        },
        _ => AttributeValue::Other(render_tokens(value_tokens)),
    };

    AttributeArg { name, value }
}
