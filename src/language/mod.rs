// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Highlighting grammars and editor tables for the two buffers.
//!
//! The source buffer holds ASL, the read-only output buffer holds a WAST
//! outline of the compiled module. Each grammar turns text into a flat list of
//! [`Token`]s carrying a dotted scope name (`string.escape`, `number.hex`, ...)
//! that the [`theme`] resolves to a colour.

pub mod asl;
pub mod completion;
pub mod theme;
pub mod wast;

use serde::Serialize;

/// The languages registered with the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageId {
    Asl,
    Wast,
}

impl LanguageId {
    pub fn id(self) -> &'static str {
        match self {
            LanguageId::Asl => "asl",
            LanguageId::Wast => "wast",
        }
    }

    pub fn tokenize(self, source: &str) -> Vec<Token> {
        match self {
            LanguageId::Asl => asl::tokenize(source),
            LanguageId::Wast => wast::tokenize(source),
        }
    }

    /// Both languages share the same bracket and comment setup.
    pub fn configuration(self) -> LanguageConfiguration {
        LanguageConfiguration {
            brackets: &[("(", ")"), ("{", "}"), ("[", "]")],
            line_comment: "//",
            block_comment: ("/*", "*/"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageConfiguration {
    pub brackets: &'static [(&'static str, &'static str)],
    pub line_comment: &'static str,
    pub block_comment: (&'static str, &'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Keyword,
    Constant,
    StorageType,
    Type,
    TypeIdentifier,
    FunctionName,
    Identifier,
    Operator,
    Delimiter,
    Bracket,
    Number,
    NumberFloat,
    NumberHex,
    String,
    StringQuote,
    StringEscape,
    StringEscapeInvalid,
    StringInvalid,
    Comment,
    White,
    /// Matched by no rule.
    Text,
}

impl TokenKind {
    /// Scope name used for theme lookup.
    pub fn scope(self) -> &'static str {
        match self {
            TokenKind::Keyword => "keyword",
            TokenKind::Constant => "constant",
            TokenKind::StorageType => "storage.type",
            TokenKind::Type => "type",
            TokenKind::TypeIdentifier => "type.identifier",
            TokenKind::FunctionName => "entity.name.function",
            TokenKind::Identifier => "identifier",
            TokenKind::Operator => "operator",
            TokenKind::Delimiter => "delimiter",
            TokenKind::Bracket => "delimiter.bracket",
            TokenKind::Number => "number",
            TokenKind::NumberFloat => "number.float",
            TokenKind::NumberHex => "number.hex",
            TokenKind::String => "string",
            TokenKind::StringQuote => "string.quote",
            TokenKind::StringEscape => "string.escape",
            TokenKind::StringEscapeInvalid => "string.escape.invalid",
            TokenKind::StringInvalid => "string.invalid",
            TokenKind::Comment => "comment",
            TokenKind::White => "white",
            TokenKind::Text => "",
        }
    }
}

/// A highlighted byte range of the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub scope: &'static str,
    pub start: usize,
    pub end: usize,
}

impl Token {
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.start..self.end]
    }
}

/// Byte cursor shared by the grammars.
///
/// Adjacent tokens with the same scope are merged, so `((` is one bracket
/// token and a comment spanning several rules is one comment token.
pub(crate) struct Scanner<'a> {
    source: &'a str,
    pos: usize,
    tokens: Vec<Token>,
}

impl<'a> Scanner<'a> {
    pub(crate) fn new(source: &'a str) -> Self {
        Self {
            source,
            pos: 0,
            tokens: Vec::new(),
        }
    }

    pub(crate) fn is_eof(&self) -> bool {
        self.pos >= self.source.len()
    }

    pub(crate) fn rest(&self) -> &'a str {
        &self.source[self.pos..]
    }

    pub(crate) fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    pub(crate) fn emit(&mut self, kind: TokenKind, len: usize) {
        self.emit_scoped(kind, kind.scope(), len);
    }

    pub(crate) fn emit_scoped(&mut self, kind: TokenKind, scope: &'static str, len: usize) {
        if len == 0 {
            return;
        }
        let start = self.pos;
        self.pos += len;
        if let Some(last) = self.tokens.last_mut() {
            if last.end == start && last.kind == kind && last.scope == scope {
                last.end = self.pos;
                return;
            }
        }
        self.tokens.push(Token {
            kind,
            scope,
            start,
            end: self.pos,
        });
    }

    /// Emits the next character as unmatched text.
    pub(crate) fn emit_char(&mut self, kind: TokenKind) {
        let len = self.peek().map_or(1, char::len_utf8);
        self.emit(kind, len);
    }

    pub(crate) fn finish(self) -> Vec<Token> {
        self.tokens
    }
}

/// Byte length of the longest prefix of `text` whose chars satisfy `pred`.
pub(crate) fn prefix_len(text: &str, pred: impl Fn(char) -> bool) -> usize {
    text.char_indices()
        .find(|&(_, c)| !pred(c))
        .map_or(text.len(), |(i, _)| i)
}

/// `\w` as regex engines define it.
pub(crate) fn is_word(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Length of an escape sequence at the start of `text`, if any.
///
/// Accepts `\a \b \f \n \r \t \v \\ \" \'`, `\x` with one to four hex digits,
/// `\u` with four and `\U` with eight.
pub(crate) fn escape_len(text: &str) -> Option<usize> {
    let rest = text.strip_prefix('\\')?;
    let first = rest.chars().next()?;
    match first {
        'a' | 'b' | 'f' | 'n' | 'r' | 't' | 'v' | '\\' | '"' | '\'' => Some(2),
        'x' => {
            let digits = prefix_len(&rest[1..], |c| c.is_ascii_hexdigit()).min(4);
            (digits >= 1).then_some(2 + digits)
        }
        'u' | 'U' => {
            let wanted = if first == 'u' { 4 } else { 8 };
            let digits = prefix_len(&rest[1..], |c| c.is_ascii_hexdigit());
            (digits >= wanted).then_some(2 + wanted)
        }
        _ => None,
    }
}

/// Body of a double-quoted string, up to and including the closing quote.
pub(crate) fn string_body(scanner: &mut Scanner<'_>) -> bool {
    let rest = scanner.rest();
    if rest.starts_with('"') {
        scanner.emit(TokenKind::StringQuote, 1);
        return true;
    }
    if rest.starts_with('\\') {
        match escape_len(rest) {
            Some(len) => scanner.emit(TokenKind::StringEscape, len),
            None => {
                let len = 1 + rest[1..].chars().next().map_or(0, char::len_utf8);
                scanner.emit(TokenKind::StringEscapeInvalid, len);
            }
        }
        return false;
    }
    let len = prefix_len(rest, |c| c != '"' && c != '\\');
    scanner.emit(TokenKind::String, len);
    false
}

/// Whitespace, nested block comment openers and line comments.
///
/// Returns `Some(true)` when a block comment was opened.
pub(crate) fn whitespace(scanner: &mut Scanner<'_>) -> Option<bool> {
    let rest = scanner.rest();
    if rest.starts_with(&[' ', '\t', '\r', '\n'][..]) {
        let len = prefix_len(rest, |c| matches!(c, ' ' | '\t' | '\r' | '\n'));
        scanner.emit(TokenKind::White, len);
        return Some(false);
    }
    if rest.starts_with("/*") {
        scanner.emit(TokenKind::Comment, 2);
        return Some(true);
    }
    if rest.starts_with("//") {
        scanner.emit(TokenKind::Comment, line_len(rest));
        return Some(false);
    }
    None
}

/// Body of a nested block comment.
///
/// Returns the change in nesting depth.
pub(crate) fn comment_body(scanner: &mut Scanner<'_>) -> i32 {
    let rest = scanner.rest();
    if rest.starts_with("/*") {
        scanner.emit(TokenKind::Comment, 2);
        return 1;
    }
    if rest.starts_with("*/") {
        scanner.emit(TokenKind::Comment, 2);
        return -1;
    }
    let len = prefix_len(rest, |c| c != '/' && c != '*');
    scanner.emit(TokenKind::Comment, len.max(1));
    0
}

/// Bytes up to, but not including, the next newline.
pub(crate) fn line_len(text: &str) -> usize {
    text.find('\n').unwrap_or(text.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_len() {
        assert_eq!(escape_len("\\n rest"), Some(2));
        assert_eq!(escape_len("\\x4"), Some(3));
        assert_eq!(escape_len("\\x41424344"), Some(6));
        assert_eq!(escape_len("\\u00e9"), Some(6));
        assert_eq!(escape_len("\\u00"), None);
        assert_eq!(escape_len("\\U0001F600"), Some(10));
        assert_eq!(escape_len("\\q"), None);
        assert_eq!(escape_len("n"), None);
    }

    #[test]
    fn test_scanner_merges_adjacent_tokens() {
        let mut scanner = Scanner::new("((x");
        scanner.emit(TokenKind::Bracket, 1);
        scanner.emit(TokenKind::Bracket, 1);
        scanner.emit(TokenKind::Identifier, 1);
        let tokens = scanner.finish();
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].end, 2);
    }

    #[test]
    fn test_configuration() {
        let config = LanguageId::Asl.configuration();
        assert_eq!(config.brackets.len(), 3);
        assert_eq!(config.line_comment, "//");
        assert_eq!(config.block_comment, ("/*", "*/"));
        assert_eq!(LanguageId::Wast.id(), "wast");
    }
}
