// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! ASL highlighting grammar.
//!
//! Rules are tried in order at each position: identifiers and keywords,
//! whitespace and comments, brackets, operators, numbers, delimiters, strings,
//! then character literals. Block comments nest. After `fn` the following
//! identifier is highlighted as a function name.

use crate::language::{
    comment_body, escape_len, is_word, line_len, prefix_len, string_body, whitespace, Scanner,
    Token, TokenKind,
};

pub const KEYWORDS: &[&str] = &["if", "else", "for", "match", "while", "loop", "let", "in", "as"];

/// Keywords after which a function name follows.
pub const FUNCTION_FOLLOWS: &[&str] = &["fn"];

pub const BOOLEANS: &[&str] = &["true", "false"];

/// Top-level blocks of an auto splitter script.
pub const ACTIONS: &[&str] = &["state", "start", "split", "reset", "isLoading", "gameTime"];

pub const TYPE_KEYWORDS: &[&str] = &[
    "bool", "unit", "u8", "u16", "u32", "u64", "i8", "i16", "i32", "i64", "f32", "f64", "{int}",
    "{float}", "{number}", "{bits}",
];

pub const OPERATORS: &[&str] = &[
    "=", ">", "<", "!", "~", "?", "==", "<=", ">=", "!=", "&&", "||", "++", "--", "+", "-", "*",
    "/", "&", "|", "^", "%", "<<", ">>", "+=", "-=", "*=", "/=", "&=", "|=", "^=", "%=", "<<=",
    ">>=", "..", "..=", "=>", "->",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Root,
    Comment,
    Str,
    FunctionName,
}

fn is_symbol(c: char) -> bool {
    matches!(
        c,
        '=' | '>' | '<' | '!' | '~' | '?' | ':' | '&' | '|' | '.' | '+' | '-' | '*' | '/' | '^' | '%'
    )
}

fn bracket_scope(c: char) -> &'static str {
    match c {
        '{' | '}' => "delimiter.curly",
        '[' | ']' => "delimiter.square",
        _ => "delimiter.parenthesis",
    }
}

pub fn tokenize(source: &str) -> Vec<Token> {
    let mut scanner = Scanner::new(source);
    let mut stack = vec![State::Root];

    while !scanner.is_eof() {
        match stack.last().copied().unwrap_or(State::Root) {
            State::Root => root(&mut scanner, &mut stack),
            State::Comment => match comment_body(&mut scanner) {
                1 => stack.push(State::Comment),
                -1 => {
                    stack.pop();
                }
                _ => {}
            },
            State::Str => {
                if string_body(&mut scanner) {
                    stack.pop();
                }
            }
            State::FunctionName => function_name(&mut scanner, &mut stack),
        }
    }

    scanner.finish()
}

fn root(scanner: &mut Scanner<'_>, stack: &mut Vec<State>) {
    let rest = scanner.rest();
    let Some(c) = scanner.peek() else {
        return;
    };

    if c.is_ascii_lowercase() || c == '_' || c == '$' {
        let len = prefix_len(rest, |c| is_word(c) || c == '$');
        let word = &rest[..len];
        let kind = if BOOLEANS.contains(&word) {
            TokenKind::Constant
        } else if FUNCTION_FOLLOWS.contains(&word) {
            stack.push(State::FunctionName);
            TokenKind::Keyword
        } else if TYPE_KEYWORDS.contains(&word) {
            TokenKind::StorageType
        } else if ACTIONS.contains(&word) {
            TokenKind::FunctionName
        } else if KEYWORDS.contains(&word) {
            TokenKind::Keyword
        } else {
            TokenKind::Identifier
        };
        scanner.emit(kind, len);
        return;
    }

    if let Some(opened) = whitespace(scanner) {
        if opened {
            stack.push(State::Comment);
        }
        return;
    }

    if matches!(c, '{' | '}' | '(' | ')' | '[' | ']') {
        scanner.emit_scoped(TokenKind::Bracket, bracket_scope(c), 1);
        return;
    }

    if is_symbol(c) {
        let len = prefix_len(rest, is_symbol);
        if OPERATORS.contains(&&rest[..len]) {
            scanner.emit(TokenKind::Operator, len);
        } else {
            scanner.emit(TokenKind::Text, len);
        }
        return;
    }

    if let Some(len) = float_len(rest) {
        scanner.emit(TokenKind::NumberFloat, len);
        return;
    }
    if let Some(len) = hex_len(rest) {
        scanner.emit(TokenKind::NumberHex, len);
        return;
    }
    if c.is_ascii_digit() {
        scanner.emit(TokenKind::Number, prefix_len(rest, |c| c.is_ascii_digit()));
        return;
    }

    if matches!(c, ';' | ',' | '.') {
        scanner.emit(TokenKind::Delimiter, 1);
        return;
    }

    if c == '"' {
        match unterminated_string_len(rest) {
            Some(len) => scanner.emit(TokenKind::StringInvalid, len),
            None => {
                scanner.emit(TokenKind::StringQuote, 1);
                stack.push(State::Str);
            }
        }
        return;
    }

    if c == '\'' {
        char_literal(scanner);
        return;
    }

    scanner.emit_char(TokenKind::Text);
}

fn function_name(scanner: &mut Scanner<'_>, stack: &mut Vec<State>) {
    if let Some(opened) = whitespace(scanner) {
        if opened {
            stack.push(State::Comment);
        }
        return;
    }
    let rest = scanner.rest();
    if rest.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_') {
        scanner.emit(TokenKind::FunctionName, prefix_len(rest, is_word));
        return;
    }
    stack.pop();
}

/// `\d*\.\d+([eE][\-+]?\d+)?`
fn float_len(text: &str) -> Option<usize> {
    let int = prefix_len(text, |c| c.is_ascii_digit());
    let after_int = &text[int..];
    let fraction = prefix_len(after_int.strip_prefix('.')?, |c| c.is_ascii_digit());
    if fraction == 0 {
        return None;
    }
    let mut len = int + 1 + fraction;

    let exponent = &text[len..];
    if let Some(exp) = exponent.strip_prefix(|c: char| c == 'e' || c == 'E') {
        let signed = exp.strip_prefix(|c: char| c == '-' || c == '+').unwrap_or(exp);
        let digits = prefix_len(signed, |c| c.is_ascii_digit());
        if digits > 0 {
            len += 1 + (exp.len() - signed.len()) + digits;
        }
    }
    Some(len)
}

/// `0[xX][0-9a-fA-F]+`
fn hex_len(text: &str) -> Option<usize> {
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))?;
    let len = prefix_len(digits, |c| c.is_ascii_hexdigit());
    (len > 0).then_some(2 + len)
}

/// A string whose closing quote is not on the same line.
///
/// A backslash at the very end of the line continues the string instead.
fn unterminated_string_len(text: &str) -> Option<usize> {
    let line = &text[..line_len(text)];
    let mut chars = line.char_indices().skip(1);
    while let Some((_, c)) = chars.next() {
        match c {
            '"' => return None,
            '\\' => {
                if chars.next().is_none() {
                    return None;
                }
            }
            _ => {}
        }
    }
    Some(line.len())
}

fn char_literal(scanner: &mut Scanner<'_>) {
    let rest = scanner.rest();
    let body = &rest[1..];

    if let Some(c) = body.chars().next() {
        if c != '\\' && c != '\'' && body[c.len_utf8()..].starts_with('\'') {
            scanner.emit(TokenKind::String, 2 + c.len_utf8());
            return;
        }
    }

    if let Some(len) = escape_len(body) {
        if body[len..].starts_with('\'') {
            scanner.emit(TokenKind::String, 1);
            scanner.emit(TokenKind::StringEscape, len);
            scanner.emit(TokenKind::String, 1);
            return;
        }
    }

    scanner.emit(TokenKind::StringInvalid, 1);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<(TokenKind, &str)> {
        tokenize(source)
            .into_iter()
            .filter(|t| t.kind != TokenKind::White)
            .map(|t| (t.kind, t.text(source)))
            .collect()
    }

    #[test]
    fn test_actions_and_booleans() {
        assert_eq!(
            kinds("start { false }"),
            vec![
                (TokenKind::FunctionName, "start"),
                (TokenKind::Bracket, "{"),
                (TokenKind::Constant, "false"),
                (TokenKind::Bracket, "}"),
            ]
        );
    }

    #[test]
    fn test_state_block_with_pointer_path() {
        let source = r#"state("game.exe") { x: u32 = "game.exe", 0x1F; }"#;
        let tokens = kinds(source);
        assert_eq!(tokens[0], (TokenKind::FunctionName, "state"));
        assert_eq!(tokens[1], (TokenKind::Bracket, "("));
        assert_eq!(tokens[2], (TokenKind::StringQuote, "\""));
        assert_eq!(tokens[3], (TokenKind::String, "game.exe"));
        assert!(tokens.contains(&(TokenKind::StorageType, "u32")));
        assert!(tokens.contains(&(TokenKind::Operator, "=")));
        assert!(tokens.contains(&(TokenKind::NumberHex, "0x1F")));
        assert!(tokens.contains(&(TokenKind::Delimiter, ";")));
        assert!(tokens.contains(&(TokenKind::Text, ":")));
    }

    #[test]
    fn test_fn_highlights_function_name() {
        let tokens = kinds("fn  add_one(x: i32) -> i32 { x + 1 }");
        assert_eq!(tokens[0], (TokenKind::Keyword, "fn"));
        assert_eq!(tokens[1], (TokenKind::FunctionName, "add_one"));
        assert_eq!(tokens[2], (TokenKind::Bracket, "("));
        assert!(tokens.contains(&(TokenKind::Operator, "->")));
    }

    #[test]
    fn test_keywords_and_identifiers() {
        let tokens = kinds("for i in 0..10 { let x = old.value; }");
        assert_eq!(tokens[0], (TokenKind::Keyword, "for"));
        assert_eq!(tokens[1], (TokenKind::Identifier, "i"));
        assert_eq!(tokens[2], (TokenKind::Keyword, "in"));
        assert_eq!(tokens[3], (TokenKind::Number, "0"));
        assert_eq!(tokens[4], (TokenKind::Operator, ".."));
        assert_eq!(tokens[5], (TokenKind::Number, "10"));
    }

    #[test]
    fn test_numbers() {
        assert_eq!(kinds("1.5e-3"), vec![(TokenKind::NumberFloat, "1.5e-3")]);
        assert_eq!(kinds("42"), vec![(TokenKind::Number, "42")]);
        // `.` is a symbol before it can start a float.
        assert_eq!(
            kinds(".5"),
            vec![(TokenKind::Text, "."), (TokenKind::Number, "5")]
        );
    }

    #[test]
    fn test_string_escapes() {
        let source = r#""a\n\q""#;
        assert_eq!(
            kinds(source),
            vec![
                (TokenKind::StringQuote, "\""),
                (TokenKind::String, "a"),
                (TokenKind::StringEscape, "\\n"),
                (TokenKind::StringEscapeInvalid, "\\q"),
                (TokenKind::StringQuote, "\""),
            ]
        );
    }

    #[test]
    fn test_unterminated_string() {
        let source = "\"open\nstart";
        assert_eq!(
            kinds(source),
            vec![
                (TokenKind::StringInvalid, "\"open"),
                (TokenKind::FunctionName, "start"),
            ]
        );
    }

    #[test]
    fn test_character_literals() {
        assert_eq!(kinds("'a'"), vec![(TokenKind::String, "'a'")]);
        assert_eq!(
            kinds(r"'\t'"),
            vec![
                (TokenKind::String, "'"),
                (TokenKind::StringEscape, "\\t"),
                (TokenKind::String, "'"),
            ]
        );
        assert_eq!(kinds("'"), vec![(TokenKind::StringInvalid, "'")]);
    }

    #[test]
    fn test_nested_block_comment() {
        let source = "/* a /* b */ c */ true";
        assert_eq!(
            kinds(source),
            vec![
                (TokenKind::Comment, "/* a /* b */ c */"),
                (TokenKind::Constant, "true"),
            ]
        );
    }

    #[test]
    fn test_line_comment() {
        assert_eq!(
            kinds("// split here\nsplit"),
            vec![
                (TokenKind::Comment, "// split here"),
                (TokenKind::FunctionName, "split"),
            ]
        );
    }

    #[test]
    fn test_uppercase_start_is_unmatched() {
        let tokens = kinds("Foo");
        assert_eq!(tokens[0], (TokenKind::Text, "F"));
        assert_eq!(tokens[1], (TokenKind::Identifier, "oo"));
    }
}
