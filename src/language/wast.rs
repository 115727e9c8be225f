// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! WAST highlighting grammar for the output buffer.

use crate::language::{
    comment_body, is_word, line_len, prefix_len, string_body, whitespace, Scanner, Token,
    TokenKind,
};

pub const KEYWORDS: &[&str] = &[
    "module", "table", "memory", "export", "import", "func", "result", "offset", "anyfunc",
    "type", "data", "start", "element", "global", "local", "mut", "param", "call", "drop",
    "tag",
    // memory
    "i32.load8_s", "i32.load8_u", "i32.load16_s", "i32.load16_u", "i32.load", "i64.load8_s",
    "i64.load8_u", "i64.load16_s", "i64.load16_u", "i64.load32_s", "i64.load32_u", "i64.load",
    "f32.load", "f64.load", "i32.store8", "i32.store16", "i32.store", "i64.store8",
    "i64.store16", "i64.store32", "i64.store", "f32.store", "f64.store",
    // constants
    "i32.const", "i64.const", "f32.const", "f64.const",
    // i32
    "i32.add", "i32.sub", "i32.mul", "i32.div_s", "i32.div_u", "i32.rem_s", "i32.rem_u",
    "i32.and", "i32.or", "i32.xor", "i32.shl", "i32.shr_u", "i32.shr_s", "i32.rotl",
    "i32.rotr", "i32.eq", "i32.ne", "i32.lt_s", "i32.le_s", "i32.lt_u", "i32.le_u",
    "i32.gt_s", "i32.ge_s", "i32.gt_u", "i32.ge_u", "i32.clz", "i32.ctz", "i32.popcnt",
    "i32.eqz",
    // i64
    "i64.add", "i64.sub", "i64.mul", "i64.div_s", "i64.div_u", "i64.rem_s", "i64.rem_u",
    "i64.and", "i64.or", "i64.xor", "i64.shl", "i64.shr_u", "i64.shr_s", "i64.rotl",
    "i64.rotr", "i64.eq", "i64.ne", "i64.lt_s", "i64.le_s", "i64.lt_u", "i64.le_u",
    "i64.gt_s", "i64.ge_s", "i64.gt_u", "i64.ge_u", "i64.clz", "i64.ctz", "i64.popcnt",
    "i64.eqz",
    // f32
    "f32.add", "f32.sub", "f32.mul", "f32.div", "f32.abs", "f32.neg", "f32.copysign",
    "f32.ceil", "f32.floor", "f32.trunc", "f32.nearest", "f32.eq", "f32.ne", "f32.lt",
    "f32.le", "f32.gt", "f32.ge", "f32.sqrt", "f32.min", "f32.max",
    // f64
    "f64.add", "f64.sub", "f64.mul", "f64.div", "f64.abs", "f64.neg", "f64.copysign",
    "f64.ceil", "f64.floor", "f64.trunc", "f64.nearest", "f64.eq", "f64.ne", "f64.lt",
    "f64.le", "f64.gt", "f64.ge", "f64.sqrt", "f64.min", "f64.max",
    // conversions
    "i32.wrap/i64", "i32.trunc_s/f32", "i32.trunc_s/f64", "i32.trunc_u/f32",
    "i32.trunc_u/f64", "i32.reinterpret/f32", "i64.extend_s/i32", "i64.extend_u/i32",
    "i64.trunc_s/f32", "i64.trunc_s/f64", "i64.trunc_u/f32", "i64.trunc_u/f64",
    "i64.reinterpret/f64", "f32.demote/f64", "f32.convert_s/i32", "f32.convert_s/i64",
    "f32.convert_u/i32", "f32.convert_u/i64", "f32.reinterpret/i32", "f64.promote/f32",
    "f64.convert_s/i32", "f64.convert_s/i64", "f64.convert_u/i32", "f64.convert_u/i64",
    "f64.reinterpret/i64",
    // variables
    "get_local", "set_local", "tee_local", "get_global", "set_global", "local.get",
    "local.set", "local.tee", "global.get", "global.set",
    "current_memory", "grow_memory", "memory.size", "memory.grow",
];

pub const TYPE_KEYWORDS: &[&str] = &["i32", "i64", "f32", "f64", "anyfunc"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Root,
    Comment,
    Str,
}

fn bracket_scope(c: char) -> &'static str {
    match c {
        '{' | '}' => "bracket.curly",
        '[' | ']' => "bracket.square",
        _ => "bracket.parenthesis",
    }
}

/// Identifier continuation; `/` only when it does not start a comment.
fn identifier_len(text: &str) -> usize {
    let mut len = 0;
    for (i, c) in text.char_indices() {
        let continues = match c {
            '/' => !matches!(text[i + 1..].chars().next(), Some('/') | Some('*')),
            c => i == 0 || is_word(c) || c == '$' || c == '.',
        };
        if !continues {
            break;
        }
        len = i + c.len_utf8();
    }
    len
}

pub fn tokenize(source: &str) -> Vec<Token> {
    let mut scanner = Scanner::new(source);
    let mut stack = vec![State::Root];

    while !scanner.is_eof() {
        match stack.last().copied().unwrap_or(State::Root) {
            State::Root => {
                if let Some(next) = root(&mut scanner) {
                    stack.push(next);
                }
            }
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
        }
    }

    scanner.finish()
}

fn root(scanner: &mut Scanner<'_>) -> Option<State> {
    let rest = scanner.rest();
    let c = scanner.peek()?;

    if c.is_ascii_alphabetic() || c == '_' || c == '$' {
        let len = identifier_len(rest);
        let word = &rest[..len];
        let kind = if KEYWORDS.contains(&word) {
            TokenKind::Keyword
        } else if TYPE_KEYWORDS.contains(&word) {
            TokenKind::Type
        } else {
            TokenKind::TypeIdentifier
        };
        scanner.emit(kind, len);
        return None;
    }

    if c.is_ascii_digit() {
        scanner.emit(TokenKind::Number, prefix_len(rest, |c| c.is_ascii_digit()));
        return None;
    }

    if c == '"' {
        scanner.emit(TokenKind::StringQuote, 1);
        return Some(State::Str);
    }

    if matches!(c, '{' | '}' | '(' | ')' | '[' | ']') {
        scanner.emit_scoped(TokenKind::Bracket, bracket_scope(c), 1);
        return None;
    }

    // The outline renders section summaries as `;;` comments.
    if rest.starts_with(";;") {
        scanner.emit(TokenKind::Comment, line_len(rest));
        return None;
    }

    match whitespace(scanner) {
        Some(true) => Some(State::Comment),
        Some(false) => None,
        None => {
            scanner.emit_char(TokenKind::Text);
            None
        }
    }
}
