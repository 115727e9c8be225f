// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Column conversion between the editor and the analysis binary.
//!
//! The editor counts characters, the binary counts UTF-8 bytes. Both are
//! 1-based. Lines are separated by `\n` only. Positions past the end of a line
//! (or past the last line) map one unit per column, so conversion is total.

use crate::bridge::handle::Span;
use crate::editor::Range;

/// Per-line column lookup for one snapshot of the source text.
#[derive(Debug, Clone)]
pub struct ColumnMap {
    lines: Vec<String>,
}

impl ColumnMap {
    pub fn new(source: &str) -> Self {
        Self {
            lines: source.split('\n').map(str::to_owned).collect(),
        }
    }

    fn line(&self, line: u32) -> Option<&str> {
        let index = usize::try_from(line).ok()?.checked_sub(1)?;
        self.lines.get(index).map(String::as_str)
    }

    /// Editor character column to binary byte column.
    pub fn to_byte_column(&self, line: u32, column: u32) -> u32 {
        let Some(text) = self.line(line) else {
            return column;
        };
        let wanted = column.saturating_sub(1) as usize;
        let mut bytes = 0usize;
        let mut chars = 0usize;
        for ch in text.chars().take(wanted) {
            bytes += ch.len_utf8();
            chars += 1;
        }
        let past_end = wanted - chars;
        to_u32(bytes + past_end + 1)
    }

    /// Binary byte column to editor character column.
    ///
    /// A byte column inside a multi-byte character maps to that character.
    pub fn to_char_column(&self, line: u32, column: u32) -> u32 {
        let Some(text) = self.line(line) else {
            return column;
        };
        let offset = column.saturating_sub(1) as usize;
        if offset >= text.len() {
            let chars = text.chars().count();
            return to_u32(chars + (offset - text.len()) + 1);
        }
        let chars = text
            .char_indices()
            .take_while(|(start, ch)| start + ch.len_utf8() <= offset)
            .count();
        to_u32(chars + 1)
    }

    /// Converts a binary span into an editor range.
    pub fn span_to_range(&self, span: &Span) -> Range {
        Range::new(
            span.line_from,
            self.to_char_column(span.line_from, span.column_from),
            span.line_to,
            self.to_char_column(span.line_to, span.column_to),
        )
    }
}

fn to_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_is_identity() {
        let map = ColumnMap::new("start { fals }\nsplit { true }");
        for column in 1..=16 {
            assert_eq!(map.to_byte_column(2, column), column);
            assert_eq!(map.to_char_column(2, column), column);
        }
    }

    #[test]
    fn test_multibyte_characters() {
        // é is 2 bytes, 𝄞 is 4 bytes.
        let map = ColumnMap::new("\"é𝄞\" fals");
        assert_eq!(map.to_byte_column(1, 2), 2);
        assert_eq!(map.to_byte_column(1, 3), 4);
        assert_eq!(map.to_byte_column(1, 4), 8);
        assert_eq!(map.to_byte_column(1, 6), 10);

        assert_eq!(map.to_char_column(1, 4), 3);
        assert_eq!(map.to_char_column(1, 8), 4);
        assert_eq!(map.to_char_column(1, 10), 6);
    }

    #[test]
    fn test_byte_inside_character_maps_to_that_character() {
        let map = ColumnMap::new("é");
        assert_eq!(map.to_char_column(1, 2), 1);
        assert_eq!(map.to_char_column(1, 3), 2);
    }

    #[test]
    fn test_past_end_of_line_and_file() {
        let map = ColumnMap::new("aé");
        assert_eq!(map.to_byte_column(1, 5), 6);
        assert_eq!(map.to_char_column(1, 6), 5);
        assert_eq!(map.to_byte_column(7, 3), 3);
        assert_eq!(map.to_char_column(0, 3), 3);
    }

    #[test]
    fn test_span_to_range() {
        let map = ColumnMap::new("start { \"é\" fals }");
        let range = map.span_to_range(&Span::new(1, 14, 1, 18));
        assert_eq!(range, Range::new(1, 13, 1, 17));
    }
}
