// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The `asl` colour theme, layered on `vs-dark`.

/// An RGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses `"F92672"` or `"#F92672"`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
        Some(Self { r, g, b })
    }

    pub fn to_hex(self) -> String {
        format!("{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontStyle {
    Normal,
    Italic,
}

/// Foreground colour for every token whose scope starts with `token`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenRule {
    pub token: &'static str,
    pub foreground: Color,
    pub font_style: FontStyle,
}

impl TokenRule {
    const fn new(token: &'static str, foreground: Color) -> Self {
        Self {
            token,
            foreground,
            font_style: FontStyle::Normal,
        }
    }

    const fn italic(mut self) -> Self {
        self.font_style = FontStyle::Italic;
        self
    }

    /// Scope match on dot boundaries: `string` matches `string.quote`, not `strings`.
    fn matches(&self, scope: &str) -> bool {
        match scope.strip_prefix(self.token) {
            Some(rest) => rest.is_empty() || rest.starts_with('.'),
            None => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    pub name: &'static str,
    pub base: &'static str,
    pub inherit: bool,
    pub rules: &'static [TokenRule],
    /// Editor chrome colours as `#RRGGBB` or `#RRGGBBAA`.
    pub colors: &'static [(&'static str, &'static str)],
}

const PINK: Color = Color::rgb(0xF9, 0x26, 0x72);
const YELLOW: Color = Color::rgb(0xFF, 0xEE, 0x99);
const CYAN: Color = Color::rgb(0x66, 0xD9, 0xEF);
const PURPLE: Color = Color::rgb(0xA4, 0x77, 0xF6);
const GREEN: Color = Color::rgb(0xA6, 0xE2, 0x2E);

pub const ASL_THEME: Theme = Theme {
    name: "asl",
    base: "vs-dark",
    inherit: true,
    rules: &[
        TokenRule::new("keyword", PINK),
        TokenRule::new("operator", PINK),
        TokenRule::new("string", YELLOW),
        TokenRule::new("storage.type", CYAN).italic(),
        TokenRule::new("type", CYAN).italic(),
        TokenRule::new("number", PURPLE),
        TokenRule::new("constant", PURPLE),
        TokenRule::new("number.float", PURPLE),
        TokenRule::new("number.hex", PURPLE),
        TokenRule::new("entity.name.function", GREEN),
        TokenRule::new("selection", Color::rgb(0x40, 0x3D, 0x3D)),
    ],
    colors: &[
        ("editor.selectionBackground", "#3d3d3d"),
        ("editor.lineHighlightBackground", "#3D3D3D55"),
    ],
};

impl Theme {
    /// The most specific rule covering `scope`, if any.
    pub fn rule_for(&self, scope: &str) -> Option<&TokenRule> {
        self.rules
            .iter()
            .filter(|rule| rule.matches(scope))
            .max_by_key(|rule| rule.token.len())
    }

    pub fn color(&self, key: &str) -> Option<&'static str> {
        self.colors
            .iter()
            .find(|(name, _)| *name == key)
            .map(|(_, value)| *value)
    }
}
