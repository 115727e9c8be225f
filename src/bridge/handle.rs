// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Values exchanged with the analysis binary.
//!
//! A [`Handle`] is an opaque wasm32 pointer into the binary's memory. It is
//! never dereferenced by the host; fields are pulled out through accessor
//! exports only. Everything else in this module is the native, decoded form of
//! what the accessors return.

use serde::Serialize;
use std::fmt;

/// Opaque handle returned by an entry point or accessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle(u32);

impl Handle {
    /// The "no result" handle.
    pub const NONE: Handle = Handle(0);

    pub fn from_raw(raw: i32) -> Self {
        Handle(raw as u32)
    }

    pub fn raw(self) -> i32 {
        self.0 as i32
    }

    #[inline]
    pub fn is_none(self) -> bool {
        self.0 == 0
    }

    /// `None` for the zero handle.
    pub fn present(self) -> Option<Handle> {
        if self.is_none() {
            None
        } else {
            Some(self)
        }
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}

/// A 1-based source range as reported by the analysis binary.
///
/// Columns are byte columns within the line. The end position is the one the
/// editor range ends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Span {
    pub line_from: u32,
    pub column_from: u32,
    pub line_to: u32,
    pub column_to: u32,
}

impl Span {
    pub fn new(line_from: u32, column_from: u32, line_to: u32, column_to: u32) -> Self {
        Self {
            line_from,
            column_from,
            line_to,
            column_to,
        }
    }

    /// True when the start does not come after the end.
    pub fn is_ordered(&self) -> bool {
        (self.line_from, self.column_from) <= (self.line_to, self.column_to)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}-{}:{}",
            self.line_from, self.column_from, self.line_to, self.column_to
        )
    }
}

/// A diagnostic reported by the analysis binary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorInfo {
    pub message: String,
    pub span: Option<Span>,
}

impl fmt::Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.span {
            Some(span) => write!(f, "{} at {}", self.message, span),
            None => write!(f, "{}", self.message),
        }
    }
}

/// Type information for the symbol under a position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HoverInfo {
    pub ty: String,
    pub span: Span,
}

/// Raw bytes of a module produced by the compile entry point.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompiledModule {
    pub bytes: Vec<u8>,
}

/// Outcome of a compile request.
///
/// `Failed` is a user-facing diagnostic, not an infrastructure failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileOutcome {
    Compiled(CompiledModule),
    Failed(ErrorInfo),
}

impl CompileOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, CompileOutcome::Compiled(_))
    }

    pub fn module_bytes(&self) -> Option<&[u8]> {
        match self {
            CompileOutcome::Compiled(module) => Some(&module.bytes),
            CompileOutcome::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&ErrorInfo> {
        match self {
            CompileOutcome::Compiled(_) => None,
            CompileOutcome::Failed(error) => Some(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_handle_is_none() {
        assert!(Handle::NONE.is_none());
        assert!(Handle::from_raw(0).present().is_none());
        assert_eq!(Handle::from_raw(64).present(), Some(Handle::from_raw(64)));
    }

    #[test]
    fn test_high_pointers_survive_raw_conversion() {
        let handle = Handle::from_raw(-8);
        assert!(!handle.is_none());
        assert_eq!(handle.raw(), -8);
    }

    #[test]
    fn test_span_ordering() {
        assert!(Span::new(1, 5, 1, 9).is_ordered());
        assert!(Span::new(1, 9, 2, 1).is_ordered());
        assert!(!Span::new(3, 1, 2, 7).is_ordered());
    }

    #[test]
    fn test_error_info_display() {
        let info = ErrorInfo {
            message: "unknown identifier".to_string(),
            span: Some(Span::new(2, 3, 2, 7)),
        };
        assert_eq!(info.to_string(), "unknown identifier at 2:3-2:7");
    }
}
