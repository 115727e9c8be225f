// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The Editor Surface seam.
//!
//! The session never talks to a concrete editor widget. It pushes diagnostics,
//! the compile status and the output buffer through [`EditorSurface`], and
//! hands provider results back as the plain values defined here. Positions are
//! 1-based lines and 1-based character columns.

pub mod position;
pub mod recording;

use serde::Serialize;
use std::fmt;

pub use position::ColumnMap;
pub use recording::RecordingSurface;

/// An editor range, 1-based on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Range {
    pub start_line: u32,
    pub start_column: u32,
    pub end_line: u32,
    pub end_column: u32,
}

impl Range {
    pub fn new(start_line: u32, start_column: u32, end_line: u32, end_column: u32) -> Self {
        Self {
            start_line,
            start_column,
            end_line,
            end_column,
        }
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}-{}:{}",
            self.start_line, self.start_column, self.end_line, self.end_column
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerSeverity {
    Hint,
    Info,
    Warning,
    Error,
}

/// An inline diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Marker {
    pub range: Range,
    pub severity: MarkerSeverity,
    pub message: String,
}

/// Result of the most recent validation, shown on the compile button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileStatus {
    /// The script compiled and the module can be downloaded.
    Ready,
    /// The binary reported a diagnostic.
    Failed(String),
    /// The bridge itself failed.
    InternalError,
}

impl CompileStatus {
    pub fn label(&self) -> String {
        match self {
            CompileStatus::Ready => "Download".to_string(),
            CompileStatus::Failed(message) => format!("Error: {}", message),
            CompileStatus::InternalError => "Internal Compiler Error".to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, CompileStatus::Ready)
    }

    /// Page background for the status: green on success, red otherwise.
    pub fn background(&self) -> &'static str {
        if self.is_success() {
            "hsl(120, 100%, 20%)"
        } else {
            "hsl(0, 100%, 20%)"
        }
    }
}

impl fmt::Display for CompileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// Markdown tooltip for a hover.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HoverContents {
    pub range: Range,
    pub contents: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Location {
    pub uri: String,
    pub range: Range,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextEdit {
    pub range: Range,
    pub text: String,
}

/// Edits grouped by the document they apply to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkspaceEdit {
    pub resource: String,
    pub edits: Vec<TextEdit>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentHighlightKind {
    Text,
    Read,
    Write,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DocumentHighlight {
    pub range: Range,
    pub kind: DocumentHighlightKind,
}

/// Display hooks of the host editor.
///
/// Implementations are shared between concurrently running requests and
/// use interior mutability.
pub trait EditorSurface: Send + Sync {
    /// Replaces every marker owned by `owner`.
    fn set_markers(&self, owner: &str, markers: Vec<Marker>);

    fn set_status(&self, status: CompileStatus);

    /// Replaces the contents of the read-only output buffer.
    fn set_output(&self, text: &str);
}
