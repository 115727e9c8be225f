// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The editor session.
//!
//! [`EditorSession`] is constructed once at startup and shared by every
//! handler. It owns the two buffers (ASL source and read-only WAST output),
//! the lazily loaded analysis binary and the surface results are pushed to.
//!
//! Requests never share an analysis instance, so they may overlap freely.
//! Only diagnostics are ordered: a validation result is dropped when a newer
//! validation was issued while it was in flight.

pub mod sequencer;

use crate::bridge::outline::render_outline;
use crate::bridge::{
    ArtifactSource, BinaryBridge, BridgeError, BridgeResult, CompileOutcome, FileArtifact,
};
use crate::codec::TextCodec;
use crate::config::Config;
use crate::editor::{
    ColumnMap, CompileStatus, DocumentHighlight, DocumentHighlightKind, EditorSurface,
    HoverContents, Location, Marker, MarkerSeverity, Range, TextEdit, WorkspaceEdit,
};
use crate::language::completion::{CompletionItem, COMPLETION_ITEMS};
use crate::observability::messages::session::{
    InternalFailure, OutlineFailed, ValidationApplied, ValidationStarted, ValidationSuperseded,
};
use sequencer::{RequestSequencer, Ticket};
use std::sync::Arc;
use tokio::sync::{OnceCell, RwLock};
use tokio::task::JoinHandle;

/// Source shown when the editor opens.
pub const INITIAL_SOURCE: &str = "state(\"game.exe\") {\n}\n\nstart {\n    false\n}\n\nsplit {\n    true\n}";

/// Settings the session needs from [`Config`].
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub codec: TextCodec,
    pub fuel: u64,
    pub max_source_bytes: usize,
    pub max_references: usize,
    pub marker_owner: String,
    pub document_uri: String,
}

impl SessionSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            codec: config.codec,
            fuel: config.wasm.fuel.effective(),
            max_source_bytes: config.limits.max_source_bytes(),
            max_references: config.limits.max_references(),
            marker_owner: config.editor.marker_owner().to_string(),
            document_uri: config.editor.document_uri().to_string(),
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// What a validation did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationReport {
    /// The result was pushed to the editor surface.
    Applied {
        sequence: u64,
        status: CompileStatus,
        markers: Vec<Marker>,
        module_bytes: Option<Vec<u8>>,
    },
    /// A newer validation was issued first; nothing was displayed.
    Superseded { sequence: u64, latest: u64 },
}

impl ValidationReport {
    pub fn status(&self) -> Option<&CompileStatus> {
        match self {
            ValidationReport::Applied { status, .. } => Some(status),
            ValidationReport::Superseded { .. } => None,
        }
    }
}

pub struct EditorSession {
    source: RwLock<String>,
    output: RwLock<String>,
    bridge: OnceCell<BinaryBridge>,
    artifact: Arc<dyn ArtifactSource>,
    surface: Arc<dyn EditorSurface>,
    sequencer: RequestSequencer,
    settings: SessionSettings,
}

impl EditorSession {
    pub fn new(
        artifact: Arc<dyn ArtifactSource>,
        surface: Arc<dyn EditorSurface>,
        settings: SessionSettings,
    ) -> Self {
        Self {
            source: RwLock::new(INITIAL_SOURCE.to_string()),
            output: RwLock::new(String::new()),
            bridge: OnceCell::new(),
            artifact,
            surface,
            sequencer: RequestSequencer::new(),
            settings,
        }
    }

    /// Session reading the analysis binary from the configured path.
    pub fn from_config(config: &Config, surface: Arc<dyn EditorSurface>) -> Self {
        let artifact = FileArtifact::new(
            config.artifact_path(),
            config.limits.max_artifact_bytes(),
        );
        Self::new(
            Arc::new(artifact),
            surface,
            SessionSettings::from_config(config),
        )
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    /// The bridge, loading the analysis binary on first use.
    ///
    /// A failed load is not cached; the next request tries again.
    pub async fn bridge(&self) -> BridgeResult<&BinaryBridge> {
        self.bridge
            .get_or_try_init(|| async {
                let bridge =
                    BinaryBridge::load(self.artifact.as_ref(), self.settings.fuel, self.settings.codec)
                        .await?;
                Ok::<_, BridgeError>(
                    bridge.with_limits(self.settings.max_source_bytes, self.settings.max_references),
                )
            })
            .await
    }

    pub async fn source(&self) -> String {
        self.source.read().await.clone()
    }

    pub async fn set_source(&self, text: impl Into<String>) {
        *self.source.write().await = text.into();
    }

    pub async fn output(&self) -> String {
        self.output.read().await.clone()
    }

    /// Replaces the source and validates it after one scheduler tick.
    ///
    /// Edits landing in the same tick are coalesced by the latest-wins rule.
    pub async fn on_content_changed(
        self: &Arc<Self>,
        text: impl Into<String>,
    ) -> JoinHandle<ValidationReport> {
        self.set_source(text).await;
        let session = Arc::clone(self);
        tokio::spawn(async move {
            tokio::task::yield_now().await;
            session.validate().await
        })
    }

    /// Compiles the current source and shows the outcome.
    pub async fn validate(&self) -> ValidationReport {
        let ticket = self.sequencer.issue();
        let source = self.source().await;
        tracing::debug!(
            "{}",
            ValidationStarted {
                sequence: ticket.sequence(),
                source_bytes: source.len(),
            }
        );

        let outcome = match self.bridge().await {
            Ok(bridge) => bridge.compile(&source).await,
            Err(e) => Err(e),
        };
        self.apply(ticket, &source, outcome).await
    }

    async fn apply(
        &self,
        ticket: Ticket,
        source: &str,
        outcome: BridgeResult<CompileOutcome>,
    ) -> ValidationReport {
        let sequence = ticket.sequence();
        if !self.sequencer.is_current(ticket) {
            let latest = self.sequencer.latest();
            tracing::debug!("{}", ValidationSuperseded { sequence, latest });
            return ValidationReport::Superseded { sequence, latest };
        }

        let mut markers = Vec::new();
        let mut module_bytes = None;
        let status = match outcome {
            Ok(CompileOutcome::Compiled(module)) => {
                match render_outline(&module.bytes) {
                    Ok(outline) => {
                        self.surface.set_output(&outline);
                        *self.output.write().await = outline;
                    }
                    Err(error) => tracing::warn!("{}", OutlineFailed { error: &error }),
                }
                module_bytes = Some(module.bytes);
                CompileStatus::Ready
            }
            Ok(CompileOutcome::Failed(error)) => {
                if let Some(span) = &error.span {
                    markers.push(Marker {
                        range: ColumnMap::new(source).span_to_range(span),
                        severity: MarkerSeverity::Error,
                        message: error.message.clone(),
                    });
                }
                CompileStatus::Failed(error.message)
            }
            Err(error) => {
                tracing::error!("{}", InternalFailure { sequence, error: &error });
                CompileStatus::InternalError
            }
        };

        self.surface
            .set_markers(&self.settings.marker_owner, markers.clone());
        self.surface.set_status(status.clone());
        tracing::info!(
            "{}",
            ValidationApplied {
                sequence,
                status: &status.label(),
                marker_count: markers.len(),
            }
        );

        ValidationReport::Applied {
            sequence,
            status,
            markers,
            module_bytes,
        }
    }

    /// Type tooltip for the symbol under the cursor.
    pub async fn hover(&self, line: u32, column: u32) -> BridgeResult<Option<HoverContents>> {
        let source = self.source().await;
        let map = ColumnMap::new(&source);
        let bridge = self.bridge().await?;
        let hover = bridge
            .hover(&source, line, map.to_byte_column(line, column))
            .await?;
        Ok(hover.map(|hover| HoverContents {
            range: map.span_to_range(&hover.span),
            contents: vec![format!("```asl\n{}\n```", hover.ty)],
        }))
    }

    pub async fn definition(&self, line: u32, column: u32) -> BridgeResult<Option<Location>> {
        let source = self.source().await;
        let map = ColumnMap::new(&source);
        let bridge = self.bridge().await?;
        let span = bridge
            .definition(&source, line, map.to_byte_column(line, column))
            .await?;
        Ok(span.map(|span| Location {
            uri: self.settings.document_uri.clone(),
            range: map.span_to_range(&span),
        }))
    }

    /// Ranges of every reference to the symbol under the cursor.
    async fn reference_ranges(&self, line: u32, column: u32) -> BridgeResult<Option<Vec<Range>>> {
        let source = self.source().await;
        let map = ColumnMap::new(&source);
        let bridge = self.bridge().await?;
        let spans = bridge
            .find_all_references(&source, line, map.to_byte_column(line, column))
            .await?;
        Ok(spans.map(|spans| spans.iter().map(|span| map.span_to_range(span)).collect()))
    }

    pub async fn references(&self, line: u32, column: u32) -> BridgeResult<Option<Vec<Location>>> {
        let ranges = self.reference_ranges(line, column).await?;
        Ok(ranges.map(|ranges| {
            ranges
                .into_iter()
                .map(|range| Location {
                    uri: self.settings.document_uri.clone(),
                    range,
                })
                .collect()
        }))
    }

    /// One edit replacing every reference with `new_name`.
    pub async fn rename_edits(
        &self,
        line: u32,
        column: u32,
        new_name: &str,
    ) -> BridgeResult<Option<WorkspaceEdit>> {
        let ranges = self.reference_ranges(line, column).await?;
        Ok(ranges.map(|ranges| WorkspaceEdit {
            resource: self.settings.document_uri.clone(),
            edits: ranges
                .into_iter()
                .map(|range| TextEdit {
                    range,
                    text: new_name.to_string(),
                })
                .collect(),
        }))
    }

    pub async fn document_highlights(
        &self,
        line: u32,
        column: u32,
    ) -> BridgeResult<Option<Vec<DocumentHighlight>>> {
        let ranges = self.reference_ranges(line, column).await?;
        Ok(ranges.map(|ranges| {
            ranges
                .into_iter()
                .map(|range| DocumentHighlight {
                    range,
                    kind: DocumentHighlightKind::Text,
                })
                .collect()
        }))
    }

    pub fn completion_items(&self) -> &'static [CompletionItem] {
        COMPLETION_ITEMS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::testing::stub_binary_bytes;
    use crate::bridge::InMemoryArtifact;
    use crate::editor::{Range, RecordingSurface};

    fn session_with(bytes: Vec<u8>) -> (Arc<EditorSession>, Arc<RecordingSurface>) {
        let surface = Arc::new(RecordingSurface::new());
        let artifact = Arc::new(InMemoryArtifact::new("stub", bytes, 1 << 20));
        let settings = SessionSettings {
            fuel: 10_000_000,
            ..SessionSettings::default()
        };
        let session = EditorSession::new(artifact, surface.clone(), settings);
        (Arc::new(session), surface)
    }

    fn session() -> (Arc<EditorSession>, Arc<RecordingSurface>) {
        session_with(stub_binary_bytes())
    }

    #[tokio::test]
    async fn test_initial_source_compiles() {
        let (session, surface) = session();
        let report = session.validate().await;

        assert_eq!(report.status(), Some(&CompileStatus::Ready));
        assert_eq!(surface.status(), Some(CompileStatus::Ready));
        assert!(surface.markers("asl").is_empty());
        assert_eq!(session.output().await, "(module)");
        assert_eq!(surface.output(), "(module)");
    }

    #[tokio::test]
    async fn test_diagnostic_becomes_marker() {
        let (session, surface) = session();
        session.set_source("start { \"é\" fals }").await;

        match session.validate().await {
            ValidationReport::Applied {
                status, markers, ..
            } => {
                assert_eq!(
                    status,
                    CompileStatus::Failed("unknown identifier `fals`".to_string())
                );
                assert_eq!(markers.len(), 1);
                // Byte columns 14..18 are character columns 13..17.
                assert_eq!(markers[0].range, Range::new(1, 13, 1, 17));
            }
            other => panic!("Expected Applied, got {:?}", other),
        }
        assert_eq!(surface.markers("asl").len(), 1);
    }

    #[tokio::test]
    async fn test_bad_artifact_is_an_internal_failure() {
        let (session, surface) = session_with(b"not wasm".to_vec());
        let report = session.validate().await;

        assert_eq!(report.status(), Some(&CompileStatus::InternalError));
        assert_eq!(surface.status().unwrap().label(), "Internal Compiler Error");
        assert!(session.hover(1, 1).await.is_err());
    }

    #[tokio::test]
    async fn test_stale_validation_is_dropped() {
        let (session, surface) = session();
        let stale = session.sequencer.issue();
        let _newer = session.sequencer.issue();

        let report = session
            .apply(stale, "", Ok(CompileOutcome::Compiled(Default::default())))
            .await;

        assert_eq!(
            report,
            ValidationReport::Superseded {
                sequence: 1,
                latest: 2
            }
        );
        assert_eq!(surface.status(), None);
    }

    #[tokio::test]
    async fn test_content_change_revalidates() {
        let (session, surface) = session();
        let handle = session.on_content_changed("split { fals }").await;
        let report = handle.await.unwrap();

        assert!(matches!(report.status(), Some(CompileStatus::Failed(_))));
        assert_eq!(surface.markers("asl")[0].range, Range::new(1, 9, 1, 13));
    }

    #[tokio::test]
    async fn test_only_latest_edit_is_displayed() {
        let (session, surface) = session();
        let first = session.on_content_changed("start { fals }").await;
        let second = session.on_content_changed("start { false }").await;

        let reports = [first.await.unwrap(), second.await.unwrap()];

        assert!(reports
            .iter()
            .any(|r| matches!(r, ValidationReport::Applied { .. })));
        assert_eq!(surface.status(), Some(CompileStatus::Ready));
        assert!(surface.markers("asl").is_empty());
    }

    #[tokio::test]
    async fn test_hover_markup() {
        let (session, _) = session();
        let hover = session.hover(1, 3).await.unwrap().unwrap();
        assert_eq!(hover.contents, vec!["```asl\nbool\n```".to_string()]);
        assert_eq!(hover.range, Range::new(1, 1, 1, 6));
        assert_eq!(session.hover(5, 1).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_definition_location() {
        let (session, _) = session();
        let location = session.definition(1, 1).await.unwrap().unwrap();
        assert_eq!(location.uri, "inmemory://model/1");
        assert_eq!(location.range, Range::new(1, 1, 1, 6));
        assert_eq!(session.definition(99, 1).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_rename_and_highlights() {
        let (session, _) = session();

        let edit = session.rename_edits(1, 4, "level").await.unwrap().unwrap();
        assert_eq!(edit.edits.len(), 3);
        assert!(edit.edits.iter().all(|e| e.text == "level"));
        assert_eq!(edit.edits[2].range, Range::new(3, 1, 3, 4));

        let highlights = session.document_highlights(1, 3).await.unwrap().unwrap();
        assert_eq!(highlights.len(), 2);
        assert!(highlights
            .iter()
            .all(|h| h.kind == DocumentHighlightKind::Text));

        let locations = session.references(1, 2).await.unwrap().unwrap();
        assert_eq!(locations.len(), 1);
        assert_eq!(locations[0].uri, "inmemory://model/1");
        assert_eq!(locations[0].range, Range::new(1, 1, 1, 4));

        assert_eq!(session.rename_edits(4, 1, "x").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_completion_items_need_no_binary() {
        let (session, _) = session_with(Vec::new());
        assert_eq!(session.completion_items().len(), 12);
    }
}
