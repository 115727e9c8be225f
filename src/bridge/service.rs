// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Async request API over the analysis binary.
//!
//! Every request re-uploads the full source into a fresh instance and runs on
//! the blocking pool, so overlapping requests never share memory or a store.

use crate::bridge::abi;
use crate::bridge::binary::AnalysisBinary;
use crate::bridge::decode::{decode_compile, decode_definition, decode_hover, decode_references};
use crate::bridge::error::{BridgeError, BridgeResult};
use crate::bridge::handle::{CompileOutcome, HoverInfo, Span};
use crate::bridge::instance::{AnalysisInstance, SourceBuffer};
use crate::bridge::loader::ArtifactSource;
use crate::codec::TextCodec;
use crate::config::consts::{DEFAULT_MAX_REFERENCES, DEFAULT_MAX_SOURCE_BYTES};
use crate::observability::messages::bridge::{
    EntryPointCompleted, EntryPointFailed, InstanceCreated,
};

/// Short outcome label used in per-request logs.
trait OutcomeLabel {
    fn label(&self) -> &'static str;
}

impl OutcomeLabel for CompileOutcome {
    fn label(&self) -> &'static str {
        if self.is_ok() {
            "ok"
        } else {
            "error"
        }
    }
}

impl<T> OutcomeLabel for Option<T> {
    fn label(&self) -> &'static str {
        if self.is_some() {
            "found"
        } else {
            "none"
        }
    }
}

/// The Binary Bridge: compile and language-service queries.
#[derive(Clone)]
pub struct BinaryBridge {
    binary: AnalysisBinary,
    codec: TextCodec,
    max_source_bytes: usize,
    max_references: usize,
}

impl BinaryBridge {
    pub fn new(binary: AnalysisBinary, codec: TextCodec) -> Self {
        Self {
            binary,
            codec,
            max_source_bytes: DEFAULT_MAX_SOURCE_BYTES,
            max_references: DEFAULT_MAX_REFERENCES,
        }
    }

    pub fn with_limits(mut self, max_source_bytes: usize, max_references: usize) -> Self {
        self.max_source_bytes = max_source_bytes;
        self.max_references = max_references;
        self
    }

    /// Fetches and compiles the analysis binary.
    ///
    /// Compilation is CPU bound and runs on the blocking pool.
    pub async fn load(
        source: &dyn ArtifactSource,
        fuel: u64,
        codec: TextCodec,
    ) -> BridgeResult<Self> {
        let bytes = source.fetch().await?;
        let binary =
            tokio::task::spawn_blocking(move || AnalysisBinary::from_bytes(&bytes, fuel)).await??;
        Ok(Self::new(binary, codec))
    }

    pub fn codec(&self) -> TextCodec {
        self.codec
    }

    pub fn max_references(&self) -> usize {
        self.max_references
    }

    /// Compiles `source` into module bytes or a diagnostic.
    pub async fn compile(&self, source: &str) -> BridgeResult<CompileOutcome> {
        self.run(abi::COMPILE, source, |instance, buffer, codec| {
            let result = instance.compile(buffer)?;
            decode_compile(instance, codec, result, abi::COMPILE)
        })
        .await
    }

    /// Type of the symbol at a 1-based byte position, if any.
    pub async fn hover(
        &self,
        source: &str,
        line: u32,
        column: u32,
    ) -> BridgeResult<Option<HoverInfo>> {
        self.run(abi::HOVER, source, move |instance, buffer, codec| {
            let result = instance.hover(buffer, line, column)?;
            decode_hover(instance, codec, result, abi::HOVER)
        })
        .await
    }

    pub async fn definition(
        &self,
        source: &str,
        line: u32,
        column: u32,
    ) -> BridgeResult<Option<Span>> {
        self.run(abi::GO_TO_DEFINITION, source, move |instance, buffer, codec| {
            let result = instance.go_to_definition(buffer, line, column)?;
            decode_definition(instance, codec, result, abi::GO_TO_DEFINITION)
        })
        .await
    }

    /// Every reference to the symbol at a position, capped at `max_references`.
    pub async fn find_all_references(
        &self,
        source: &str,
        line: u32,
        column: u32,
    ) -> BridgeResult<Option<Vec<Span>>> {
        let cap = self.max_references;
        self.run(abi::FIND_ALL_REFERENCES, source, move |instance, buffer, codec| {
            let result = instance.find_all_references(buffer, line, column)?;
            decode_references(instance, codec, result, abi::FIND_ALL_REFERENCES, cap)
        })
        .await
    }

    async fn run<T, F>(&self, entry_point: &'static str, source: &str, request: F) -> BridgeResult<T>
    where
        T: OutcomeLabel + Send + 'static,
        F: FnOnce(&mut AnalysisInstance, &SourceBuffer, TextCodec) -> BridgeResult<T>
            + Send
            + 'static,
    {
        if source.len() > self.max_source_bytes {
            let error = BridgeError::SourceTooLarge {
                size: source.len(),
                max: self.max_source_bytes,
            };
            tracing::error!("{}", EntryPointFailed { entry_point, error: &error });
            return Err(error);
        }

        let binary = self.binary.clone();
        let codec = self.codec;
        let text = source.to_owned();

        let result = tokio::task::spawn_blocking(move || -> BridgeResult<T> {
            let mut instance = binary.instantiate()?;
            tracing::debug!(
                "{}",
                InstanceCreated {
                    entry_point,
                    source_bytes: text.len(),
                }
            );

            let buffer = instance.upload_source(codec, &text)?;
            let value = request(&mut instance, &buffer, codec)?;
            instance.release(buffer)?;

            tracing::debug!(
                "{}",
                EntryPointCompleted {
                    entry_point,
                    outcome: value.label(),
                    fuel_consumed: instance.fuel_consumed(),
                }
            );
            Ok(value)
        })
        .await
        .map_err(BridgeError::from)
        .and_then(|inner| inner);

        if let Err(error) = &result {
            tracing::error!("{}", EntryPointFailed { entry_point, error });
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::loader::InMemoryArtifact;
    use crate::bridge::testing::stub_binary_bytes;

    async fn bridge() -> BinaryBridge {
        let artifact = InMemoryArtifact::new("stub", stub_binary_bytes(), 1 << 20);
        BinaryBridge::load(&artifact, 10_000_000, TextCodec::Native)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_compile_valid_source() {
        let outcome = bridge()
            .await
            .compile(r#"state("a.exe"){} start { false }"#)
            .await
            .unwrap();

        let bytes = outcome.module_bytes().unwrap();
        assert!(!bytes.is_empty());
        assert_eq!(&bytes[..4], b"\0asm");
    }

    #[tokio::test]
    async fn test_compile_reports_unknown_identifier() {
        let outcome = bridge()
            .await
            .compile(r#"state("a.exe"){} start { fals }"#)
            .await
            .unwrap();

        let error = outcome.error().unwrap();
        assert!(error.message.contains("fals"));
        assert_eq!(error.span, Some(Span::new(1, 26, 1, 30)));
    }

    #[tokio::test]
    async fn test_compile_error_without_span() {
        let outcome = bridge().await.compile("").await.unwrap();
        let error = outcome.error().unwrap();
        assert_eq!(error.message, "empty script");
        assert_eq!(error.span, None);
    }

    #[tokio::test]
    async fn test_manual_codec_matches_native() {
        let artifact = InMemoryArtifact::new("stub", stub_binary_bytes(), 1 << 20);
        let bridge = BinaryBridge::load(&artifact, 10_000_000, TextCodec::Manual)
            .await
            .unwrap();

        let outcome = bridge.compile("start { \"é\" fals }").await.unwrap();
        // `é` is two bytes, so the byte column is one past the char column.
        assert_eq!(outcome.error().unwrap().span, Some(Span::new(1, 14, 1, 18)));
    }

    #[tokio::test]
    async fn test_hover_without_symbol_is_none() {
        let bridge = bridge().await;
        assert_eq!(bridge.hover("start { true }", 3, 1).await.unwrap(), None);
        assert_eq!(bridge.hover("start { true }", 99, 1).await.unwrap(), None);

        let hover = bridge.hover("start { true }", 1, 2).await.unwrap().unwrap();
        assert_eq!(hover.ty, "bool");
        assert_eq!(hover.span, Span::new(1, 1, 1, 6));
    }

    #[tokio::test]
    async fn test_references_zero_one_many() {
        let bridge = bridge().await;
        let src = "x";
        assert_eq!(bridge.find_all_references(src, 1, 1).await.unwrap(), Some(vec![]));
        assert_eq!(
            bridge.find_all_references(src, 1, 2).await.unwrap(),
            Some(vec![Span::new(1, 1, 1, 4)])
        );
        let many = bridge.find_all_references(src, 1, 8).await.unwrap().unwrap();
        assert_eq!(many.len(), 7);
        assert_eq!(many[6], Span::new(7, 1, 7, 4));
        assert_eq!(bridge.find_all_references(src, 5, 1).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_endless_reference_list_is_capped() {
        let bridge = bridge().await.with_limits(1 << 20, 32);
        let spans = bridge.find_all_references("x", 42, 1).await.unwrap().unwrap();
        assert_eq!(spans.len(), 32);
    }

    #[tokio::test]
    async fn test_oversized_source_rejected() {
        let bridge = bridge().await.with_limits(8, 16);
        match bridge.compile("start { false }").await {
            Err(BridgeError::SourceTooLarge { size, max }) => {
                assert_eq!(size, 15);
                assert_eq!(max, 8);
            }
            other => panic!("Expected SourceTooLarge, got {:?}", other.map(|o| o.is_ok())),
        }
    }

    #[tokio::test]
    async fn test_fuel_exhaustion_is_an_infrastructure_error() {
        let artifact = InMemoryArtifact::new("stub", stub_binary_bytes(), 1 << 20);
        let bridge = BinaryBridge::load(&artifact, 50, TextCodec::Native)
            .await
            .unwrap();
        let long = "start { true }\n".repeat(64);
        assert!(matches!(
            bridge.compile(&long).await,
            Err(BridgeError::ExecutionError(_))
        ));
    }
}
