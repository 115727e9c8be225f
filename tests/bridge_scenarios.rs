// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! End-to-end scenarios against a stub analysis binary.

use asl_bridge::bridge::{BinaryBridge, InMemoryArtifact, Span};
use asl_bridge::codec::TextCodec;
use asl_bridge::config::load_and_validate_config;
use asl_bridge::editor::{CompileStatus, Range, RecordingSurface};
use asl_bridge::session::{EditorSession, ValidationReport};
use std::io::Write;
use std::sync::Arc;
use tempfile::{NamedTempFile, TempDir};

fn stub_bytes() -> Vec<u8> {
    wat::parse_str(include_str!("fixtures/analysis_stub.wat")).expect("stub must assemble")
}

async fn stub_bridge() -> BinaryBridge {
    let artifact = InMemoryArtifact::new("stub", stub_bytes(), 1 << 20);
    BinaryBridge::load(&artifact, 10_000_000, TextCodec::Native)
        .await
        .unwrap()
}

fn write_config(dir: &TempDir, artifact: &std::path::Path) -> NamedTempFile {
    let mut file = NamedTempFile::new_in(dir.path()).unwrap();
    writeln!(
        file,
        "artifact: {}\ncodec: manual\nlimits:\n  max_references: 4\neditor:\n  document_uri: file:///splits/game.asl",
        artifact.display()
    )
    .unwrap();
    file
}

#[tokio::test]
async fn test_valid_script_compiles_and_shows_outline() {
    let bridge = stub_bridge().await;
    let outcome = bridge
        .compile("state(\"game.exe\") {}\nstart { false }")
        .await
        .unwrap();
    assert!(outcome.is_ok());

    let outcome = bridge.compile("start {\n    fals\n}").await.unwrap();
    let error = outcome.error().unwrap();
    assert!(error.message.contains("unknown identifier"));
    assert_eq!(error.span, Some(Span::new(2, 5, 2, 9)));
}

#[tokio::test]
async fn test_concurrent_requests_do_not_interfere() {
    let bridge = stub_bridge().await;
    let source = "start { true }";

    let (definition, compiled, references) = tokio::join!(
        bridge.definition(source, 1, 3),
        bridge.compile(source),
        bridge.find_all_references(source, 1, 4),
    );

    assert_eq!(definition.unwrap(), Some(Span::new(1, 1, 1, 6)));
    assert!(compiled.unwrap().is_ok());
    assert_eq!(references.unwrap().unwrap().len(), 3);
}

#[tokio::test]
async fn test_session_from_config_file() {
    let dir = TempDir::new().unwrap();
    let artifact = dir.path().join("asl_lang.wasm");
    std::fs::write(&artifact, stub_bytes()).unwrap();
    let config_file = write_config(&dir, &artifact);

    let config = load_and_validate_config(config_file.path()).unwrap();
    let surface = Arc::new(RecordingSurface::new());
    let session = EditorSession::from_config(&config, surface.clone());
    assert_eq!(session.settings().codec, TextCodec::Manual);

    session.set_source("start { \"ü\" fals }").await;
    let report = session.validate().await;
    assert!(matches!(report.status(), Some(CompileStatus::Failed(_))));
    assert_eq!(
        surface.markers("asl")[0].range,
        Range::new(1, 13, 1, 17),
        "marker columns count characters, not bytes"
    );

    // Reference lists are capped by `limits.max_references`.
    session.set_source("x").await;
    let locations = session.references(1, 9).await.unwrap().unwrap();
    assert_eq!(locations.len(), 4);
    assert!(locations
        .iter()
        .all(|location| location.uri == "file:///splits/game.asl"));
}

#[tokio::test]
async fn test_missing_binary_is_retried_on_next_request() {
    let dir = TempDir::new().unwrap();
    let artifact = dir.path().join("later.wasm");
    let config_file = write_config(&dir, &artifact);
    let config = load_and_validate_config(config_file.path()).unwrap();

    let surface = Arc::new(RecordingSurface::new());
    let session = Arc::new(EditorSession::from_config(&config, surface.clone()));
    session.set_source("start { false }").await;

    let report = session.validate().await;
    assert_eq!(report.status(), Some(&CompileStatus::InternalError));
    assert!(session.hover(1, 1).await.is_err());
    assert_eq!(surface.status().unwrap().label(), "Internal Compiler Error");

    std::fs::write(&artifact, stub_bytes()).unwrap();

    let report = session.on_content_changed("start { true }").await.await.unwrap();
    match report {
        ValidationReport::Applied {
            status,
            module_bytes,
            ..
        } => {
            assert_eq!(status, CompileStatus::Ready);
            assert!(module_bytes.is_some());
        }
        other => panic!("Expected Applied, got {:?}", other),
    }
    assert_eq!(surface.output(), "(module)");
    assert_eq!(surface.status().unwrap().label(), "Download");
}

#[tokio::test]
async fn test_non_wasm_artifact_is_rejected() {
    let artifact = InMemoryArtifact::new("junk", b"#!/bin/sh\necho hi\n".to_vec(), 1 << 20);
    let result = BinaryBridge::load(&artifact, 10_000_000, TextCodec::Native).await;
    assert!(result.is_err());
}
