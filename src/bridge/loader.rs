// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Analysis binary fetching and size validation
//!
//! This module only obtains the artifact bytes. It does not parse or compile
//! them - that is the job of `detector` and `binary`.

use crate::bridge::error::{BridgeError, BridgeResult};
use crate::observability::messages::bridge::{ArtifactLoadFailed, ArtifactLoaded};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Somewhere the compiled analysis binary can be fetched from.
#[async_trait]
pub trait ArtifactSource: Send + Sync {
    /// Fetch the raw artifact bytes.
    async fn fetch(&self) -> BridgeResult<Vec<u8>>;

    /// Human-readable location used in logs.
    fn describe(&self) -> String;
}

/// Reads the artifact from the filesystem.
#[derive(Debug, Clone)]
pub struct FileArtifact {
    path: PathBuf,
    max_bytes: usize,
}

impl FileArtifact {
    pub fn new(path: impl Into<PathBuf>, max_bytes: usize) -> Self {
        Self {
            path: path.into(),
            max_bytes,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ArtifactSource for FileArtifact {
    async fn fetch(&self) -> BridgeResult<Vec<u8>> {
        let described = self.describe();
        let result = match tokio::fs::read(&self.path).await {
            Ok(bytes) => check_size(bytes, self.max_bytes),
            Err(e) => Err(BridgeError::IoError(e)),
        };
        log_fetch(&described, result)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Serves artifact bytes already held in memory.
#[derive(Debug, Clone)]
pub struct InMemoryArtifact {
    label: String,
    bytes: Vec<u8>,
    max_bytes: usize,
}

impl InMemoryArtifact {
    pub fn new(label: impl Into<String>, bytes: Vec<u8>, max_bytes: usize) -> Self {
        Self {
            label: label.into(),
            bytes,
            max_bytes,
        }
    }
}

#[async_trait]
impl ArtifactSource for InMemoryArtifact {
    async fn fetch(&self) -> BridgeResult<Vec<u8>> {
        log_fetch(&self.label, check_size(self.bytes.clone(), self.max_bytes))
    }

    fn describe(&self) -> String {
        self.label.clone()
    }
}

fn check_size(bytes: Vec<u8>, max_bytes: usize) -> BridgeResult<Vec<u8>> {
    if bytes.len() > max_bytes {
        return Err(BridgeError::ArtifactTooLarge {
            size: bytes.len(),
            max: max_bytes,
        });
    }
    Ok(bytes)
}

fn log_fetch(source: &str, result: BridgeResult<Vec<u8>>) -> BridgeResult<Vec<u8>> {
    match &result {
        Ok(bytes) => tracing::info!(
            "{}",
            ArtifactLoaded {
                source,
                size_bytes: bytes.len(),
            }
        ),
        Err(error) => tracing::error!("{}", ArtifactLoadFailed { source, error }),
    }
    result
}
