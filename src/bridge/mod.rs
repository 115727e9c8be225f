// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Binary Bridge between the editor session and the ASL analysis binary.
//!
//! The analysis binary is a core WebAssembly module exposing C-style entry
//! points over linear memory. The bridge owns everything on the host side of
//! that boundary:
//!
//! - **Loading**: fetch the artifact ([`ArtifactSource`]), reject components,
//!   compile it once and verify its export surface ([`AnalysisBinary`])
//! - **Marshalling**: upload NUL-terminated source text into a fresh instance
//!   per request ([`AnalysisInstance`])
//! - **Decoding**: read result handles back through accessor exports only
//!   ([`decode`])
//! - **Requests**: async compile and language-service queries ([`BinaryBridge`])
//!
//! # Outcome tiers
//! Diagnostics reported by the binary are values ([`CompileOutcome::Failed`]).
//! Failures to fetch, instantiate or read the binary are [`BridgeError`]s.
//! Optional queries with nothing to report return `Ok(None)`.

pub mod abi;
pub mod binary;
pub mod decode;
pub mod detector;
pub mod error;
pub mod handle;
pub mod instance;
pub mod loader;
pub mod outline;
pub mod service;

#[cfg(test)]
pub(crate) mod testing;

pub use binary::AnalysisBinary;
pub use error::{BridgeError, BridgeResult};
pub use handle::{CompileOutcome, CompiledModule, ErrorInfo, Handle, HoverInfo, Span};
pub use instance::{AnalysisInstance, SourceBuffer};
pub use loader::{ArtifactSource, FileArtifact, InMemoryArtifact};
pub use service::BinaryBridge;
