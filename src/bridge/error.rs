// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Error types for the binary bridge.
//!
//! Every variant here is an infrastructure failure: the analysis binary could
//! not be fetched, compiled, instantiated or read back. Diagnostics reported by
//! the binary itself are values (`CompileOutcome::Failed`), never errors.

use thiserror::Error;

/// Error message for WebAssembly components handed to the bridge.
pub const COMPONENT_NOT_SUPPORTED: &str = "Unsupported analysis binary: Component Model \
binaries are not supported, the analysis binary must be a core WASM module.";

/// Infrastructure failures raised while talking to the analysis binary.
#[derive(Error, Debug)]
pub enum BridgeError {
    /// File I/O error while fetching the artifact.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Artifact exceeds the configured size limit.
    #[error("Analysis binary too large: {size} bytes (max: {max} bytes)")]
    ArtifactTooLarge { size: usize, max: usize },

    /// Invalid or malformed WASM binary format.
    #[error("Invalid WASM binary: {0}")]
    InvalidWasmBinary(String),

    /// WASM binary parsing error from wasmparser.
    #[error("WASM parser error: {0}")]
    ParserError(#[from] wasmparser::BinaryReaderError),

    /// Unsupported WASM encoding (components).
    #[error("Unsupported encoding: {0}")]
    UnsupportedEncoding(String),

    /// Module compilation or instantiation error.
    #[error("WASM module error: {0}")]
    ModuleError(String),

    /// The binary imports host functions; the bridge links an empty environment.
    #[error("Analysis binary must not import host items, found: {}", .0.join(", "))]
    ForbiddenImports(Vec<String>),

    /// A required export is absent or has the wrong signature.
    #[error("Analysis binary export '{name}' unavailable: {reason}")]
    MissingExport { name: &'static str, reason: String },

    /// Wasmtime runtime execution error (traps, fuel exhaustion).
    #[error("WASM execution error: {0}")]
    ExecutionError(#[from] wasmtime::Error),

    /// The binary's allocator returned a null pointer.
    #[error("Analysis binary failed to allocate {0} bytes")]
    AllocationFailed(usize),

    /// Memory access outside the binary's linear memory.
    #[error("Memory access out of bounds: ptr={ptr} len={len} memory_size={memory_size}")]
    OutOfBounds {
        ptr: u32,
        len: u32,
        memory_size: usize,
    },

    /// Source text exceeds the configured limit.
    #[error("Source too large: {size} bytes (max: {max} bytes)")]
    SourceTooLarge { size: usize, max: usize },

    /// Line or column cannot be represented on the binary's ABI.
    #[error("Invalid position: line {line}, column {column}")]
    InvalidPosition { line: u32, column: u32 },

    /// A handle that must be present was zero.
    #[error("Malformed result from '{entry_point}': {reason}")]
    MalformedResult {
        entry_point: &'static str,
        reason: String,
    },

    /// The blocking worker running the request panicked or was cancelled.
    #[error("Bridge worker failed: {0}")]
    JoinError(#[from] tokio::task::JoinError),
}

/// Result type alias for bridge operations.
pub type BridgeResult<T> = Result<T, BridgeError>;
