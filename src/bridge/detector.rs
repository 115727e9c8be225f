// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Analysis binary encoding detection
//!
//! The bridge talks to the analysis binary through C-style exports over linear
//! memory, which only a core module provides. Components are rejected before
//! wasmtime ever sees them.

use crate::bridge::error::{BridgeError, BridgeResult, COMPONENT_NOT_SUPPORTED};

use wasmparser::{Encoding, Parser, Payload};

/// Checks that `bytes` is a well-formed core WebAssembly module.
///
/// # Errors
/// Returns an error if:
/// - The input is empty, truncated, or otherwise not valid WebAssembly
/// - The binary is a Component Model component
pub fn ensure_core_module(bytes: &[u8]) -> BridgeResult<()> {
    let mut encoding = None;

    for payload in Parser::new(0).parse_all(bytes) {
        if let Payload::Version { encoding: enc, .. } = payload? {
            encoding = Some(enc);
        }
    }

    match encoding {
        Some(Encoding::Module) => Ok(()),
        Some(Encoding::Component) => Err(BridgeError::UnsupportedEncoding(
            COMPONENT_NOT_SUPPORTED.to_string(),
        )),
        None => Err(BridgeError::InvalidWasmBinary(
            "missing WASM version header".to_string(),
        )),
    }
}
