// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! String codec for the analysis binary's linear memory.
//!
//! Source text goes in as UTF-8 followed by a NUL terminator (the binary reads
//! it as a C string). Strings coming back are explicit (pointer, length)
//! slices and are decoded without any terminator handling.

pub mod utf8;

use serde::Deserialize;

/// Selects how text is transcoded at the memory boundary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextCodec {
    /// Rust's built-in UTF-8 handling.
    #[default]
    Native,
    /// The hand-written state machine in [`utf8`].
    Manual,
}

impl TextCodec {
    /// UTF-8 bytes of `text` without a terminator.
    pub fn encode(self, text: &str) -> Vec<u8> {
        match self {
            TextCodec::Native => text.as_bytes().to_vec(),
            TextCodec::Manual => utf8::encode(text),
        }
    }

    /// NUL-terminated UTF-8 bytes; the length is byte length + 1.
    pub fn encode_source(self, text: &str) -> Vec<u8> {
        let mut bytes = self.encode(text);
        bytes.push(0);
        bytes
    }

    /// Decodes a byte slice read out of linear memory.
    pub fn decode(self, bytes: &[u8]) -> String {
        match self {
            TextCodec::Native => String::from_utf8_lossy(bytes).into_owned(),
            TextCodec::Manual => utf8::decode(bytes),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            TextCodec::Native => "native",
            TextCodec::Manual => "manual",
        }
    }
}
