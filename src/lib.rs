// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod bridge;     // analysis binary host + ABI
pub mod codec;      // string transfer across the boundary
pub mod config;     // YAML config
pub mod editor;     // editor-facing types and surfaces
pub mod errors;     // error handling
pub mod language;   // tokenizers, theme, snippets
pub mod observability;
pub mod session;    // request orchestration
