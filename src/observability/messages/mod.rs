// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! * `bridge` - analysis binary loading, instantiation and entry-point calls
//! * `session` - validation requests and their application to the editor

pub mod bridge;
pub mod session;
