// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging.
//!
//! Log text is produced by small message structs implementing `Display`, so
//! call sites never carry ad-hoc format strings:
//!
//! * `messages::bridge` - analysis binary loading and entry-point calls
//! * `messages::session` - validation lifecycle of the editor session
//!
//! # Usage
//!
//! ```rust
//! use asl_bridge::observability::messages::bridge::ReferenceCapReached;
//!
//! tracing::warn!("{}", ReferenceCapReached { cap: 65_536 });
//! ```

pub mod messages;
