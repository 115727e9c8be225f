// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for analysis binary loading and request events.
//!
//! This module contains message types for logging events related to:
//! * fetching and compiling the analysis binary
//! * per-request instantiation
//! * entry-point calls and their decode outcome

use std::fmt::{Display, Formatter};

/// Analysis binary fetched successfully.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use asl_bridge::observability::messages::bridge::ArtifactLoaded;
///
/// let msg = ArtifactLoaded {
///     source: "asl_lang.wasm",
///     size_bytes: 4096,
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct ArtifactLoaded<'a> {
    pub source: &'a str,
    pub size_bytes: usize,
}

impl Display for ArtifactLoaded<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Loaded analysis binary: {} ({} bytes)",
            self.source, self.size_bytes
        )
    }
}

/// Analysis binary could not be fetched.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct ArtifactLoadFailed<'a> {
    pub source: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for ArtifactLoadFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Failed to load analysis binary '{}': {}",
            self.source, self.error
        )
    }
}

/// Analysis binary compiled by wasmtime.
///
/// # Log Level
/// `info!` - Important operational event
pub struct BinaryCompiled {
    pub export_count: usize,
    pub fuel_level: u64,
}

impl Display for BinaryCompiled {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Compiled analysis binary: {} exports, fuel_level={}",
            self.export_count, self.fuel_level
        )
    }
}

/// A fresh instance was created for one request.
///
/// # Log Level
/// `debug!` - Per-request detail
pub struct InstanceCreated<'a> {
    pub entry_point: &'a str,
    pub source_bytes: usize,
}

impl Display for InstanceCreated<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Instantiated analysis binary for {}: source={} bytes",
            self.entry_point, self.source_bytes
        )
    }
}

/// An entry point returned and its result was decoded.
///
/// # Log Level
/// `debug!` - Per-request detail
///
/// # Example
/// ```
/// use asl_bridge::observability::messages::bridge::EntryPointCompleted;
///
/// let msg = EntryPointCompleted {
///     entry_point: "ASL_hover",
///     outcome: "none",
///     fuel_consumed: 12_000,
/// };
///
/// tracing::debug!("{}", msg);
/// ```
pub struct EntryPointCompleted<'a> {
    pub entry_point: &'a str,
    pub outcome: &'a str,
    pub fuel_consumed: u64,
}

impl Display for EntryPointCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "{} completed: outcome={}, fuel_consumed={}",
            self.entry_point, self.outcome, self.fuel_consumed
        )
    }
}

/// An entry point failed at the infrastructure level.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct EntryPointFailed<'a> {
    pub entry_point: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for EntryPointFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{} failed: {}", self.entry_point, self.error)
    }
}

/// An optional query returned the error variant and was treated as "no result".
///
/// # Log Level
/// `debug!` - Expected while the source does not type check
pub struct OptionalQueryErrorSuppressed<'a> {
    pub entry_point: &'a str,
    pub message: &'a str,
}

impl Display for OptionalQueryErrorSuppressed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "{} reported an error, returning no result: {}",
            self.entry_point, self.message
        )
    }
}

/// A reference list did not terminate before the decode cap.
///
/// # Log Level
/// `warn!` - The binary is misbehaving, results are truncated
pub struct ReferenceCapReached {
    pub cap: usize,
}

impl Display for ReferenceCapReached {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Reference list not terminated after {} entries, truncating",
            self.cap
        )
    }
}
