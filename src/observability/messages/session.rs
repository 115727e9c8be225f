// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for editor session events.

use std::fmt::{Display, Formatter};

/// A validation request was issued.
///
/// # Log Level
/// `debug!` - Per-edit detail
pub struct ValidationStarted {
    pub sequence: u64,
    pub source_bytes: usize,
}

impl Display for ValidationStarted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Validation #{} started: source={} bytes",
            self.sequence, self.source_bytes
        )
    }
}

/// A validation response arrived after a newer request was issued.
///
/// # Log Level
/// `debug!` - Expected during edit bursts
///
/// # Example
/// ```
/// use asl_bridge::observability::messages::session::ValidationSuperseded;
///
/// let msg = ValidationSuperseded { sequence: 3, latest: 5 };
/// tracing::debug!("{}", msg);
/// ```
pub struct ValidationSuperseded {
    pub sequence: u64,
    pub latest: u64,
}

impl Display for ValidationSuperseded {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Dropping validation #{}: superseded by #{}",
            self.sequence, self.latest
        )
    }
}

/// A validation result was applied to the editor surface.
///
/// # Log Level
/// `info!` - Important operational event
pub struct ValidationApplied<'a> {
    pub sequence: u64,
    pub status: &'a str,
    pub marker_count: usize,
}

impl Display for ValidationApplied<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Validation #{} applied: status='{}', markers={}",
            self.sequence, self.status, self.marker_count
        )
    }
}

/// The bridge failed while validating; reported as an internal failure.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct InternalFailure<'a> {
    pub sequence: u64,
    pub error: &'a dyn std::error::Error,
}

impl Display for InternalFailure<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Validation #{} hit an internal failure: {}",
            self.sequence, self.error
        )
    }
}

/// The compiled module could not be rendered into the output buffer.
///
/// # Log Level
/// `warn!` - Output buffer keeps its previous content
pub struct OutlineFailed<'a> {
    pub error: &'a dyn std::error::Error,
}

impl Display for OutlineFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Failed to render compiled module outline: {}", self.error)
    }
}
