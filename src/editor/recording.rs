// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! In-memory editor surface.
//!
//! Records everything the session pushes to it. Used by the CLI to render a
//! report and by tests to assert on what an editor would have displayed.

use crate::editor::{CompileStatus, EditorSurface, Marker};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct Recorded {
    markers: HashMap<String, Vec<Marker>>,
    status: Option<CompileStatus>,
    status_history: Vec<CompileStatus>,
    output: String,
}

#[derive(Debug, Default)]
pub struct RecordingSurface {
    state: Mutex<Recorded>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Recorded> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn markers(&self, owner: &str) -> Vec<Marker> {
        self.lock().markers.get(owner).cloned().unwrap_or_default()
    }

    pub fn status(&self) -> Option<CompileStatus> {
        self.lock().status.clone()
    }

    /// Every status set so far, oldest first.
    pub fn status_history(&self) -> Vec<CompileStatus> {
        self.lock().status_history.clone()
    }

    pub fn output(&self) -> String {
        self.lock().output.clone()
    }
}

impl EditorSurface for RecordingSurface {
    fn set_markers(&self, owner: &str, markers: Vec<Marker>) {
        self.lock().markers.insert(owner.to_string(), markers);
    }

    fn set_status(&self, status: CompileStatus) {
        let mut state = self.lock();
        state.status_history.push(status.clone());
        state.status = Some(status);
    }

    fn set_output(&self, text: &str) {
        self.lock().output = text.to_string();
    }
}
