// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Current-document session state.
//
// The selection lives behind a `Mutex` and is shared by `Arc`, so concurrent
// callers see a consistent value rather than racing on a bare global.

use std::sync::Mutex;

/// The filename the desk currently has selected, if any.
///
/// Selecting is last-writer-wins and happens the moment a document is named,
/// whether or not the operation that named it goes on to succeed.
#[derive(Debug, Default)]
pub struct CurrentDocument {
    inner: Mutex<Option<String>>,
}

impl CurrentDocument {
    /// Create a session, optionally pre-selecting a configured default.
    pub fn new(default: Option<String>) -> Self {
        Self {
            inner: Mutex::new(default),
        }
    }

    /// Select a document by filename.
    pub fn select(&self, filename: impl Into<String>) {
        *self.inner.lock().expect("session lock poisoned") = Some(filename.into());
    }

    /// The currently selected filename, if one has been set.
    pub fn current(&self) -> Option<String> {
        self.inner.lock().expect("session lock poisoned").clone()
    }

    /// Clear the selection.
    pub fn clear(&self) {
        *self.inner.lock().expect("session lock poisoned") = None;
    }
}
