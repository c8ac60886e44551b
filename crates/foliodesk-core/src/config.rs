// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Application configuration.

use serde::{Deserialize, Serialize};

/// Persistent application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Filename (within the text/document bucket) shown as the current
    /// document until the user selects one.
    pub default_document: Option<String>,
    /// Bucket name that merge inputs resolve against.
    pub merge_bucket: crate::Bucket,
    /// Record SHA-256 fingerprints of uploads in the log.
    pub fingerprint_uploads: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_document: None,
            merge_bucket: crate::Bucket::Text,
            fingerprint_uploads: true,
        }
    }
}
