// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Foliodesk.

use thiserror::Error;

/// Top-level error type for all Foliodesk operations.
#[derive(Debug, Error)]
pub enum FoliodeskError {
    // -- Document errors --
    #[error("unreadable PDF {path}: {detail}")]
    UnreadablePdf { path: String, detail: String },

    #[error("wrong password for {path}")]
    WrongPassword { path: String },

    #[error("encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("missing input file: {0}")]
    MissingInput(String),

    #[error("image extraction failed: {0}")]
    ImageError(String),

    // -- Classification / dispatch --
    #[error("no bucket configured for extension '{0}'")]
    UnmappedExtension(String),

    #[error("unknown task kind: '{0}'")]
    UnknownTask(String),

    #[error("unknown bucket: '{0}'")]
    UnknownBucket(String),

    // -- Storage / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, FoliodeskError>;
