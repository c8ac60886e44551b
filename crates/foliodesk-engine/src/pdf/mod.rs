// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF module — reading, text/image extraction, lock/unlock, merging, and
// composing PDFs.

pub mod crypt;
pub mod images;
pub mod merge;
pub mod reader;
pub mod writer;

pub use reader::PdfFile;
pub use writer::PdfComposer;
