// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// foliodesk-store — Filesystem-backed document storage for Foliodesk.
//
// Uploads live under `uploads/<bucket>/` (one flat directory per bucket);
// generated artifacts live in a sibling `output/` directory so artifact writes
// can never collide with input buckets.

pub mod integrity;
pub mod store;

pub use integrity::hash_bytes;
pub use store::DocumentStore;
