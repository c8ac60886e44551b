// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document store — bucket-partitioned upload area plus a separate output area
// for generated artifacts.

use std::path::{Path, PathBuf};

use foliodesk_core::error::{FoliodeskError, Result};
use foliodesk_core::{Bucket, Document};
use tracing::{debug, info, instrument};

use crate::integrity::hash_bytes;

/// Directory holding the per-bucket upload directories.
const UPLOADS_DIR: &str = "uploads";

/// Directory holding generated artifacts, sibling of [`UPLOADS_DIR`].
const OUTPUT_DIR: &str = "output";

/// Filesystem-backed storage area organised by bucket.
///
/// All directories are created lazily with `create_dir_all`, which is
/// idempotent and safe to call repeatedly. The output area is a sibling of
/// the upload tree, so artifact writes never collide with input buckets.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    /// Root directory containing `uploads/` and `output/`.
    root: PathBuf,
    /// Buckets this store has directories for.
    buckets: Vec<Bucket>,
    /// Whether saved uploads are SHA-256 fingerprinted.
    fingerprint: bool,
}

impl DocumentStore {
    /// Open a store rooted at `root` with all five buckets configured.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        Self::with_buckets(root, Bucket::ALL.to_vec())
    }

    /// Open a store with an explicit bucket set.
    ///
    /// Files classifying into a bucket outside this set fail resolution with
    /// [`FoliodeskError::UnmappedExtension`] instead of falling through.
    pub fn with_buckets(root: impl Into<PathBuf>, buckets: Vec<Bucket>) -> Result<Self> {
        let root = root.into();
        let store = Self {
            root,
            buckets,
            fingerprint: true,
        };

        for bucket in &store.buckets {
            std::fs::create_dir_all(store.bucket_dir(*bucket))?;
        }
        std::fs::create_dir_all(store.output_dir())?;

        info!(root = %store.root.display(), "document store opened");
        Ok(store)
    }

    /// Enable or disable SHA-256 fingerprinting of saved uploads.
    pub fn with_fingerprinting(mut self, enabled: bool) -> Self {
        self.fingerprint = enabled;
        self
    }

    /// Whether saved uploads are fingerprinted.
    pub fn fingerprinting(&self) -> bool {
        self.fingerprint
    }

    // -- Paths ----------------------------------------------------------------

    /// Root directory of the store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory of a bucket (whether or not it is configured).
    pub fn bucket_dir(&self, bucket: Bucket) -> PathBuf {
        self.root.join(UPLOADS_DIR).join(bucket.dir_name())
    }

    /// Directory of the artifact output area.
    pub fn output_dir(&self) -> PathBuf {
        self.root.join(OUTPUT_DIR)
    }

    /// Path an artifact with the given name would have in the output area.
    pub fn output_path(&self, name: &str) -> PathBuf {
        self.output_dir().join(name)
    }

    fn require_bucket(&self, filename: &str) -> Result<Bucket> {
        let bucket = Bucket::classify(filename);
        if self.buckets.contains(&bucket) {
            Ok(bucket)
        } else {
            let ext = filename.rsplit('.').next().unwrap_or(filename);
            Err(FoliodeskError::UnmappedExtension(ext.to_ascii_lowercase()))
        }
    }

    // -- Resolution -----------------------------------------------------------

    /// Resolve a filename to its storage path via the classifier.
    pub fn resolve(&self, filename: &str) -> Result<PathBuf> {
        let bucket = self.require_bucket(filename)?;
        Ok(self.bucket_dir(bucket).join(filename))
    }

    /// Resolve a filename to a full [`Document`] value.
    pub fn resolve_document(&self, filename: &str) -> Result<Document> {
        let bucket = self.require_bucket(filename)?;
        Ok(Document {
            filename: filename.to_string(),
            bucket,
            path: self.bucket_dir(bucket).join(filename),
        })
    }

    /// Resolve a filename the way the serving collaborator does: the output
    /// area wins over input buckets when both hold the name.
    pub fn serve_path(&self, filename: &str) -> Result<PathBuf> {
        let artifact = self.output_path(filename);
        if artifact.is_file() {
            return Ok(artifact);
        }
        self.resolve(filename)
    }

    // -- Persistence ----------------------------------------------------------

    /// Persist uploaded content into an explicit bucket, creating the bucket
    /// directory if absent.
    #[instrument(skip(self, bytes), fields(bucket = %bucket, filename, bytes_len = bytes.len()))]
    pub fn save(&self, bucket: Bucket, filename: &str, bytes: &[u8]) -> Result<Document> {
        let dir = self.bucket_dir(bucket);
        std::fs::create_dir_all(&dir)?;

        let path = dir.join(filename);
        std::fs::write(&path, bytes)?;

        if self.fingerprint {
            info!(
                path = %path.display(),
                sha256 = %hash_bytes(bytes),
                "upload stored"
            );
        } else {
            info!(path = %path.display(), "upload stored");
        }

        Ok(Document {
            filename: filename.to_string(),
            bucket,
            path,
        })
    }

    /// Classify and persist uploaded content in one step.
    pub fn store_upload(&self, filename: &str, bytes: &[u8]) -> Result<Document> {
        let bucket = self.require_bucket(filename)?;
        self.save(bucket, filename, bytes)
    }

    /// Persist a generated artifact into the output area.
    #[instrument(skip(self, bytes), fields(name, bytes_len = bytes.len()))]
    pub fn write_output(&self, name: &str, bytes: &[u8]) -> Result<PathBuf> {
        let dir = self.output_dir();
        std::fs::create_dir_all(&dir)?;

        let path = dir.join(name);
        std::fs::write(&path, bytes)?;
        debug!(path = %path.display(), "artifact written");
        Ok(path)
    }

    // -- Listings -------------------------------------------------------------

    /// Sorted filenames currently stored in a bucket.
    pub fn list(&self, bucket: Bucket) -> Result<Vec<String>> {
        list_dir(&self.bucket_dir(bucket))
    }

    /// Sorted filenames currently present in the output area.
    pub fn list_output(&self) -> Result<Vec<String>> {
        list_dir(&self.output_dir())
    }
}

/// List the plain files of a directory, sorted by name. A directory that does
/// not exist yet lists as empty.
fn list_dir(dir: &Path) -> Result<Vec<String>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn save_and_list_round_trip() {
        let dir = tempdir().unwrap();
        let store = DocumentStore::open(dir.path()).unwrap();

        let doc = store.store_upload("report.pdf", b"%PDF-1.5 fake").unwrap();
        assert_eq!(doc.bucket, Bucket::Text);
        assert!(doc.path.is_file());

        store.store_upload("notes.txt", b"hello").unwrap();
        store.store_upload("photo.png", b"png").unwrap();

        assert_eq!(store.list(Bucket::Text).unwrap(), vec!["notes.txt", "report.pdf"]);
        assert_eq!(store.list(Bucket::Drawing).unwrap(), vec!["photo.png"]);
        assert!(store.list(Bucket::Code).unwrap().is_empty());
    }

    #[test]
    fn unknown_extension_routes_to_other() {
        let dir = tempdir().unwrap();
        let store = DocumentStore::open(dir.path()).unwrap();

        let doc = store.store_upload("bundle.zip", b"zip").unwrap();
        assert_eq!(doc.bucket, Bucket::Other);
        assert_eq!(store.list(Bucket::Other).unwrap(), vec!["bundle.zip"]);
    }

    #[test]
    fn unconfigured_bucket_is_a_typed_error() {
        let dir = tempdir().unwrap();
        // The original deployment only had four bucket directories; a store
        // configured that way must reject rather than crash.
        let store = DocumentStore::with_buckets(
            dir.path(),
            vec![Bucket::Code, Bucket::Drawing, Bucket::Text, Bucket::Excel],
        )
        .unwrap();

        let err = store.resolve("bundle.zip").unwrap_err();
        assert!(matches!(err, FoliodeskError::UnmappedExtension(ext) if ext == "zip"));
    }

    #[test]
    fn output_area_is_separate_from_buckets() {
        let dir = tempdir().unwrap();
        let store = DocumentStore::open(dir.path()).unwrap();

        let path = store.write_output("combined.pdf", b"artifact").unwrap();
        assert!(path.starts_with(store.output_dir()));
        for bucket in Bucket::ALL {
            assert!(!path.starts_with(store.bucket_dir(bucket)));
            assert!(store.list(bucket).unwrap().is_empty());
        }
        assert_eq!(store.list_output().unwrap(), vec!["combined.pdf"]);
    }

    #[test]
    fn serve_prefers_output_area() {
        let dir = tempdir().unwrap();
        let store = DocumentStore::open(dir.path()).unwrap();

        store.store_upload("report.pdf", b"upload").unwrap();
        assert_eq!(
            store.serve_path("report.pdf").unwrap(),
            store.resolve("report.pdf").unwrap()
        );

        store.write_output("report.pdf", b"artifact").unwrap();
        assert_eq!(
            store.serve_path("report.pdf").unwrap(),
            store.output_path("report.pdf")
        );
    }

    #[test]
    fn fingerprinting_is_on_by_default_and_can_be_disabled() {
        let dir = tempdir().unwrap();
        let store = DocumentStore::open(dir.path()).unwrap();
        assert!(store.fingerprinting());

        let store = store.with_fingerprinting(false);
        assert!(!store.fingerprinting());
        // Saving still works with fingerprinting off.
        let doc = store.store_upload("notes.txt", b"hello").unwrap();
        assert!(doc.path.is_file());
    }

    #[test]
    fn directory_creation_is_idempotent() {
        let dir = tempdir().unwrap();
        let store = DocumentStore::open(dir.path()).unwrap();
        // Re-opening over an existing layout must not fail.
        let again = DocumentStore::open(dir.path()).unwrap();
        assert_eq!(store.output_dir(), again.output_dir());
    }
}
