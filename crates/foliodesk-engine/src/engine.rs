// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Transformation engine — the document operations, tied to the artifact
// output area. Each method is a pure function of its inputs plus filesystem
// side effects; failures surface immediately and nothing is retried.

use std::path::{Path, PathBuf};

use foliodesk_core::Metadata;
use foliodesk_core::error::{FoliodeskError, Result};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::pdf::images::page_images;
use crate::pdf::reader::PdfFile;
use crate::pdf::writer::PdfComposer;
use crate::pdf::{crypt, merge};

/// The only extension `inspect` recognises as a document.
const DOCUMENT_EXTENSION: &str = ".pdf";

/// Runs document transformations, writing artifacts into a dedicated output
/// directory.
#[derive(Debug, Clone)]
pub struct TransformationEngine {
    /// Directory generated artifacts are written to.
    output_dir: PathBuf,
}

impl TransformationEngine {
    /// Create an engine writing artifacts under `output_dir`.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// The engine's artifact directory.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Write artifact bytes under `name`, creating the output directory if
    /// absent (idempotent).
    fn write_artifact(&self, name: &str, bytes: &[u8]) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.output_dir)?;
        let path = self.output_dir.join(name);
        std::fs::write(&path, bytes)?;
        Ok(path)
    }

    // -- Text -----------------------------------------------------------------

    /// Extract the concatenated page text of the PDF at `path`.
    #[instrument(skip(self), fields(path = %path.as_ref().display()))]
    pub fn extract_text(&self, path: impl AsRef<Path>) -> Result<String> {
        Ok(PdfFile::open(path)?.extract_text())
    }

    // -- Images ---------------------------------------------------------------

    /// Extract every embedded image of the PDF at `path` into the output
    /// area, returning the written paths in extraction order.
    ///
    /// Files are named `{index}-{name}.{ext}` with `index` incrementing
    /// across the whole document, so images on different pages can never
    /// overwrite each other.
    #[instrument(skip(self), fields(path = %path.as_ref().display()))]
    pub fn extract_images(&self, path: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
        let pdf = PdfFile::open(path)?;

        let mut written = Vec::new();
        let mut index = 0usize;
        for page_id in pdf.page_ids() {
            for image in page_images(pdf.document(), page_id)? {
                let name = format!("{index}-{}.{}", image.name, image.extension);
                written.push(self.write_artifact(&name, &image.bytes)?);
                index += 1;
            }
        }

        info!(images = written.len(), "images extracted");
        Ok(written)
    }

    // -- Lock / unlock --------------------------------------------------------

    /// Password-protect the PDF at `path`, writing `{output_name}.pdf` to the
    /// output area.
    #[instrument(skip(self, password), fields(path = %path.as_ref().display(), output_name))]
    pub fn lock(
        &self,
        path: impl AsRef<Path>,
        password: &str,
        output_name: &str,
    ) -> Result<PathBuf> {
        let bytes = crypt::lock(path, password)?;
        self.write_artifact(&format!("{output_name}.pdf"), &bytes)
    }

    /// Decrypt the PDF at `path`, writing the result to the output area.
    ///
    /// The artifact is named `{output_name}.pdf` when a name is supplied and
    /// `decrypted-{uuid}.pdf` otherwise, so concurrent unlocks never collide.
    /// Nothing is written when decryption fails.
    #[instrument(skip(self, password), fields(path = %path.as_ref().display()))]
    pub fn unlock(
        &self,
        path: impl AsRef<Path>,
        password: &str,
        output_name: Option<&str>,
    ) -> Result<PathBuf> {
        let bytes = crypt::unlock(path, password)?;
        let name = match output_name {
            Some(name) => format!("{name}.pdf"),
            None => format!("decrypted-{}.pdf", Uuid::new_v4()),
        };
        self.write_artifact(&name, &bytes)
    }

    // -- Merge ----------------------------------------------------------------

    /// Merge the PDFs at `paths`, in order, into `{output_name}.pdf` in the
    /// output area.
    ///
    /// Every input must exist before any work starts; a missing input fails
    /// the whole operation rather than producing a truncated merge.
    #[instrument(skip(self, paths), fields(inputs = paths.len(), output_name))]
    pub fn merge(&self, paths: &[PathBuf], output_name: &str) -> Result<PathBuf> {
        for path in paths {
            if !path.is_file() {
                return Err(FoliodeskError::MissingInput(path.display().to_string()));
            }
        }

        let mut sources = Vec::with_capacity(paths.len());
        for path in paths {
            sources.push(PdfFile::open(path)?);
        }

        let bytes = merge::merge_documents(&sources)?;
        self.write_artifact(&format!("{output_name}.pdf"), &bytes)
    }

    // -- Inspection -----------------------------------------------------------

    /// Read document metadata for the file at `path`.
    ///
    /// Filenames not ending in `.pdf` (case-insensitive) report
    /// `{Status: "Not Found"}` without the file being opened.
    pub fn inspect(&self, path: impl AsRef<Path>) -> Result<Metadata> {
        let path_ref = path.as_ref();
        let is_document = path_ref
            .to_string_lossy()
            .to_ascii_lowercase()
            .ends_with(DOCUMENT_EXTENSION);
        if !is_document {
            return Ok(Metadata::not_found());
        }

        Ok(PdfFile::open(path_ref)?.metadata())
    }

    // -- Composition ----------------------------------------------------------

    /// Compose a new single-page PDF from a heading and message, writing
    /// `{output_name}.pdf` to the output area.
    #[instrument(skip(self, message), fields(heading, output_name))]
    pub fn compose(&self, heading: &str, message: &str, output_name: &str) -> Result<PathBuf> {
        let bytes = PdfComposer::new().compose(heading, message)?;
        self.write_artifact(&format!("{output_name}.pdf"), &bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{attach_image, sample_pdf, sample_pdf_with_info};
    use tempfile::tempdir;

    fn setup() -> (tempfile::TempDir, TransformationEngine) {
        let dir = tempdir().unwrap();
        let engine = TransformationEngine::new(dir.path().join("output"));
        (dir, engine)
    }

    #[test]
    fn extract_text_reads_pages_in_order() {
        let (dir, engine) = setup();
        let path = dir.path().join("doc.pdf");
        std::fs::write(&path, sample_pdf(&["First", "Second"])).unwrap();

        let text = engine.extract_text(&path).unwrap();
        assert!(text.find("First").unwrap() < text.find("Second").unwrap());
    }

    #[test]
    fn extract_images_uses_a_document_wide_index() {
        let (dir, engine) = setup();
        // One image per page, same resource name on both pages: the old
        // per-page counter would have written both to the same file.
        let bytes = sample_pdf(&["p1", "p2"]);
        let bytes = attach_image(&bytes, 1, "Im1", "DCTDecode", b"\xff\xd8first");
        let bytes = attach_image(&bytes, 2, "Im1", "DCTDecode", b"\xff\xd8second");
        let path = dir.path().join("doc.pdf");
        std::fs::write(&path, bytes).unwrap();

        let written = engine.extract_images(&path).unwrap();
        assert_eq!(written.len(), 2);
        assert_eq!(written[0].file_name().unwrap(), "0-Im1.jpg");
        assert_eq!(written[1].file_name().unwrap(), "1-Im1.jpg");
        assert_eq!(std::fs::read(&written[0]).unwrap(), b"\xff\xd8first");
        assert_eq!(std::fs::read(&written[1]).unwrap(), b"\xff\xd8second");
    }

    #[test]
    fn extract_images_of_plain_document_writes_nothing() {
        let (dir, engine) = setup();
        let path = dir.path().join("doc.pdf");
        std::fs::write(&path, sample_pdf(&["no images here"])).unwrap();

        assert!(engine.extract_images(&path).unwrap().is_empty());
        assert!(!engine.output_dir().exists() || engine.output_dir().read_dir().unwrap().next().is_none());
    }

    #[test]
    fn merge_counts_pages_across_inputs() {
        let (dir, engine) = setup();
        let a = dir.path().join("a.pdf");
        let b = dir.path().join("b.pdf");
        std::fs::write(&a, sample_pdf(&["A1", "A2"])).unwrap();
        std::fs::write(&b, sample_pdf(&["B1", "B2", "B3"])).unwrap();

        let artifact = engine.merge(&[a, b], "combined").unwrap();
        assert_eq!(artifact.file_name().unwrap(), "combined.pdf");
        assert_eq!(PdfFile::open(&artifact).unwrap().page_count(), 5);
    }

    #[test]
    fn merge_with_missing_input_produces_no_artifact() {
        let (dir, engine) = setup();
        let a = dir.path().join("a.pdf");
        std::fs::write(&a, sample_pdf(&["A1"])).unwrap();
        let ghost = dir.path().join("ghost.pdf");

        let err = engine.merge(&[a, ghost], "combined").unwrap_err();
        assert!(matches!(err, FoliodeskError::MissingInput(_)));
        assert!(!engine.output_dir().join("combined.pdf").exists());
    }

    #[test]
    fn lock_then_unlock_round_trips() {
        let (dir, engine) = setup();
        let path = dir.path().join("doc.pdf");
        std::fs::write(&path, sample_pdf(&["Confidential", "Appendix"])).unwrap();

        let locked = engine.lock(&path, "hunter2", "sealed").unwrap();
        assert_eq!(locked.file_name().unwrap(), "sealed.pdf");
        assert!(PdfFile::open(&locked).unwrap().is_encrypted());

        let unlocked = engine.unlock(&locked, "hunter2", Some("open")).unwrap();
        let reopened = PdfFile::open(&unlocked).unwrap();
        assert_eq!(reopened.page_count(), 2);
        assert!(reopened.extract_text().contains("Confidential"));
    }

    #[test]
    fn unlock_failure_leaves_output_area_untouched() {
        let (dir, engine) = setup();
        let path = dir.path().join("doc.pdf");
        std::fs::write(&path, sample_pdf(&["page"])).unwrap();

        let locked = engine.lock(&path, "right", "sealed").unwrap();
        let before = engine.output_dir().read_dir().unwrap().count();

        let err = engine.unlock(&locked, "wrong", None).unwrap_err();
        assert!(matches!(err, FoliodeskError::WrongPassword { .. }));
        assert_eq!(engine.output_dir().read_dir().unwrap().count(), before);
    }

    #[test]
    fn unlock_without_name_generates_a_unique_one() {
        let (dir, engine) = setup();
        let path = dir.path().join("doc.pdf");
        std::fs::write(&path, sample_pdf(&["page"])).unwrap();
        let locked = engine.lock(&path, "pw", "sealed").unwrap();

        let first = engine.unlock(&locked, "pw", None).unwrap();
        let second = engine.unlock(&locked, "pw", None).unwrap();
        assert_ne!(first, second);
        let name = first.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("decrypted-") && name.ends_with(".pdf"));
    }

    #[test]
    fn inspect_rejects_non_document_names_without_opening() {
        let (dir, engine) = setup();
        // Deliberately never created on disk.
        let path = dir.path().join("notes.txt");
        assert_eq!(engine.inspect(&path).unwrap(), Metadata::not_found());
    }

    #[test]
    fn inspect_reads_info_or_reports_sentinel() {
        let (dir, engine) = setup();
        let titled = dir.path().join("titled.pdf");
        std::fs::write(&titled, sample_pdf_with_info(&["p"], "Minutes", "Desk")).unwrap();
        let bare = dir.path().join("bare.pdf");
        std::fs::write(&bare, sample_pdf(&["p"])).unwrap();

        let metadata = engine.inspect(&titled).unwrap();
        assert_eq!(metadata.get("Title"), Some(&Some("Minutes".to_string())));
        assert_eq!(engine.inspect(&bare).unwrap(), Metadata::none_found());
    }

    #[test]
    fn compose_writes_a_single_page_pdf() {
        let (_dir, engine) = setup();
        let artifact = engine
            .compose("Heading", "Body text", "note")
            .unwrap();
        assert_eq!(artifact.file_name().unwrap(), "note.pdf");
        assert_eq!(PdfFile::open(&artifact).unwrap().page_count(), 1);
    }
}
