// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Task dispatcher — turns a parsed task request into exactly one engine
// operation plus a metadata read of the selected document.
//
// The session selection is updated as soon as the request names a document,
// before any validation, so a failed task still leaves that document current.

use std::path::PathBuf;
use std::sync::Arc;

use foliodesk_core::error::Result;
use foliodesk_core::{Bucket, Metadata, TaskOutcome, TaskRequest};
use foliodesk_engine::TransformationEngine;
use foliodesk_store::DocumentStore;
use tracing::{info, instrument};

use super::session::CurrentDocument;

/// Routes task requests to the transformation engine.
pub struct TaskDispatcher {
    store: DocumentStore,
    engine: TransformationEngine,
    session: Arc<CurrentDocument>,
    /// Bucket that merge input filenames resolve against.
    merge_bucket: Bucket,
}

impl TaskDispatcher {
    pub fn new(
        store: DocumentStore,
        engine: TransformationEngine,
        session: Arc<CurrentDocument>,
        merge_bucket: Bucket,
    ) -> Self {
        Self {
            store,
            engine,
            session,
            merge_bucket,
        }
    }

    /// Run one task to completion.
    ///
    /// Returns the operation's artifacts together with the metadata of the
    /// document the request selected. Compose has no input document, so its
    /// metadata is the not-found sentinel.
    #[instrument(skip(self, request), fields(kind = request.kind().wire_name()))]
    pub fn dispatch(&self, request: TaskRequest) -> Result<TaskOutcome> {
        if let Some(filename) = request.target_filename() {
            self.session.select(filename);
        }

        let kind = request.kind();
        let artifacts = self.run(&request)?;
        let metadata = match request.target_filename() {
            Some(filename) => {
                let path = self.target_path(&request, filename)?;
                self.engine.inspect(path)?
            }
            None => Metadata::not_found(),
        };

        info!(
            kind = kind.wire_name(),
            artifacts = artifacts.len(),
            "task complete"
        );
        Ok(TaskOutcome::new(kind, metadata, artifacts))
    }

    /// Execute the engine operation for the request, returning its artifacts.
    fn run(&self, request: &TaskRequest) -> Result<Vec<PathBuf>> {
        match request {
            TaskRequest::ExtractText { filename, set_name } => {
                let text = self.engine.extract_text(self.store.resolve(filename)?)?;
                let artifact = self
                    .store
                    .write_output(&format!("{set_name}.txt"), text.as_bytes())?;
                Ok(vec![artifact])
            }
            TaskRequest::ExtractImages { filename } => {
                self.engine.extract_images(self.store.resolve(filename)?)
            }
            TaskRequest::Lock {
                filename,
                set_name,
                password,
            } => {
                let artifact =
                    self.engine
                        .lock(self.store.resolve(filename)?, password, set_name)?;
                Ok(vec![artifact])
            }
            TaskRequest::Unlock {
                filename,
                password,
                output_name,
            } => {
                let artifact = self.engine.unlock(
                    self.store.resolve(filename)?,
                    password,
                    output_name.as_deref(),
                )?;
                Ok(vec![artifact])
            }
            TaskRequest::Merge {
                filenames,
                set_name,
            } => {
                let paths: Vec<PathBuf> = filenames
                    .iter()
                    .map(|name| self.store.bucket_dir(self.merge_bucket).join(name))
                    .collect();
                let artifact = self.engine.merge(&paths, set_name)?;
                Ok(vec![artifact])
            }
            TaskRequest::Compose {
                heading,
                message,
                set_name,
            } => {
                let artifact = self.engine.compose(heading, message, set_name)?;
                Ok(vec![artifact])
            }
        }
    }

    /// Storage path of the document a request selected.
    ///
    /// Merge inputs live in the merge bucket regardless of how their names
    /// would classify.
    fn target_path(&self, request: &TaskRequest, filename: &str) -> Result<PathBuf> {
        match request {
            TaskRequest::Merge { .. } => {
                Ok(self.store.bucket_dir(self.merge_bucket).join(filename))
            }
            _ => self.store.resolve(filename),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use foliodesk_core::error::FoliodeskError;
    use foliodesk_core::TaskKind;
    use foliodesk_engine::PdfFile;
    use foliodesk_engine::testutil::sample_pdf;
    use tempfile::tempdir;

    fn setup() -> (tempfile::TempDir, TaskDispatcher, Arc<CurrentDocument>) {
        let dir = tempdir().unwrap();
        let store = DocumentStore::open(dir.path()).unwrap();
        let engine = TransformationEngine::new(store.output_dir());
        let session = Arc::new(CurrentDocument::default());
        let dispatcher =
            TaskDispatcher::new(store, engine, Arc::clone(&session), Bucket::Text);
        (dir, dispatcher, session)
    }

    #[test]
    fn extract_text_writes_named_artifact_and_selects_document() {
        let (_dir, dispatcher, session) = setup();
        dispatcher
            .store
            .store_upload("report.pdf", &sample_pdf(&["Quarterly numbers"]))
            .unwrap();

        let outcome = dispatcher
            .dispatch(TaskRequest::from_form("gettext", "report.pdf", "out1", "").unwrap())
            .unwrap();

        assert_eq!(outcome.kind, TaskKind::ExtractText);
        assert_eq!(outcome.artifacts.len(), 1);
        assert_eq!(outcome.artifacts[0].file_name().unwrap(), "out1.txt");
        let text = std::fs::read_to_string(&outcome.artifacts[0]).unwrap();
        assert!(text.contains("Quarterly numbers"));
        assert_eq!(outcome.metadata, Metadata::none_found());
        assert_eq!(session.current().as_deref(), Some("report.pdf"));
    }

    #[test]
    fn merge_resolves_inputs_against_the_merge_bucket() {
        let (_dir, dispatcher, session) = setup();
        dispatcher
            .store
            .store_upload("a.pdf", &sample_pdf(&["A1", "A2"]))
            .unwrap();
        dispatcher
            .store
            .store_upload("b.pdf", &sample_pdf(&["B1", "B2", "B3"]))
            .unwrap();

        let outcome = dispatcher
            .dispatch(TaskRequest::from_form("mergepdf", "", "combined", "a.pdf, b.pdf").unwrap())
            .unwrap();

        assert_eq!(outcome.artifacts.len(), 1);
        assert_eq!(outcome.artifacts[0].file_name().unwrap(), "combined.pdf");
        assert_eq!(PdfFile::open(&outcome.artifacts[0]).unwrap().page_count(), 5);
        // Merge selects its first input.
        assert_eq!(session.current().as_deref(), Some("a.pdf"));
    }

    #[test]
    fn merge_with_missing_input_fails_whole() {
        let (_dir, dispatcher, _session) = setup();
        dispatcher
            .store
            .store_upload("a.pdf", &sample_pdf(&["A1"]))
            .unwrap();

        let err = dispatcher
            .dispatch(TaskRequest::from_form("mergepdf", "", "combined", "a.pdf, ghost.pdf").unwrap())
            .unwrap_err();
        assert!(matches!(err, FoliodeskError::MissingInput(_)));
        assert!(!dispatcher.store.output_path("combined.pdf").exists());
    }

    #[test]
    fn failed_task_still_updates_the_selection() {
        let (_dir, dispatcher, session) = setup();

        let result = dispatcher
            .dispatch(TaskRequest::from_form("gettext", "missing.pdf", "out", "").unwrap());
        assert!(result.is_err());
        assert_eq!(session.current().as_deref(), Some("missing.pdf"));
    }

    #[test]
    fn lock_then_unlock_through_the_dispatcher() {
        let (_dir, dispatcher, _session) = setup();
        dispatcher
            .store
            .store_upload("report.pdf", &sample_pdf(&["Secret page"]))
            .unwrap();

        dispatcher
            .dispatch(TaskRequest::from_form("lock", "report.pdf", "sealed", "hunter2").unwrap())
            .unwrap();
        let locked = dispatcher.store.output_path("sealed.pdf");
        assert!(PdfFile::open(&locked).unwrap().is_encrypted());

        // The locked artifact is not in a bucket, so unlock it directly.
        let unlocked = dispatcher
            .engine
            .unlock(&locked, "hunter2", Some("open"))
            .unwrap();
        assert!(PdfFile::open(&unlocked)
            .unwrap()
            .extract_text()
            .contains("Secret page"));
    }

    #[test]
    fn compose_reports_the_not_found_sentinel() {
        let (_dir, dispatcher, session) = setup();

        let outcome = dispatcher
            .dispatch(TaskRequest::Compose {
                heading: "Delivery Note".into(),
                message: "Three boxes".into(),
                set_name: "note".into(),
            })
            .unwrap();

        assert_eq!(outcome.kind, TaskKind::Compose);
        assert_eq!(outcome.metadata, Metadata::not_found());
        assert_eq!(outcome.artifacts[0].file_name().unwrap(), "note.pdf");
        // Compose names no input document.
        assert_eq!(session.current(), None);
    }
}
