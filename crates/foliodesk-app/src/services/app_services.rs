// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Central service layer — wires the store, engine, and session together and
// exposes the operations the CLI calls.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use foliodesk_core::error::{FoliodeskError, Result};
use foliodesk_core::{AppConfig, Bucket, Document, Metadata, TaskOutcome, TaskRequest};
use foliodesk_engine::TransformationEngine;
use foliodesk_store::DocumentStore;
use tracing::info;

use super::data_dir;
use super::dispatcher::TaskDispatcher;
use super::session::CurrentDocument;

/// Shared application services.
///
/// All fields are cheaply cloneable (Arc-wrapped or Clone) so the struct can
/// be passed around freely.
#[derive(Clone)]
pub struct AppServices {
    store: DocumentStore,
    engine: TransformationEngine,
    session: Arc<CurrentDocument>,
    config: Arc<Mutex<AppConfig>>,
    data_dir: PathBuf,
}

impl AppServices {
    /// Initialise all services rooted at the platform data directory.
    pub fn init() -> Result<Self> {
        Self::init_at(data_dir::data_dir())
    }

    /// Initialise all services rooted at an explicit directory.
    pub fn init_at(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        info!(path = %dir.display(), "initialising app services");

        // Load persisted config or use defaults
        let config = load_config(&dir).unwrap_or_default();

        let store =
            DocumentStore::open(&dir)?.with_fingerprinting(config.fingerprint_uploads);
        let engine = TransformationEngine::new(store.output_dir());
        let session = Arc::new(CurrentDocument::new(config.default_document.clone()));

        info!("app services initialised");

        Ok(Self {
            store,
            engine,
            session,
            config: Arc::new(Mutex::new(config)),
            data_dir: dir,
        })
    }

    // -- Uploads -------------------------------------------------------------

    /// Store a file from the local filesystem, classify it into its bucket,
    /// and make it the current document.
    pub fn upload(&self, source: impl AsRef<Path>) -> Result<Document> {
        let source = source.as_ref();
        let filename = source
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| FoliodeskError::MissingInput(source.display().to_string()))?;

        let bytes = std::fs::read(source)?;
        // The store fingerprints on save when configured to.
        let document = self.store.store_upload(&filename, &bytes)?;
        self.session.select(&document.filename);
        Ok(document)
    }

    // -- Listings ------------------------------------------------------------

    /// Sorted filenames stored in a bucket.
    pub fn list(&self, bucket: Bucket) -> Result<Vec<String>> {
        self.store.list(bucket)
    }

    /// Sorted artifact names in the output area.
    pub fn list_output(&self) -> Result<Vec<String>> {
        self.store.list_output()
    }

    // -- Serving -------------------------------------------------------------

    /// Path to serve a filename from, selecting it as the current document.
    ///
    /// Artifacts in the output area shadow same-named uploads.
    pub fn serve(&self, filename: &str) -> Result<PathBuf> {
        self.session.select(filename);
        self.store.serve_path(filename)
    }

    /// Metadata of the current document, or the not-found sentinel when
    /// nothing is selected.
    pub fn current_info(&self) -> Result<Metadata> {
        match self.session.current() {
            Some(filename) => self.engine.inspect(self.store.serve_path(&filename)?),
            None => Ok(Metadata::not_found()),
        }
    }

    /// The currently selected filename, if any.
    pub fn current(&self) -> Option<String> {
        self.session.current()
    }

    // -- Tasks ---------------------------------------------------------------

    /// Dispatch one task request.
    pub fn process(&self, request: TaskRequest) -> Result<TaskOutcome> {
        let dispatcher = TaskDispatcher::new(
            self.store.clone(),
            self.engine.clone(),
            Arc::clone(&self.session),
            self.config().merge_bucket,
        );
        dispatcher.dispatch(request)
    }

    // -- Config Persistence --------------------------------------------------

    /// Get a clone of the current config.
    pub fn config(&self) -> AppConfig {
        self.config.lock().expect("config lock poisoned").clone()
    }

    /// Update and persist the config.
    pub fn save_config(&self, config: &AppConfig) -> Result<()> {
        *self.config.lock().expect("config lock poisoned") = config.clone();
        persist_config(&self.data_dir, config)
    }

    /// Path to the data directory.
    pub fn data_dir(&self) -> &PathBuf {
        &self.data_dir
    }
}

// -- Config file persistence -------------------------------------------------

const CONFIG_FILE: &str = "config.json";

fn load_config(data_dir: &Path) -> Option<AppConfig> {
    let path = data_dir.join(CONFIG_FILE);
    let data = std::fs::read_to_string(&path).ok()?;
    serde_json::from_str(&data).ok()
}

fn persist_config(data_dir: &Path, config: &AppConfig) -> Result<()> {
    let path = data_dir.join(CONFIG_FILE);
    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(&path, json)?;
    Ok(())
}
