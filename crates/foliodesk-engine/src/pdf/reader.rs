// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF reader — open and inspect existing PDF documents using the `lopdf`
// crate: page iteration, text extraction, and Info-dictionary metadata.

use std::path::{Path, PathBuf};

use foliodesk_core::Metadata;
use foliodesk_core::error::FoliodeskError;
use lopdf::{Document, Object, ObjectId};
use tracing::{debug, info, instrument};

/// Reads and inspects an existing PDF file.
///
/// Wraps `lopdf::Document` and provides the higher-level views the engine
/// needs: ordered page IDs, concatenated page text, and metadata.
#[derive(Debug)]
pub struct PdfFile {
    /// The underlying lopdf document.
    document: Document,
    /// Source path the file was opened from.
    source_path: PathBuf,
}

impl PdfFile {
    // -- Construction ---------------------------------------------------------

    /// Open a PDF from the filesystem.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self, FoliodeskError> {
        let path_ref = path.as_ref();

        let document = Document::load(path_ref).map_err(|err| FoliodeskError::UnreadablePdf {
            path: path_ref.display().to_string(),
            detail: err.to_string(),
        })?;

        debug!(pages = document.get_pages().len(), "PDF loaded");

        Ok(Self {
            document,
            source_path: path_ref.to_path_buf(),
        })
    }

    // -- Inspection -----------------------------------------------------------

    /// Number of pages in the document.
    pub fn page_count(&self) -> usize {
        self.document.get_pages().len()
    }

    /// Page object IDs in page order (1-indexed page numbers, ascending).
    pub fn page_ids(&self) -> Vec<ObjectId> {
        // get_pages is keyed by page number in a BTreeMap, so values iterate
        // in page order already.
        self.document.get_pages().values().copied().collect()
    }

    /// Whether the document reports itself encrypted.
    pub fn is_encrypted(&self) -> bool {
        self.document.is_encrypted()
    }

    /// Source path this file was opened from.
    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    // -- Text extraction ------------------------------------------------------

    /// Extract the text of every page, in page order, concatenated with no
    /// added separator between pages. A zero-page document yields an empty
    /// string; pages without extractable text contribute nothing.
    #[instrument(skip(self))]
    pub fn extract_text(&self) -> String {
        let pages = self.document.get_pages();
        let mut text = String::new();

        for page_number in pages.keys() {
            let page_text = self
                .document
                .extract_text(&[*page_number])
                .unwrap_or_default();
            text.push_str(&page_text);
        }

        info!(pages = pages.len(), text_len = text.len(), "text extracted");
        text
    }

    // -- Metadata -------------------------------------------------------------

    /// Read the document's Info-dictionary metadata.
    ///
    /// A document without an Info dictionary (or with an empty one) yields
    /// the "No metadata found" sentinel rather than an empty mapping.
    pub fn metadata(&self) -> Metadata {
        let info_dict = self
            .document
            .trailer
            .get(b"Info")
            .ok()
            .and_then(|info| match info {
                Object::Reference(id) => match self.document.get_object(*id) {
                    Ok(Object::Dictionary(dict)) => Some(dict),
                    _ => None,
                },
                Object::Dictionary(dict) => Some(dict),
                _ => None,
            });

        let Some(dict) = info_dict else {
            return Metadata::none_found();
        };

        let mut metadata = Metadata::default();
        for (key, value) in dict.iter() {
            let key = String::from_utf8_lossy(key).into_owned();
            metadata.insert(key, metadata_value(&self.document, value));
        }

        if metadata.is_empty() {
            return Metadata::none_found();
        }
        metadata
    }

    // -- Access to the underlying document ------------------------------------

    /// Borrow the underlying lopdf document.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Consume the reader and return the underlying lopdf document.
    pub fn into_document(self) -> Document {
        self.document
    }
}

/// Render a metadata dictionary value as an optional string.
///
/// PDF strings and names become their text; numbers and booleans are
/// formatted; Null and anything unrenderable becomes None.
fn metadata_value(document: &Document, value: &Object) -> Option<String> {
    match value {
        Object::String(bytes, _) => Some(String::from_utf8_lossy(bytes).into_owned()),
        Object::Name(name) => Some(String::from_utf8_lossy(name).into_owned()),
        Object::Integer(n) => Some(n.to_string()),
        Object::Real(r) => Some(r.to_string()),
        Object::Boolean(b) => Some(b.to_string()),
        Object::Reference(id) => document
            .get_object(*id)
            .ok()
            .and_then(|resolved| metadata_value(document, resolved)),
        _ => None,
    }
}
