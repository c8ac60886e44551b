// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Foliodesk document desk.

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::FoliodeskError;

// -- Buckets ------------------------------------------------------------------

/// Source-code file extensions.
const CODE_EXTENSIONS: &[&str] = &[
    "py", "c", "cpp", "java", "js", "html", "css", "php", "rb", "go", "swift", "sql",
];

/// Raster and vector drawing extensions.
const DRAWING_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "svg", "dwg", "bmp", "psd", "ai", "eps", "tif", "tiff",
];

/// Text and document extensions (the only bucket whose files are transformed).
const TEXT_EXTENSIONS: &[&str] = &[
    "txt", "doc", "pdf", "rtf", "odt", "tex", "md", "xml", "json", "docx",
];

/// Spreadsheet extensions.
const EXCEL_EXTENSIONS: &[&str] = &[
    "csv", "xls", "xlsx", "xlsm", "xlsb", "xlt", "xltx", "xltm", "ods",
];

/// Logical storage partition for an uploaded file, chosen by extension.
///
/// The mapping is total: any extension outside the four fixed tables routes to
/// [`Bucket::Other`], so classification can never fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Bucket {
    Code,
    Drawing,
    Text,
    Excel,
    Other,
}

impl Bucket {
    /// All buckets, in directory-listing order.
    pub const ALL: [Bucket; 5] = [
        Bucket::Code,
        Bucket::Drawing,
        Bucket::Text,
        Bucket::Excel,
        Bucket::Other,
    ];

    /// Classify a filename into its bucket.
    ///
    /// The substring after the last `.` is lowercased and looked up in the
    /// four extension tables; a filename without a dot is treated as having
    /// its whole name as the extension, matching nothing.
    pub fn classify(filename: &str) -> Bucket {
        let ext = filename
            .rsplit('.')
            .next()
            .unwrap_or(filename)
            .to_ascii_lowercase();

        if CODE_EXTENSIONS.contains(&ext.as_str()) {
            Bucket::Code
        } else if DRAWING_EXTENSIONS.contains(&ext.as_str()) {
            Bucket::Drawing
        } else if TEXT_EXTENSIONS.contains(&ext.as_str()) {
            Bucket::Text
        } else if EXCEL_EXTENSIONS.contains(&ext.as_str()) {
            Bucket::Excel
        } else {
            Bucket::Other
        }
    }

    /// On-disk directory name of this bucket.
    pub fn dir_name(&self) -> &'static str {
        match self {
            Bucket::Code => "code",
            Bucket::Drawing => "drawing",
            Bucket::Text => "text",
            Bucket::Excel => "excel",
            Bucket::Other => "other",
        }
    }

    /// Parse a bucket from its directory name.
    pub fn parse(name: &str) -> Option<Bucket> {
        match name.to_ascii_lowercase().as_str() {
            "code" => Some(Bucket::Code),
            "drawing" => Some(Bucket::Drawing),
            "text" => Some(Bucket::Text),
            "excel" => Some(Bucket::Excel),
            "other" => Some(Bucket::Other),
            _ => None,
        }
    }
}

impl std::fmt::Display for Bucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.dir_name())
    }
}

// -- Documents ----------------------------------------------------------------

/// A stored file tracked by the system. Created on upload, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Filename, unique within its bucket.
    pub filename: String,
    /// Bucket the file was classified into.
    pub bucket: Bucket,
    /// Absolute storage path.
    pub path: PathBuf,
}

// -- Tasks --------------------------------------------------------------------

/// The kinds of transformation task the dispatcher understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskKind {
    ExtractText,
    ExtractImages,
    Lock,
    Unlock,
    Merge,
    Compose,
}

impl TaskKind {
    /// Wire name used by the task-submission collaborator.
    pub fn wire_name(&self) -> &'static str {
        match self {
            TaskKind::ExtractText => "gettext",
            TaskKind::ExtractImages => "getimgs",
            TaskKind::Lock => "lock",
            TaskKind::Unlock => "unlock",
            TaskKind::Merge => "mergepdf",
            TaskKind::Compose => "compose",
        }
    }
}

/// Delimiter separating filenames in a legacy merge list.
const MERGE_LIST_DELIMITER: &str = ", ";

/// One transformation invocation, with explicitly named fields per task kind.
///
/// The legacy form interface overloads a single `password` field as both a
/// literal password (lock/unlock) and a `", "`-separated filename list
/// (merge); [`TaskRequest::from_form`] absorbs that ambiguity at the boundary
/// so the rest of the system never sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskRequest {
    ExtractText {
        filename: String,
        set_name: String,
    },
    ExtractImages {
        filename: String,
    },
    Lock {
        filename: String,
        set_name: String,
        password: String,
    },
    Unlock {
        filename: String,
        password: String,
        /// Output base name; a unique name is generated when absent.
        output_name: Option<String>,
    },
    Merge {
        /// Ordered input filenames, resolved against the merge bucket.
        filenames: Vec<String>,
        set_name: String,
    },
    Compose {
        heading: String,
        message: String,
        set_name: String,
    },
}

impl TaskRequest {
    /// Build a request from the legacy `(task, filename, setname, password)`
    /// form quadruple.
    ///
    /// Unknown task names are rejected with a typed
    /// [`FoliodeskError::UnknownTask`] rather than silently ignored.
    pub fn from_form(
        task: &str,
        filename: &str,
        set_name: &str,
        password: &str,
    ) -> Result<TaskRequest, FoliodeskError> {
        match task {
            "gettext" => Ok(TaskRequest::ExtractText {
                filename: filename.to_string(),
                set_name: set_name.to_string(),
            }),
            "getimgs" => Ok(TaskRequest::ExtractImages {
                filename: filename.to_string(),
            }),
            "lock" => Ok(TaskRequest::Lock {
                filename: filename.to_string(),
                set_name: set_name.to_string(),
                password: password.to_string(),
            }),
            "unlock" => Ok(TaskRequest::Unlock {
                filename: filename.to_string(),
                password: password.to_string(),
                output_name: (!set_name.is_empty()).then(|| set_name.to_string()),
            }),
            "mergepdf" => Ok(TaskRequest::Merge {
                filenames: password
                    .split(MERGE_LIST_DELIMITER)
                    .map(|name| name.trim().to_string())
                    .filter(|name| !name.is_empty())
                    .collect(),
                set_name: set_name.to_string(),
            }),
            other => Err(FoliodeskError::UnknownTask(other.to_string())),
        }
    }

    /// Kind of this request.
    pub fn kind(&self) -> TaskKind {
        match self {
            TaskRequest::ExtractText { .. } => TaskKind::ExtractText,
            TaskRequest::ExtractImages { .. } => TaskKind::ExtractImages,
            TaskRequest::Lock { .. } => TaskKind::Lock,
            TaskRequest::Unlock { .. } => TaskKind::Unlock,
            TaskRequest::Merge { .. } => TaskKind::Merge,
            TaskRequest::Compose { .. } => TaskKind::Compose,
        }
    }

    /// The filename this request selects as the current document.
    ///
    /// Merge selects its first input; Compose has no input document.
    pub fn target_filename(&self) -> Option<&str> {
        match self {
            TaskRequest::ExtractText { filename, .. }
            | TaskRequest::ExtractImages { filename }
            | TaskRequest::Lock { filename, .. }
            | TaskRequest::Unlock { filename, .. } => Some(filename),
            TaskRequest::Merge { filenames, .. } => filenames.first().map(String::as_str),
            TaskRequest::Compose { .. } => None,
        }
    }
}

// -- Metadata -----------------------------------------------------------------

/// Metadata mapping read from a document's embedded Info dictionary.
///
/// Two sentinel shapes signal states distinct from "empty mapping":
/// `{Status: "Not Found"}` for filenames that are not recognised documents,
/// and `{"No metadata found": None}` for documents without metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata(pub BTreeMap<String, Option<String>>);

impl Metadata {
    /// Sentinel returned for filenames that do not end in a recognised
    /// document extension.
    pub fn not_found() -> Self {
        let mut map = BTreeMap::new();
        map.insert("Status".to_string(), Some("Not Found".to_string()));
        Metadata(map)
    }

    /// Sentinel returned for documents carrying no metadata dictionary.
    pub fn none_found() -> Self {
        let mut map = BTreeMap::new();
        map.insert("No metadata found".to_string(), None);
        Metadata(map)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Option<String>) {
        self.0.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&Option<String>> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Option<String>)> {
        self.0.iter()
    }
}

// -- Outcomes -----------------------------------------------------------------

/// Result of one dispatched task: the selected document's metadata plus the
/// artifacts the operation produced, in creation order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskOutcome {
    pub kind: TaskKind,
    pub metadata: Metadata,
    pub artifacts: Vec<PathBuf>,
    pub run_at: DateTime<Utc>,
}

impl TaskOutcome {
    pub fn new(kind: TaskKind, metadata: Metadata, artifacts: Vec<PathBuf>) -> Self {
        Self {
            kind,
            metadata,
            artifacts,
            run_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_routes_known_extensions() {
        assert_eq!(Bucket::classify("main.py"), Bucket::Code);
        assert_eq!(Bucket::classify("scan.jpeg"), Bucket::Drawing);
        assert_eq!(Bucket::classify("report.pdf"), Bucket::Text);
        assert_eq!(Bucket::classify("ledger.xlsx"), Bucket::Excel);
    }

    #[test]
    fn classify_is_case_insensitive() {
        assert_eq!(Bucket::classify("REPORT.PDF"), Bucket::Text);
        assert_eq!(Bucket::classify("Photo.JpG"), Bucket::Drawing);
    }

    #[test]
    fn classify_unmapped_goes_to_other() {
        assert_eq!(Bucket::classify("archive.zip"), Bucket::Other);
        assert_eq!(Bucket::classify("README"), Bucket::Other);
        assert_eq!(Bucket::classify(""), Bucket::Other);
    }

    #[test]
    fn classify_is_stable() {
        for name in ["a.pdf", "b.rs", "c", "d.PY", "e.tar.gz"] {
            assert_eq!(Bucket::classify(name), Bucket::classify(name));
        }
    }

    #[test]
    fn every_table_extension_maps_to_exactly_one_bucket() {
        let tables: [(&[&str], Bucket); 4] = [
            (CODE_EXTENSIONS, Bucket::Code),
            (DRAWING_EXTENSIONS, Bucket::Drawing),
            (TEXT_EXTENSIONS, Bucket::Text),
            (EXCEL_EXTENSIONS, Bucket::Excel),
        ];
        for (table, bucket) in tables {
            for ext in table {
                assert_eq!(Bucket::classify(&format!("file.{ext}")), bucket);
            }
        }
    }

    #[test]
    fn from_form_parses_legacy_task_names() {
        let req = TaskRequest::from_form("gettext", "report.pdf", "out1", "").unwrap();
        assert_eq!(
            req,
            TaskRequest::ExtractText {
                filename: "report.pdf".into(),
                set_name: "out1".into(),
            }
        );

        let req = TaskRequest::from_form("lock", "report.pdf", "sealed", "hunter2").unwrap();
        assert_eq!(req.kind(), TaskKind::Lock);
    }

    #[test]
    fn from_form_splits_merge_list_on_comma_space() {
        let req = TaskRequest::from_form("mergepdf", "", "combined", "a.pdf, b.pdf").unwrap();
        assert_eq!(
            req,
            TaskRequest::Merge {
                filenames: vec!["a.pdf".into(), "b.pdf".into()],
                set_name: "combined".into(),
            }
        );
        assert_eq!(req.target_filename(), Some("a.pdf"));
    }

    #[test]
    fn from_form_rejects_unknown_tasks() {
        let err = TaskRequest::from_form("rotate", "a.pdf", "x", "").unwrap_err();
        assert!(matches!(err, FoliodeskError::UnknownTask(name) if name == "rotate"));
    }

    #[test]
    fn metadata_sentinels_are_distinct() {
        assert_ne!(Metadata::not_found(), Metadata::none_found());
        assert_ne!(Metadata::none_found(), Metadata::default());
        assert_eq!(
            Metadata::not_found().get("Status"),
            Some(&Some("Not Found".to_string()))
        );
        assert_eq!(Metadata::none_found().get("No metadata found"), Some(&None));
    }
}
