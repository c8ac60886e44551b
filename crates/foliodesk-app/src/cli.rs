// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command-line surface. The `process` subcommand keeps the legacy
// `(task, filename, setname, password)` quadruple so existing callers keep
// working; everything else is a plain subcommand.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "foliodesk", version, about = "Local document desk")]
pub struct Cli {
    /// Data directory (defaults to the platform data dir).
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Upload a file, classifying it into its bucket.
    Upload {
        /// File to upload.
        file: PathBuf,
    },

    /// List stored files, per bucket or for one named bucket.
    List {
        /// Bucket name (code, drawing, text, excel, other).
        bucket: Option<String>,
    },

    /// List generated artifacts in the output area.
    Outputs,

    /// Show document metadata for the current document or a named file.
    Info {
        /// Filename to inspect instead of the current document.
        filename: Option<String>,
    },

    /// Print the path a filename would be served from.
    Serve {
        filename: String,
    },

    /// Run a transformation task in the legacy form encoding.
    ///
    /// Tasks: gettext, getimgs, lock, unlock, mergepdf. For mergepdf the
    /// password field carries the ", "-separated input list.
    Process {
        /// Task name.
        task: String,
        /// Input filename (unused by mergepdf).
        #[arg(default_value = "")]
        filename: String,
        /// Base name for the generated artifact.
        #[arg(long = "setname", default_value = "")]
        set_name: String,
        /// Password, or the merge input list for mergepdf.
        #[arg(long, default_value = "")]
        password: String,
    },

    /// Decrypt a password-protected PDF into the output area.
    Unlock {
        /// Filename of the protected document.
        filename: String,
        /// Password to decrypt with.
        #[arg(long)]
        password: String,
        /// Base name for the decrypted artifact; a unique name is generated
        /// when omitted.
        #[arg(long = "setname")]
        set_name: Option<String>,
    },

    /// Compose a new single-page PDF from a heading and a message.
    Compose {
        heading: String,
        message: String,
        /// Base name for the generated artifact.
        #[arg(long = "setname", default_value = "composed")]
        set_name: String,
    },
}
