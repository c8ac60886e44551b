// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF password protection — RC4 standard-security lock and unlock via lopdf.
//
// Protection is owner-password only. The loader materialises the objects of
// an encrypted file only when the empty user password authenticates, so a
// non-empty user password would make our own artifacts unreadable to the rest
// of the pipeline. The supplied password becomes the owner password, which is
// what `unlock` verifies.

use std::path::Path;

use foliodesk_core::error::FoliodeskError;
use lopdf::encryption::{EncryptionState, EncryptionVersion, Permissions};
use lopdf::{Document, Object};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use super::reader::PdfFile;

/// Copy every page of the PDF at `path` into a password-protected document
/// and return its serialised bytes.
///
/// The password becomes the document's owner password; the user password is
/// left empty so the artifact stays parseable.
#[instrument(skip(password), fields(path = %path.as_ref().display()))]
pub fn lock(path: impl AsRef<Path>, password: &str) -> Result<Vec<u8>, FoliodeskError> {
    if password.is_empty() {
        return Err(FoliodeskError::EncryptionFailed(
            "password must not be empty".to_string(),
        ));
    }

    let pdf = PdfFile::open(path.as_ref())?;
    let pages = pdf.page_count();
    let mut document = pdf.into_document();

    ensure_file_id(&mut document);

    let version = EncryptionVersion::V1 {
        document: &document,
        owner_password: password,
        user_password: "",
        permissions: Permissions::all(),
    };
    let state = EncryptionState::try_from(version)
        .map_err(|err| FoliodeskError::EncryptionFailed(err.to_string()))?;
    document
        .encrypt(&state)
        .map_err(|err| FoliodeskError::EncryptionFailed(err.to_string()))?;

    let mut output = Vec::new();
    document
        .save_to(&mut output)
        .map_err(|err| FoliodeskError::EncryptionFailed(err.to_string()))?;

    info!(pages, output_bytes = output.len(), "document locked");
    Ok(output)
}

/// The RC4 key derivation hashes the first element of the trailer /ID array.
/// Documents we generate carry none, so supply one before encrypting.
fn ensure_file_id(document: &mut Document) {
    if document.trailer.get(b"ID").is_err() {
        let id = Uuid::new_v4().into_bytes().to_vec();
        document.trailer.set(
            "ID",
            Object::Array(vec![
                Object::string_literal(id.clone()),
                Object::string_literal(id),
            ]),
        );
    }
}

/// Verify `password` against the PDF at `path` and return the serialised
/// bytes of the unprotected document.
///
/// An encrypted source arrives with its contents already decoded by the
/// loader, so after the password checks out we only strip the security
/// handler. A source that does not report itself encrypted passes through
/// with its pages intact. A rejected password fails with
/// [`FoliodeskError::WrongPassword`] and produces no output.
#[instrument(skip(password), fields(path = %path.as_ref().display()))]
pub fn unlock(path: impl AsRef<Path>, password: &str) -> Result<Vec<u8>, FoliodeskError> {
    let path_ref = path.as_ref();
    let pdf = PdfFile::open(path_ref)?;
    let was_encrypted = pdf.is_encrypted();
    let mut document = pdf.into_document();

    if was_encrypted {
        document
            .authenticate_password(password)
            .map_err(|_| FoliodeskError::WrongPassword {
                path: path_ref.display().to_string(),
            })?;

        if let Some(encrypt_id) = document
            .trailer
            .get(b"Encrypt")
            .ok()
            .and_then(|obj| obj.as_reference().ok())
        {
            document.objects.remove(&encrypt_id);
        }
        document.trailer.remove(b"Encrypt");
        document.encryption_state = None;
    } else {
        debug!("source is not encrypted, copying pages through");
    }

    let mut output = Vec::new();
    document
        .save_to(&mut output)
        .map_err(|err| FoliodeskError::UnreadablePdf {
            path: path_ref.display().to_string(),
            detail: format!("failed to serialise decrypted PDF: {err}"),
        })?;

    info!(was_encrypted, output_bytes = output.len(), "document unlocked");
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::sample_pdf;
    use tempfile::tempdir;

    #[test]
    fn lock_then_unlock_restores_pages() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("plain.pdf");
        std::fs::write(&source, sample_pdf(&["Secret", "Pages"])).unwrap();

        let locked_bytes = lock(&source, "hunter2").unwrap();
        let locked_path = dir.path().join("locked.pdf");
        std::fs::write(&locked_path, &locked_bytes).unwrap();
        assert!(PdfFile::open(&locked_path).unwrap().is_encrypted());

        let unlocked_bytes = unlock(&locked_path, "hunter2").unwrap();
        let unlocked_path = dir.path().join("unlocked.pdf");
        std::fs::write(&unlocked_path, &unlocked_bytes).unwrap();

        let unlocked = PdfFile::open(&unlocked_path).unwrap();
        assert!(!unlocked.is_encrypted());
        assert_eq!(unlocked.page_count(), 2);
        assert!(unlocked.extract_text().contains("Secret"));
    }

    #[test]
    fn locked_artifact_keeps_its_page_tree() {
        // A locked file must reload as a full document, not just an
        // encryption dictionary.
        let dir = tempdir().unwrap();
        let source = dir.path().join("plain.pdf");
        std::fs::write(&source, sample_pdf(&["one", "two"])).unwrap();

        let locked_bytes = lock(&source, "hunter2").unwrap();
        let locked_path = dir.path().join("locked.pdf");
        std::fs::write(&locked_path, &locked_bytes).unwrap();

        let locked = PdfFile::open(&locked_path).unwrap();
        assert!(locked.is_encrypted());
        assert_eq!(locked.page_count(), 2);
    }

    #[test]
    fn lock_supplies_a_file_id() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("plain.pdf");
        std::fs::write(&source, sample_pdf(&["page"])).unwrap();

        let locked_bytes = lock(&source, "hunter2").unwrap();
        let locked_path = dir.path().join("locked.pdf");
        std::fs::write(&locked_path, &locked_bytes).unwrap();

        let locked = PdfFile::open(&locked_path).unwrap();
        assert!(locked.document().trailer.get(b"ID").is_ok());
    }

    #[test]
    fn lock_rejects_empty_password() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("plain.pdf");
        std::fs::write(&source, sample_pdf(&["page"])).unwrap();

        let err = lock(&source, "").unwrap_err();
        assert!(matches!(err, FoliodeskError::EncryptionFailed(_)));
    }

    #[test]
    fn unlock_with_wrong_password_fails() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("plain.pdf");
        std::fs::write(&source, sample_pdf(&["page"])).unwrap();

        let locked_bytes = lock(&source, "right").unwrap();
        let locked_path = dir.path().join("locked.pdf");
        std::fs::write(&locked_path, &locked_bytes).unwrap();

        let err = unlock(&locked_path, "wrong").unwrap_err();
        assert!(matches!(err, FoliodeskError::WrongPassword { .. }));
    }

    #[test]
    fn unlock_of_plain_document_copies_pages() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("plain.pdf");
        std::fs::write(&source, sample_pdf(&["a", "b", "c"])).unwrap();

        let bytes = unlock(&source, "ignored").unwrap();
        let out = dir.path().join("copy.pdf");
        std::fs::write(&out, &bytes).unwrap();
        assert_eq!(PdfFile::open(&out).unwrap().page_count(), 3);
    }
}
