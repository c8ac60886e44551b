// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF merging — append the full page sequence of each source document, in
// order, into a single new document.

use foliodesk_core::error::FoliodeskError;
use lopdf::{Document, Object, ObjectId, dictionary};
use tracing::{debug, info, warn};

use super::reader::PdfFile;

/// Merge the given documents into one PDF, pages appearing in source order.
/// Returns the serialised bytes of the combined document.
pub fn merge_documents(sources: &[PdfFile]) -> Result<Vec<u8>, FoliodeskError> {
    info!(
        documents = sources.len(),
        total_pages = sources.iter().map(PdfFile::page_count).sum::<usize>(),
        "merging PDFs"
    );

    let mut target = Document::with_version("1.5");
    let pages_id = target.new_object_id();

    let mut kids: Vec<Object> = Vec::new();
    for source in sources {
        for page_id in source.page_ids() {
            let cloned_id = clone_page(source.document(), &mut target, page_id, pages_id)?;
            kids.push(Object::Reference(cloned_id));
        }
    }

    let count = kids.len() as i64;
    target.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = target.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    target.trailer.set("Root", catalog_id);

    let mut output = Vec::new();
    target.save_to(&mut output).map_err(|err| {
        FoliodeskError::UnreadablePdf {
            path: "<merged output>".to_string(),
            detail: format!("failed to serialise merged PDF: {err}"),
        }
    })?;

    debug!(output_bytes = output.len(), "merge complete");
    Ok(output)
}

/// Clone a single page object (and its referenced resources) from `source`
/// into `target`, parenting it under `pages_id`.
///
/// Stream data, fonts, and images referenced by the page dictionary are
/// copied as new objects in the target document.
fn clone_page(
    source: &Document,
    target: &mut Document,
    page_id: ObjectId,
    pages_id: ObjectId,
) -> Result<ObjectId, FoliodeskError> {
    let page_object = source
        .get_object(page_id)
        .map_err(|err| FoliodeskError::UnreadablePdf {
            path: "<merge source>".to_string(),
            detail: format!("cannot read page object {page_id:?}: {err}"),
        })?;

    let cloned = deep_clone_object(source, target, page_object);
    let cloned_id = target.add_object(cloned);

    // Point the cloned page at the target's page tree root.
    if let Ok(Object::Dictionary(page_dict)) = target.get_object_mut(cloned_id) {
        page_dict.set("Parent", Object::Reference(pages_id));
    }

    Ok(cloned_id)
}

/// Deep-clone a single lopdf Object, recursively resolving references.
///
/// /Parent is deliberately skipped to avoid circular cloning; the caller
/// patches it afterwards. Dangling references clone as Null.
fn deep_clone_object(source: &Document, target: &mut Document, object: &Object) -> Object {
    match object {
        Object::Dictionary(dict) => {
            let mut new_dict = lopdf::Dictionary::new();
            for (key, value) in dict.iter() {
                if key == b"Parent" {
                    continue;
                }
                let cloned_value = deep_clone_object(source, target, value);
                new_dict.set(key.clone(), cloned_value);
            }
            Object::Dictionary(new_dict)
        }
        Object::Array(arr) => {
            let mut new_arr = Vec::with_capacity(arr.len());
            for item in arr {
                new_arr.push(deep_clone_object(source, target, item));
            }
            Object::Array(new_arr)
        }
        Object::Reference(ref_id) => match source.get_object(*ref_id) {
            Ok(referenced) => {
                let cloned = deep_clone_object(source, target, referenced);
                let new_id = target.add_object(cloned);
                Object::Reference(new_id)
            }
            Err(err) => {
                warn!(?ref_id, %err, "cannot resolve reference, using Null");
                Object::Null
            }
        },
        Object::Stream(stream) => {
            let mut new_dict = lopdf::Dictionary::new();
            for (key, value) in stream.dict.iter() {
                if key == b"Parent" {
                    continue;
                }
                let cloned_value = deep_clone_object(source, target, value);
                new_dict.set(key.clone(), cloned_value);
            }
            Object::Stream(lopdf::Stream::new(new_dict, stream.content.clone()))
        }
        // Boolean, Integer, Real, String, Name, Null are trivially cloneable.
        other => other.clone(),
    }
}
