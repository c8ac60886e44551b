// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// foliodesk-engine — Document transformations for the Foliodesk desk.
//
// Provides the PDF operations (text extraction, image extraction, password
// lock/unlock, merge, metadata inspection) plus composition of new PDFs.
// Every operation is stateless across calls: a pure function of its inputs
// and filesystem side effects, with failures surfaced immediately.

pub mod engine;
pub mod pdf;

pub use engine::TransformationEngine;
pub use pdf::reader::PdfFile;
pub use pdf::writer::PdfComposer;

/// In-memory PDF builders for tests. Available to downstream crates' test
/// suites through the `test-fixtures` feature.
#[cfg(any(test, feature = "test-fixtures"))]
pub mod testutil {
    use lopdf::content::{Content, Operation};
    use lopdf::{Document, Object, Stream, dictionary};

    /// Build a minimal PDF with one page per entry in `pages`, each drawing
    /// its text in Helvetica. Returns the serialised bytes.
    pub fn sample_pdf(pages: &[&str]) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids: Vec<Object> = Vec::new();
        for text in pages {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 24.into()]),
                    Operation::new("Td", vec![72.into(), 720.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*text)]),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id = doc.add_object(Stream::new(
                dictionary! {},
                content.encode().expect("encode content"),
            ));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut out = Vec::new();
        doc.save_to(&mut out).expect("serialise sample PDF");
        out
    }

    /// Like [`sample_pdf`] but with an Info dictionary attached.
    pub fn sample_pdf_with_info(pages: &[&str], title: &str, author: &str) -> Vec<u8> {
        let mut doc = Document::load_mem(&sample_pdf(pages)).expect("reload sample");
        let info_id = doc.add_object(dictionary! {
            "Title" => Object::string_literal(title),
            "Author" => Object::string_literal(author),
        });
        doc.trailer.set("Info", info_id);
        let mut out = Vec::new();
        doc.save_to(&mut out).expect("serialise sample PDF");
        out
    }

    /// Build a one-page PDF embedding a single image XObject named `name`,
    /// carrying `filter` and raw `data` as its stream content.
    pub fn sample_pdf_with_image(name: &str, filter: &str, data: &[u8]) -> Vec<u8> {
        attach_image(&sample_pdf(&["page with image"]), 1, name, filter, data)
    }

    /// Attach an image XObject to page `page_number` of a serialised PDF,
    /// replacing that page's resources. Returns the new bytes.
    pub fn attach_image(
        pdf_bytes: &[u8],
        page_number: u32,
        name: &str,
        filter: &str,
        data: &[u8],
    ) -> Vec<u8> {
        let mut doc = Document::load_mem(pdf_bytes).expect("reload sample");

        let image_id = doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => 2,
                "Height" => 2,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
                "Filter" => filter,
            },
            data.to_vec(),
        ));

        let pages = doc.get_pages();
        let page_id = pages[&page_number];
        let resources_id = doc.add_object(Object::Dictionary(dictionary! {
            "XObject" => dictionary! { name => image_id },
        }));
        if let Ok(Object::Dictionary(page_dict)) = doc.get_object_mut(page_id) {
            page_dict.set("Resources", Object::Reference(resources_id));
        }

        let mut out = Vec::new();
        doc.save_to(&mut out).expect("serialise sample PDF");
        out
    }
}
