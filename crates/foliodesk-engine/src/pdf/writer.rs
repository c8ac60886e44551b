// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF writer — compose new single-page documents from a heading and a body
// message using `printpdf` 0.8.
//
// printpdf 0.8 uses a data-oriented API: documents are built by constructing
// `PdfPage` structs containing `Vec<Op>` operation lists, then serialised via
// `PdfDocument::save()`.

use foliodesk_core::error::FoliodeskError;
use printpdf::{
    BuiltinFont, Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg, Point, Pt, TextItem,
};
use tracing::{debug, info, instrument};

/// US Letter page size in millimetres.
const LETTER_WIDTH_MM: f32 = 215.9;
const LETTER_HEIGHT_MM: f32 = 279.4;

/// Left margin of the composed layout, in points.
const TEXT_X_PT: f32 = 100.0;
/// Baseline of the heading, in points from the page bottom.
const HEADING_Y_PT: f32 = 750.0;
/// Baseline of the first message line, in points from the page bottom.
const MESSAGE_Y_PT: f32 = 700.0;
/// Line step for multi-line messages, in points.
const LINE_HEIGHT_PT: f32 = 16.0;

/// Composes new PDF documents: a bold heading over a plain-text message on a
/// single Letter-sized page.
pub struct PdfComposer {
    /// Title metadata embedded in the PDF /Info dictionary.
    title: Option<String>,
}

impl PdfComposer {
    pub fn new() -> Self {
        Self { title: None }
    }

    /// Set a title for the PDF metadata.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
    }

    /// Compose a single-page PDF with a 16pt bold heading and a 12pt message.
    ///
    /// Message lines are split on `\n` and flow downward from the first
    /// message baseline.
    #[instrument(skip(self, message), fields(heading, message_len = message.len()))]
    pub fn compose(&self, heading: &str, message: &str) -> Result<Vec<u8>, FoliodeskError> {
        let page_w = Mm(LETTER_WIDTH_MM);
        let page_h = Mm(LETTER_HEIGHT_MM);
        let title = self.title.as_deref().unwrap_or(heading);

        info!(title, "composing PDF");

        let mut ops: Vec<Op> = Vec::new();
        write_line(
            &mut ops,
            heading,
            BuiltinFont::HelveticaBold,
            16.0,
            HEADING_Y_PT,
        );
        for (index, line) in message.split('\n').enumerate() {
            let y = MESSAGE_Y_PT - index as f32 * LINE_HEIGHT_PT;
            write_line(&mut ops, line, BuiltinFont::Helvetica, 12.0, y);
        }

        let mut doc = PdfDocument::new(title);
        doc.with_pages(vec![PdfPage::new(page_w, page_h, ops)]);

        let mut warnings: Vec<PdfWarnMsg> = Vec::new();
        let output = doc.save(&PdfSaveOptions::default(), &mut warnings);

        debug!(output_bytes = output.len(), "composition complete");
        Ok(output)
    }
}

impl Default for PdfComposer {
    fn default() -> Self {
        Self::new()
    }
}

/// Append the operations drawing one line of text at the given baseline.
fn write_line(ops: &mut Vec<Op>, text: &str, font: BuiltinFont, size_pt: f32, y_pt: f32) {
    ops.push(Op::StartTextSection);
    ops.push(Op::SetTextCursor {
        pos: Point {
            x: Pt(TEXT_X_PT),
            y: Pt(y_pt),
        },
    });
    ops.push(Op::SetFontSizeBuiltinFont {
        size: Pt(size_pt),
        font,
    });
    ops.push(Op::WriteTextBuiltinFont {
        items: vec![TextItem::Text(text.to_string())],
        font,
    });
    ops.push(Op::EndTextSection);
}
