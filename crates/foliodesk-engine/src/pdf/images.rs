// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Embedded image extraction — walks each page's XObject resources and pulls
// out image streams in their discovered order.
//
// JPEG (DCTDecode) and JPEG2000 (JPXDecode) streams are self-contained image
// files and pass through untouched. Raw RGB/Gray sample streams are
// re-encoded as PNG; anything else is written out as raw bytes.

use foliodesk_core::error::FoliodeskError;
use image::{DynamicImage, GrayImage, ImageFormat, RgbImage};
use lopdf::{Dictionary, Document, Object, ObjectId};
use tracing::{debug, warn};

/// One image pulled out of a page, ready to be written to the output area.
pub struct ExtractedImage {
    /// XObject resource name the image was registered under.
    pub name: String,
    /// File extension matching the encoded bytes.
    pub extension: &'static str,
    /// Encoded image bytes.
    pub bytes: Vec<u8>,
}

/// Collect the embedded images of a single page, in resource-dictionary
/// discovery order. A page without images yields an empty vector.
pub fn page_images(
    document: &Document,
    page_id: ObjectId,
) -> Result<Vec<ExtractedImage>, FoliodeskError> {
    let Some(resources) = page_resources(document, page_id) else {
        return Ok(Vec::new());
    };
    let Some(xobjects) = dict_entry(document, resources, b"XObject") else {
        return Ok(Vec::new());
    };

    let mut images = Vec::new();
    for (name, value) in xobjects.iter() {
        let Object::Stream(stream) = resolve(document, value) else {
            continue;
        };
        let is_image = matches!(
            stream.dict.get(b"Subtype"),
            Ok(Object::Name(subtype)) if subtype == b"Image"
        );
        if !is_image {
            continue;
        }

        let name = String::from_utf8_lossy(name).into_owned();
        let (extension, bytes) = decode_image_stream(document, stream);
        debug!(name, extension, bytes_len = bytes.len(), "image found");
        images.push(ExtractedImage {
            name,
            extension,
            bytes,
        });
    }

    Ok(images)
}

/// Encode an image stream as a standalone file.
fn decode_image_stream(document: &Document, stream: &lopdf::Stream) -> (&'static str, Vec<u8>) {
    match last_filter(document, &stream.dict).as_deref() {
        // Self-contained formats: the stream content *is* the file.
        Some(b"DCTDecode") => ("jpg", stream.content.clone()),
        Some(b"JPXDecode") => ("jp2", stream.content.clone()),
        _ => {
            let data = stream
                .decompressed_content()
                .unwrap_or_else(|_| stream.content.clone());
            match encode_png(document, &stream.dict, &data) {
                Some(png) => ("png", png),
                None => {
                    warn!("image stream not renderable, writing raw bytes");
                    ("bin", data)
                }
            }
        }
    }
}

/// Re-encode raw 8-bit DeviceRGB or DeviceGray samples as PNG.
fn encode_png(document: &Document, dict: &Dictionary, data: &[u8]) -> Option<Vec<u8>> {
    let width = u32::try_from(dict_i64(document, dict, b"Width")?).ok()?;
    let height = u32::try_from(dict_i64(document, dict, b"Height")?).ok()?;
    let bits = dict_i64(document, dict, b"BitsPerComponent").unwrap_or(8);
    if bits != 8 {
        return None;
    }

    let color_space = match resolve(document, dict.get(b"ColorSpace").ok()?) {
        Object::Name(name) => name.clone(),
        _ => return None,
    };

    // Dimensions come straight from the file; size arithmetic must not
    // overflow on hostile values.
    let pixels = (width as usize).checked_mul(height as usize)?;

    let image = match color_space.as_slice() {
        b"DeviceRGB" => {
            let expected = pixels.checked_mul(3)?;
            if data.len() < expected {
                return None;
            }
            DynamicImage::ImageRgb8(RgbImage::from_raw(width, height, data[..expected].to_vec())?)
        }
        b"DeviceGray" => {
            if data.len() < pixels {
                return None;
            }
            DynamicImage::ImageLuma8(GrayImage::from_raw(width, height, data[..pixels].to_vec())?)
        }
        _ => return None,
    };

    let mut buffer = Vec::new();
    let mut cursor = std::io::Cursor::new(&mut buffer);
    image.write_to(&mut cursor, ImageFormat::Png).ok()?;
    Some(buffer)
}

/// Last name of the stream's /Filter chain, following references.
///
/// Filters are listed in decoding order, so the last one is the encoding
/// that actually produced image samples.
fn last_filter(document: &Document, dict: &Dictionary) -> Option<Vec<u8>> {
    match resolve(document, dict.get(b"Filter").ok()?) {
        Object::Name(name) => Some(name.clone()),
        Object::Array(filters) => filters
            .iter()
            .rev()
            .find_map(|filter| match resolve(document, filter) {
                Object::Name(name) => Some(name.clone()),
                _ => None,
            }),
        _ => None,
    }
}

// -- Object graph helpers -----------------------------------------------------

/// Resolve a reference to its object, or return the object itself.
fn resolve<'a>(document: &'a Document, object: &'a Object) -> &'a Object {
    match object {
        Object::Reference(id) => document.get_object(*id).unwrap_or(object),
        _ => object,
    }
}

/// Look up a dictionary-valued entry, following references.
fn dict_entry<'a>(
    document: &'a Document,
    dict: &'a Dictionary,
    key: &[u8],
) -> Option<&'a Dictionary> {
    match resolve(document, dict.get(key).ok()?) {
        Object::Dictionary(inner) => Some(inner),
        _ => None,
    }
}

/// Look up an integer-valued entry, following references.
fn dict_i64(document: &Document, dict: &Dictionary, key: &[u8]) -> Option<i64> {
    match resolve(document, dict.get(key).ok()?) {
        Object::Integer(n) => Some(*n),
        _ => None,
    }
}

/// The page's /Resources dictionary, inherited from the page tree if the page
/// itself carries none.
fn page_resources(document: &Document, page_id: ObjectId) -> Option<&Dictionary> {
    let mut current = page_id;
    // Bounded walk up the /Parent chain; real page trees are shallow.
    for _ in 0..32 {
        let Ok(Object::Dictionary(dict)) = document.get_object(current) else {
            return None;
        };
        if let Some(resources) = dict_entry(document, dict, b"Resources") {
            return Some(resources);
        }
        match dict.get(b"Parent") {
            Ok(Object::Reference(parent)) => current = *parent,
            _ => return None,
        }
    }
    None
}
