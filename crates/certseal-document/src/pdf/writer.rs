// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Minimal PDF writer: A4 pages with no content.

use certseal_core::error::{CertsealError, Result};
use lopdf::{Dictionary, Document, Object};
use tracing::{debug, instrument};

/// A4 in PDF points.
const A4_WIDTH_PT: i64 = 595;
const A4_HEIGHT_PT: i64 = 842;

/// Serialise a PDF 1.5 document with `pages` blank A4 pages.
#[instrument]
pub fn blank_pdf(pages: u32) -> Result<Vec<u8>> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut kids = Vec::with_capacity(pages as usize);
    for _ in 0..pages {
        let mut page = Dictionary::new();
        page.set("Type", Object::Name(b"Page".to_vec()));
        page.set("Parent", Object::Reference(pages_id));
        page.set(
            "MediaBox",
            Object::Array(vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(A4_WIDTH_PT),
                Object::Integer(A4_HEIGHT_PT),
            ]),
        );
        kids.push(Object::Reference(doc.add_object(Object::Dictionary(page))));
    }

    let mut pages_dict = Dictionary::new();
    pages_dict.set("Type", Object::Name(b"Pages".to_vec()));
    pages_dict.set("Count", Object::Integer(i64::from(pages)));
    pages_dict.set("Kids", Object::Array(kids));
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let mut catalog = Dictionary::new();
    catalog.set("Type", Object::Name(b"Catalog".to_vec()));
    catalog.set("Pages", Object::Reference(pages_id));
    let catalog_id = doc.add_object(Object::Dictionary(catalog));
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut output = Vec::new();
    doc.save_to(&mut output)
        .map_err(|err| CertsealError::InvalidDocument(format!("failed to serialise PDF: {err}")))?;

    debug!(pages, output_bytes = output.len(), "blank PDF written");
    Ok(output)
}
