// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Certificate inspection: confirm an upload parses as a PDF with at least
// one page before it is encrypted and stored.

use certseal_core::error::{CertsealError, Result};
use lopdf::Document;
use tracing::{debug, instrument};

/// Summary of an uploaded certificate PDF.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateDocument {
    page_count: usize,
    version: String,
}

impl CertificateDocument {
    /// Parse `data` as a PDF.
    ///
    /// Anything lopdf cannot load, and any PDF without pages, is rejected
    /// with [`CertsealError::InvalidDocument`].
    #[instrument(skip_all, fields(bytes_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let document = Document::load_mem(data)
            .map_err(|err| CertsealError::InvalidDocument(format!("not a readable PDF: {err}")))?;

        let page_count = document.get_pages().len();
        if page_count == 0 {
            return Err(CertsealError::InvalidDocument("PDF has no pages".into()));
        }

        debug!(page_count, version = %document.version, "certificate PDF inspected");
        Ok(Self {
            page_count,
            version: document.version,
        })
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// PDF header version, e.g. `"1.5"`.
    pub fn version(&self) -> &str {
        &self.version
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::writer::blank_pdf;

    #[test]
    fn accepts_generated_pdf() {
        let bytes = blank_pdf(2).expect("blank pdf");
        let doc = CertificateDocument::from_bytes(&bytes).expect("inspect");
        assert_eq!(doc.page_count(), 2);
        assert_eq!(doc.version(), "1.5");
    }

    #[test]
    fn rejects_arbitrary_bytes() {
        let result = CertificateDocument::from_bytes(b"0123456789");
        assert!(matches!(result, Err(CertsealError::InvalidDocument(_))));
    }

    #[test]
    fn rejects_empty_input() {
        assert!(CertificateDocument::from_bytes(b"").is_err());
    }

    #[test]
    fn rejects_zero_page_pdf() {
        let bytes = blank_pdf(0).expect("blank pdf");
        assert!(matches!(
            CertificateDocument::from_bytes(&bytes),
            Err(CertsealError::InvalidDocument(_))
        ));
    }
}
