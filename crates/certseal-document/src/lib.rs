// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// certseal-document: Checks that an uploaded certificate really is a PDF
// before it is sealed, and writes blank PDFs for tests and benchmarks.
//
// Page layout, overlays and QR rendering are handled by whatever composes
// the certificate; this crate only reads.

pub mod pdf;

pub use pdf::inspect::CertificateDocument;
pub use pdf::writer::blank_pdf;
