// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF module: inspection of uploaded certificates and minimal PDF writing.

pub mod inspect;
pub mod writer;

pub use inspect::CertificateDocument;
pub use writer::blank_pdf;
