// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

//! certseal-security: credential derivation and payload sealing.
//!
//! A date of birth maps to a low-entropy [`DerivedPassword`] that is only
//! ever used to *name* the stored key.  The key itself is random per
//! certificate and produced by [`PayloadCipher`].  Also provides SHA-256
//! fingerprints and the SQLite audit trail.
//!
//! [`DerivedPassword`]: certseal_core::DerivedPassword

pub mod audit;
pub mod cipher;
pub mod integrity;
pub mod password;

// PUBLIC API: Re-export core security primitives
pub use audit::AuditLog;
pub use cipher::{EncryptionKey, PayloadCipher};
pub use integrity::{hash_bytes, verify_hash};
pub use password::derive_password;
