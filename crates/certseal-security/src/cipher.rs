// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Payload cipher: AES-256-GCM via `ring`, with a fresh random key per
// certificate.
//
// Envelope layout:
//
//   +---------+-------------+--------------------------+
//   | version | nonce (12)  | ciphertext || tag (16)   |
//   +---------+-------------+--------------------------+
//
// The version byte is bound in as associated data, so rewriting it breaks
// authentication just like any other tampering.

use std::path::Path;

use certseal_core::DerivedPassword;
use certseal_core::error::{CertsealError, Result};
use ring::aead::{AES_256_GCM, Aad, LessSafeKey, NONCE_LEN, Nonce, UnboundKey};
use ring::rand::{SecureRandom, SystemRandom};
use tracing::{debug, instrument};
use zeroize::Zeroize;

/// Current envelope format.
pub const ENVELOPE_VERSION: u8 = 0x01;

/// Raw key length for AES-256.
pub const KEY_LEN: usize = 32;

const TAG_LEN: usize = 16;
const HEADER_LEN: usize = 1 + NONCE_LEN;

/// Per-certificate symmetric key.
///
/// Stored next to the ciphertext as lowercase hex text (see
/// [`EncryptionKey::encode`]).  The bytes are wiped when dropped.
#[derive(Clone, PartialEq, Eq)]
pub struct EncryptionKey {
    bytes: [u8; KEY_LEN],
}

impl EncryptionKey {
    fn generate(rng: &SystemRandom) -> Result<Self> {
        let mut bytes = [0u8; KEY_LEN];
        rng.fill(&mut bytes)
            .map_err(|e| CertsealError::Encryption(format!("key generation failed: {e}")))?;
        Ok(Self { bytes })
    }

    /// Text form written to the object store.
    pub fn encode(&self) -> Vec<u8> {
        hex::encode(self.bytes).into_bytes()
    }

    /// Parse a key previously produced by [`EncryptionKey::encode`].
    ///
    /// Surrounding whitespace is ignored.  Anything else that is not exactly
    /// 64 hex digits is a decryption error: a bad key can never open
    /// anything.
    pub fn decode(stored: &[u8]) -> Result<Self> {
        let text = std::str::from_utf8(stored)
            .map_err(|_| CertsealError::Decryption("stored key is not text".into()))?;
        let mut raw = hex::decode(text.trim())
            .map_err(|e| CertsealError::Decryption(format!("stored key is not hex: {e}")))?;

        let result = <[u8; KEY_LEN]>::try_from(raw.as_slice())
            .map(|bytes| Self { bytes })
            .map_err(|_| {
                CertsealError::Decryption(format!(
                    "stored key has {} bytes, expected {KEY_LEN}",
                    raw.len()
                ))
            });
        raw.zeroize();
        result
    }

    fn aead_key(&self) -> Result<LessSafeKey> {
        let unbound = UnboundKey::new(&AES_256_GCM, &self.bytes)
            .map_err(|e| CertsealError::Decryption(format!("key rejected: {e}")))?;
        Ok(LessSafeKey::new(unbound))
    }
}

impl Drop for EncryptionKey {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

impl std::fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncryptionKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// Stateless authenticated encryption of certificate payloads.
///
/// Holds only the system RNG handle, so one value can be shared freely
/// between threads; every call draws its own key and nonce.
pub struct PayloadCipher {
    rng: SystemRandom,
}

impl Default for PayloadCipher {
    fn default() -> Self {
        Self::new()
    }
}

impl PayloadCipher {
    pub fn new() -> Self {
        Self {
            rng: SystemRandom::new(),
        }
    }

    /// Encrypt `payload` under a newly generated key.
    ///
    /// Returns the sealed envelope and the key that opens it.  `password`
    /// only tells the caller where the key will be filed
    /// ([`DerivedPassword::key_object_name`]); no key material comes from it.
    #[instrument(skip_all, fields(payload_len = payload.len()))]
    pub fn encrypt(
        &self,
        payload: &[u8],
        _password: &DerivedPassword,
    ) -> Result<(Vec<u8>, EncryptionKey)> {
        let key = EncryptionKey::generate(&self.rng)?;
        let sealing_key = key
            .aead_key()
            .map_err(|e| CertsealError::Encryption(e.to_string()))?;

        let mut nonce_bytes = [0u8; NONCE_LEN];
        self.rng
            .fill(&mut nonce_bytes)
            .map_err(|e| CertsealError::Encryption(format!("nonce generation failed: {e}")))?;

        let mut sealed = Vec::with_capacity(HEADER_LEN + payload.len() + TAG_LEN);
        sealed.push(ENVELOPE_VERSION);
        sealed.extend_from_slice(&nonce_bytes);

        let mut in_out = payload.to_vec();
        sealing_key
            .seal_in_place_append_tag(
                Nonce::assume_unique_for_key(nonce_bytes),
                Aad::from([ENVELOPE_VERSION]),
                &mut in_out,
            )
            .map_err(|e| CertsealError::Encryption(format!("seal failed: {e}")))?;
        sealed.extend_from_slice(&in_out);

        debug!(ciphertext_len = sealed.len(), "encryption complete");
        Ok((sealed, key))
    }

    /// Read the file at `path` and encrypt its contents.
    ///
    /// An unreadable file surfaces as [`CertsealError::Io`], distinct from
    /// any cryptographic failure.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn encrypt_file(
        &self,
        path: impl AsRef<Path>,
        password: &DerivedPassword,
    ) -> Result<(Vec<u8>, EncryptionKey)> {
        let payload = std::fs::read(path.as_ref())?;
        self.encrypt(&payload, password)
    }

    /// Open an envelope produced by [`PayloadCipher::encrypt`].
    ///
    /// Wrong key, truncation, any flipped byte and unknown versions all fail
    /// with [`CertsealError::Decryption`]; no partial plaintext is returned.
    #[instrument(skip_all, fields(ciphertext_len = ciphertext.len()))]
    pub fn decrypt(&self, ciphertext: &[u8], key: &EncryptionKey) -> Result<Vec<u8>> {
        if ciphertext.len() < HEADER_LEN + TAG_LEN {
            return Err(CertsealError::Decryption(format!(
                "envelope too short ({} bytes)",
                ciphertext.len()
            )));
        }

        let (header, body) = ciphertext.split_at(HEADER_LEN);
        let version = header[0];
        if version != ENVELOPE_VERSION {
            return Err(CertsealError::Decryption(format!(
                "unsupported envelope version {version:#04x}"
            )));
        }

        let nonce = Nonce::try_assume_unique_for_key(&header[1..])
            .map_err(|e| CertsealError::Decryption(format!("bad nonce: {e}")))?;
        let opening_key = key.aead_key()?;

        let mut in_out = body.to_vec();
        let plaintext_len = opening_key
            .open_in_place(nonce, Aad::from([version]), &mut in_out)
            .map_err(|_| CertsealError::Decryption("authentication failed".into()))?
            .len();
        in_out.truncate(plaintext_len);

        debug!(plaintext_len, "decryption complete");
        Ok(in_out)
    }
}
