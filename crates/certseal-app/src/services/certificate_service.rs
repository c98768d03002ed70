// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Certificate pipeline: issue (process) and verify.
//
// Issue:  serial -> DOB (records) -> password -> random key + ciphertext
//         -> put `{serial}.pdf` and `{password}_key` -> verification URL.
// Verify: DOB -> password -> get both objects -> decrypt.
//
// Every verification failure past input validation leaves this module as
// `CertsealError::VerificationFailed`.  The real cause goes to the debug log
// and the audit trail only.
//
// Two holders sharing a date of birth share a key object name; issuing the
// second certificate replaces the first holder's key.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use certseal_core::error::{CertsealError, Result};
use certseal_core::{AppConfig, DateOfBirth, ProcessReceipt, SerialNumber};
use certseal_document::CertificateDocument;
use certseal_security::audit::{AuditEntry, AuditLog};
use certseal_security::{EncryptionKey, PayloadCipher, derive_password, hash_bytes};
use certseal_store::{ObjectStore, RecordLookup, validate_object_name};
use chrono::Utc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

const ACTION_PROCESS: &str = "process";
const ACTION_VERIFY: &str = "verify";

pub struct CertificateService {
    config: AppConfig,
    store: Box<dyn ObjectStore>,
    records: Box<dyn RecordLookup>,
    audit: Option<Mutex<AuditLog>>,
    cipher: PayloadCipher,
}

impl CertificateService {
    pub fn new(
        config: AppConfig,
        store: Box<dyn ObjectStore>,
        records: Box<dyn RecordLookup>,
        audit: Option<AuditLog>,
    ) -> Self {
        Self {
            config,
            store,
            records,
            audit: audit.map(Mutex::new),
            cipher: PayloadCipher::new(),
        }
    }

    // -- Issue ---------------------------------------------------------------

    /// Encrypt and store a certificate for `serial`.
    #[instrument(skip(self, pdf), fields(pdf_len = pdf.len()))]
    pub fn process(&self, serial: &str, pdf: &[u8]) -> Result<ProcessReceipt> {
        let outcome = SerialNumber::parse(serial).and_then(|serial| self.seal(&serial, pdf));

        match &outcome {
            Ok(receipt) => {
                self.record_audit(
                    ACTION_PROCESS,
                    receipt.serial_number.as_str(),
                    Some(&receipt.document_hash),
                    true,
                    Some(&receipt.receipt_id.to_string()),
                );
                info!(serial = %receipt.serial_number, "certificate processed");
            }
            Err(e) => {
                self.record_audit(ACTION_PROCESS, serial.trim(), None, false, Some(&e.to_string()));
                warn!(error = %e, "certificate processing failed");
            }
        }
        outcome
    }

    /// Read the certificate at `path`, then [`process`](Self::process) it.
    pub fn process_file(&self, serial: &str, path: impl AsRef<Path>) -> Result<ProcessReceipt> {
        let pdf = std::fs::read(path.as_ref())?;
        self.process(serial, &pdf)
    }

    fn seal(&self, serial: &SerialNumber, pdf: &[u8]) -> Result<ProcessReceipt> {
        let dob = self
            .records
            .dob_for(serial)?
            .ok_or_else(|| CertsealError::MissingRecord(serial.to_string()))?;
        let password = derive_password(&dob)?;

        // Check both names before writing anything, so a bad key name
        // cannot leave an orphaned ciphertext behind.
        let ciphertext_name = serial.ciphertext_object_name();
        let key_name = password.key_object_name();
        validate_object_name(&ciphertext_name)?;
        validate_object_name(&key_name)?;

        let page_count = if self.config.require_pdf {
            Some(CertificateDocument::from_bytes(pdf)?.page_count())
        } else {
            None
        };

        let document_hash = hash_bytes(pdf);
        let (ciphertext, key) = self.cipher.encrypt(pdf, &password)?;

        self.store.put(&ciphertext_name, &ciphertext)?;
        self.store.put(&key_name, &key.encode())?;
        debug!(ciphertext_len = ciphertext.len(), "certificate objects stored");

        Ok(ProcessReceipt {
            receipt_id: Uuid::new_v4(),
            verification_url: self.config.verification_url(serial),
            serial_number: serial.clone(),
            document_hash,
            page_count,
            ciphertext_len: ciphertext.len(),
            issued_at: Utc::now(),
        })
    }

    // -- Verify --------------------------------------------------------------

    /// Return the decrypted certificate when `serial` and `dob` match.
    ///
    /// A blank `serial` is rejected as [`CertsealError::InvalidSerial`], and
    /// a `dob` that is not exactly `DD-MM-YYYY` (surrounding whitespace
    /// included, or with `strict_dates` not a real date) as
    /// [`CertsealError::MalformedDate`], before anything is looked up.
    /// Every later failure is [`CertsealError::VerificationFailed`].
    #[instrument(skip(self, dob))]
    pub fn verify(&self, serial: &str, dob: &str) -> Result<Vec<u8>> {
        let serial = SerialNumber::parse(serial)?;
        let dob = DateOfBirth::new(dob);
        if !dob.has_canonical_shape() {
            return Err(CertsealError::MalformedDate(
                "date of birth must be in DD-MM-YYYY format".into(),
            ));
        }
        if self.config.strict_dates && dob.calendar_date().is_none() {
            return Err(CertsealError::MalformedDate(
                "date of birth is not a calendar date".into(),
            ));
        }

        match self.open(&serial, &dob) {
            Ok(pdf) => {
                let document_hash = hash_bytes(&pdf);
                self.record_audit(ACTION_VERIFY, serial.as_str(), Some(&document_hash), true, None);
                info!("certificate verified");
                Ok(pdf)
            }
            Err(cause) => {
                debug!(error = %cause, "verification failed");
                self.record_audit(
                    ACTION_VERIFY,
                    serial.as_str(),
                    None,
                    false,
                    Some(&cause.to_string()),
                );
                Err(CertsealError::VerificationFailed)
            }
        }
    }

    fn open(&self, serial: &SerialNumber, dob: &DateOfBirth) -> Result<Vec<u8>> {
        let password = derive_password(dob)?;

        let ciphertext = self
            .store
            .get(&serial.ciphertext_object_name())?
            .ok_or_else(|| CertsealError::MissingRecord(serial.to_string()))?;
        let stored_key = self
            .store
            .get(&password.key_object_name())?
            .ok_or_else(|| CertsealError::Decryption("no key stored for that date of birth".into()))?;

        let key = EncryptionKey::decode(&stored_key)?;
        self.cipher.decrypt(&ciphertext, &key)
    }

    // -- Audit ---------------------------------------------------------------

    /// Most recent audit entries, newest first.
    pub fn recent_audit(&self, limit: u32) -> Result<Vec<AuditEntry>> {
        self.audit_log()?.recent_entries(limit)
    }

    /// Every audit entry for one serial number, oldest first.
    pub fn audit_for_serial(&self, serial: &str) -> Result<Vec<AuditEntry>> {
        let serial = SerialNumber::parse(serial)?;
        self.audit_log()?.entries_for_serial(serial.as_str())
    }

    /// Number of entries in the audit log.
    pub fn audit_total(&self) -> Result<u64> {
        self.audit_log()?.count()
    }

    fn audit_log(&self) -> Result<MutexGuard<'_, AuditLog>> {
        self.audit
            .as_ref()
            .ok_or_else(|| CertsealError::Config("audit logging is disabled".into()))?
            .lock()
            .map_err(|_| CertsealError::Database("audit log lock poisoned".into()))
    }

    /// Best effort: an unwritable audit log never fails the operation.
    fn record_audit(
        &self,
        action: &str,
        serial: &str,
        document_hash: Option<&str>,
        success: bool,
        details: Option<&str>,
    ) {
        let Some(audit) = &self.audit else {
            return;
        };
        let recorded = match audit.lock() {
            Ok(log) => log.record(action, serial, document_hash, success, details),
            Err(_) => Err(CertsealError::Database("audit log lock poisoned".into())),
        };
        if let Err(e) = recorded {
            warn!(error = %e, action, "audit entry not recorded");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use certseal_document::blank_pdf;
    use certseal_store::{MemoryRecords, MemoryStore};

    use super::*;

    /// Shares one `MemoryStore` between the service and the test body.
    struct SharedStore(Arc<MemoryStore>);

    impl ObjectStore for SharedStore {
        fn put(&self, name: &str, bytes: &[u8]) -> Result<()> {
            self.0.put(name, bytes)
        }

        fn get(&self, name: &str) -> Result<Option<Vec<u8>>> {
            self.0.get(name)
        }
    }

    fn records() -> MemoryRecords {
        let mut records = MemoryRecords::new();
        records.insert("SERIAL0001", "05-01-1990");
        records.insert("SERIAL0002", "17-08-1984");
        records.insert("SERIAL0003", "05-13-1990");
        records.insert("SERIAL0004", "05-01-19/90");
        records
    }

    fn service_with(config: AppConfig) -> (CertificateService, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let service = CertificateService::new(
            config,
            Box::new(SharedStore(Arc::clone(&store))),
            Box::new(records()),
            Some(AuditLog::open_in_memory().unwrap()),
        );
        (service, store)
    }

    fn raw_bytes_service() -> (CertificateService, Arc<MemoryStore>) {
        service_with(AppConfig {
            require_pdf: false,
            ..AppConfig::default()
        })
    }

    #[test]
    fn process_then_verify_round_trip() {
        let (service, store) = raw_bytes_service();
        let payload = b"0123456789";

        let receipt = service.process("SERIAL0001", payload).unwrap();
        assert_eq!(receipt.serial_number.as_str(), "SERIAL0001");
        assert_eq!(
            receipt.verification_url,
            "http://localhost:5000/verify?serial=SERIAL0001"
        );
        assert_eq!(receipt.document_hash, hash_bytes(payload));
        assert!(receipt.page_count.is_none());

        assert!(store.exists("SERIAL0001.pdf").unwrap());
        assert!(store.exists("1990jan05_key").unwrap());

        let pdf = service.verify("SERIAL0001", "05-01-1990").unwrap();
        assert_eq!(pdf, payload);
    }

    #[test]
    fn stored_key_is_not_the_password() {
        let (service, store) = raw_bytes_service();
        service.process("SERIAL0001", b"payload").unwrap();

        let stored_key = store.get("1990jan05_key").unwrap().unwrap();
        assert!(!String::from_utf8_lossy(&stored_key).contains("1990jan05"));
        assert!(EncryptionKey::decode(&stored_key).is_ok());
    }

    #[test]
    fn pdf_is_inspected_when_required() {
        let (service, _) = service_with(AppConfig::default());
        let pdf = blank_pdf(2).unwrap();

        let receipt = service.process("SERIAL0002", &pdf).unwrap();
        assert_eq!(receipt.page_count, Some(2));
        assert_eq!(service.verify("SERIAL0002", "17-08-1984").unwrap(), pdf);
    }

    #[test]
    fn non_pdf_is_rejected_when_required() {
        let (service, store) = service_with(AppConfig::default());
        let result = service.process("SERIAL0001", b"0123456789");
        assert!(matches!(result, Err(CertsealError::InvalidDocument(_))));
        assert!(store.is_empty());
    }

    #[test]
    fn unknown_serial_is_missing_record() {
        let (service, _) = raw_bytes_service();
        assert!(matches!(
            service.process("SERIAL0404", b"x"),
            Err(CertsealError::MissingRecord(_))
        ));
    }

    #[test]
    fn bad_month_in_records_fails_process() {
        let (service, store) = raw_bytes_service();
        assert!(matches!(
            service.process("SERIAL0003", b"x"),
            Err(CertsealError::MalformedDate(_))
        ));
        assert!(store.is_empty());
    }

    #[test]
    fn unstorable_key_name_writes_nothing() {
        let (service, store) = raw_bytes_service();
        assert!(matches!(
            service.process("SERIAL0004", b"x"),
            Err(CertsealError::InvalidObjectName(_))
        ));
        assert!(store.is_empty());
    }

    #[test]
    fn verification_failures_are_indistinguishable() {
        let (service, store) = raw_bytes_service();
        service.process("SERIAL0001", b"payload one").unwrap();
        service.process("SERIAL0002", b"payload two").unwrap();

        let wrong_dob = service.verify("SERIAL0001", "06-01-1990").unwrap_err();
        let wrong_serial = service.verify("SERIAL0404", "05-01-1990").unwrap_err();
        let swapped = service.verify("SERIAL0001", "17-08-1984").unwrap_err();

        let mut corrupted = store.get("SERIAL0002.pdf").unwrap().unwrap();
        let last = corrupted.len() - 1;
        corrupted[last] ^= 0xff;
        store.put("SERIAL0002.pdf", &corrupted).unwrap();
        let tampered = service.verify("SERIAL0002", "17-08-1984").unwrap_err();

        for err in [wrong_dob, wrong_serial, swapped, tampered] {
            assert!(matches!(err, CertsealError::VerificationFailed));
            assert_eq!(err.to_string(), "certificate verification failed");
        }
    }

    #[test]
    fn malformed_dob_is_rejected_before_lookup() {
        let (service, _) = raw_bytes_service();
        service.process("SERIAL0001", b"payload").unwrap();

        for dob in [
            "5-1-1990",
            "1990-01-05",
            "05/01/1990",
            "",
            " 05-01-1990\n",
            "05-01-1990 ",
        ] {
            assert!(
                matches!(
                    service.verify("SERIAL0001", dob),
                    Err(CertsealError::MalformedDate(_))
                ),
                "{dob:?} should be malformed"
            );
        }
        // Shape is fine, month is not: falls through to the generic failure.
        assert!(matches!(
            service.verify("SERIAL0001", "05-13-1990"),
            Err(CertsealError::VerificationFailed)
        ));
    }

    #[test]
    fn blank_serial_is_invalid_input() {
        let (service, store) = raw_bytes_service();
        assert!(matches!(
            service.process("   ", b"payload"),
            Err(CertsealError::InvalidSerial(_))
        ));
        assert!(matches!(
            service.verify("", "05-01-1990"),
            Err(CertsealError::InvalidSerial(_))
        ));
        assert!(store.is_empty());
    }

    #[test]
    fn strict_dates_reject_impossible_calendar_dates() {
        let (service, _) = service_with(AppConfig {
            require_pdf: false,
            strict_dates: true,
            ..AppConfig::default()
        });
        assert!(matches!(
            service.verify("SERIAL0001", "31-02-1990"),
            Err(CertsealError::MalformedDate(_))
        ));
    }

    #[test]
    fn reprocessing_overwrites_previous_artifacts() {
        let (service, _) = raw_bytes_service();
        service.process("SERIAL0001", b"first issue").unwrap();
        service.process("SERIAL0001", b"second issue").unwrap();
        assert_eq!(
            service.verify("SERIAL0001", "05-01-1990").unwrap(),
            b"second issue"
        );
    }

    #[test]
    fn shared_birthday_replaces_earlier_key() {
        let mut records = MemoryRecords::new();
        records.insert("SERIAL0001", "05-01-1990");
        records.insert("SERIAL0009", "05-01-1990");
        let service = CertificateService::new(
            AppConfig {
                require_pdf: false,
                ..AppConfig::default()
            },
            Box::new(MemoryStore::new()),
            Box::new(records),
            None,
        );

        service.process("SERIAL0001", b"first holder").unwrap();
        service.process("SERIAL0009", b"second holder").unwrap();

        assert!(service.verify("SERIAL0001", "05-01-1990").is_err());
        assert_eq!(
            service.verify("SERIAL0009", "05-01-1990").unwrap(),
            b"second holder"
        );
    }

    #[test]
    fn process_file_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("certificate.pdf");
        std::fs::write(&path, blank_pdf(1).unwrap()).unwrap();

        let (service, _) = service_with(AppConfig::default());
        let receipt = service.process_file("SERIAL0001", &path).unwrap();
        assert_eq!(receipt.page_count, Some(1));

        assert!(matches!(
            service.process_file("SERIAL0001", dir.path().join("missing.pdf")),
            Err(CertsealError::Io(_))
        ));
    }

    #[test]
    fn audit_trail_records_outcomes() {
        let (service, _) = raw_bytes_service();
        service.process("SERIAL0001", b"payload").unwrap();
        service.verify("SERIAL0001", "05-01-1990").unwrap();
        let _ = service.verify("SERIAL0001", "06-01-1990");

        let entries = service.recent_audit(10).unwrap();
        assert_eq!(entries.len(), 3);

        let failed = &entries[0];
        assert_eq!(failed.action, "verify");
        assert!(!failed.success);
        assert!(failed.details.is_some());

        assert!(entries[1].success);
        assert_eq!(entries[1].document_hash, entries[2].document_hash);

        service.process("SERIAL0002", b"other").unwrap();
        assert_eq!(service.audit_total().unwrap(), 4);

        let history = service.audit_for_serial(" SERIAL0001 ").unwrap();
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].action, "process");
        assert!(history.iter().all(|e| e.serial_number == "SERIAL0001"));
    }

    #[test]
    fn audit_disabled_reports_config_error() {
        let service = CertificateService::new(
            AppConfig::default(),
            Box::new(MemoryStore::new()),
            Box::new(MemoryRecords::new()),
            None,
        );
        assert!(matches!(
            service.recent_audit(5),
            Err(CertsealError::Config(_))
        ));
        assert!(matches!(service.audit_total(), Err(CertsealError::Config(_))));
    }

    #[test]
    fn broken_audit_log_does_not_fail_operations() {
        let dir = tempfile::tempdir().unwrap();
        let audit_path = dir.path().join("audit.db");
        let audit = AuditLog::open(&audit_path).unwrap();
        rusqlite::Connection::open(&audit_path)
            .unwrap()
            .execute_batch("DROP TABLE audit_log;")
            .unwrap();

        let service = CertificateService::new(
            AppConfig {
                require_pdf: false,
                ..AppConfig::default()
            },
            Box::new(MemoryStore::new()),
            Box::new(records()),
            Some(audit),
        );

        let receipt = service.process("SERIAL0001", b"payload").unwrap();
        assert_eq!(receipt.serial_number.as_str(), "SERIAL0001");
        assert_eq!(service.verify("SERIAL0001", "05-01-1990").unwrap(), b"payload");
        assert!(matches!(
            service.verify("SERIAL0001", "06-01-1990"),
            Err(CertsealError::VerificationFailed)
        ));
        assert!(service.recent_audit(10).is_err());
    }
}
