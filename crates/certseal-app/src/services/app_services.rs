// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Central service layer: builds every backend collaborator once from the
// data directory and configuration, then hands them to the certificate
// service.

use std::path::{Path, PathBuf};

use certseal_core::AppConfig;
use certseal_core::config::StoreBackend;
use certseal_core::error::Result;
use certseal_security::AuditLog;
use certseal_store::{
    CsvRecords, DirectoryStore, MemoryRecords, ObjectStore, RecordLookup, SqliteStore,
};
use tracing::{info, warn};

use super::certificate_service::CertificateService;

const CONFIG_FILE: &str = "config.json";

/// Everything the command line needs, constructed at startup.
pub struct AppServices {
    data_dir: PathBuf,
    certificates: CertificateService,
}

impl AppServices {
    /// Initialise all services.  Call once at startup.
    ///
    /// Writes a default `config.json` on first run.  A missing records file
    /// is only a warning, because verification never reads it.
    pub fn init(data_dir: PathBuf, records_override: Option<PathBuf>) -> Result<Self> {
        info!(path = %data_dir.display(), "initialising app services");

        let mut config = load_config(&data_dir)?;
        if let Some(records_path) = records_override {
            config.records_path = records_path;
        }

        let store = open_store(&data_dir, config.store_backend)?;
        let records = open_records(&super::data_dir::resolve(&data_dir, &config.records_path))?;
        let audit = if config.audit_enabled {
            Some(AuditLog::open(data_dir.join("audit.db"))?)
        } else {
            None
        };

        info!(backend = ?config.store_backend, audit = config.audit_enabled, "app services initialised");

        Ok(Self {
            certificates: CertificateService::new(config, store, records, audit),
            data_dir,
        })
    }

    pub fn certificates(&self) -> &CertificateService {
        &self.certificates
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

fn open_store(data_dir: &Path, backend: StoreBackend) -> Result<Box<dyn ObjectStore>> {
    let store: Box<dyn ObjectStore> = match backend {
        StoreBackend::Directory => Box::new(DirectoryStore::open(data_dir.join("objects"))?),
        StoreBackend::Sqlite => Box::new(SqliteStore::open(data_dir.join("objects.db"))?),
    };
    Ok(store)
}

fn open_records(path: &Path) -> Result<Box<dyn RecordLookup>> {
    if path.is_file() {
        Ok(Box::new(CsvRecords::load(path)?))
    } else {
        warn!(path = %path.display(), "records file not found; processing will fail");
        Ok(Box::new(MemoryRecords::new()))
    }
}

/// Load `config.json`, writing the defaults first if it does not exist.
fn load_config(data_dir: &Path) -> Result<AppConfig> {
    let path = data_dir.join(CONFIG_FILE);
    if !path.exists() {
        let config = AppConfig::default();
        persist_config(data_dir, &config)?;
        return Ok(config);
    }
    let data = std::fs::read_to_string(&path)?;
    Ok(serde_json::from_str(&data)?)
}

fn persist_config(data_dir: &Path, config: &AppConfig) -> Result<()> {
    let path = data_dir.join(CONFIG_FILE);
    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(&path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use certseal_core::error::CertsealError;
    use certseal_document::blank_pdf;

    #[test]
    fn first_run_writes_default_config() {
        let dir = tempfile::tempdir().unwrap();
        AppServices::init(dir.path().to_path_buf(), None).unwrap();

        let written = std::fs::read_to_string(dir.path().join(CONFIG_FILE)).unwrap();
        let config: AppConfig = serde_json::from_str(&written).unwrap();
        assert_eq!(config.store_backend, StoreBackend::Directory);
    }

    #[test]
    fn broken_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "{ not json").unwrap();
        assert!(matches!(
            AppServices::init(dir.path().to_path_buf(), None),
            Err(CertsealError::Serialization(_))
        ));
    }

    #[test]
    fn end_to_end_with_sqlite_backend() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig {
            store_backend: StoreBackend::Sqlite,
            ..AppConfig::default()
        };
        persist_config(dir.path(), &config).unwrap();
        std::fs::write(
            dir.path().join("certificates.csv"),
            "serial_number,dob\nSERIAL0001,05-01-1990\n",
        )
        .unwrap();

        let services = AppServices::init(dir.path().to_path_buf(), None).unwrap();
        let pdf = blank_pdf(1).unwrap();
        services.certificates().process("SERIAL0001", &pdf).unwrap();
        assert!(dir.path().join("objects.db").is_file());

        let reopened = AppServices::init(dir.path().to_path_buf(), None).unwrap();
        assert_eq!(
            reopened.certificates().verify("SERIAL0001", "05-01-1990").unwrap(),
            pdf
        );
    }

    #[test]
    fn records_override_is_used() {
        let dir = tempfile::tempdir().unwrap();
        let records = dir.path().join("elsewhere.csv");
        std::fs::write(&records, "serial_number,dob\nSERIAL0007,01-07-2001\n").unwrap();

        let services = AppServices::init(dir.path().to_path_buf(), Some(records)).unwrap();
        let receipt = services
            .certificates()
            .process("SERIAL0007", &blank_pdf(1).unwrap())
            .unwrap();
        assert_eq!(receipt.serial_number.as_str(), "SERIAL0007");
        assert!(dir.path().join("objects").join("SERIAL0007.pdf").is_file());
        assert!(dir.path().join("objects").join("2001jul01_key").is_file());
    }
}
