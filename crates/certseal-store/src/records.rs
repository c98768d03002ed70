// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Certificate records: who a serial number was issued to, reduced to the
// one fact the pipeline needs: the holder's date of birth.
//
// The CSV loader understands a header row naming `serial_number` and `dob`
// columns in any order, alongside any other columns.  When a serial number
// appears more than once the first row is the record.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::path::Path;

use certseal_core::error::{CertsealError, Result};
use certseal_core::{DateOfBirth, SerialNumber};
use tracing::{info, instrument, warn};

const SERIAL_COLUMN: &str = "serial_number";
const DOB_COLUMN: &str = "dob";

/// Serial number to date-of-birth lookup.
pub trait RecordLookup: Send + Sync {
    /// `Ok(None)` when the serial number is unknown.
    fn dob_for(&self, serial: &SerialNumber) -> Result<Option<DateOfBirth>>;
}

/// Records held in a map.
#[derive(Debug, Default)]
pub struct MemoryRecords {
    by_serial: HashMap<String, DateOfBirth>,
}

impl MemoryRecords {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, serial: &str, dob: &str) {
        self.by_serial
            .insert(serial.trim().to_owned(), DateOfBirth::new(dob.trim()));
    }

    pub fn len(&self) -> usize {
        self.by_serial.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_serial.is_empty()
    }
}

impl RecordLookup for MemoryRecords {
    fn dob_for(&self, serial: &SerialNumber) -> Result<Option<DateOfBirth>> {
        Ok(self.by_serial.get(serial.as_str()).cloned())
    }
}

/// Records loaded once from a CSV file.
#[derive(Debug)]
pub struct CsvRecords {
    records: MemoryRecords,
}

impl CsvRecords {
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let records = Self::parse(&text)?;
        info!(records = records.records.len(), "certificate records loaded");
        Ok(records)
    }

    pub fn parse(text: &str) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(text.as_bytes());

        let header = reader.headers().map_err(csv_err)?.clone();
        if header.iter().all(str::is_empty) {
            return Err(CertsealError::Config("records file is empty".into()));
        }
        let serial_idx = column_index(&header, SERIAL_COLUMN)?;
        let dob_idx = column_index(&header, DOB_COLUMN)?;

        let mut by_serial = HashMap::new();
        for row in reader.records() {
            let row = row.map_err(csv_err)?;
            let line = row.position().map_or(0, |pos| pos.line());
            match (row.get(serial_idx), row.get(dob_idx)) {
                (Some(serial), Some(dob)) if !serial.is_empty() => {
                    match by_serial.entry(serial.to_owned()) {
                        Entry::Vacant(slot) => {
                            slot.insert(DateOfBirth::new(dob));
                        }
                        Entry::Occupied(_) => {
                            warn!(line, "duplicate serial number; keeping the first record")
                        }
                    }
                }
                _ => warn!(line, "skipping incomplete record row"),
            }
        }

        Ok(Self {
            records: MemoryRecords { by_serial },
        })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl RecordLookup for CsvRecords {
    fn dob_for(&self, serial: &SerialNumber) -> Result<Option<DateOfBirth>> {
        self.records.dob_for(serial)
    }
}

fn csv_err(e: csv::Error) -> CertsealError {
    CertsealError::Config(format!("records file: {e}"))
}

fn column_index(header: &csv::StringRecord, name: &str) -> Result<usize> {
    header
        .iter()
        .position(|column| column.trim_start_matches('\u{feff}') == name)
        .ok_or_else(|| CertsealError::Config(format!("records file has no {name:?} column")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn serial(raw: &str) -> SerialNumber {
        SerialNumber::parse(raw).unwrap()
    }

    #[test]
    fn parses_basic_file() {
        let records =
            CsvRecords::parse("serial_number,dob\nSERIAL0001,05-01-1990\nSERIAL0002,17-08-1984\n")
                .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(
            records.dob_for(&serial("SERIAL0002")).unwrap(),
            Some(DateOfBirth::new("17-08-1984"))
        );
    }

    #[test]
    fn columns_in_any_order_with_extras() {
        let text = "name,dob,serial_number\n\"Ada Lovelace\", 10-12-1815 , SERIAL0003\n";
        let records = CsvRecords::parse(text).unwrap();
        assert_eq!(
            records.dob_for(&serial("SERIAL0003")).unwrap(),
            Some(DateOfBirth::new("10-12-1815"))
        );
    }

    #[test]
    fn lookup_trims_serial() {
        let records = CsvRecords::parse("serial_number,dob\n  SERIAL0001  ,05-01-1990\n").unwrap();
        assert!(records.dob_for(&serial(" SERIAL0001 ")).unwrap().is_some());
    }

    #[test]
    fn quoted_fields_and_bom_are_handled() {
        let text = "\u{feff}serial_number,dob\r\n\"SERIAL0001\",\"05-01-1990\"\r\n";
        let records = CsvRecords::parse(text).unwrap();
        assert_eq!(
            records.dob_for(&serial("SERIAL0001")).unwrap(),
            Some(DateOfBirth::new("05-01-1990"))
        );
    }

    #[test]
    fn quoted_commas_stay_inside_their_field() {
        let name_first = "name,serial_number,dob\n\"Lovelace, Ada\",SERIAL0001,05-01-1990\n";
        let records = CsvRecords::parse(name_first).unwrap();
        assert_eq!(
            records.dob_for(&serial("SERIAL0001")).unwrap(),
            Some(DateOfBirth::new("05-01-1990"))
        );

        let name_between = "serial_number,name,dob\nSERIAL0001,\"Lovelace, Ada\",05-01-1990\n";
        let records = CsvRecords::parse(name_between).unwrap();
        assert_eq!(
            records.dob_for(&serial("SERIAL0001")).unwrap(),
            Some(DateOfBirth::new("05-01-1990"))
        );
    }

    #[test]
    fn first_row_wins_for_duplicate_serials() {
        let text = "serial_number,dob\nSERIAL0001,05-01-1990\nSERIAL0001,17-08-1984\n";
        let records = CsvRecords::parse(text).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(
            records.dob_for(&serial("SERIAL0001")).unwrap(),
            Some(DateOfBirth::new("05-01-1990"))
        );
    }

    #[test]
    fn unknown_serial_is_none() {
        let records = CsvRecords::parse("serial_number,dob\nSERIAL0001,05-01-1990\n").unwrap();
        assert!(records.dob_for(&serial("SERIAL0404")).unwrap().is_none());
    }

    #[test]
    fn short_rows_are_skipped() {
        let records =
            CsvRecords::parse("serial_number,dob\nSERIAL0001\n\nSERIAL0002,01-02-2003\n").unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn missing_column_is_config_error() {
        assert!(matches!(
            CsvRecords::parse("serial,birthday\nSERIAL0001,05-01-1990\n"),
            Err(CertsealError::Config(_))
        ));
        assert!(matches!(CsvRecords::parse(""), Err(CertsealError::Config(_))));
    }

    #[test]
    fn missing_file_is_io_error() {
        assert!(matches!(
            CsvRecords::load("/nonexistent/certificates.csv"),
            Err(CertsealError::Io(_))
        ));
    }

    #[test]
    fn load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("certificates.csv");
        std::fs::write(&path, "serial_number,dob\nSERIAL0001,05-01-1990\n").unwrap();
        assert_eq!(CsvRecords::load(&path).unwrap().len(), 1);
    }
}
