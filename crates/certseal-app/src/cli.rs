// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command-line definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Certseal - issue and verify encrypted PDF certificates
#[derive(Debug, Parser)]
#[command(name = "certseal")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Data directory holding config.json, stored objects and the audit log
    #[arg(long, global = true, env = "CERTSEAL_DATA_DIR", value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// CSV file mapping serial_number to dob (overrides config.json)
    #[arg(long, global = true, env = "CERTSEAL_RECORDS", value_name = "CSV")]
    pub records: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Encrypt a certificate PDF and store it with its key
    Process {
        /// Serial number printed on the certificate
        #[arg(long)]
        serial: String,

        /// Certificate PDF to seal
        #[arg(long, value_name = "PATH")]
        pdf: PathBuf,
    },

    /// Decrypt a stored certificate given its serial number and date of birth
    Verify {
        #[arg(long)]
        serial: String,

        /// Holder's date of birth as DD-MM-YYYY
        #[arg(long, value_name = "DD-MM-YYYY")]
        dob: String,

        /// Where to write the decrypted PDF
        #[arg(long, value_name = "PATH")]
        out: PathBuf,

        /// SHA-256 from the issue receipt; the download must match it
        #[arg(long, value_name = "HEX")]
        expect_hash: Option<String>,
    },

    /// Show audit log entries
    Audit {
        #[arg(long, default_value_t = 20)]
        limit: u32,

        /// Every entry for one serial number instead of the most recent
        #[arg(long, conflicts_with = "limit")]
        serial: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_verify() {
        let cli = Cli::try_parse_from([
            "certseal",
            "--data-dir",
            "/tmp/certseal",
            "verify",
            "--serial",
            "SERIAL0001",
            "--dob",
            "05-01-1990",
            "--out",
            "cert.pdf",
        ])
        .unwrap();

        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/certseal")));
        match cli.command {
            Command::Verify {
                serial,
                dob,
                expect_hash,
                ..
            } => {
                assert_eq!(serial, "SERIAL0001");
                assert_eq!(dob, "05-01-1990");
                assert!(expect_hash.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn audit_limit_defaults() {
        let cli = Cli::try_parse_from(["certseal", "audit"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Audit {
                limit: 20,
                serial: None
            }
        ));
    }

    #[test]
    fn audit_by_serial() {
        let cli = Cli::try_parse_from(["certseal", "audit", "--serial", "SERIAL0001"]).unwrap();
        match cli.command {
            Command::Audit { serial, .. } => assert_eq!(serial.as_deref(), Some("SERIAL0001")),
            other => panic!("unexpected command: {other:?}"),
        }
        assert!(
            Cli::try_parse_from(["certseal", "audit", "--serial", "S", "--limit", "5"]).is_err()
        );
    }
}
