// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Certseal: encrypted PDF certificate issuing and verification.
//
// Entry point. Initialises logging, builds the backend services once, and
// dispatches the requested command.

mod cli;
mod services;

use std::process::ExitCode;

use certseal_core::error::Result;
use certseal_core::human_errors::humanize_error;
use certseal_security::verify_hash;
use clap::Parser;

use cli::{Cli, Command};
use services::app_services::AppServices;
use services::data_dir;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(error = %e, "command failed");
            let human = humanize_error(&e);
            eprintln!("{}\n{}", human.message, human.suggestion);
            // Exit codes are small positive constants, always within u8.
            ExitCode::from(u8::try_from(human.severity.exit_code()).unwrap_or(1))
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let dir = data_dir::data_dir(cli.data_dir.as_deref())?;
    let services = AppServices::init(dir, cli.records)?;
    tracing::debug!(data_dir = %services.data_dir().display(), "services ready");
    let certificates = services.certificates();

    match cli.command {
        Command::Process { serial, pdf } => {
            let receipt = certificates.process_file(&serial, &pdf)?;
            println!("{}", serde_json::to_string_pretty(&receipt)?);
        }
        Command::Verify {
            serial,
            dob,
            out,
            expect_hash,
        } => {
            let pdf = certificates.verify(&serial, &dob)?;
            if let Some(expected) = expect_hash {
                verify_hash(&pdf, &expected)?;
            }
            std::fs::write(&out, &pdf)?;
            tracing::info!(path = %out.display(), bytes = pdf.len(), "certificate written");
        }
        Command::Audit { limit, serial } => {
            let entries = match serial {
                Some(serial) => certificates.audit_for_serial(&serial)?,
                None => certificates.recent_audit(limit)?,
            };
            let total = certificates.audit_total()?;
            tracing::info!(shown = entries.len(), total, "audit entries");
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
    }
    Ok(())
}
