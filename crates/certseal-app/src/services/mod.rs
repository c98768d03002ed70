// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Service layer: wires the backend crates together for the command line.
//
// `CertificateService` owns the process/verify pipeline and receives every
// collaborator it uses; `AppServices` builds those collaborators once from
// the data directory and configuration.

pub mod app_services;
pub mod certificate_service;
pub mod data_dir;
