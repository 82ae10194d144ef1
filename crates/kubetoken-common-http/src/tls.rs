// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! TLS trust policy applied to both the review and the request endpoint.

use std::path::{Path, PathBuf};

use reqwest::{Certificate, ClientBuilder};
use tracing::{debug, warn};

use crate::HttpError;

/// Which server certificates the client accepts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TlsTrust {
	/// PEM bundle that replaces the built-in trust roots when set.
	pub ca_cert: Option<PathBuf>,
	/// Accept any server certificate. Insecure.
	pub skip_verification: bool,
}

impl TlsTrust {
	/// Apply this trust policy to a client builder.
	///
	/// A custom CA bundle becomes the only trust anchor; the built-in roots
	/// are turned off so a private cluster CA cannot be bypassed by a public one.
	pub fn apply(&self, mut builder: ClientBuilder) -> Result<ClientBuilder, HttpError> {
		if let Some(path) = &self.ca_cert {
			let certs = load_pem_bundle(path)?;
			debug!(path = %path.display(), count = certs.len(), "loaded custom CA bundle");
			builder = builder.tls_built_in_root_certs(false);
			for cert in certs {
				builder = builder.add_root_certificate(cert);
			}
		}

		if self.skip_verification {
			warn!("TLS certificate verification is disabled");
			builder = builder.danger_accept_invalid_certs(true);
		}

		Ok(builder)
	}
}

fn load_pem_bundle(path: &Path) -> Result<Vec<Certificate>, HttpError> {
	let pem = std::fs::read(path).map_err(|source| HttpError::ReadCaCert {
		path: path.to_path_buf(),
		source,
	})?;

	let certs = Certificate::from_pem_bundle(&pem).map_err(|source| HttpError::InvalidCaCert {
		path: path.to_path_buf(),
		source,
	})?;

	if certs.is_empty() {
		return Err(HttpError::NoCertificates(path.to_path_buf()));
	}
	Ok(certs)
}
