// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while constructing the HTTP client.
#[derive(Error, Debug)]
pub enum HttpError {
	#[error("failed to read CA certificate {path}: {source}")]
	ReadCaCert {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("invalid CA certificate {path}: {source}")]
	InvalidCaCert {
		path: PathBuf,
		#[source]
		source: reqwest::Error,
	},

	#[error("no PEM certificates found in {0}")]
	NoCertificates(PathBuf),

	#[error("failed to build HTTP client: {0}")]
	Build(#[from] reqwest::Error),
}
