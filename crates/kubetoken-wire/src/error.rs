// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use thiserror::Error;

pub type WireResult<T> = Result<T, WireError>;

#[derive(Error, Debug)]
pub enum WireError {
	#[error("failed to encode {what}: {source}")]
	Encode {
		what: &'static str,
		#[source]
		source: serde_json::Error,
	},

	#[error("malformed {what}: {source}")]
	Decode {
		what: &'static str,
		#[source]
		source: serde_json::Error,
	},

	#[error("failed to write envelope: {0}")]
	Write(#[from] std::io::Error),
}
