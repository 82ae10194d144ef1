// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Cache error types.

use std::path::PathBuf;

/// Errors that can occur reading or writing the token cache.
///
/// None of these stop the plugin: a failed read means "no cached token" and
/// a failed write only costs a prompt on the next run.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
	#[error("failed to read token cache {path}: {source}")]
	Read {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("failed to write token cache {path}: {source}")]
	Write {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("failed to restrict permissions on {path}: {source}")]
	Permission {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},
}
