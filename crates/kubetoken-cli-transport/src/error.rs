// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for the token transport.

use kubetoken_common_http::HttpError;
use kubetoken_wire::WireError;
use thiserror::Error;
use url::Url;

/// Longest server error body kept in a [`TransportError::Status`].
pub const MAX_ERROR_BODY: usize = 512;

/// Errors from the review and token request calls.
#[derive(Error, Debug)]
pub enum TransportError {
	/// The HTTP client could not be built (bad CA bundle, TLS backend).
	#[error("HTTP client setup failed: {0}")]
	Client(#[from] HttpError),

	/// No review endpoint is configured.
	#[error("no token review endpoint configured")]
	NoReviewEndpoint,

	/// Connection, TLS or timeout failure, or the body could not be read.
	#[error("request to {url} failed: {source}")]
	Request {
		url: Url,
		#[source]
		source: reqwest::Error,
	},

	/// The server answered with a non-success status.
	#[error("{url} returned HTTP {status}: {body}")]
	Status { url: Url, status: u16, body: String },

	/// Request body could not be encoded.
	#[error("failed to encode request: {0}")]
	Encode(#[source] WireError),

	/// Response body could not be decoded.
	#[error("malformed response from {url}: {source}")]
	Decode {
		url: Url,
		#[source]
		source: WireError,
	},

	/// The token endpoint answered successfully but sent no token.
	#[error("{url} returned an empty token")]
	EmptyToken { url: Url },
}

impl TransportError {
	/// HTTP status of the failed call, if the server answered at all.
	pub fn status(&self) -> Option<u16> {
		match self {
			TransportError::Status { status, .. } => Some(*status),
			_ => None,
		}
	}
}

/// Trim a server error body for display.
pub(crate) fn truncate_body(body: &str) -> String {
	let body = body.trim();
	if body.len() <= MAX_ERROR_BODY {
		return body.to_string();
	}
	let mut end = MAX_ERROR_BODY;
	while !body.is_char_boundary(end) {
		end -= 1;
	}
	format!("{}...", &body[..end])
}
