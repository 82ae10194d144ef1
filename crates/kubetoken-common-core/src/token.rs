// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use std::borrow::Cow;
use std::fmt;

use kubetoken_common_secret::SecretBytes;

/// An opaque bearer token.
///
/// The bytes are carried verbatim from wherever the token came from (the
/// token endpoint's response body or the cache file). Nothing here parses
/// or validates them; validity is decided by a TokenReview call.
#[derive(Clone, PartialEq, Eq)]
pub struct Token(SecretBytes);

impl Token {
	pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
		Self(SecretBytes::new(bytes.into()))
	}

	pub fn as_bytes(&self) -> &[u8] {
		self.0.expose()
	}

	pub fn len(&self) -> usize {
		self.as_bytes().len()
	}

	pub fn is_empty(&self) -> bool {
		self.as_bytes().is_empty()
	}

	/// Token text for JSON payloads. Invalid UTF-8 sequences become U+FFFD.
	pub fn to_str_lossy(&self) -> Cow<'_, str> {
		String::from_utf8_lossy(self.as_bytes())
	}
}

impl fmt::Debug for Token {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Token")
			.field("bytes", &self.0)
			.field("len", &self.len())
			.finish()
	}
}

impl From<&str> for Token {
	fn from(value: &str) -> Self {
		Self::from_bytes(value.as_bytes())
	}
}
