// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use kubetoken_common_secret::SecretString;

/// Username/password pair exchanged for a token via basic auth.
///
/// Lives only for the duration of one token request and is never written to
/// disk; the password is zeroized when the value is dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
	pub username: String,
	pub password: SecretString,
}

impl Credentials {
	pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
		Self {
			username: username.into(),
			password: SecretString::new(password.into()),
		}
	}
}
