// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! ExecCredential envelope printed on stdout for client-go.

use std::borrow::Cow;
use std::io::Write;

use kubetoken_common_core::Token;
use serde::{Deserialize, Serialize};

use crate::{WireError, WireResult};

pub const EXEC_CREDENTIAL_API_VERSION: &str = "client.authentication.k8s.io/v1alpha1";
pub const EXEC_CREDENTIAL_KIND: &str = "ExecCredential";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecCredential<'a> {
	pub api_version: Cow<'a, str>,
	pub kind: Cow<'a, str>,
	pub status: ExecCredentialStatus<'a>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecCredentialStatus<'a> {
	pub token: Cow<'a, str>,
}

impl<'a> ExecCredential<'a> {
	pub fn new(token: &'a Token) -> Self {
		Self {
			api_version: Cow::Borrowed(EXEC_CREDENTIAL_API_VERSION),
			kind: Cow::Borrowed(EXEC_CREDENTIAL_KIND),
			status: ExecCredentialStatus {
				token: token.to_str_lossy(),
			},
		}
	}

	pub fn to_vec(&self) -> WireResult<Vec<u8>> {
		serde_json::to_vec(self).map_err(|source| WireError::Encode {
			what: "ExecCredential",
			source,
		})
	}
}

/// Write the envelope for `token` to `out`, and nothing else.
///
/// The JSON is fully encoded before the first byte is written, so an encoding
/// failure leaves `out` untouched. No trailing newline.
pub fn write_envelope<W: Write>(out: &mut W, token: &Token) -> WireResult<()> {
	let bytes = ExecCredential::new(token).to_vec()?;
	out.write_all(&bytes)?;
	out.flush()?;
	Ok(())
}
