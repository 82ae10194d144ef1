// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! HTTP client with consistent User-Agent header and TLS trust policy.

use std::time::Duration;

use reqwest::{Client, ClientBuilder};

use crate::{HttpError, TlsTrust};

/// Everything needed to build the one client used per invocation.
#[derive(Debug, Clone, Default)]
pub struct ClientOptions {
	pub tls: TlsTrust,
	/// Whole-request timeout. `None` leaves reqwest's default (no timeout).
	pub timeout: Option<Duration>,
}

/// Creates a client builder with the standard kubetoken User-Agent header.
pub fn builder() -> ClientBuilder {
	Client::builder().user_agent(user_agent())
}

/// Builds a client honoring the given TLS trust policy and timeout.
///
/// # Example
/// ```ignore
/// let client = kubetoken_common_http::new_client(&ClientOptions {
///     tls: TlsTrust { ca_cert: Some("/etc/kubetoken/ca.pem".into()), skip_verification: false },
///     timeout: Some(Duration::from_secs(30)),
/// })?;
/// ```
pub fn new_client(options: &ClientOptions) -> Result<Client, HttpError> {
	let mut builder = options.tls.apply(builder())?;
	if let Some(timeout) = options.timeout {
		builder = builder.timeout(timeout);
	}
	Ok(builder.build()?)
}

/// Returns the standard kubetoken User-Agent string.
///
/// Format: `kubetoken/{version}`
pub fn user_agent() -> String {
	format!("kubetoken/{}", env!("CARGO_PKG_VERSION"))
}
