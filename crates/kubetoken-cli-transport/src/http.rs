// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! reqwest-backed transport.

use async_trait::async_trait;
use kubetoken_cli_config::PluginConfig;
use kubetoken_common_core::{Credentials, Token};
use kubetoken_common_http::{new_client, ClientOptions, TlsTrust};
use kubetoken_wire::{decode_review_response, encode_review_request, ReviewResult};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Response};
use tracing::{debug, instrument};
use url::Url;

use crate::error::truncate_body;
use crate::{TokenTransport, TransportError};

/// Talks to the token server over one shared HTTP client.
#[derive(Debug, Clone)]
pub struct HttpTokenTransport {
	client: Client,
	review_url: Option<Url>,
	request_url: Url,
}

impl HttpTokenTransport {
	/// Build the client from the resolved configuration.
	///
	/// Fails if the TLS trust policy cannot be applied, e.g. an unreadable CA.
	pub fn from_config(config: &PluginConfig) -> Result<Self, TransportError> {
		let options = ClientOptions {
			tls: TlsTrust {
				ca_cert: config.tls.ca_cert.clone(),
				skip_verification: config.tls.skip_verification,
			},
			timeout: Some(config.timeout),
		};
		let client = new_client(&options)?;
		Ok(Self::with_client(
			client,
			config.endpoints.review_url.clone(),
			config.endpoints.request_url.clone(),
		))
	}

	/// Use an already-built client.
	pub fn with_client(client: Client, review_url: Option<Url>, request_url: Url) -> Self {
		Self {
			client,
			review_url,
			request_url,
		}
	}

	pub fn review_url(&self) -> Option<&Url> {
		self.review_url.as_ref()
	}

	pub fn request_url(&self) -> &Url {
		&self.request_url
	}
}

/// Read the whole body of a successful response, or turn a failed one into
/// [`TransportError::Status`]. The response is consumed on every path.
async fn read_success_body(url: &Url, response: Response) -> Result<Vec<u8>, TransportError> {
	let status = response.status();
	let body = response
		.bytes()
		.await
		.map_err(|source| TransportError::Request {
			url: url.clone(),
			source,
		})?;

	if !status.is_success() {
		return Err(TransportError::Status {
			url: url.clone(),
			status: status.as_u16(),
			body: truncate_body(&String::from_utf8_lossy(&body)),
		});
	}

	Ok(body.to_vec())
}

#[async_trait]
impl TokenTransport for HttpTokenTransport {
	#[instrument(skip_all, fields(url = ?self.review_url.as_ref().map(Url::as_str)))]
	async fn review(&self, token: &Token) -> Result<ReviewResult, TransportError> {
		let url = self
			.review_url
			.as_ref()
			.ok_or(TransportError::NoReviewEndpoint)?;
		let body = encode_review_request(token).map_err(TransportError::Encode)?;

		let response = self
			.client
			.post(url.clone())
			.header(CONTENT_TYPE, "application/json")
			.header(ACCEPT, "application/json")
			.body(body)
			.send()
			.await
			.map_err(|source| TransportError::Request {
				url: url.clone(),
				source,
			})?;

		let body = read_success_body(url, response).await?;
		let result = decode_review_response(&body).map_err(|source| TransportError::Decode {
			url: url.clone(),
			source,
		})?;

		debug!(
			authenticated = result.authenticated,
			username = ?result.user.username,
			"token review completed"
		);
		Ok(result)
	}

	#[instrument(skip_all, fields(url = %self.request_url, username = %credentials.username))]
	async fn request_token(&self, credentials: &Credentials) -> Result<Token, TransportError> {
		let url = &self.request_url;
		let response = self
			.client
			.get(url.clone())
			.basic_auth(&credentials.username, Some(credentials.password.expose()))
			.send()
			.await
			.map_err(|source| TransportError::Request {
				url: url.clone(),
				source,
			})?;

		let body = read_success_body(url, response).await?;
		if body.is_empty() {
			return Err(TransportError::EmptyToken { url: url.clone() });
		}

		debug!(len = body.len(), "token issued");
		Ok(Token::from_bytes(body))
	}
}
