// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Network side of the kubetoken credential plugin.
//!
//! Two calls against the token server: a TokenReview of a cached token, and
//! a basic-auth request that exchanges credentials for a fresh token.

mod error;
mod http;

use async_trait::async_trait;
use kubetoken_common_core::{Credentials, Token};
use kubetoken_wire::ReviewResult;

pub use error::{TransportError, MAX_ERROR_BODY};
pub use http::HttpTokenTransport;

/// The two outbound operations of the plugin.
#[async_trait]
pub trait TokenTransport: Send + Sync {
	/// Ask the review endpoint whether `token` is still accepted.
	async fn review(&self, token: &Token) -> Result<ReviewResult, TransportError>;

	/// Exchange credentials for a new token. The whole response body is the
	/// token.
	async fn request_token(&self, credentials: &Credentials) -> Result<Token, TransportError>;
}
