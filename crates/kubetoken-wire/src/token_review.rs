// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! TokenReview payloads used to check whether a cached token is still valid.
//!
//! The request is the webhook TokenReview shape. The response decoder is
//! lenient: identity fields are optional, unknown fields are ignored, and the
//! Go-style capitalized keys (`Status`, `Authenticated`, `User`, ...) are
//! accepted alongside the camelCase ones.

use std::borrow::Cow;
use std::collections::HashMap;

use kubetoken_common_core::Token;
use serde::{Deserialize, Serialize};

use crate::{WireError, WireResult};

pub const TOKEN_REVIEW_API_VERSION: &str = "client.authentication.k8s.io/v1beta";
pub const TOKEN_REVIEW_KIND: &str = "TokenReview";

/// Outbound review body: `{"apiVersion":..,"kind":"TokenReview","spec":{"token":..}}`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenReviewRequest<'a> {
	pub api_version: &'static str,
	pub kind: &'static str,
	pub spec: TokenReviewSpec<'a>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TokenReviewSpec<'a> {
	pub token: Cow<'a, str>,
}

impl<'a> TokenReviewRequest<'a> {
	pub fn new(token: &'a Token) -> Self {
		Self {
			api_version: TOKEN_REVIEW_API_VERSION,
			kind: TOKEN_REVIEW_KIND,
			spec: TokenReviewSpec {
				token: token.to_str_lossy(),
			},
		}
	}
}

/// Inbound review body as sent by the reviewing service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenReviewResponse {
	#[serde(default, alias = "APIVersion", skip_serializing_if = "Option::is_none")]
	pub api_version: Option<String>,
	#[serde(default, alias = "Kind", skip_serializing_if = "Option::is_none")]
	pub kind: Option<String>,
	#[serde(default, alias = "Status")]
	pub status: TokenReviewStatus,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenReviewStatus {
	#[serde(default, alias = "Authenticated")]
	pub authenticated: bool,
	#[serde(default, alias = "User")]
	pub user: UserInfo,
	#[serde(default, alias = "Error", skip_serializing_if = "Option::is_none")]
	pub error: Option<String>,
}

/// Identity attributes attached to an authenticated review.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
	#[serde(default, alias = "Username", skip_serializing_if = "Option::is_none")]
	pub username: Option<String>,
	#[serde(default, alias = "UID", skip_serializing_if = "Option::is_none")]
	pub uid: Option<String>,
	#[serde(default, alias = "Groups", deserialize_with = "null_as_default")]
	pub groups: Vec<String>,
	#[serde(default, alias = "Extra", deserialize_with = "null_as_default")]
	pub extra: HashMap<String, Vec<String>>,
}

/// Go encodes nil slices and maps as `null`.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
	D: serde::Deserializer<'de>,
	T: Default + Deserialize<'de>,
{
	Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Outcome of a TokenReview call.
///
/// Only `authenticated` drives the token lifecycle; the identity attributes
/// are kept for diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewResult {
	pub authenticated: bool,
	pub user: UserInfo,
	/// Reason given by the reviewing service, if any.
	pub error: Option<String>,
}

impl ReviewResult {
	pub fn authenticated(user: UserInfo) -> Self {
		Self {
			authenticated: true,
			user,
			error: None,
		}
	}

	pub fn unauthenticated(error: Option<String>) -> Self {
		Self {
			authenticated: false,
			user: UserInfo::default(),
			error,
		}
	}
}

impl From<TokenReviewResponse> for ReviewResult {
	fn from(response: TokenReviewResponse) -> Self {
		Self {
			authenticated: response.status.authenticated,
			user: response.status.user,
			error: response.status.error,
		}
	}
}

impl From<&ReviewResult> for TokenReviewResponse {
	fn from(result: &ReviewResult) -> Self {
		Self {
			api_version: Some(TOKEN_REVIEW_API_VERSION.to_string()),
			kind: Some(TOKEN_REVIEW_KIND.to_string()),
			status: TokenReviewStatus {
				authenticated: result.authenticated,
				user: result.user.clone(),
				error: result.error.clone(),
			},
		}
	}
}

/// Serialize the review request body for `token`.
pub fn encode_review_request(token: &Token) -> WireResult<Vec<u8>> {
	serde_json::to_vec(&TokenReviewRequest::new(token)).map_err(|source| WireError::Encode {
		what: "TokenReview request",
		source,
	})
}

/// Parse a review response body.
pub fn decode_review_response(body: &[u8]) -> WireResult<ReviewResult> {
	let response: TokenReviewResponse =
		serde_json::from_slice(body).map_err(|source| WireError::Decode {
			what: "TokenReview response",
			source,
		})?;
	Ok(response.into())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn review_request_has_expected_shape() {
		let token = Token::from("abc123");
		let body = encode_review_request(&token).unwrap();
		assert_eq!(
			String::from_utf8(body).unwrap(),
			r#"{"apiVersion":"client.authentication.k8s.io/v1beta","kind":"TokenReview","spec":{"token":"abc123"}}"#
		);
	}

	#[test]
	fn decodes_authenticated_response() {
		let body = br#"{
			"apiVersion": "authentication.k8s.io/v1beta1",
			"kind": "TokenReview",
			"status": {
				"authenticated": true,
				"user": {
					"username": "alice",
					"uid": "42",
					"groups": ["developers", "qa"],
					"extra": {"scopes": ["read", "write"]}
				}
			}
		}"#;

		let result = decode_review_response(body).unwrap();
		assert!(result.authenticated);
		assert_eq!(result.user.username.as_deref(), Some("alice"));
		assert_eq!(result.user.uid.as_deref(), Some("42"));
		assert_eq!(result.user.groups, vec!["developers", "qa"]);
		assert_eq!(result.user.extra["scopes"], vec!["read", "write"]);
	}

	#[test]
	fn decodes_go_style_field_names() {
		let body = br#"{"APIVersion":"","Kind":"","Status":{"Authenticated":true,"User":{"Username":"bob","UID":"","Groups":null,"Extra":null}}}"#;

		let result = decode_review_response(body).unwrap();
		assert!(result.authenticated);
		assert_eq!(result.user.username.as_deref(), Some("bob"));
		assert!(result.user.groups.is_empty());
		assert!(result.user.extra.is_empty());
	}

	#[test]
	fn missing_status_means_not_authenticated() {
		let result = decode_review_response(br#"{"kind":"TokenReview"}"#).unwrap();
		assert!(!result.authenticated);
	}

	#[test]
	fn unknown_fields_are_ignored() {
		let body = br#"{"status":{"authenticated":false,"audiences":["api"],"error":"token expired"},"metadata":{}}"#;
		let result = decode_review_response(body).unwrap();
		assert!(!result.authenticated);
		assert_eq!(result.error.as_deref(), Some("token expired"));
	}

	#[test]
	fn malformed_body_is_a_decode_error() {
		let err = decode_review_response(b"<html>502 Bad Gateway</html>").unwrap_err();
		assert!(matches!(err, WireError::Decode { .. }));
	}

	#[test]
	fn review_request_escapes_token_text() {
		let token = Token::from("a\"b\\c");
		let body = String::from_utf8(encode_review_request(&token).unwrap()).unwrap();
		assert!(body.contains(r#""token":"a\"b\\c""#));
	}
}
