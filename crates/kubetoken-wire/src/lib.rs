// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Wire formats spoken by kubetoken.
//!
//! - [`token_review`]: the TokenReview request sent to the reviewing service
//!   and the response decoded into a [`ReviewResult`].
//! - [`exec_credential`]: the ExecCredential envelope client-go reads from
//!   the plugin's stdout.
//!
//! See <https://kubernetes.io/docs/reference/access-authn-authz/authentication/#client-go-credential-plugins>.

pub mod error;
pub mod exec_credential;
pub mod token_review;

pub use error::{WireError, WireResult};
pub use exec_credential::{
	write_envelope, ExecCredential, ExecCredentialStatus, EXEC_CREDENTIAL_API_VERSION,
	EXEC_CREDENTIAL_KIND,
};
pub use token_review::{
	decode_review_response, encode_review_request, ReviewResult, TokenReviewRequest,
	TokenReviewResponse, TokenReviewSpec, TokenReviewStatus, UserInfo, TOKEN_REVIEW_API_VERSION,
	TOKEN_REVIEW_KIND,
};
