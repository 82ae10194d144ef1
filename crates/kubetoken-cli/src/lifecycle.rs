// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Token lifecycle: reuse a cached token while the server still accepts it,
//! otherwise prompt once, request a new token, and cache it.

use std::io::Write;

use kubetoken_cli_cache::TokenCache;
use kubetoken_cli_transport::{TokenTransport, TransportError};
use kubetoken_common_core::Token;
use kubetoken_wire::{write_envelope, WireError};
use tracing::{debug, error, info, instrument, warn};

use crate::prompt::{CredentialPrompt, PromptError};

/// Failures that leave the plugin without a token to print.
#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
	#[error("failed to read credentials: {0}")]
	Prompt(#[from] PromptError),

	#[error("token request failed: {0}")]
	Request(#[source] TransportError),

	#[error("failed to write credential: {0}")]
	Output(#[from] WireError),
}

/// Where the returned token came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource {
	Cache,
	Issued,
}

/// The collaborators for one invocation.
pub struct TokenLifecycle<'a> {
	/// `None` when caching is disabled altogether.
	pub cache: Option<&'a dyn TokenCache>,
	/// Write newly issued tokens back to `cache`.
	pub persist: bool,
	pub transport: &'a dyn TokenTransport,
	pub prompt: &'a dyn CredentialPrompt,
}

impl TokenLifecycle<'_> {
	/// Produce a usable token.
	///
	/// Cache and review problems only lead to re-authentication; the single
	/// re-authentication attempt failing is the only error.
	#[instrument(skip_all, fields(persist = self.persist))]
	pub async fn resolve(&self) -> Result<(Token, TokenSource), LifecycleError> {
		if let Some(token) = self.load_candidate().await {
			if self.still_valid(&token).await {
				info!("using cached token");
				return Ok((token, TokenSource::Cache));
			}
		}

		let credentials = self.prompt.read().map_err(|e| {
			error!(error = %e, "could not read credentials");
			LifecycleError::Prompt(e)
		})?;

		let token = self
			.transport
			.request_token(&credentials)
			.await
			.map_err(|e| {
				error!(error = %e, "token request failed");
				LifecycleError::Request(e)
			})?;
		drop(credentials);
		info!("obtained new token");

		self.persist_token(&token).await;
		Ok((token, TokenSource::Issued))
	}

	async fn load_candidate(&self) -> Option<Token> {
		let Some(cache) = self.cache else {
			debug!("token cache disabled");
			return None;
		};

		match cache.load().await {
			Ok(Some(token)) => Some(token),
			Ok(None) => {
				info!("no cached token");
				None
			}
			Err(e) => {
				warn!(error = %e, "ignoring unreadable token cache");
				None
			}
		}
	}

	async fn still_valid(&self, token: &Token) -> bool {
		match self.transport.review(token).await {
			Ok(result) if result.authenticated => true,
			Ok(result) => {
				warn!(reason = ?result.error, "cached token rejected, re-authenticating");
				false
			}
			Err(TransportError::NoReviewEndpoint) => {
				info!("no review endpoint, re-authenticating");
				false
			}
			Err(e) => {
				warn!(error = %e, "token review failed, re-authenticating");
				false
			}
		}
	}

	async fn persist_token(&self, token: &Token) {
		let Some(cache) = self.cache.filter(|_| self.persist) else {
			debug!("not persisting token");
			return;
		};
		if let Err(e) = cache.store(token).await {
			warn!(error = %e, "failed to cache token");
		}
	}
}

/// Resolve a token and write the credential envelope to `out`.
///
/// Nothing is written to `out` unless a token was obtained.
pub async fn run<W: Write>(
	lifecycle: &TokenLifecycle<'_>,
	out: &mut W,
) -> Result<TokenSource, LifecycleError> {
	let (token, source) = lifecycle.resolve().await?;
	write_envelope(out, &token)?;
	Ok(source)
}

#[cfg(test)]
mod tests {
	use super::*;
	use async_trait::async_trait;
	use kubetoken_cli_cache::{CacheError, FileTokenCache, MemoryTokenCache};
	use kubetoken_cli_config::{
		CacheConfig, EndpointsConfig, LoggingConfig, PluginConfig, TlsConfig,
	};
	use kubetoken_cli_transport::HttpTokenTransport;
	use kubetoken_common_core::Credentials;
	use kubetoken_wire::{ReviewResult, UserInfo};
	use std::path::PathBuf;
	use std::sync::atomic::{AtomicUsize, Ordering};
	use std::sync::Mutex;
	use std::time::Duration;
	use url::Url;
	use wiremock::matchers::{header, method, path};
	use wiremock::{Mock, MockServer, ResponseTemplate};

	enum Review {
		Accept,
		Reject,
		Fail,
	}

	struct StubTransport {
		review: Review,
		issue: Option<&'static str>,
		reviewed: Mutex<Vec<Token>>,
		requests: AtomicUsize,
		last_username: Mutex<Option<String>>,
	}

	impl StubTransport {
		fn new(review: Review, issue: Option<&'static str>) -> Self {
			Self {
				review,
				issue,
				reviewed: Mutex::new(Vec::new()),
				requests: AtomicUsize::new(0),
				last_username: Mutex::new(None),
			}
		}

		fn review_count(&self) -> usize {
			self.reviewed.lock().unwrap().len()
		}

		fn request_count(&self) -> usize {
			self.requests.load(Ordering::SeqCst)
		}
	}

	fn status_error(path: &str, status: u16) -> TransportError {
		TransportError::Status {
			url: Url::parse("https://tokens.example.com").unwrap().join(path).unwrap(),
			status,
			body: String::new(),
		}
	}

	#[async_trait]
	impl TokenTransport for StubTransport {
		async fn review(&self, token: &Token) -> Result<ReviewResult, TransportError> {
			self.reviewed.lock().unwrap().push(token.clone());
			match self.review {
				Review::Accept => Ok(ReviewResult::authenticated(UserInfo::default())),
				Review::Reject => Ok(ReviewResult::unauthenticated(Some("expired".into()))),
				Review::Fail => Err(status_error("/authenticate", 503)),
			}
		}

		async fn request_token(&self, credentials: &Credentials) -> Result<Token, TransportError> {
			self.requests.fetch_add(1, Ordering::SeqCst);
			*self.last_username.lock().unwrap() = Some(credentials.username.clone());
			self.issue
				.map(Token::from)
				.ok_or_else(|| status_error("/ldapAuth", 401))
		}
	}

	struct ScriptedPrompt {
		answer: Option<(&'static str, &'static str)>,
		reads: AtomicUsize,
	}

	impl ScriptedPrompt {
		fn answering(username: &'static str, password: &'static str) -> Self {
			Self {
				answer: Some((username, password)),
				reads: AtomicUsize::new(0),
			}
		}

		fn closed() -> Self {
			Self {
				answer: None,
				reads: AtomicUsize::new(0),
			}
		}

		fn read_count(&self) -> usize {
			self.reads.load(Ordering::SeqCst)
		}
	}

	impl CredentialPrompt for ScriptedPrompt {
		fn read(&self) -> Result<Credentials, PromptError> {
			self.reads.fetch_add(1, Ordering::SeqCst);
			self.answer
				.map(|(u, p)| Credentials::new(u, p))
				.ok_or(PromptError::NoUsername)
		}
	}

	/// A cache whose disk is broken in both directions.
	#[derive(Debug)]
	struct BrokenCache;

	#[async_trait]
	impl TokenCache for BrokenCache {
		async fn load(&self) -> Result<Option<Token>, CacheError> {
			Err(CacheError::Read {
				path: PathBuf::from("/broken"),
				source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
			})
		}

		async fn store(&self, _token: &Token) -> Result<(), CacheError> {
			Err(CacheError::Write {
				path: PathBuf::from("/broken"),
				source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
			})
		}
	}

	#[tokio::test]
	async fn valid_cached_token_is_returned_untouched() {
		let cache = MemoryTokenCache::with_token(Token::from_bytes(b"cached\xff-token".to_vec()));
		let transport = StubTransport::new(Review::Accept, Some("fresh"));
		let prompt = ScriptedPrompt::answering("alice", "secret");
		let lifecycle = TokenLifecycle {
			cache: Some(&cache),
			persist: true,
			transport: &transport,
			prompt: &prompt,
		};

		let (token, source) = lifecycle.resolve().await.unwrap();

		assert_eq!(token.as_bytes(), b"cached\xff-token");
		assert_eq!(source, TokenSource::Cache);
		assert_eq!(transport.review_count(), 1);
		assert_eq!(transport.request_count(), 0);
		assert_eq!(prompt.read_count(), 0);
		assert_eq!(cache.store_count(), 0);
	}

	#[tokio::test]
	async fn empty_cache_skips_review() {
		let cache = MemoryTokenCache::new();
		let transport = StubTransport::new(Review::Accept, Some("fresh"));
		let prompt = ScriptedPrompt::answering("alice", "secret");
		let lifecycle = TokenLifecycle {
			cache: Some(&cache),
			persist: true,
			transport: &transport,
			prompt: &prompt,
		};

		let (token, source) = lifecycle.resolve().await.unwrap();

		assert_eq!(token, Token::from("fresh"));
		assert_eq!(source, TokenSource::Issued);
		assert_eq!(transport.review_count(), 0);
		assert_eq!(transport.request_count(), 1);
		assert_eq!(cache.current().await, Some(Token::from("fresh")));
	}

	#[tokio::test]
	async fn rejected_token_triggers_one_request() {
		let cache = MemoryTokenCache::with_token(Token::from("stale"));
		let transport = StubTransport::new(Review::Reject, Some("fresh"));
		let prompt = ScriptedPrompt::answering("alice", "secret");
		let lifecycle = TokenLifecycle {
			cache: Some(&cache),
			persist: true,
			transport: &transport,
			prompt: &prompt,
		};

		let (token, _) = lifecycle.resolve().await.unwrap();

		assert_eq!(token, Token::from("fresh"));
		assert_eq!(transport.reviewed.lock().unwrap()[0], Token::from("stale"));
		assert_eq!(transport.request_count(), 1);
		assert_eq!(prompt.read_count(), 1);
		assert_eq!(
			transport.last_username.lock().unwrap().as_deref(),
			Some("alice")
		);
		assert_eq!(cache.current().await, Some(Token::from("fresh")));
	}

	#[tokio::test]
	async fn review_failure_falls_through_to_reauth() {
		let cache = MemoryTokenCache::with_token(Token::from("stale"));
		let transport = StubTransport::new(Review::Fail, Some("fresh"));
		let prompt = ScriptedPrompt::answering("alice", "secret");
		let lifecycle = TokenLifecycle {
			cache: Some(&cache),
			persist: true,
			transport: &transport,
			prompt: &prompt,
		};

		let (token, _) = lifecycle.resolve().await.unwrap();
		assert_eq!(token, Token::from("fresh"));
		assert_eq!(transport.request_count(), 1);
	}

	#[tokio::test]
	async fn persistence_disabled_never_writes() {
		let cache = MemoryTokenCache::new();
		let transport = StubTransport::new(Review::Accept, Some("fresh"));
		let prompt = ScriptedPrompt::answering("alice", "secret");
		let lifecycle = TokenLifecycle {
			cache: Some(&cache),
			persist: false,
			transport: &transport,
			prompt: &prompt,
		};

		lifecycle.resolve().await.unwrap();
		assert_eq!(cache.store_count(), 0);
	}

	#[tokio::test]
	async fn no_cache_means_no_review() {
		let transport = StubTransport::new(Review::Accept, Some("fresh"));
		let prompt = ScriptedPrompt::answering("alice", "secret");
		let lifecycle = TokenLifecycle {
			cache: None,
			persist: true,
			transport: &transport,
			prompt: &prompt,
		};

		let (token, _) = lifecycle.resolve().await.unwrap();
		assert_eq!(token, Token::from("fresh"));
		assert_eq!(transport.review_count(), 0);
	}

	#[tokio::test]
	async fn broken_cache_is_not_fatal() {
		let cache = BrokenCache;
		let transport = StubTransport::new(Review::Accept, Some("fresh"));
		let prompt = ScriptedPrompt::answering("alice", "secret");
		let lifecycle = TokenLifecycle {
			cache: Some(&cache),
			persist: true,
			transport: &transport,
			prompt: &prompt,
		};

		let (token, _) = lifecycle.resolve().await.unwrap();
		assert_eq!(token, Token::from("fresh"));
		assert_eq!(transport.review_count(), 0);
	}

	#[tokio::test]
	async fn request_failure_is_fatal_and_prints_nothing() {
		let cache = MemoryTokenCache::new();
		let transport = StubTransport::new(Review::Accept, None);
		let prompt = ScriptedPrompt::answering("alice", "wrong");
		let lifecycle = TokenLifecycle {
			cache: Some(&cache),
			persist: true,
			transport: &transport,
			prompt: &prompt,
		};

		let mut out = Vec::new();
		let err = run(&lifecycle, &mut out).await.unwrap_err();

		assert!(matches!(err, LifecycleError::Request(_)));
		assert!(out.is_empty());
		assert_eq!(transport.request_count(), 1);
		assert_eq!(cache.store_count(), 0);
	}

	#[tokio::test]
	async fn prompt_failure_is_fatal_before_request() {
		let transport = StubTransport::new(Review::Accept, Some("fresh"));
		let prompt = ScriptedPrompt::closed();
		let lifecycle = TokenLifecycle {
			cache: None,
			persist: false,
			transport: &transport,
			prompt: &prompt,
		};

		let err = lifecycle.resolve().await.unwrap_err();
		assert!(matches!(err, LifecycleError::Prompt(_)));
		assert_eq!(transport.request_count(), 0);
	}

	#[tokio::test]
	async fn run_prints_exact_envelope() {
		let cache = MemoryTokenCache::with_token(Token::from("abc123"));
		let transport = StubTransport::new(Review::Accept, None);
		let prompt = ScriptedPrompt::closed();
		let lifecycle = TokenLifecycle {
			cache: Some(&cache),
			persist: true,
			transport: &transport,
			prompt: &prompt,
		};

		let mut out = Vec::new();
		run(&lifecycle, &mut out).await.unwrap();
		assert_eq!(
			String::from_utf8(out).unwrap(),
			r#"{"apiVersion":"client.authentication.k8s.io/v1alpha1","kind":"ExecCredential","status":{"token":"abc123"}}"#
		);
	}

	fn http_transport(server: &MockServer) -> HttpTokenTransport {
		let base = server.uri();
		let config = PluginConfig {
			endpoints: EndpointsConfig {
				review_url: Some(Url::parse(&format!("{base}/authenticate")).unwrap()),
				request_url: Url::parse(&format!("{base}/ldapAuth")).unwrap(),
			},
			timeout: Duration::from_secs(5),
			tls: TlsConfig::default(),
			cache: CacheConfig::disabled(),
			logging: LoggingConfig::default(),
		};
		HttpTokenTransport::from_config(&config).unwrap()
	}

	#[tokio::test]
	async fn end_to_end_fresh_login_is_cached() {
		let server = MockServer::start().await;
		Mock::given(method("POST"))
			.and(path("/authenticate"))
			.respond_with(ResponseTemplate::new(200))
			.expect(0)
			.mount(&server)
			.await;
		Mock::given(method("GET"))
			.and(path("/ldapAuth"))
			.and(header("authorization", "Basic YWxpY2U6c2VjcmV0"))
			.respond_with(ResponseTemplate::new(200).set_body_string("tok-xyz"))
			.expect(1)
			.mount(&server)
			.await;

		let dir = tempfile::tempdir().unwrap();
		let cache = FileTokenCache::new(dir.path().join(".k8s-last-token"));
		let transport = http_transport(&server);
		let prompt = ScriptedPrompt::answering("alice", "secret");
		let lifecycle = TokenLifecycle {
			cache: Some(&cache),
			persist: true,
			transport: &transport,
			prompt: &prompt,
		};

		let mut out = Vec::new();
		run(&lifecycle, &mut out).await.unwrap();

		assert_eq!(
			String::from_utf8(out).unwrap(),
			r#"{"apiVersion":"client.authentication.k8s.io/v1alpha1","kind":"ExecCredential","status":{"token":"tok-xyz"}}"#
		);
		assert_eq!(std::fs::read(cache.path()).unwrap(), b"tok-xyz");

		#[cfg(unix)]
		{
			use std::os::unix::fs::PermissionsExt;
			let mode = std::fs::metadata(cache.path()).unwrap().permissions().mode();
			assert_eq!(mode & 0o777, 0o600);
		}
	}

	#[tokio::test]
	async fn end_to_end_valid_cache_skips_login() {
		let server = MockServer::start().await;
		Mock::given(method("POST"))
			.and(path("/authenticate"))
			.respond_with(
				ResponseTemplate::new(200)
					.set_body_string(r#"{"status":{"authenticated":true,"user":{"username":"alice"}}}"#),
			)
			.expect(1)
			.mount(&server)
			.await;
		Mock::given(method("GET"))
			.and(path("/ldapAuth"))
			.respond_with(ResponseTemplate::new(200).set_body_string("unused"))
			.expect(0)
			.mount(&server)
			.await;

		let dir = tempfile::tempdir().unwrap();
		let cache = FileTokenCache::new(dir.path().join("token"));
		std::fs::write(cache.path(), b"cached-token").unwrap();
		let transport = http_transport(&server);
		let prompt = ScriptedPrompt::closed();
		let lifecycle = TokenLifecycle {
			cache: Some(&cache),
			persist: true,
			transport: &transport,
			prompt: &prompt,
		};

		let (token, source) = lifecycle.resolve().await.unwrap();
		assert_eq!(token, Token::from("cached-token"));
		assert_eq!(source, TokenSource::Cache);
		assert_eq!(prompt.read_count(), 0);
	}

	#[tokio::test]
	async fn end_to_end_rejected_login_leaves_no_trace() {
		let server = MockServer::start().await;
		Mock::given(method("GET"))
			.and(path("/ldapAuth"))
			.respond_with(ResponseTemplate::new(401).set_body_string("invalid credentials"))
			.expect(1)
			.mount(&server)
			.await;

		let dir = tempfile::tempdir().unwrap();
		let cache = FileTokenCache::new(dir.path().join("token"));
		let transport = http_transport(&server);
		let prompt = ScriptedPrompt::answering("alice", "wrong");
		let lifecycle = TokenLifecycle {
			cache: Some(&cache),
			persist: true,
			transport: &transport,
			prompt: &prompt,
		};

		let mut out = Vec::new();
		let err = run(&lifecycle, &mut out).await.unwrap_err();

		assert!(matches!(err, LifecycleError::Request(_)));
		assert!(out.is_empty());
		assert!(!cache.path().exists());
	}
}
