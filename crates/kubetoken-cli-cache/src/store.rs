// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Token cache backends.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use kubetoken_common_core::Token;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::error::CacheError;

/// Trait for token cache backends.
///
/// The cache holds at most one token and never interprets it.
#[async_trait]
pub trait TokenCache: Send + Sync + std::fmt::Debug {
	/// Load the cached token.
	///
	/// Returns `Ok(None)` when nothing is cached, including an empty file.
	async fn load(&self) -> Result<Option<Token>, CacheError>;

	/// Replace the cached token.
	async fn store(&self, token: &Token) -> Result<(), CacheError>;
}

/// File-backed cache holding the raw token bytes.
///
/// Written with restricted permissions (0600 on Unix).
#[derive(Debug, Clone)]
pub struct FileTokenCache {
	path: PathBuf,
}

impl FileTokenCache {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	/// Sibling file the token is staged in before the rename.
	fn temp_path(&self) -> PathBuf {
		let mut name = self
			.path
			.file_name()
			.map(|n| n.to_os_string())
			.unwrap_or_default();
		name.push(".tmp");
		self.path.with_file_name(name)
	}

	fn write_error(&self, source: std::io::Error) -> CacheError {
		CacheError::Write {
			path: self.path.clone(),
			source,
		}
	}

	async fn write_temp(&self, temp_path: &Path, token: &Token) -> Result<(), CacheError> {
		let mut options = fs::OpenOptions::new();
		options.write(true).create(true).truncate(true);
		#[cfg(unix)]
		options.mode(0o600);

		let mut file = options
			.open(temp_path)
			.await
			.map_err(|e| self.write_error(e))?;
		file.write_all(token.as_bytes())
			.await
			.map_err(|e| self.write_error(e))?;
		file.sync_all().await.map_err(|e| self.write_error(e))?;
		drop(file);

		// A stale temp file keeps its old mode through `open`.
		#[cfg(unix)]
		{
			use std::os::unix::fs::PermissionsExt;
			let perms = std::fs::Permissions::from_mode(0o600);
			fs::set_permissions(temp_path, perms)
				.await
				.map_err(|source| CacheError::Permission {
					path: temp_path.to_path_buf(),
					source,
				})?;
		}

		Ok(())
	}
}

#[async_trait]
impl TokenCache for FileTokenCache {
	async fn load(&self) -> Result<Option<Token>, CacheError> {
		let bytes = match fs::read(&self.path).await {
			Ok(bytes) => bytes,
			Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
			Err(source) => {
				return Err(CacheError::Read {
					path: self.path.clone(),
					source,
				})
			}
		};

		if bytes.is_empty() {
			debug!(path = ?self.path, "token cache is empty");
			return Ok(None);
		}

		debug!(path = ?self.path, len = bytes.len(), "token cache read");
		Ok(Some(Token::from_bytes(bytes)))
	}

	async fn store(&self, token: &Token) -> Result<(), CacheError> {
		if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
			fs::create_dir_all(parent)
				.await
				.map_err(|e| self.write_error(e))?;
		}

		let temp_path = self.temp_path();
		let staged = match self.write_temp(&temp_path, token).await {
			Ok(()) => fs::rename(&temp_path, &self.path)
				.await
				.map_err(|e| self.write_error(e)),
			Err(e) => Err(e),
		};

		if staged.is_err() {
			let _ = fs::remove_file(&temp_path).await;
		}
		staged?;

		debug!(path = ?self.path, "token cache written");
		Ok(())
	}
}

/// In-memory cache for testing.
#[derive(Debug, Default)]
pub struct MemoryTokenCache {
	token: tokio::sync::RwLock<Option<Token>>,
	stores: AtomicUsize,
}

impl MemoryTokenCache {
	/// Create a new empty cache.
	pub fn new() -> Self {
		Self::default()
	}

	/// Create a cache already holding `token`.
	pub fn with_token(token: Token) -> Self {
		Self {
			token: tokio::sync::RwLock::new(Some(token)),
			stores: AtomicUsize::new(0),
		}
	}

	/// The token currently held.
	pub async fn current(&self) -> Option<Token> {
		self.token.read().await.clone()
	}

	/// Number of `store` calls so far.
	pub fn store_count(&self) -> usize {
		self.stores.load(Ordering::SeqCst)
	}
}

#[async_trait]
impl TokenCache for MemoryTokenCache {
	async fn load(&self) -> Result<Option<Token>, CacheError> {
		Ok(self.token.read().await.clone().filter(|t| !t.is_empty()))
	}

	async fn store(&self, token: &Token) -> Result<(), CacheError> {
		self.stores.fetch_add(1, Ordering::SeqCst);
		*self.token.write().await = Some(token.clone());
		Ok(())
	}
}
