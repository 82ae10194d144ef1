// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Partial configuration layer for merging from multiple sources.

use serde::Deserialize;
use std::path::PathBuf;

/// Partial configuration layer - all fields are Option for merging.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigLayer {
	#[serde(default)]
	pub server: Option<ServerLayer>,
	#[serde(default)]
	pub tls: Option<TlsLayer>,
	#[serde(default)]
	pub cache: Option<CacheLayer>,
	#[serde(default)]
	pub logging: Option<LoggingLayer>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServerLayer {
	/// Base URL; `/authenticate` and `/ldapAuth` are derived from it.
	#[serde(default)]
	pub token_server_url: Option<String>,
	#[serde(default)]
	pub review_url: Option<String>,
	#[serde(default)]
	pub request_url: Option<String>,
	#[serde(default)]
	pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TlsLayer {
	#[serde(default)]
	pub ca_cert: Option<PathBuf>,
	#[serde(default)]
	pub skip_verification: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CacheLayer {
	#[serde(default)]
	pub enabled: Option<bool>,
	/// An empty path disables the cache entirely.
	#[serde(default)]
	pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingLayer {
	#[serde(default)]
	pub level: Option<String>,
	#[serde(default)]
	pub format: Option<String>,
}

impl ConfigLayer {
	/// Merge another layer into this one. Other layer takes precedence.
	pub fn merge(&mut self, other: ConfigLayer) {
		merge_option(&mut self.server, other.server, ServerLayer::merge);
		merge_option(&mut self.tls, other.tls, TlsLayer::merge);
		merge_option(&mut self.cache, other.cache, CacheLayer::merge);
		merge_option(&mut self.logging, other.logging, LoggingLayer::merge);
	}

	pub(crate) fn server_mut(&mut self) -> &mut ServerLayer {
		self.server.get_or_insert_with(ServerLayer::default)
	}

	pub(crate) fn tls_mut(&mut self) -> &mut TlsLayer {
		self.tls.get_or_insert_with(TlsLayer::default)
	}

	pub(crate) fn cache_mut(&mut self) -> &mut CacheLayer {
		self.cache.get_or_insert_with(CacheLayer::default)
	}

	pub(crate) fn logging_mut(&mut self) -> &mut LoggingLayer {
		self.logging.get_or_insert_with(LoggingLayer::default)
	}
}

fn merge_option<T, F>(target: &mut Option<T>, source: Option<T>, merge_fn: F)
where
	F: FnOnce(&mut T, T),
{
	match (target.as_mut(), source) {
		(Some(t), Some(s)) => merge_fn(t, s),
		(None, Some(s)) => *target = Some(s),
		_ => {}
	}
}

fn take<T>(target: &mut Option<T>, source: Option<T>) {
	if source.is_some() {
		*target = source;
	}
}

impl ServerLayer {
	fn merge(&mut self, other: ServerLayer) {
		take(&mut self.token_server_url, other.token_server_url);
		take(&mut self.review_url, other.review_url);
		take(&mut self.request_url, other.request_url);
		take(&mut self.timeout_secs, other.timeout_secs);
	}
}

impl TlsLayer {
	fn merge(&mut self, other: TlsLayer) {
		take(&mut self.ca_cert, other.ca_cert);
		take(&mut self.skip_verification, other.skip_verification);
	}
}

impl CacheLayer {
	fn merge(&mut self, other: CacheLayer) {
		take(&mut self.enabled, other.enabled);
		take(&mut self.path, other.path);
	}
}

impl LoggingLayer {
	fn merge(&mut self, other: LoggingLayer) {
		take(&mut self.level, other.level);
		take(&mut self.format, other.format);
	}
}
