// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Resolved runtime configuration.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use url::Url;

use crate::layer::{CacheLayer, ConfigLayer, LoggingLayer, ServerLayer, TlsLayer};
use crate::paths::PathsConfig;
use crate::ConfigError;

/// Path appended to the server base URL for token reviews.
pub const REVIEW_PATH: &str = "/authenticate";
/// Path appended to the server base URL for token requests.
pub const REQUEST_PATH: &str = "/ldapAuth";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Immutable settings for one plugin invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginConfig {
	pub endpoints: EndpointsConfig,
	pub timeout: Duration,
	pub tls: TlsConfig,
	pub cache: CacheConfig,
	pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointsConfig {
	/// Absent when neither a review URL nor a base URL is configured; cached
	/// tokens then cannot be verified and are never trusted.
	pub review_url: Option<Url>,
	pub request_url: Url,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TlsConfig {
	pub ca_cert: Option<PathBuf>,
	pub skip_verification: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
	/// `None` disables the cache: nothing is loaded or stored.
	pub path: Option<PathBuf>,
	/// Whether freshly requested tokens are written back to `path`.
	pub persist: bool,
}

impl CacheConfig {
	pub fn disabled() -> Self {
		Self {
			path: None,
			persist: false,
		}
	}
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoggingConfig {
	pub level: LogLevel,
	pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
	Error,
	#[default]
	Warn,
	Info,
	Debug,
	Trace,
}

impl LogLevel {
	pub fn as_str(&self) -> &'static str {
		match self {
			LogLevel::Error => "error",
			LogLevel::Warn => "warn",
			LogLevel::Info => "info",
			LogLevel::Debug => "debug",
			LogLevel::Trace => "trace",
		}
	}
}

impl FromStr for LogLevel {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_lowercase().as_str() {
			"error" => Ok(LogLevel::Error),
			"warn" => Ok(LogLevel::Warn),
			"info" => Ok(LogLevel::Info),
			"debug" => Ok(LogLevel::Debug),
			"trace" => Ok(LogLevel::Trace),
			other => Err(format!("unknown log level {other:?}")),
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
	Pretty,
	Json,
	#[default]
	Compact,
}

impl FromStr for LogFormat {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_lowercase().as_str() {
			"json" => Ok(LogFormat::Json),
			"compact" => Ok(LogFormat::Compact),
			"pretty" => Ok(LogFormat::Pretty),
			other => Err(format!("unknown log format {other:?}")),
		}
	}
}

impl PluginConfig {
	/// Finalize a merged layer, applying defaults.
	pub fn from_layer(layer: ConfigLayer, paths: &PathsConfig) -> Result<Self, ConfigError> {
		let cache = build_cache_config(layer.cache, paths)?;
		let server = layer.server.unwrap_or_default();
		Ok(Self {
			endpoints: build_endpoints(&server)?,
			timeout: Duration::from_secs(server.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)),
			tls: build_tls_config(layer.tls),
			cache,
			logging: build_logging_config(layer.logging)?,
		})
	}
}

fn build_endpoints(server: &ServerLayer) -> Result<EndpointsConfig, ConfigError> {
	let base = server.token_server_url.as_deref();

	let request_url = match (server.request_url.as_deref(), base) {
		(Some(url), _) => parse_url("server.request_url", url)?,
		(None, Some(base)) => derive_url(base, REQUEST_PATH)?,
		(None, None) => return Err(ConfigError::missing_field("TOKEN_SERVER_URL")),
	};

	let review_url = match (server.review_url.as_deref(), base) {
		(Some(url), _) => Some(parse_url("server.review_url", url)?),
		(None, Some(base)) => Some(derive_url(base, REVIEW_PATH)?),
		(None, None) => None,
	};

	Ok(EndpointsConfig {
		review_url,
		request_url,
	})
}

/// Append `suffix` to the base URL text, keeping any path prefix the base has.
fn derive_url(base: &str, suffix: &str) -> Result<Url, ConfigError> {
	// Validate the base on its own so errors name the setting the user wrote.
	parse_url("server.token_server_url", base)?;
	parse_url(
		"server.token_server_url",
		&format!("{}{suffix}", base.trim_end_matches('/')),
	)
}

fn parse_url(field: &str, value: &str) -> Result<Url, ConfigError> {
	Url::parse(value).map_err(|e| ConfigError::invalid_value(field, format!("{value:?}: {e}")))
}

fn build_tls_config(layer: Option<TlsLayer>) -> TlsConfig {
	let layer = layer.unwrap_or_default();
	TlsConfig {
		ca_cert: layer.ca_cert.filter(|p| !p.as_os_str().is_empty()),
		skip_verification: layer.skip_verification.unwrap_or(false),
	}
}

fn build_cache_config(
	layer: Option<CacheLayer>,
	paths: &PathsConfig,
) -> Result<CacheConfig, ConfigError> {
	let layer = layer.unwrap_or_default();
	let enabled = layer.enabled.unwrap_or(true);

	let path = match layer.path {
		Some(p) if p.as_os_str().is_empty() => return Ok(CacheConfig::disabled()),
		Some(p) => Some(p),
		None => paths.default_token_path(),
	};

	match path {
		Some(path) => Ok(CacheConfig {
			path: Some(path),
			persist: enabled,
		}),
		None if enabled => Err(ConfigError::HomeDirNotFound),
		None => Ok(CacheConfig::disabled()),
	}
}

fn build_logging_config(layer: Option<LoggingLayer>) -> Result<LoggingConfig, ConfigError> {
	let layer = layer.unwrap_or_default();
	let level = match layer.level.as_deref() {
		Some(s) => s
			.parse()
			.map_err(|e| ConfigError::invalid_value("logging.level", e))?,
		None => LogLevel::default(),
	};
	let format = match layer.format.as_deref() {
		Some(s) => s
			.parse()
			.map_err(|e| ConfigError::invalid_value("logging.format", e))?,
		None => LogFormat::default(),
	};
	Ok(LoggingConfig { level, format })
}
