// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sources: files, environment, CLI, defaults.

use std::collections::HashMap;
use std::path::PathBuf;

use tracing::{debug, trace};

use crate::layer::ConfigLayer;
use crate::parse::parse_bool;
use crate::paths::PathsConfig;
use crate::ConfigError;

pub const ENV_TOKEN_SERVER_URL: &str = "TOKEN_SERVER_URL";
pub const ENV_TOKEN_REVIEW_URL: &str = "TOKEN_REVIEW_URL";
pub const ENV_TOKEN_REQUEST_URL: &str = "TOKEN_REQUEST_URL";
pub const ENV_TOKEN_TIMEOUT_SECS: &str = "TOKEN_TIMEOUT_SECS";
pub const ENV_CA_CERT: &str = "CA_CERT";
pub const ENV_SKIP_TLS_VERIFICATION: &str = "SKIP_TLS_VERIFICATION";
pub const ENV_TOKEN_PATH: &str = "TOKEN_PATH";
pub const ENV_TOKEN_CACHE: &str = "TOKEN_CACHE";
pub const ENV_LOG_LEVEL: &str = "KUBETOKEN_LOG_LEVEL";
pub const ENV_LOG_FORMAT: &str = "KUBETOKEN_LOG_FORMAT";
pub const ENV_CONFIG: &str = "KUBETOKEN_CONFIG";

/// Source precedence levels (higher = overrides lower).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
	Defaults = 10,
	UserFile = 30,
	Environment = 50,
	Cli = 60,
}

/// Trait for configuration sources.
pub trait ConfigSource: Send + Sync {
	/// Name for logging
	fn name(&self) -> &'static str;

	/// Precedence level
	fn precedence(&self) -> Precedence;

	/// Load configuration layer from this source
	fn load(&self) -> Result<ConfigLayer, ConfigError>;
}

/// Built-in defaults source.
pub struct DefaultsSource;

impl ConfigSource for DefaultsSource {
	fn name(&self) -> &'static str {
		"defaults"
	}
	fn precedence(&self) -> Precedence {
		Precedence::Defaults
	}

	fn load(&self) -> Result<ConfigLayer, ConfigError> {
		debug!("loading defaults");
		// Defaults are applied when the merged layer is finalized
		Ok(ConfigLayer::default())
	}
}

/// File-based configuration source (TOML).
pub struct FileSource {
	path: Option<PathBuf>,
	required: bool,
	name: &'static str,
}

impl FileSource {
	/// User config: $XDG_CONFIG_HOME/kubetoken/config.toml, skipped if absent.
	pub fn user(paths: &PathsConfig) -> Self {
		Self {
			path: paths.user_config_file.clone(),
			required: false,
			name: "user-config",
		}
	}

	/// Explicitly named file (`--config` / `KUBETOKEN_CONFIG`); must exist.
	pub fn explicit(path: PathBuf) -> Self {
		Self {
			path: Some(path),
			required: true,
			name: "explicit-config",
		}
	}
}

impl ConfigSource for FileSource {
	fn name(&self) -> &'static str {
		self.name
	}
	fn precedence(&self) -> Precedence {
		Precedence::UserFile
	}

	fn load(&self) -> Result<ConfigLayer, ConfigError> {
		let Some(path) = self.path.as_ref() else {
			debug!(source = self.name, "no config file location, skipping");
			return Ok(ConfigLayer::default());
		};

		if !self.required && !path.exists() {
			debug!(path = %path.display(), source = self.name, "config file not found, skipping");
			return Ok(ConfigLayer::default());
		}

		debug!(path = %path.display(), source = self.name, "loading config file");

		let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
			path: path.clone(),
			source,
		})?;
		let layer: ConfigLayer = toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
			path: path.clone(),
			source: e,
		})?;

		trace!(source = self.name, "parsed config layer");
		Ok(layer)
	}
}

type EnvLookup = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Environment variable source.
///
/// Uses the variable names existing kubeconfig `exec.env` entries already set
/// (`TOKEN_SERVER_URL`, `CA_CERT`, ...). Empty values count as unset, except
/// `TOKEN_PATH` where an empty value disables the cache.
pub struct EnvSource {
	lookup: EnvLookup,
}

impl EnvSource {
	/// Read from the process environment.
	pub fn process() -> Self {
		Self {
			lookup: Box::new(|key| std::env::var(key).ok()),
		}
	}

	/// Read from a fixed map instead of the process environment.
	pub fn from_map(vars: HashMap<String, String>) -> Self {
		Self {
			lookup: Box::new(move |key| vars.get(key).cloned()),
		}
	}

	fn get(&self, key: &str) -> Option<String> {
		let value = (self.lookup)(key)?;
		let value = value.trim();
		if value.is_empty() {
			return None;
		}
		trace!(key, "processing env var");
		Some(value.to_string())
	}

	fn get_bool(&self, key: &str) -> Result<Option<bool>, ConfigError> {
		self.get(key)
			.map(|v| parse_bool(&v).map_err(|m| ConfigError::invalid_value(key, m)))
			.transpose()
	}
}

impl ConfigSource for EnvSource {
	fn name(&self) -> &'static str {
		"environment"
	}
	fn precedence(&self) -> Precedence {
		Precedence::Environment
	}

	fn load(&self) -> Result<ConfigLayer, ConfigError> {
		debug!("loading environment variables");
		let mut layer = ConfigLayer::default();

		if let Some(v) = self.get(ENV_TOKEN_SERVER_URL) {
			layer.server_mut().token_server_url = Some(v);
		}
		if let Some(v) = self.get(ENV_TOKEN_REVIEW_URL) {
			layer.server_mut().review_url = Some(v);
		}
		if let Some(v) = self.get(ENV_TOKEN_REQUEST_URL) {
			layer.server_mut().request_url = Some(v);
		}
		if let Some(v) = self.get(ENV_TOKEN_TIMEOUT_SECS) {
			let secs = v
				.parse()
				.map_err(|e| ConfigError::invalid_value(ENV_TOKEN_TIMEOUT_SECS, format!("{e}")))?;
			layer.server_mut().timeout_secs = Some(secs);
		}

		if let Some(v) = self.get(ENV_CA_CERT) {
			layer.tls_mut().ca_cert = Some(PathBuf::from(v));
		}
		if let Some(v) = self.get_bool(ENV_SKIP_TLS_VERIFICATION)? {
			layer.tls_mut().skip_verification = Some(v);
		}

		// Set-but-empty is meaningful here, so bypass the empty filter.
		if let Some(v) = (self.lookup)(ENV_TOKEN_PATH) {
			layer.cache_mut().path = Some(PathBuf::from(v.trim()));
		}
		if let Some(v) = self.get_bool(ENV_TOKEN_CACHE)? {
			layer.cache_mut().enabled = Some(v);
		}

		if let Some(v) = self.get(ENV_LOG_LEVEL) {
			layer.logging_mut().level = Some(v);
		}
		if let Some(v) = self.get(ENV_LOG_FORMAT) {
			layer.logging_mut().format = Some(v);
		}

		Ok(layer)
	}
}

/// CLI override source.
pub struct CliSource {
	overrides: CliOverrides,
}

/// CLI argument overrides.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
	pub token_server_url: Option<String>,
	pub review_url: Option<String>,
	pub request_url: Option<String>,
	pub timeout_secs: Option<u64>,
	pub ca_cert: Option<PathBuf>,
	pub skip_tls_verification: Option<bool>,
	pub token_path: Option<PathBuf>,
	pub cache_enabled: Option<bool>,
	pub log_level: Option<String>,
	pub log_format: Option<String>,
	pub config_file: Option<PathBuf>,
}

impl CliSource {
	pub fn new(overrides: CliOverrides) -> Self {
		Self { overrides }
	}
}

impl ConfigSource for CliSource {
	fn name(&self) -> &'static str {
		"cli"
	}
	fn precedence(&self) -> Precedence {
		Precedence::Cli
	}

	fn load(&self) -> Result<ConfigLayer, ConfigError> {
		debug!("loading CLI overrides");
		let o = &self.overrides;
		let mut layer = ConfigLayer::default();

		if o.token_server_url.is_some() {
			layer.server_mut().token_server_url = o.token_server_url.clone();
		}
		if o.review_url.is_some() {
			layer.server_mut().review_url = o.review_url.clone();
		}
		if o.request_url.is_some() {
			layer.server_mut().request_url = o.request_url.clone();
		}
		if o.timeout_secs.is_some() {
			layer.server_mut().timeout_secs = o.timeout_secs;
		}
		if o.ca_cert.is_some() {
			layer.tls_mut().ca_cert = o.ca_cert.clone();
		}
		if o.skip_tls_verification.is_some() {
			layer.tls_mut().skip_verification = o.skip_tls_verification;
		}
		if o.token_path.is_some() {
			layer.cache_mut().path = o.token_path.clone();
		}
		if o.cache_enabled.is_some() {
			layer.cache_mut().enabled = o.cache_enabled;
		}
		if o.log_level.is_some() {
			layer.logging_mut().level = o.log_level.clone();
		}
		if o.log_format.is_some() {
			layer.logging_mut().format = o.log_format.clone();
		}

		Ok(layer)
	}
}
