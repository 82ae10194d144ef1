// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration management for the kubetoken credential plugin.
//!
//! This crate provides:
//! - XDG Base Directory compliant path resolution
//! - Layered configuration from multiple sources
//! - TOML configuration file parsing
//! - Environment variable overrides using the plugin's historical names
//! - Configuration validation

pub mod error;
pub mod layer;
pub mod parse;
pub mod paths;
pub mod registry;
pub mod runtime;
pub mod sources;
pub mod validation;

use std::path::PathBuf;

pub use error::ConfigError;
pub use layer::ConfigLayer;
pub use parse::parse_bool;
pub use paths::PathsConfig;
pub use registry::ConfigRegistry;
pub use runtime::{
	CacheConfig, EndpointsConfig, LogFormat, LogLevel, LoggingConfig, PluginConfig, TlsConfig,
};
pub use sources::{CliOverrides, ConfigSource, EnvSource, Precedence};
pub use validation::{config_warnings, ConfigWarning};

/// Load configuration from defaults, the config file, the process
/// environment and CLI overrides.
pub fn load_config(cli: CliOverrides) -> Result<PluginConfig, ConfigError> {
	let paths = paths::resolve_paths();
	let config_file = cli
		.config_file
		.clone()
		.or_else(|| std::env::var_os(sources::ENV_CONFIG).map(PathBuf::from));
	load_config_from(cli, config_file, sources::EnvSource::process(), &paths)
}

/// Load configuration from explicit inputs.
///
/// `config_file`, when given, must exist; otherwise the user config file from
/// `paths` is read if present.
pub fn load_config_from(
	cli: CliOverrides,
	config_file: Option<PathBuf>,
	env: EnvSource,
	paths: &PathsConfig,
) -> Result<PluginConfig, ConfigError> {
	let mut registry = ConfigRegistry::new();

	registry.register(Box::new(sources::DefaultsSource));
	match config_file.filter(|p| !p.as_os_str().is_empty()) {
		Some(path) => registry.register(Box::new(sources::FileSource::explicit(path))),
		None => registry.register(Box::new(sources::FileSource::user(paths))),
	}
	registry.register(Box::new(env));
	registry.register(Box::new(sources::CliSource::new(cli)));

	registry.load(paths)
}
