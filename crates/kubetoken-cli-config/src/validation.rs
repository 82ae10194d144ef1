// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration validation rules.

use std::fmt;

use url::Url;

use crate::runtime::PluginConfig;
use crate::ConfigError;

/// A questionable but workable setting.
///
/// Configuration is resolved before logging is set up, so warnings are
/// returned to the caller instead of being logged here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
	NoReviewEndpoint,
	PlainHttpRequest { url: Url },
	CaCertIgnored,
}

impl fmt::Display for ConfigWarning {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::NoReviewEndpoint => {
				write!(f, "no review endpoint configured, cached tokens will not be reused")
			}
			Self::PlainHttpRequest { url } => write!(
				f,
				"token request endpoint {url} is plain http, credentials are sent unencrypted"
			),
			Self::CaCertIgnored => write!(
				f,
				"ca_cert is ignored for verification because skip_verification is set"
			),
		}
	}
}

/// Validate the configuration, rejecting settings the plugin cannot run with.
pub fn validate_config(config: &PluginConfig) -> Result<(), ConfigError> {
	check_scheme("server.request_url", &config.endpoints.request_url)?;
	if let Some(review) = &config.endpoints.review_url {
		check_scheme("server.review_url", review)?;
	}
	validate_timeout(config)?;

	Ok(())
}

/// Collect warnings for a configuration that passed [`validate_config`].
pub fn config_warnings(config: &PluginConfig) -> Vec<ConfigWarning> {
	let mut warnings = Vec::new();

	if config.endpoints.review_url.is_none() {
		warnings.push(ConfigWarning::NoReviewEndpoint);
	}
	if config.endpoints.request_url.scheme() == "http" {
		warnings.push(ConfigWarning::PlainHttpRequest {
			url: config.endpoints.request_url.clone(),
		});
	}
	if config.tls.skip_verification && config.tls.ca_cert.is_some() {
		warnings.push(ConfigWarning::CaCertIgnored);
	}

	warnings
}

fn check_scheme(field: &str, url: &Url) -> Result<(), ConfigError> {
	match url.scheme() {
		"http" | "https" => Ok(()),
		other => Err(ConfigError::invalid_value(
			field,
			format!("unsupported scheme {other:?}, expected http or https"),
		)),
	}
}

fn validate_timeout(config: &PluginConfig) -> Result<(), ConfigError> {
	if config.timeout.is_zero() {
		return Err(ConfigError::invalid_value(
			"server.timeout_secs",
			"timeout must be greater than zero",
		));
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::layer::ConfigLayer;
	use crate::paths::PathsConfig;
	use std::path::PathBuf;

	fn config_for(url: &str) -> PluginConfig {
		let mut layer = ConfigLayer::default();
		layer.server_mut().token_server_url = Some(url.to_string());
		let paths = PathsConfig::from_dirs(Some(PathBuf::from("/home/alice")), None);
		PluginConfig::from_layer(layer, &paths).unwrap()
	}

	#[test]
	fn https_config_is_valid() {
		assert!(validate_config(&config_for("https://tokens.example.com")).is_ok());
	}

	#[test]
	fn plain_http_is_allowed() {
		assert!(validate_config(&config_for("http://127.0.0.1:8080")).is_ok());
	}

	#[test]
	fn other_schemes_are_rejected() {
		let err = validate_config(&config_for("ftp://tokens.example.com")).unwrap_err();
		assert!(matches!(err, ConfigError::InvalidValue { .. }));
	}

	#[test]
	fn zero_timeout_is_rejected() {
		let mut config = config_for("https://tokens.example.com");
		config.timeout = std::time::Duration::ZERO;
		assert!(validate_config(&config).is_err());
	}

	#[test]
	fn https_with_review_endpoint_has_no_warnings() {
		assert!(config_warnings(&config_for("https://tokens.example.com")).is_empty());
	}

	#[test]
	fn plain_http_request_is_warned() {
		let warnings = config_warnings(&config_for("http://127.0.0.1:8080"));
		assert_eq!(warnings.len(), 1);
		assert!(matches!(warnings[0], ConfigWarning::PlainHttpRequest { .. }));
		assert!(warnings[0].to_string().contains("credentials are sent unencrypted"));
	}

	#[test]
	fn missing_review_endpoint_is_warned() {
		let mut config = config_for("https://tokens.example.com");
		config.endpoints.review_url = None;
		assert_eq!(config_warnings(&config), vec![ConfigWarning::NoReviewEndpoint]);
	}

	#[test]
	fn ca_with_skip_verification_is_warned() {
		let mut config = config_for("https://tokens.example.com");
		config.tls.skip_verification = true;
		config.tls.ca_cert = Some(PathBuf::from("/etc/ssl/corp.pem"));
		assert_eq!(config_warnings(&config), vec![ConfigWarning::CaCertIgnored]);
	}
}
