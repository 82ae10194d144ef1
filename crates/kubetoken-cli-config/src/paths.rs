// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! XDG Base Directory compliant path resolution.

use std::path::{Path, PathBuf};

/// File name of the token cache in the home directory.
pub const DEFAULT_TOKEN_FILE: &str = ".k8s-last-token";

/// Resolved filesystem locations.
///
/// Both entries are optional: a plugin launched without `HOME` can still run
/// as long as nothing needs a home-derived default.
#[derive(Debug, Clone, Default)]
pub struct PathsConfig {
	/// User config file: $XDG_CONFIG_HOME/kubetoken/config.toml
	pub user_config_file: Option<PathBuf>,
	/// Home directory, used for the default token path.
	pub home_dir: Option<PathBuf>,
}

impl PathsConfig {
	/// Build paths from explicit home and config-home directories.
	pub fn from_dirs(home_dir: Option<PathBuf>, config_home: Option<PathBuf>) -> Self {
		let config_home = config_home.or_else(|| home_dir.as_ref().map(|h| h.join(".config")));
		Self {
			user_config_file: config_home.map(|c| c.join("kubetoken").join("config.toml")),
			home_dir,
		}
	}

	/// `~/.k8s-last-token`, when the home directory is known.
	pub fn default_token_path(&self) -> Option<PathBuf> {
		self.home_dir.as_deref().map(|h| h.join(DEFAULT_TOKEN_FILE))
	}

	pub fn user_config_file(&self) -> Option<&Path> {
		self.user_config_file.as_deref()
	}
}

/// Resolve paths from the process environment.
///
/// An empty `XDG_CONFIG_HOME` is ignored, as XDG requires.
pub fn resolve_paths() -> PathsConfig {
	let home = dirs::home_dir();
	let config_home = std::env::var_os("XDG_CONFIG_HOME")
		.filter(|v| !v.is_empty())
		.map(PathBuf::from);

	let paths = PathsConfig::from_dirs(home, config_home);
	tracing::debug!(
		user_config_file = ?paths.user_config_file,
		home_dir = ?paths.home_dir,
		"resolved paths"
	);
	paths
}
