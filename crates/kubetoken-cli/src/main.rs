// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! `kubetoken`: Kubernetes exec credential plugin.
//!
//! Prints an `ExecCredential` carrying a bearer token on stdout. A cached
//! token is reused while the token server still accepts it; otherwise the
//! user is prompted for a username and password, which are exchanged for a
//! new token.
//!
//! stdout carries the envelope and nothing else; prompts, logs and errors go
//! to stderr.

mod lifecycle;
mod prompt;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use kubetoken_cli_cache::{FileTokenCache, TokenCache};
use kubetoken_cli_config::{
	config_warnings, load_config, parse_bool, sources::CliOverrides, LogFormat, LoggingConfig,
	PluginConfig,
};
use kubetoken_cli_transport::HttpTokenTransport;
use tracing::{debug, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::lifecycle::TokenLifecycle;
use crate::prompt::TerminalPrompt;

/// Crates whose events are shown; everything else stays silent.
const LOG_TARGETS: &[&str] = &[
	"kubetoken",
	"kubetoken_cli_cache",
	"kubetoken_cli_config",
	"kubetoken_cli_transport",
	"kubetoken_common_http",
];

#[derive(Parser, Debug)]
#[command(name = "kubetoken", version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long)]
	config: Option<PathBuf>,

	/// Token server base URL (review and request endpoints derive from it)
	#[arg(long, value_name = "URL")]
	token_server_url: Option<String>,

	/// Token review endpoint (default: <base>/authenticate)
	#[arg(long, value_name = "URL")]
	review_url: Option<String>,

	/// Token request endpoint (default: <base>/ldapAuth)
	#[arg(long, value_name = "URL")]
	request_url: Option<String>,

	/// Per-request timeout in seconds
	#[arg(long, value_name = "SECS")]
	timeout_secs: Option<u64>,

	/// PEM bundle to trust instead of the system roots
	#[arg(long, value_name = "PATH")]
	ca_cert: Option<PathBuf>,

	/// Accept any server certificate (insecure); `--skip-tls-verification=false` turns it back off
	#[arg(
		long,
		value_name = "BOOL",
		num_args = 0..=1,
		require_equals = true,
		default_missing_value = "true",
		value_parser = parse_bool
	)]
	skip_tls_verification: Option<bool>,

	/// Token cache file; an empty value disables caching
	#[arg(long, value_name = "PATH")]
	token_path: Option<String>,

	/// Write newly issued tokens to the cache
	#[arg(long, value_name = "BOOL", value_parser = parse_bool)]
	cache: Option<bool>,

	/// Log level (overrides config)
	#[arg(short, long)]
	log_level: Option<String>,

	/// Log format: compact, pretty or json (overrides config)
	#[arg(long)]
	log_format: Option<String>,
}

impl From<&Args> for CliOverrides {
	fn from(args: &Args) -> Self {
		Self {
			token_server_url: args.token_server_url.clone(),
			review_url: args.review_url.clone(),
			request_url: args.request_url.clone(),
			timeout_secs: args.timeout_secs,
			ca_cert: args.ca_cert.clone(),
			skip_tls_verification: args.skip_tls_verification,
			token_path: args.token_path.as_ref().map(PathBuf::from),
			cache_enabled: args.cache,
			log_level: args.log_level.clone(),
			log_format: args.log_format.clone(),
			config_file: args.config.clone(),
		}
	}
}

fn init_tracing(logging: &LoggingConfig) {
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
		let level = logging.level.as_str();
		let directives: Vec<String> = LOG_TARGETS
			.iter()
			.map(|target| format!("{target}={level}"))
			.collect();
		EnvFilter::new(directives.join(","))
	});

	match logging.format {
		LogFormat::Json => {
			tracing_subscriber::registry()
				.with(filter)
				.with(fmt::layer().json().with_writer(std::io::stderr))
				.init();
		}
		LogFormat::Compact => {
			tracing_subscriber::registry()
				.with(filter)
				.with(fmt::layer().compact().with_writer(std::io::stderr))
				.init();
		}
		LogFormat::Pretty => {
			tracing_subscriber::registry()
				.with(filter)
				.with(fmt::layer().with_writer(std::io::stderr))
				.init();
		}
	}
}

/// Report settings that work but deserve attention.
///
/// Runs after [`init_tracing`]; configuration is loaded before a subscriber
/// exists.
fn log_config(config: &PluginConfig) {
	for warning in config_warnings(config) {
		warn!("{warning}");
	}
	debug!(
		request_url = %config.endpoints.request_url,
		review_url = ?config.endpoints.review_url.as_ref().map(|u| u.as_str()),
		cache_path = ?config.cache.path,
		persist = config.cache.persist,
		"configuration loaded"
	);
}

async fn run(config: PluginConfig) -> Result<()> {
	let transport =
		HttpTokenTransport::from_config(&config).context("failed to set up HTTP client")?;
	let file_cache = config.cache.path.clone().map(FileTokenCache::new);
	let prompt = TerminalPrompt::new();

	let lifecycle = TokenLifecycle {
		cache: file_cache.as_ref().map(|c| c as &dyn TokenCache),
		persist: config.cache.persist,
		transport: &transport,
		prompt: &prompt,
	};

	let mut stdout = std::io::stdout().lock();
	let source = lifecycle::run(&lifecycle, &mut stdout)
		.await
		.context("failed to obtain a token")?;
	debug!(?source, "credential written");
	Ok(())
}

/// Join the error chain, skipping causes already quoted by their parent.
fn render_error(err: &anyhow::Error) -> String {
	let mut rendered = String::new();
	let mut previous = String::new();
	for cause in err.chain() {
		let message = cause.to_string();
		if previous.contains(&message) {
			continue;
		}
		if !rendered.is_empty() {
			rendered.push_str(": ");
		}
		rendered.push_str(&message);
		previous = message;
	}
	rendered
}

fn main() -> ExitCode {
	let args = Args::parse();

	let config = match load_config(CliOverrides::from(&args)) {
		Ok(config) => config,
		Err(e) => {
			eprintln!("kubetoken: invalid configuration: {e}");
			return ExitCode::FAILURE;
		}
	};

	init_tracing(&config.logging);
	log_config(&config);

	let result = tokio::runtime::Builder::new_current_thread()
		.enable_all()
		.build()
		.context("failed to start async runtime")
		.and_then(|runtime| runtime.block_on(run(config)));

	match result {
		Ok(()) => ExitCode::SUCCESS,
		Err(e) => {
			eprintln!("kubetoken: {}", render_error(&e));
			ExitCode::FAILURE
		}
	}
}
