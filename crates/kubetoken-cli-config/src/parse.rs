// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Value parsers shared by the environment source and the CLI flags.

/// Parse a boolean using the spellings Go's `strconv.ParseBool` accepts.
///
/// kubeconfig `env` entries written for the Go plugin keep working unchanged.
pub fn parse_bool(value: &str) -> Result<bool, String> {
	match value {
		"1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
		"0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
		other => Err(format!("expected a boolean, got {other:?}")),
	}
}
