// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Interactive credential prompt.

use std::io::{self, BufRead};

use console::Term;
use kubetoken_common_core::Credentials;

#[derive(Debug, thiserror::Error)]
pub enum PromptError {
	#[error("no username given on standard input")]
	NoUsername,

	#[error("cannot read password: standard error is not a terminal")]
	NotATerminal,

	#[error("prompt I/O failed: {0}")]
	Io(#[from] io::Error),
}

/// Source of the username/password pair exchanged for a new token.
pub trait CredentialPrompt {
	/// Block until both values are read.
	fn read(&self) -> Result<Credentials, PromptError>;
}

/// Prompts on stderr, reads the username from stdin and the password from the
/// terminal with echo off.
///
/// stdout is never touched: it carries the credential envelope.
#[derive(Debug, Clone)]
pub struct TerminalPrompt {
	term: Term,
}

impl TerminalPrompt {
	pub fn new() -> Self {
		Self {
			term: Term::stderr(),
		}
	}
}

impl Default for TerminalPrompt {
	fn default() -> Self {
		Self::new()
	}
}

impl CredentialPrompt for TerminalPrompt {
	fn read(&self) -> Result<Credentials, PromptError> {
		// The password needs a terminal; fail before asking for anything.
		if !self.term.is_term() {
			return Err(PromptError::NotATerminal);
		}

		self.term.write_str("username: ")?;
		let username = read_word(&mut io::stdin().lock())?;

		self.term.write_str("password: ")?;
		let password = self.term.read_secure_line()?;

		Ok(Credentials::new(username, password))
	}
}

/// Read the next whitespace-delimited word, skipping blank lines.
///
/// The rest of the line holding the word is consumed.
pub(crate) fn read_word<R: BufRead>(reader: &mut R) -> Result<String, PromptError> {
	let mut line = String::new();
	loop {
		line.clear();
		if reader.read_line(&mut line)? == 0 {
			return Err(PromptError::NoUsername);
		}
		if let Some(word) = line.split_whitespace().next() {
			return Ok(word.to_string());
		}
	}
}
