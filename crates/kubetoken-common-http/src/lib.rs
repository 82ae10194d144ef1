// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Shared HTTP client construction for kubetoken.
//!
//! This crate provides:
//! - A client builder with a consistent User-Agent header
//! - TLS trust configuration (custom CA bundle, insecure skip-verify mode)

mod client;
mod error;
mod tls;

pub use client::{builder, new_client, user_agent, ClientOptions};
pub use error::HttpError;
pub use tls::TlsTrust;
