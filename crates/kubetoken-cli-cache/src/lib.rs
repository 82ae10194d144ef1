// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Local token cache for the kubetoken credential plugin.
//!
//! - **TokenCache trait**: load and replace the single cached token
//! - **FileTokenCache**: raw bytes on disk with owner-only permissions
//! - **MemoryTokenCache**: in-memory cache for testing
//!
//! # Example
//!
//! ```rust,no_run
//! use kubetoken_cli_cache::{FileTokenCache, TokenCache};
//! use kubetoken_common_core::Token;
//!
//! # tokio_test::block_on(async {
//! let cache = FileTokenCache::new("/home/alice/.k8s-last-token");
//! cache.store(&Token::from("tok-xyz")).await.unwrap();
//! let cached = cache.load().await.unwrap();
//! # });
//! ```

mod error;
mod store;

pub use error::CacheError;
pub use store::{FileTokenCache, MemoryTokenCache, TokenCache};
