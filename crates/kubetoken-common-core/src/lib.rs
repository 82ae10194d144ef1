// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

pub mod credentials;
pub mod token;

pub use credentials::*;
pub use token::*;
