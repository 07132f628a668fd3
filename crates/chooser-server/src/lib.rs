// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Command implementations behind the `chooser-server` binary.
//!
//! - `protocol` - JSON-lines query loop used by `serve`
//! - `check` - Offline validation of a content file
//! - `version` - Build information

pub mod check;
pub mod error;
pub mod protocol;
pub mod version;

pub use check::{check_storage, CheckReport, VersionReport};
pub use error::{CliError, Result};
pub use protocol::{
	handle_line, parse_context, serve_lines, spawn_line_reader, LineReceiver, QueryRequest,
	QueryResponse,
};
