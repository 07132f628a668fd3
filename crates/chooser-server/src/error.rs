// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use chooser_core::RuleError;
use chooser_server_config::ConfigError;
use chooser_server_content::{ContentError, StorageError};

#[derive(Debug, thiserror::Error)]
pub enum CliError {
	#[error("configuration error: {0}")]
	Config(#[from] ConfigError),

	#[error(transparent)]
	Content(#[from] ContentError),

	#[error(transparent)]
	Storage(#[from] StorageError),

	#[error(transparent)]
	Rule(#[from] RuleError),

	#[error("invalid JSON: {0}")]
	Json(#[from] serde_json::Error),

	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),

	#[error("content check failed: {0} invalid rule value(s)")]
	CheckFailed(usize),
}

pub type Result<T> = std::result::Result<T, CliError>;
