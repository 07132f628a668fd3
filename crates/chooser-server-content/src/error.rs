// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use chooser_core::RuleError;
use thiserror::Error;

/// Failures of a storage backend while loading content.
#[derive(Debug, Error)]
pub enum StorageError {
	#[error("storage I/O error: {0}")]
	Io(#[from] std::io::Error),

	#[error("content not found: {0}")]
	NotFound(String),

	#[error("invalid content data: {0}")]
	InvalidData(String),

	#[error("serialization error: {0}")]
	Serialization(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ContentError {
	#[error("data version not found: {0}")]
	VersionNotFound(String),

	#[error("content not loaded yet")]
	NotReady,

	#[error("content cache closed")]
	CacheClosed,

	#[error(transparent)]
	Storage(#[from] StorageError),

	#[error(transparent)]
	Rule(#[from] RuleError),
}

pub type Result<T> = std::result::Result<T, ContentError>;
