// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Content storage configuration section.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub const DEFAULT_STORAGE_PATH: &str = "./data/content.json";
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 2000;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StorageConfigLayer {
	pub path: Option<PathBuf>,
	pub poll_interval_ms: Option<u64>,
}

impl StorageConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.path.is_some() {
			self.path = other.path;
		}
		if other.poll_interval_ms.is_some() {
			self.poll_interval_ms = other.poll_interval_ms;
		}
	}

	pub fn finalize(self) -> StorageConfig {
		StorageConfig {
			path: self.path.unwrap_or_else(|| PathBuf::from(DEFAULT_STORAGE_PATH)),
			poll_interval_ms: self.poll_interval_ms.unwrap_or(DEFAULT_POLL_INTERVAL_MS),
		}
	}
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StorageConfig {
	/// JSON content file
	pub path: PathBuf,
	/// How often the file is checked for modifications
	pub poll_interval_ms: u64,
}

impl StorageConfig {
	pub fn poll_interval(&self) -> std::time::Duration {
		std::time::Duration::from_millis(self.poll_interval_ms)
	}
}

impl Default for StorageConfig {
	fn default() -> Self {
		StorageConfigLayer::default().finalize()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_layer_finalize_defaults() {
		let config = StorageConfigLayer::default().finalize();
		assert_eq!(config.path, PathBuf::from("./data/content.json"));
		assert_eq!(config.poll_interval_ms, 2000);
		assert_eq!(config.poll_interval(), std::time::Duration::from_secs(2));
	}

	#[test]
	fn test_merge_overwrites() {
		let mut base = StorageConfigLayer {
			path: Some("/old.json".into()),
			poll_interval_ms: Some(1000),
		};
		base.merge(StorageConfigLayer {
			path: Some("/new.json".into()),
			poll_interval_ms: None,
		});
		assert_eq!(base.path, Some(PathBuf::from("/new.json")));
		assert_eq!(base.poll_interval_ms, Some(1000));
	}

	#[test]
	fn test_deserialize_layer_empty() {
		let layer: StorageConfigLayer = toml::from_str("").unwrap();
		assert!(layer.path.is_none());
		assert!(layer.poll_interval_ms.is_none());
	}
}
