// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Content serving configuration section.

use serde::{Deserialize, Serialize};

pub const DEFAULT_DATA_VERSION: &str = "2.2";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ContentConfigLayer {
	pub default_data_version: Option<String>,
	pub startup_timeout_secs: Option<u64>,
}

impl ContentConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.default_data_version.is_some() {
			self.default_data_version = other.default_data_version;
		}
		if other.startup_timeout_secs.is_some() {
			self.startup_timeout_secs = other.startup_timeout_secs;
		}
	}

	pub fn finalize(self) -> ContentConfig {
		ContentConfig {
			default_data_version: self
				.default_data_version
				.unwrap_or_else(|| DEFAULT_DATA_VERSION.to_string()),
			startup_timeout_secs: self.startup_timeout_secs.unwrap_or(30),
		}
	}
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContentConfig {
	/// Data version used when a query does not name one
	pub default_data_version: String,
	/// How long `serve` waits for the first successful load
	pub startup_timeout_secs: u64,
}

impl Default for ContentConfig {
	fn default() -> Self {
		ContentConfigLayer::default().finalize()
	}
}
