// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Partial configuration produced by each source.

use serde::{Deserialize, Serialize};

use crate::sections::{ContentConfigLayer, LoggingConfigLayer, StorageConfigLayer};

/// One source's view of the configuration; `None` means "not set here".
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ServerConfigLayer {
	#[serde(default)]
	pub storage: Option<StorageConfigLayer>,
	#[serde(default)]
	pub content: Option<ContentConfigLayer>,
	#[serde(default)]
	pub logging: Option<LoggingConfigLayer>,
}

impl ServerConfigLayer {
	/// Overlays `other` on top of `self`, section by section.
	pub fn merge(&mut self, other: Self) {
		merge_section(&mut self.storage, other.storage, StorageConfigLayer::merge);
		merge_section(&mut self.content, other.content, ContentConfigLayer::merge);
		merge_section(&mut self.logging, other.logging, LoggingConfigLayer::merge);
	}
}

fn merge_section<T>(base: &mut Option<T>, overlay: Option<T>, merge: fn(&mut T, T)) {
	match (base.as_mut(), overlay) {
		(Some(base), Some(overlay)) => merge(base, overlay),
		(None, Some(overlay)) => *base = Some(overlay),
		(_, None) => {}
	}
}
