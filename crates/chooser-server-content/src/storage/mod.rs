// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Storage backends for versioned content.
//!
//! A backend loads every data version at once and tells a registered
//! [`ChangeListener`] when the persisted data no longer matches what was
//! loaded. How it notices is up to the backend.

mod file;
mod memory;

pub use file::{FilePoller, FileStorage};
pub use memory::MemoryStorage;

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chooser_core::ContentTree;

use crate::error::StorageError;

/// All data versions keyed by version id.
pub type VersionedContent = BTreeMap<String, ContentTree>;

/// Receives "data changed" signals from a storage backend.
///
/// Implementations must return quickly; the caller may be a poll loop or a
/// write path.
pub trait ChangeListener: Send + Sync {
	fn on_data_changed(&self);
}

#[async_trait]
pub trait ContentStorage: Send + Sync {
	/// Short backend name for logs.
	fn name(&self) -> &'static str;

	/// Loads the complete content of every data version.
	async fn load_all(&self) -> Result<VersionedContent, StorageError>;

	/// Registers the listener notified on data changes, replacing any
	/// previous one.
	fn set_listener(&self, listener: Arc<dyn ChangeListener>);
}
