// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chooser_core::ContentTree;
use parking_lot::RwLock;
use tracing::debug;

use super::{ChangeListener, ContentStorage, VersionedContent};
use crate::error::StorageError;

/// Content held in process memory.
///
/// Writes through [`MemoryStorage::replace`] or [`MemoryStorage::put_version`]
/// notify the listener, the same way a database-backed store would after a
/// successful write.
#[derive(Default)]
pub struct MemoryStorage {
	versions: RwLock<VersionedContent>,
	listener: RwLock<Option<Arc<dyn ChangeListener>>>,
	unavailable: AtomicBool,
	load_delay: RwLock<Option<Duration>>,
	loads: AtomicU64,
}

impl MemoryStorage {
	pub fn new(versions: VersionedContent) -> Self {
		Self {
			versions: RwLock::new(versions),
			..Default::default()
		}
	}

	/// Delays every load, simulating a slow backend.
	pub fn with_load_delay(self, delay: Duration) -> Self {
		*self.load_delay.write() = Some(delay);
		self
	}

	/// Replaces all content and notifies the listener.
	pub fn replace(&self, versions: VersionedContent) {
		*self.versions.write() = versions;
		self.notify();
	}

	/// Inserts or replaces one data version and notifies the listener.
	pub fn put_version(&self, version: impl Into<String>, tree: ContentTree) {
		self.versions.write().insert(version.into(), tree);
		self.notify();
	}

	/// Makes subsequent loads fail with an I/O error until reset.
	pub fn set_unavailable(&self, unavailable: bool) {
		self.unavailable.store(unavailable, Ordering::SeqCst);
	}

	/// Number of `load_all` calls so far.
	pub fn load_count(&self) -> u64 {
		self.loads.load(Ordering::SeqCst)
	}

	fn notify(&self) {
		let listener = self.listener.read().clone();
		if let Some(listener) = listener {
			listener.on_data_changed();
		}
	}
}

#[async_trait]
impl ContentStorage for MemoryStorage {
	fn name(&self) -> &'static str {
		"memory"
	}

	async fn load_all(&self) -> Result<VersionedContent, StorageError> {
		self.loads.fetch_add(1, Ordering::SeqCst);

		let delay = *self.load_delay.read();
		if let Some(delay) = delay {
			tokio::time::sleep(delay).await;
		}

		if self.unavailable.load(Ordering::SeqCst) {
			return Err(StorageError::Io(std::io::Error::new(
				std::io::ErrorKind::NotConnected,
				"memory storage unavailable",
			)));
		}

		let versions = self.versions.read().clone();
		debug!(versions = versions.len(), "loaded content from memory");
		Ok(versions)
	}

	fn set_listener(&self, listener: Arc<dyn ChangeListener>) {
		*self.listener.write() = Some(listener);
	}
}
