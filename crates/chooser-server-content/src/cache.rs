// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Snapshot cache for loaded content.
//!
//! The cache holds at most one [`ContentSnapshot`]. Publishing swaps the
//! `Arc` in a single step, so a reader holds either the old or the new
//! snapshot for the whole of its query. Readers that arrive before the first
//! publish wait on a watch channel until one exists.

use std::sync::Arc;

use chooser_core::ContentTree;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use tokio::sync::watch;
use tracing::debug;

use crate::error::{ContentError, Result};
use crate::storage::VersionedContent;

/// Loading state of the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheState {
	Uninitialized,
	Loading,
	Ready,
}

/// Immutable content of all data versions as of one load.
#[derive(Debug, Serialize)]
pub struct ContentSnapshot {
	pub generation: u64,
	pub loaded_at: DateTime<Utc>,
	pub versions: VersionedContent,
}

impl ContentSnapshot {
	pub fn tree(&self, version: &str) -> Option<&ContentTree> {
		self.versions.get(version)
	}

	pub fn version_ids(&self) -> Vec<String> {
		self.versions.keys().cloned().collect()
	}
}

/// Bookkeeping about loads, reported through health.
#[derive(Debug, Clone)]
pub struct CacheStatus {
	pub state: CacheState,
	pub generation: u64,
	pub last_success: Option<DateTime<Utc>>,
	pub last_error: Option<String>,
	pub consecutive_failures: u32,
}

impl Default for CacheStatus {
	fn default() -> Self {
		Self {
			state: CacheState::Uninitialized,
			generation: 0,
			last_success: None,
			last_error: None,
			consecutive_failures: 0,
		}
	}
}

pub struct ContentCache {
	snapshot_tx: watch::Sender<Option<Arc<ContentSnapshot>>>,
	status: RwLock<CacheStatus>,
}

impl ContentCache {
	pub fn new() -> Self {
		let (snapshot_tx, _) = watch::channel(None);
		Self {
			snapshot_tx,
			status: RwLock::new(CacheStatus::default()),
		}
	}

	/// Current snapshot without waiting.
	pub fn current(&self) -> Option<Arc<ContentSnapshot>> {
		self.snapshot_tx.borrow().clone()
	}

	/// Current snapshot, waiting for the first publish if there is none yet.
	///
	/// Once a snapshot has been published this returns immediately, even
	/// while a later reload is in progress or has failed.
	pub async fn snapshot(&self) -> Result<Arc<ContentSnapshot>> {
		if let Some(snapshot) = self.current() {
			return Ok(snapshot);
		}

		let mut rx = self.snapshot_tx.subscribe();
		let published = rx
			.wait_for(Option::is_some)
			.await
			.map_err(|_| ContentError::CacheClosed)?;
		published.clone().ok_or(ContentError::CacheClosed)
	}

	/// Marks a reload as started.
	pub fn begin_load(&self) {
		self.status.write().state = CacheState::Loading;
	}

	/// Publishes freshly loaded content as the new snapshot.
	pub fn publish(&self, versions: VersionedContent) -> Arc<ContentSnapshot> {
		let mut status = self.status.write();
		let snapshot = Arc::new(ContentSnapshot {
			generation: status.generation + 1,
			loaded_at: Utc::now(),
			versions,
		});

		self.snapshot_tx.send_replace(Some(Arc::clone(&snapshot)));

		status.generation = snapshot.generation;
		status.state = CacheState::Ready;
		status.last_success = Some(snapshot.loaded_at);
		status.last_error = None;
		status.consecutive_failures = 0;

		debug!(
			generation = snapshot.generation,
			versions = snapshot.versions.len(),
			"published content snapshot"
		);
		snapshot
	}

	/// Records a failed reload. The published snapshot, if any, stays.
	pub fn record_failure(&self, error: impl Into<String>) {
		let mut status = self.status.write();
		status.state = CacheState::Loading;
		status.last_error = Some(error.into());
		status.consecutive_failures += 1;
	}

	pub fn state(&self) -> CacheState {
		self.status.read().state
	}

	pub fn is_ready(&self) -> bool {
		self.state() == CacheState::Ready
	}

	pub fn status(&self) -> CacheStatus {
		self.status.read().clone()
	}
}

impl Default for ContentCache {
	fn default() -> Self {
		Self::new()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use chooser_core::ContentItem;
	use std::time::Duration;

	fn versions(name: &str) -> VersionedContent {
		VersionedContent::from([(
			"1.0".to_string(),
			ContentTree::new(vec![ContentItem::new(1, name)]),
		)])
	}

	#[test]
	fn test_initial_state() {
		let cache = ContentCache::new();
		assert_eq!(cache.state(), CacheState::Uninitialized);
		assert!(cache.current().is_none());
		assert!(!cache.is_ready());
	}

	#[test]
	fn test_publish_increments_generation() {
		let cache = ContentCache::new();
		cache.begin_load();
		assert_eq!(cache.state(), CacheState::Loading);

		let first = cache.publish(versions("home"));
		let second = cache.publish(versions("browse"));

		assert_eq!(first.generation, 1);
		assert_eq!(second.generation, 2);
		assert!(cache.is_ready());
		assert_eq!(cache.current().unwrap().generation, 2);
		// earlier readers keep their snapshot
		assert_eq!(first.tree("1.0").unwrap().items[0].name, "home");
	}

	#[test]
	fn test_failure_keeps_snapshot() {
		let cache = ContentCache::new();
		cache.publish(versions("home"));

		cache.begin_load();
		cache.record_failure("disk on fire");

		let status = cache.status();
		assert_eq!(status.state, CacheState::Loading);
		assert_eq!(status.consecutive_failures, 1);
		assert_eq!(status.last_error.as_deref(), Some("disk on fire"));
		assert_eq!(cache.current().unwrap().generation, 1);

		cache.publish(versions("home"));
		let status = cache.status();
		assert_eq!(status.consecutive_failures, 0);
		assert!(status.last_error.is_none());
	}

	#[tokio::test]
	async fn test_snapshot_waits_for_first_publish() {
		let cache = Arc::new(ContentCache::new());

		let reader = {
			let cache = Arc::clone(&cache);
			tokio::spawn(async move { cache.snapshot().await.map(|s| s.generation) })
		};

		tokio::time::sleep(Duration::from_millis(20)).await;
		assert!(!reader.is_finished());

		cache.publish(versions("home"));
		let generation = tokio::time::timeout(Duration::from_secs(1), reader)
			.await
			.expect("reader woke up")
			.unwrap()
			.unwrap();
		assert_eq!(generation, 1);
	}

	#[tokio::test]
	async fn test_snapshot_returns_immediately_when_published() {
		let cache = ContentCache::new();
		cache.publish(versions("home"));
		cache.begin_load();

		let snapshot = tokio_test::assert_ready!(tokio_test::task::spawn(cache.snapshot()).poll());
		assert_eq!(snapshot.unwrap().generation, 1);
	}
}
