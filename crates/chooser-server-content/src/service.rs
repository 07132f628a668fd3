// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::sync::Arc;
use std::time::Duration;

use chooser_core::RequestContext;
use tracing::{debug, instrument};

use crate::assembly::{assemble, UiContent};
use crate::cache::{ContentCache, ContentSnapshot};
use crate::error::{ContentError, Result};
use crate::health::ContentHealth;
use crate::reload::ReloadCoordinator;
use crate::storage::ContentStorage;

/// Query entry point: owns the cache and the reload coordinator for one
/// storage backend.
pub struct ContentService {
	pub(crate) cache: Arc<ContentCache>,
	pub(crate) coordinator: ReloadCoordinator,
}

impl ContentService {
	pub fn new(storage: Arc<dyn ContentStorage>) -> Self {
		let cache = Arc::new(ContentCache::new());
		let coordinator = ReloadCoordinator::new(storage, Arc::clone(&cache));
		Self { cache, coordinator }
	}

	/// Starts background reloading and schedules the first load.
	pub fn start(&self) {
		self.coordinator.start();
	}

	/// Waits until content has been loaded once, up to `timeout`.
	pub async fn wait_until_ready(&self, timeout: Duration) -> Result<Arc<ContentSnapshot>> {
		tokio::time::timeout(timeout, self.cache.snapshot())
			.await
			.map_err(|_| ContentError::NotReady)?
	}

	/// Visible UI content of one data version for a caller.
	///
	/// Waits for the first load if none has completed yet.
	#[instrument(
		skip(self, ctx),
		fields(
			has_identity = ctx.identity.is_some(),
			auth_version = ctx.auth.as_ref().map(|a| a.version()),
			has_platform = ctx.platform.is_some(),
		)
	)]
	pub async fn ui_content(&self, data_version: &str, ctx: &RequestContext) -> Result<UiContent> {
		let snapshot = self.cache.snapshot().await?;
		let tree = snapshot
			.tree(data_version)
			.ok_or_else(|| ContentError::VersionNotFound(data_version.to_string()))?;

		let content = assemble(tree, ctx);
		debug!(
			generation = snapshot.generation,
			content_items = content.len(),
			"assembled ui content"
		);
		Ok(content)
	}

	/// Schedules a reload without waiting for it.
	pub fn notify_changed(&self) {
		self.coordinator.notify_changed();
	}

	pub fn health(&self) -> ContentHealth {
		let snapshot = self.cache.current();
		let versions = snapshot
			.as_ref()
			.map(|s| s.version_ids())
			.unwrap_or_default();
		ContentHealth::from_status(self.cache.status(), versions, snapshot.is_some())
	}

	pub async fn shutdown(&self) {
		self.coordinator.shutdown().await;
	}
}
