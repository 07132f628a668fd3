// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Reload coordination.
//!
//! Change notifications are handed to a single background worker through a
//! [`Notify`] permit: any number of notifications that arrive while a reload
//! is running collapse into one follow-up reload. Reloads are serialized, so
//! publishes happen in the order the loads finished and the last one wins.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;
use tokio::sync::{broadcast, Notify};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument};

use crate::cache::{ContentCache, ContentSnapshot};
use crate::error::Result;
use crate::storage::{ChangeListener, ContentStorage};

/// Cheap handle that schedules a reload; registered with storage as its
/// change listener.
#[derive(Clone)]
pub struct ReloadTrigger {
	pending: Arc<Notify>,
}

impl ReloadTrigger {
	/// Schedules a reload without waiting for it.
	pub fn notify(&self) {
		self.pending.notify_one();
	}
}

impl ChangeListener for ReloadTrigger {
	fn on_data_changed(&self) {
		debug!("content changed, scheduling reload");
		self.notify();
	}
}

struct Reloader {
	storage: Arc<dyn ContentStorage>,
	cache: Arc<ContentCache>,
	lock: tokio::sync::Mutex<()>,
	completed: AtomicU64,
	failed: AtomicU64,
}

impl Reloader {
	async fn reload(&self, trigger: &'static str) -> Result<Arc<ContentSnapshot>> {
		let _guard = self.lock.lock().await;
		self.cache.begin_load();

		let started = Instant::now();
		match self.storage.load_all().await {
			Ok(versions) => {
				let snapshot = self.cache.publish(versions);
				self.completed.fetch_add(1, Ordering::SeqCst);
				info!(
					trigger,
					storage = self.storage.name(),
					generation = snapshot.generation,
					versions = snapshot.versions.len(),
					duration_ms = started.elapsed().as_millis() as u64,
					"content reloaded"
				);
				Ok(snapshot)
			}
			Err(e) => {
				self.failed.fetch_add(1, Ordering::SeqCst);
				self.cache.record_failure(e.to_string());
				error!(
					trigger,
					storage = self.storage.name(),
					error = %e,
					serving_previous = self.cache.current().is_some(),
					"content reload failed"
				);
				Err(e.into())
			}
		}
	}
}

pub struct ReloadCoordinator {
	reloader: Arc<Reloader>,
	trigger: ReloadTrigger,
	shutdown_tx: broadcast::Sender<()>,
	handle: Mutex<Option<JoinHandle<()>>>,
}

impl ReloadCoordinator {
	pub fn new(storage: Arc<dyn ContentStorage>, cache: Arc<ContentCache>) -> Self {
		let (shutdown_tx, _) = broadcast::channel(1);
		Self {
			reloader: Arc::new(Reloader {
				storage,
				cache,
				lock: tokio::sync::Mutex::new(()),
				completed: AtomicU64::new(0),
				failed: AtomicU64::new(0),
			}),
			trigger: ReloadTrigger {
				pending: Arc::new(Notify::new()),
			},
			shutdown_tx,
			handle: Mutex::new(None),
		}
	}

	/// Registers with storage, spawns the worker and schedules the initial
	/// load. Must run inside a Tokio runtime. Calling it again is a no-op.
	#[instrument(skip(self))]
	pub fn start(&self) {
		let mut handle = self.handle.lock();
		if handle.is_some() {
			return;
		}

		self.reloader
			.storage
			.set_listener(Arc::new(self.trigger.clone()));

		let reloader = Arc::clone(&self.reloader);
		let pending = Arc::clone(&self.trigger.pending);
		let mut shutdown_rx = self.shutdown_tx.subscribe();

		*handle = Some(tokio::spawn(async move {
			loop {
				tokio::select! {
					_ = pending.notified() => {
						// failures are recorded in the cache status
						let _ = reloader.reload("notification").await;
					}
					_ = shutdown_rx.recv() => {
						info!("reload worker shutting down");
						break;
					}
				}
			}
		}));

		self.trigger.notify();
		info!(storage = self.reloader.storage.name(), "reload coordinator started");
	}

	/// Schedules a reload and returns immediately.
	pub fn notify_changed(&self) {
		self.trigger.notify();
	}

	/// Reloads now and reports the outcome.
	///
	/// Waits for any reload already in flight first.
	#[instrument(skip(self))]
	pub async fn reload_now(&self) -> Result<Arc<ContentSnapshot>> {
		self.reloader.reload("request").await
	}

	/// Number of reloads that published a snapshot.
	pub fn completed_reloads(&self) -> u64 {
		self.reloader.completed.load(Ordering::SeqCst)
	}

	pub fn failed_reloads(&self) -> u64 {
		self.reloader.failed.load(Ordering::SeqCst)
	}

	#[instrument(skip(self))]
	pub async fn shutdown(&self) {
		let _ = self.shutdown_tx.send(());
		let handle = self.handle.lock().take();
		if let Some(handle) = handle {
			let _ = handle.await;
		}
		info!("reload coordinator shut down");
	}
}

impl Drop for ReloadCoordinator {
	fn drop(&mut self) {
		if let Some(handle) = self.handle.get_mut().take() {
			handle.abort();
		}
	}
}
