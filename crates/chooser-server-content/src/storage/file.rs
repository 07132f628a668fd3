// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! JSON file storage.
//!
//! The file holds one document per data version in the normalized layout the
//! admin tooling exports:
//!
//! ```json
//! [{
//!   "version": "2.2",
//!   "data": {
//!     "content_items": [{"id": 1, "name": "home"}],
//!     "ui_items": [{"id": 1, "name": "weather", "order": 1}],
//!     "content_items_ui_items": [{"id": 1, "content_item_id": 1, "ui_item_id": 1}],
//!     "rule_types": [{"id": 1, "name": "enable"}],
//!     "rules": [{"id": 1, "rule_type_id": 1, "value": true}],
//!     "rules_ui_items": [{"id": 1, "ui_item_id": 1, "rule_id": 1}]
//!   }
//! }]
//! ```
//!
//! Changes are detected by polling the file's modification time.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use chooser_core::{ContentItem, ContentTree, Rule, RuleType, RuleValue, UiItem};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::{ChangeListener, ContentStorage, VersionedContent};
use crate::error::StorageError;

type ListenerSlot = Arc<RwLock<Option<Arc<dyn ChangeListener>>>>;

pub struct FileStorage {
	path: PathBuf,
	listener: ListenerSlot,
}

impl FileStorage {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self {
			path: path.into(),
			listener: Arc::new(RwLock::new(None)),
		}
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	/// Starts polling the file for modifications.
	///
	/// Each change of the modification time (including the file appearing or
	/// disappearing) notifies the registered listener once. Polling stops when
	/// the returned handle is stopped or dropped.
	pub fn start_polling(&self, interval: Duration) -> FilePoller {
		let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>(1);
		let path = self.path.clone();
		let listener = Arc::clone(&self.listener);

		let handle = tokio::spawn(async move {
			run_poll_loop(path, listener, interval, shutdown_rx).await;
		});

		FilePoller {
			shutdown_tx: Some(shutdown_tx),
			task_handle: Some(handle),
		}
	}
}

#[async_trait]
impl ContentStorage for FileStorage {
	fn name(&self) -> &'static str {
		"file"
	}

	async fn load_all(&self) -> Result<VersionedContent, StorageError> {
		let raw = match tokio::fs::read(&self.path).await {
			Ok(raw) => raw,
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
				return Err(StorageError::NotFound(self.path.display().to_string()));
			}
			Err(e) => return Err(e.into()),
		};

		let documents: Vec<VersionDocument> = serde_json::from_slice(&raw)?;
		let mut versions = VersionedContent::new();
		for document in documents {
			let tree = document.data.into_tree().map_err(|reason| {
				StorageError::InvalidData(format!("version {}: {reason}", document.version))
			})?;
			if versions.insert(document.version.clone(), tree).is_some() {
				return Err(StorageError::InvalidData(format!(
					"duplicate data version {}",
					document.version
				)));
			}
		}

		debug!(
			path = %self.path.display(),
			versions = versions.len(),
			"loaded content file"
		);
		Ok(versions)
	}

	fn set_listener(&self, listener: Arc<dyn ChangeListener>) {
		*self.listener.write() = Some(listener);
	}
}

/// Handle to a running file poll task.
#[derive(Debug)]
pub struct FilePoller {
	shutdown_tx: Option<mpsc::Sender<()>>,
	task_handle: Option<JoinHandle<()>>,
}

impl FilePoller {
	pub async fn stop(&mut self) {
		if let Some(tx) = self.shutdown_tx.take() {
			let _ = tx.send(()).await;
		}
		if let Some(handle) = self.task_handle.take() {
			let _ = handle.await;
		}
	}
}

impl Drop for FilePoller {
	fn drop(&mut self) {
		if let Some(handle) = self.task_handle.take() {
			handle.abort();
		}
	}
}

async fn modified_at(path: &Path) -> Option<SystemTime> {
	tokio::fs::metadata(path)
		.await
		.ok()
		.and_then(|m| m.modified().ok())
}

async fn run_poll_loop(
	path: PathBuf,
	listener: ListenerSlot,
	interval: Duration,
	mut shutdown_rx: mpsc::Receiver<()>,
) {
	let mut last_seen = modified_at(&path).await;
	let mut ticker = tokio::time::interval(interval);
	ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
	// first tick completes immediately
	ticker.tick().await;

	info!(path = %path.display(), interval_ms = interval.as_millis() as u64, "polling content file");

	loop {
		tokio::select! {
			_ = ticker.tick() => {
				let current = modified_at(&path).await;
				if current != last_seen {
					last_seen = current;
					debug!(path = %path.display(), exists = current.is_some(), "content file changed");
					let listener = listener.read().clone();
					match listener {
						Some(listener) => listener.on_data_changed(),
						None => warn!("content file changed but no listener is registered"),
					}
				}
			}
			_ = shutdown_rx.recv() => {
				debug!(path = %path.display(), "stopping content file poll");
				break;
			}
		}
	}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct VersionDocument {
	version: String,
	data: VersionData,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct VersionData {
	#[serde(default)]
	content_items: Vec<ContentItemRecord>,
	#[serde(default)]
	ui_items: Vec<UiItemRecord>,
	#[serde(default)]
	content_items_ui_items: Vec<ContentItemUiItemRecord>,
	#[serde(default)]
	rule_types: Vec<RuleTypeRecord>,
	#[serde(default)]
	rules: Vec<RuleRecord>,
	#[serde(default)]
	rules_ui_items: Vec<RuleUiItemRecord>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	last_updated: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	last_updated_by: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ContentItemRecord {
	id: i64,
	name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct UiItemRecord {
	id: i64,
	name: String,
	order: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ContentItemUiItemRecord {
	id: i64,
	content_item_id: i64,
	ui_item_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RuleTypeRecord {
	id: i64,
	name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RuleRecord {
	id: i64,
	rule_type_id: i64,
	#[serde(default)]
	value: RuleValue,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RuleUiItemRecord {
	id: i64,
	ui_item_id: i64,
	rule_id: i64,
}

impl VersionData {
	/// Joins the relation tables into a content tree.
	fn into_tree(self) -> Result<ContentTree, String> {
		let rule_types: HashMap<i64, RuleType> = self
			.rule_types
			.iter()
			.map(|rt| {
				RuleType::from_record(rt.id, &rt.name)
					.map(|rule_type| (rt.id, rule_type))
					.map_err(|e| e.to_string())
			})
			.collect::<Result<_, _>>()?;

		let mut rules: HashMap<i64, Rule> = HashMap::with_capacity(self.rules.len());
		for record in self.rules {
			let rule_type = *rule_types.get(&record.rule_type_id).ok_or_else(|| {
				format!(
					"rule {} references unknown rule type {}",
					record.id, record.rule_type_id
				)
			})?;
			let rule = Rule {
				id: record.id,
				rule_type,
				value: record.value,
			};
			if let Err(e) = rule.validate() {
				warn!(rule_id = rule.id, error = %e, "stored rule value does not validate");
			}
			rules.insert(rule.id, rule);
		}

		let ui_items: HashMap<i64, &UiItemRecord> =
			self.ui_items.iter().map(|ui| (ui.id, ui)).collect();

		let mut items = Vec::with_capacity(self.content_items.len());
		for content in &self.content_items {
			let mut item = ContentItem::new(content.id, content.name.clone());
			for link in self
				.content_items_ui_items
				.iter()
				.filter(|link| link.content_item_id == content.id)
			{
				let ui = ui_items.get(&link.ui_item_id).ok_or_else(|| {
					format!(
						"content item {} references unknown ui item {}",
						content.id, link.ui_item_id
					)
				})?;

				let mut ui_item = UiItem::new(ui.id, ui.name.clone(), ui.order);
				for rule_link in self
					.rules_ui_items
					.iter()
					.filter(|rule_link| rule_link.ui_item_id == ui.id)
				{
					let rule = rules.get(&rule_link.rule_id).ok_or_else(|| {
						format!(
							"ui item {} references unknown rule {}",
							ui.id, rule_link.rule_id
						)
					})?;
					ui_item.rules.push(rule.clone());
				}
				item.ui_items.push(ui_item);
			}
			items.push(item);
		}

		Ok(ContentTree::new(items))
	}
}
