// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Entry points for the administration surface.
//!
//! Content CRUD lives outside this crate. It validates rule values here
//! before writing, and asks for a reload after each successful write.

use std::sync::Arc;

use chooser_core::{RuleKind, RuleType, RuleValue};
use tracing::{info, instrument};

use crate::cache::ContentSnapshot;
use crate::error::{ContentError, Result};
use crate::service::ContentService;

/// Resolves a rule type by name and checks a value for it.
pub fn validate_rule(rule_type: &str, value: &RuleValue) -> chooser_core::Result<RuleType> {
	let kind = RuleKind::from_name(rule_type)?;
	kind.validate(value)?;
	Ok(registered_rule_type(kind))
}

/// All rule types that can be attached to UI items.
pub fn rule_types() -> Vec<RuleType> {
	RuleType::registry()
}

fn registered_rule_type(kind: RuleKind) -> RuleType {
	rule_types()
		.into_iter()
		.find(|rt| rt.kind == kind)
		.unwrap_or(RuleType::new(0, kind))
}

impl ContentService {
	/// Distinct rule types used by one data version.
	pub async fn rule_types_for(&self, data_version: &str) -> Result<Vec<RuleType>> {
		let snapshot = self.cache.snapshot().await?;
		snapshot
			.tree(data_version)
			.map(|tree| tree.rule_types())
			.ok_or_else(|| ContentError::VersionNotFound(data_version.to_string()))
	}

	/// The complete loaded content, every data version included.
	pub async fn full_content(&self) -> Result<Arc<ContentSnapshot>> {
		self.cache.snapshot().await
	}

	/// Reloads content from storage and waits for the outcome.
	#[instrument(skip(self))]
	pub async fn reload_content(&self) -> Result<Arc<ContentSnapshot>> {
		let snapshot = self.coordinator.reload_now().await?;
		info!(generation = snapshot.generation, "content reloaded on request");
		Ok(snapshot)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::storage::{MemoryStorage, VersionedContent};
	use chooser_core::{ContentItem, ContentTree, Rule, RuleError, UiItem};
	use serde_json::json;

	#[test]
	fn test_validate_rule_accepts_valid_value() {
		let rt = validate_rule("platform", &RuleValue::from(json!({"os": "android"}))).unwrap();
		assert_eq!(rt.kind, RuleKind::Platform);
		assert_ne!(rt.id, 0);
	}

	#[test]
	fn test_validate_rule_unknown_type() {
		assert_eq!(
			validate_rule("geo", &RuleValue::Null),
			Err(RuleError::UnknownRuleType("geo".to_string()))
		);
	}

	#[test]
	fn test_validate_rule_invalid_value() {
		let err = validate_rule("privacy", &RuleValue::from("high")).unwrap_err();
		assert!(matches!(err, RuleError::InvalidRuleValue { rule_type, .. } if rule_type == "privacy"));
	}

	#[test]
	fn test_rule_types_cover_all_kinds() {
		let names: Vec<_> = rule_types().iter().map(|rt| rt.name()).collect();
		assert_eq!(
			names,
			vec!["roles", "privacy", "auth", "illini_cash", "enable", "platform"]
		);
	}

	#[tokio::test]
	async fn test_rule_types_for_version_and_reload() {
		let enable = Rule::new(7, RuleType::new(5, RuleKind::Enable), RuleValue::Bool(true)).unwrap();
		let tree = ContentTree::new(vec![
			ContentItem::new(1, "home").with_ui_item(UiItem::new(1, "a", 1).with_rule(enable))
		]);
		let storage = Arc::new(MemoryStorage::new(VersionedContent::from([(
			"3.0".to_string(),
			tree,
		)])));
		let service = ContentService::new(storage.clone());

		let snapshot = service.reload_content().await.unwrap();
		assert_eq!(snapshot.generation, 1);

		assert_eq!(
			service.rule_types_for("3.0").await.unwrap(),
			vec![RuleType::new(5, RuleKind::Enable)]
		);
		assert!(matches!(
			service.rule_types_for("1.2").await,
			Err(ContentError::VersionNotFound(_))
		));

		let full = service.full_content().await.unwrap();
		assert_eq!(full.version_ids(), vec!["3.0".to_string()]);
	}
}
