// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Offline content validation for the `check` command.

use std::fmt;

use chooser_server_content::{ContentStorage, StorageError};
use serde::Serialize;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VersionReport {
	pub version: String,
	pub content_items: usize,
	pub ui_items: usize,
	pub rules: usize,
	/// `rule <id> (<type>): <reason>` for each stored value that fails validation
	pub invalid_rules: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CheckReport {
	pub versions: Vec<VersionReport>,
}

impl CheckReport {
	pub fn invalid_rule_count(&self) -> usize {
		self.versions.iter().map(|v| v.invalid_rules.len()).sum()
	}

	pub fn is_ok(&self) -> bool {
		self.invalid_rule_count() == 0
	}
}

impl fmt::Display for CheckReport {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		for v in &self.versions {
			writeln!(
				f,
				"{}: {} content items, {} ui items, {} rules",
				v.version, v.content_items, v.ui_items, v.rules
			)?;
			for problem in &v.invalid_rules {
				writeln!(f, "  invalid {problem}")?;
			}
		}
		if self.is_ok() {
			write!(f, "content OK")
		} else {
			write!(f, "{} invalid rule value(s)", self.invalid_rule_count())
		}
	}
}

/// Loads storage once and re-validates every stored rule value.
pub async fn check_storage(storage: &dyn ContentStorage) -> Result<CheckReport, StorageError> {
	let versions = storage.load_all().await?;
	let mut report = CheckReport::default();

	for (version, tree) in &versions {
		let invalid_rules: Vec<String> = tree
			.rules()
			.filter_map(|rule| {
				rule.validate()
					.err()
					.map(|e| format!("rule {} ({}): {e}", rule.id, rule.rule_type.name()))
			})
			.collect();

		for problem in &invalid_rules {
			warn!(version = %version, problem = %problem, "invalid stored rule");
		}

		report.versions.push(VersionReport {
			version: version.clone(),
			content_items: tree.items.len(),
			ui_items: tree.ui_item_count(),
			rules: tree.rules().count(),
			invalid_rules,
		});
	}

	info!(
		storage = storage.name(),
		versions = report.versions.len(),
		invalid = report.invalid_rule_count(),
		"content check finished"
	);
	Ok(report)
}

#[cfg(test)]
mod tests {
	use super::*;
	use chooser_core::{ContentItem, ContentTree, Rule, RuleKind, RuleType, RuleValue, UiItem};
	use chooser_server_content::{MemoryStorage, VersionedContent};

	#[tokio::test]
	async fn test_check_reports_invalid_values() {
		let good = Rule::new(1, RuleType::new(5, RuleKind::Enable), RuleValue::Bool(true)).unwrap();
		let bad = Rule {
			id: 2,
			rule_type: RuleType::new(2, RuleKind::Privacy),
			value: RuleValue::from("high"),
		};
		let tree = ContentTree::new(vec![ContentItem::new(1, "home")
			.with_ui_item(UiItem::new(1, "a", 1).with_rule(good))
			.with_ui_item(UiItem::new(2, "b", 2).with_rule(bad))]);
		let storage = MemoryStorage::new(VersionedContent::from([("2.2".to_string(), tree)]));

		let report = check_storage(&storage).await.unwrap();
		assert!(!report.is_ok());
		assert_eq!(report.versions[0].ui_items, 2);
		assert_eq!(report.versions[0].rules, 2);
		assert_eq!(report.versions[0].invalid_rules.len(), 1);
		assert!(report.versions[0].invalid_rules[0].starts_with("rule 2 (privacy)"));
		assert!(report.to_string().ends_with("1 invalid rule value(s)"));
	}

	#[tokio::test]
	async fn test_check_propagates_storage_errors() {
		let storage = MemoryStorage::default();
		storage.set_unavailable(true);
		assert!(check_storage(&storage).await.is_err());
	}

	#[tokio::test]
	async fn test_check_clean_content() {
		let storage = MemoryStorage::new(VersionedContent::from([(
			"3.0".to_string(),
			ContentTree::new(vec![ContentItem::new(1, "home").with_ui_item(UiItem::new(1, "a", 1))]),
		)]));
		let report = check_storage(&storage).await.unwrap();
		assert!(report.is_ok());
		assert_eq!(report.to_string(), "3.0: 1 content items, 1 ui items, 0 rules\ncontent OK");
	}
}
