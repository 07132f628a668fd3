// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::context::RequestContext;
use crate::error::Result;
use crate::rule::{RuleKind, RuleType};
use crate::value::RuleValue;

/// Content of one data version.
///
/// Content items keep their stored order; UI items are sorted at query time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentTree {
	#[serde(default)]
	pub items: Vec<ContentItem>,
}

impl ContentTree {
	pub fn new(items: Vec<ContentItem>) -> Self {
		Self { items }
	}

	/// Distinct rule types referenced anywhere in the tree, ordered by id.
	pub fn rule_types(&self) -> Vec<RuleType> {
		let set: BTreeSet<(i64, RuleKind)> = self
			.rules()
			.map(|rule| (rule.rule_type.id, rule.rule_type.kind))
			.collect();
		set.into_iter()
			.map(|(id, kind)| RuleType::new(id, kind))
			.collect()
	}

	pub fn rules(&self) -> impl Iterator<Item = &Rule> {
		self.items
			.iter()
			.flat_map(|item| item.ui_items.iter())
			.flat_map(|ui| ui.rules.iter())
	}

	pub fn ui_item_count(&self) -> usize {
		self.items.iter().map(|item| item.ui_items.len()).sum()
	}
}

/// A named section of the client UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
	pub id: i64,
	pub name: String,
	#[serde(default, rename = "ui-items", alias = "ui_items")]
	pub ui_items: Vec<UiItem>,
}

impl ContentItem {
	pub fn new(id: i64, name: impl Into<String>) -> Self {
		Self {
			id,
			name: name.into(),
			ui_items: Vec::new(),
		}
	}

	pub fn with_ui_item(mut self, item: UiItem) -> Self {
		self.ui_items.push(item);
		self
	}
}

/// A UI element inside a content item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiItem {
	pub id: i64,
	pub name: String,
	pub order: i64,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub rules: Vec<Rule>,
}

impl UiItem {
	pub fn new(id: i64, name: impl Into<String>, order: i64) -> Self {
		Self {
			id,
			name: name.into(),
			order,
			rules: Vec::new(),
		}
	}

	pub fn with_rule(mut self, rule: Rule) -> Self {
		self.rules.push(rule);
		self
	}

	/// Conjunction of all rules; stops at the first failing rule.
	pub fn is_visible(&self, ctx: &RequestContext) -> bool {
		self.rules.iter().all(|rule| rule.matches(ctx))
	}
}

/// A configured visibility condition attached to a UI item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
	pub id: i64,
	pub rule_type: RuleType,
	#[serde(default)]
	pub value: RuleValue,
}

impl Rule {
	/// Creates a rule after validating its value for the rule type.
	pub fn new(id: i64, rule_type: RuleType, value: RuleValue) -> Result<Self> {
		rule_type.kind.validate(&value)?;
		Ok(Self {
			id,
			rule_type,
			value,
		})
	}

	pub fn matches(&self, ctx: &RequestContext) -> bool {
		self.rule_type.kind.matches(ctx, &self.value)
	}

	/// Re-checks the stored value; used when loading unvalidated data.
	pub fn validate(&self) -> Result<()> {
		self.rule_type.kind.validate(&self.value)
	}
}
