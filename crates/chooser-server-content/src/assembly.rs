// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use chooser_core::{ContentTree, RequestContext, UiItem};
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Visible UI item names grouped by content item name.
///
/// Serializes as a JSON object with keys in content tree order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UiContent {
	entries: Vec<(String, Vec<String>)>,
}

impl UiContent {
	pub fn get(&self, name: &str) -> Option<&[String]> {
		self.entries
			.iter()
			.find(|(n, _)| n == name)
			.map(|(_, items)| items.as_slice())
	}

	pub fn contains(&self, name: &str) -> bool {
		self.get(name).is_some()
	}

	pub fn names(&self) -> impl Iterator<Item = &str> {
		self.entries.iter().map(|(n, _)| n.as_str())
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
		self.entries
			.iter()
			.map(|(n, items)| (n.as_str(), items.as_slice()))
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Same-named content items behave like map keys: the later one replaces
	/// the earlier entry at its original position.
	fn insert(&mut self, name: &str, items: Vec<String>) {
		match self.entries.iter_mut().find(|(n, _)| n == name) {
			Some(entry) => entry.1 = items,
			None => self.entries.push((name.to_string(), items)),
		}
	}
}

impl Serialize for UiContent {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		let mut map = serializer.serialize_map(Some(self.entries.len()))?;
		for (name, items) in &self.entries {
			map.serialize_entry(name, items)?;
		}
		map.end()
	}
}

/// Filters one content tree for a caller.
///
/// Content items keep tree order. Within each, UI items are stable-sorted by
/// `order` and kept when every attached rule matches. Content items left with
/// no visible UI items are omitted.
pub fn assemble(tree: &ContentTree, ctx: &RequestContext) -> UiContent {
	let mut content = UiContent::default();

	for item in &tree.items {
		let mut ui_items: Vec<&UiItem> = item.ui_items.iter().collect();
		ui_items.sort_by_key(|ui| ui.order);

		let visible: Vec<String> = ui_items
			.into_iter()
			.filter(|ui| ui.is_visible(ctx))
			.map(|ui| ui.name.clone())
			.collect();

		if !visible.is_empty() {
			content.insert(&item.name, visible);
		}
	}

	content
}
