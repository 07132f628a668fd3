// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Raw configured value of a rule.
///
/// Stored and transported as plain JSON. Each rule type inspects it through
/// the checked accessors below instead of assuming a shape.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleValue {
	#[default]
	Null,
	Bool(bool),
	Number(f64),
	String(String),
	List(Vec<RuleValue>),
	Map(BTreeMap<String, RuleValue>),
}

impl RuleValue {
	pub fn as_bool(&self) -> Option<bool> {
		match self {
			RuleValue::Bool(b) => Some(*b),
			_ => None,
		}
	}

	pub fn as_f64(&self) -> Option<f64> {
		match self {
			RuleValue::Number(n) => Some(*n),
			_ => None,
		}
	}

	pub fn as_str(&self) -> Option<&str> {
		match self {
			RuleValue::String(s) => Some(s),
			_ => None,
		}
	}

	pub fn as_list(&self) -> Option<&[RuleValue]> {
		match self {
			RuleValue::List(items) => Some(items),
			_ => None,
		}
	}

	pub fn as_map(&self) -> Option<&BTreeMap<String, RuleValue>> {
		match self {
			RuleValue::Map(map) => Some(map),
			_ => None,
		}
	}

	/// Looks up a key when the value is a map.
	pub fn get(&self, key: &str) -> Option<&RuleValue> {
		self.as_map().and_then(|map| map.get(key))
	}

	pub fn is_null(&self) -> bool {
		matches!(self, RuleValue::Null)
	}

	/// Short shape name used in validation messages and logs.
	pub fn kind(&self) -> &'static str {
		match self {
			RuleValue::Null => "null",
			RuleValue::Bool(_) => "bool",
			RuleValue::Number(_) => "number",
			RuleValue::String(_) => "string",
			RuleValue::List(_) => "list",
			RuleValue::Map(_) => "map",
		}
	}
}

impl From<serde_json::Value> for RuleValue {
	fn from(value: serde_json::Value) -> Self {
		match value {
			serde_json::Value::Null => RuleValue::Null,
			serde_json::Value::Bool(b) => RuleValue::Bool(b),
			serde_json::Value::Number(n) => n.as_f64().map(RuleValue::Number).unwrap_or_default(),
			serde_json::Value::String(s) => RuleValue::String(s),
			serde_json::Value::Array(items) => {
				RuleValue::List(items.into_iter().map(RuleValue::from).collect())
			}
			serde_json::Value::Object(map) => RuleValue::Map(
				map.into_iter()
					.map(|(k, v)| (k, RuleValue::from(v)))
					.collect(),
			),
		}
	}
}

impl From<bool> for RuleValue {
	fn from(b: bool) -> Self {
		RuleValue::Bool(b)
	}
}

impl From<f64> for RuleValue {
	fn from(n: f64) -> Self {
		RuleValue::Number(n)
	}
}

impl From<&str> for RuleValue {
	fn from(s: &str) -> Self {
		RuleValue::String(s.to_string())
	}
}

impl From<String> for RuleValue {
	fn from(s: String) -> Self {
		RuleValue::String(s)
	}
}
