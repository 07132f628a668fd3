// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use thiserror::Error;

/// Configuration errors raised when a rule is created or loaded.
///
/// Matching never produces these: a rule that reaches query time has
/// already been validated, and any remaining ambiguity is resolved by the
/// matcher's own default.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RuleError {
	#[error("unknown rule type: {0}")]
	UnknownRuleType(String),

	#[error("invalid value for rule type '{rule_type}': {reason}")]
	InvalidRuleValue { rule_type: String, reason: String },
}

impl RuleError {
	pub fn invalid_value(rule_type: impl Into<String>, reason: impl Into<String>) -> Self {
		Self::InvalidRuleValue {
			rule_type: rule_type.into(),
			reason: reason.into(),
		}
	}
}

pub type Result<T> = std::result::Result<T, RuleError>;
