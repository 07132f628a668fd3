// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Role expression evaluation.
//!
//! An expression is either a role name or a list:
//!
//! - `["admin"]` evaluates the single element
//! - `["NOT", expr]` negates `expr`
//! - `[expr, "AND", expr, "OR", expr, ...]` folds left to right with no
//!   operator precedence; pairs with an unknown operator are skipped
//!
//! Shapes that fit none of these (empty lists, numbers, maps, ...) evaluate to
//! `true`. Access rules built from them stay open rather than hiding content.

use std::collections::BTreeSet;

use crate::value::RuleValue;

pub const OP_NOT: &str = "NOT";
pub const OP_AND: &str = "AND";
pub const OP_OR: &str = "OR";

/// Evaluates a role expression against the caller's roles.
///
/// `roles` is `None` when the caller has no identity; no leaf matches then.
pub fn evaluate(expr: &RuleValue, roles: Option<&BTreeSet<String>>) -> bool {
	if let Some(role) = expr.as_str() {
		return roles.is_some_and(|r| r.contains(role));
	}
	expr.as_list()
		.map_or(true, |items| evaluate_list(items, roles))
}

fn evaluate_list(items: &[RuleValue], roles: Option<&BTreeSet<String>>) -> bool {
	match items {
		[] => true,
		[single] => evaluate(single, roles),
		[RuleValue::String(op), operand] if op == OP_NOT => !evaluate(operand, roles),
		[first, rest @ ..] => {
			let mut result = evaluate(first, roles);
			for pair in rest.chunks_exact(2) {
				match pair[0].as_str() {
					Some(OP_AND) => result = result && evaluate(&pair[1], roles),
					Some(OP_OR) => result = result || evaluate(&pair[1], roles),
					_ => {}
				}
			}
			result
		}
	}
}
