// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::auth;
use crate::context::RequestContext;
use crate::error::{Result, RuleError};
use crate::roles;
use crate::value::RuleValue;

/// Value key of the platform rule.
pub const PLATFORM_OS_KEY: &str = "os";
/// Value key of the loyalty rule.
pub const HOUSING_RESIDENCE_KEY: &str = "housingResidenceStatus";

/// The closed set of rule types a UI item can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RuleKind {
	Roles,
	Privacy,
	Auth,
	LoyaltyStatus,
	Enable,
	Platform,
}

impl RuleKind {
	pub const ALL: [RuleKind; 6] = [
		RuleKind::Roles,
		RuleKind::Privacy,
		RuleKind::Auth,
		RuleKind::LoyaltyStatus,
		RuleKind::Enable,
		RuleKind::Platform,
	];

	/// Storage name of the rule type.
	pub fn name(&self) -> &'static str {
		match self {
			RuleKind::Roles => "roles",
			RuleKind::Privacy => "privacy",
			RuleKind::Auth => "auth",
			RuleKind::LoyaltyStatus => "illini_cash",
			RuleKind::Enable => "enable",
			RuleKind::Platform => "platform",
		}
	}

	/// Looks a rule type up by its storage name.
	pub fn from_name(name: &str) -> Result<Self> {
		Self::ALL
			.into_iter()
			.find(|kind| kind.name() == name)
			.ok_or_else(|| RuleError::UnknownRuleType(name.to_string()))
	}

	/// Checks a configured value, explaining what is wrong with it.
	pub fn validate(&self, value: &RuleValue) -> Result<()> {
		let reason = match self {
			RuleKind::Roles => match value {
				RuleValue::String(_) | RuleValue::List(_) => None,
				other => Some(format!("expected a string or list, found {}", other.kind())),
			},
			RuleKind::Privacy => match value {
				RuleValue::Number(n) if n.is_finite() => None,
				RuleValue::Number(_) => Some("minimum level must be finite".to_string()),
				other => Some(format!("expected a number, found {}", other.kind())),
			},
			RuleKind::Enable => match value {
				RuleValue::Bool(_) => None,
				other => Some(format!("expected a bool, found {}", other.kind())),
			},
			RuleKind::Platform => match value.as_map() {
				None => Some(format!("expected a map, found {}", value.kind())),
				Some(map) => match map.get(PLATFORM_OS_KEY) {
					Some(RuleValue::String(_)) => None,
					Some(other) => Some(format!(
						"'{PLATFORM_OS_KEY}' must be a string, found {}",
						other.kind()
					)),
					None => Some(format!("missing '{PLATFORM_OS_KEY}'")),
				},
			},
			RuleKind::Auth => auth::validate(value).err(),
			RuleKind::LoyaltyStatus => match value.as_map() {
				None => Some(format!("expected a map, found {}", value.kind())),
				Some(map) => match map.get(HOUSING_RESIDENCE_KEY) {
					Some(RuleValue::Bool(_)) => None,
					Some(other) => Some(format!(
						"'{HOUSING_RESIDENCE_KEY}' must be a bool, found {}",
						other.kind()
					)),
					None => Some(format!("missing '{HOUSING_RESIDENCE_KEY}'")),
				},
			},
		};

		match reason {
			None => Ok(()),
			Some(reason) => Err(RuleError::invalid_value(self.name(), reason)),
		}
	}

	pub fn is_valid(&self, value: &RuleValue) -> bool {
		self.validate(value).is_ok()
	}

	/// Decides whether a configured value matches the request context.
	///
	/// Never fails. Values that would not pass [`RuleKind::validate`] do not
	/// match, except role expressions whose unknown shapes match.
	pub fn matches(&self, ctx: &RequestContext, value: &RuleValue) -> bool {
		match self {
			RuleKind::Roles => roles::evaluate(value, ctx.roles()),
			RuleKind::Privacy => match value.as_f64() {
				Some(min_level) => ctx
					.identity
					.as_ref()
					.is_some_and(|identity| identity.privacy_level >= min_level.trunc() as i64),
				None => self.mismatch(value),
			},
			RuleKind::Enable => match value.as_bool() {
				Some(enabled) => enabled,
				None => self.mismatch(value),
			},
			RuleKind::Platform => match value.get(PLATFORM_OS_KEY).and_then(RuleValue::as_str) {
				Some(wanted) => ctx
					.platform
					.as_ref()
					.and_then(|p| p.os.as_deref())
					.is_some_and(|os| os == wanted),
				None => self.mismatch(value),
			},
			RuleKind::LoyaltyStatus => {
				match value.get(HOUSING_RESIDENCE_KEY).and_then(RuleValue::as_bool) {
					Some(true) => ctx.loyalty.is_some_and(|l| l.housing_resident_status),
					Some(false) => !ctx.loyalty.is_some_and(|l| l.housing_resident_status),
					None => self.mismatch(value),
				}
			}
			RuleKind::Auth => match &ctx.auth {
				None => false,
				Some(payload) => match auth::evaluate(payload, value) {
					Ok(matched) => matched,
					Err(mismatch) => {
						warn!(
							rule_type = self.name(),
							auth_version = payload.version(),
							?mismatch,
							"auth rule value has unexpected shape, treating as no match"
						);
						false
					}
				},
			},
		}
	}

	fn mismatch(&self, value: &RuleValue) -> bool {
		warn!(
			rule_type = self.name(),
			found = value.kind(),
			"rule value has unexpected shape, treating as no match"
		);
		false
	}
}

impl fmt::Display for RuleKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

impl FromStr for RuleKind {
	type Err = RuleError;

	fn from_str(s: &str) -> Result<Self> {
		Self::from_name(s)
	}
}

/// A registered rule type: storage id plus behavior.
///
/// Serialized as `{"id": 1, "name": "roles"}`; deserializing an unknown name
/// fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RuleTypeRecord", into = "RuleTypeRecord")]
pub struct RuleType {
	pub id: i64,
	pub kind: RuleKind,
}

impl RuleType {
	pub fn new(id: i64, kind: RuleKind) -> Self {
		Self { id, kind }
	}

	/// Builds a rule type from its storage record.
	pub fn from_record(id: i64, name: &str) -> Result<Self> {
		Ok(Self::new(id, RuleKind::from_name(name)?))
	}

	pub fn name(&self) -> &'static str {
		self.kind.name()
	}

	/// Default registry: one rule type per kind, ids in declaration order.
	pub fn registry() -> Vec<RuleType> {
		RuleKind::ALL
			.into_iter()
			.zip(1..)
			.map(|(kind, id)| RuleType::new(id, kind))
			.collect()
	}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RuleTypeRecord {
	id: i64,
	name: String,
}

impl TryFrom<RuleTypeRecord> for RuleType {
	type Error = RuleError;

	fn try_from(record: RuleTypeRecord) -> Result<Self> {
		Self::from_record(record.id, &record.name)
	}
}

impl From<RuleType> for RuleTypeRecord {
	fn from(rule_type: RuleType) -> Self {
		Self {
			id: rule_type.id,
			name: rule_type.name().to_string(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::context::{AuthPayload, AuthTokens, AuthV2, Identity};
	use serde_json::json;

	fn value(v: serde_json::Value) -> RuleValue {
		RuleValue::from(v)
	}

	#[test]
	fn test_registry_names_round_trip() {
		for kind in RuleKind::ALL {
			assert_eq!(RuleKind::from_name(kind.name()).unwrap(), kind);
			assert_eq!(kind.to_string(), kind.name());
		}
		assert_eq!(
			RuleKind::from_name("geo"),
			Err(RuleError::UnknownRuleType("geo".to_string()))
		);
		assert_eq!("illini_cash".parse::<RuleKind>(), Ok(RuleKind::LoyaltyStatus));
	}

	#[test]
	fn test_rule_type_serde() {
		let rt: RuleType = serde_json::from_str(r#"{"id": 4, "name": "illini_cash"}"#).unwrap();
		assert_eq!(rt, RuleType::new(4, RuleKind::LoyaltyStatus));
		assert_eq!(
			serde_json::to_value(rt).unwrap(),
			json!({"id": 4, "name": "illini_cash"})
		);
		assert!(serde_json::from_str::<RuleType>(r#"{"id": 9, "name": "geo"}"#).is_err());
	}

	#[test]
	fn test_validate_per_kind() {
		assert!(RuleKind::Roles.is_valid(&value(json!("admin"))));
		assert!(RuleKind::Roles.is_valid(&value(json!(["NOT", "admin"]))));
		assert!(!RuleKind::Roles.is_valid(&value(json!(null))));

		assert!(RuleKind::Privacy.is_valid(&value(json!(3))));
		assert!(!RuleKind::Privacy.is_valid(&value(json!("3"))));

		assert!(RuleKind::Enable.is_valid(&value(json!(false))));
		assert!(!RuleKind::Enable.is_valid(&value(json!(0))));

		assert!(RuleKind::Platform.is_valid(&value(json!({"os": "ios"}))));
		assert!(!RuleKind::Platform.is_valid(&value(json!({"os": 1}))));
		assert!(!RuleKind::Platform.is_valid(&value(json!({}))));

		assert!(RuleKind::LoyaltyStatus.is_valid(&value(json!({"housingResidenceStatus": true}))));
		assert!(!RuleKind::LoyaltyStatus.is_valid(&value(json!({"housingResidenceStatus": "yes"}))));
		assert!(!RuleKind::LoyaltyStatus.is_valid(&value(json!(true))));

		assert!(RuleKind::Auth.is_valid(&value(json!({"loggedIn": true}))));
		assert!(!RuleKind::Auth.is_valid(&value(json!("loggedIn"))));
	}

	#[test]
	fn test_validate_error_names_rule_type() {
		let err = RuleKind::Enable.validate(&value(json!("yes"))).unwrap_err();
		assert_eq!(
			err,
			RuleError::InvalidRuleValue {
				rule_type: "enable".to_string(),
				reason: "expected a bool, found string".to_string(),
			}
		);
	}

	#[test]
	fn test_privacy() {
		let min3 = value(json!(3));
		let ctx = |level| {
			RequestContext::new().with_identity(Identity::new("u").with_privacy_level(level))
		};
		assert!(RuleKind::Privacy.matches(&ctx(5), &min3));
		assert!(RuleKind::Privacy.matches(&ctx(3), &min3));
		assert!(!RuleKind::Privacy.matches(&ctx(2), &min3));
		assert!(!RuleKind::Privacy.matches(&RequestContext::new(), &min3));
	}

	#[test]
	fn test_privacy_truncates_fractional_minimum() {
		let min = value(json!(2.9));
		let ctx = RequestContext::new().with_identity(Identity::new("u").with_privacy_level(2));
		assert!(RuleKind::Privacy.matches(&ctx, &min));
	}

	#[test]
	fn test_enable_ignores_context() {
		assert!(RuleKind::Enable.matches(&RequestContext::new(), &value(json!(true))));
		assert!(!RuleKind::Enable.matches(&RequestContext::new(), &value(json!(false))));
	}

	#[test]
	fn test_platform() {
		let ios = value(json!({"os": "ios"}));
		assert!(RuleKind::Platform.matches(&RequestContext::new().with_platform_os("ios"), &ios));
		assert!(!RuleKind::Platform.matches(&RequestContext::new().with_platform_os("IOS"), &ios));
		assert!(!RuleKind::Platform.matches(&RequestContext::new(), &ios));
	}

	#[test]
	fn test_loyalty_asymmetry() {
		let wants_true = value(json!({"housingResidenceStatus": true}));
		let wants_false = value(json!({"housingResidenceStatus": false}));

		let absent = RequestContext::new();
		let resident = RequestContext::new().with_housing_resident(true);
		let non_resident = RequestContext::new().with_housing_resident(false);

		assert!(RuleKind::LoyaltyStatus.matches(&resident, &wants_true));
		assert!(!RuleKind::LoyaltyStatus.matches(&non_resident, &wants_true));
		assert!(!RuleKind::LoyaltyStatus.matches(&absent, &wants_true));

		assert!(RuleKind::LoyaltyStatus.matches(&absent, &wants_false));
		assert!(RuleKind::LoyaltyStatus.matches(&non_resident, &wants_false));
		assert!(!RuleKind::LoyaltyStatus.matches(&resident, &wants_false));
	}

	#[test]
	fn test_auth_without_payload_does_not_match() {
		assert!(!RuleKind::Auth.matches(&RequestContext::new(), &value(json!({"loggedIn": false}))));
	}

	#[test]
	fn test_auth_dispatches_on_payload() {
		let ctx = RequestContext::new().with_auth(AuthPayload::V2(AuthV2 {
			tokens: AuthTokens {
				id_token: Some("id".to_string()),
				..Default::default()
			},
			user_info: None,
		}));
		assert!(RuleKind::Auth.matches(&ctx, &value(json!({"loggedIn": true}))));
	}

	#[test]
	fn test_unexpected_shapes_fail_closed() {
		let ctx = RequestContext::new()
			.with_identity(Identity::new("u").with_privacy_level(10))
			.with_platform_os("ios")
			.with_housing_resident(true);

		assert!(!RuleKind::Privacy.matches(&ctx, &value(json!("1"))));
		assert!(!RuleKind::Enable.matches(&ctx, &value(json!(1))));
		assert!(!RuleKind::Platform.matches(&ctx, &value(json!("ios"))));
		assert!(!RuleKind::LoyaltyStatus.matches(&ctx, &value(json!(true))));
		// role expressions fail open instead
		assert!(RuleKind::Roles.matches(&ctx, &value(json!(1))));
	}

	#[test]
	fn test_default_registry() {
		let registry = RuleType::registry();
		assert_eq!(registry.len(), RuleKind::ALL.len());
		assert_eq!(registry[0], RuleType::new(1, RuleKind::Roles));
		assert_eq!(registry[5].name(), "platform");
	}
}
