// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Auth rule predicates.
//!
//! A rule value is a map such as `{"loggedIn": true}` or
//! `{"shibbolethMemberOf": "some-group"}`. The payload version decides which
//! keys are understood; only the first understood key (in priority order) is
//! evaluated.

use std::collections::BTreeMap;

use crate::context::{AuthCard, AuthPayload, AuthTokens, AuthUser, AuthV1, AuthV2, AuthV3, Pii};
use crate::value::RuleValue;

/// Group granted to users allowed to edit events.
pub const EVENT_APPROVERS_GROUP: &str =
	"urn:mace:uiuc.edu:urbana:authman:app-rokwire-service-policy-rokwire event approvers";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthPredicate {
	ShibbolethLoggedIn,
	LoggedIn,
	PhoneLoggedIn,
	EventEditor,
	ShibbolethMemberOf,
	ICardNum,
	ICardLibraryNum,
	DocumentType,
}

impl AuthPredicate {
	pub const V1: &'static [AuthPredicate] = &[AuthPredicate::ShibbolethLoggedIn];

	pub const V2: &'static [AuthPredicate] = &[
		AuthPredicate::ShibbolethLoggedIn,
		AuthPredicate::LoggedIn,
		AuthPredicate::PhoneLoggedIn,
		AuthPredicate::EventEditor,
		AuthPredicate::ShibbolethMemberOf,
	];

	pub const V3: &'static [AuthPredicate] = &[
		AuthPredicate::ShibbolethLoggedIn,
		AuthPredicate::LoggedIn,
		AuthPredicate::PhoneLoggedIn,
		AuthPredicate::EventEditor,
		AuthPredicate::ShibbolethMemberOf,
		AuthPredicate::ICardNum,
		AuthPredicate::ICardLibraryNum,
		AuthPredicate::DocumentType,
	];

	/// Key of the predicate in a rule value map.
	pub fn key(&self) -> &'static str {
		match self {
			AuthPredicate::ShibbolethLoggedIn => "shibbolethLoggedIn",
			AuthPredicate::LoggedIn => "loggedIn",
			AuthPredicate::PhoneLoggedIn => "phoneLoggedIn",
			AuthPredicate::EventEditor => "eventEditor",
			AuthPredicate::ShibbolethMemberOf => "shibbolethMemberOf",
			AuthPredicate::ICardNum => "iCardNum",
			AuthPredicate::ICardLibraryNum => "iCardLibraryNum",
			AuthPredicate::DocumentType => "documentType",
		}
	}

	/// Whether the configured value is a string to compare against, rather
	/// than a wanted boolean.
	pub fn takes_string(&self) -> bool {
		matches!(
			self,
			AuthPredicate::ShibbolethMemberOf | AuthPredicate::DocumentType
		)
	}

	/// Predicates understood for a payload version.
	pub fn for_payload(payload: &AuthPayload) -> &'static [AuthPredicate] {
		match payload {
			AuthPayload::V1(_) => Self::V1,
			AuthPayload::V2(_) => Self::V2,
			AuthPayload::V3(_) => Self::V3,
		}
	}

	/// First predicate of `supported` present in the rule value map.
	///
	/// Keys holding `null` count as absent.
	pub fn select<'a>(
		supported: &[AuthPredicate],
		map: &'a BTreeMap<String, RuleValue>,
	) -> Option<(AuthPredicate, &'a RuleValue)> {
		supported.iter().find_map(|p| {
			map.get(p.key())
				.filter(|v| !v.is_null())
				.map(|v| (*p, v))
		})
	}
}

/// Why an auth rule could not be evaluated as configured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthMismatch {
	/// The rule value is not a map.
	NotAMap,
	/// The selected predicate holds a value of the wrong shape.
	WrongType {
		predicate: AuthPredicate,
		found: &'static str,
	},
}

/// Evaluates an auth rule value against a payload.
///
/// `Ok(false)` covers every ordinary non-match, including a value with no
/// predicate the payload version understands. `Err` is reserved for values
/// that would have failed validation.
pub fn evaluate(payload: &AuthPayload, value: &RuleValue) -> Result<bool, AuthMismatch> {
	let map = value.as_map().ok_or(AuthMismatch::NotAMap)?;
	let Some((predicate, wanted)) = AuthPredicate::select(AuthPredicate::for_payload(payload), map)
	else {
		return Ok(false);
	};

	let facts = AuthFacts::from_payload(payload);
	if predicate.takes_string() {
		let wanted = wanted.as_str().ok_or(AuthMismatch::WrongType {
			predicate,
			found: wanted.kind(),
		})?;
		Ok(facts.matches_string(predicate, wanted))
	} else {
		let wanted = wanted.as_bool().ok_or(AuthMismatch::WrongType {
			predicate,
			found: wanted.kind(),
		})?;
		Ok(facts.flag(predicate) == wanted)
	}
}

/// Checks the shape of an auth rule value without a payload.
///
/// Every known predicate key that is present must carry the right type.
/// A `null` value counts as absent.
pub fn validate(value: &RuleValue) -> Result<(), String> {
	let map = value
		.as_map()
		.ok_or_else(|| format!("expected a map, found {}", value.kind()))?;

	for predicate in AuthPredicate::V3 {
		let Some(v) = map.get(predicate.key()).filter(|v| !v.is_null()) else {
			continue;
		};
		let ok = if predicate.takes_string() {
			v.as_str().is_some()
		} else {
			v.as_bool().is_some()
		};
		if !ok {
			let expected = if predicate.takes_string() {
				"string"
			} else {
				"bool"
			};
			return Err(format!(
				"'{}' must be a {expected}, found {}",
				predicate.key(),
				v.kind()
			));
		}
	}
	Ok(())
}

/// Version-independent view over the auth payload.
struct AuthFacts<'a> {
	v1: bool,
	v1_uin: Option<&'a str>,
	tokens: Option<&'a AuthTokens>,
	user: Option<&'a AuthUser>,
	card: Option<&'a AuthCard>,
	pii: Option<&'a Pii>,
}

impl<'a> AuthFacts<'a> {
	fn from_payload(payload: &'a AuthPayload) -> Self {
		match payload {
			AuthPayload::V1(AuthV1 { uin }) => Self {
				v1: true,
				v1_uin: uin.as_deref(),
				tokens: None,
				user: None,
				card: None,
				pii: None,
			},
			AuthPayload::V2(AuthV2 { tokens, user_info }) => Self {
				v1: false,
				v1_uin: None,
				tokens: Some(tokens),
				user: user_info.as_ref(),
				card: None,
				pii: None,
			},
			AuthPayload::V3(AuthV3 {
				token,
				user,
				card,
				pii,
			}) => Self {
				v1: false,
				v1_uin: None,
				tokens: token.as_ref(),
				user: user.as_ref(),
				card: card.as_ref(),
				pii: pii.as_ref(),
			},
		}
	}

	fn flag(&self, predicate: AuthPredicate) -> bool {
		match predicate {
			AuthPredicate::ShibbolethLoggedIn => {
				if self.v1 {
					return self.v1_uin.is_some();
				}
				self.tokens.is_some_and(|t| {
					t.id_token.is_some() && t.access_token.is_some() && t.refresh_token.is_some()
				})
			}
			AuthPredicate::LoggedIn => self.tokens.is_some_and(|t| t.id_token.is_some()),
			AuthPredicate::PhoneLoggedIn => self.tokens.is_some_and(|t| {
				t.id_token.is_some()
					&& t.access_token.is_none()
					&& t.refresh_token.is_none()
					&& non_empty(t.phone_number.as_deref())
			}),
			AuthPredicate::EventEditor => self
				.user
				.is_some_and(|u| u.is_member_of(EVENT_APPROVERS_GROUP)),
			AuthPredicate::ICardNum => self
				.card
				.is_some_and(|c| non_empty(c.card_number.as_deref())),
			AuthPredicate::ICardLibraryNum => self
				.card
				.is_some_and(|c| non_empty(c.library_number.as_deref())),
			AuthPredicate::ShibbolethMemberOf | AuthPredicate::DocumentType => false,
		}
	}

	fn matches_string(&self, predicate: AuthPredicate, wanted: &str) -> bool {
		match predicate {
			AuthPredicate::ShibbolethMemberOf => self.user.is_some_and(|u| u.is_member_of(wanted)),
			AuthPredicate::DocumentType => self
				.pii
				.and_then(|p| p.document_type.as_deref())
				.is_some_and(|doc| doc == wanted),
			_ => false,
		}
	}
}

fn non_empty(value: Option<&str>) -> bool {
	value.is_some_and(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	fn rule(value: serde_json::Value) -> RuleValue {
		RuleValue::from(value)
	}

	fn tokens(id: bool, access: bool, refresh: bool, phone: Option<&str>) -> AuthTokens {
		AuthTokens {
			id_token: id.then(|| "id".to_string()),
			access_token: access.then(|| "access".to_string()),
			refresh_token: refresh.then(|| "refresh".to_string()),
			phone_number: phone.map(str::to_string),
		}
	}

	fn v2(tokens: AuthTokens, groups: &[&str]) -> AuthPayload {
		AuthPayload::V2(AuthV2 {
			tokens,
			user_info: Some(AuthUser {
				member_of: groups.iter().map(|s| s.to_string()).collect(),
				..Default::default()
			}),
		})
	}

	#[test]
	fn test_v1_shibboleth() {
		let with_uin = AuthPayload::V1(AuthV1 {
			uin: Some("654321".to_string()),
		});
		let without_uin = AuthPayload::V1(AuthV1::default());

		let wanted_true = rule(json!({"shibbolethLoggedIn": true}));
		let wanted_false = rule(json!({"shibbolethLoggedIn": false}));

		assert_eq!(evaluate(&with_uin, &wanted_true), Ok(true));
		assert_eq!(evaluate(&without_uin, &wanted_true), Ok(false));
		assert_eq!(evaluate(&without_uin, &wanted_false), Ok(true));
		assert_eq!(evaluate(&with_uin, &wanted_false), Ok(false));
	}

	#[test]
	fn test_v1_ignores_newer_predicates() {
		let payload = AuthPayload::V1(AuthV1 {
			uin: Some("1".to_string()),
		});
		assert_eq!(evaluate(&payload, &rule(json!({"loggedIn": true}))), Ok(false));
	}

	#[test]
	fn test_v2_logged_in() {
		let value = rule(json!({"loggedIn": true}));
		assert_eq!(
			evaluate(&v2(tokens(true, false, false, None), &[]), &value),
			Ok(true)
		);
		assert_eq!(
			evaluate(&v2(tokens(false, true, true, None), &[]), &value),
			Ok(false)
		);
	}

	#[test]
	fn test_v2_phone_logged_in() {
		let value = rule(json!({"phoneLoggedIn": true}));
		assert_eq!(
			evaluate(&v2(tokens(true, false, false, Some("+15550100")), &[]), &value),
			Ok(true)
		);
		// access token present means not a phone-only sign in
		assert_eq!(
			evaluate(&v2(tokens(true, true, false, Some("+15550100")), &[]), &value),
			Ok(false)
		);
		assert_eq!(
			evaluate(&v2(tokens(true, false, false, Some("")), &[]), &value),
			Ok(false)
		);
		assert_eq!(
			evaluate(&v2(tokens(false, false, false, Some("+15550100")), &[]), &value),
			Ok(false)
		);
	}

	#[test]
	fn test_v2_shibboleth_needs_all_tokens() {
		let value = rule(json!({"shibbolethLoggedIn": true}));
		assert_eq!(
			evaluate(&v2(tokens(true, true, true, None), &[]), &value),
			Ok(true)
		);
		assert_eq!(
			evaluate(&v2(tokens(true, true, false, None), &[]), &value),
			Ok(false)
		);
	}

	#[test]
	fn test_v2_groups() {
		let editor = v2(tokens(true, true, true, None), &[EVENT_APPROVERS_GROUP, "team-a"]);
		let plain = v2(tokens(true, true, true, None), &["team-b"]);

		let event_editor = rule(json!({"eventEditor": true}));
		assert_eq!(evaluate(&editor, &event_editor), Ok(true));
		assert_eq!(evaluate(&plain, &event_editor), Ok(false));

		let member_of = rule(json!({"shibbolethMemberOf": "team-b"}));
		assert_eq!(evaluate(&plain, &member_of), Ok(true));
		assert_eq!(evaluate(&editor, &member_of), Ok(false));
	}

	#[test]
	fn test_priority_order_first_key_wins() {
		// shibbolethLoggedIn outranks loggedIn; loggedIn alone would match
		let payload = v2(tokens(true, false, false, None), &[]);
		let value = rule(json!({"loggedIn": true, "shibbolethLoggedIn": true}));
		assert_eq!(evaluate(&payload, &value), Ok(false));
	}

	#[test]
	fn test_null_key_falls_through_to_next_predicate() {
		let payload = v2(tokens(true, false, false, None), &[]);
		let value = rule(json!({"shibbolethLoggedIn": null, "loggedIn": true}));
		assert_eq!(evaluate(&payload, &value), Ok(true));
		assert!(validate(&value).is_ok());

		// only null keys: nothing to evaluate
		let value = rule(json!({"loggedIn": null}));
		assert_eq!(evaluate(&payload, &value), Ok(false));
	}

	#[test]
	fn test_no_supported_key_fails_closed() {
		let payload = v2(tokens(true, true, true, None), &[]);
		assert_eq!(evaluate(&payload, &rule(json!({}))), Ok(false));
		assert_eq!(evaluate(&payload, &rule(json!({"iCardNum": true}))), Ok(false));
	}

	#[test]
	fn test_v3_predicates() {
		let payload = AuthPayload::V3(AuthV3 {
			token: Some(tokens(true, true, true, None)),
			user: None,
			card: Some(AuthCard {
				card_number: Some("1234".to_string()),
				library_number: Some(String::new()),
			}),
			pii: Some(Pii {
				document_type: Some("passport".to_string()),
			}),
		});

		assert_eq!(evaluate(&payload, &rule(json!({"iCardNum": true}))), Ok(true));
		assert_eq!(
			evaluate(&payload, &rule(json!({"iCardLibraryNum": true}))),
			Ok(false)
		);
		assert_eq!(
			evaluate(&payload, &rule(json!({"iCardLibraryNum": false}))),
			Ok(true)
		);
		assert_eq!(
			evaluate(&payload, &rule(json!({"documentType": "passport"}))),
			Ok(true)
		);
		assert_eq!(
			evaluate(&payload, &rule(json!({"documentType": "drivers_license"}))),
			Ok(false)
		);
		assert_eq!(
			evaluate(&payload, &rule(json!({"shibbolethLoggedIn": true}))),
			Ok(true)
		);
		// no user block: group checks compute false
		assert_eq!(evaluate(&payload, &rule(json!({"eventEditor": false}))), Ok(true));
	}

	#[test]
	fn test_v3_user_and_phone_predicates() {
		let payload = AuthPayload::V3(AuthV3 {
			token: Some(tokens(true, false, false, Some("+15550100"))),
			user: Some(AuthUser {
				member_of: vec![EVENT_APPROVERS_GROUP.to_string(), "team-a".to_string()],
				..Default::default()
			}),
			card: None,
			pii: None,
		});

		assert_eq!(evaluate(&payload, &rule(json!({"phoneLoggedIn": true}))), Ok(true));
		assert_eq!(evaluate(&payload, &rule(json!({"loggedIn": true}))), Ok(true));
		assert_eq!(
			evaluate(&payload, &rule(json!({"shibbolethLoggedIn": false}))),
			Ok(true)
		);
		assert_eq!(evaluate(&payload, &rule(json!({"eventEditor": true}))), Ok(true));
		assert_eq!(
			evaluate(&payload, &rule(json!({"shibbolethMemberOf": "team-a"}))),
			Ok(true)
		);
		assert_eq!(
			evaluate(&payload, &rule(json!({"shibbolethMemberOf": "team-b"}))),
			Ok(false)
		);
		assert_eq!(evaluate(&payload, &rule(json!({"iCardNum": false}))), Ok(true));
	}

	#[test]
	fn test_v3_empty_payload() {
		let payload = AuthPayload::V3(AuthV3::default());
		assert_eq!(evaluate(&payload, &rule(json!({"loggedIn": false}))), Ok(true));
		assert_eq!(evaluate(&payload, &rule(json!({"loggedIn": true}))), Ok(false));
		assert_eq!(
			evaluate(&payload, &rule(json!({"documentType": "passport"}))),
			Ok(false)
		);
	}

	#[test]
	fn test_wrong_types_are_reported() {
		let payload = v2(tokens(true, false, false, None), &[]);
		assert_eq!(
			evaluate(&payload, &rule(json!({"loggedIn": "yes"}))),
			Err(AuthMismatch::WrongType {
				predicate: AuthPredicate::LoggedIn,
				found: "string",
			})
		);
		assert_eq!(
			evaluate(&payload, &rule(json!(true))),
			Err(AuthMismatch::NotAMap)
		);
	}

	#[test]
	fn test_validate() {
		assert!(validate(&rule(json!({"loggedIn": true}))).is_ok());
		assert!(validate(&rule(json!({"documentType": "passport"}))).is_ok());
		assert!(validate(&rule(json!({"somethingElse": 1}))).is_ok());
		assert!(validate(&rule(json!({"loggedIn": 1}))).is_err());
		assert!(validate(&rule(json!({"shibbolethMemberOf": true}))).is_err());
		assert!(validate(&rule(json!(["loggedIn"]))).is_err());
	}
}
