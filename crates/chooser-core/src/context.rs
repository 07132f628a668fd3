// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Caller-supplied data that rules are evaluated against.
//!
//! A [`RequestContext`] is built per query and never persisted. Every part is
//! optional; each rule type decides on its own what a missing part means.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Everything known about the caller of a single query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestContext {
	#[serde(default, alias = "user", skip_serializing_if = "Option::is_none")]
	pub identity: Option<Identity>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub auth: Option<AuthPayload>,
	#[serde(default, alias = "illini_cash", skip_serializing_if = "Option::is_none")]
	pub loyalty: Option<LoyaltyStatus>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub platform: Option<Platform>,
}

impl RequestContext {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_identity(mut self, identity: Identity) -> Self {
		self.identity = Some(identity);
		self
	}

	pub fn with_auth(mut self, auth: AuthPayload) -> Self {
		self.auth = Some(auth);
		self
	}

	pub fn with_housing_resident(mut self, housing_resident_status: bool) -> Self {
		self.loyalty = Some(LoyaltyStatus {
			housing_resident_status,
		});
		self
	}

	pub fn with_platform_os(mut self, os: impl Into<String>) -> Self {
		self.platform = Some(Platform {
			os: Some(os.into()),
		});
		self
	}

	/// Roles of the identity, if any.
	pub fn roles(&self) -> Option<&BTreeSet<String>> {
		self.identity.as_ref().map(|i| &i.roles)
	}

	pub fn has_role(&self, role: &str) -> bool {
		self.roles().is_some_and(|roles| roles.contains(role))
	}
}

/// The end user on whose behalf the query is made.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
	#[serde(default, alias = "uuid", skip_serializing_if = "Option::is_none")]
	pub user_id: Option<String>,
	#[serde(default)]
	pub privacy_level: i64,
	#[serde(default)]
	pub roles: BTreeSet<String>,
}

impl Identity {
	pub fn new(user_id: impl Into<String>) -> Self {
		Self {
			user_id: Some(user_id.into()),
			..Default::default()
		}
	}

	pub fn with_privacy_level(mut self, level: i64) -> Self {
		self.privacy_level = level;
		self
	}

	pub fn with_role(mut self, role: impl Into<String>) -> Self {
		self.roles.insert(role.into());
		self
	}

	pub fn with_roles<I, S>(mut self, roles: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.roles.extend(roles.into_iter().map(Into::into));
		self
	}
}

/// Loyalty card data; `housing_resident_status` drives the `illini_cash` rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoyaltyStatus {
	#[serde(default, alias = "HousingResidentStatus")]
	pub housing_resident_status: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Platform {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub os: Option<String>,
}

/// Authentication payload, one generation per client protocol version.
///
/// The `version` tag selects which auth predicate set is evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "version", rename_all = "lowercase")]
pub enum AuthPayload {
	V1(AuthV1),
	V2(AuthV2),
	V3(AuthV3),
}

impl AuthPayload {
	pub fn version(&self) -> &'static str {
		match self {
			AuthPayload::V1(_) => "v1",
			AuthPayload::V2(_) => "v2",
			AuthPayload::V3(_) => "v3",
		}
	}
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthV1 {
	#[serde(default, alias = "uiucedu_uin", skip_serializing_if = "Option::is_none")]
	pub uin: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthV2 {
	#[serde(flatten)]
	pub tokens: AuthTokens,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub user_info: Option<AuthUser>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthV3 {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub token: Option<AuthTokens>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub user: Option<AuthUser>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub card: Option<AuthCard>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub pii: Option<Pii>,
}

#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthTokens {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub id_token: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub access_token: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub refresh_token: Option<String>,
	#[serde(default, alias = "phone", skip_serializing_if = "Option::is_none")]
	pub phone_number: Option<String>,
}

impl fmt::Debug for AuthTokens {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("AuthTokens")
			.field("id_token", &redacted(&self.id_token))
			.field("access_token", &redacted(&self.access_token))
			.field("refresh_token", &redacted(&self.refresh_token))
			.field("phone_number", &redacted(&self.phone_number))
			.finish()
	}
}

/// OIDC profile claims.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub name: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub given_name: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub family_name: Option<String>,
	#[serde(default, alias = "uiucedu_uin", skip_serializing_if = "Option::is_none")]
	pub uin: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub preferred_username: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub sub: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub email: Option<String>,
	#[serde(default, alias = "uiucedu_is_member_of")]
	pub member_of: Vec<String>,
}

impl AuthUser {
	pub fn is_member_of(&self, group: &str) -> bool {
		self.member_of.iter().any(|g| g == group)
	}
}

#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthCard {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub card_number: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub library_number: Option<String>,
}

impl fmt::Debug for AuthCard {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("AuthCard")
			.field("card_number", &redacted(&self.card_number))
			.field("library_number", &redacted(&self.library_number))
			.finish()
	}
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pii {
	#[serde(default, alias = "documentType", skip_serializing_if = "Option::is_none")]
	pub document_type: Option<String>,
}

fn redacted(value: &Option<String>) -> &'static str {
	match value {
		Some(_) => "[REDACTED]",
		None => "None",
	}
}
