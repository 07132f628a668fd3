// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core types for the UI content chooser.
//!
//! This crate holds the versioned content model (content items, UI items and
//! their rules), the caller context rules are evaluated against, and the
//! closed set of rule types with their matchers. It is used by the content
//! server (`chooser-server-content`) and the CLI.
//!
//! # Overview
//!
//! Rule types:
//! - `roles`: boolean expression over the caller's roles
//! - `privacy`: minimum privacy level
//! - `auth`: sign-in state predicates, per auth payload version
//! - `illini_cash`: housing resident flag
//! - `enable`: static on/off switch
//! - `platform`: client OS
//!
//! # Example
//!
//! ```
//! use chooser_core::{Identity, RequestContext, Rule, RuleKind, RuleType, RuleValue, UiItem};
//!
//! let rule = Rule::new(
//!     1,
//!     RuleType::new(1, RuleKind::Roles),
//!     RuleValue::from(serde_json::json!(["staff", "OR", "student"])),
//! )
//! .unwrap();
//! let item = UiItem::new(1, "dining", 1).with_rule(rule);
//!
//! let ctx = RequestContext::new().with_identity(Identity::new("u-1").with_role("student"));
//! assert!(item.is_visible(&ctx));
//! ```

pub mod auth;
pub mod content;
pub mod context;
pub mod error;
pub mod roles;
pub mod rule;
pub mod value;

pub use auth::{AuthPredicate, EVENT_APPROVERS_GROUP};
pub use content::{ContentItem, ContentTree, Rule, UiItem};
pub use context::{
	AuthCard, AuthPayload, AuthTokens, AuthUser, AuthV1, AuthV2, AuthV3, Identity, LoyaltyStatus,
	Pii, Platform, RequestContext,
};
pub use error::{Result, RuleError};
pub use rule::{RuleKind, RuleType};
pub use value::RuleValue;
