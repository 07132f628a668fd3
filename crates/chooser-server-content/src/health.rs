// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::cache::{CacheState, CacheStatus};

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum HealthState {
	Healthy,
	Degraded,
	Unhealthy,
}

#[derive(Debug, Clone, Serialize)]
pub struct ContentHealth {
	pub status: HealthState,
	pub state: CacheState,
	pub generation: u64,
	pub versions: Vec<String>,
	pub last_success: Option<DateTime<Utc>>,
	pub last_error: Option<String>,
	pub consecutive_failures: u32,
}

impl ContentHealth {
	pub fn from_status(status: CacheStatus, versions: Vec<String>, has_snapshot: bool) -> Self {
		Self {
			status: determine_health_state(has_snapshot, status.consecutive_failures),
			state: status.state,
			generation: status.generation,
			versions,
			last_success: status.last_success,
			last_error: status.last_error,
			consecutive_failures: status.consecutive_failures,
		}
	}
}

/// No snapshot at all is unhealthy; serving a snapshot after failed reloads
/// is degraded.
pub fn determine_health_state(has_snapshot: bool, consecutive_failures: u32) -> HealthState {
	match (has_snapshot, consecutive_failures) {
		(false, _) => HealthState::Unhealthy,
		(true, 0) => HealthState::Healthy,
		(true, _) => HealthState::Degraded,
	}
}
