// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Build information for chooser-server.

/// Compile-time build information.
#[derive(Debug, Clone, Copy)]
pub struct BuildInfo {
	pub version: &'static str,
	pub platform: &'static str,
}

impl BuildInfo {
	pub const fn current() -> Self {
		Self {
			version: env!("CARGO_PKG_VERSION"),
			platform: env!("CHOOSER_PLATFORM"),
		}
	}
}

/// Format version info for display.
pub fn format_version_info() -> String {
	let info = BuildInfo::current();
	format!(
		"chooser-server version: {}\n\
         Platform:               {}",
		info.version, info.platform,
	)
}
