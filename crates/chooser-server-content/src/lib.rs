// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Content serving for the UI content chooser.
//!
//! # Architecture
//!
//! - `storage` - Storage backends (JSON file with change polling, in-memory)
//! - `cache` - Snapshot cache with a blocking readiness gate
//! - `reload` - Background reload worker that coalesces change notifications
//! - `assembly` - Filters one data version for a caller
//! - `service` - Query entry point tying the above together
//! - `admin` - Rule validation, rule type listing, export and forced reload
//! - `health` - Health reporting for the loaded content
//!
//! # Example
//!
//! ```ignore
//! use chooser_server_content::{ContentService, FileStorage};
//!
//! let storage = Arc::new(FileStorage::new("data/content.json"));
//! let service = ContentService::new(storage);
//! service.start();
//!
//! let content = service.ui_content("2.2", &ctx).await?;
//! println!("{}", serde_json::to_string(&content)?);
//! ```

pub mod admin;
pub mod assembly;
pub mod cache;
pub mod error;
pub mod health;
pub mod reload;
pub mod service;
pub mod storage;

pub use admin::{rule_types, validate_rule};
pub use assembly::{assemble, UiContent};
pub use cache::{CacheState, CacheStatus, ContentCache, ContentSnapshot};
pub use error::{ContentError, Result, StorageError};
pub use health::{ContentHealth, HealthState};
pub use reload::{ReloadCoordinator, ReloadTrigger};
pub use service::ContentService;
pub use storage::{
	ChangeListener, ContentStorage, FilePoller, FileStorage, MemoryStorage, VersionedContent,
};

// Re-export core types for convenience
pub use chooser_core::*;
