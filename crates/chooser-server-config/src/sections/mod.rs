// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sections.

mod content;
mod logging;
mod storage;

pub use content::{ContentConfig, ContentConfigLayer};
pub use logging::{LoggingConfig, LoggingConfigLayer};
pub use storage::{StorageConfig, StorageConfigLayer};
