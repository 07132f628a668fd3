// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration for the UI content chooser server.
//!
//! Sources, lowest to highest precedence: built-in defaults, a TOML file
//! (`/etc/chooser/server.toml` unless another path is given), then
//! `CHOOSER_SERVER_*` environment variables.
//!
//! # Usage
//!
//! ```ignore
//! use chooser_server_config::load_config;
//!
//! let config = load_config()?;
//! println!("serving content from {}", config.storage.path.display());
//! ```

pub mod error;
pub mod layer;
pub mod sections;
pub mod sources;

pub use error::ConfigError;
pub use layer::ServerConfigLayer;
pub use sections::*;
pub use sources::{ConfigSource, DefaultsSource, EnvSource, Precedence, TomlSource};

use tracing::{debug, info};

/// Fully resolved server configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServerConfig {
	pub storage: StorageConfig,
	pub content: ContentConfig,
	pub logging: LoggingConfig,
}

/// Load configuration from all sources with standard precedence.
pub fn load_config() -> Result<ServerConfig, ConfigError> {
	load_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::system()),
		Box::new(EnvSource),
	])
}

/// Load configuration from environment only.
pub fn load_config_from_env() -> Result<ServerConfig, ConfigError> {
	load_sources(vec![Box::new(DefaultsSource), Box::new(EnvSource)])
}

/// Load configuration with a custom config file path.
pub fn load_config_with_file(
	config_path: impl Into<std::path::PathBuf>,
) -> Result<ServerConfig, ConfigError> {
	load_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::new(config_path)),
		Box::new(EnvSource),
	])
}

fn load_sources(mut sources: Vec<Box<dyn ConfigSource>>) -> Result<ServerConfig, ConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = ServerConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		merged.merge(source.load()?);
	}

	finalize(merged)
}

/// Finalize configuration layer into resolved config.
pub fn finalize(layer: ServerConfigLayer) -> Result<ServerConfig, ConfigError> {
	let config = ServerConfig {
		storage: layer.storage.unwrap_or_default().finalize(),
		content: layer.content.unwrap_or_default().finalize(),
		logging: layer.logging.unwrap_or_default().finalize(),
	};

	validate_config(&config)?;

	info!(
		storage_path = %config.storage.path.display(),
		poll_interval_ms = config.storage.poll_interval_ms,
		default_data_version = %config.content.default_data_version,
		log_level = %config.logging.level,
		"Server configuration loaded"
	);

	Ok(config)
}

fn validate_config(config: &ServerConfig) -> Result<(), ConfigError> {
	if config.storage.poll_interval_ms == 0 {
		return Err(ConfigError::Validation(
			"storage.poll_interval_ms must be greater than zero".to_string(),
		));
	}
	if config.storage.path.as_os_str().is_empty() {
		return Err(ConfigError::Validation(
			"storage.path must not be empty".to_string(),
		));
	}
	if config.content.default_data_version.trim().is_empty() {
		return Err(ConfigError::Validation(
			"content.default_data_version must not be empty".to_string(),
		));
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;

	#[test]
	fn test_finalize_defaults() {
		let config = finalize(ServerConfigLayer::default()).unwrap();
		assert_eq!(config, ServerConfig::default());
		assert_eq!(config.logging.level, "info");
	}

	#[test]
	fn test_zero_poll_interval_rejected() {
		let layer = ServerConfigLayer {
			storage: Some(StorageConfigLayer {
				poll_interval_ms: Some(0),
				..Default::default()
			}),
			..Default::default()
		};
		assert!(matches!(finalize(layer), Err(ConfigError::Validation(_))));
	}

	#[test]
	fn test_empty_path_rejected() {
		let layer = ServerConfigLayer {
			storage: Some(StorageConfigLayer {
				path: Some("".into()),
				..Default::default()
			}),
			..Default::default()
		};
		assert!(matches!(finalize(layer), Err(ConfigError::Validation(_))));
	}

	#[test]
	fn test_file_overrides_defaults() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(
			file,
			"[content]\ndefault_data_version = \"3.1\"\nstartup_timeout_secs = 3"
		)
		.unwrap();

		let mut merged = DefaultsSource.load().unwrap();
		merged.merge(TomlSource::new(file.path()).load().unwrap());
		let config = finalize(merged).unwrap();

		assert_eq!(config.content.default_data_version, "3.1");
		assert_eq!(config.content.startup_timeout_secs, 3);
		assert_eq!(config.storage, StorageConfig::default());
	}
}
