// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! UI content chooser server binary.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chooser_core::RuleValue;
use chooser_server::{
	check_storage, parse_context, serve_lines, spawn_line_reader, version, CliError,
};
use chooser_server_config::ServerConfig;
use chooser_server_content::{validate_rule, ContentService, FileStorage};
use clap::{Parser, Subcommand};
use tokio::io::AsyncReadExt;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Chooser server - serves per-caller UI content from versioned content trees.
#[derive(Parser, Debug)]
#[command(
	name = "chooser-server",
	about = "UI content chooser server",
	version
)]
struct Args {
	/// Config file (default: /etc/chooser/server.toml)
	#[arg(long, global = true, env = "CHOOSER_SERVER_CONFIG")]
	config: Option<PathBuf>,

	#[command(subcommand)]
	command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Show version and build information
	Version,
	/// Load the content file once and validate every rule value
	Check,
	/// Assemble UI content for one caller and print it
	Query {
		/// Data version (default: content.default_data_version)
		#[arg(long)]
		data_version: Option<String>,
		/// Caller context JSON file; read from stdin when absent
		#[arg(long)]
		context: Option<PathBuf>,
	},
	/// Check a rule value against a rule type
	ValidateRule {
		#[arg(long)]
		rule_type: String,
		/// Rule value as JSON
		#[arg(long)]
		value: String,
	},
	/// Answer JSON-lines queries on stdin (default)
	Serve,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	if let Some(Command::Version) = args.command {
		println!("{}", version::format_version_info());
		return Ok(());
	}

	dotenvy::dotenv().ok();

	let config = match &args.config {
		Some(path) => chooser_server_config::load_config_with_file(path)?,
		None => chooser_server_config::load_config()?,
	};

	// stdout carries query replies, logs go to stderr
	tracing_subscriber::registry()
		.with(
			tracing_subscriber::EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| config.logging.level.clone().into()),
		)
		.with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
		.init();

	match args.command.unwrap_or(Command::Serve) {
		Command::Version => println!("{}", version::format_version_info()),
		Command::Check => run_check(&config).await?,
		Command::Query {
			data_version,
			context,
		} => run_query(&config, data_version, context).await?,
		Command::ValidateRule { rule_type, value } => run_validate_rule(&rule_type, &value)?,
		Command::Serve => run_serve(&config).await?,
	}

	Ok(())
}

async fn run_check(config: &ServerConfig) -> Result<(), CliError> {
	let storage = FileStorage::new(&config.storage.path);
	let report = check_storage(&storage).await?;
	println!("{report}");

	if report.is_ok() {
		Ok(())
	} else {
		Err(CliError::CheckFailed(report.invalid_rule_count()))
	}
}

async fn run_query(
	config: &ServerConfig,
	data_version: Option<String>,
	context: Option<PathBuf>,
) -> Result<(), CliError> {
	let raw = match context {
		Some(path) => tokio::fs::read_to_string(path).await?,
		None => {
			let mut raw = String::new();
			tokio::io::stdin().read_to_string(&mut raw).await?;
			raw
		}
	};
	let ctx = parse_context(&raw)?;
	let version = data_version.unwrap_or_else(|| config.content.default_data_version.clone());

	let service = ContentService::new(Arc::new(FileStorage::new(&config.storage.path)));
	service.start();
	service
		.wait_until_ready(Duration::from_secs(config.content.startup_timeout_secs))
		.await?;

	let result = service.ui_content(&version, &ctx).await;
	service.shutdown().await;

	println!("{}", serde_json::to_string_pretty(&result?)?);
	Ok(())
}

fn run_validate_rule(rule_type: &str, value: &str) -> Result<(), CliError> {
	let value: RuleValue = serde_json::from_str(value)?;
	let rule_type = validate_rule(rule_type, &value)?;
	println!("{}", serde_json::to_string(&rule_type)?);
	Ok(())
}

async fn run_serve(config: &ServerConfig) -> Result<(), CliError> {
	tracing::info!(
		storage = %config.storage.path.display(),
		poll_interval_ms = config.storage.poll_interval_ms,
		default_data_version = %config.content.default_data_version,
		"starting chooser-server"
	);

	let storage = Arc::new(FileStorage::new(&config.storage.path));
	let service = ContentService::new(storage.clone());
	service.start();
	let mut poller = storage.start_polling(config.storage.poll_interval());

	let startup = Duration::from_secs(config.content.startup_timeout_secs);
	if let Err(e) = service.wait_until_ready(startup).await {
		let health = service.health();
		tracing::error!(
			error = %e,
			last_error = ?health.last_error,
			"content did not load before the startup timeout"
		);
		poller.stop().await;
		service.shutdown().await;
		return Err(e.into());
	}

	let health = service.health();
	tracing::info!(
		generation = health.generation,
		versions = ?health.versions,
		"content ready, reading queries from stdin"
	);

	// a blocked stdin read must not keep the process alive after Ctrl-C
	let lines = spawn_line_reader(std::io::BufReader::new(std::io::stdin()))?;
	let stdout = tokio::io::stdout();
	let result = tokio::select! {
		res = serve_lines(&service, &config.content.default_data_version, lines, stdout) => res.map(|answered| {
			tracing::info!(answered, "stdin closed, shutting down");
		}),
		_ = tokio::signal::ctrl_c() => {
			tracing::info!("received Ctrl-C, shutting down");
			Ok(())
		}
	};

	poller.stop().await;
	service.shutdown().await;
	result
}
