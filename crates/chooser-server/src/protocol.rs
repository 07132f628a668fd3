// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! JSON-lines query protocol.
//!
//! Each input line is a request `{"data_version": "2.2", "context": {...}}`.
//! Each reply is one line, either `{"ok": {...}}` or `{"error": "..."}`.
//! Blank lines are ignored.
//!
//! A context without `auth` matches no auth rule, not even `{"loggedIn": false}`.
//! Signed-out callers send an empty payload of their auth version, e.g.
//! `"auth": {"version": "v2"}`, so that negative predicates can match.

use std::io::BufRead;

use chooser_core::RequestContext;
use chooser_server_content::{ContentService, UiContent};
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tracing::{debug, instrument, warn};

use crate::error::Result;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct QueryRequest {
	/// Falls back to the configured default version when absent.
	#[serde(default)]
	pub data_version: Option<String>,
	#[serde(default)]
	pub context: RequestContext,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryResponse {
	Ok(UiContent),
	Error(String),
}

/// Parses a caller context; an empty document is an anonymous caller.
pub fn parse_context(raw: &str) -> Result<RequestContext> {
	if raw.trim().is_empty() {
		return Ok(RequestContext::default());
	}
	Ok(serde_json::from_str(raw)?)
}

/// Answers one request line.
pub async fn handle_line(
	service: &ContentService,
	default_version: &str,
	line: &str,
) -> QueryResponse {
	let request: QueryRequest = match serde_json::from_str(line) {
		Ok(request) => request,
		Err(e) => {
			debug!(error = %e, "rejected malformed request");
			return QueryResponse::Error(format!("invalid request: {e}"));
		}
	};

	let version = request.data_version.as_deref().unwrap_or(default_version);
	match service.ui_content(version, &request.context).await {
		Ok(content) => QueryResponse::Ok(content),
		Err(e) => {
			warn!(data_version = version, error = %e, "query failed");
			QueryResponse::Error(e.to_string())
		}
	}
}

/// Input lines read off the runtime.
pub type LineReceiver = mpsc::Receiver<std::io::Result<String>>;

/// Reads lines from `reader` on a dedicated OS thread.
///
/// Reads that block forever (an open terminal or pipe) stay on that thread and
/// never hold up runtime shutdown; the thread ends with the process.
pub fn spawn_line_reader<R>(reader: R) -> std::io::Result<LineReceiver>
where
	R: BufRead + Send + 'static,
{
	let (tx, rx) = mpsc::channel(64);
	std::thread::Builder::new()
		.name("line-reader".to_string())
		.spawn(move || {
			for line in reader.lines() {
				let failed = line.is_err();
				if tx.blocking_send(line).is_err() || failed {
					break;
				}
			}
		})?;
	Ok(rx)
}

/// Answers requests from `lines` on `writer` until end of input.
///
/// Returns the number of requests answered.
#[instrument(skip_all)]
pub async fn serve_lines<W>(
	service: &ContentService,
	default_version: &str,
	mut lines: LineReceiver,
	mut writer: W,
) -> Result<u64>
where
	W: AsyncWrite + Unpin,
{
	let mut answered = 0;

	while let Some(line) = lines.recv().await {
		let line = line?;
		if line.trim().is_empty() {
			continue;
		}
		let response = handle_line(service, default_version, &line).await;
		let mut encoded = serde_json::to_vec(&response)?;
		encoded.push(b'\n');
		writer.write_all(&encoded).await?;
		writer.flush().await?;
		answered += 1;
	}

	debug!(answered, "input closed");
	Ok(answered)
}
