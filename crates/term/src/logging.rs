//! Tracing setup.
//!
//! The session owns the terminal, so events go to `tidal.log` in the working
//! directory. Nothing is installed unless `-L` or `TIDAL_LOG` asks for it.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::Context;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

pub const LOG_FILE: &str = "tidal.log";

/// Environment variable holding an `EnvFilter` directive.
pub const LOG_ENV: &str = "TIDAL_LOG";

/// Filter directive for a `-L` count.
pub fn directive_for(count: u8) -> Option<&'static str> {
	match count {
		0 => None,
		1 => Some("info"),
		_ => Some("debug"),
	}
}

/// Installs the file subscriber, returning the log path if one was opened.
pub fn init(count: u8) -> anyhow::Result<Option<PathBuf>> {
	let from_env = std::env::var(LOG_ENV).ok().filter(|value| !value.trim().is_empty());
	let filter = match (from_env, directive_for(count)) {
		(Some(directive), _) => {
			EnvFilter::try_new(&directive).with_context(|| format!("invalid {LOG_ENV} directive {directive:?}"))?
		}
		(None, Some(directive)) => EnvFilter::new(directive),
		(None, None) => return Ok(None),
	};

	let path = PathBuf::from(LOG_FILE);
	let file = OpenOptions::new()
		.create(true)
		.append(true)
		.open(&path)
		.with_context(|| format!("cannot open {}", path.display()))?;

	let file_layer = tracing_subscriber::fmt::layer()
		.with_writer(Mutex::new(file))
		.with_ansi(false)
		.with_target(true);

	tracing_subscriber::registry()
		.with(filter)
		.with(file_layer)
		.try_init()
		.context("tracing already initialized")?;

	tracing::info!(path = ?path, "tracing initialized");
	Ok(Some(path))
}
