//! File watcher errors.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WatchError {
	#[error("module watcher is already active")]
	AlreadyActive,
	#[error("module watcher is not active")]
	NotActive,
	#[error("cannot resolve module path {path}: {source}")]
	Resolve {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},
	#[cfg(feature = "watch")]
	#[error("cannot watch {path}: {source}")]
	Watch {
		path: PathBuf,
		#[source]
		source: notify::Error,
	},
}

pub type Result<T> = std::result::Result<T, WatchError>;
