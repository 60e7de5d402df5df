//! Input errors.

use thiserror::Error;

/// Failures surfaced by a raw input source.
#[derive(Debug, Error)]
pub enum InputError {
	/// The terminal backend failed to read input.
	#[error("terminal input failed: {0}")]
	Backend(#[from] std::io::Error),
}

/// Result type for input operations.
pub type Result<T> = std::result::Result<T, InputError>;
