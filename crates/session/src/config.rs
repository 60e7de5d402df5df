//! Session settings.

use thiserror::Error;
use tidal_input::DEFAULT_PASTE_THRESHOLD;
use tidal_primitives::PasteBlock;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
	#[error("paste threshold must be at least 1, got {0}")]
	PasteThreshold(usize),
}

/// Validated settings for one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
	/// Keystroke bursts at least this long are delivered as one paste.
	pub paste_threshold: usize,
	/// Install helper bindings and run the startup file.
	pub interactive: bool,
}

impl Default for SessionConfig {
	fn default() -> Self {
		Self {
			paste_threshold: DEFAULT_PASTE_THRESHOLD,
			interactive: true,
		}
	}
}

impl SessionConfig {
	/// # Errors
	///
	/// [`ConfigError::PasteThreshold`] for a zero threshold.
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.paste_threshold == 0 {
			return Err(ConfigError::PasteThreshold(self.paste_threshold));
		}
		Ok(())
	}
}

/// Per-run options for [`crate::SessionDriver::run`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOptions {
	pub interactive: bool,
	/// Delivered as one paste after warm-up, before the first paint.
	pub paste: Option<PasteBlock>,
}

impl RunOptions {
	pub fn interactive() -> Self {
		Self {
			interactive: true,
			paste: None,
		}
	}

	pub fn with_paste(mut self, paste: Option<PasteBlock>) -> Self {
		self.paste = paste;
		self
	}
}

impl From<&SessionConfig> for RunOptions {
	fn from(config: &SessionConfig) -> Self {
		Self {
			interactive: config.interactive,
			paste: None,
		}
	}
}
