//! Session errors.

use thiserror::Error;
use tidal_input::InputError;

use crate::config::ConfigError;

/// Failures that abort a session without a termination.
#[derive(Debug, Error)]
pub enum SessionError {
	#[error(transparent)]
	Input(#[from] InputError),
	#[error("rendering failed: {0}")]
	Render(#[source] std::io::Error),
	#[error("job control failed during {step}: {source}")]
	JobControl {
		step: &'static str,
		#[source]
		source: std::io::Error,
	},
	#[error(transparent)]
	Config(#[from] ConfigError),
	#[error("session has already exited")]
	Finished,
}
