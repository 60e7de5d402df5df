//! Cloneable access to a running session.

use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::RwLock;
use tidal_input::{ThreadsafeTrigger, TriggerRegistry};
use tidal_primitives::SemanticEvent;

use crate::state::SessionState;

/// Handle given to the interpreter and to foreign threads.
///
/// All methods are safe to call from any thread; requests made after the
/// session has ended are dropped.
#[derive(Debug, Clone)]
pub struct SessionHandle {
	refresh: ThreadsafeTrigger,
	reload: ThreadsafeTrigger<Vec<PathBuf>>,
	state: Arc<RwLock<SessionState>>,
}

impl SessionHandle {
	pub(crate) fn new(registry: &TriggerRegistry, state: Arc<RwLock<SessionState>>) -> Self {
		Self {
			refresh: registry.register_threadsafe(|()| SemanticEvent::Refresh),
			reload: registry.register_threadsafe(|files| SemanticEvent::Reload { files }),
			state,
		}
	}

	/// Queues a full repaint.
	pub fn request_refresh(&self) {
		self.refresh.fire();
	}

	/// Queues a reload for `files`.
	pub fn request_reload(&self, files: Vec<PathBuf>) {
		self.reload.fire_with(files);
	}

	/// State as of the most recent paint.
	pub fn state(&self) -> SessionState {
		*self.state.read()
	}
}
