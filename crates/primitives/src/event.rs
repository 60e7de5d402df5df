//! Semantic events: the unit the session driver dispatches.

use std::path::PathBuf;

use crate::key::Key;

/// An ordered, non-empty run of keystrokes delivered as one paste.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasteBlock {
	keys: Vec<Key>,
}

impl PasteBlock {
	/// Wraps a run of keys, or returns `None` when the run is empty.
	pub fn new(keys: Vec<Key>) -> Option<Self> {
		if keys.is_empty() {
			None
		} else {
			Some(Self { keys })
		}
	}

	/// Builds a paste from literal text, one key per character.
	pub fn from_text(text: &str) -> Option<Self> {
		Self::new(text.chars().map(Key::from).collect())
	}

	/// The pasted keys in arrival order.
	pub fn keys(&self) -> &[Key] {
		&self.keys
	}

	/// Number of keys in the paste; always at least one.
	pub fn len(&self) -> usize {
		self.keys.len()
	}

	/// Always false; kept for API symmetry with collections.
	pub fn is_empty(&self) -> bool {
		false
	}

	/// Concatenated text of the printable keys.
	pub fn text(&self) -> String {
		self.keys.iter().filter_map(Key::text).collect()
	}
}

/// Events delivered to the session driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SemanticEvent {
	/// A single key press.
	KeyPress(Key),
	/// Several keys that arrived together, either coalesced or bracketed by
	/// the terminal.
	PasteBlock(PasteBlock),
	/// Full repaint requested.
	Refresh,
	/// Repaint requested by a timer.
	ScheduledRefresh,
	/// Watched source files changed on disk.
	Reload {
		/// Paths reported by the watcher.
		files: Vec<PathBuf>,
	},
	/// Undo the last submitted entry.
	Undo,
	/// Interrupt (Ctrl-C or `SIGINT`).
	SigInt,
	/// Run the startup file, once, before the first paint.
	StartupRequest,
	/// The terminal was resized.
	Resize {
		/// New height in rows.
		rows: u16,
		/// New width in columns.
		cols: u16,
	},
	/// End the session.
	Exit {
		/// Human-readable reason, used for logging.
		reason: String,
		/// Whether executed code, rather than the user, asked to exit.
		requested_by_code: bool,
	},
}

impl SemanticEvent {
	/// Short tag used in log fields.
	pub fn name(&self) -> &'static str {
		match self {
			SemanticEvent::KeyPress(_) => "key",
			SemanticEvent::PasteBlock(_) => "paste",
			SemanticEvent::Refresh => "refresh",
			SemanticEvent::ScheduledRefresh => "scheduled_refresh",
			SemanticEvent::Reload { .. } => "reload",
			SemanticEvent::Undo => "undo",
			SemanticEvent::SigInt => "sigint",
			SemanticEvent::StartupRequest => "startup",
			SemanticEvent::Resize { .. } => "resize",
			SemanticEvent::Exit { .. } => "exit",
		}
	}
}
