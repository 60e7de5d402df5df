//! Paste detection by coalescing keystroke bursts.
//!
//! Terminals without bracketed paste deliver a paste as a burst of ordinary
//! keystrokes. After the first keystroke of a cycle the coalescer keeps
//! probing the source without blocking; when the probe stops, a run of at
//! least `paste_threshold` keys becomes one [`PasteBlock`] and a shorter run
//! is replayed key by key.

use std::collections::VecDeque;
use std::time::Duration;

use tidal_primitives::{Key, PasteBlock, SemanticEvent};

use crate::error::Result;
use crate::source::{RawInputSource, RawUnit};

/// Minimum burst length treated as a paste.
pub const DEFAULT_PASTE_THRESHOLD: usize = 3;

/// Pull-based transformer from raw units to semantic events.
pub struct EventCoalescer<S> {
	source: S,
	paste_threshold: usize,
	/// Keystrokes collected by the last probe, not yet emitted.
	pending: VecDeque<Key>,
	/// Structured event that ended the last probe.
	lookahead: Option<SemanticEvent>,
}

impl<S: RawInputSource> EventCoalescer<S> {
	/// Creates a coalescer with the default paste threshold.
	pub fn new(source: S) -> Self {
		Self::with_threshold(source, DEFAULT_PASTE_THRESHOLD)
	}

	/// Creates a coalescer treating bursts of `paste_threshold` or more keys as a paste.
	pub fn with_threshold(source: S, paste_threshold: usize) -> Self {
		Self {
			source,
			paste_threshold: paste_threshold.max(1),
			pending: VecDeque::new(),
			lookahead: None,
		}
	}

	/// Produces the next event, waiting at most `timeout` for fresh input.
	///
	/// `Ok(None)` means no new input arrived and the caller should only
	/// repaint. The timeout is ignored while keystrokes from a previous burst
	/// are still being replayed.
	pub fn poll(&mut self, timeout: Option<Duration>) -> Result<Option<SemanticEvent>> {
		if let Some(key) = self.pending.pop_front() {
			return Ok(Some(SemanticEvent::KeyPress(key)));
		}
		if let Some(event) = self.lookahead.take() {
			return Ok(Some(event));
		}

		let first = match self.source.fetch(timeout)? {
			RawUnit::Structured(event) => return Ok(Some(event)),
			RawUnit::Timeout => return Ok(None),
			RawUnit::Keystroke(key) => key,
		};

		self.pending.push_back(first);
		self.probe()?;

		if self.pending.len() >= self.paste_threshold {
			let keys: Vec<Key> = self.pending.drain(..).collect();
			tracing::trace!(keys = keys.len(), "coalesced keystrokes into paste");
			return Ok(PasteBlock::new(keys).map(SemanticEvent::PasteBlock));
		}

		Ok(self.pending.pop_front().map(SemanticEvent::KeyPress))
	}

	/// Collects keystrokes that are already available.
	///
	/// Stops on the first timeout or structured event; the latter is kept
	/// for the cycle after the collected keys have been emitted.
	fn probe(&mut self) -> Result<()> {
		loop {
			match self.source.fetch(Some(Duration::ZERO))? {
				RawUnit::Keystroke(key) => self.pending.push_back(key),
				RawUnit::Timeout => return Ok(()),
				RawUnit::Structured(event) => {
					tracing::trace!(event = event.name(), "structured event ended probe");
					self.lookahead = Some(event);
					return Ok(());
				}
			}
		}
	}

	/// Keystrokes or lookahead waiting to be emitted without fetching.
	pub fn has_buffered(&self) -> bool {
		!self.pending.is_empty() || self.lookahead.is_some()
	}

	/// The configured paste threshold.
	pub fn paste_threshold(&self) -> usize {
		self.paste_threshold
	}

	/// Shared access to the wrapped source.
	pub fn source(&self) -> &S {
		&self.source
	}

	/// Mutable access to the wrapped source.
	pub fn source_mut(&mut self) -> &mut S {
		&mut self.source
	}
}

#[cfg(test)]
mod tests;
