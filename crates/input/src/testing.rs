//! Scripted input for driving the coalescer and session in tests.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

use tidal_primitives::{Key, SemanticEvent};

use crate::error::{InputError, Result};
use crate::source::{RawInputSource, RawUnit};

enum Step {
	Unit(RawUnit),
	Error(String),
}

/// Source that replays a fixed script and then reports timeouts forever.
///
/// Every requested timeout is recorded so tests can check whether a fetch
/// was a blocking wait or a probe.
#[derive(Default)]
pub struct ScriptedSource {
	script: VecDeque<Step>,
	timeouts: Rc<RefCell<Vec<Option<Duration>>>>,
}

impl ScriptedSource {
	pub fn new() -> Self {
		Self::default()
	}

	/// Appends one unit.
	pub fn push(mut self, unit: RawUnit) -> Self {
		self.script.push_back(Step::Unit(unit));
		self
	}

	/// Appends one keystroke per character of `text`.
	pub fn keys(mut self, text: &str) -> Self {
		self.script
			.extend(text.chars().map(|c| Step::Unit(RawUnit::Keystroke(Key::from(c)))));
		self
	}

	/// Appends a structured event.
	pub fn event(self, event: SemanticEvent) -> Self {
		self.push(RawUnit::Structured(event))
	}

	/// Appends a timeout.
	pub fn timeout(self) -> Self {
		self.push(RawUnit::Timeout)
	}

	/// Appends a backend failure.
	pub fn push_error(mut self, message: &str) -> Self {
		self.script.push_back(Step::Error(message.to_string()));
		self
	}

	/// Shared log of the timeouts each fetch was called with.
	pub fn timeout_log(&self) -> Rc<RefCell<Vec<Option<Duration>>>> {
		Rc::clone(&self.timeouts)
	}

	/// Number of scripted steps not yet consumed.
	pub fn remaining(&self) -> usize {
		self.script.len()
	}
}

impl RawInputSource for ScriptedSource {
	fn fetch(&mut self, timeout: Option<Duration>) -> Result<RawUnit> {
		self.timeouts.borrow_mut().push(timeout);
		match self.script.pop_front() {
			Some(Step::Unit(unit)) => Ok(unit),
			Some(Step::Error(message)) => Err(InputError::Backend(std::io::Error::other(message))),
			None => Ok(RawUnit::Timeout),
		}
	}
}
