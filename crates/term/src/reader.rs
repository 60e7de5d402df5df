//! Terminal reader thread.
//!
//! Polls crossterm on its own thread and forwards translated units into the
//! session's channel. While the session is suspended the thread parks so the
//! foreground job owns the tty.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::Sender;
use crossterm::event::{self, Event, KeyEventKind};
use tidal_input::{RawUnit, SourceMessage};
use tidal_primitives::{Key, PasteBlock, SemanticEvent};

/// How long one crossterm poll may block before flags are rechecked.
pub const POLL_INTERVAL: Duration = Duration::from_millis(50);

const PARK_WAIT: Duration = Duration::from_millis(250);

#[derive(Debug, Default)]
struct Flags {
	stop: AtomicBool,
	paused: AtomicBool,
	parked: AtomicBool,
}

/// Pauses and resumes a running [`InputReader`].
#[derive(Debug, Clone)]
pub struct PauseSwitch {
	flags: Arc<Flags>,
}

impl PauseSwitch {
	/// Stops reading, waiting briefly for an in-flight poll to finish.
	pub fn pause(&self) {
		self.flags.paused.store(true, Ordering::Release);
		let deadline = Instant::now() + PARK_WAIT;
		while !self.flags.parked.load(Ordering::Acquire) && Instant::now() < deadline {
			thread::sleep(Duration::from_millis(5));
		}
		tracing::trace!(parked = self.flags.parked.load(Ordering::Acquire), "input reader paused");
	}

	pub fn resume(&self) {
		self.flags.paused.store(false, Ordering::Release);
	}

	#[cfg(test)]
	pub fn is_paused(&self) -> bool {
		self.flags.paused.load(Ordering::Acquire)
	}
}

/// Handle to the reader thread; dropping it stops the thread.
pub struct InputReader {
	flags: Arc<Flags>,
	thread: Option<JoinHandle<()>>,
}

impl InputReader {
	pub fn spawn(sender: Sender<SourceMessage>) -> std::io::Result<Self> {
		let flags = Arc::new(Flags::default());
		let thread_flags = Arc::clone(&flags);
		let thread = thread::Builder::new()
			.name("tidal-input".into())
			.spawn(move || read_loop(&sender, &thread_flags))?;
		Ok(Self {
			flags,
			thread: Some(thread),
		})
	}

	pub fn pause_switch(&self) -> PauseSwitch {
		PauseSwitch {
			flags: Arc::clone(&self.flags),
		}
	}
}

impl Drop for InputReader {
	fn drop(&mut self) {
		self.flags.stop.store(true, Ordering::Release);
		if let Some(thread) = self.thread.take()
			&& thread.join().is_err()
		{
			tracing::warn!("input reader panicked");
		}
	}
}

fn read_loop(sender: &Sender<SourceMessage>, flags: &Flags) {
	while !flags.stop.load(Ordering::Acquire) {
		if flags.paused.load(Ordering::Acquire) {
			flags.parked.store(true, Ordering::Release);
			thread::sleep(POLL_INTERVAL);
			continue;
		}
		flags.parked.store(false, Ordering::Release);

		let next = match event::poll(POLL_INTERVAL) {
			Ok(true) => event::read(),
			Ok(false) => continue,
			Err(err) => Err(err),
		};
		let message = match next {
			Ok(event) => match translate(event) {
				Some(unit) => SourceMessage::Unit(unit),
				None => continue,
			},
			Err(err) => {
				tracing::error!(error = %err, "terminal read failed");
				let _ = sender.send(SourceMessage::Failed(err));
				return;
			}
		};
		if sender.send(message).is_err() {
			tracing::debug!("session gone, input reader exiting");
			return;
		}
	}
}

/// Maps a crossterm event to a raw unit; releases and focus changes are dropped.
pub fn translate(event: Event) -> Option<RawUnit> {
	match event {
		Event::Key(key) if matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat) => {
			let key = Key::from(key);
			// Raw mode swallows the signal, so Ctrl-C arrives as a key.
			Some(if key.is_ctrl('c') {
				RawUnit::Structured(SemanticEvent::SigInt)
			} else {
				RawUnit::Keystroke(key)
			})
		}
		Event::Paste(text) => {
			let text = text.replace("\r\n", "\n").replace('\r', "\n");
			PasteBlock::from_text(&text).map(|paste| RawUnit::Structured(SemanticEvent::PasteBlock(paste)))
		}
		Event::Resize(cols, rows) => Some(RawUnit::Structured(SemanticEvent::Resize { rows, cols })),
		_ => None,
	}
}
