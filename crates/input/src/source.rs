//! Raw input units and the channel-backed source the terminal feeds.
//!
//! The terminal reader runs on its own thread and pushes [`SourceMessage`]s
//! into an unbounded channel. The driver thread blocks on that channel with
//! the timeout it was asked for. Anything else that needs to interrupt the
//! wait (a threadsafe trigger, a signal) sends a wake through a [`Waker`].

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TryRecvError};
use tidal_primitives::{Key, SemanticEvent};

use crate::error::Result;

/// One item produced by a raw input source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawUnit {
	/// An event the terminal layer already classified (resize, signal,
	/// bracketed paste, trigger).
	Structured(SemanticEvent),
	/// Nothing arrived within the requested wait.
	Timeout,
	/// A key press not yet classified as paste or single press.
	Keystroke(Key),
}

/// Blocking provider of raw input.
pub trait RawInputSource {
	/// Waits up to `timeout` for the next unit.
	///
	/// `None` blocks until something arrives; `Some(Duration::ZERO)` is a
	/// non-blocking probe.
	fn fetch(&mut self, timeout: Option<Duration>) -> Result<RawUnit>;
}

impl<S: RawInputSource + ?Sized> RawInputSource for &mut S {
	fn fetch(&mut self, timeout: Option<Duration>) -> Result<RawUnit> {
		(**self).fetch(timeout)
	}
}

impl<S: RawInputSource + ?Sized> RawInputSource for Box<S> {
	fn fetch(&mut self, timeout: Option<Duration>) -> Result<RawUnit> {
		(**self).fetch(timeout)
	}
}

/// Messages accepted by a [`ChannelSource`].
#[derive(Debug)]
pub enum SourceMessage {
	/// A raw unit read from the terminal.
	Unit(RawUnit),
	/// Interrupt a blocked fetch.
	Wake,
	/// The producer hit an unrecoverable read error.
	Failed(std::io::Error),
}

/// Wakes a [`ChannelSource`] blocked in [`RawInputSource::fetch`].
///
/// Wakes coalesce: while one is pending, further calls send nothing.
#[derive(Clone)]
pub struct Waker {
	inner: Option<WakerInner>,
}

#[derive(Clone)]
struct WakerInner {
	tx: Sender<SourceMessage>,
	pending: Arc<AtomicBool>,
}

impl Waker {
	/// A waker that does nothing, for sources that never block.
	pub fn noop() -> Self {
		Self { inner: None }
	}

	/// Interrupts the current or next blocking fetch.
	pub fn wake(&self) {
		let Some(inner) = &self.inner else {
			return;
		};
		if inner.pending.swap(true, Ordering::AcqRel) {
			return;
		}
		if inner.tx.send(SourceMessage::Wake).is_err() {
			tracing::trace!("wake dropped, input source is gone");
		}
	}
}

impl std::fmt::Debug for Waker {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Waker").field("noop", &self.inner.is_none()).finish()
	}
}

/// Raw input source fed through a channel.
pub struct ChannelSource {
	tx: Sender<SourceMessage>,
	rx: Receiver<SourceMessage>,
	wake_pending: Arc<AtomicBool>,
}

impl ChannelSource {
	/// Creates an empty source.
	pub fn new() -> Self {
		let (tx, rx) = crossbeam_channel::unbounded();
		Self {
			tx,
			rx,
			wake_pending: Arc::new(AtomicBool::new(false)),
		}
	}

	/// Sender handle for producer threads.
	pub fn sender(&self) -> Sender<SourceMessage> {
		self.tx.clone()
	}

	/// Waker handle for triggers and signal forwarding.
	pub fn waker(&self) -> Waker {
		Waker {
			inner: Some(WakerInner {
				tx: self.tx.clone(),
				pending: Arc::clone(&self.wake_pending),
			}),
		}
	}

	fn receive(&self, timeout: Option<Duration>) -> Option<SourceMessage> {
		match timeout {
			// The source holds its own sender, so the channel never disconnects.
			None => self.rx.recv().ok(),
			Some(t) if t.is_zero() => match self.rx.try_recv() {
				Ok(msg) => Some(msg),
				Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
			},
			Some(t) => match self.rx.recv_timeout(t) {
				Ok(msg) => Some(msg),
				Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
			},
		}
	}
}

impl Default for ChannelSource {
	fn default() -> Self {
		Self::new()
	}
}

impl RawInputSource for ChannelSource {
	fn fetch(&mut self, timeout: Option<Duration>) -> Result<RawUnit> {
		match self.receive(timeout) {
			Some(SourceMessage::Unit(unit)) => Ok(unit),
			Some(SourceMessage::Wake) => {
				self.wake_pending.store(false, Ordering::Release);
				Ok(RawUnit::Timeout)
			}
			Some(SourceMessage::Failed(err)) => Err(err.into()),
			None => Ok(RawUnit::Timeout),
		}
	}
}
