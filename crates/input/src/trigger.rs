//! Triggers: handles that inject one [`SemanticEvent`] per invocation.
//!
//! Fired events wait in a shared queue until the [`TriggeredSource`] wrapping
//! the raw source hands them out as structured units, so the coalescer sees
//! them exactly like resize or bracketed-paste events from the terminal.

use std::cmp::Ordering as CmpOrdering;
use std::collections::{BinaryHeap, VecDeque};
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tidal_primitives::SemanticEvent;

use crate::error::Result;
use crate::source::{RawInputSource, RawUnit, Waker};

/// A scheduled event ordered by deadline, then by scheduling order.
struct Scheduled {
	due: Instant,
	seq: u64,
	event: SemanticEvent,
}

impl PartialEq for Scheduled {
	fn eq(&self, other: &Self) -> bool {
		self.due == other.due && self.seq == other.seq
	}
}

impl Eq for Scheduled {}

impl PartialOrd for Scheduled {
	fn partial_cmp(&self, other: &Self) -> Option<CmpOrdering> {
		Some(self.cmp(other))
	}
}

impl Ord for Scheduled {
	// Reversed: BinaryHeap is a max-heap and the earliest deadline must surface first.
	fn cmp(&self, other: &Self) -> CmpOrdering {
		other.due.cmp(&self.due).then_with(|| other.seq.cmp(&self.seq))
	}
}

#[derive(Default)]
struct TriggerQueue {
	ready: Mutex<VecDeque<SemanticEvent>>,
	scheduled: Mutex<BinaryHeap<Scheduled>>,
	next_seq: AtomicU64,
}

impl TriggerQueue {
	fn push_ready(&self, event: SemanticEvent) {
		tracing::trace!(event = event.name(), "trigger fired");
		self.ready.lock().push_back(event);
	}

	fn push_scheduled(&self, due: Instant, event: SemanticEvent) {
		let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
		tracing::trace!(event = event.name(), seq, "trigger scheduled");
		self.scheduled.lock().push(Scheduled { due, seq, event });
	}

	/// Moves every scheduled event due at `now` onto the ready queue.
	fn promote_due(&self, now: Instant) {
		let mut scheduled = self.scheduled.lock();
		let mut ready = None;
		while scheduled.peek().is_some_and(|s| s.due <= now) {
			let Some(entry) = scheduled.pop() else { break };
			ready.get_or_insert_with(|| self.ready.lock()).push_back(entry.event);
		}
	}

	fn take_ready(&self, now: Instant) -> Option<SemanticEvent> {
		self.promote_due(now);
		self.ready.lock().pop_front()
	}

	fn next_deadline(&self) -> Option<Instant> {
		self.scheduled.lock().peek().map(|s| s.due)
	}

	/// Shortens `timeout` so a blocking fetch returns by the nearest deadline.
	fn cap(&self, timeout: Option<Duration>, now: Instant) -> Option<Duration> {
		let until_due = self.next_deadline().map(|due| due.saturating_duration_since(now));
		match (timeout, until_due) {
			(Some(t), Some(d)) => Some(t.min(d)),
			(t, None) => t,
			(None, d) => d,
		}
	}
}

/// Creates trigger handles bound to one event stream.
pub struct TriggerRegistry {
	queue: Arc<TriggerQueue>,
	waker: Waker,
}

impl TriggerRegistry {
	/// Creates a registry whose threadsafe triggers wake fetches through `waker`.
	pub fn new(waker: Waker) -> Self {
		Self {
			queue: Arc::new(TriggerQueue::default()),
			waker,
		}
	}

	/// Wraps `source` so it delivers this registry's events.
	pub fn attach<S: RawInputSource>(&self, source: S) -> TriggeredSource<S> {
		TriggeredSource {
			inner: source,
			queue: Arc::clone(&self.queue),
		}
	}

	/// Registers a trigger fired from the driver thread.
	pub fn register_immediate<F>(&self, factory: F) -> ImmediateTrigger
	where
		F: Fn() -> SemanticEvent + 'static,
	{
		ImmediateTrigger {
			queue: Arc::clone(&self.queue),
			factory: Rc::new(factory),
		}
	}

	/// Registers a trigger that injects its event after a delay.
	pub fn register_scheduled<F>(&self, factory: F) -> ScheduledTrigger
	where
		F: Fn() -> SemanticEvent + 'static,
	{
		ScheduledTrigger {
			queue: Arc::clone(&self.queue),
			factory: Rc::new(factory),
		}
	}

	/// Registers a trigger that may be fired from any thread.
	pub fn register_threadsafe<A, F>(&self, factory: F) -> ThreadsafeTrigger<A>
	where
		F: Fn(A) -> SemanticEvent + Send + Sync + 'static,
	{
		ThreadsafeTrigger {
			queue: Arc::clone(&self.queue),
			waker: self.waker.clone(),
			factory: Arc::new(factory),
		}
	}

	/// Number of fired events not yet delivered.
	pub fn ready_len(&self) -> usize {
		self.queue.ready.lock().len()
	}

	/// Number of scheduled events still waiting for their deadline.
	pub fn scheduled_len(&self) -> usize {
		self.queue.scheduled.lock().len()
	}

	/// Deadline of the earliest scheduled event.
	pub fn next_deadline(&self) -> Option<Instant> {
		self.queue.next_deadline()
	}
}

/// Driver-thread trigger; its event is ready on the very next fetch.
#[derive(Clone)]
pub struct ImmediateTrigger {
	queue: Arc<TriggerQueue>,
	factory: Rc<dyn Fn() -> SemanticEvent>,
}

impl ImmediateTrigger {
	pub fn fire(&self) {
		self.queue.push_ready((self.factory)());
	}
}

/// Driver-thread trigger delivering its event once a delay has elapsed.
#[derive(Clone)]
pub struct ScheduledTrigger {
	queue: Arc<TriggerQueue>,
	factory: Rc<dyn Fn() -> SemanticEvent>,
}

impl ScheduledTrigger {
	/// Injects the event `delay` from now.
	pub fn schedule(&self, delay: Duration) {
		self.schedule_at(Instant::now() + delay);
	}

	/// Injects the event once `deadline` has passed.
	pub fn schedule_at(&self, deadline: Instant) {
		self.queue.push_scheduled(deadline, (self.factory)());
	}
}

/// Trigger that can be fired from any thread.
///
/// Firing never fails; when the session has already gone away the event is
/// simply never delivered.
pub struct ThreadsafeTrigger<A = ()> {
	queue: Arc<TriggerQueue>,
	waker: Waker,
	factory: Arc<dyn Fn(A) -> SemanticEvent + Send + Sync>,
}

impl<A> ThreadsafeTrigger<A> {
	/// Enqueues the event built from `arg` and wakes the driver.
	pub fn fire_with(&self, arg: A) {
		self.queue.push_ready((self.factory)(arg));
		self.waker.wake();
	}
}

impl ThreadsafeTrigger<()> {
	pub fn fire(&self) {
		self.fire_with(());
	}
}

impl<A> Clone for ThreadsafeTrigger<A> {
	fn clone(&self) -> Self {
		Self {
			queue: Arc::clone(&self.queue),
			waker: self.waker.clone(),
			factory: Arc::clone(&self.factory),
		}
	}
}

impl<A> std::fmt::Debug for ThreadsafeTrigger<A> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ThreadsafeTrigger").finish_non_exhaustive()
	}
}

/// Raw source that delivers fired trigger events ahead of blocking.
pub struct TriggeredSource<S> {
	inner: S,
	queue: Arc<TriggerQueue>,
}

impl<S> TriggeredSource<S> {
	pub fn inner(&self) -> &S {
		&self.inner
	}

	pub fn inner_mut(&mut self) -> &mut S {
		&mut self.inner
	}
}

impl<S: RawInputSource> RawInputSource for TriggeredSource<S> {
	fn fetch(&mut self, timeout: Option<Duration>) -> Result<RawUnit> {
		if let Some(event) = self.queue.take_ready(Instant::now()) {
			return Ok(RawUnit::Structured(event));
		}

		let capped = self.queue.cap(timeout, Instant::now());
		match self.inner.fetch(capped)? {
			// A wake or an elapsed deadline both surface as a timeout here.
			RawUnit::Timeout => Ok(self
				.queue
				.take_ready(Instant::now())
				.map_or(RawUnit::Timeout, RawUnit::Structured)),
			unit => Ok(unit),
		}
	}
}

#[cfg(test)]
mod tests;
