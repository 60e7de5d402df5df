use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use tidal_primitives::{Key, SemanticEvent};

use super::*;
use crate::source::{RawInputSource, RawUnit, Waker};
use crate::testing::ScriptedSource;

fn registry() -> TriggerRegistry {
	TriggerRegistry::new(Waker::noop())
}

#[test]
fn immediate_event_is_delivered_without_touching_the_source() {
	let registry = registry();
	let source = ScriptedSource::new().keys("a");
	let log = source.timeout_log();
	let mut source = registry.attach(source);

	let undo = registry.register_immediate(|| SemanticEvent::Undo);
	undo.fire();

	assert_eq!(
		source.fetch(None).unwrap(),
		RawUnit::Structured(SemanticEvent::Undo)
	);
	assert!(log.borrow().is_empty());
	assert_eq!(source.fetch(None).unwrap(), RawUnit::Keystroke(Key::char('a')));
}

#[test]
fn repeated_fires_queue_in_order() {
	let registry = registry();
	let mut source = registry.attach(ScriptedSource::new());

	let refresh = registry.register_immediate(|| SemanticEvent::Refresh);
	let undo = registry.register_immediate(|| SemanticEvent::Undo);
	refresh.fire();
	undo.fire();
	refresh.fire();
	assert_eq!(registry.ready_len(), 3);

	let delivered: Vec<_> = (0..4).map(|_| source.fetch(Some(Duration::ZERO)).unwrap()).collect();
	assert_eq!(
		delivered,
		vec![
			RawUnit::Structured(SemanticEvent::Refresh),
			RawUnit::Structured(SemanticEvent::Undo),
			RawUnit::Structured(SemanticEvent::Refresh),
			RawUnit::Timeout,
		]
	);
}

#[test]
fn scheduled_deadline_caps_blocking_wait() {
	let registry = registry();
	let source = ScriptedSource::new();
	let log = source.timeout_log();
	let mut source = registry.attach(source);

	let tick = registry.register_scheduled(|| SemanticEvent::ScheduledRefresh);
	tick.schedule(Duration::from_secs(60));

	assert_eq!(source.fetch(None).unwrap(), RawUnit::Timeout);
	let requested = log.borrow()[0].expect("wait should be capped");
	assert!(requested <= Duration::from_secs(60));
	assert!(requested > Duration::from_secs(50));
	assert_eq!(registry.scheduled_len(), 1);
}

#[test]
fn shorter_caller_timeout_wins() {
	let registry = registry();
	let source = ScriptedSource::new();
	let log = source.timeout_log();
	let mut source = registry.attach(source);

	registry
		.register_scheduled(|| SemanticEvent::ScheduledRefresh)
		.schedule(Duration::from_secs(60));
	source.fetch(Some(Duration::from_millis(10))).unwrap();
	assert_eq!(log.borrow()[0], Some(Duration::from_millis(10)));
}

#[test]
fn due_event_is_delivered() {
	let registry = registry();
	let mut source = registry.attach(ScriptedSource::new());

	let tick = registry.register_scheduled(|| SemanticEvent::ScheduledRefresh);
	tick.schedule_at(Instant::now() - Duration::from_millis(1));

	assert_eq!(
		source.fetch(None).unwrap(),
		RawUnit::Structured(SemanticEvent::ScheduledRefresh)
	);
	assert_eq!(registry.scheduled_len(), 0);
	assert_eq!(registry.next_deadline(), None);
}

#[test]
fn equal_deadlines_keep_scheduling_order() {
	let registry = registry();
	let mut source = registry.attach(ScriptedSource::new());
	let first = registry.register_scheduled(|| SemanticEvent::Undo);
	let second = registry.register_scheduled(|| SemanticEvent::Refresh);

	let deadline = Instant::now();
	second.schedule_at(deadline + Duration::from_secs(1));
	first.schedule_at(deadline);
	second.schedule_at(deadline);

	assert_eq!(
		source.fetch(Some(Duration::ZERO)).unwrap(),
		RawUnit::Structured(SemanticEvent::Undo)
	);
	assert_eq!(
		source.fetch(Some(Duration::ZERO)).unwrap(),
		RawUnit::Structured(SemanticEvent::Refresh)
	);
	assert_eq!(registry.scheduled_len(), 1);
}

#[test]
fn threadsafe_trigger_fires_from_other_threads() {
	let registry = registry();
	let mut source = registry.attach(ScriptedSource::new());
	let reload = registry.register_threadsafe(|files: Vec<PathBuf>| SemanticEvent::Reload { files });

	let remote = reload.clone();
	thread::spawn(move || remote.fire_with(vec![PathBuf::from("/tmp/mod.py")]))
		.join()
		.unwrap();

	assert_eq!(
		source.fetch(None).unwrap(),
		RawUnit::Structured(SemanticEvent::Reload {
			files: vec![PathBuf::from("/tmp/mod.py")]
		})
	);
}

/// Sleeps for the requested timeout and reports nothing.
struct IdleSource;

impl RawInputSource for IdleSource {
	fn fetch(&mut self, timeout: Option<Duration>) -> crate::error::Result<RawUnit> {
		thread::sleep(timeout.unwrap_or(Duration::from_secs(5)));
		Ok(RawUnit::Timeout)
	}
}

#[test]
fn blocking_wait_ends_with_the_scheduled_event() {
	let registry = registry();
	let mut source = registry.attach(IdleSource);
	registry
		.register_scheduled(|| SemanticEvent::ScheduledRefresh)
		.schedule(Duration::from_millis(20));

	let start = Instant::now();
	assert_eq!(
		source.fetch(None).unwrap(),
		RawUnit::Structured(SemanticEvent::ScheduledRefresh)
	);
	assert!(start.elapsed() >= Duration::from_millis(20));
	assert!(start.elapsed() < Duration::from_secs(5));
}
