use std::time::Duration;

use pretty_assertions::assert_eq;
use rstest::rstest;
use tidal_input::testing::ScriptedSource;
use tidal_input::{RawInputSource, RawUnit, Waker};
use tidal_primitives::Key;

use super::*;

fn first_event(signal: i32) -> Option<SemanticEvent> {
	let registry = TriggerRegistry::new(Waker::noop());
	let mut source = registry.attach(ScriptedSource::new());
	if !SignalTriggers::register(&registry).forward(signal) {
		return None;
	}
	match source.fetch(Some(Duration::ZERO)).unwrap() {
		RawUnit::Structured(event) => Some(event),
		unit => panic!("expected a trigger event, got {unit:?}"),
	}
}

#[rstest]
#[case(SIGTERM, "terminated")]
#[case(SIGHUP, "hangup")]
fn termination_signals_are_user_exits(#[case] signal: i32, #[case] expected: &str) {
	assert_eq!(
		first_event(signal),
		Some(SemanticEvent::Exit {
			reason: expected.to_string(),
			requested_by_code: false,
		})
	);
}

#[test]
fn interrupt_is_forwarded() {
	assert_eq!(first_event(SIGINT), Some(SemanticEvent::SigInt));
}

#[test]
fn other_signals_are_ignored() {
	let registry = TriggerRegistry::new(Waker::noop());
	assert!(!SignalTriggers::register(&registry).forward(signal_hook::consts::SIGUSR1));
	assert_eq!(registry.ready_len(), 0);
}

#[test]
fn interrupt_overtakes_buffered_keystrokes() {
	let registry = TriggerRegistry::new(Waker::noop());
	let mut source = registry.attach(ScriptedSource::new().keys("ab"));
	SignalTriggers::register(&registry).forward(SIGINT);

	assert_eq!(
		source.fetch(Some(Duration::ZERO)).unwrap(),
		RawUnit::Structured(SemanticEvent::SigInt)
	);
	assert_eq!(
		source.fetch(Some(Duration::ZERO)).unwrap(),
		RawUnit::Keystroke(Key::char('a'))
	);
}
