use std::time::Duration;

use proptest::prelude::*;
use rstest::rstest;
use tidal_primitives::{Key, PasteBlock, SemanticEvent};

use super::*;
use crate::testing::ScriptedSource;

fn press(c: char) -> Option<SemanticEvent> {
	Some(SemanticEvent::KeyPress(Key::char(c)))
}

fn paste(text: &str) -> Option<SemanticEvent> {
	PasteBlock::from_text(text).map(SemanticEvent::PasteBlock)
}

#[test]
fn burst_at_threshold_becomes_paste() {
	let source = ScriptedSource::new().keys("abc").timeout();
	let mut coalescer = EventCoalescer::with_threshold(source, 3);

	assert_eq!(coalescer.poll(None).unwrap(), paste("abc"));
	// The timeout that ended the probe is not replayed; the next poll fetches.
	assert_eq!(coalescer.poll(None).unwrap(), None);
}

#[test]
fn short_burst_is_replayed_without_fetching() {
	let source = ScriptedSource::new().keys("ab").timeout();
	let log = source.timeout_log();
	let mut coalescer = EventCoalescer::with_threshold(source, 3);

	assert_eq!(coalescer.poll(Some(Duration::from_millis(5))).unwrap(), press('a'));
	assert_eq!(
		*log.borrow(),
		vec![Some(Duration::from_millis(5)), Some(Duration::ZERO), Some(Duration::ZERO)]
	);

	assert!(coalescer.has_buffered());
	assert_eq!(coalescer.poll(None).unwrap(), press('b'));
	assert_eq!(log.borrow().len(), 3);
	assert!(!coalescer.has_buffered());
}

#[test]
fn single_key_passes_through() {
	let source = ScriptedSource::new().keys("x").timeout();
	let mut coalescer = EventCoalescer::new(source);

	assert_eq!(coalescer.poll(None).unwrap(), press('x'));
	assert_eq!(coalescer.poll(Some(Duration::ZERO)).unwrap(), None);
}

#[test]
fn structured_event_is_returned_without_probing() {
	let source = ScriptedSource::new().event(SemanticEvent::Refresh).keys("abc");
	let log = source.timeout_log();
	let mut coalescer = EventCoalescer::new(source);

	assert_eq!(coalescer.poll(None).unwrap(), Some(SemanticEvent::Refresh));
	assert_eq!(log.borrow().len(), 1);
}

#[rstest]
#[case::below_threshold("ab", vec![press('a'), press('b')])]
#[case::at_threshold("abcd", vec![paste("abcd")])]
fn structured_event_ending_a_run_follows_the_keys(
	#[case] keys: &str,
	#[case] expected_keys: Vec<Option<SemanticEvent>>,
) {
	let resize = SemanticEvent::Resize { rows: 30, cols: 100 };
	let source = ScriptedSource::new().keys(keys).event(resize.clone()).keys("z");
	let mut coalescer = EventCoalescer::with_threshold(source, 3);

	let mut got = Vec::new();
	for _ in 0..expected_keys.len() {
		got.push(coalescer.poll(None).unwrap());
	}
	assert_eq!(got, expected_keys);
	assert_eq!(coalescer.poll(None).unwrap(), Some(resize));
	assert_eq!(coalescer.poll(None).unwrap(), press('z'));
}

#[test]
fn timeout_with_nothing_buffered_yields_none() {
	let source = ScriptedSource::new().timeout().keys("q");
	let mut coalescer = EventCoalescer::new(source);

	assert_eq!(coalescer.poll(Some(Duration::from_millis(1))).unwrap(), None);
	assert_eq!(coalescer.poll(None).unwrap(), press('q'));
}

#[test]
fn fetch_failure_keeps_collected_keys() {
	let source = ScriptedSource::new().keys("ab").push_error("tty gone");
	let mut coalescer = EventCoalescer::new(source);

	let err = coalescer.poll(None).unwrap_err();
	assert!(err.to_string().contains("tty gone"));
	assert!(coalescer.has_buffered());
	assert_eq!(coalescer.poll(None).unwrap(), press('a'));
	assert_eq!(coalescer.poll(None).unwrap(), press('b'));
}

#[test]
fn zero_threshold_is_clamped() {
	let coalescer = EventCoalescer::with_threshold(ScriptedSource::new(), 0);
	assert_eq!(coalescer.paste_threshold(), 1);
}

#[test]
fn newlines_in_paste_survive_as_enter_keys() {
	let source = ScriptedSource::new().keys("if x:\n    y\n").timeout();
	let mut coalescer = EventCoalescer::new(source);

	let Some(SemanticEvent::PasteBlock(block)) = coalescer.poll(None).unwrap() else {
		panic!("expected a paste block");
	};
	assert_eq!(block.text(), "if x:\n    y\n");
}

fn drain(coalescer: &mut EventCoalescer<ScriptedSource>) -> Vec<SemanticEvent> {
	let mut events = Vec::new();
	while coalescer.source().remaining() > 0 || coalescer.has_buffered() {
		if let Some(event) = coalescer.poll(Some(Duration::ZERO)).unwrap() {
			events.push(event);
		}
	}
	events
}

proptest! {
	#[test]
	fn keys_are_neither_lost_nor_reordered(
		bursts in prop::collection::vec("[a-z]{1,8}", 1..6),
		threshold in 1usize..6,
	) {
		let mut source = ScriptedSource::new();
		for burst in &bursts {
			source = source.keys(burst).timeout();
		}
		let mut coalescer = EventCoalescer::with_threshold(source, threshold);

		let events = drain(&mut coalescer);
		let mut text = String::new();
		for event in &events {
			match event {
				SemanticEvent::KeyPress(key) => text.extend(key.text()),
				SemanticEvent::PasteBlock(block) => {
					prop_assert!(block.len() >= threshold);
					text.push_str(&block.text());
				}
				other => prop_assert!(false, "unexpected event {other:?}"),
			}
		}
		prop_assert_eq!(text, bursts.concat());

		let pastes = events
			.iter()
			.filter(|e| matches!(e, SemanticEvent::PasteBlock(_)))
			.count();
		let expected = bursts.iter().filter(|b| b.len() >= threshold).count();
		prop_assert_eq!(pastes, expected);
	}
}
