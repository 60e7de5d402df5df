use rstest::rstest;

use super::*;

#[rstest]
#[case(Key::char('a'), "a")]
#[case(Key::char(' '), "space")]
#[case(Key::ctrl('c'), "C-c")]
#[case(Key::alt('x'), "A-x")]
#[case(Key::new(KeyCode::Enter), "enter")]
#[case(Key::new(KeyCode::F(5)), "f5")]
fn display_uses_prefixed_names(#[case] key: Key, #[case] expected: &str) {
	assert_eq!(key.to_string(), expected);
}

#[test]
fn text_of_printable_keys() {
	assert_eq!(Key::char('x').text(), Some('x'));
	assert_eq!(Key::new(KeyCode::Enter).text(), Some('\n'));
	assert_eq!(Key::new(KeyCode::Tab).text(), Some('\t'));
}

#[test]
fn chords_insert_no_text() {
	assert_eq!(Key::ctrl('d').text(), None);
	assert_eq!(Key::alt('u').text(), None);
	assert_eq!(Key::new(KeyCode::Left).text(), None);
}

#[test]
fn shifted_char_still_inserts() {
	let key = Key {
		code: KeyCode::Char('!'),
		modifiers: Modifiers {
			shift: true,
			..Modifiers::NONE
		},
	};
	assert_eq!(key.text(), Some('!'));
}

#[test]
fn from_char_maps_line_breaks_to_enter() {
	assert_eq!(Key::from('\n'), Key::new(KeyCode::Enter));
	assert_eq!(Key::from('\r'), Key::new(KeyCode::Enter));
	assert_eq!(Key::from('\t'), Key::new(KeyCode::Tab));
	assert_eq!(Key::from('q'), Key::char('q'));
}

#[test]
fn is_ctrl_requires_ctrl_without_alt() {
	assert!(Key::ctrl('c').is_ctrl('c'));
	assert!(!Key::char('c').is_ctrl('c'));
	assert!(!Key::alt('c').is_ctrl('c'));
}

#[cfg(feature = "terminal-input")]
mod crossterm_conversion {
	use crossterm::event::{KeyCode as CtKeyCode, KeyEvent, KeyModifiers};

	use super::*;

	#[test]
	fn uppercase_letters_drop_shift() {
		let key = Key::from(KeyEvent::new(CtKeyCode::Char('A'), KeyModifiers::SHIFT));
		assert_eq!(key, Key::char('A'));
	}

	#[test]
	fn back_tab_becomes_shift_tab() {
		let key = Key::from(KeyEvent::new(CtKeyCode::BackTab, KeyModifiers::SHIFT));
		assert_eq!(key.code, KeyCode::Tab);
		assert!(key.modifiers.shift);
	}

	#[test]
	fn control_chord_is_preserved() {
		let key = Key::from(KeyEvent::new(CtKeyCode::Char('c'), KeyModifiers::CONTROL));
		assert!(key.is_ctrl('c'));
	}
}
