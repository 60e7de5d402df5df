use pretty_assertions::assert_eq;
use rstest::rstest;
use tidal_session::{Cursor, JobControl, Renderer};

use super::*;

fn lines(texts: &[&str]) -> Vec<String> {
	texts.iter().map(|t| (*t).to_string()).collect()
}

fn numbered(count: usize) -> Vec<String> {
	(0..count).map(|i| format!("line {i}")).collect()
}

fn term(rows: u16, cols: u16) -> InlineTerminal<Vec<u8>> {
	InlineTerminal::with_size(Vec::new(), rows, cols)
}

#[rstest]
#[case("", 10, &[""])]
#[case("abc", 10, &["abc"])]
#[case("abcdefghij", 5, &["abcde", "fghij"])]
#[case("abcdefghijk", 5, &["abcde", "fghij", "k"])]
#[case("日本語", 4, &["日本", "語"])]
fn wraps_on_display_width(#[case] line: &str, #[case] cols: u16, #[case] expected: &[&str]) {
	assert_eq!(wrap(line, cols), lines(expected));
}

#[test]
fn frame_that_fits_does_not_scroll() {
	let mut term = term(5, 20);
	let scrolled = term.render(&lines(&[">>> 1 + 1", "2", ">>> "]), Cursor { row: 2, col: 4 }).unwrap();
	assert_eq!(scrolled, 0);
	assert_eq!(term.top(), 0);
	let output = String::from_utf8_lossy(term.output());
	assert!(output.contains(">>> 1 + 1\r\n2\r\n>>> "));
}

#[test]
fn overflow_is_reported_once() {
	let mut term = term(5, 20);
	assert_eq!(term.render(&numbered(7), Cursor::default()).unwrap(), 2);
	assert_eq!(term.top(), -2);

	assert_eq!(term.render(&numbered(7), Cursor::default()).unwrap(), 0);
	assert_eq!(term.render(&numbered(8), Cursor::default()).unwrap(), 1);
	assert_eq!(term.top(), -3);
}

#[test]
fn wrapped_lines_take_several_rows() {
	let mut term = term(5, 10);
	let long = "x".repeat(25);
	assert_eq!(term.render(&[long.clone(), "y".into()], Cursor::default()).unwrap(), 0);
	assert_eq!(
		term.render(&[long, "y".into(), "z".into(), "w".into()], Cursor::default())
			.unwrap(),
		1
	);
}

#[test]
fn scrolled_off_rows_are_not_redrawn() {
	let mut term = term(3, 20);
	term.render(&numbered(5), Cursor::default()).unwrap();
	let before = term.output().len();

	term.render(&numbered(5), Cursor::default()).unwrap();

	let redraw = String::from_utf8_lossy(&term.output()[before..]).into_owned();
	assert!(!redraw.contains("line 1"));
	assert!(redraw.contains("line 2\r\nline 3\r\nline 4"));
}

#[test]
fn resume_anchors_below_the_previous_frame() {
	let mut term = term(5, 20);
	term.render(&lines(&["a", "b"]), Cursor::default()).unwrap();

	term.release_window().unwrap();
	term.release_input().unwrap();
	term.stop_process().unwrap();
	term.reacquire_input().unwrap();
	term.reacquire_window().unwrap();

	assert_eq!(term.top(), 2);
	assert_eq!(term.render(&lines(&["a", "b", "c", "d"]), Cursor::default()).unwrap(), 1);
}

#[test]
fn shared_terminal_keeps_one_anchor() {
	let mut renderer = SharedTerminal::new(term(4, 20));
	let mut job = renderer.clone();

	renderer.render(&numbered(3), Cursor::default()).unwrap();
	job.release_window().unwrap();
	job.reacquire_window().unwrap();

	assert_eq!(renderer.top(), 3);
	assert_eq!(renderer.render(&numbered(2), Cursor::default()).unwrap(), 1);
}
