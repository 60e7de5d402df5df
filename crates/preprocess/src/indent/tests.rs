use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rstest::rstest;

use super::*;

#[rstest]
#[case::single_tab("\tx", "    x")]
#[case::two_tabs("\t\tx", "        x")]
#[case::inner_tabs_kept("x\ty", "x\ty")]
#[case::after_spaces_kept("  \tx", "  \tx")]
#[case::per_line("\ta\n\t\tb", "    a\n        b")]
fn expands_leading_tabs(#[case] source: &str, #[case] expected: &str) {
	assert_eq!(expand_leading_tabs(source), expected);
}

#[rstest]
#[case::empty("", "")]
#[case::no_blank_lines("a\n  b", "a\n  b")]
#[case::inside_block("def f():\n    a\n\n    b", "def f():\n    a\n    \n    b")]
#[case::shorter_neighbour_wins("if x:\n        a\n\n    b", "if x:\n        a\n    \n    b")]
#[case::tie_takes_previous("  a\n\n  b", "  a\n  \n  b")]
#[case::trailing_newline_kept("    a\n\n    b\n", "    a\n    \n    b\n")]
#[case::last_line_blank_has_no_next("    a\n", "    a\n")]
#[case::first_line_blank("\n    a", "\n    a")]
#[case::whitespace_lines_untouched("    a\n  \n    b", "    a\n  \n    b")]
fn indents_empty_lines(#[case] source: &str, #[case] expected: &str) {
	assert_eq!(indent_empty_lines(source), expected);
}

#[test]
fn blank_run_uses_original_neighbours() {
	// Both blank lines see one blank neighbour, whose prefix is empty.
	assert_eq!(indent_empty_lines("    a\n\n\n    b"), "    a\n\n\n    b");
}

#[test]
fn repair_expands_tabs_before_measuring() {
	let source = "for x in y:\n\tprint(x)\n\n\tprint(x)\n";
	assert_eq!(repair(source), "for x in y:\n    print(x)\n    \n    print(x)\n");
}

fn source_text() -> impl Strategy<Value = String> {
	prop::collection::vec("[ \t]{0,3}[a-z:]{0,4}", 0..8).prop_map(|lines| lines.join("\n"))
}

proptest! {
	#[test]
	fn repair_is_idempotent(source in source_text(), trailing in any::<bool>()) {
		let source = if trailing { format!("{source}\n") } else { source };
		let once = repair(&source);
		prop_assert_eq!(repair(&once), once);
	}

	#[test]
	fn line_count_is_preserved(source in source_text()) {
		prop_assert_eq!(repair(&source).split('\n').count(), source.split('\n').count());
	}
}
