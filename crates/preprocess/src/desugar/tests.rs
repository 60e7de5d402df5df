use rstest::rstest;

use super::*;

#[rstest]
#[case::call_shorthand("x!f", "f(x)")]
#[case::last_bang_splits("a!b!c", "c(a!b)")]
#[case::expression_argument("[1, 2]!len", "len([1, 2])")]
#[case::trailing_bang("x!", "(x)")]
#[case::not_equal_is_untouched("x != y", "x != y")]
#[case::bang_followed_by_digits("x!f1", "x!f1")]
#[case::plain_source("print(1)", "print(1)")]
fn rewrites_call_shorthand(#[case] source: &str, #[case] expected: &str) {
	assert_eq!(desugar(source), expected);
}

#[rstest]
#[case::bare_name("foo??", "foo")]
#[case::assignment("foo = 3??", "foo")]
#[case::attribute("os.path.join??", "os.path.join")]
#[case::call("len(items)??", "len")]
#[case::surrounding_whitespace("  str.split  ??", "str.split")]
#[case::if_statement("if x: pass??", "x")]
#[case::for_statement("for i in r: pass??", "i")]
#[case::f_string("f\"{x}\"??", "x")]
#[case::walrus("(y := 3)??", "y")]
#[case::after_a_block("for i in r:\n    total += i\n\ntotal??", "i")]
fn prints_docs_for_first_reference(#[case] source: &str, #[case] identifier: &str) {
	assert_eq!(
		desugar(source),
		format!("print({identifier}.__doc__ or \"'{identifier}' has no docstring\")")
	);
}

#[rstest]
#[case::invalid_syntax("foo(??", "invalid syntax")]
#[case::only_literals("3 + 4??", "no identifier names in source")]
#[case::only_marker("??", "no identifier names in source")]
#[case::definition("def f(): pass??", "no identifier names in source")]
#[case::incomplete_exponent("1e??", "invalid syntax")]
#[case::incomplete_hex("0x??", "invalid syntax")]
fn falls_back_to_an_explanation(#[case] source: &str, #[case] reason: &str) {
	assert_eq!(desugar(source), format!("print('Unable to find docs ({reason})')"));
}

#[test]
fn marker_must_end_the_raw_line() {
	assert_eq!(desugar("foo?? "), "foo?? ");
}

#[test]
fn lookup_takes_priority_over_call_shorthand() {
	assert_eq!(
		desugar("x!f??"),
		"print('Unable to find docs (invalid syntax)')"
	);
}

#[test]
fn deep_nesting_falls_back() {
	let source = format!("{}x{}??", "(".repeat(5000), ")".repeat(5000));
	assert_eq!(desugar(&source), "print('Unable to find docs (invalid syntax)')");
	assert!(matches!(
		find_first_identifier(&source[..source.len() - 2]),
		Err(DesugarError::InvalidSyntax(err)) if err.message == "too many nested parentheses"
	));
}

#[test]
fn identifier_errors_distinguish_causes() {
	assert!(matches!(
		find_first_identifier("if x:"),
		Err(DesugarError::InvalidSyntax(_))
	));
	assert_eq!(find_first_identifier("1"), Err(DesugarError::NoIdentifier));
	assert_eq!(find_first_identifier("a.b(c)").as_deref(), Ok("a.b"));
}
