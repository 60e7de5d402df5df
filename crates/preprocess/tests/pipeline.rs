use pretty_assertions::assert_eq;
use tidal_preprocess::{PreprocessConfig, Preprocessor};

#[test]
fn desugars_then_repairs() {
	let pre = Preprocessor::default();
	assert_eq!(pre.prepare("x!f"), "f(x)");
	assert_eq!(
		pre.prepare("def f():\n\treturn 1\n\n\treturn 2\n"),
		"def f():\n    return 1\n    \n    return 2\n"
	);
}

#[test]
fn documentation_lookup_survives_the_pipeline() {
	let pre = Preprocessor::default();
	assert_eq!(
		pre.prepare("len??"),
		"print(len.__doc__ or \"'len' has no docstring\")"
	);
}

#[test]
fn stages_can_be_disabled() {
	let pre = Preprocessor::new(PreprocessConfig {
		indent_blank_lines: false,
		expand_tabs: false,
		desugar: false,
	});
	let source = "x!f\n\n\tpass";
	assert_eq!(pre.prepare(source), source);
}

#[test]
fn tabs_only() {
	let pre = Preprocessor::new(PreprocessConfig {
		indent_blank_lines: false,
		..PreprocessConfig::default()
	});
	assert_eq!(pre.prepare("\ta\n\n\tb"), "    a\n\n    b");
}
