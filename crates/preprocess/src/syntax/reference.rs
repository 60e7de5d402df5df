//! Pre-order search for the first name or attribute reference.
//!
//! Children are visited in the order the Python AST lists them, which is not
//! always source order: a conditional expression visits its test first, a
//! dictionary visits all keys before any value, and a call visits positional
//! arguments before keyword ones. Names that are bound rather than read
//! (function and class names, parameters, import aliases, `global`
//! declarations, capture patterns) are not references.

use tree_sitter::Node;

use super::{fields, is_extra, named_children};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
	Expression,
	/// Inside a `case` pattern, where bare names capture.
	Pattern,
}

enum Step<'t> {
	Found(Node<'t>),
	Visit(Vec<(Node<'t>, Mode)>),
}

/// First reference under `root`.
pub(super) fn first(root: Node<'_>) -> Option<Node<'_>> {
	let mut stack = vec![(root, Mode::Expression)];
	while let Some((node, mode)) = stack.pop() {
		let step = match mode {
			Mode::Expression => expression(node),
			Mode::Pattern => pattern(node),
		};
		match step {
			Step::Found(found) => return Some(found),
			Step::Visit(children) => stack.extend(children.into_iter().rev()),
		}
	}
	None
}

fn expression(node: Node<'_>) -> Step<'_> {
	let children = match node.kind() {
		"identifier" | "attribute" | "member_type" => return Step::Found(node),
		"import_statement"
		| "import_from_statement"
		| "future_import_statement"
		| "global_statement"
		| "nonlocal_statement"
		| "dotted_name" => Vec::new(),
		"function_definition" => function_parts(node, Vec::new()),
		"class_definition" => class_parts(node, Vec::new()),
		"decorated_definition" => {
			let decorators = named_children(node)
				.into_iter()
				.filter(|child| child.kind() == "decorator")
				.collect();
			match node.child_by_field_name("definition") {
				Some(def) if def.kind() == "class_definition" => class_parts(def, decorators),
				Some(def) => function_parts(def, decorators),
				None => decorators,
			}
		}
		"lambda" => {
			let mut parts = node.child_by_field_name("parameters").map(parameter_parts).unwrap_or_default();
			parts.extend(node.child_by_field_name("body"));
			parts
		}
		"keyword_argument" => node.child_by_field_name("value").into_iter().collect(),
		"argument_list" => {
			let (keywords, positional): (Vec<_>, Vec<_>) = named_children(node)
				.into_iter()
				.partition(|child| matches!(child.kind(), "keyword_argument" | "dictionary_splat"));
			positional.into_iter().chain(keywords).collect()
		}
		"conditional_expression" => match named_children(node).as_slice() {
			[body, test, orelse] => vec![*test, *body, *orelse],
			other => other.to_vec(),
		},
		"dictionary" => {
			let mut keys = Vec::new();
			let mut values = Vec::new();
			for child in named_children(node) {
				if child.kind() == "pair" {
					keys.extend(child.child_by_field_name("key"));
					values.extend(child.child_by_field_name("value"));
				} else {
					values.push(child);
				}
			}
			keys.extend(values);
			keys
		}
		"except_clause" | "except_group_clause" => except_parts(node),
		"case_clause" => {
			return Step::Visit(
				named_children(node)
					.into_iter()
					.map(|child| {
						let mode = if child.kind() == "case_pattern" {
							Mode::Pattern
						} else {
							Mode::Expression
						};
						(child, mode)
					})
					.collect(),
			);
		}
		_ => named_children(node),
	};
	Step::Visit(children.into_iter().map(|child| (child, Mode::Expression)).collect())
}

fn pattern(node: Node<'_>) -> Step<'_> {
	let children = match node.kind() {
		// A dotted value pattern reads a name; a bare one captures.
		"dotted_name" if named_children(node).len() > 1 => return Step::Found(node),
		"dotted_name" | "identifier" | "splat_pattern" => Vec::new(),
		"class_pattern" => match named_children(node).first() {
			Some(class) => return Step::Found(*class),
			None => Vec::new(),
		},
		"keyword_pattern" => named_children(node).into_iter().skip(1).collect(),
		"as_pattern" => fields(node)
			.into_iter()
			.filter(|(field, child)| *field != Some("alias") && child.is_named())
			.map(|(_, child)| child)
			.collect(),
		"dict_pattern" => {
			let parts = fields(node);
			let keys = parts.iter().filter(|(field, _)| *field == Some("key"));
			let values = parts.iter().filter(|(field, _)| *field != Some("key") && field.is_some());
			keys.chain(values).map(|(_, child)| *child).collect()
		}
		_ => named_children(node),
	};
	Step::Visit(children.into_iter().map(|child| (child, Mode::Pattern)).collect())
}

/// Parameters, body, decorators, then the return annotation.
fn function_parts<'t>(def: Node<'t>, decorators: Vec<Node<'t>>) -> Vec<Node<'t>> {
	let mut parts = def.child_by_field_name("parameters").map(parameter_parts).unwrap_or_default();
	parts.extend(def.child_by_field_name("body"));
	parts.extend(decorators);
	parts.extend(def.child_by_field_name("return_type"));
	parts
}

/// Bases and keywords, body, then decorators.
fn class_parts<'t>(def: Node<'t>, decorators: Vec<Node<'t>>) -> Vec<Node<'t>> {
	let mut parts: Vec<_> = def.child_by_field_name("superclasses").into_iter().collect();
	parts.extend(def.child_by_field_name("body"));
	parts.extend(decorators);
	parts
}

/// Annotations, keyword-only defaults, the `**` annotation, then positional
/// defaults. Parameter names themselves are bindings.
fn parameter_parts(params: Node<'_>) -> Vec<Node<'_>> {
	let mut annotations = Vec::new();
	let mut kw_defaults = Vec::new();
	let mut kwarg = None;
	let mut defaults = Vec::new();
	let mut keyword_only = false;
	for param in named_children(params) {
		match param.kind() {
			"keyword_separator" | "list_splat_pattern" => keyword_only = true,
			"typed_parameter" => {
				let annotation = param.child_by_field_name("type");
				match named_children(param).first().map(|name| name.kind()) {
					Some("dictionary_splat_pattern") => kwarg = annotation,
					Some("list_splat_pattern") => {
						annotations.extend(annotation);
						keyword_only = true;
					}
					_ => annotations.extend(annotation),
				}
			}
			"default_parameter" | "typed_default_parameter" => {
				annotations.extend(param.child_by_field_name("type"));
				let value = param.child_by_field_name("value");
				if keyword_only {
					kw_defaults.extend(value);
				} else {
					defaults.extend(value);
				}
			}
			_ => {}
		}
	}
	annotations.extend(kw_defaults);
	annotations.extend(kwarg);
	annotations.extend(defaults);
	annotations
}

/// The caught type and the handler body; the `as` name is a binding.
fn except_parts(node: Node<'_>) -> Vec<Node<'_>> {
	let mut parts = Vec::new();
	let mut binding = false;
	for (_, child) in fields(node) {
		match child.kind() {
			"as" => binding = true,
			"as_pattern" => parts.extend(
				fields(child)
					.into_iter()
					.filter(|(field, part)| *field != Some("alias") && part.is_named())
					.map(|(_, part)| part),
			),
			_ if !child.is_named() || is_extra(child) => {}
			_ if binding => binding = false,
			_ => parts.push(child),
		}
	}
	parts
}
