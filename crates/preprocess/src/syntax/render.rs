//! Canonical spacing for source fragments.
//!
//! Tokens are rejoined with one space between them, except inside brackets,
//! before separators, around keyword `=`, after unary operators and splats,
//! and before call and subscript brackets. Strings are copied verbatim.

use tree_sitter::Node;

use super::{is_extra, text};

/// `node` rendered with canonical spacing.
pub(crate) fn render(node: Node<'_>, source: &str) -> String {
	let mut out = String::new();
	let mut prev: Option<Node<'_>> = None;
	for token in tokens(node) {
		if let Some(prev) = prev
			&& spaced(prev, token)
		{
			out.push(' ');
		}
		out.push_str(text(token, source));
		prev = Some(token);
	}
	out
}

/// Leaf tokens under `root`, with each string kept whole.
fn tokens<'t>(root: Node<'t>) -> Vec<Node<'t>> {
	let mut out = Vec::new();
	let mut cursor = root.walk();
	loop {
		let node = cursor.node();
		let atomic = node.child_count() == 0 || node.kind() == "string";
		if atomic {
			if !is_extra(node) && node.start_byte() < node.end_byte() {
				out.push(node);
			}
		} else if cursor.goto_first_child() {
			continue;
		}
		loop {
			if cursor.goto_next_sibling() {
				break;
			}
			if !cursor.goto_parent() {
				return out;
			}
		}
	}
}

fn parent_kind(node: Node<'_>) -> &'static str {
	node.parent().map_or("", |parent| parent.kind())
}

fn spaced(prev: Node<'_>, next: Node<'_>) -> bool {
	let (before, after) = (prev.kind(), next.kind());
	if matches!(after, ")" | "]" | "}") || matches!(before, "(" | "[" | "{" | ".") {
		return false;
	}
	if before == "," {
		return true;
	}
	if matches!(after, "," | ":" | "." | ";") {
		return false;
	}
	match before {
		":" if parent_kind(prev) == "slice" => return false,
		"-" | "+" | "~" if parent_kind(prev) == "unary_operator" => return false,
		"*" | "**" if is_splat(parent_kind(prev)) => return false,
		"=" if is_keyword_binding(parent_kind(prev)) => return false,
		_ => {}
	}
	if after == "=" && is_keyword_binding(parent_kind(next)) {
		return false;
	}
	!(matches!(after, "(" | "[") && opens_trailer(next))
}

fn is_splat(kind: &str) -> bool {
	matches!(
		kind,
		"list_splat" | "dictionary_splat" | "list_splat_pattern" | "dictionary_splat_pattern" | "splat_type"
	)
}

fn is_keyword_binding(kind: &str) -> bool {
	matches!(kind, "keyword_argument" | "default_parameter" | "keyword_pattern")
}

/// Whether `bracket` opens a call, subscript or parameter list.
fn opens_trailer(bracket: Node<'_>) -> bool {
	let Some(parent) = bracket.parent() else {
		return false;
	};
	match parent.kind() {
		"argument_list" | "parameters" | "subscript" | "type_parameter" | "generic_type" => true,
		"generator_expression" => parent_kind(parent) == "call",
		_ => false,
	}
}
