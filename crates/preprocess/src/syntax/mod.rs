//! # Syntax
//!
//! Python source parsed with tree-sitter, and the two views the prompt takes
//! of it: the first name a `??` lookup refers to, and a [`Statement`]
//! summary of each top-level statement.
//!
//! Every walk over the tree is iterative, and bracket nesting is capped at
//! [`MAX_NESTING`], so pathological input fails with a [`SyntaxError`]
//! instead of exhausting the stack.

mod reference;
mod render;
mod statement;


use std::fmt;

use tree_sitter::{Language, Node, Parser, Tree};

pub use statement::{Alias, Expression, Shape, Statement, Target};

/// Deepest bracket nesting accepted before parsing gives up.
pub const MAX_NESTING: usize = 200;

/// A parse failure with the byte offset where it was detected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message} at position {position}")]
pub struct SyntaxError {
	pub message: String,
	pub position: usize,
}

impl SyntaxError {
	fn new(message: impl Into<String>, position: usize) -> Self {
		Self {
			message: message.into(),
			position,
		}
	}
}

/// A successfully parsed source text.
pub struct Module {
	source: String,
	tree: Tree,
}

impl fmt::Debug for Module {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Module")
			.field("source", &self.source)
			.finish_non_exhaustive()
	}
}

impl Module {
	/// First name or attribute reference in a pre-order walk, rendered with
	/// canonical spacing.
	///
	/// Attribute chains are returned whole: in `os.path.join(a)` the
	/// reference is `os.path.join`, not `os`.
	pub fn first_reference(&self) -> Option<String> {
		reference::first(self.tree.root_node()).map(|node| render::render(node, &self.source))
	}

	/// Summaries of the top-level statements, in order.
	pub fn statements(&self) -> Vec<Statement> {
		named_children(self.tree.root_node())
			.into_iter()
			.map(|node| statement::summarize(node, &self.source))
			.collect()
	}
}

/// Parses a complete module.
///
/// # Errors
///
/// Returns a [`SyntaxError`] when the source does not parse, nests brackets
/// deeper than [`MAX_NESTING`], or starts with an indented line.
pub fn parse(source: &str) -> Result<Module, SyntaxError> {
	if let Some(position) = leading_indent(source) {
		return Err(SyntaxError::new("unexpected indent", position));
	}

	let mut parser = Parser::new();
	parser
		.set_language(&Language::new(tree_sitter_python::LANGUAGE))
		.map_err(|err| SyntaxError::new(format!("python grammar unavailable: {err}"), 0))?;
	let tree = parser
		.parse(source, None)
		.ok_or_else(|| SyntaxError::new("parse cancelled", 0))?;

	validate(tree.root_node())?;
	tracing::trace!(len = source.len(), "parsed module");
	Ok(Module {
		source: source.to_string(),
		tree,
	})
}

/// Offset of the first code line if it is indented.
fn leading_indent(source: &str) -> Option<usize> {
	let mut offset = 0;
	for line in source.split_inclusive('\n') {
		let code = line.trim_start();
		if !code.is_empty() && !code.starts_with('#') {
			return (code.len() != line.len()).then_some(offset);
		}
		offset += line.len();
	}
	None
}

/// Rejects trees with error nodes, Python 2 statements, or brackets nested
/// past [`MAX_NESTING`].
fn validate(root: Node<'_>) -> Result<(), SyntaxError> {
	let mut depth = 0usize;
	let mut error = None;
	for node in descendants(root) {
		if error.is_none()
			&& (node.is_error() || node.is_missing() || matches!(node.kind(), "print_statement" | "exec_statement"))
		{
			error = Some(node.start_byte());
		}
		if node.child_count() > 0 || node.is_named() || node.is_missing() {
			continue;
		}
		match node.kind() {
			"(" | "[" | "{" => {
				depth += 1;
				if depth >= MAX_NESTING {
					return Err(SyntaxError::new("too many nested parentheses", node.start_byte()));
				}
			}
			")" | "]" | "}" => depth = depth.saturating_sub(1),
			_ => {}
		}
	}
	match error {
		Some(position) => Err(SyntaxError::new("invalid syntax", position)),
		None => Ok(()),
	}
}

/// Every node under `root`, `root` included, in document order.
fn descendants<'t>(root: Node<'t>) -> impl Iterator<Item = Node<'t>> {
	let mut cursor = root.walk();
	let mut done = false;
	std::iter::from_fn(move || {
		if done {
			return None;
		}
		let node = cursor.node();
		if !cursor.goto_first_child() {
			loop {
				if cursor.goto_next_sibling() {
					break;
				}
				if !cursor.goto_parent() {
					done = true;
					break;
				}
			}
		}
		Some(node)
	})
}

/// Direct children of `node` with the field each one fills.
fn fields<'t>(node: Node<'t>) -> Vec<(Option<&'static str>, Node<'t>)> {
	let mut cursor = node.walk();
	let mut out = Vec::new();
	if cursor.goto_first_child() {
		loop {
			out.push((cursor.field_name(), cursor.node()));
			if !cursor.goto_next_sibling() {
				break;
			}
		}
	}
	out
}

/// Named children of `node`, comments excluded.
fn named_children(node: Node<'_>) -> Vec<Node<'_>> {
	fields(node)
		.into_iter()
		.map(|(_, child)| child)
		.filter(|child| child.is_named() && !is_extra(*child))
		.collect()
}

fn is_extra(node: Node<'_>) -> bool {
	matches!(node.kind(), "comment" | "line_continuation")
}

/// Source text spanned by `node`.
fn text<'s>(node: Node<'_>, source: &'s str) -> &'s str {
	source.get(node.byte_range()).unwrap_or_default()
}
