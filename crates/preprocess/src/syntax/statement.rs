//! Statement summaries: the shape of each top-level statement, with
//! expressions rendered back to canonical source.

use tree_sitter::Node;

use super::render::render;
use super::{fields, named_children, text};

/// What one top-level statement does, as far as the prompt cares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
	Expression(Expression),
	/// `a = b = value`, or an annotated assignment with a value.
	Assign { targets: Vec<Target>, value: String },
	/// `target op= value`, with `op` lacking its `=`.
	AugAssign { target: Target, op: String, value: String },
	Delete(Vec<Target>),
	Import(Vec<Alias>),
	ImportFrom { module: String, names: Vec<Alias> },
	Raise(Option<Expression>),
	Function(String),
	Class(String),
	Other,
}

/// An expression with its canonical source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expression {
	pub source: String,
	pub shape: Shape,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shape {
	Name(String),
	/// A call of a plain name, arguments rendered in source order.
	Call { callee: String, args: Vec<String> },
	Other,
}

/// An assignment or deletion target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
	Name(String),
	Sequence(Vec<Target>),
	Other(String),
}

/// One name of an import, with its `as` rebinding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alias {
	pub name: String,
	pub asname: Option<String>,
}

pub(super) fn summarize(node: Node<'_>, source: &str) -> Statement {
	match node.kind() {
		"expression_statement" => match named_children(node).as_slice() {
			[part] if part.kind() == "assignment" => assignment(*part, source),
			[part] if part.kind() == "augmented_assignment" => augmented(*part, source),
			[part] => Statement::Expression(expression(*part, source)),
			_ => Statement::Expression(Expression {
				source: render(node, source),
				shape: Shape::Other,
			}),
		},
		"delete_statement" => {
			let targets = named_children(node)
				.into_iter()
				.flat_map(|child| match child.kind() {
					"expression_list" => named_children(child),
					_ => vec![child],
				})
				.map(|child| target(child, source))
				.collect();
			Statement::Delete(targets)
		}
		"import_statement" => Statement::Import(
			fields(node)
				.into_iter()
				.filter(|(field, _)| *field == Some("name"))
				.map(|(_, child)| alias(child, source))
				.collect(),
		),
		"import_from_statement" => {
			let module = node
				.child_by_field_name("module_name")
				.map(|module| render(module, source))
				.unwrap_or_default();
			let names = fields(node)
				.into_iter()
				.filter_map(|(field, child)| match (field, child.kind()) {
					(Some("name"), _) => Some(alias(child, source)),
					(_, "wildcard_import") => Some(Alias {
						name: "*".to_string(),
						asname: None,
					}),
					_ => None,
				})
				.collect();
			Statement::ImportFrom { module, names }
		}
		"raise_statement" => {
			let exception = fields(node)
				.into_iter()
				.find(|(field, child)| *field != Some("cause") && child.is_named() && !super::is_extra(*child))
				.map(|(_, child)| expression(child, source));
			Statement::Raise(exception)
		}
		"function_definition" => Statement::Function(name(node, source)),
		"class_definition" => Statement::Class(name(node, source)),
		"decorated_definition" => match node.child_by_field_name("definition") {
			Some(def) => summarize(def, source),
			None => Statement::Other,
		},
		_ => Statement::Other,
	}
}

fn name(def: Node<'_>, source: &str) -> String {
	def.child_by_field_name("name")
		.map(|name| text(name, source).to_string())
		.unwrap_or_default()
}

fn expression(node: Node<'_>, source: &str) -> Expression {
	let shape = match node.kind() {
		"identifier" => Shape::Name(text(node, source).to_string()),
		"call" => call_shape(node, source).unwrap_or(Shape::Other),
		_ => Shape::Other,
	};
	Expression {
		source: render(node, source),
		shape,
	}
}

fn call_shape(node: Node<'_>, source: &str) -> Option<Shape> {
	let callee = node.child_by_field_name("function").filter(|f| f.kind() == "identifier")?;
	let arguments = node
		.child_by_field_name("arguments")
		.filter(|args| args.kind() == "argument_list")?;
	Some(Shape::Call {
		callee: text(callee, source).to_string(),
		args: named_children(arguments)
			.into_iter()
			.map(|arg| render(arg, source))
			.collect(),
	})
}

/// `a = b = value`: the chain nests to the right.
fn assignment(node: Node<'_>, source: &str) -> Statement {
	let mut targets = Vec::new();
	let mut current = node;
	loop {
		targets.extend(current.child_by_field_name("left").map(|left| target(left, source)));
		match current.child_by_field_name("right") {
			Some(right) if right.kind() == "assignment" => current = right,
			Some(right) => {
				return Statement::Assign {
					targets,
					value: render(right, source),
				};
			}
			// A bare annotation binds nothing.
			None => return Statement::Other,
		}
	}
}

fn augmented(node: Node<'_>, source: &str) -> Statement {
	let (Some(left), Some(op), Some(right)) = (
		node.child_by_field_name("left"),
		node.child_by_field_name("operator"),
		node.child_by_field_name("right"),
	) else {
		return Statement::Other;
	};
	let op = text(op, source);
	Statement::AugAssign {
		target: target(left, source),
		op: op.strip_suffix('=').unwrap_or(op).to_string(),
		value: render(right, source),
	}
}

fn target(node: Node<'_>, source: &str) -> Target {
	match node.kind() {
		"identifier" => Target::Name(text(node, source).to_string()),
		"pattern_list" | "tuple_pattern" | "list_pattern" | "tuple" | "list" | "expression_list" => {
			Target::Sequence(named_children(node).into_iter().map(|item| target(item, source)).collect())
		}
		"parenthesized_expression" => match named_children(node).as_slice() {
			[inner] => target(*inner, source),
			_ => Target::Other(render(node, source)),
		},
		_ => Target::Other(render(node, source)),
	}
}

fn alias(node: Node<'_>, source: &str) -> Alias {
	if node.kind() == "aliased_import" {
		return Alias {
			name: node
				.child_by_field_name("name")
				.map(|name| render(name, source))
				.unwrap_or_default(),
			asname: node.child_by_field_name("alias").map(|alias| text(alias, source).to_string()),
		};
	}
	Alias {
		name: render(node, source),
		asname: None,
	}
}
