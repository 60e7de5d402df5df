//! Indentation repair for multi-line blocks.
//!
//! A blank line inside an indented block would end the block early when the
//! source is compiled line by line. Each empty line borrows the shorter
//! leading-whitespace prefix of its neighbours so the block stays open.

use std::sync::LazyLock;

use regex::Regex;

static LEADING_TABS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\t+").unwrap());
static LEADING_WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*").unwrap());

/// Spaces substituted for each leading tab.
pub const TAB_WIDTH: usize = 4;

/// Replaces the run of tabs opening each line with [`TAB_WIDTH`] spaces per tab.
pub fn expand_leading_tabs(source: &str) -> String {
	source
		.split('\n')
		.map(|line| LEADING_TABS.replace(line, |caps: &regex::Captures<'_>| " ".repeat(caps[0].len() * TAB_WIDTH)))
		.collect::<Vec<_>>()
		.join("\n")
}

fn leading_whitespace(line: &str) -> &str {
	LEADING_WHITESPACE.find(line).map_or("", |m| m.as_str())
}

/// Gives every empty line the shorter indentation of the lines around it.
///
/// Neighbours are always the original lines, so a run of blank lines takes
/// the indentation of the non-blank lines at its edges only where they touch.
/// A trailing newline is preserved.
pub fn indent_empty_lines(source: &str) -> String {
	if source.is_empty() {
		return String::new();
	}

	let (body, trailing_newline) = match source.strip_suffix('\n') {
		Some(body) => (body, true),
		None => (source, false),
	};
	let lines: Vec<&str> = body.split('\n').collect();

	let mut out = String::with_capacity(source.len());
	for (i, line) in lines.iter().enumerate() {
		if i > 0 {
			out.push('\n');
		}
		if line.is_empty() {
			let prev = i.checked_sub(1).map_or("", |p| leading_whitespace(lines[p]));
			let next = lines.get(i + 1).map_or("", |n| leading_whitespace(n));
			// Ties keep the preceding line's prefix.
			out.push_str(if next.chars().count() < prev.chars().count() { next } else { prev });
		} else {
			out.push_str(line);
		}
	}
	if trailing_newline {
		out.push('\n');
	}
	out
}

/// Tab expansion followed by blank-line indentation.
pub fn repair(source: &str) -> String {
	indent_empty_lines(&expand_leading_tabs(source))
}

#[cfg(test)]
mod tests;
