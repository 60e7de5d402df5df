//! Prompt shorthand rewritten into ordinary statements.
//!
//! * `expr??` prints the documentation of the first name in `expr`.
//! * `arg!func` calls `func(arg)`.

use thiserror::Error;

use crate::syntax;

/// Why a `??` lookup could not name anything.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DesugarError {
	#[error("invalid syntax")]
	InvalidSyntax(#[source] syntax::SyntaxError),
	#[error("no identifier names in source")]
	NoIdentifier,
}

/// Renders the first name or attribute reference in `source`.
///
/// # Errors
///
/// [`DesugarError::InvalidSyntax`] when `source` does not parse,
/// [`DesugarError::NoIdentifier`] when it contains no reference.
pub fn find_first_identifier(source: &str) -> Result<String, DesugarError> {
	syntax::parse(source)
		.map_err(DesugarError::InvalidSyntax)?
		.first_reference()
		.ok_or(DesugarError::NoIdentifier)
}

/// Rewrites shorthand forms; anything else is returned unchanged.
pub fn desugar(source: &str) -> String {
	if source.ends_with("??") {
		let body = source.trim();
		let body = body.strip_suffix("??").unwrap_or(body);
		return match find_first_identifier(body) {
			Ok(identifier) => {
				tracing::debug!(%identifier, "desugared documentation lookup");
				format!("print({identifier}.__doc__ or \"'{identifier}' has no docstring\")")
			}
			Err(err) => {
				tracing::debug!(error = %err, "documentation lookup fell back");
				format!("print('Unable to find docs ({err})')")
			}
		};
	}

	if source.trim_matches(|c: char| c.is_ascii_alphabetic()).ends_with('!')
		&& let Some((left, right)) = source.rsplit_once('!')
	{
		return format!("{right}({left})");
	}

	source.to_string()
}

#[cfg(test)]
mod tests;
