//! Source preparation between "the user pressed enter" and "the code reaches
//! the compiler".
//!
//! [`Preprocessor::prepare`] first desugars prompt shorthand on the raw
//! entry, then repairs the indentation of the (possibly multi-line) result.

pub mod desugar;
pub mod indent;
pub mod syntax;

pub use desugar::{DesugarError, desugar, find_first_identifier};
pub use indent::{expand_leading_tabs, indent_empty_lines, repair};
pub use syntax::SyntaxError;

/// Which preprocessing stages run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreprocessConfig {
	/// Give blank lines the indentation of their neighbours.
	pub indent_blank_lines: bool,
	/// Turn leading tabs into spaces.
	pub expand_tabs: bool,
	/// Rewrite `??` and `!` shorthand.
	pub desugar: bool,
}

impl Default for PreprocessConfig {
	fn default() -> Self {
		Self {
			indent_blank_lines: true,
			expand_tabs: true,
			desugar: true,
		}
	}
}

/// The configured preprocessing pipeline.
#[derive(Debug, Clone, Default)]
pub struct Preprocessor {
	config: PreprocessConfig,
}

impl Preprocessor {
	pub fn new(config: PreprocessConfig) -> Self {
		Self { config }
	}

	pub fn config(&self) -> PreprocessConfig {
		self.config
	}

	/// Normalizes `source` for compilation.
	pub fn prepare(&self, source: &str) -> String {
		let mut text = if self.config.desugar {
			desugar(source)
		} else {
			source.to_string()
		};
		if self.config.expand_tabs {
			text = expand_leading_tabs(&text);
		}
		if self.config.indent_blank_lines {
			text = indent_empty_lines(&text);
		}
		if text != source {
			tracing::trace!(before = source, after = %text, "preprocessed source");
		}
		text
	}
}
