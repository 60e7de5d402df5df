//! Session termination.
//!
//! A [`Termination`] is what dispatch returns when the session must end. The
//! driver paints one last frame and then hands it to the caller, which turns
//! the [`ExitValue`] into a process exit status.

use std::fmt;

/// Who asked for the session to end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Initiator {
	/// The user quit the shell (Ctrl-D, closed input, hangup).
	User,
	/// Code executed in the session requested exit.
	Code,
}

/// Payload carried by a termination.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ExitValue {
	/// No payload; a successful exit.
	#[default]
	Empty,
	/// An explicit status code.
	Code(i32),
	/// A non-numeric payload, reported on stderr.
	Message(String),
}

impl ExitValue {
	/// Process exit status for this payload.
	pub fn status(&self) -> i32 {
		match self {
			ExitValue::Empty => 0,
			ExitValue::Code(code) => *code,
			ExitValue::Message(_) => 1,
		}
	}

	/// Message to print before exiting, if any.
	pub fn message(&self) -> Option<&str> {
		match self {
			ExitValue::Message(msg) => Some(msg),
			_ => None,
		}
	}

	/// Parses the argument text of an `exit(...)` call.
	///
	/// An empty argument or `None` is a clean exit, an integer literal is a
	/// status code, anything else becomes a message with quotes removed.
	pub fn from_argument(arg: &str) -> Self {
		let arg = arg.trim();
		if arg.is_empty() || arg == "None" {
			return ExitValue::Empty;
		}
		if let Ok(code) = arg.parse::<i32>() {
			return ExitValue::Code(code);
		}
		let unquoted = arg
			.strip_prefix('"')
			.and_then(|s| s.strip_suffix('"'))
			.or_else(|| arg.strip_prefix('\'').and_then(|s| s.strip_suffix('\'')))
			.unwrap_or(arg);
		ExitValue::Message(unquoted.to_string())
	}
}

impl fmt::Display for ExitValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ExitValue::Empty => f.write_str("()"),
			ExitValue::Code(code) => write!(f, "{code}"),
			ExitValue::Message(msg) => f.write_str(msg),
		}
	}
}

/// A request to end the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Termination {
	pub value: ExitValue,
	pub initiator: Initiator,
}

impl Termination {
	/// The user quit with no payload.
	pub fn user_quit() -> Self {
		Self {
			value: ExitValue::Empty,
			initiator: Initiator::User,
		}
	}

	/// Executed code exited with `value`.
	pub fn from_code(value: ExitValue) -> Self {
		Self {
			value,
			initiator: Initiator::Code,
		}
	}

	/// True when the user, not executed code, ended the session.
	pub fn is_user_quit(&self) -> bool {
		self.initiator == Initiator::User
	}
}
