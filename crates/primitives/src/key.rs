//! Key representation for terminal keystrokes.
//!
//! A [`Key`] is what the input layer hands to the coalescer: a key code plus
//! modifiers, not yet classified as part of a paste or a single press.

use std::fmt;

mod modifiers;

pub use modifiers::Modifiers;

/// Key identifiers independent of the terminal backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
	Char(char),
	Enter,
	Tab,
	Backspace,
	Esc,
	Delete,
	Insert,
	Home,
	End,
	PageUp,
	PageDown,
	Up,
	Down,
	Left,
	Right,
	F(u8),
	Null,
}

impl fmt::Display for KeyCode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			KeyCode::Char(' ') => f.write_str("space"),
			KeyCode::Char(c) => write!(f, "{c}"),
			KeyCode::Enter => f.write_str("enter"),
			KeyCode::Tab => f.write_str("tab"),
			KeyCode::Backspace => f.write_str("backspace"),
			KeyCode::Esc => f.write_str("esc"),
			KeyCode::Delete => f.write_str("del"),
			KeyCode::Insert => f.write_str("insert"),
			KeyCode::Home => f.write_str("home"),
			KeyCode::End => f.write_str("end"),
			KeyCode::PageUp => f.write_str("pageup"),
			KeyCode::PageDown => f.write_str("pagedown"),
			KeyCode::Up => f.write_str("up"),
			KeyCode::Down => f.write_str("down"),
			KeyCode::Left => f.write_str("left"),
			KeyCode::Right => f.write_str("right"),
			KeyCode::F(n) => write!(f, "f{n}"),
			KeyCode::Null => f.write_str("null"),
		}
	}
}

/// A key with optional modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Key {
	pub code: KeyCode,
	pub modifiers: Modifiers,
}

impl Key {
	/// Create a key from a character with no modifiers.
	pub const fn char(c: char) -> Self {
		Self {
			code: KeyCode::Char(c),
			modifiers: Modifiers::NONE,
		}
	}

	/// Create a key from a key code with no modifiers.
	pub const fn new(code: KeyCode) -> Self {
		Self {
			code,
			modifiers: Modifiers::NONE,
		}
	}

	/// Create a key with Ctrl modifier.
	pub const fn ctrl(c: char) -> Self {
		Self {
			code: KeyCode::Char(c),
			modifiers: Modifiers::CTRL,
		}
	}

	/// Create a key with Alt modifier.
	pub const fn alt(c: char) -> Self {
		Self {
			code: KeyCode::Char(c),
			modifiers: Modifiers::ALT,
		}
	}

	/// Check if this is a specific Ctrl chord, e.g. `C-c`.
	pub fn is_ctrl(&self, c: char) -> bool {
		self.modifiers.ctrl && !self.modifiers.alt && self.is_char(c)
	}

	/// Check if this is a specific character (ignoring modifiers).
	pub fn is_char(&self, c: char) -> bool {
		matches!(self.code, KeyCode::Char(ch) if ch == c)
	}

	/// Check if this key is enter.
	pub fn is_enter(&self) -> bool {
		matches!(self.code, KeyCode::Enter) && self.modifiers.is_empty()
	}

	/// Check if this key is backspace.
	pub fn is_backspace(&self) -> bool {
		matches!(self.code, KeyCode::Backspace) && self.modifiers.is_empty()
	}

	/// Text this key inserts into a line buffer, if any.
	///
	/// Enter and Tab count as text so that a replayed paste reproduces the
	/// original source.
	pub fn text(&self) -> Option<char> {
		if self.modifiers.is_chord() {
			return None;
		}
		match self.code {
			KeyCode::Char(c) => Some(c),
			KeyCode::Enter => Some('\n'),
			KeyCode::Tab => Some('\t'),
			_ => None,
		}
	}
}

impl From<char> for Key {
	fn from(c: char) -> Self {
		match c {
			'\n' | '\r' => Key::new(KeyCode::Enter),
			'\t' => Key::new(KeyCode::Tab),
			c => Key::char(c),
		}
	}
}

impl fmt::Display for Key {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if self.modifiers.ctrl {
			write!(f, "C-")?;
		}
		if self.modifiers.alt {
			write!(f, "A-")?;
		}
		if self.modifiers.shift {
			write!(f, "S-")?;
		}
		write!(f, "{}", self.code)
	}
}

#[cfg(feature = "terminal-input")]
impl From<crossterm::event::KeyEvent> for Key {
	fn from(event: crossterm::event::KeyEvent) -> Self {
		use crossterm::event::{KeyCode as CtKeyCode, KeyModifiers};

		let mut modifiers = Modifiers {
			ctrl: event.modifiers.contains(KeyModifiers::CONTROL),
			alt: event.modifiers.contains(KeyModifiers::ALT),
			shift: event.modifiers.contains(KeyModifiers::SHIFT),
		};

		let code = match event.code {
			CtKeyCode::Char(c) => {
				// Uppercase letters already carry the shift.
				if c.is_alphabetic() {
					modifiers.shift = false;
				}
				KeyCode::Char(c)
			}
			CtKeyCode::Esc => KeyCode::Esc,
			CtKeyCode::Enter => KeyCode::Enter,
			CtKeyCode::Tab => KeyCode::Tab,
			CtKeyCode::BackTab => {
				modifiers.shift = true;
				KeyCode::Tab
			}
			CtKeyCode::Backspace => KeyCode::Backspace,
			CtKeyCode::Delete => KeyCode::Delete,
			CtKeyCode::Insert => KeyCode::Insert,
			CtKeyCode::Home => KeyCode::Home,
			CtKeyCode::End => KeyCode::End,
			CtKeyCode::PageUp => KeyCode::PageUp,
			CtKeyCode::PageDown => KeyCode::PageDown,
			CtKeyCode::Up => KeyCode::Up,
			CtKeyCode::Down => KeyCode::Down,
			CtKeyCode::Left => KeyCode::Left,
			CtKeyCode::Right => KeyCode::Right,
			CtKeyCode::F(n) => KeyCode::F(n),
			_ => KeyCode::Null,
		};

		Self { code, modifiers }
	}
}

#[cfg(test)]
mod tests;
