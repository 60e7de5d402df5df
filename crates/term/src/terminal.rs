//! Inline terminal rendering and job control.
//!
//! Frames are drawn in place below the shell prompt rather than on the
//! alternate screen. The frame's first row is tracked as `top`, which goes
//! negative once history scrolls off; rows above the screen are never
//! redrawn. Whenever drawing runs past the bottom row the terminal scrolls
//! and the count is reported back to the driver.

use std::io::{self, Stdout, Write};
use std::sync::Arc;

use crossterm::cursor::{self, MoveTo};
use crossterm::event::{DisableBracketedPaste, EnableBracketedPaste};
use crossterm::terminal::{self, Clear, ClearType};
use crossterm::{execute, queue};
use parking_lot::Mutex;
use tidal_session::{Cursor, JobControl, Renderer};
use unicode_width::UnicodeWidthChar;

use crate::reader::PauseSwitch;

#[derive(Debug, Clone, Copy)]
enum Mode {
	/// A real tty: raw mode, live size queries, SIGTSTP on suspend.
	Live,
	/// Fixed geometry over an arbitrary writer.
	Fixed { rows: u16, cols: u16 },
}

/// Renderer drawing frames inline on a terminal.
pub struct InlineTerminal<W: Write> {
	out: W,
	mode: Mode,
	top: i64,
	/// Terminal row holding the last drawn frame row.
	bottom: u16,
	input: Option<PauseSwitch>,
	entered: bool,
}

impl InlineTerminal<Stdout> {
	/// Takes over stdout: raw mode, bracketed paste, frame anchored at the cursor.
	pub fn enter() -> io::Result<Self> {
		let mut term = Self {
			out: io::stdout(),
			mode: Mode::Live,
			top: 0,
			bottom: 0,
			input: None,
			entered: false,
		};
		terminal::enable_raw_mode()?;
		execute!(term.out, EnableBracketedPaste)?;
		term.entered = true;
		term.anchor()?;
		Ok(term)
	}
}

impl<W: Write> InlineTerminal<W> {
	pub fn with_size(out: W, rows: u16, cols: u16) -> Self {
		Self {
			out,
			mode: Mode::Fixed {
				rows: rows.max(1),
				cols: cols.max(1),
			},
			top: 0,
			bottom: 0,
			input: None,
			entered: false,
		}
	}

	/// Reader paused while the terminal is released.
	pub fn attach_input(&mut self, input: PauseSwitch) {
		self.input = Some(input);
	}

	#[cfg(test)]
	pub fn output(&self) -> &W {
		&self.out
	}

	/// Terminal row of the frame's first line; negative once scrolled off.
	#[cfg(test)]
	pub fn top(&self) -> i64 {
		self.top
	}

	/// Leaves the cursor on a fresh line below the frame and restores the tty.
	pub fn leave(&mut self) -> io::Result<()> {
		if !self.entered {
			return Ok(());
		}
		self.entered = false;
		self.release_window()?;
		if matches!(self.mode, Mode::Live) {
			terminal::disable_raw_mode()?;
		}
		Ok(())
	}

	/// Starts the next frame at the cursor's current row.
	fn anchor(&mut self) -> io::Result<()> {
		let row = match self.mode {
			Mode::Live => cursor::position()?.1,
			Mode::Fixed { rows, .. } => (self.bottom + 1).min(rows - 1),
		};
		self.top = i64::from(row);
		self.bottom = row;
		Ok(())
	}
}

impl<W: Write> Renderer for InlineTerminal<W> {
	fn render(&mut self, lines: &[String], cursor: Cursor) -> io::Result<u16> {
		let (rows, cols) = self.dimensions()?;
		let wrapped: Vec<Vec<String>> = lines.iter().map(|line| wrap(line, cols)).collect();

		let first_visible = usize::try_from(-self.top).unwrap_or(0);
		let start_row = u16::try_from(self.top.max(0)).unwrap_or(u16::MAX);
		queue!(self.out, MoveTo(0, start_row), Clear(ClearType::FromCursorDown))?;

		let mut written: i64 = 0;
		for row in wrapped.iter().flatten().skip(first_visible) {
			if written > 0 {
				self.out.write_all(b"\r\n")?;
			}
			self.out.write_all(row.as_bytes())?;
			written += 1;
		}

		let overflow = (i64::from(start_row) + written - i64::from(rows)).max(0);
		self.top -= overflow;
		let last_row = i64::from(start_row) + written.max(1) - 1 - overflow;
		self.bottom = clamp_row(last_row, rows);

		let cursor_line = cursor.row.min(wrapped.len());
		let rows_above: usize = wrapped[..cursor_line].iter().map(Vec::len).sum();
		let width = usize::from(cols);
		let cursor_row = self.top + i64::try_from(rows_above + cursor.col / width).unwrap_or(i64::MAX);
		let cursor_col = u16::try_from(cursor.col % width).unwrap_or(0);
		queue!(self.out, MoveTo(cursor_col, clamp_row(cursor_row, rows)))?;
		self.out.flush()?;

		if overflow > 0 {
			tracing::trace!(overflow, top = self.top, "terminal scrolled");
		}
		Ok(u16::try_from(overflow).unwrap_or(u16::MAX))
	}

	fn dimensions(&self) -> io::Result<(u16, u16)> {
		match self.mode {
			Mode::Fixed { rows, cols } => Ok((rows, cols)),
			Mode::Live => {
				let (cols, rows) = terminal::size()?;
				Ok((rows.max(1), cols.max(1)))
			}
		}
	}
}

impl<W: Write> JobControl for InlineTerminal<W> {
	fn release_window(&mut self) -> io::Result<()> {
		queue!(self.out, MoveTo(0, self.bottom))?;
		self.out.write_all(b"\r\n")?;
		execute!(self.out, DisableBracketedPaste, cursor::Show)
	}

	fn release_input(&mut self) -> io::Result<()> {
		if let Some(input) = &self.input {
			input.pause();
		}
		if matches!(self.mode, Mode::Live) {
			terminal::disable_raw_mode()?;
		}
		Ok(())
	}

	fn stop_process(&mut self) -> io::Result<()> {
		if matches!(self.mode, Mode::Live) {
			tracing::debug!("stopping for job control");
			nix::sys::signal::raise(nix::sys::signal::Signal::SIGTSTP)?;
		}
		Ok(())
	}

	fn reacquire_input(&mut self) -> io::Result<()> {
		if matches!(self.mode, Mode::Live) {
			terminal::enable_raw_mode()?;
		}
		if let Some(input) = &self.input {
			input.resume();
		}
		Ok(())
	}

	fn reacquire_window(&mut self) -> io::Result<()> {
		execute!(self.out, EnableBracketedPaste)?;
		self.anchor()
	}
}

impl<W: Write> Drop for InlineTerminal<W> {
	fn drop(&mut self) {
		if let Err(err) = self.leave() {
			tracing::warn!(error = %err, "failed to restore terminal");
		}
	}
}

/// One terminal filling both the renderer and the job-control slot of the driver.
pub struct SharedTerminal<W: Write>(Arc<Mutex<InlineTerminal<W>>>);

impl<W: Write> SharedTerminal<W> {
	pub fn new(terminal: InlineTerminal<W>) -> Self {
		Self(Arc::new(Mutex::new(terminal)))
	}

	pub fn leave(&self) -> io::Result<()> {
		self.0.lock().leave()
	}

	#[cfg(test)]
	pub fn top(&self) -> i64 {
		self.0.lock().top()
	}
}

impl<W: Write> Clone for SharedTerminal<W> {
	fn clone(&self) -> Self {
		Self(Arc::clone(&self.0))
	}
}

impl<W: Write> Renderer for SharedTerminal<W> {
	fn render(&mut self, lines: &[String], cursor: Cursor) -> io::Result<u16> {
		self.0.lock().render(lines, cursor)
	}

	fn dimensions(&self) -> io::Result<(u16, u16)> {
		self.0.lock().dimensions()
	}
}

impl<W: Write> JobControl for SharedTerminal<W> {
	fn release_window(&mut self) -> io::Result<()> {
		self.0.lock().release_window()
	}

	fn release_input(&mut self) -> io::Result<()> {
		self.0.lock().release_input()
	}

	fn stop_process(&mut self) -> io::Result<()> {
		self.0.lock().stop_process()
	}

	fn reacquire_input(&mut self) -> io::Result<()> {
		self.0.lock().reacquire_input()
	}

	fn reacquire_window(&mut self) -> io::Result<()> {
		self.0.lock().reacquire_window()
	}
}

fn clamp_row(row: i64, rows: u16) -> u16 {
	u16::try_from(row.clamp(0, i64::from(rows) - 1)).unwrap_or(0)
}

/// Splits `line` into rows of at most `cols` display columns.
pub fn wrap(line: &str, cols: u16) -> Vec<String> {
	let cols = usize::from(cols.max(1));
	let mut rows = Vec::new();
	let mut current = String::new();
	let mut width = 0;
	for ch in line.chars() {
		let w = ch.width().unwrap_or(0);
		if width + w > cols && !current.is_empty() {
			rows.push(std::mem::take(&mut current));
			width = 0;
		}
		current.push(ch);
		width += w;
	}
	rows.push(current);
	rows
}

#[cfg(test)]
mod tests;
