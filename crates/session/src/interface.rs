//! Collaborators the driver is generic over.

use std::io;

use tidal_primitives::{SemanticEvent, Termination};

use crate::handle::SessionHandle;
use crate::state::SessionState;

/// What the driver does after an event has been dispatched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
	Continue,
	/// Release the terminal and stop the process until it is continued.
	Suspend,
	Terminate(Termination),
}

/// Flags for one paint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PaintRequest {
	/// This is the last frame before the session ends.
	pub about_to_exit: bool,
	/// The session is ending because the user quit.
	pub user_quit: bool,
	pub state: SessionState,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor {
	pub row: usize,
	pub col: usize,
}

/// Lines to show plus where the cursor goes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frame {
	pub lines: Vec<String>,
	pub cursor: Cursor,
}

/// A value installed into the interpreter namespace during warm-up.
#[derive(Debug, Clone)]
pub enum Binding {
	Session(SessionHandle),
	Source(String),
}

/// The interactive interpreter driven by the session.
pub trait Interpreter {
	fn dispatch(&mut self, event: SemanticEvent) -> Dispatch;

	fn paint(&mut self, request: PaintRequest) -> Frame;

	fn bind(&mut self, name: &str, value: Binding);

	fn unbind(&mut self, name: &str);

	/// Runs `source` without echoing it.
	fn run_source(&mut self, source: &str);

	/// Performs one unit of background work, returning whether more remains.
	fn idle_work(&mut self) -> bool {
		false
	}
}

/// Writes frames to the terminal.
pub trait Renderer {
	/// Draws `lines` with the cursor at `cursor`, returning how many lines
	/// the terminal scrolled.
	fn render(&mut self, lines: &[String], cursor: Cursor) -> io::Result<u16>;

	/// `(rows, cols)` of the drawing area.
	fn dimensions(&self) -> io::Result<(u16, u16)>;
}

/// Terminal and process control for job-control suspension.
///
/// The driver calls these in the order listed.
pub trait JobControl {
	fn release_window(&mut self) -> io::Result<()>;

	fn release_input(&mut self) -> io::Result<()>;

	/// Stops the process; returns once it has been continued.
	fn stop_process(&mut self) -> io::Result<()>;

	fn reacquire_input(&mut self) -> io::Result<()>;

	fn reacquire_window(&mut self) -> io::Result<()>;
}
