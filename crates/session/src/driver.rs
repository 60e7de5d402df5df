//! The session state machine.
//!
//! ```text
//! WarmingUp ─► AwaitingEvent ─► Dispatching ─► Painting ─┬─► AwaitingEvent
//!                                    │                    └─► Exited
//!                                    └─► Suspended ─► Painting
//! ```
//!
//! Every processed event is followed by exactly one paint. A termination
//! still paints, with `about_to_exit` set, before it leaves [`SessionDriver::run`].

use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tidal_input::{EventCoalescer, RawInputSource, ThreadsafeTrigger, TriggerRegistry};
use tidal_primitives::{ExitValue, Initiator, SemanticEvent, Termination};
use tracing::{debug, info, trace, warn};

use crate::config::{RunOptions, SessionConfig};
use crate::error::SessionError;
use crate::handle::SessionHandle;
use crate::interface::{Binding, Dispatch, Interpreter, JobControl, PaintRequest, Renderer};
use crate::state::{Phase, SessionState};

/// Source run during interactive warm-up to import the help helper.
pub const HELPER_IMPORT: &str = "from tidal._internal import _Helper";

const HELPER_INSTALL: &str = "help = _Helper(_repl)";

/// How a session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionExit {
	pub termination: Termination,
	pub state: SessionState,
}

type Step = ControlFlow<Termination>;

/// Drives one interactive session.
pub struct SessionDriver<S, I, R, J> {
	events: EventCoalescer<S>,
	interpreter: I,
	renderer: R,
	job: J,
	state: SessionState,
	shared: Arc<RwLock<SessionState>>,
	phase: Phase,
	interrupting_refresh: ThreadsafeTrigger,
	handle: SessionHandle,
}

impl<S, I, R, J> SessionDriver<S, I, R, J>
where
	S: RawInputSource,
	I: Interpreter,
	R: Renderer,
	J: JobControl,
{
	/// Builds a driver reading from `source`, which should already be
	/// attached to `registry`.
	///
	/// # Errors
	///
	/// [`SessionError::Config`] if `config` does not validate.
	pub fn new(
		config: SessionConfig,
		source: S,
		registry: &TriggerRegistry,
		interpreter: I,
		renderer: R,
		job: J,
	) -> Result<Self, SessionError> {
		config.validate()?;
		let shared = Arc::new(RwLock::new(SessionState::default()));
		Ok(Self {
			events: EventCoalescer::with_threshold(source, config.paste_threshold),
			interpreter,
			renderer,
			job,
			state: SessionState::default(),
			handle: SessionHandle::new(registry, Arc::clone(&shared)),
			shared,
			phase: Phase::WarmingUp,
			interrupting_refresh: registry.register_threadsafe(|()| SemanticEvent::Refresh),
		})
	}

	pub fn handle(&self) -> SessionHandle {
		self.handle.clone()
	}

	pub fn phase(&self) -> Phase {
		self.phase
	}

	pub fn state(&self) -> SessionState {
		self.state
	}

	pub fn interpreter(&self) -> &I {
		&self.interpreter
	}

	pub fn interpreter_mut(&mut self) -> &mut I {
		&mut self.interpreter
	}

	pub fn renderer(&self) -> &R {
		&self.renderer
	}

	pub fn job(&self) -> &J {
		&self.job
	}

	pub fn events(&self) -> &EventCoalescer<S> {
		&self.events
	}

	/// Runs the session until it terminates.
	///
	/// # Errors
	///
	/// Input, render and job-control failures abort the session.
	/// [`SessionError::Finished`] if the session already ended.
	pub fn run(&mut self, options: RunOptions) -> Result<SessionExit, SessionError> {
		if self.phase == Phase::Exited {
			return Err(SessionError::Finished);
		}
		self.set_phase(Phase::WarmingUp);
		let (rows, cols) = self.renderer.dimensions().map_err(SessionError::Render)?;
		self.state.height = rows;
		self.state.width = cols;
		self.publish();

		if let ControlFlow::Break(termination) = self.warm_up(options)? {
			return Ok(self.finish(termination));
		}

		while self.interpreter.idle_work() {
			if let Some(event) = self.events.poll(Some(Duration::ZERO))?
				&& let ControlFlow::Break(termination) = self.process(Some(event))?
			{
				return Ok(self.finish(termination));
			}
		}

		loop {
			self.set_phase(Phase::AwaitingEvent);
			let event = self.events.poll(None)?;
			if let ControlFlow::Break(termination) = self.process(event)? {
				return Ok(self.finish(termination));
			}
		}
	}

	fn warm_up(&mut self, options: RunOptions) -> Result<Step, SessionError> {
		if options.interactive {
			self.interpreter.bind("_repl", Binding::Session(self.handle.clone()));
			self.interpreter.run_source(HELPER_IMPORT);
			self.interpreter.run_source(HELPER_INSTALL);
			self.interpreter.unbind("_repl");
			self.interpreter.unbind("_Helper");
			if let ControlFlow::Break(termination) = self.process(Some(SemanticEvent::StartupRequest))? {
				return Ok(ControlFlow::Break(termination));
			}
		}
		if let Some(paste) = options.paste {
			debug!(keys = paste.len(), "delivering initial paste");
			if let ControlFlow::Break(termination) = self.process(Some(SemanticEvent::PasteBlock(paste)))? {
				return Ok(ControlFlow::Break(termination));
			}
		}
		self.process(None)
	}

	/// Dispatches `event` (if any) and paints the result.
	fn process(&mut self, event: Option<SemanticEvent>) -> Result<Step, SessionError> {
		let outcome = match event {
			Some(event) => self.dispatch(event),
			None => Dispatch::Continue,
		};
		match outcome {
			Dispatch::Continue => {
				self.paint(PaintRequest::default())?;
				Ok(ControlFlow::Continue(()))
			}
			Dispatch::Suspend => {
				self.suspend()?;
				self.paint(PaintRequest::default())?;
				Ok(ControlFlow::Continue(()))
			}
			Dispatch::Terminate(termination) => {
				self.paint(PaintRequest {
					about_to_exit: true,
					user_quit: termination.is_user_quit(),
					..PaintRequest::default()
				})?;
				Ok(ControlFlow::Break(termination))
			}
		}
	}

	fn dispatch(&mut self, event: SemanticEvent) -> Dispatch {
		self.set_phase(Phase::Dispatching);
		trace!(event = event.name(), "dispatching");
		match event {
			SemanticEvent::Exit {
				reason,
				requested_by_code,
			} => {
				info!(%reason, requested_by_code, "exit requested");
				let value = if reason.is_empty() {
					ExitValue::Empty
				} else {
					ExitValue::Message(reason)
				};
				Dispatch::Terminate(Termination {
					value,
					initiator: if requested_by_code { Initiator::Code } else { Initiator::User },
				})
			}
			SemanticEvent::Resize { rows, cols } => {
				self.state.height = rows;
				self.state.width = cols;
				self.interpreter.dispatch(SemanticEvent::Resize { rows, cols })
			}
			event => self.interpreter.dispatch(event),
		}
	}

	fn paint(&mut self, mut request: PaintRequest) -> Result<(), SessionError> {
		self.set_phase(Phase::Painting);
		request.state = self.state;
		let frame = self.interpreter.paint(request);
		let scrolled = self
			.renderer
			.render(&frame.lines, frame.cursor)
			.map_err(SessionError::Render)?;
		self.state.scroll_offset += u64::from(scrolled);
		self.publish();
		Ok(())
	}

	/// Releases the terminal, stops, and reacquires in reverse order.
	fn suspend(&mut self) -> Result<(), SessionError> {
		self.set_phase(Phase::Suspended);
		self.job.release_window().map_err(job_error("release window"))?;
		if let Err(err) = self.job.release_input() {
			// Input was never given up; only the window needs taking back.
			if let Err(restore) = self.job.reacquire_window() {
				warn!(error = %restore, "could not reacquire window after failed release");
			}
			return Err(job_error("release input")(err));
		}
		self.state.suspended = true;
		self.publish();

		let stopped = self.job.stop_process().map_err(job_error("stop process"));

		self.job.reacquire_input().map_err(job_error("reacquire input"))?;
		self.job.reacquire_window().map_err(job_error("reacquire window"))?;
		self.state.suspended = false;
		if let Ok((rows, cols)) = self.renderer.dimensions() {
			self.state.height = rows;
			self.state.width = cols;
		}
		self.publish();
		stopped?;

		self.interrupting_refresh.fire();
		debug!("resumed after suspension");
		Ok(())
	}

	fn finish(&mut self, termination: Termination) -> SessionExit {
		self.set_phase(Phase::Exited);
		info!(
			status = termination.value.status(),
			user_quit = termination.is_user_quit(),
			"session ended"
		);
		SessionExit {
			termination,
			state: self.state,
		}
	}

	fn set_phase(&mut self, phase: Phase) {
		if self.phase != phase {
			trace!(from = ?self.phase, to = ?phase, "phase");
			self.phase = phase;
		}
	}

	fn publish(&self) {
		*self.shared.write() = self.state;
	}
}

fn job_error(step: &'static str) -> impl FnOnce(std::io::Error) -> SessionError {
	move |source| SessionError::JobControl { step, source }
}
