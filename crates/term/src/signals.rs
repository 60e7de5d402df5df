//! Forwards process signals into the session through threadsafe triggers.

use std::thread::{self, JoinHandle};

use signal_hook::consts::{SIGHUP, SIGINT, SIGTERM};
use signal_hook::iterator::{Handle, Signals};
use tidal_input::{ThreadsafeTrigger, TriggerRegistry};
use tidal_primitives::SemanticEvent;

pub const FORWARDED: [i32; 3] = [SIGINT, SIGTERM, SIGHUP];

/// Triggers fired on behalf of forwarded signals.
#[derive(Debug, Clone)]
pub struct SignalTriggers {
	interrupt: ThreadsafeTrigger,
	exit: ThreadsafeTrigger<&'static str>,
}

impl SignalTriggers {
	pub fn register(registry: &TriggerRegistry) -> Self {
		Self {
			interrupt: registry.register_threadsafe(|()| SemanticEvent::SigInt),
			exit: registry.register_threadsafe(|reason: &'static str| SemanticEvent::Exit {
				reason: reason.to_string(),
				requested_by_code: false,
			}),
		}
	}

	/// Fires the trigger for `signal`. Returns false for signals we ignore.
	pub fn forward(&self, signal: i32) -> bool {
		match signal {
			SIGINT => self.interrupt.fire(),
			SIGTERM => self.exit.fire_with("terminated"),
			SIGHUP => self.exit.fire_with("hangup"),
			_ => return false,
		}
		true
	}
}

/// Background thread owning the signal iterator; dropping it unregisters.
pub struct SignalForwarder {
	handle: Handle,
	thread: Option<JoinHandle<()>>,
}

impl SignalForwarder {
	pub fn spawn(registry: &TriggerRegistry) -> std::io::Result<Self> {
		let triggers = SignalTriggers::register(registry);
		let mut signals = Signals::new(FORWARDED)?;
		let handle = signals.handle();
		let thread = thread::Builder::new().name("tidal-signals".into()).spawn(move || {
			for signal in signals.forever() {
				if triggers.forward(signal) {
					tracing::debug!(signal, "forwarded signal");
				}
			}
		})?;
		Ok(Self {
			handle,
			thread: Some(thread),
		})
	}
}

impl Drop for SignalForwarder {
	fn drop(&mut self) {
		self.handle.close();
		if let Some(thread) = self.thread.take()
			&& thread.join().is_err()
		{
			tracing::warn!("signal thread panicked");
		}
	}
}

#[cfg(test)]
mod tests;
