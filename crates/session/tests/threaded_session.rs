//! A session fed by a producer thread, ended by a reload fired from that thread.

use std::io;
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use tidal_input::{ChannelSource, RawUnit, SourceMessage, TriggerRegistry};
use tidal_primitives::{ExitValue, Key, SemanticEvent, Termination};
use tidal_session::{
	Binding, Cursor, Dispatch, Frame, Interpreter, JobControl, PaintRequest, Renderer, RunOptions, SessionConfig,
	SessionDriver,
};

struct EchoInterpreter {
	seen: mpsc::Sender<()>,
	dispatched: Vec<SemanticEvent>,
}

impl Interpreter for EchoInterpreter {
	fn dispatch(&mut self, event: SemanticEvent) -> Dispatch {
		let outcome = match &event {
			SemanticEvent::KeyPress(_) => {
				let _ = self.seen.send(());
				Dispatch::Continue
			}
			SemanticEvent::Reload { .. } => Dispatch::Terminate(Termination::from_code(ExitValue::Code(7))),
			_ => Dispatch::Continue,
		};
		self.dispatched.push(event);
		outcome
	}

	fn paint(&mut self, _request: PaintRequest) -> Frame {
		Frame::default()
	}

	fn bind(&mut self, _name: &str, _value: Binding) {}

	fn unbind(&mut self, _name: &str) {}

	fn run_source(&mut self, _source: &str) {}
}

struct NullTerminal;

impl Renderer for NullTerminal {
	fn render(&mut self, _lines: &[String], _cursor: Cursor) -> io::Result<u16> {
		Ok(0)
	}

	fn dimensions(&self) -> io::Result<(u16, u16)> {
		Ok((24, 80))
	}
}

impl JobControl for NullTerminal {
	fn release_window(&mut self) -> io::Result<()> {
		Ok(())
	}

	fn release_input(&mut self) -> io::Result<()> {
		Ok(())
	}

	fn stop_process(&mut self) -> io::Result<()> {
		Ok(())
	}

	fn reacquire_input(&mut self) -> io::Result<()> {
		Ok(())
	}

	fn reacquire_window(&mut self) -> io::Result<()> {
		Ok(())
	}
}

#[test]
fn reload_from_another_thread_ends_a_blocked_session() {
	let channel = ChannelSource::new();
	let sender = channel.sender();
	let registry = TriggerRegistry::new(channel.waker());
	let (seen_tx, seen_rx) = mpsc::channel();
	let interpreter = EchoInterpreter {
		seen: seen_tx,
		dispatched: Vec::new(),
	};
	let mut driver = SessionDriver::new(
		SessionConfig::default(),
		registry.attach(channel),
		&registry,
		interpreter,
		NullTerminal,
		NullTerminal,
	)
	.unwrap();
	let handle = driver.handle();

	let producer = thread::spawn(move || {
		sender
			.send(SourceMessage::Unit(RawUnit::Keystroke(Key::char('a'))))
			.unwrap();
		seen_rx.recv_timeout(Duration::from_secs(5)).unwrap();
		handle.request_reload(vec![PathBuf::from("/tmp/mod.py")]);
	});

	let exit = driver.run(RunOptions::default()).unwrap();
	producer.join().unwrap();

	assert_eq!(exit.termination.value, ExitValue::Code(7));
	assert!(!exit.termination.is_user_quit());
	assert_eq!(
		driver.interpreter().dispatched,
		vec![
			SemanticEvent::KeyPress(Key::char('a')),
			SemanticEvent::Reload {
				files: vec![PathBuf::from("/tmp/mod.py")]
			},
		]
	);
}
