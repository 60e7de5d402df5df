mod cli;
mod logging;
mod reader;
mod repl;
mod signals;
mod terminal;

use std::path::Path;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use cli::Cli;
use reader::InputReader;
use repl::TranscriptRepl;
use signals::SignalForwarder;
use terminal::{InlineTerminal, SharedTerminal};
use tidal_filewatch::ModuleWatcher;
use tidal_input::{ChannelSource, TriggerRegistry};
use tidal_preprocess::Preprocessor;
use tidal_primitives::{ExitValue, PasteBlock};
use tidal_session::{Binding, Interpreter, RunOptions, SessionDriver};
use tracing::{info, warn};

fn main() -> ExitCode {
	let cli = Cli::parse();
	if let Err(err) = logging::init(cli.log) {
		eprintln!("tidal: logging disabled: {err:#}");
	}

	match run(&cli) {
		Ok(value) => exit_code(&value),
		Err(err) => {
			tracing::error!(error = %format!("{err:#}"), "session failed");
			eprintln!("tidal: {err:#}");
			ExitCode::FAILURE
		}
	}
}

/// Reports `value` on stderr and maps it to a process status.
fn exit_code(value: &ExitValue) -> ExitCode {
	if let Some(message) = value.message() {
		eprintln!("{message}");
	}
	ExitCode::from(status_byte(value))
}

/// Low byte of the exit status, as the shell sees it.
fn status_byte(value: &ExitValue) -> u8 {
	u8::try_from(value.status() & 0xff).unwrap_or(1)
}

fn run(cli: &Cli) -> anyhow::Result<ExitValue> {
	let channel = ChannelSource::new();
	let registry = TriggerRegistry::new(channel.waker());
	let mut repl = TranscriptRepl::new(Preprocessor::default(), &registry).with_startup(cli.startup.clone());

	let mut paste = None;
	if let Some(path) = &cli.file {
		let source = read_source(path)?;
		if cli.paste {
			paste = PasteBlock::from_text(&source);
		} else {
			repl.bind("argv", Binding::Source(argv(path, &cli.args)));
			let outcome = repl.feed(&source);
			for line in repl.outputs() {
				println!("{line}");
			}
			if !cli.starts_session() {
				return Ok(outcome.map(|t| t.value).unwrap_or_default());
			}
			if let Some(termination) = outcome {
				info!(value = ?termination.value, "script exited; staying interactive");
			}
		}
	}

	if !cli.quiet {
		println!("tidal {}", env!("CARGO_PKG_VERSION"));
	}

	let reader = InputReader::spawn(channel.sender()).context("cannot start input reader")?;
	let _signals = SignalForwarder::spawn(&registry).context("cannot install signal handlers")?;
	let mut terminal = InlineTerminal::enter().context("cannot set up terminal")?;
	terminal.attach_input(reader.pause_switch());
	let terminal = SharedTerminal::new(terminal);

	let config = cli.session_config();
	let options = RunOptions::from(&config).with_paste(paste);
	let mut driver = SessionDriver::new(
		config,
		registry.attach(channel),
		&registry,
		repl,
		terminal.clone(),
		terminal.clone(),
	)?;

	if !cli.watch.is_empty() {
		let handle = driver.handle();
		let watcher = ModuleWatcher::new(&cli.watch, move |files| handle.request_reload(files))
			.context("cannot watch module sources")?;
		driver.interpreter_mut().attach_watcher(watcher);
	}

	info!(interactive = options.interactive, "session starting");
	let result = driver.run(options);
	if let Err(err) = terminal.leave() {
		warn!(error = %err, "failed to restore terminal");
	}
	let exit = result?;
	info!(value = ?exit.termination.value, initiator = ?exit.termination.initiator, "session ended");
	Ok(exit.termination.value)
}

fn read_source(path: &Path) -> anyhow::Result<String> {
	std::fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))
}

/// Source text of the script's argument list.
fn argv(path: &Path, args: &[String]) -> String {
	let items: Vec<String> = std::iter::once(path.display().to_string())
		.chain(args.iter().cloned())
		.map(|arg| format!("{arg:?}"))
		.collect();
	format!("[{}]", items.join(", "))
}
