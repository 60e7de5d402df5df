//! `TranscriptRepl`: a demonstration interpreter.
//!
//! Entries are edited in a line buffer, run through the [`Preprocessor`] and
//! parsed. Nothing is executed. Expressions echo their canonical rendering,
//! assignments and imports record the source of the bound value, and bare
//! names look that source up again. Blocks (a line ending in `:`) are shown
//! as the normalized source a compiler would receive; a block that defines a
//! function or class binds its name.
//!
//! A blank line closes a block, unless a paste or source file continues it
//! with another indented line.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use tidal_filewatch::ModuleWatcher;
use tidal_input::{ImmediateTrigger, ScheduledTrigger, TriggerRegistry};
use tidal_preprocess::Preprocessor;
use tidal_preprocess::syntax::{self, Shape, Statement, Target};
use tidal_primitives::{ExitValue, Key, KeyCode, SemanticEvent, Termination};
use tidal_session::{Binding, Cursor, Dispatch, Frame, Interpreter, PaintRequest};
use tracing::{debug, warn};
use unicode_width::UnicodeWidthStr;

pub const PROMPT: &str = ">>> ";
pub const CONTINUATION: &str = "... ";

/// How long a status message stays on screen.
pub const STATUS_TIMEOUT: Duration = Duration::from_secs(2);

const INDENT: &str = "    ";

/// One line of the scrollback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
	/// Echo of a submitted line, prompt included.
	Input(String),
	Output(String),
}

impl Line {
	pub fn text(&self) -> &str {
		match self {
			Line::Input(text) | Line::Output(text) => text,
		}
	}
}

/// What a namespace entry holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
	Session,
	/// Canonical source of the bound expression.
	Source(String),
}

impl fmt::Display for Value {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Value::Session => f.write_str("<session>"),
			Value::Source(source) => f.write_str(source),
		}
	}
}

/// State restored by an undo.
struct Checkpoint {
	transcript_len: usize,
	namespace: HashMap<String, Value>,
}

pub struct TranscriptRepl {
	preprocessor: Preprocessor,
	transcript: Vec<Line>,
	buffer: String,
	/// Lines of an open block, without prompts.
	block: Vec<String>,
	/// Transcript length when the current entry began.
	entry_start: usize,
	history: Vec<Checkpoint>,
	namespace: HashMap<String, Value>,
	status: Option<(String, Instant)>,
	startup: Option<PathBuf>,
	watcher: Option<ModuleWatcher>,
	undo: ImmediateTrigger,
	status_expiry: ScheduledTrigger,
}

impl TranscriptRepl {
	pub fn new(preprocessor: Preprocessor, registry: &TriggerRegistry) -> Self {
		Self {
			preprocessor,
			transcript: Vec::new(),
			buffer: String::new(),
			block: Vec::new(),
			entry_start: 0,
			history: Vec::new(),
			namespace: HashMap::new(),
			status: None,
			startup: None,
			watcher: None,
			undo: registry.register_immediate(|| SemanticEvent::Undo),
			status_expiry: registry.register_scheduled(|| SemanticEvent::ScheduledRefresh),
		}
	}

	/// Source file run on the startup request.
	pub fn with_startup(mut self, path: Option<PathBuf>) -> Self {
		self.startup = path;
		self
	}

	/// Watcher toggled with F5.
	pub fn attach_watcher(&mut self, watcher: ModuleWatcher) {
		self.watcher = Some(watcher);
	}

	#[cfg(test)]
	pub fn transcript(&self) -> &[Line] {
		&self.transcript
	}

	#[cfg(test)]
	pub fn buffer(&self) -> &str {
		&self.buffer
	}

	#[cfg(test)]
	pub fn status(&self) -> Option<&str> {
		self.status.as_ref().map(|(text, _)| text.as_str())
	}

	#[cfg(test)]
	pub fn lookup(&self, name: &str) -> Option<&Value> {
		self.namespace.get(name)
	}

	/// Output lines, without the echoed input.
	pub fn outputs(&self) -> impl Iterator<Item = &str> {
		self.transcript.iter().filter_map(|line| match line {
			Line::Output(text) => Some(text.as_str()),
			Line::Input(_) => None,
		})
	}

	/// Types `text` as if pasted at the prompt, closing any block left open.
	pub fn feed(&mut self, text: &str) -> Option<Termination> {
		let keys: Vec<Key> = text.chars().map(Key::from).collect();
		if let Dispatch::Terminate(termination) = self.paste(&keys) {
			return Some(termination);
		}
		while !self.buffer.is_empty() || !self.block.is_empty() {
			if let Dispatch::Terminate(termination) = self.submit() {
				return Some(termination);
			}
		}
		None
	}

	/// Types a run of keys that arrived together.
	///
	/// Unlike typed input, a blank line inside a block does not close it when
	/// the next non-blank line of the run is indented.
	fn paste(&mut self, keys: &[Key]) -> Dispatch {
		for (i, key) in keys.iter().enumerate() {
			if key.is_enter() && self.blank_line_continues(&keys[i + 1..]) {
				self.hold_blank_line();
				continue;
			}
			if let Dispatch::Terminate(termination) = self.key(*key) {
				return Dispatch::Terminate(termination);
			}
		}
		Dispatch::Continue
	}

	fn blank_line_continues(&self, rest: &[Key]) -> bool {
		if self.block.is_empty() || !self.buffer.trim().is_empty() {
			return false;
		}
		let rest: String = rest.iter().filter_map(Key::text).collect();
		rest.lines()
			.find(|line| !line.trim().is_empty())
			.is_some_and(continues_block)
	}

	fn hold_blank_line(&mut self) {
		let line = std::mem::take(&mut self.buffer);
		self.transcript.push(Line::Input(format!("{CONTINUATION}{line}")));
		self.block.push(line);
	}

	fn key(&mut self, key: Key) -> Dispatch {
		if key.is_ctrl('d') {
			if self.buffer.is_empty() && self.block.is_empty() {
				return Dispatch::Terminate(Termination::user_quit());
			}
			return Dispatch::Continue;
		}
		if key.is_ctrl('c') {
			self.interrupt();
			return Dispatch::Continue;
		}
		if key.is_ctrl('z') {
			return Dispatch::Suspend;
		}
		if key.is_ctrl('r') {
			self.undo.fire();
			return Dispatch::Continue;
		}
		match key.code {
			KeyCode::Enter if key.modifiers.is_empty() => return self.submit(),
			KeyCode::Backspace => {
				self.buffer.pop();
			}
			KeyCode::Tab => self.buffer.push_str(INDENT),
			KeyCode::F(5) => self.toggle_watcher(),
			_ => {
				if let Some(c) = key.text() {
					self.buffer.push(c);
				}
			}
		}
		Dispatch::Continue
	}

	fn prompt(&self) -> &'static str {
		if self.block.is_empty() { PROMPT } else { CONTINUATION }
	}

	fn submit(&mut self) -> Dispatch {
		let line = std::mem::take(&mut self.buffer);
		if self.block.is_empty() {
			self.entry_start = self.transcript.len();
		}
		self.transcript.push(Line::Input(format!("{}{line}", self.prompt())));

		if self.block.is_empty() {
			if line.trim().is_empty() {
				return Dispatch::Continue;
			}
			if opens_block(&line) {
				self.block.push(line);
				return Dispatch::Continue;
			}
			return self.execute(&line);
		}
		if line.trim().is_empty() {
			let source = std::mem::take(&mut self.block).join("\n");
			return self.execute(&source);
		}
		self.block.push(line);
		Dispatch::Continue
	}

	/// Runs one submitted entry, recording an undo checkpoint.
	fn execute(&mut self, source: &str) -> Dispatch {
		let checkpoint = Checkpoint {
			transcript_len: self.entry_start,
			namespace: self.namespace.clone(),
		};
		let outcome = self.run(source);
		self.history.push(checkpoint);
		match outcome {
			Some(termination) => Dispatch::Terminate(termination),
			None => Dispatch::Continue,
		}
	}

	fn run(&mut self, source: &str) -> Option<Termination> {
		let prepared = self.preprocessor.prepare(source);
		if prepared.trim_end().contains('\n') {
			for line in prepared.lines() {
				self.output(format!("| {line}"));
			}
		}

		let module = match syntax::parse(&prepared) {
			Ok(module) => module,
			Err(err) => {
				self.output(format!("SyntaxError: {err}"));
				return None;
			}
		};
		for stmt in module.statements() {
			if let Some(value) = exit_request(&stmt) {
				debug!(%value, "exit requested by entry");
				return Some(Termination::from_code(value));
			}
			self.evaluate(stmt);
		}
		None
	}

	fn evaluate(&mut self, stmt: Statement) {
		match stmt {
			Statement::Expression(expr) => match expr.shape {
				Shape::Name(name) => match self.namespace.get(&name) {
					Some(value) => self.output(value.to_string()),
					None => self.name_error(&name),
				},
				_ => self.output(expr.source),
			},
			Statement::Assign { targets, value } => {
				for target in &targets {
					self.bind_target(target, &value);
				}
			}
			Statement::AugAssign {
				target: Target::Name(name),
				op,
				value,
			} => match self.namespace.get(&name) {
				Some(current) => {
					let updated = format!("({current}) {op} {value}");
					self.namespace.insert(name, Value::Source(updated));
				}
				None => self.name_error(&name),
			},
			Statement::Delete(targets) => {
				for target in targets {
					if let Target::Name(name) = target
						&& self.namespace.remove(&name).is_none()
					{
						self.name_error(&name);
					}
				}
			}
			Statement::Import(aliases) => {
				for alias in aliases {
					let top = alias.name.split('.').next().unwrap_or(&alias.name);
					let (bound, module) = match &alias.asname {
						Some(asname) => (asname.as_str(), alias.name.as_str()),
						None => (top, top),
					};
					self.namespace
						.insert(bound.to_string(), Value::Source(format!("<module '{module}'>")));
				}
			}
			Statement::ImportFrom { module, names } => {
				for alias in names.iter().filter(|alias| alias.name != "*") {
					let bound = alias.asname.as_deref().unwrap_or(&alias.name);
					self.namespace
						.insert(bound.to_string(), Value::Source(format!("<{module}.{}>", alias.name)));
				}
			}
			Statement::Function(name) => {
				let value = Value::Source(format!("<function {name}>"));
				self.namespace.insert(name, value);
			}
			Statement::Class(name) => {
				let value = Value::Source(format!("<class {name}>"));
				self.namespace.insert(name, value);
			}
			_ => {}
		}
	}

	fn bind_target(&mut self, target: &Target, value: &str) {
		match target {
			Target::Name(name) => {
				self.namespace.insert(name.clone(), Value::Source(value.to_string()));
			}
			Target::Sequence(items) => {
				for (i, item) in items.iter().enumerate() {
					self.bind_target(item, &format!("({value})[{i}]"));
				}
			}
			Target::Other(_) => {}
		}
	}

	fn name_error(&mut self, name: &str) {
		self.output(format!("NameError: name '{name}' is not defined"));
	}

	fn output(&mut self, text: String) {
		self.transcript.push(Line::Output(text));
	}

	fn set_status(&mut self, text: String) {
		let until = Instant::now() + STATUS_TIMEOUT;
		self.status = Some((text, until));
		self.status_expiry.schedule_at(until);
	}

	fn interrupt(&mut self) {
		self.buffer.clear();
		self.block.clear();
		self.output("KeyboardInterrupt".to_string());
	}

	fn undo(&mut self) {
		let Some(checkpoint) = self.history.pop() else {
			self.set_status("nothing to undo".to_string());
			return;
		};
		self.transcript.truncate(checkpoint.transcript_len);
		self.namespace = checkpoint.namespace;
		self.buffer.clear();
		self.block.clear();
		self.set_status("undid 1 entry".to_string());
	}

	fn toggle_watcher(&mut self) {
		let message = match self.watcher.as_mut() {
			None => "no modules to watch".to_string(),
			Some(watcher) if watcher.is_active() => match watcher.deactivate() {
				Ok(()) => "stopped watching modules".to_string(),
				Err(err) => format!("watcher: {err}"),
			},
			Some(watcher) => match watcher.activate() {
				Ok(()) if watcher.is_enabled() => {
					format!("watching {} directories", watcher.tracked_dirs().len())
				}
				Ok(()) => "file watching unavailable".to_string(),
				Err(err) => format!("watcher: {err}"),
			},
		};
		self.set_status(message);
	}

	fn run_startup(&mut self) -> Dispatch {
		let Some(path) = self.startup.clone() else {
			return Dispatch::Continue;
		};
		let source = match std::fs::read_to_string(&path) {
			Ok(source) => source,
			Err(err) => {
				warn!(path = %path.display(), error = %err, "startup file unreadable");
				self.set_status(format!("startup file {}: {err}", path.display()));
				return Dispatch::Continue;
			}
		};
		debug!(path = %path.display(), "running startup file");
		for entry in entries(&source) {
			if let Some(termination) = self.run(&entry) {
				return Dispatch::Terminate(termination);
			}
		}
		Dispatch::Continue
	}
}

impl Interpreter for TranscriptRepl {
	fn dispatch(&mut self, event: SemanticEvent) -> Dispatch {
		match event {
			SemanticEvent::KeyPress(key) => self.key(key),
			SemanticEvent::PasteBlock(paste) => self.paste(paste.keys()),
			SemanticEvent::SigInt => {
				self.interrupt();
				Dispatch::Continue
			}
			SemanticEvent::Undo => {
				self.undo();
				Dispatch::Continue
			}
			SemanticEvent::ScheduledRefresh => {
				if self.status.as_ref().is_some_and(|(_, until)| Instant::now() >= *until) {
					self.status = None;
				}
				Dispatch::Continue
			}
			SemanticEvent::Reload { files } => {
				for file in &files {
					self.output(format!("# reloaded {}", file.display()));
				}
				self.set_status(format!("reloaded {} file(s)", files.len()));
				Dispatch::Continue
			}
			SemanticEvent::StartupRequest => self.run_startup(),
			SemanticEvent::Refresh | SemanticEvent::Resize { .. } | SemanticEvent::Exit { .. } => Dispatch::Continue,
		}
	}

	fn paint(&mut self, request: PaintRequest) -> Frame {
		let mut lines: Vec<String> = self.transcript.iter().map(|line| line.text().to_string()).collect();
		let current = format!("{}{}", self.prompt(), self.buffer);
		let cursor = Cursor {
			row: lines.len(),
			col: current.width(),
		};
		lines.push(current);
		if !request.about_to_exit
			&& let Some((status, _)) = &self.status
		{
			lines.push(format!("-- {status} --"));
		}
		Frame { lines, cursor }
	}

	fn bind(&mut self, name: &str, value: Binding) {
		let value = match value {
			Binding::Session(_) => Value::Session,
			Binding::Source(source) => Value::Source(source),
		};
		self.namespace.insert(name.to_string(), value);
	}

	fn unbind(&mut self, name: &str) {
		self.namespace.remove(name);
	}

	fn run_source(&mut self, source: &str) {
		for entry in entries(source) {
			if self.run(&entry).is_some() {
				warn!("exit requested while running source outside an entry; ignored");
				return;
			}
		}
	}
}

fn opens_block(line: &str) -> bool {
	line.trim_end().ends_with(':')
}

/// Whether `line` belongs to an open block.
fn continues_block(line: &str) -> bool {
	line.starts_with([' ', '\t']) && !line.trim().is_empty()
}

/// Splits a source file into prompt-sized entries.
///
/// A line ending in `:` opens a block that runs until the next unindented
/// line, or a blank line not followed by an indented one.
fn entries(source: &str) -> Vec<String> {
	let lines: Vec<&str> = source.lines().collect();
	let mut entries = Vec::new();
	let mut block: Vec<&str> = Vec::new();
	for (i, &line) in lines.iter().enumerate() {
		if !block.is_empty() {
			let continues = continues_block(line)
				|| (line.trim().is_empty()
					&& lines[i + 1..]
						.iter()
						.find(|next| !next.trim().is_empty())
						.is_some_and(|next| continues_block(next)));
			if continues {
				block.push(line);
				continue;
			}
			entries.push(std::mem::take(&mut block).join("\n"));
		}
		if line.trim().is_empty() {
			continue;
		}
		if opens_block(line) {
			block.push(line);
		} else {
			entries.push(line.to_string());
		}
	}
	if !block.is_empty() {
		entries.push(block.join("\n"));
	}
	entries
}

/// Exit value if `stmt` asks the session to end.
fn exit_request(stmt: &Statement) -> Option<ExitValue> {
	match stmt {
		Statement::Expression(expr) => match &expr.shape {
			Shape::Call { callee, args } if callee == "exit" || callee == "quit" => Some(exit_value(args)),
			_ => None,
		},
		Statement::Raise(Some(expr)) => match &expr.shape {
			Shape::Name(name) if name == "SystemExit" => Some(ExitValue::Empty),
			Shape::Call { callee, args } if callee == "SystemExit" => Some(exit_value(args)),
			_ => None,
		},
		_ => None,
	}
}

fn exit_value(args: &[String]) -> ExitValue {
	ExitValue::from_argument(args.first().map_or("", String::as_str))
}
