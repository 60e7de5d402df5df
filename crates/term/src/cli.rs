//! CLI schema for the tidal binary.

use std::path::PathBuf;

use clap::{ArgAction, Parser};
use tidal_input::DEFAULT_PASTE_THRESHOLD;
use tidal_session::SessionConfig;

#[derive(Parser, Debug)]
#[command(name = "tidal")]
#[command(about = "An interactive read-eval-print session in the terminal")]
#[command(version)]
/// Command-line arguments.
pub struct Cli {
	/// Log to tidal.log (-L for info, -LL for debug)
	#[arg(short = 'L', long = "log", action = ArgAction::Count)]
	pub log: u8,

	/// Paste FILE into the session instead of running it
	#[arg(short, long, requires = "file")]
	pub paste: bool,

	/// Stay interactive after running FILE
	#[arg(short, long)]
	pub interactive: bool,

	/// Don't print the version banner
	#[arg(short, long)]
	pub quiet: bool,

	/// Keystrokes arriving together at least this often count as a paste
	#[arg(long, value_name = "N", default_value_t = DEFAULT_PASTE_THRESHOLD)]
	pub paste_threshold: usize,

	/// Module sources to watch for edits (toggle with F5)
	#[arg(long, value_name = "PATH", num_args = 1..)]
	pub watch: Vec<PathBuf>,

	/// Source run once before the first prompt
	#[arg(long, value_name = "FILE", env = "TIDAL_STARTUP")]
	pub startup: Option<PathBuf>,

	/// Script to run
	pub file: Option<PathBuf>,

	/// Arguments passed to FILE
	#[arg(trailing_var_arg = true, allow_hyphen_values = true)]
	pub args: Vec<String>,
}

impl Cli {
	/// Whether a terminal session runs at all.
	///
	/// A script without `-i` or `-p` runs to completion and exits.
	pub fn starts_session(&self) -> bool {
		self.file.is_none() || self.interactive || self.paste
	}

	/// Warm-up and the startup file only run when no script was given.
	pub fn session_config(&self) -> SessionConfig {
		SessionConfig {
			paste_threshold: self.paste_threshold,
			interactive: self.file.is_none(),
		}
	}
}

#[cfg(test)]
mod tests;
