use std::path::PathBuf;

use clap::Parser;
use rstest::rstest;

use super::*;

fn parse(args: &[&str]) -> Cli {
	Cli::try_parse_from(std::iter::once("tidal").chain(args.iter().copied())).unwrap()
}

#[test]
fn bare_invocation_is_interactive() {
	let cli = parse(&[]);
	assert!(cli.starts_session());
	assert_eq!(
		cli.session_config(),
		SessionConfig {
			paste_threshold: 3,
			interactive: true
		}
	);
	assert_eq!(cli.log, 0);
}

#[rstest]
#[case(&["-L"], 1)]
#[case(&["-LL"], 2)]
#[case(&["-L", "--log"], 2)]
fn log_flag_counts(#[case] args: &[&str], #[case] expected: u8) {
	assert_eq!(parse(args).log, expected);
}

#[test]
fn script_runs_without_a_session() {
	let cli = parse(&["script.py", "one", "--two"]);
	assert!(!cli.starts_session());
	assert_eq!(cli.file, Some(PathBuf::from("script.py")));
	assert_eq!(cli.args, vec!["one", "--two"]);
	assert!(!cli.session_config().interactive);
}

#[rstest]
#[case(&["-i", "script.py"])]
#[case(&["-p", "script.py"])]
fn script_with_session(#[case] args: &[&str]) {
	assert!(parse(args).starts_session());
}

#[test]
fn paste_requires_a_file() {
	assert!(Cli::try_parse_from(["tidal", "-p"]).is_err());
}

#[test]
fn paste_threshold_and_watch_paths() {
	let cli = parse(&["--paste-threshold", "5", "--watch", "a.py", "b.py"]);
	assert_eq!(cli.paste_threshold, 5);
	assert_eq!(cli.watch, vec![PathBuf::from("a.py"), PathBuf::from("b.py")]);
}
