//! # Doudizhu CLI Library
//!
//! Command-line front end for the Dou Dizhu engine: interactive play with a
//! recoverable ledger, plus `verify` and `replay` utilities for inspecting
//! ledger files.
//!
//! The primary entry point is [`run`], which parses arguments and dispatches
//! to the subcommand handlers. Exit codes: `0` success, `2` error, `130`
//! interrupted.

use std::io::Write;

use clap::Parser;

pub mod cli;
mod commands;
pub mod config;
mod error;
pub mod formatters;

use cli::{Commands, DoudizhuCli};
use commands::{handle_play_command, handle_replay_command, handle_verify_command};
pub use error::CliError;

/// Parse command-line arguments and execute the selected subcommand.
///
/// ```no_run
/// use std::io;
/// let args = vec!["doudizhu", "verify", "--input", "ledger/game.jsonl"];
/// let code = doudizhu_cli::run(args, &mut io::stdout(), &mut io::stderr());
/// assert_eq!(code, 0);
/// ```
pub fn run<I, S>(args: I, out: &mut dyn Write, err: &mut dyn Write) -> i32
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let argv: Vec<String> = args.into_iter().map(|s| s.as_ref().to_string()).collect();
    let parsed = match DoudizhuCli::try_parse_from(&argv) {
        Ok(parsed) => parsed,
        Err(e) => {
            use clap::error::ErrorKind;
            // Help and version print to stdout and exit 0
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                    let _ = write!(out, "{}", e);
                    0
                }
                _ => {
                    let _ = write!(err, "{}", e);
                    2
                }
            };
        }
    };

    let cfg = match config::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            let _ = writeln!(err, "{}", e);
            return 2;
        }
    };

    let result = match parsed.command {
        Commands::Play {
            names,
            seed,
            resume,
        } => {
            let stdin = std::io::stdin();
            let mut input = stdin.lock();
            handle_play_command(&names, seed, resume, &cfg, &mut input, out, err)
        }
        Commands::Verify { input } => handle_verify_command(&input, out, err),
        Commands::Replay { input } => handle_replay_command(&input, out, err),
    };

    match result {
        Ok(()) => 0,
        Err(e) => {
            let _ = writeln!(err, "{}", e);
            e.exit_code()
        }
    }
}
