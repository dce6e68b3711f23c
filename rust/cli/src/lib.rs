//! # Hitstand CLI Library
//!
//! Command-line interface for the hitstand blackjack engine. Exposes
//! subcommands for playing interactively, simulating advisor play, and
//! inspecting hands and round histories.
//!
//! ## Main Entry Point
//!
//! The primary entry point is the [`run`] function, which parses command-line
//! arguments and executes the appropriate subcommand. [`run_with_input`] does
//! the same with an injected input stream for the interactive `play` command.
//!
//! ## Example Usage
//!
//! ```no_run
//! use std::io;
//! let args = vec!["hitstand", "sim", "--rounds", "100", "--seed", "7"];
//! let code = hitstand_cli::run(args, &mut io::stdout(), &mut io::stderr());
//! assert_eq!(code, 0);
//! ```
//!
//! ## Available Subcommands
//!
//! - `play`: Play rounds at the terminal with basic-strategy advice
//! - `deal`: Deal a single round for inspection
//! - `sim`: Let an advisor play N rounds, optionally writing JSONL records
//! - `stats`: Aggregate statistics from JSONL round records
//! - `value`: Evaluate a hand
//! - `advise`: Ask an advisor for a move
//! - `cfg`: Display current configuration settings

use clap::Parser;
use std::io::{BufRead, Write};
#[macro_use]
mod macros;
pub mod cli;
mod commands;
pub mod config;
mod error;
pub mod exit_code;
pub mod formatters;
pub mod io_utils;
pub mod ui;
pub mod validation;

use cli::{Commands, HitstandCli};

use commands::{
    handle_advise_command, handle_cfg_command, handle_deal_command, handle_play_command,
    handle_sim_command, handle_stats_command, handle_value_command,
};

pub use commands::PlayOptions;
pub use error::CliError;

const COMMANDS: &[&str] = &["play", "deal", "sim", "stats", "value", "advise", "cfg"];

/// Main entry point for the CLI application.
///
/// Parses command-line arguments and dispatches to the appropriate subcommand
/// handler. `play` reads its input from the process stdin.
///
/// # Returns
///
/// Exit code: `0` for success, `2` for errors, `130` for interruptions
///
/// # Example
///
/// ```
/// use std::io;
/// let args = vec!["hitstand", "deal", "--seed", "42"];
/// let code = hitstand_cli::run(args, &mut io::stdout(), &mut io::stderr());
/// assert_eq!(code, 0);
/// ```
pub fn run<I, S>(args: I, out: &mut dyn Write, err: &mut dyn Write) -> i32
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let stdin = std::io::stdin();
    let mut stdin_lock = stdin.lock();
    run_with_input(args, &mut stdin_lock, out, err)
}

/// [`run`] with an explicit input stream.
pub fn run_with_input<I, S>(
    args: I,
    input: &mut dyn BufRead,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> i32
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let argv: Vec<String> = args.into_iter().map(|s| s.as_ref().to_string()).collect();

    let cli = match HitstandCli::try_parse_from(&argv) {
        Ok(cli) => cli,
        Err(e) => return report_usage_error(e, out, err),
    };

    let result = match cli.cmd {
        Commands::Play {
            bankroll,
            rounds,
            seed,
            advisor,
            no_advice,
        } => {
            let opts = PlayOptions {
                bankroll,
                rounds,
                seed,
                advisor,
                show_advice: !no_advice,
            };
            handle_play_command(opts, input, out, err)
        }
        Commands::Deal { seed } => handle_deal_command(seed, out),
        Commands::Sim {
            rounds,
            seed,
            advisor,
            bet,
            bankroll,
            output,
        } => handle_sim_command(rounds, seed, advisor, bet, bankroll, output, out, err),
        Commands::Stats { input } => handle_stats_command(input, out, err),
        Commands::Value { cards } => handle_value_command(&cards, out),
        Commands::Advise {
            upcard,
            advisor,
            cards,
        } => handle_advise_command(&cards, &upcard, advisor.as_deref(), out),
        Commands::Cfg => handle_cfg_command(out, err),
    };

    match result {
        Ok(()) => exit_code::SUCCESS,
        Err(e @ CliError::Interrupted(_)) => {
            write_or_exit!(err, "{}", e);
            exit_code::INTERRUPTED
        }
        Err(e) => {
            write_or_exit!(err, "Error: {}", e);
            exit_code::ERROR
        }
    }
}

fn report_usage_error(e: clap::Error, out: &mut dyn Write, err: &mut dyn Write) -> i32 {
    use clap::error::ErrorKind;

    // Help and version should print to stdout and exit 0
    match e.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
            write_or_exit!(out, "{}", e);
            exit_code::SUCCESS
        }
        _ => {
            write_or_exit!(err, "{}", e);
            write_or_exit!(err, "Hitstand Blackjack CLI");
            write_or_exit!(err, "Usage: hitstand <command> [options]\n");
            write_or_exit!(err, "Commands:");
            for c in COMMANDS {
                write_or_exit!(err, "  {}", c);
            }
            write_or_exit!(err, "\nFor full help, run: hitstand --help");
            exit_code::ERROR
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_listed_command_parses() {
        let commands = vec![
            vec!["hitstand", "play"],
            vec!["hitstand", "deal"],
            vec!["hitstand", "sim", "--rounds", "1"],
            vec!["hitstand", "stats", "--input", "rounds.jsonl"],
            vec!["hitstand", "value", "A", "K"],
            vec!["hitstand", "advise", "--upcard", "9", "6", "5"],
            vec!["hitstand", "cfg"],
        ];
        assert_eq!(commands.len(), COMMANDS.len());
        for cmd_args in commands {
            let result = HitstandCli::try_parse_from(&cmd_args);
            assert!(result.is_ok(), "Failed to parse: {:?}", cmd_args);
        }
    }

    #[test]
    fn value_requires_cards() {
        assert!(HitstandCli::try_parse_from(["hitstand", "value"]).is_err());
    }

    #[test]
    fn unknown_command_lists_commands_and_exits_2() {
        let mut out = Vec::new();
        let mut err = Vec::new();
        let code = run(["hitstand", "bogus"], &mut out, &mut err);
        assert_eq!(code, exit_code::ERROR);
        let stderr = String::from_utf8(err).unwrap();
        for c in COMMANDS {
            assert!(stderr.contains(c), "missing {}", c);
        }
    }

    #[test]
    fn help_goes_to_stdout() {
        let mut out = Vec::new();
        let mut err = Vec::new();
        let code = run(["hitstand", "--help"], &mut out, &mut err);
        assert_eq!(code, 0);
        assert!(String::from_utf8(out).unwrap().contains("Usage"));
    }
}
