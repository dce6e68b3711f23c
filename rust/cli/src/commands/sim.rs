//! Simulation command handler.
//!
//! Lets an advisor play a series of rounds at a flat bet, optionally writing
//! every round to a JSONL file, and prints the aggregate result.
//!
//! # Examples
//!
//! ```no_run
//! use std::io;
//!
//! let args = ["hitstand", "sim", "--rounds", "1000", "--seed", "42", "--output", "data/sim.jsonl"];
//! let code = hitstand_cli::run(args, &mut io::stdout(), &mut io::stderr());
//! assert_eq!(code, 0);
//! ```

use crate::commands::{advisor_by_name, load_config, seed_stream};
use crate::error::CliError;
use crate::formatters::format_net;
use crate::io_utils::ensure_parent_dir;
use crate::ui;
use hitstand_ai::recommend;
use hitstand_engine::deck::Deck;
use hitstand_engine::logger::{RoundLogger, RoundRecord};
use hitstand_engine::round::Round;
use hitstand_engine::rules::TableRules;
use hitstand_engine::stats::RoundStats;
use rand::RngCore;
use std::io::Write;
use std::path::Path;

/// Handle the sim command.
///
/// Each round draws its deck seed from a stream seeded by `seed`, so two runs
/// with the same seed, advisor and bet produce identical records. The session
/// stops early once the bankroll cannot cover the bet.
///
/// # Errors
///
/// `CliError::InvalidInput` for zero rounds, a bet outside the table limits
/// or an unknown advisor; `CliError::Io` when the output file cannot be written.
#[allow(clippy::too_many_arguments)]
pub fn handle_sim_command(
    rounds: u32,
    seed: Option<u64>,
    advisor: Option<String>,
    bet: u32,
    bankroll: Option<u32>,
    output: Option<String>,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<(), CliError> {
    if rounds == 0 {
        ui::write_error(err, "rounds must be >= 1")?;
        return Err(CliError::InvalidInput("rounds must be >= 1".to_string()));
    }
    let cfg = load_config()?;
    let rules = TableRules {
        split_policy: cfg.split_policy,
        ..TableRules::default()
    };
    if let Err(e) = rules.validate_bet(bet) {
        ui::write_error(err, &e.to_string())?;
        return Err(CliError::InvalidInput(e.to_string()));
    }
    let advisor = advisor_by_name(advisor.as_deref().unwrap_or(&cfg.advisor))?;
    let mut bankroll = bankroll.unwrap_or(cfg.starting_bankroll);
    let seed = seed.or(cfg.seed).unwrap_or_else(rand::random);
    let mut seeds = seed_stream(seed);

    let mut logger = match output.as_deref() {
        Some(p) => {
            if let Err(e) = ensure_parent_dir(Path::new(p)) {
                ui::write_error(err, &e)?;
                return Err(CliError::Io(std::io::Error::other(e)));
            }
            Some(RoundLogger::create(p).map_err(|e| {
                let _ = ui::write_error(err, &format!("Failed to open output file: {}", e));
                CliError::Io(e)
            })?)
        }
        None => None,
    };

    writeln!(
        out,
        "sim: rounds={} seed={} advisor={} bet={} bankroll={}",
        rounds,
        seed,
        advisor.name(),
        bet,
        bankroll
    )?;

    let mut stats = RoundStats::default();
    for _ in 0..rounds {
        if bankroll < bet {
            ui::display_warning(
                err,
                &format!(
                    "Bankroll {} cannot cover bet {}; stopped after {} rounds",
                    bankroll, bet, stats.rounds
                ),
            )?;
            break;
        }
        let mut round = Round::new(Deck::new_with_seed(seeds.next_u64()), rules);
        round.place_bet(&mut bankroll, bet)?;
        let mut actions = Vec::new();
        while let Some(action) = recommend(advisor.as_ref(), &round, bankroll) {
            round.apply(action, &mut bankroll)?;
            actions.push(action);
        }
        if let Some(outcome) = round.outcome() {
            stats.record(outcome, round.total_bet(), round.total_payout());
        }
        if let Some(logger) = logger.as_mut() {
            let id = logger.next_id();
            if let Some(record) = RoundRecord::from_round(id, &round, actions, bankroll) {
                logger.write(&record)?;
            }
        }
    }

    writeln!(out, "Rounds played: {}", stats.rounds)?;
    writeln!(
        out,
        "Wins: {}  Losses: {}  Ties: {}  Busts: {}",
        stats.wins, stats.losses, stats.ties, stats.busts
    )?;
    writeln!(out, "Win rate: {:.1}%", stats.win_rate * 100.0)?;
    writeln!(out, "Net: {}", format_net(stats.net))?;
    writeln!(out, "Final bankroll: {}", bankroll)?;
    if let Some(p) = output {
        writeln!(out, "Records written to {}", p)?;
    }
    Ok(())
}
