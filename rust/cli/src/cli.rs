//! Command-line argument definitions.

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "hitstand",
    version,
    about = "Hitstand blackjack: play, simulate and inspect rounds"
)]
pub struct HitstandCli {
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Play blackjack interactively with strategy advice
    Play {
        /// Starting bankroll (defaults to configuration)
        #[arg(long)]
        bankroll: Option<u32>,
        /// Stop after this many rounds
        #[arg(long)]
        rounds: Option<u32>,
        #[arg(long)]
        seed: Option<u64>,
        /// Advisor shown on every decision (basic, mimic, random)
        #[arg(long)]
        advisor: Option<String>,
        /// Hide strategy advice
        #[arg(long)]
        no_advice: bool,
    },
    /// Deal a single round and show both starting hands
    Deal {
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Let an advisor play many rounds and report the results
    Sim {
        #[arg(long)]
        rounds: u32,
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long)]
        advisor: Option<String>,
        /// Flat bet for every round
        #[arg(long, default_value_t = hitstand_engine::rules::MIN_BET)]
        bet: u32,
        #[arg(long)]
        bankroll: Option<u32>,
        /// Write round records as JSONL
        #[arg(long)]
        output: Option<String>,
    },
    /// Summarize round records from a JSONL file
    Stats {
        #[arg(long)]
        input: String,
    },
    /// Compute the blackjack value of a hand, e.g. `value A A 9`
    Value {
        #[arg(required = true)]
        cards: Vec<String>,
    },
    /// Ask an advisor what to do with a hand against a dealer upcard
    Advise {
        #[arg(long)]
        upcard: String,
        #[arg(long)]
        advisor: Option<String>,
        #[arg(required = true)]
        cards: Vec<String>,
    },
    /// Show resolved configuration and where each value came from
    Cfg,
}
