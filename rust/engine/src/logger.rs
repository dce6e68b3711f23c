use serde::{Deserialize, Serialize};

use crate::cards::Rank;
use crate::outcome::Outcome;
use crate::round::{PlayerAction, Round};

/// One finished player hand inside a [`RoundRecord`].
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct HandSummary {
    pub cards: Vec<Rank>,
    pub value: u32,
    pub bet: u32,
    #[serde(default)]
    pub doubled: bool,
    pub outcome: Outcome,
    pub payout: u32,
}

/// Complete record of a resolved round.
/// Serialized to JSONL for round history and simulation output.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct RoundRecord {
    /// Unique identifier (format: YYYYMMDD-NNNNNN)
    pub round_id: String,
    /// Seed the deck was shuffled with; absent for stacked decks
    pub seed: Option<u64>,
    /// Player decisions in the order they were taken
    #[serde(default)]
    pub actions: Vec<PlayerAction>,
    pub hands: Vec<HandSummary>,
    pub dealer: Vec<Rank>,
    pub dealer_value: u32,
    pub total_bet: u32,
    pub payout: u32,
    pub outcome: Outcome,
    pub bankroll_after: u32,
    /// RFC3339 timestamp
    #[serde(default)]
    pub ts: Option<String>,
}

impl RoundRecord {
    /// Builds a record from a resolved round; `None` while the round is still open.
    pub fn from_round(
        round_id: String,
        round: &Round,
        actions: Vec<PlayerAction>,
        bankroll_after: u32,
    ) -> Option<Self> {
        let outcome = round.outcome()?;
        let hands = round
            .hands()
            .iter()
            .zip(round.settlements())
            .map(|(hand, settlement)| HandSummary {
                cards: hand.cards.clone(),
                value: settlement.player_value,
                bet: hand.bet,
                doubled: hand.doubled,
                outcome: settlement.outcome,
                payout: settlement.payout,
            })
            .collect();
        Some(Self {
            round_id,
            seed: round.deck_seed(),
            actions,
            hands,
            dealer: round.dealer_cards().to_vec(),
            dealer_value: round.dealer_value(),
            total_bet: round.total_bet(),
            payout: round.total_payout(),
            outcome,
            bankroll_after,
            ts: None,
        })
    }

    pub fn net(&self) -> i64 {
        i64::from(self.payout) - i64::from(self.total_bet)
    }
}

pub fn format_round_id(yyyymmdd: &str, seq: u32) -> String {
    format!("{}-{:06}", yyyymmdd, seq)
}

use chrono::{SecondsFormat, Utc};
use std::fs::{create_dir_all, File};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Appends [`RoundRecord`]s to a JSONL file and hands out sequential ids.
pub struct RoundLogger {
    writer: Option<BufWriter<File>>,
    date: String,
    seq: u32,
}

impl RoundLogger {
    pub fn create<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                create_dir_all(parent)?;
            }
        }
        let f = File::create(path)?;
        Ok(Self {
            writer: Some(BufWriter::new(f)),
            date: Utc::now().format("%Y%m%d").to_string(),
            seq: 0,
        })
    }

    /// Logger with no output file, for id generation in tests.
    pub fn with_seq_for_test(date: &str) -> Self {
        Self {
            writer: None,
            date: date.to_string(),
            seq: 0,
        }
    }

    pub fn next_id(&mut self) -> String {
        self.seq += 1;
        format_round_id(&self.date, self.seq)
    }

    pub fn write(&mut self, record: &RoundRecord) -> std::io::Result<()> {
        let mut rec = record.clone();
        if rec.ts.is_none() {
            rec.ts = Some(Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true));
        }
        let line = serde_json::to_string(&rec).map_err(std::io::Error::other)?;
        if let Some(w) = &mut self.writer {
            w.write_all(line.as_bytes())?;
            w.write_all(b"\n")?;
            w.flush()?;
        }
        Ok(())
    }
}
