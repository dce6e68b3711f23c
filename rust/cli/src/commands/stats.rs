//! Statistics aggregation over JSONL round records.
//!
//! Reads files written by `sim --output` (or the web history export) and
//! prints a [`RoundStats`] summary as JSON. Unparseable lines are reported
//! and skipped; records whose payout exceeds twice the stake cannot come
//! from an even-money table and are counted as corrupted.

use crate::error::CliError;
use crate::io_utils::read_text;
use crate::ui;
use hitstand_engine::logger::RoundRecord;
use hitstand_engine::stats::RoundStats;
use std::io::Write;

/// Aggregates statistics from a JSONL round history file.
///
/// # Errors
///
/// `CliError::InvalidInput` when the file cannot be read or holds no valid record.
pub fn handle_stats_command(
    input: String,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<(), CliError> {
    let content = match read_text(&input) {
        Ok(c) => c,
        Err(e) => {
            ui::write_error(err, &e)?;
            return Err(CliError::InvalidInput(e));
        }
    };

    let mut stats = RoundStats::default();
    let mut lines = 0u64;
    let mut corrupted = 0u64;
    for (n, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        lines += 1;
        let record: RoundRecord = parse_json_or_continue!(line, err, format!("line {}", n + 1));
        if u64::from(record.payout) > 2 * u64::from(record.total_bet) {
            corrupted += 1;
            continue;
        }
        stats.record(record.outcome, record.total_bet, record.payout);
    }

    let skipped = lines - stats.rounds;
    if skipped > 0 {
        ui::display_warning(
            err,
            &format!(
                "Skipped {} record(s) ({} with impossible payouts)",
                skipped, corrupted
            ),
        )?;
    }
    if stats.rounds == 0 {
        let msg = format!("No valid round records in {}", input);
        ui::write_error(err, &msg)?;
        return Err(CliError::InvalidInput(msg));
    }

    let json = serde_json::to_string_pretty(&stats).map_err(std::io::Error::other)?;
    writeln!(out, "{}", json)?;
    Ok(())
}
