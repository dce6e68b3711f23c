//! `value` and `advise`: one-shot hand evaluation.

use crate::commands::{advisor_by_name, load_config};
use crate::error::CliError;
use crate::formatters::format_hand;
use crate::validation::parse_cards;
use hitstand_engine::cards::{ParseRankError, Rank};
use std::io::Write;

fn cards_arg(symbols: &[String]) -> Result<Vec<Rank>, CliError> {
    let cards = parse_cards(symbols).map_err(CliError::InvalidInput)?;
    if cards.is_empty() {
        return Err(CliError::InvalidInput("no cards given".to_string()));
    }
    Ok(cards)
}

pub fn handle_value_command(symbols: &[String], out: &mut dyn Write) -> Result<(), CliError> {
    let cards = cards_arg(symbols)?;
    writeln!(out, "{}", format_hand(&cards))?;
    Ok(())
}

/// Asks an advisor (configured default when `advisor` is `None`) for the next move.
pub fn handle_advise_command(
    symbols: &[String],
    upcard: &str,
    advisor: Option<&str>,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    let cards = cards_arg(symbols)?;
    let upcard: Rank = upcard
        .parse()
        .map_err(|e: ParseRankError| CliError::InvalidInput(e.to_string()))?;
    let advisor = match advisor {
        Some(name) => advisor_by_name(name)?,
        None => advisor_by_name(&load_config()?.advisor)?,
    };
    writeln!(
        out,
        "{} vs {}: {} ({})",
        format_hand(&cards),
        upcard,
        advisor.advise(&cards, upcard),
        advisor.name()
    )?;
    Ok(())
}
