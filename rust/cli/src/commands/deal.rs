//! Deal a single round for inspection.

use crate::error::CliError;
use crate::formatters::format_hand;
use hitstand_engine::engine::deal_initial;
use std::io::Write;

/// Deals the opening four cards from a fresh deck and shows both hands face up.
pub fn handle_deal_command(seed: Option<u64>, out: &mut dyn Write) -> Result<(), CliError> {
    let seed = seed.unwrap_or_else(rand::random);
    let (deck, player, dealer) = deal_initial(Some(seed))?;
    writeln!(out, "Seed: {}", seed)?;
    writeln!(out, "Player: {}", format_hand(&player))?;
    writeln!(out, "Dealer: {}", format_hand(&dealer))?;
    writeln!(out, "Deck remaining: {}", deck.remaining())?;
    Ok(())
}
