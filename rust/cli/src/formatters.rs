//! Text formatting for hands and round results.

use hitstand_engine::cards::{format_ranks, Rank};
use hitstand_engine::hand::{hand_value, is_blackjack, is_soft};
use hitstand_engine::outcome::Outcome;
use hitstand_engine::round::Round;

/// `A 7 (18, soft)`, `A K (21, blackjack)`, `K Q 5 (25, bust)`.
pub fn format_hand(cards: &[Rank]) -> String {
    let value = hand_value(cards);
    let tag = if is_blackjack(cards) {
        ", blackjack"
    } else if value > 21 {
        ", bust"
    } else if is_soft(cards) {
        ", soft"
    } else {
        ""
    };
    format!("{} ({}{})", format_ranks(cards), value, tag)
}

/// Dealer line while the hole card is still face down.
pub fn format_dealer_upcard(round: &Round) -> String {
    match round.dealer_upcard() {
        Some(up) => format!("{} ??", up),
        None => "-".to_string(),
    }
}

/// Signed chip delta, e.g. `+50`, `-10`, `0`.
pub fn format_net(net: i64) -> String {
    if net > 0 {
        format!("+{}", net)
    } else {
        net.to_string()
    }
}

pub fn outcome_label(outcome: Outcome) -> &'static str {
    match outcome {
        Outcome::Win => "You win!",
        Outcome::Lose => "Dealer wins.",
        Outcome::Tie => "Push.",
        Outcome::Bust => "Bust!",
    }
}
