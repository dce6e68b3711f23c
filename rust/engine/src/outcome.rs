use serde::{Deserialize, Serialize};
use std::fmt;

use crate::cards::Rank;
use crate::errors::GameError;
use crate::hand::{hand_value, BLACKJACK};

/// Result of one player hand against the dealer.
/// `Bust` is a loss caused by the player going over 21.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Win,
    Lose,
    Tie,
    Bust,
}

impl Outcome {
    pub const fn as_str(self) -> &'static str {
        match self {
            Outcome::Win => "win",
            Outcome::Lose => "lose",
            Outcome::Tie => "tie",
            Outcome::Bust => "bust",
        }
    }

    /// Amount credited back to the bankroll for a hand staked with `bet`,
    /// `None` when a win would not fit in a `u32`.
    pub const fn credit(self, bet: u32) -> Option<u32> {
        match self {
            Outcome::Win => bet.checked_mul(2),
            Outcome::Tie => Some(bet),
            Outcome::Lose | Outcome::Bust => Some(0),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Settlement of one finished hand.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub struct Settlement {
    pub outcome: Outcome,
    pub player_value: u32,
    pub dealer_value: u32,
    pub bet: u32,
    /// Credited back to the bankroll (stake included)
    pub payout: u32,
}

/// Compares a finished player hand with the finished dealer hand.
///
/// A player bust loses before the dealer total is looked at. A two-card 21
/// is settled like any other winning total. Fails with
/// [`GameError::PayoutOverflow`] when the winning credit does not fit.
///
/// # Examples
///
/// ```
/// use hitstand_engine::cards::Rank;
/// use hitstand_engine::outcome::{resolve, Outcome};
///
/// let s = resolve(&[Rank::King, Rank::Queen], &[Rank::King, Rank::Nine], 50).unwrap();
/// assert_eq!(s.outcome, Outcome::Win);
/// assert_eq!(s.payout, 100);
/// ```
pub fn resolve(player: &[Rank], dealer: &[Rank], bet: u32) -> Result<Settlement, GameError> {
    let player_value = hand_value(player);
    let dealer_value = hand_value(dealer);
    let outcome = compare_values(player_value, dealer_value);
    let payout = outcome
        .credit(bet)
        .ok_or(GameError::PayoutOverflow { stake: bet })?;
    Ok(Settlement {
        outcome,
        player_value,
        dealer_value,
        bet,
        payout,
    })
}

/// Outcome for a pair of totals.
pub fn compare_values(player: u32, dealer: u32) -> Outcome {
    if player > BLACKJACK {
        Outcome::Bust
    } else if dealer > BLACKJACK || player > dealer {
        Outcome::Win
    } else if player < dealer {
        Outcome::Lose
    } else {
        Outcome::Tie
    }
}

/// Collapses the settlements of every hand in a round into one outcome.
///
/// A single hand keeps its own outcome. With split hands the round is a bust
/// only when every hand busted; otherwise the total credit is compared with
/// the total stake.
pub fn summarize(settlements: &[Settlement]) -> Option<Outcome> {
    match settlements {
        [] => None,
        [only] => Some(only.outcome),
        many => {
            if many.iter().all(|s| s.outcome == Outcome::Bust) {
                return Some(Outcome::Bust);
            }
            let staked: u32 = many.iter().map(|s| s.bet).sum();
            let credited: u32 = many.iter().map(|s| s.payout).sum();
            Some(match credited.cmp(&staked) {
                std::cmp::Ordering::Greater => Outcome::Win,
                std::cmp::Ordering::Equal => Outcome::Tie,
                std::cmp::Ordering::Less => Outcome::Lose,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Rank::*;

    #[test]
    fn player_bust_loses_even_when_dealer_busts() {
        let s = resolve(&[King, Queen, Five], &[King, Six, Nine], 20).unwrap();
        assert_eq!(s.outcome, Outcome::Bust);
        assert_eq!(s.payout, 0);
    }

    #[test]
    fn equal_totals_push() {
        let s = resolve(&[King, Eight], &[Nine, Nine], 30).unwrap();
        assert_eq!(s.outcome, Outcome::Tie);
        assert_eq!(s.payout, 30);
    }

    #[test]
    fn natural_pays_even_money() {
        let s = resolve(&[Ace, King], &[King, Queen], 10).unwrap();
        assert_eq!(s.outcome, Outcome::Win);
        assert_eq!(s.payout, 20);
    }

    #[test]
    fn split_round_summary_compares_credit_with_stake() {
        let win = resolve(&[King, Queen], &[King, Eight], 10).unwrap();
        let lose = resolve(&[King, Seven], &[King, Eight], 10).unwrap();
        let tie = resolve(&[King, Eight], &[King, Eight], 10).unwrap();
        assert_eq!(summarize(&[win, lose]), Some(Outcome::Tie));
        assert_eq!(summarize(&[win, tie]), Some(Outcome::Win));
        assert_eq!(summarize(&[lose, tie]), Some(Outcome::Lose));
        assert_eq!(summarize(&[]), None);
    }

    #[test]
    fn winning_credit_that_overflows_is_an_error() {
        assert_eq!(Outcome::Win.credit(u32::MAX / 2), Some(u32::MAX - 1));
        assert_eq!(Outcome::Win.credit(u32::MAX / 2 + 1), None);
        assert_eq!(Outcome::Tie.credit(u32::MAX), Some(u32::MAX));
        assert!(matches!(
            resolve(&[King, Queen], &[King, Nine], u32::MAX),
            Err(GameError::PayoutOverflow { .. })
        ));
        assert!(resolve(&[King, Six], &[King, Nine], u32::MAX).is_ok());
    }

    #[test]
    fn outcome_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Outcome::Bust).unwrap(), "\"bust\"");
    }
}
