//! Basic strategy table used as the reference advisor.
//!
//! Totals only; pairs and soft hands are read by their best value.

use crate::{Advice, Advisor};
use hitstand_engine::cards::Rank;
use hitstand_engine::hand::hand_value;

/// Basic strategy keyed on the player total and the dealer upcard value.
///
/// | total | upcard | advice |
/// |---|---|---|
/// | 17+ | any | stand |
/// | 13-16 | 2-6 | stand |
/// | 12-16 | 7-A | hit |
/// | 11 | any | double, else hit |
/// | 10 | 2-9 | double, else hit |
/// | 9 | 3-6 | double, else hit |
/// | 8 or less | any | hit |
/// | otherwise | | stand |
///
/// Aces up count 11.
///
/// ```rust
/// use hitstand_ai::baseline::BasicStrategy;
/// use hitstand_ai::{Advice, Advisor};
/// use hitstand_engine::cards::Rank;
///
/// let ai = BasicStrategy::new();
/// assert_eq!(ai.advise(&[Rank::Ten, Rank::Six], Rank::Seven), Advice::Hit);
/// assert_eq!(ai.advise(&[Rank::Ten, Rank::Six], Rank::Six), Advice::Stand);
/// ```
#[derive(Debug, Clone, Default)]
pub struct BasicStrategy;

impl BasicStrategy {
    pub fn new() -> Self {
        Self
    }

    /// Table lookup on raw values.
    pub fn decide(total: u32, upcard: u32) -> Advice {
        match (total, upcard) {
            (17.., _) => Advice::Stand,
            (13..=16, ..=6) => Advice::Stand,
            (12..=16, 7..) => Advice::Hit,
            (11, _) => Advice::DoubleOrHit,
            (10, ..=9) => Advice::DoubleOrHit,
            (9, 3..=6) => Advice::DoubleOrHit,
            (..=8, _) => Advice::Hit,
            _ => Advice::Stand,
        }
    }
}

impl Advisor for BasicStrategy {
    fn advise(&self, hand: &[Rank], dealer_upcard: Rank) -> Advice {
        Self::decide(hand_value(hand), dealer_upcard.value())
    }

    fn name(&self) -> &str {
        "basic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Rank::*;

    #[test]
    fn stiff_hands_depend_on_upcard() {
        let ai = BasicStrategy::new();
        for up in [Two, Three, Four, Five, Six] {
            assert_eq!(ai.advise(&[Ten, Three], up), Advice::Stand);
        }
        for up in [Seven, Eight, Nine, King, Ace] {
            assert_eq!(ai.advise(&[Ten, Six], up), Advice::Hit);
            assert_eq!(ai.advise(&[Ten, Two], up), Advice::Hit);
        }
    }

    #[test]
    fn twelve_against_small_card_stands() {
        assert_eq!(BasicStrategy::decide(12, 4), Advice::Stand);
    }

    #[test]
    fn doubling_totals() {
        assert_eq!(BasicStrategy::decide(11, 11), Advice::DoubleOrHit);
        assert_eq!(BasicStrategy::decide(10, 9), Advice::DoubleOrHit);
        assert_eq!(BasicStrategy::decide(10, 10), Advice::Stand);
        assert_eq!(BasicStrategy::decide(9, 3), Advice::DoubleOrHit);
        assert_eq!(BasicStrategy::decide(9, 2), Advice::Stand);
    }

    #[test]
    fn low_totals_hit_and_high_totals_stand() {
        for total in 4..=8 {
            assert_eq!(BasicStrategy::decide(total, 10), Advice::Hit);
        }
        for total in 17..=21 {
            assert_eq!(BasicStrategy::decide(total, 7), Advice::Stand);
        }
    }

    #[test]
    fn soft_hand_uses_best_total() {
        // A+7 is 18
        assert_eq!(BasicStrategy::new().advise(&[Ace, Seven], Nine), Advice::Stand);
    }
}
