use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::cards::Rank;
use crate::errors::GameError;

/// Smallest bet accepted at a default table
pub const MIN_BET: u32 = 10;
/// Largest bet accepted at a default table
pub const MAX_BET: u32 = 100;
/// Ceiling for a configured `max_bet`. A split with both hands doubled
/// stakes four bets and a full win credits twice that.
pub const MAX_TABLE_LIMIT: u32 = u32::MAX / 8;

/// Which starting pairs may be split.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitPolicy {
    /// Literal rank equality: 8-8 and K-K split, 10-K does not
    #[default]
    SameRank,
    /// Equal blackjack value: any two ten-value cards split
    SameValue,
}

impl SplitPolicy {
    pub fn allows(self, first: Rank, second: Rank) -> bool {
        match self {
            SplitPolicy::SameRank => first == second,
            SplitPolicy::SameValue => first.value() == second.value(),
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            SplitPolicy::SameRank => "same_rank",
            SplitPolicy::SameValue => "same_value",
        }
    }
}

impl fmt::Display for SplitPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SplitPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "same_rank" | "rank" => Ok(SplitPolicy::SameRank),
            "same_value" | "value" => Ok(SplitPolicy::SameValue),
            other => Err(format!(
                "unknown split policy '{}' (expected same_rank or same_value)",
                other
            )),
        }
    }
}

/// Table limits and house options for a round.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct TableRules {
    pub min_bet: u32,
    pub max_bet: u32,
    #[serde(default)]
    pub split_policy: SplitPolicy,
}

impl Default for TableRules {
    fn default() -> Self {
        Self {
            min_bet: MIN_BET,
            max_bet: MAX_BET,
            split_policy: SplitPolicy::default(),
        }
    }
}

impl TableRules {
    /// Checks the amount against the table limits only.
    pub fn validate_bet(&self, amount: u32) -> Result<(), GameError> {
        if amount < self.min_bet || amount > self.max_bet {
            return Err(GameError::InvalidAmount {
                amount,
                minimum: self.min_bet,
                maximum: self.max_bet,
            });
        }
        Ok(())
    }

    /// Validates a bet against the limits and the bankroll and returns the
    /// bankroll left after escrowing it.
    ///
    /// Limits are checked first, so an out-of-range bet is `InvalidAmount`
    /// even when the bankroll could not cover it either.
    pub fn place_bet(&self, bankroll: u32, amount: u32) -> Result<u32, GameError> {
        self.validate_bet(amount)?;
        escrow(bankroll, amount)
    }
}

/// Takes `amount` out of the bankroll without looking at table limits.
/// Used for the extra stake of a double-down or split.
pub fn escrow(bankroll: u32, amount: u32) -> Result<u32, GameError> {
    bankroll
        .checked_sub(amount)
        .ok_or(GameError::InsufficientFunds {
            required: amount,
            available: bankroll,
        })
}

/// [`TableRules::place_bet`] at the default 10..=100 table.
///
/// # Examples
///
/// ```
/// use hitstand_engine::rules::place_bet;
/// use hitstand_engine::errors::GameError;
///
/// assert_eq!(place_bet(1000, 50), Ok(950));
/// assert!(matches!(place_bet(1000, 9), Err(GameError::InvalidAmount { .. })));
/// assert!(matches!(place_bet(40, 50), Err(GameError::InsufficientFunds { .. })));
/// ```
pub fn place_bet(bankroll: u32, amount: u32) -> Result<u32, GameError> {
    TableRules::default().place_bet(bankroll, amount)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limits_are_inclusive() {
        let rules = TableRules::default();
        assert!(rules.validate_bet(10).is_ok());
        assert!(rules.validate_bet(100).is_ok());
        assert!(rules.validate_bet(9).is_err());
        assert!(rules.validate_bet(101).is_err());
    }

    #[test]
    fn bankroll_may_be_emptied_exactly() {
        assert_eq!(place_bet(50, 50), Ok(0));
    }

    #[test]
    fn out_of_range_wins_over_insufficient_funds() {
        assert!(matches!(
            place_bet(5, 500),
            Err(GameError::InvalidAmount { .. })
        ));
    }

    #[test]
    fn split_policies_differ_on_ten_value_pairs() {
        assert!(!SplitPolicy::SameRank.allows(Rank::Ten, Rank::King));
        assert!(SplitPolicy::SameValue.allows(Rank::Ten, Rank::King));
        assert!(SplitPolicy::SameRank.allows(Rank::Eight, Rank::Eight));
        assert!(!SplitPolicy::SameValue.allows(Rank::Ace, Rank::Two));
    }

    #[test]
    fn split_policy_parses_both_spellings() {
        assert_eq!("same-value".parse(), Ok(SplitPolicy::SameValue));
        assert_eq!("SAME_RANK".parse(), Ok(SplitPolicy::SameRank));
        assert!("pairs".parse::<SplitPolicy>().is_err());
    }
}
