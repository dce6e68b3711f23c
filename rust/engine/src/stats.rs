use serde::{Deserialize, Serialize};

use crate::outcome::Outcome;

/// Running totals over a series of resolved rounds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoundStats {
    pub rounds: u64,
    pub wins: u64,
    pub losses: u64,
    pub ties: u64,
    pub busts: u64,
    pub total_bet: u64,
    pub total_payout: u64,
    /// Payout minus stake over every round
    pub net: i64,
    /// Wins divided by rounds, 0.0 when nothing was played
    pub win_rate: f64,
}

impl RoundStats {
    pub fn record(&mut self, outcome: Outcome, bet: u32, payout: u32) {
        self.rounds += 1;
        match outcome {
            Outcome::Win => self.wins += 1,
            Outcome::Lose => self.losses += 1,
            Outcome::Tie => self.ties += 1,
            Outcome::Bust => self.busts += 1,
        }
        self.total_bet += u64::from(bet);
        self.total_payout += u64::from(payout);
        self.net += i64::from(payout) - i64::from(bet);
        self.win_rate = self.wins as f64 / self.rounds as f64;
    }

    /// Losses including busts.
    pub fn total_losses(&self) -> u64 {
        self.losses + self.busts
    }
}

impl FromIterator<(Outcome, u32, u32)> for RoundStats {
    fn from_iter<I: IntoIterator<Item = (Outcome, u32, u32)>>(iter: I) -> Self {
        let mut stats = RoundStats::default();
        for (outcome, bet, payout) in iter {
            stats.record(outcome, bet, payout);
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_stats_have_zero_win_rate() {
        let stats = RoundStats::default();
        assert_eq!(stats.win_rate, 0.0);
        assert_eq!(stats.net, 0);
    }

    #[test]
    fn tallies_outcomes_and_net() {
        let stats: RoundStats = [
            (Outcome::Win, 10, 20),
            (Outcome::Bust, 10, 0),
            (Outcome::Tie, 20, 20),
            (Outcome::Lose, 10, 0),
        ]
        .into_iter()
        .collect();
        assert_eq!(stats.rounds, 4);
        assert_eq!(stats.wins, 1);
        assert_eq!(stats.total_losses(), 2);
        assert_eq!(stats.ties, 1);
        assert_eq!(stats.net, -10);
        assert!((stats.win_rate - 0.25).abs() < f64::EPSILON);
    }
}
