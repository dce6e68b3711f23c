use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};

use crate::cards::{full_deck, Rank};
use crate::errors::GameError;

/// Single-deck shoe: shuffled once, then dealt from the top in order.
///
/// The deck carries no RNG state so a half-dealt deck can be stored and
/// reloaded between requests; the seed it was shuffled with is kept for replay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deck {
    cards: Vec<Rank>,
    position: usize,
    #[serde(default)]
    seed: Option<u64>,
}

impl Deck {
    /// Full 52-card deck shuffled with a ChaCha20 stream seeded from `seed`.
    pub fn new_with_seed(seed: u64) -> Self {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        let mut cards = full_deck();
        cards.shuffle(&mut rng);
        Self {
            cards,
            position: 0,
            seed: Some(seed),
        }
    }

    /// Full deck shuffled from a fresh random seed.
    pub fn new() -> Self {
        Self::new_with_seed(rand::random())
    }

    /// Stacked deck dealt in exactly the given order (first element first).
    pub fn from_ranks(cards: Vec<Rank>) -> Self {
        Self {
            cards,
            position: 0,
            seed: None,
        }
    }

    pub fn draw(&mut self) -> Result<Rank, GameError> {
        let card = self
            .cards
            .get(self.position)
            .copied()
            .ok_or(GameError::EmptyDeck)?;
        self.position += 1;
        Ok(card)
    }

    pub fn remaining(&self) -> usize {
        self.cards.len().saturating_sub(self.position)
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }
}

impl Default for Deck {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stacked_deck_deals_in_order_then_errors() {
        let mut deck = Deck::from_ranks(vec![Rank::Ace, Rank::Five]);
        assert_eq!(deck.draw(), Ok(Rank::Ace));
        assert_eq!(deck.draw(), Ok(Rank::Five));
        assert_eq!(deck.draw(), Err(GameError::EmptyDeck));
        assert!(deck.is_empty());
    }

    #[test]
    fn serialized_deck_resumes_at_same_position() {
        let mut deck = Deck::new_with_seed(9);
        deck.draw().unwrap();
        deck.draw().unwrap();
        let json = serde_json::to_string(&deck).unwrap();
        let mut restored: Deck = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.remaining(), 50);
        assert_eq!(restored.draw(), deck.draw());
        assert_eq!(restored.seed(), Some(9));
    }
}
