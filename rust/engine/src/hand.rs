use serde::{Deserialize, Serialize};

use crate::cards::Rank;

/// Best possible total; anything above busts.
pub const BLACKJACK: u32 = 21;

/// Amount an ace loses when it drops from 11 to 1.
const ACE_REDUCTION: u32 = 10;

/// Computes the blackjack value of a hand.
///
/// Every ace starts at 11; while the total exceeds 21 and an ace is still
/// counted high, one ace at a time drops to 1. Each drop is worth exactly 10,
/// so the greedy reduction always lands on the best total not over 21 (or the
/// smallest bust when every reading busts).
///
/// # Examples
///
/// ```
/// use hitstand_engine::cards::Rank;
/// use hitstand_engine::hand::hand_value;
///
/// assert_eq!(hand_value(&[Rank::Ace, Rank::Ace, Rank::Nine]), 21);
/// assert_eq!(hand_value(&[Rank::King, Rank::Queen, Rank::Two]), 22);
/// ```
pub fn hand_value(cards: &[Rank]) -> u32 {
    let (total, _) = value_with_soft_aces(cards);
    total
}

/// Returns the total together with the number of aces still counted as 11.
fn value_with_soft_aces(cards: &[Rank]) -> (u32, usize) {
    let mut total: u32 = cards.iter().map(|r| r.value()).sum();
    let mut high_aces = cards.iter().filter(|r| r.is_ace()).count();
    while total > BLACKJACK && high_aces > 0 {
        total -= ACE_REDUCTION;
        high_aces -= 1;
    }
    (total, high_aces)
}

pub fn is_bust(cards: &[Rank]) -> bool {
    hand_value(cards) > BLACKJACK
}

/// A natural: 21 on exactly two cards. Pays like any other win.
pub fn is_blackjack(cards: &[Rank]) -> bool {
    cards.len() == 2 && hand_value(cards) == BLACKJACK
}

/// True while at least one ace is still counted as 11.
pub fn is_soft(cards: &[Rank]) -> bool {
    let (total, high_aces) = value_with_soft_aces(cards);
    high_aces > 0 && total <= BLACKJACK
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandStatus {
    /// Still accepting hit/stand/double
    Playing,
    /// Finished at or below 21
    Stood,
    /// Finished over 21
    Busted,
}

/// One of the player's hands: the original, or a sub-hand created by a split.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerHand {
    pub cards: Vec<Rank>,
    /// Stake escrowed for this hand (doubles on double-down)
    pub bet: u32,
    pub doubled: bool,
    pub status: HandStatus,
}

impl PlayerHand {
    pub fn new(cards: Vec<Rank>, bet: u32) -> Self {
        Self {
            cards,
            bet,
            doubled: false,
            status: HandStatus::Playing,
        }
    }

    pub fn value(&self) -> u32 {
        hand_value(&self.cards)
    }

    pub fn is_soft(&self) -> bool {
        is_soft(&self.cards)
    }

    pub fn is_blackjack(&self) -> bool {
        is_blackjack(&self.cards)
    }

    pub fn is_busted(&self) -> bool {
        self.status == HandStatus::Busted
    }

    pub fn is_playing(&self) -> bool {
        self.status == HandStatus::Playing
    }

    /// Double-down is only offered on the two starting cards.
    pub fn can_double(&self) -> bool {
        self.is_playing() && !self.doubled && self.cards.len() == 2
    }

    /// Adds a card and busts the hand when it goes over 21.
    pub(crate) fn receive(&mut self, card: Rank) {
        self.cards.push(card);
        if is_bust(&self.cards) {
            self.status = HandStatus::Busted;
        }
    }

    pub(crate) fn stand(&mut self) {
        if self.is_playing() {
            self.status = HandStatus::Stood;
        }
    }
}
