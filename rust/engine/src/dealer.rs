use crate::cards::Rank;
use crate::deck::Deck;
use crate::errors::GameError;
use crate::hand::hand_value;

/// The dealer draws on anything below this total and stands on it or above,
/// soft totals included.
pub const DEALER_STAND_VALUE: u32 = 17;

pub fn dealer_should_draw(cards: &[Rank]) -> bool {
    hand_value(cards) < DEALER_STAND_VALUE
}

/// Completes the dealer hand in place. Returns the number of cards drawn.
///
/// # Errors
///
/// [`GameError::EmptyDeck`] if the deck runs out mid-draw; the cards drawn
/// before that point stay in the hand.
pub fn play_dealer(cards: &mut Vec<Rank>, deck: &mut Deck) -> Result<usize, GameError> {
    let mut drawn = 0;
    while dealer_should_draw(cards) {
        cards.push(deck.draw()?);
        drawn += 1;
    }
    Ok(drawn)
}
