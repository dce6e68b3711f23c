//! Stateless dealing primitives.
//!
//! These are the building blocks the [`crate::round::Round`] state machine is
//! made of, exposed for callers that drive a hand themselves (the terminal
//! `deal` command, simulations, tests).

use crate::cards::Rank;
use crate::deck::Deck;
use crate::errors::GameError;
use crate::dealer::play_dealer;

/// Shuffles a fresh deck and deals player, player, dealer, dealer.
///
/// # Examples
///
/// ```
/// use hitstand_engine::engine::deal_initial;
///
/// let (deck, player, dealer) = deal_initial(Some(7)).unwrap();
/// assert_eq!(player.len(), 2);
/// assert_eq!(dealer.len(), 2);
/// assert_eq!(deck.remaining(), 48);
/// ```
pub fn deal_initial(seed: Option<u64>) -> Result<(Deck, Vec<Rank>, Vec<Rank>), GameError> {
    let mut deck = match seed {
        Some(seed) => Deck::new_with_seed(seed),
        None => Deck::new(),
    };
    let (player, dealer) = deal_from(&mut deck)?;
    Ok((deck, player, dealer))
}

/// Deals the two starting hands from an existing deck.
pub fn deal_from(deck: &mut Deck) -> Result<(Vec<Rank>, Vec<Rank>), GameError> {
    let mut player = Vec::with_capacity(4);
    let mut dealer = Vec::with_capacity(4);
    player.push(deck.draw()?);
    player.push(deck.draw()?);
    dealer.push(deck.draw()?);
    dealer.push(deck.draw()?);
    Ok((player, dealer))
}

/// Draws one card into `hand` and returns it.
pub fn hit(deck: &mut Deck, hand: &mut Vec<Rank>) -> Result<Rank, GameError> {
    let card = deck.draw()?;
    hand.push(card);
    Ok(card)
}

/// Plays out the dealer hand under the stand-on-17 policy.
pub fn stand<'a>(deck: &mut Deck, dealer: &'a mut Vec<Rank>) -> Result<&'a [Rank], GameError> {
    play_dealer(dealer, deck)?;
    Ok(dealer.as_slice())
}
