use std::collections::HashMap;

use hitstand_engine::cards::{COPIES_PER_RANK, DECK_SIZE, Rank};
use hitstand_engine::deck::Deck;
use hitstand_engine::errors::GameError;

fn drain(deck: &mut Deck) -> Vec<Rank> {
    std::iter::from_fn(|| deck.draw().ok()).collect()
}

#[test]
fn fresh_deck_holds_four_of_every_rank() {
    let mut deck = Deck::new_with_seed(42);
    let cards = drain(&mut deck);
    assert_eq!(cards.len(), DECK_SIZE);
    let mut counts: HashMap<Rank, usize> = HashMap::new();
    for c in cards {
        *counts.entry(c).or_default() += 1;
    }
    assert_eq!(counts.len(), 13);
    assert!(counts.values().all(|&n| n == COPIES_PER_RANK));
}

#[test]
fn exhausted_deck_reports_empty_deck() {
    let mut deck = Deck::new_with_seed(1);
    drain(&mut deck);
    assert_eq!(deck.draw(), Err(GameError::EmptyDeck));
}

#[test]
fn shuffle_is_deterministic_with_same_seed() {
    let mut d1 = Deck::new_with_seed(12345);
    let mut d2 = Deck::new_with_seed(12345);
    assert_eq!(drain(&mut d1), drain(&mut d2), "same seed must yield identical order");
}

#[test]
fn shuffle_differs_with_different_seed() {
    let mut d1 = Deck::new_with_seed(1);
    let mut d2 = Deck::new_with_seed(2);
    assert_ne!(drain(&mut d1), drain(&mut d2));
}
