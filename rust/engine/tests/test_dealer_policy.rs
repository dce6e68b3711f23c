use hitstand_engine::cards::Rank::*;
use hitstand_engine::dealer::{DEALER_STAND_VALUE, dealer_should_draw, play_dealer};
use hitstand_engine::deck::Deck;
use hitstand_engine::hand::hand_value;

#[test]
fn sixteen_takes_a_five_and_stops_on_21() {
    let mut dealer = vec![Ten, Six];
    let mut deck = Deck::from_ranks(vec![Five, Ten, Ten]);
    play_dealer(&mut dealer, &mut deck).expect("dealer plays");
    assert_eq!(dealer, vec![Ten, Six, Five]);
    assert_eq!(hand_value(&dealer), 21);
    assert_eq!(deck.remaining(), 2);
}

#[test]
fn seventeen_draws_nothing() {
    let mut dealer = vec![Ten, Seven];
    let mut deck = Deck::from_ranks(vec![Four]);
    assert_eq!(play_dealer(&mut dealer, &mut deck), Ok(0));
    assert_eq!(deck.remaining(), 1);
}

#[test]
fn dealer_may_bust_and_stops_there() {
    let mut dealer = vec![Ten, Two];
    let mut deck = Deck::from_ranks(vec![King, Five]);
    assert_eq!(play_dealer(&mut dealer, &mut deck), Ok(1));
    assert_eq!(hand_value(&dealer), 22);
}

#[test]
fn dealer_always_finishes_at_or_above_17_on_a_full_deck() {
    for seed in 0..200u64 {
        let mut deck = Deck::new_with_seed(seed);
        let mut dealer = vec![deck.draw().unwrap(), deck.draw().unwrap()];
        play_dealer(&mut dealer, &mut deck).unwrap();
        assert!(hand_value(&dealer) >= DEALER_STAND_VALUE);
        assert!(!dealer_should_draw(&dealer));
    }
}
