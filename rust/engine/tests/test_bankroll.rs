use hitstand_engine::cards::Rank::*;
use hitstand_engine::deck::Deck;
use hitstand_engine::errors::{ErrorKind, GameError};
use hitstand_engine::outcome::Outcome;
use hitstand_engine::round::{Round, RoundPhase};
use hitstand_engine::rules::{TableRules, place_bet};

#[test]
fn bet_is_escrowed_then_settled() {
    let cases = [
        // player 10+K=20 vs dealer 9+10=19
        (vec![Ten, King, Nine, Ten], Outcome::Win, 1050),
        // 18 vs 18
        (vec![Ten, Eight, Nine, Nine], Outcome::Tie, 1000),
        // 17 vs 20
        (vec![Ten, Seven, Ten, Queen], Outcome::Lose, 950),
    ];
    for (cards, outcome, expected) in cases {
        let mut round = Round::new(Deck::from_ranks(cards), TableRules::default());
        let mut bankroll = 1000;
        round.place_bet(&mut bankroll, 50).unwrap();
        assert_eq!(bankroll, 950);
        round.stand(&mut bankroll).unwrap();
        assert_eq!(round.outcome(), Some(outcome));
        assert_eq!(bankroll, expected);
    }
}

#[test]
fn out_of_range_bets_are_invalid_amount() {
    for amount in [0, 9, 101, 1000] {
        let mut round = Round::new(Deck::new_with_seed(3), TableRules::default());
        let mut bankroll = 1000;
        let err = round.place_bet(&mut bankroll, amount).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidAmount);
        assert_eq!(bankroll, 1000);
        assert_eq!(round.phase(), RoundPhase::AwaitingBet);
    }
}

#[test]
fn bet_over_bankroll_is_insufficient_funds() {
    assert_eq!(
        place_bet(30, 40),
        Err(GameError::InsufficientFunds {
            required: 40,
            available: 30
        })
    );
}

#[test]
fn custom_limits_are_honoured() {
    let rules = TableRules {
        min_bet: 5,
        max_bet: 500,
        ..TableRules::default()
    };
    assert_eq!(rules.place_bet(1000, 500), Ok(500));
    assert_eq!(rules.place_bet(1000, 5), Ok(995));
    assert!(rules.place_bet(1000, 4).is_err());
}

fn unlimited_table() -> TableRules {
    TableRules {
        min_bet: 1,
        max_bet: u32::MAX,
        ..TableRules::default()
    }
}

#[test]
fn bet_whose_win_cannot_be_credited_is_refused() {
    let mut round = Round::new(Deck::from_ranks(vec![Six, Five, Ten, Seven, Ten]), unlimited_table());
    let mut bankroll = 4_000_000_000;
    let err = round.place_bet(&mut bankroll, 1_500_000_000).unwrap_err();
    assert_eq!(err, GameError::PayoutOverflow { stake: 1_500_000_000 });
    assert_eq!(err.kind(), ErrorKind::InvalidAmount);
    assert_eq!(bankroll, 4_000_000_000);
    assert_eq!(round.phase(), RoundPhase::AwaitingBet);
}

#[test]
fn double_that_could_overflow_the_bankroll_leaves_the_round_untouched() {
    // player 6+5=11 vs dealer 10+7=17, a ten waiting for the double
    let mut round = Round::new(Deck::from_ranks(vec![Six, Five, Ten, Seven, Ten]), unlimited_table());
    let mut bankroll = 3_000_000_000;
    round.place_bet(&mut bankroll, 1_000_000_000).unwrap();
    assert_eq!(bankroll, 2_000_000_000);

    let err = round.double_down(&mut bankroll).unwrap_err();
    assert!(matches!(err, GameError::PayoutOverflow { .. }));
    assert_eq!(bankroll, 2_000_000_000);
    assert_eq!(round.phase(), RoundPhase::InPlay);
    assert_eq!(round.hands()[0].bet, 1_000_000_000);
    assert!(!round.hands()[0].doubled);

    round.stand(&mut bankroll).unwrap();
    assert_eq!(round.outcome(), Some(Outcome::Lose));
    assert_eq!(bankroll, 2_000_000_000);
}

#[test]
fn large_winning_bet_settles_exactly() {
    // 20 vs 17
    let mut round = Round::new(Deck::from_ranks(vec![Ten, King, Ten, Seven]), unlimited_table());
    let mut bankroll = 3_000_000_000;
    round.place_bet(&mut bankroll, 1_000_000_000).unwrap();
    round.stand(&mut bankroll).unwrap();
    assert_eq!(round.outcome(), Some(Outcome::Win));
    assert_eq!(bankroll, 4_000_000_000);
}
