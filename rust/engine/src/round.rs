use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::cards::Rank;
use crate::dealer::play_dealer;
use crate::deck::Deck;
use crate::errors::GameError;
use crate::hand::{hand_value, PlayerHand};
use crate::outcome::{resolve, summarize, Outcome, Settlement};
use crate::rules::{escrow, TableRules};

/// Lifecycle of a single round.
///
/// `DealerTurn` only exists inside the call that finishes the last player
/// hand; a stored round is never observed in it.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundPhase {
    AwaitingBet,
    InPlay,
    DealerTurn,
    Resolved,
}

impl RoundPhase {
    pub const fn as_str(self) -> &'static str {
        match self {
            RoundPhase::AwaitingBet => "awaiting_bet",
            RoundPhase::InPlay => "in_play",
            RoundPhase::DealerTurn => "dealer_turn",
            RoundPhase::Resolved => "resolved",
        }
    }
}

impl fmt::Display for RoundPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A player decision during the `InPlay` phase.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerAction {
    Hit,
    Stand,
    DoubleDown,
    Split,
}

impl PlayerAction {
    pub const fn as_str(self) -> &'static str {
        match self {
            PlayerAction::Hit => "hit",
            PlayerAction::Stand => "stand",
            PlayerAction::DoubleDown => "double_down",
            PlayerAction::Split => "split",
        }
    }
}

impl fmt::Display for PlayerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlayerAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "h" | "hit" => Ok(PlayerAction::Hit),
            "s" | "stand" => Ok(PlayerAction::Stand),
            "d" | "double" | "double_down" | "double-down" => Ok(PlayerAction::DoubleDown),
            "p" | "split" => Ok(PlayerAction::Split),
            other => Err(format!("unknown action '{}'", other)),
        }
    }
}

/// One round of blackjack: bet, deal, player actions, dealer play, settlement.
///
/// Every action takes the account bankroll by mutable reference. Actions run
/// against a working copy and are committed only on success, so an error
/// leaves both the round and the bankroll exactly as they were.
///
/// # Examples
///
/// ```
/// use hitstand_engine::cards::Rank::*;
/// use hitstand_engine::deck::Deck;
/// use hitstand_engine::outcome::Outcome;
/// use hitstand_engine::round::{Round, RoundPhase};
/// use hitstand_engine::rules::TableRules;
///
/// // player 10+K, dealer 9+8
/// let deck = Deck::from_ranks(vec![Ten, King, Nine, Eight]);
/// let mut round = Round::new(deck, TableRules::default());
/// let mut bankroll = 1000;
///
/// round.place_bet(&mut bankroll, 50).unwrap();
/// assert_eq!(bankroll, 950);
///
/// round.stand(&mut bankroll).unwrap();
/// assert_eq!(round.phase(), RoundPhase::Resolved);
/// assert_eq!(round.outcome(), Some(Outcome::Win));
/// assert_eq!(bankroll, 1050);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Round {
    deck: Deck,
    rules: TableRules,
    phase: RoundPhase,
    hands: Vec<PlayerHand>,
    active: usize,
    dealer: Vec<Rank>,
    #[serde(default)]
    settlements: Vec<Settlement>,
}

impl Round {
    pub fn new(deck: Deck, rules: TableRules) -> Self {
        Self {
            deck,
            rules,
            phase: RoundPhase::AwaitingBet,
            hands: Vec::new(),
            active: 0,
            dealer: Vec::new(),
            settlements: Vec::new(),
        }
    }

    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    pub fn rules(&self) -> &TableRules {
        &self.rules
    }

    pub fn hands(&self) -> &[PlayerHand] {
        &self.hands
    }

    pub fn active_index(&self) -> Option<usize> {
        (self.phase == RoundPhase::InPlay).then_some(self.active)
    }

    pub fn active_hand(&self) -> Option<&PlayerHand> {
        self.active_index().and_then(|i| self.hands.get(i))
    }

    pub fn dealer_cards(&self) -> &[Rank] {
        &self.dealer
    }

    pub fn dealer_upcard(&self) -> Option<Rank> {
        self.dealer.first().copied()
    }

    pub fn dealer_value(&self) -> u32 {
        hand_value(&self.dealer)
    }

    pub fn settlements(&self) -> &[Settlement] {
        &self.settlements
    }

    pub fn is_resolved(&self) -> bool {
        self.phase == RoundPhase::Resolved
    }

    /// Round-level outcome once resolved.
    pub fn outcome(&self) -> Option<Outcome> {
        summarize(&self.settlements)
    }

    /// Everything escrowed for this round, double and split stakes included.
    pub fn total_bet(&self) -> u32 {
        self.hands.iter().map(|h| h.bet).sum()
    }

    pub fn total_payout(&self) -> u32 {
        self.settlements.iter().map(|s| s.payout).sum()
    }

    /// Payout minus stake once resolved, zero before that.
    pub fn net(&self) -> i64 {
        if !self.is_resolved() {
            return 0;
        }
        i64::from(self.total_payout()) - i64::from(self.total_bet())
    }

    pub fn deck_seed(&self) -> Option<u64> {
        self.deck.seed()
    }

    pub fn deck_remaining(&self) -> usize {
        self.deck.remaining()
    }

    pub fn can_split(&self) -> bool {
        if self.phase != RoundPhase::InPlay || self.hands.len() != 1 {
            return false;
        }
        let hand = &self.hands[0];
        hand.can_double()
            && self
                .rules
                .split_policy
                .allows(hand.cards[0], hand.cards[1])
    }

    /// Actions legal right now; empty outside `InPlay`.
    pub fn available_actions(&self) -> Vec<PlayerAction> {
        let Some(hand) = self.active_hand() else {
            return Vec::new();
        };
        let mut actions = vec![PlayerAction::Hit, PlayerAction::Stand];
        if hand.can_double() {
            actions.push(PlayerAction::DoubleDown);
        }
        if self.can_split() {
            actions.push(PlayerAction::Split);
        }
        actions
    }

    /// Escrows the bet and deals player, player, dealer, dealer.
    pub fn place_bet(&mut self, bankroll: &mut u32, amount: u32) -> Result<(), GameError> {
        self.transact(bankroll, |round, funds| {
            round.require_phase(RoundPhase::AwaitingBet, "place a bet")?;
            *funds = round.rules.place_bet(*funds, amount)?;
            ensure_payout_fits(*funds, amount)?;
            let mut player = Vec::with_capacity(2);
            player.push(round.deck.draw()?);
            player.push(round.deck.draw()?);
            round.dealer.push(round.deck.draw()?);
            round.dealer.push(round.deck.draw()?);
            round.hands = vec![PlayerHand::new(player, amount)];
            round.active = 0;
            round.phase = RoundPhase::InPlay;
            Ok(())
        })
    }

    /// Draws into the active hand. A bust finishes that hand.
    pub fn hit(&mut self, bankroll: &mut u32) -> Result<Rank, GameError> {
        self.transact(bankroll, |round, funds| {
            round.require_phase(RoundPhase::InPlay, "hit")?;
            let card = round.deck.draw()?;
            let hand = &mut round.hands[round.active];
            hand.receive(card);
            if hand.is_busted() {
                round.advance(funds)?;
            }
            Ok(card)
        })
    }

    pub fn stand(&mut self, bankroll: &mut u32) -> Result<(), GameError> {
        self.transact(bankroll, |round, funds| {
            round.require_phase(RoundPhase::InPlay, "stand")?;
            round.hands[round.active].stand();
            round.advance(funds)
        })
    }

    /// Doubles the active hand's stake, draws exactly one card and finishes the hand.
    pub fn double_down(&mut self, bankroll: &mut u32) -> Result<(), GameError> {
        self.transact(bankroll, |round, funds| {
            round.require_phase(RoundPhase::InPlay, "double down")?;
            let card = {
                let hand = &round.hands[round.active];
                if !hand.can_double() {
                    return Err(GameError::InvalidState(
                        "double down is only allowed on an unplayed two-card hand".into(),
                    ));
                }
                *funds = escrow(*funds, hand.bet)?;
                ensure_payout_fits(*funds, round.total_bet() + hand.bet)?;
                round.deck.draw()?
            };
            let hand = &mut round.hands[round.active];
            hand.bet *= 2;
            hand.doubled = true;
            hand.receive(card);
            hand.stand();
            round.advance(funds)
        })
    }

    /// Splits the starting pair into two hands, each topped up with one card.
    pub fn split(&mut self, bankroll: &mut u32) -> Result<(), GameError> {
        self.transact(bankroll, |round, funds| {
            round.require_phase(RoundPhase::InPlay, "split")?;
            if round.hands.len() > 1 {
                return Err(GameError::InvalidState(
                    "only one split is allowed per round".into(),
                ));
            }
            if !round.can_split() {
                return Err(GameError::InvalidState(format!(
                    "hand cannot be split under the {} policy",
                    round.rules.split_policy
                )));
            }
            let bet = round.hands[0].bet;
            *funds = escrow(*funds, bet)?;
            ensure_payout_fits(*funds, round.total_bet() + bet)?;
            let moved = round.hands[0].cards.pop().ok_or_else(|| {
                GameError::InvalidState("split requires two cards".into())
            })?;
            let mut second = PlayerHand::new(vec![moved], bet);
            round.hands[0].receive(round.deck.draw()?);
            second.receive(round.deck.draw()?);
            round.hands.push(second);
            round.active = 0;
            Ok(())
        })
    }

    pub fn apply(&mut self, action: PlayerAction, bankroll: &mut u32) -> Result<(), GameError> {
        match action {
            PlayerAction::Hit => self.hit(bankroll).map(|_| ()),
            PlayerAction::Stand => self.stand(bankroll),
            PlayerAction::DoubleDown => self.double_down(bankroll),
            PlayerAction::Split => self.split(bankroll),
        }
    }

    fn require_phase(&self, expected: RoundPhase, action: &'static str) -> Result<(), GameError> {
        if self.phase != expected {
            return Err(GameError::WrongPhase {
                action,
                phase: self.phase,
            });
        }
        Ok(())
    }

    fn transact<T, F>(&mut self, bankroll: &mut u32, f: F) -> Result<T, GameError>
    where
        F: FnOnce(&mut Round, &mut u32) -> Result<T, GameError>,
    {
        let mut next = self.clone();
        let mut funds = *bankroll;
        let value = f(&mut next, &mut funds)?;
        *self = next;
        *bankroll = funds;
        Ok(value)
    }

    /// Moves to the next unfinished hand, or finishes the round when none is left.
    fn advance(&mut self, funds: &mut u32) -> Result<(), GameError> {
        if let Some(next) = self.hands.iter().position(|h| h.is_playing()) {
            self.active = next;
            return Ok(());
        }
        self.finish(funds)
    }

    fn finish(&mut self, funds: &mut u32) -> Result<(), GameError> {
        if !self.hands.iter().all(|h| h.is_busted()) {
            self.phase = RoundPhase::DealerTurn;
            play_dealer(&mut self.dealer, &mut self.deck)?;
        }
        self.settlements = self
            .hands
            .iter()
            .map(|h| resolve(&h.cards, &self.dealer, h.bet))
            .collect::<Result<Vec<_>, _>>()?;
        let payout = self.total_payout();
        *funds = funds
            .checked_add(payout)
            .ok_or(GameError::PayoutOverflow { stake: self.total_bet() })?;
        self.phase = RoundPhase::Resolved;
        Ok(())
    }
}

/// Rejects a stake whose best case (every hand winning even money) would
/// push the bankroll past `u32::MAX`. `funds` is the bankroll after escrow.
fn ensure_payout_fits(funds: u32, stake: u32) -> Result<(), GameError> {
    stake
        .checked_mul(2)
        .and_then(|credit| funds.checked_add(credit))
        .map(|_| ())
        .ok_or(GameError::PayoutOverflow { stake })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hand::HandStatus;
    use Rank::*;

    fn stacked(cards: Vec<Rank>) -> Round {
        Round::new(Deck::from_ranks(cards), TableRules::default())
    }

    #[test]
    fn actions_before_bet_are_wrong_phase() {
        let mut round = stacked(vec![Two; 8]);
        let mut bankroll = 1000;
        let err = round.hit(&mut bankroll).unwrap_err();
        assert_eq!(
            err,
            GameError::WrongPhase {
                action: "hit",
                phase: RoundPhase::AwaitingBet
            }
        );
        assert_eq!(bankroll, 1000);
    }

    #[test]
    fn tie_refunds_stake() {
        let mut round = stacked(vec![King, Eight, Nine, Nine]);
        let mut bankroll = 1000;
        round.place_bet(&mut bankroll, 50).unwrap();
        round.stand(&mut bankroll).unwrap();
        assert_eq!(round.outcome(), Some(Outcome::Tie));
        assert_eq!(bankroll, 1000);
        assert_eq!(round.net(), 0);
    }

    #[test]
    fn busting_the_only_hand_skips_the_dealer() {
        let mut round = stacked(vec![King, Six, Ten, Two, Nine, Five]);
        let mut bankroll = 100;
        round.place_bet(&mut bankroll, 20).unwrap();
        assert_eq!(round.hit(&mut bankroll), Ok(Nine));
        assert!(round.is_resolved());
        assert_eq!(round.outcome(), Some(Outcome::Bust));
        assert_eq!(round.dealer_cards(), &[Ten, Two]);
        assert_eq!(round.deck_remaining(), 1);
        assert_eq!(bankroll, 80);
    }

    #[test]
    fn failed_double_leaves_round_untouched() {
        let mut round = stacked(vec![Five, Six, Ten, Seven, Ten]);
        let mut bankroll = 60;
        round.place_bet(&mut bankroll, 50).unwrap();
        let before = round.clone();
        let err = round.double_down(&mut bankroll).unwrap_err();
        assert!(matches!(err, GameError::InsufficientFunds { .. }));
        assert_eq!(round, before);
        assert_eq!(bankroll, 10);
    }

    #[test]
    fn double_draws_one_card_and_stands() {
        let mut round = stacked(vec![Five, Six, Ten, Seven, Two, King]);
        let mut bankroll = 1000;
        round.place_bet(&mut bankroll, 50).unwrap();
        round.double_down(&mut bankroll).unwrap();
        let hand = &round.hands()[0];
        assert_eq!(hand.cards, vec![Five, Six, Two]);
        assert_eq!(hand.bet, 100);
        assert!(hand.doubled);
        assert_eq!(hand.status, HandStatus::Stood);
        // 13 vs 17: dealer stands on 17 without drawing
        assert_eq!(round.outcome(), Some(Outcome::Lose));
        assert_eq!(bankroll, 900);
    }

    #[test]
    fn double_after_hit_is_rejected() {
        let mut round = stacked(vec![Two, Three, Ten, Seven, Four, Nine]);
        let mut bankroll = 1000;
        round.place_bet(&mut bankroll, 10).unwrap();
        round.hit(&mut bankroll).unwrap();
        assert!(matches!(
            round.double_down(&mut bankroll),
            Err(GameError::InvalidState(_))
        ));
        assert!(!round.available_actions().contains(&PlayerAction::DoubleDown));
    }

    #[test]
    fn split_moves_second_card_and_tops_up_both_hands() {
        let mut round = stacked(vec![Eight, Eight, Ten, Seven, Three, Ace]);
        let mut bankroll = 1000;
        round.place_bet(&mut bankroll, 25).unwrap();
        assert!(round.available_actions().contains(&PlayerAction::Split));
        round.split(&mut bankroll).unwrap();
        assert_eq!(bankroll, 950);
        assert_eq!(round.hands().len(), 2);
        assert_eq!(round.hands()[0].cards, vec![Eight, Three]);
        assert_eq!(round.hands()[1].cards, vec![Eight, Ace]);
        assert_eq!(round.active_index(), Some(0));
        assert!(!round.can_split());
    }

    #[test]
    fn ten_and_king_only_split_under_same_value() {
        let cards = vec![Ten, King, Nine, Seven, Two, Three];
        let mut bankroll = 1000;
        let mut literal = stacked(cards.clone());
        literal.place_bet(&mut bankroll, 10).unwrap();
        assert!(literal.split(&mut bankroll).is_err());
        assert_eq!(bankroll, 990);

        let rules = TableRules {
            split_policy: crate::rules::SplitPolicy::SameValue,
            ..TableRules::default()
        };
        let mut by_value = Round::new(Deck::from_ranks(cards), rules);
        let mut bankroll = 1000;
        by_value.place_bet(&mut bankroll, 10).unwrap();
        assert!(by_value.split(&mut bankroll).is_ok());
        assert_eq!(bankroll, 980);
    }

    #[test]
    fn resolved_round_rejects_everything() {
        let mut round = stacked(vec![King, Queen, Nine, Eight]);
        let mut bankroll = 1000;
        round.place_bet(&mut bankroll, 10).unwrap();
        round.stand(&mut bankroll).unwrap();
        for action in [
            PlayerAction::Hit,
            PlayerAction::Stand,
            PlayerAction::DoubleDown,
            PlayerAction::Split,
        ] {
            assert!(matches!(
                round.apply(action, &mut bankroll),
                Err(GameError::WrongPhase { .. })
            ));
        }
        assert!(round.place_bet(&mut bankroll, 10).is_err());
        assert!(round.available_actions().is_empty());
    }

    #[test]
    fn round_survives_json_round_trip_mid_play() {
        let mut round = stacked(vec![Eight, Eight, Ten, Seven, Three, Ace, Nine]);
        let mut bankroll = 1000;
        round.place_bet(&mut bankroll, 25).unwrap();
        round.split(&mut bankroll).unwrap();
        let json = serde_json::to_string(&round).unwrap();
        let restored: Round = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, round);
    }

    #[test]
    fn action_names_parse() {
        assert_eq!("double".parse(), Ok(PlayerAction::DoubleDown));
        assert_eq!("P".parse(), Ok(PlayerAction::Split));
        assert!("surrender".parse::<PlayerAction>().is_err());
        assert_eq!(
            serde_json::to_string(&PlayerAction::DoubleDown).unwrap(),
            "\"double_down\""
        );
    }
}
